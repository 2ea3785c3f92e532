//! End-of-headers framing analysis.
//!
//! While headers stream past, the parser retains only the three fields that
//! decide where the message body ends: Transfer-Encoding, Content-Length and
//! Trailer. When the blank line arrives, [`FramingHeaders::analyze`] turns
//! them into a [`Framing`] decision and the scratch is cleared for the next
//! message.

use std::collections::HashSet;

use inlet_core::canonical_header_name;

use crate::error::ParseError;

/// The three framing-relevant header values retained during header parsing.
#[derive(Debug, Clone, Default)]
pub struct FramingHeaders {
    transfer_encoding: Vec<String>,
    content_length: Vec<String>,
    trailer: Vec<String>,
}

/// The framing decision for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framing {
    /// True when the body uses chunked transfer coding.
    pub chunked: bool,
    /// Declared body length: `-1` unknown/absent, `0` empty, `> 0` fixed.
    pub content_length: i64,
    /// Canonical trailer names the trailer section must provide.
    pub expected_trailers: HashSet<String>,
}

impl FramingHeaders {
    /// Returns true for the canonical names this scratch retains.
    #[must_use]
    pub fn is_framing_header(name: &str) -> bool {
        matches!(name, "Transfer-Encoding" | "Content-Length" | "Trailer")
    }

    /// Retain one header occurrence. `name` must already be canonical.
    pub fn retain(&mut self, name: &str, value: &str) {
        match name {
            "Transfer-Encoding" => self.transfer_encoding.push(value.to_string()),
            "Content-Length" => self.content_length.push(value.to_string()),
            "Trailer" => self.trailer.push(value.to_string()),
            _ => {}
        }
    }

    /// Drop everything retained so far.
    pub fn clear(&mut self) {
        self.transfer_encoding.clear();
        self.content_length.clear();
        self.trailer.clear();
    }

    /// Decide the body framing for the message whose headers just ended.
    ///
    /// Clears the retained scratch on success; on error the parser is dead
    /// anyway.
    ///
    /// # Errors
    ///
    /// - more than one Transfer-Encoding value: [`ParseError::TooManyTransferEncodings`]
    /// - a coding other than `chunked`: [`ParseError::UnsupportedTransferEncoding`]
    /// - chunked alongside Content-Length: [`ParseError::UnexpectedContentLength`]
    /// - non-numeric or negative Content-Length: [`ParseError::InvalidContentLength`]
    /// - a framing-reserved trailer name: [`ParseError::BadTrailerKey`]
    pub fn analyze(&mut self) -> Result<Framing, ParseError> {
        let mut framing = Framing {
            chunked: false,
            content_length: -1,
            expected_trailers: HashSet::new(),
        };

        if !self.transfer_encoding.is_empty() {
            if self.transfer_encoding.len() > 1 {
                return Err(ParseError::TooManyTransferEncodings);
            }
            let coding = self.transfer_encoding[0].trim();
            if !coding.eq_ignore_ascii_case("chunked") {
                return Err(ParseError::UnsupportedTransferEncoding(coding.to_string()));
            }
            if !self.content_length.is_empty() {
                return Err(ParseError::UnexpectedContentLength);
            }
            framing.chunked = true;
        } else if let Some(raw) = self.content_length.first() {
            framing.content_length = parse_content_length(raw.trim())?;
        }

        if framing.chunked {
            for list in &self.trailer {
                for name in list.split(',') {
                    let name = name.trim();
                    if name.is_empty() {
                        continue;
                    }
                    let name = canonical_header_name(name);
                    if Self::is_framing_header(&name) {
                        return Err(ParseError::BadTrailerKey(name));
                    }
                    framing.expected_trailers.insert(name);
                }
            }
        }

        self.clear();
        Ok(framing)
    }
}

fn parse_content_length(value: &str) -> Result<i64, ParseError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidContentLength);
    }
    value.parse().map_err(|_| ParseError::InvalidContentLength)
}
