//! Connection header handling.
//!
//! The Connection header is a comma-separated list of tokens; `close` and
//! `keep-alive` decide whether the stream survives the current message, with
//! version-dependent defaults: HTTP/1.1 stays open unless told otherwise,
//! HTTP/1.0 closes unless told otherwise.

use inlet_core::{Headers, HttpVersion};

/// Connection directives extracted from a Connection header value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectionInfo {
    /// Whether a `close` token was present.
    pub close: bool,
    /// Whether a `keep-alive` token was present.
    pub keep_alive: bool,
}

impl ConnectionInfo {
    /// Parse one Connection header value.
    ///
    /// Tokens are case-insensitive and whitespace around commas is ignored;
    /// unrecognized tokens are skipped.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let mut info = Self::default();
        for token in value.split(',') {
            let token = token.trim();
            if token.eq_ignore_ascii_case("close") {
                info.close = true;
            } else if token.eq_ignore_ascii_case("keep-alive") {
                info.keep_alive = true;
            }
        }
        info
    }

    /// Merge directives from another value of the same header.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            close: self.close || other.close,
            keep_alive: self.keep_alive || other.keep_alive,
        }
    }

    /// Apply the version-dependent default.
    ///
    /// An explicit `close` always wins; an explicit `keep-alive` wins next;
    /// otherwise HTTP/1.1 defaults to open and HTTP/1.0 to closed.
    #[must_use]
    pub fn should_keep_alive(self, version: HttpVersion) -> bool {
        if self.close {
            return false;
        }
        if self.keep_alive {
            return true;
        }
        version.is_http11()
    }
}

/// Decide keep-alive for a message from its version and headers.
#[must_use]
pub fn should_keep_alive(version: HttpVersion, headers: &Headers) -> bool {
    let mut info = ConnectionInfo::default();
    for value in headers.get_all("Connection") {
        info = info.merge(ConnectionInfo::parse(value));
    }
    info.should_keep_alive(version)
}
