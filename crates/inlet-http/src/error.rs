//! Parse error taxonomy.

use std::fmt;

/// HTTP parsing error.
///
/// Every variant is fatal for the stream: the parser does not recover, and
/// the caller is expected to close the underlying connection and discard the
/// parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A CR was not followed by LF.
    LfExpected,
    /// A CR was required but another byte arrived.
    CrExpected,
    /// Unrecognized or malformed request method.
    InvalidMethod,
    /// Malformed request-target.
    InvalidRequestUri,
    /// Protocol string is not `HTTP/<major>.<minor>`.
    InvalidHttpVersion,
    /// Malformed status code in a status line.
    InvalidStatusCode,
    /// Byte not allowed at this position of a header field.
    InvalidHeaderCharacter,
    /// Content-Length is not a non-negative decimal integer.
    InvalidContentLength,
    /// Content-Length present alongside `Transfer-Encoding: chunked`.
    UnexpectedContentLength,
    /// More than one Transfer-Encoding value.
    TooManyTransferEncodings,
    /// A Transfer-Encoding other than `chunked`.
    UnsupportedTransferEncoding(String),
    /// A Trailer header advertised a framing-reserved name.
    BadTrailerKey(String),
    /// A trailer arrived that the headers did not advertise.
    InvalidTrailer(String),
    /// The trailer section ended with advertised trailers still missing.
    TrailerExpected,
    /// Chunk size line does not start with a hexadecimal digit.
    InvalidChunkSize,
    /// An unterminated token outgrew the configured read limit.
    ReadLimitExceeded {
        /// The configured ceiling, in bytes.
        limit: usize,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LfExpected => write!(f, "expected LF after CR"),
            Self::CrExpected => write!(f, "expected CR"),
            Self::InvalidMethod => write!(f, "invalid method"),
            Self::InvalidRequestUri => write!(f, "invalid request URI"),
            Self::InvalidHttpVersion => write!(f, "malformed HTTP version"),
            Self::InvalidStatusCode => write!(f, "invalid status code"),
            Self::InvalidHeaderCharacter => write!(f, "invalid character in header"),
            Self::InvalidContentLength => write!(f, "bad Content-Length"),
            Self::UnexpectedContentLength => {
                write!(f, "unexpected Content-Length with chunked transfer encoding")
            }
            Self::TooManyTransferEncodings => write!(f, "too many transfer encodings"),
            Self::UnsupportedTransferEncoding(value) => {
                write!(f, "unsupported transfer encoding: {value:?}")
            }
            Self::BadTrailerKey(name) => write!(f, "bad trailer key: {name:?}"),
            Self::InvalidTrailer(name) => write!(f, "invalid trailer: {name:?}"),
            Self::TrailerExpected => {
                write!(f, "advertised trailer missing before end of message")
            }
            Self::InvalidChunkSize => write!(f, "invalid chunk size"),
            Self::ReadLimitExceeded { limit } => {
                write!(f, "read limit exceeded: unterminated token past {limit} bytes")
            }
        }
    }
}

impl std::error::Error for ParseError {}
