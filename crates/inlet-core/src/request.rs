//! HTTP request types.

use std::fmt;
use std::net::SocketAddr;

use crate::body::BodyReader;
use crate::headers::Headers;

/// HTTP version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HttpVersion {
    /// HTTP/1.0
    Http10,
    /// HTTP/1.1 (default)
    #[default]
    Http11,
}

impl HttpVersion {
    /// Parse HTTP version from string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "HTTP/1.0" => Some(Self::Http10),
            "HTTP/1.1" => Some(Self::Http11),
            _ => None,
        }
    }

    /// Returns true if this is HTTP/1.1.
    #[must_use]
    pub fn is_http11(self) -> bool {
        matches!(self, Self::Http11)
    }

    /// Returns the version string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http10 => "HTTP/1.0",
            Self::Http11 => "HTTP/1.1",
        }
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse an `HTTP/<major>.<minor>` protocol string into its components.
///
/// Accepts any non-negative major/minor digits (`HTTP/1.1`, `HTTP/1.0`,
/// `HTTP/2.0`, ...). Returns `None` for anything else, including signs and
/// missing digits.
#[must_use]
pub fn parse_http_version(s: &str) -> Option<(u8, u8)> {
    match s {
        "HTTP/1.1" => Some((1, 1)),
        "HTTP/1.0" => Some((1, 0)),
        _ => {
            let rest = s.strip_prefix("HTTP/")?;
            let (major, minor) = rest.split_once('.')?;
            if major.is_empty()
                || minor.is_empty()
                || !major.bytes().all(|b| b.is_ascii_digit())
                || !minor.bytes().all(|b| b.is_ascii_digit())
            {
                return None;
            }
            Some((major.parse().ok()?, minor.parse().ok()?))
        }
    }
}

/// HTTP method.
///
/// The recognized set matches RFC 7231 plus CONNECT and TRACE; method names
/// are matched after uppercasing, so `get` and `GET` both resolve to
/// [`Method::Get`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// OPTIONS method.
    Options,
    /// GET method.
    Get,
    /// HEAD method.
    Head,
    /// POST method.
    Post,
    /// PUT method.
    Put,
    /// DELETE method.
    Delete,
    /// TRACE method.
    Trace,
    /// CONNECT method.
    Connect,
}

impl Method {
    /// Parse method from uppercase bytes.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            b"OPTIONS" => Some(Self::Options),
            b"GET" => Some(Self::Get),
            b"HEAD" => Some(Self::Head),
            b"POST" => Some(Self::Post),
            b"PUT" => Some(Self::Put),
            b"DELETE" => Some(Self::Delete),
            b"TRACE" => Some(Self::Trace),
            b"CONNECT" => Some(Self::Connect),
            _ => None,
        }
    }

    /// Return the canonical uppercase method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Options => "OPTIONS",
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Trace => "TRACE",
            Self::Connect => "CONNECT",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP request assembled from parser callbacks.
#[derive(Debug)]
pub struct Request {
    method: Method,
    uri: String,
    version: HttpVersion,
    headers: Headers,
    content_length: i64,
    body: BodyReader,
    trailer: Headers,
    remote_addr: Option<SocketAddr>,
    close: bool,
}

impl Request {
    /// Create a new request with the given method and raw request-target.
    #[must_use]
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            version: HttpVersion::default(),
            headers: Headers::new(),
            content_length: -1,
            body: BodyReader::new(),
            trailer: Headers::new(),
            remote_addr: None,
            close: false,
        }
    }

    /// Get the HTTP method.
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// Get the raw request-target as it appeared on the request line.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Get the path portion of the request-target (before any `?`).
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.split('?').next().unwrap_or(&self.uri)
    }

    /// Get the query string (after the first `?`), if present.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.uri.split_once('?').map(|(_, query)| query)
    }

    /// Get the HTTP version.
    #[must_use]
    pub fn version(&self) -> HttpVersion {
        self.version
    }

    /// Set the HTTP version.
    pub fn set_version(&mut self, version: HttpVersion) {
        self.version = version;
    }

    /// Get the headers.
    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Get mutable headers.
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Replace the headers wholesale.
    pub fn set_headers(&mut self, headers: Headers) {
        self.headers = headers;
    }

    /// Declared content length: `-1` unknown, `0` empty, `> 0` fixed size.
    #[must_use]
    pub fn content_length(&self) -> i64 {
        self.content_length
    }

    /// Set the declared content length.
    pub fn set_content_length(&mut self, content_length: i64) {
        self.content_length = content_length;
    }

    /// Get the body reader.
    #[must_use]
    pub fn body(&self) -> &BodyReader {
        &self.body
    }

    /// Get the body reader mutably (reads consume buffered fragments).
    pub fn body_mut(&mut self) -> &mut BodyReader {
        &mut self.body
    }

    /// Take the body, leaving an empty reader behind.
    pub fn take_body(&mut self) -> BodyReader {
        std::mem::take(&mut self.body)
    }

    /// Set the body.
    pub fn set_body(&mut self, body: BodyReader) {
        self.body = body;
    }

    /// Trailer headers received after a chunked body.
    #[must_use]
    pub fn trailer(&self) -> &Headers {
        &self.trailer
    }

    /// Get mutable trailer headers.
    pub fn trailer_mut(&mut self) -> &mut Headers {
        &mut self.trailer
    }

    /// Replace the trailer headers wholesale.
    pub fn set_trailer(&mut self, trailer: Headers) {
        self.trailer = trailer;
    }

    /// Remote peer address, when known.
    #[must_use]
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    /// Set the remote peer address.
    pub fn set_remote_addr(&mut self, addr: Option<SocketAddr>) {
        self.remote_addr = addr;
    }

    /// Whether the message asks for the connection to be closed after it.
    #[must_use]
    pub fn close(&self) -> bool {
        self.close
    }

    /// Set the connection-close flag.
    pub fn set_close(&mut self, close: bool) {
        self.close = close;
    }
}
