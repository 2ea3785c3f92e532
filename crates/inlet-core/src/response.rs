//! HTTP response types.

use crate::body::BodyReader;
use crate::headers::Headers;
use crate::request::HttpVersion;

/// HTTP response assembled from parser callbacks (client role).
#[derive(Debug)]
pub struct Response {
    version: HttpVersion,
    status_code: u16,
    reason: String,
    headers: Headers,
    content_length: i64,
    body: BodyReader,
    trailer: Headers,
}

impl Response {
    /// Create a new response with the given status line fields.
    #[must_use]
    pub fn new(version: HttpVersion, status_code: u16, reason: impl Into<String>) -> Self {
        Self {
            version,
            status_code,
            reason: reason.into(),
            headers: Headers::new(),
            content_length: -1,
            body: BodyReader::new(),
            trailer: Headers::new(),
        }
    }

    /// Get the HTTP version.
    #[must_use]
    pub fn version(&self) -> HttpVersion {
        self.version
    }

    /// Get the status code.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Get the reason phrase (may be empty).
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
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
}
