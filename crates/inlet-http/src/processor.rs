//! The consumer interface driven by the parser, and its stock
//! implementations.
//!
//! A [`Processor`] receives each syntactic piece of a message the moment the
//! parser crosses its boundary. [`ServerProcessor`] assembles requests and
//! hands them to a handler, [`ClientProcessor`] does the same for responses,
//! and [`NoopProcessor`] swallows everything (benchmarking).

use std::net::SocketAddr;

use inlet_core::{BodyReader, Headers, HttpVersion, Method, Request, Response};

use crate::error::ParseError;
use crate::keepalive;

/// Callbacks the parser drives as it crosses message boundaries.
///
/// All methods have no-op defaults, so an implementation only overrides what
/// it cares about. Within one message the parser calls, in wire order:
/// `on_method`/`on_url`/`on_proto` (server role) or `on_proto`/`on_status`
/// (client role), then `on_header` per header, `on_content_length` once the
/// framing is known, `on_body` per body fragment, `on_trailer_header` per
/// trailer, and finally `on_complete`.
pub trait Processor {
    /// The request method, uppercased and validated.
    fn on_method(&mut self, method: &str) {
        let _ = method;
    }

    /// The raw request-target.
    ///
    /// # Errors
    ///
    /// An implementation may reject a malformed URI; the error aborts the
    /// stream.
    fn on_url(&mut self, uri: &str) -> Result<(), ParseError> {
        let _ = uri;
        Ok(())
    }

    /// The protocol string (`HTTP/<major>.<minor>`, already shape-checked).
    ///
    /// # Errors
    ///
    /// An implementation may reject versions it does not speak; the error
    /// aborts the stream.
    fn on_proto(&mut self, proto: &str) -> Result<(), ParseError> {
        let _ = proto;
        Ok(())
    }

    /// Status code and reason phrase of a status line (client role).
    fn on_status(&mut self, code: u16, reason: &str) {
        let _ = (code, reason);
    }

    /// One header field; the name arrives in canonical form.
    fn on_header(&mut self, name: &str, value: &str) {
        let _ = (name, value);
    }

    /// The framing decision: `-1` unknown/absent, `0` empty, `> 0` fixed.
    fn on_content_length(&mut self, content_length: i64) {
        let _ = content_length;
    }

    /// One body fragment.
    ///
    /// The slice may alias the caller's input buffer and is valid only for
    /// the duration of this call; copy it to retain it.
    fn on_body(&mut self, data: &[u8]) {
        let _ = data;
    }

    /// One trailer field of a chunked body; the name arrives canonical.
    fn on_trailer_header(&mut self, name: &str, value: &str) {
        let _ = (name, value);
    }

    /// The message is complete. `peer` identifies the connection when known.
    fn on_complete(&mut self, peer: Option<SocketAddr>) {
        let _ = peer;
    }
}

/// A processor that ignores every event. Used for benchmarking the bare
/// state machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProcessor;

impl Processor for NoopProcessor {}

/// Assembles [`Request`] values from parser events and hands each completed
/// request to the handler.
#[derive(Debug)]
pub struct ServerProcessor<H: FnMut(Request)> {
    handler: H,
    method: Option<Method>,
    uri: String,
    version: HttpVersion,
    headers: Headers,
    content_length: i64,
    body: BodyReader,
    trailer: Headers,
}

impl<H: FnMut(Request)> ServerProcessor<H> {
    /// Create a server processor delivering completed requests to `handler`.
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            method: None,
            uri: String::new(),
            version: HttpVersion::default(),
            headers: Headers::new(),
            content_length: -1,
            body: BodyReader::new(),
            trailer: Headers::new(),
        }
    }
}

impl<H: FnMut(Request)> Processor for ServerProcessor<H> {
    fn on_method(&mut self, method: &str) {
        self.method = Method::from_bytes(method.as_bytes());
    }

    fn on_url(&mut self, uri: &str) -> Result<(), ParseError> {
        if uri.is_empty() || uri.bytes().any(|b| b <= b' ' || b == 0x7f) {
            return Err(ParseError::InvalidRequestUri);
        }
        self.uri.clear();
        self.uri.push_str(uri);
        Ok(())
    }

    fn on_proto(&mut self, proto: &str) -> Result<(), ParseError> {
        self.version = HttpVersion::parse(proto).ok_or(ParseError::InvalidHttpVersion)?;
        Ok(())
    }

    fn on_header(&mut self, name: &str, value: &str) {
        self.headers.add(name, value);
    }

    fn on_content_length(&mut self, content_length: i64) {
        self.content_length = content_length;
    }

    fn on_body(&mut self, data: &[u8]) {
        self.body.push(data);
    }

    fn on_trailer_header(&mut self, name: &str, value: &str) {
        self.trailer.add(name, value);
    }

    fn on_complete(&mut self, peer: Option<SocketAddr>) {
        let Some(method) = self.method.take() else {
            return;
        };
        let mut request = Request::new(method, std::mem::take(&mut self.uri));
        request.set_version(self.version);
        request.set_headers(std::mem::take(&mut self.headers));
        request.set_content_length(self.content_length);
        request.set_body(std::mem::take(&mut self.body));
        request.set_trailer(std::mem::take(&mut self.trailer));
        request.set_remote_addr(peer);
        let keep_alive = keepalive::should_keep_alive(request.version(), request.headers());
        request.set_close(!keep_alive);

        self.version = HttpVersion::default();
        self.content_length = -1;

        log::trace!("dispatching {} {}", request.method(), request.uri());
        (self.handler)(request);
    }
}

/// Assembles [`Response`] values from parser events and delivers each
/// completed response to the handler.
#[derive(Debug)]
pub struct ClientProcessor<H: FnMut(Response)> {
    handler: H,
    version: HttpVersion,
    status_code: u16,
    reason: String,
    headers: Headers,
    content_length: i64,
    body: BodyReader,
    trailer: Headers,
}

impl<H: FnMut(Response)> ClientProcessor<H> {
    /// Create a client processor delivering completed responses to `handler`.
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            version: HttpVersion::default(),
            status_code: 0,
            reason: String::new(),
            headers: Headers::new(),
            content_length: -1,
            body: BodyReader::new(),
            trailer: Headers::new(),
        }
    }
}

impl<H: FnMut(Response)> Processor for ClientProcessor<H> {
    fn on_proto(&mut self, proto: &str) -> Result<(), ParseError> {
        self.version = HttpVersion::parse(proto).ok_or(ParseError::InvalidHttpVersion)?;
        Ok(())
    }

    fn on_status(&mut self, code: u16, reason: &str) {
        self.status_code = code;
        self.reason.clear();
        self.reason.push_str(reason);
    }

    fn on_header(&mut self, name: &str, value: &str) {
        self.headers.add(name, value);
    }

    fn on_content_length(&mut self, content_length: i64) {
        self.content_length = content_length;
    }

    fn on_body(&mut self, data: &[u8]) {
        self.body.push(data);
    }

    fn on_trailer_header(&mut self, name: &str, value: &str) {
        self.trailer.add(name, value);
    }

    fn on_complete(&mut self, _peer: Option<SocketAddr>) {
        let mut response = Response::new(
            self.version,
            self.status_code,
            std::mem::take(&mut self.reason),
        );
        response.set_headers(std::mem::take(&mut self.headers));
        response.set_content_length(self.content_length);
        response.set_body(std::mem::take(&mut self.body));
        response.set_trailer(std::mem::take(&mut self.trailer));

        self.version = HttpVersion::default();
        self.status_code = 0;
        self.content_length = -1;

        log::trace!("response complete: {}", response.status_code());
        (self.handler)(response);
    }
}
