//! The incremental HTTP/1.x state machine.
//!
//! [`Parser::feed`] consumes one delivered byte slice at a time. All state
//! lives in the parser: the current state variant, the carry buffer
//! holding bytes of a token cut off by the end of the previous delivery, and
//! the per-message scratch (header key in progress, framing headers, chunk
//! size, expected trailers). Every transition is driven by a single byte of
//! lookahead, so any split of the input (including one byte per call)
//! produces the same callback sequence.
//!
//! On message completion the scratch is reset and the role's start state is
//! re-entered, so pipelined messages in the same delivery keep parsing
//! without returning to the caller.

use std::any::Any;
use std::collections::HashSet;
use std::net::SocketAddr;

use inlet_core::{canonical_header_name, parse_http_version, Method};

use crate::chars;
use crate::error::ParseError;
use crate::framing::FramingHeaders;
use crate::processor::Processor;

/// Default ceiling on carry growth: 4 MiB.
pub const DEFAULT_MAX_READ_SIZE: usize = 4 * 1024 * 1024;

/// Which side of the connection this parser reads.
///
/// The role fixes the grammar of the start line (request line vs status
/// line) and the state the parser returns to after each message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Reads requests.
    Server,
    /// Reads responses.
    Client,
}

impl Role {
    fn start_state(self) -> State {
        match self {
            Role::Server => State::MethodBefore,
            Role::Client => State::ClientProtoBefore,
        }
    }
}

/// Parser limits.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Ceiling on the carry buffer, rejecting pathological unterminated
    /// tokens. Exceeding it fails the stream with
    /// [`ParseError::ReadLimitExceeded`].
    pub max_read_size: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_read_size: DEFAULT_MAX_READ_SIZE,
        }
    }
}

impl ParserConfig {
    /// Set the carry ceiling.
    #[must_use]
    pub fn with_max_read_size(mut self, max_read_size: usize) -> Self {
        self.max_read_size = max_read_size;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    // request line (server role)
    MethodBefore,
    Method,
    PathBefore,
    Path,
    ProtoBefore,
    Proto,
    ProtoLf,

    // status line (client role)
    ClientProtoBefore,
    ClientProto,
    StatusCodeBefore,
    StatusCode,
    StatusBefore,
    Status,
    StatusLf,

    // header section
    HeaderKeyBefore,
    HeaderKey,
    HeaderValueBefore,
    HeaderValue,
    HeaderValueLf,
    HeaderOverLf,

    // fixed-length body
    BodyContentLength,

    // chunked body
    BodyChunkSizeBefore,
    BodyChunkSize,
    BodyChunkSizeLf,
    BodyChunkData,
    BodyChunkDataCr,
    BodyChunkDataLf,

    // trailer section
    TrailerKeyBefore,
    TrailerKey,
    TrailerValueBefore,
    TrailerValue,
    TrailerValueLf,

    // closing CRLF after the last chunk
    TailCr,
    TailLf,
}

/// Incremental HTTP/1.x message parser.
///
/// One parser per stream direction; it is owned by a single reader and
/// mutated only from there. See the crate docs for the callback contract.
pub struct Parser<P: Processor> {
    role: Role,
    config: ParserConfig,
    processor: P,
    state: State,
    carry: Vec<u8>,
    // scratch for the header or trailer in progress (canonical form)
    header_key: String,
    status_code: u16,
    chunked: bool,
    content_length: i64,
    chunk_size: i64,
    framing: FramingHeaders,
    expected_trailers: HashSet<String>,
    peer_addr: Option<SocketAddr>,
    session: Option<Box<dyn Any + Send>>,
}

impl<P: Processor> Parser<P> {
    /// Create a parser with default limits.
    pub fn new(role: Role, processor: P) -> Self {
        Self::with_config(role, processor, ParserConfig::default())
    }

    /// Create a parser with explicit limits.
    pub fn with_config(role: Role, processor: P, config: ParserConfig) -> Self {
        Self {
            role,
            config,
            processor,
            state: role.start_state(),
            carry: Vec::new(),
            header_key: String::new(),
            status_code: 0,
            chunked: false,
            content_length: -1,
            chunk_size: -1,
            framing: FramingHeaders::default(),
            expected_trailers: HashSet::new(),
            peer_addr: None,
            session: None,
        }
    }

    /// The parser's role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Remote peer identity forwarded to `on_complete`.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }

    /// Set the remote peer identity forwarded to `on_complete`.
    pub fn set_peer_addr(&mut self, addr: Option<SocketAddr>) {
        self.peer_addr = addr;
    }

    /// Attach an application-level value to this stream.
    pub fn set_session<T: Any + Send>(&mut self, session: T) {
        self.session = Some(Box::new(session));
    }

    /// Borrow the attached session value, if any of that type.
    pub fn session<T: Any + Send>(&self) -> Option<&T> {
        self.session.as_ref().and_then(|session| session.downcast_ref())
    }

    /// Detach and return the session value.
    pub fn take_session(&mut self) -> Option<Box<dyn Any + Send>> {
        self.session.take()
    }

    /// Borrow the processor.
    pub fn processor(&self) -> &P {
        &self.processor
    }

    /// Borrow the processor mutably.
    pub fn processor_mut(&mut self) -> &mut P {
        &mut self.processor
    }

    /// Consume the parser, returning its processor.
    pub fn into_processor(self) -> P {
        self.processor
    }

    /// Bytes carried over from the previous delivery.
    pub fn buffered(&self) -> usize {
        self.carry.len()
    }

    /// True when the parser sits between messages with nothing carried.
    pub fn at_message_boundary(&self) -> bool {
        self.state == self.role.start_state() && self.carry.is_empty()
    }

    /// Consume one delivered slice, invoking callbacks for every syntactic
    /// boundary it crosses.
    ///
    /// The slice is borrowed only for the duration of the call; bytes of an
    /// unfinished token are copied into the carry buffer before returning.
    ///
    /// # Errors
    ///
    /// Any [`ParseError`] is fatal: the stream cannot be resynchronized and
    /// the parser should be discarded.
    pub fn feed(&mut self, input: &[u8]) -> Result<(), ParseError> {
        if input.is_empty() {
            return Ok(());
        }

        let carried: Vec<u8>;
        let (data, resume_at) = if self.carry.is_empty() {
            (input, 0)
        } else {
            let mut buf = std::mem::take(&mut self.carry);
            let resume_at = buf.len();
            buf.extend_from_slice(input);
            carried = buf;
            (carried.as_slice(), resume_at)
        };

        self.run(data, resume_at)
    }

    // The inner loop. `data` is the carry plus the new delivery; scanning
    // resumes at `resume_at` (everything before it was scanned last time),
    // while `start` tracks the first byte of the token in progress.
    fn run(&mut self, data: &[u8], resume_at: usize) -> Result<(), ParseError> {
        let mut start = 0usize;
        let mut i = resume_at;

        while i < data.len() {
            let c = data[i];
            match self.state {
                // ---- request line ------------------------------------------------
                State::MethodBefore => {
                    if chars::is_method_char(c) {
                        start = i;
                        self.state = State::Method;
                    } else if chars::is_blank(c) {
                        start = i + 1;
                    } else {
                        return Err(ParseError::InvalidMethod);
                    }
                }
                State::Method => {
                    if c == b' ' {
                        let token = str_slice(data, start, i, ParseError::InvalidMethod)?;
                        let method = token.to_ascii_uppercase();
                        if Method::from_bytes(method.as_bytes()).is_none() {
                            return Err(ParseError::InvalidMethod);
                        }
                        self.processor.on_method(&method);
                        start = i + 1;
                        self.state = State::PathBefore;
                    } else if !chars::is_alpha(c) {
                        return Err(ParseError::InvalidMethod);
                    }
                }
                State::PathBefore => {
                    if c == b'/' {
                        start = i;
                        self.state = State::Path;
                    } else if c == b' ' {
                        start = i + 1;
                    } else {
                        return Err(ParseError::InvalidRequestUri);
                    }
                }
                State::Path => {
                    if c == b' ' {
                        let uri = str_slice(data, start, i, ParseError::InvalidRequestUri)?;
                        self.processor.on_url(uri)?;
                        start = i + 1;
                        self.state = State::ProtoBefore;
                    }
                }
                State::ProtoBefore => {
                    if c == b' ' {
                        start = i + 1;
                    } else {
                        start = i;
                        self.state = State::Proto;
                    }
                }
                State::Proto => {
                    if c == b'\r' {
                        let proto = str_slice(data, start, i, ParseError::InvalidHttpVersion)?;
                        if parse_http_version(proto).is_none() {
                            return Err(ParseError::InvalidHttpVersion);
                        }
                        self.processor.on_proto(proto)?;
                        start = i + 1;
                        self.state = State::ProtoLf;
                    }
                }
                State::ProtoLf => {
                    if c != b'\n' {
                        return Err(ParseError::LfExpected);
                    }
                    start = i + 1;
                    self.state = State::HeaderKeyBefore;
                }

                // ---- status line -------------------------------------------------
                State::ClientProtoBefore => {
                    if chars::is_blank(c) {
                        start = i + 1;
                    } else {
                        start = i;
                        self.state = State::ClientProto;
                    }
                }
                State::ClientProto => {
                    if c == b' ' {
                        let proto = str_slice(data, start, i, ParseError::InvalidHttpVersion)?;
                        if parse_http_version(proto).is_none() {
                            return Err(ParseError::InvalidHttpVersion);
                        }
                        self.processor.on_proto(proto)?;
                        start = i + 1;
                        self.state = State::StatusCodeBefore;
                    }
                }
                State::StatusCodeBefore => {
                    if chars::is_num(c) {
                        start = i;
                        self.state = State::StatusCode;
                    } else if c == b' ' {
                        start = i + 1;
                    } else {
                        return Err(ParseError::InvalidStatusCode);
                    }
                }
                State::StatusCode => {
                    if chars::is_num(c) {
                        // accumulating digits
                    } else if c == b' ' || c == b'\r' {
                        let digits = str_slice(data, start, i, ParseError::InvalidStatusCode)?;
                        self.status_code =
                            digits.parse().map_err(|_| ParseError::InvalidStatusCode)?;
                        start = i + 1;
                        if c == b' ' {
                            self.state = State::StatusBefore;
                        } else {
                            self.processor.on_status(self.status_code, "");
                            self.state = State::StatusLf;
                        }
                    } else {
                        return Err(ParseError::InvalidStatusCode);
                    }
                }
                State::StatusBefore => {
                    if c == b' ' {
                        start = i + 1;
                    } else if c == b'\r' {
                        self.processor.on_status(self.status_code, "");
                        start = i + 1;
                        self.state = State::StatusLf;
                    } else {
                        start = i;
                        self.state = State::Status;
                    }
                }
                State::Status => {
                    if c == b'\r' {
                        let reason = String::from_utf8_lossy(&data[start..i]);
                        self.processor.on_status(self.status_code, &reason);
                        start = i + 1;
                        self.state = State::StatusLf;
                    }
                }
                State::StatusLf => {
                    if c != b'\n' {
                        return Err(ParseError::LfExpected);
                    }
                    start = i + 1;
                    self.state = State::HeaderKeyBefore;
                }

                // ---- header section ----------------------------------------------
                State::HeaderKeyBefore => {
                    if c == b' ' {
                        start = i + 1;
                    } else if c == b'\r' {
                        start = i + 1;
                        self.state = State::HeaderOverLf;
                    } else if chars::is_token(c) {
                        start = i;
                        self.state = State::HeaderKey;
                    } else {
                        return Err(ParseError::InvalidHeaderCharacter);
                    }
                }
                State::HeaderKey => match c {
                    b':' => {
                        if self.header_key.is_empty() {
                            let raw =
                                str_slice(data, start, i, ParseError::InvalidHeaderCharacter)?;
                            self.header_key = canonical_header_name(raw);
                        }
                        start = i + 1;
                        self.state = State::HeaderValueBefore;
                    }
                    b' ' => {
                        // key frozen here; only spaces may follow before ':'
                        if self.header_key.is_empty() {
                            let raw =
                                str_slice(data, start, i, ParseError::InvalidHeaderCharacter)?;
                            self.header_key = canonical_header_name(raw);
                        }
                    }
                    _ if chars::is_token(c) => {
                        if !self.header_key.is_empty() {
                            return Err(ParseError::InvalidHeaderCharacter);
                        }
                    }
                    _ => return Err(ParseError::InvalidHeaderCharacter),
                },
                State::HeaderValueBefore => {
                    if c == b' ' {
                        start = i + 1;
                    } else if c == b'\r' {
                        self.finish_header("");
                        start = i + 1;
                        self.state = State::HeaderValueLf;
                    } else {
                        start = i;
                        self.state = State::HeaderValue;
                    }
                }
                State::HeaderValue => {
                    if c == b'\r' {
                        let value = str_slice(data, start, i, ParseError::InvalidHeaderCharacter)?;
                        self.finish_header(value);
                        start = i + 1;
                        self.state = State::HeaderValueLf;
                    }
                }
                State::HeaderValueLf => {
                    if c != b'\n' {
                        return Err(ParseError::LfExpected);
                    }
                    start = i + 1;
                    self.state = State::HeaderKeyBefore;
                }
                State::HeaderOverLf => {
                    if c != b'\n' {
                        return Err(ParseError::LfExpected);
                    }
                    start = i + 1;

                    let framing = match self.framing.analyze() {
                        Ok(framing) => framing,
                        Err(err) => {
                            log::debug!("rejecting message: {err}");
                            return Err(err);
                        }
                    };
                    self.chunked = framing.chunked;
                    self.content_length = framing.content_length;
                    self.expected_trailers = framing.expected_trailers;
                    self.processor.on_content_length(self.content_length);

                    if self.chunked {
                        self.chunk_size = -1;
                        self.state = State::BodyChunkSizeBefore;
                    } else if self.content_length > 0 {
                        self.state = State::BodyContentLength;
                    } else {
                        // no body: absent Content-Length means an empty one
                        self.complete();
                    }
                }

                // ---- fixed-length body -------------------------------------------
                State::BodyContentLength => {
                    let needed = self.content_length as usize;
                    if data.len() - start < needed {
                        return self.stash(&data[start..]);
                    }
                    self.processor.on_body(&data[start..start + needed]);
                    start += needed;
                    self.complete();
                    i = start;
                    continue;
                }

                // ---- chunked body ------------------------------------------------
                State::BodyChunkSizeBefore => {
                    if !chars::is_hex(c) {
                        return Err(ParseError::InvalidChunkSize);
                    }
                    start = i;
                    self.chunk_size = -1;
                    self.state = State::BodyChunkSize;
                }
                State::BodyChunkSize => {
                    if !chars::is_hex(c) {
                        if self.chunk_size < 0 {
                            let digits =
                                str_slice(data, start, i, ParseError::InvalidChunkSize)?;
                            self.chunk_size = i64::from_str_radix(digits, 16)
                                .map_err(|_| ParseError::InvalidChunkSize)?;
                        }
                        if c == b'\r' {
                            start = i + 1;
                            self.state = State::BodyChunkSizeLf;
                        }
                        // anything else between the size and CR is a chunk
                        // extension and is ignored
                    }
                }
                State::BodyChunkSizeLf => {
                    if c != b'\n' {
                        return Err(ParseError::LfExpected);
                    }
                    start = i + 1;
                    if self.chunk_size > 0 {
                        self.state = State::BodyChunkData;
                    } else if self.expected_trailers.is_empty() {
                        self.state = State::TailCr;
                    } else {
                        self.state = State::TrailerKeyBefore;
                    }
                }
                State::BodyChunkData => {
                    let needed = self.chunk_size as usize;
                    if data.len() - start < needed {
                        return self.stash(&data[start..]);
                    }
                    self.processor.on_body(&data[start..start + needed]);
                    start += needed;
                    self.state = State::BodyChunkDataCr;
                    i = start;
                    continue;
                }
                State::BodyChunkDataCr => {
                    if c != b'\r' {
                        return Err(ParseError::CrExpected);
                    }
                    start = i + 1;
                    self.state = State::BodyChunkDataLf;
                }
                State::BodyChunkDataLf => {
                    if c != b'\n' {
                        return Err(ParseError::LfExpected);
                    }
                    start = i + 1;
                    self.chunk_size = -1;
                    self.state = State::BodyChunkSizeBefore;
                }

                // ---- trailer section ---------------------------------------------
                State::TrailerKeyBefore => {
                    if c == b' ' {
                        start = i + 1;
                    } else if c == b'\r' {
                        if !self.expected_trailers.is_empty() {
                            return Err(ParseError::TrailerExpected);
                        }
                        start = i + 1;
                        self.state = State::TailLf;
                    } else if chars::is_token(c) {
                        start = i;
                        self.state = State::TrailerKey;
                    } else {
                        return Err(ParseError::InvalidHeaderCharacter);
                    }
                }
                State::TrailerKey => match c {
                    b':' => {
                        if self.header_key.is_empty() {
                            let raw =
                                str_slice(data, start, i, ParseError::InvalidHeaderCharacter)?;
                            self.header_key = canonical_header_name(raw);
                        }
                        start = i + 1;
                        self.state = State::TrailerValueBefore;
                    }
                    b' ' => {
                        if self.header_key.is_empty() {
                            let raw =
                                str_slice(data, start, i, ParseError::InvalidHeaderCharacter)?;
                            self.header_key = canonical_header_name(raw);
                        }
                    }
                    _ if chars::is_token(c) => {
                        if !self.header_key.is_empty() {
                            return Err(ParseError::InvalidHeaderCharacter);
                        }
                    }
                    _ => return Err(ParseError::InvalidHeaderCharacter),
                },
                State::TrailerValueBefore => {
                    if c == b' ' {
                        start = i + 1;
                    } else if c == b'\r' {
                        self.finish_trailer("")?;
                        start = i + 1;
                        self.state = State::TrailerValueLf;
                    } else {
                        start = i;
                        self.state = State::TrailerValue;
                    }
                }
                State::TrailerValue => {
                    if c == b'\r' {
                        let value = str_slice(data, start, i, ParseError::InvalidHeaderCharacter)?;
                        self.finish_trailer(value)?;
                        start = i + 1;
                        self.state = State::TrailerValueLf;
                    }
                }
                State::TrailerValueLf => {
                    if c != b'\n' {
                        return Err(ParseError::LfExpected);
                    }
                    start = i + 1;
                    self.state = State::TrailerKeyBefore;
                }

                // ---- closing CRLF ------------------------------------------------
                State::TailCr => {
                    if c != b'\r' {
                        return Err(ParseError::CrExpected);
                    }
                    start = i + 1;
                    self.state = State::TailLf;
                }
                State::TailLf => {
                    if c != b'\n' {
                        return Err(ParseError::LfExpected);
                    }
                    start = i + 1;
                    self.complete();
                }
            }
            i += 1;
        }

        self.stash(&data[start..])
    }

    // Emit one header, retaining it first if it decides framing. The key
    // scratch is already canonical.
    fn finish_header(&mut self, value: &str) {
        if FramingHeaders::is_framing_header(&self.header_key) {
            self.framing.retain(&self.header_key, value);
        }
        self.processor.on_header(&self.header_key, value);
        self.header_key.clear();
    }

    // Emit one trailer after checking it against the advertised set.
    fn finish_trailer(&mut self, value: &str) -> Result<(), ParseError> {
        if !self.expected_trailers.remove(&self.header_key) {
            return Err(ParseError::InvalidTrailer(self.header_key.clone()));
        }
        self.processor.on_trailer_header(&self.header_key, value);
        self.header_key.clear();
        Ok(())
    }

    // Message done: notify, reset per-message scratch, re-enter the role's
    // start state. The rest of the current delivery keeps parsing.
    fn complete(&mut self) {
        log::trace!("message complete ({:?} role)", self.role);
        self.processor.on_complete(self.peer_addr);
        self.header_key.clear();
        self.framing.clear();
        self.expected_trailers.clear();
        self.chunked = false;
        self.content_length = -1;
        self.chunk_size = -1;
        self.status_code = 0;
        self.state = self.role.start_state();
    }

    // Copy the unfinished tail of this delivery into the carry buffer.
    fn stash(&mut self, tail: &[u8]) -> Result<(), ParseError> {
        if tail.len() > self.config.max_read_size {
            return Err(ParseError::ReadLimitExceeded {
                limit: self.config.max_read_size,
            });
        }
        self.carry.clear();
        self.carry.extend_from_slice(tail);
        Ok(())
    }
}

fn str_slice<'a>(
    data: &'a [u8],
    start: usize,
    end: usize,
    err: ParseError,
) -> Result<&'a str, ParseError> {
    std::str::from_utf8(&data[start..end]).map_err(|_| err)
}
