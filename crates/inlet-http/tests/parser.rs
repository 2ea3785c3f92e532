//! End-to-end parser tests over recorded callback sequences.
//!
//! Covers both grammars (request and response), both body framings, trailer
//! validation, split invariance under arbitrary fragmentation, and pipelined
//! messages on one stream.

use std::net::SocketAddr;

use inlet_http::{ParseError, Parser, ParserConfig, Processor, Role, ServerProcessor};
use proptest::prelude::*;

// ============================================================================
// Recording processor
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Method(String),
    Url(String),
    Proto(String),
    Status(u16, String),
    Header(String, String),
    ContentLength(i64),
    Body(Vec<u8>),
    TrailerHeader(String, String),
    Complete,
}

#[derive(Debug, Default)]
struct Recorder {
    events: Vec<Event>,
}

impl Processor for Recorder {
    fn on_method(&mut self, method: &str) {
        self.events.push(Event::Method(method.to_string()));
    }

    fn on_url(&mut self, uri: &str) -> Result<(), ParseError> {
        self.events.push(Event::Url(uri.to_string()));
        Ok(())
    }

    fn on_proto(&mut self, proto: &str) -> Result<(), ParseError> {
        self.events.push(Event::Proto(proto.to_string()));
        Ok(())
    }

    fn on_status(&mut self, code: u16, reason: &str) {
        self.events.push(Event::Status(code, reason.to_string()));
    }

    fn on_header(&mut self, name: &str, value: &str) {
        self.events
            .push(Event::Header(name.to_string(), value.to_string()));
    }

    fn on_content_length(&mut self, content_length: i64) {
        self.events.push(Event::ContentLength(content_length));
    }

    fn on_body(&mut self, data: &[u8]) {
        self.events.push(Event::Body(data.to_vec()));
    }

    fn on_trailer_header(&mut self, name: &str, value: &str) {
        self.events
            .push(Event::TrailerHeader(name.to_string(), value.to_string()));
    }

    fn on_complete(&mut self, _peer: Option<SocketAddr>) {
        self.events.push(Event::Complete);
    }
}

fn header(name: &str, value: &str) -> Event {
    Event::Header(name.to_string(), value.to_string())
}

/// Feed the whole input in one call and return the recorded events.
fn record(role: Role, input: &[u8]) -> Vec<Event> {
    let mut parser = Parser::new(role, Recorder::default());
    parser.feed(input).expect("valid input");
    parser.into_processor().events
}

/// Feed the input split at the given boundaries and return the events.
fn record_split(role: Role, input: &[u8], mut cuts: Vec<usize>) -> Vec<Event> {
    cuts.sort_unstable();
    cuts.push(input.len());

    let mut parser = Parser::new(role, Recorder::default());
    let mut from = 0;
    for cut in cuts {
        let cut = cut.min(input.len());
        parser.feed(&input[from..cut]).expect("valid input");
        from = cut;
    }
    parser.into_processor().events
}

/// Feed one byte per call and return the events.
fn record_bytewise(role: Role, input: &[u8]) -> Vec<Event> {
    let mut parser = Parser::new(role, Recorder::default());
    for byte in input {
        parser.feed(std::slice::from_ref(byte)).expect("valid input");
    }
    parser.into_processor().events
}

fn fail(role: Role, input: &[u8]) -> ParseError {
    let mut parser = Parser::new(role, Recorder::default());
    parser.feed(input).expect_err("input must be rejected")
}

// ============================================================================
// Request scenarios
// ============================================================================

#[test]
fn server_content_length_empty_body() {
    let input =
        b"POST /echo HTTP/1.1\r\nHost: h\r\nConnection: close\r\nContent-Length: 0\r\n\r\n";

    let events = record(Role::Server, input);
    assert_eq!(
        events,
        vec![
            Event::Method("POST".to_string()),
            Event::Url("/echo".to_string()),
            Event::Proto("HTTP/1.1".to_string()),
            header("Host", "h"),
            header("Connection", "close"),
            header("Content-Length", "0"),
            Event::ContentLength(0),
            Event::Complete,
        ]
    );
}

#[test]
fn server_content_length_with_body() {
    let input = b"POST /echo HTTP/1.1\r\nHost: h\r\nContent-Length: 5\r\n\r\nhello";

    let events = record(Role::Server, input);
    assert_eq!(
        events,
        vec![
            Event::Method("POST".to_string()),
            Event::Url("/echo".to_string()),
            Event::Proto("HTTP/1.1".to_string()),
            header("Host", "h"),
            header("Content-Length", "5"),
            Event::ContentLength(5),
            Event::Body(b"hello".to_vec()),
            Event::Complete,
        ]
    );
}

#[test]
fn server_chunked_without_trailers() {
    let input =
        b"POST / HTTP/1.1\r\nHost: h\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nbody\r\n0\r\n\r\n";

    let events = record(Role::Server, input);
    assert_eq!(
        events,
        vec![
            Event::Method("POST".to_string()),
            Event::Url("/".to_string()),
            Event::Proto("HTTP/1.1".to_string()),
            header("Host", "h"),
            header("Transfer-Encoding", "chunked"),
            Event::ContentLength(-1),
            Event::Body(b"body".to_vec()),
            Event::Complete,
        ]
    );
}

#[test]
fn server_chunked_with_trailers() {
    let input = b"POST / HTTP/1.1\r\nHost: h\r\nTransfer-Encoding: chunked\r\nTrailer: Md5,Size\r\n\r\n4\r\nbody\r\n0\r\nMd5: abc\r\nSize: 4\r\n\r\n";

    let events = record(Role::Server, input);
    assert_eq!(
        events,
        vec![
            Event::Method("POST".to_string()),
            Event::Url("/".to_string()),
            Event::Proto("HTTP/1.1".to_string()),
            header("Host", "h"),
            header("Transfer-Encoding", "chunked"),
            header("Trailer", "Md5,Size"),
            Event::ContentLength(-1),
            Event::Body(b"body".to_vec()),
            Event::TrailerHeader("Md5".to_string(), "abc".to_string()),
            Event::TrailerHeader("Size".to_string(), "4".to_string()),
            Event::Complete,
        ]
    );
}

#[test]
fn server_multiple_chunks_emit_separate_fragments() {
    let input = b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n6\r\n world\r\n0\r\n\r\n";

    let events = record(Role::Server, input);
    let bodies: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            Event::Body(data) => Some(data.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(bodies, vec![b"hello".to_vec(), b" world".to_vec()]);
    assert_eq!(events.last(), Some(&Event::Complete));
}

#[test]
fn header_names_are_canonicalized() {
    let input = b"GET / HTTP/1.1\r\ncontent-type: text/plain\r\nX-REQUEST-ID: 7\r\n\r\n";

    let events = record(Role::Server, input);
    assert!(events.contains(&header("Content-Type", "text/plain")));
    assert!(events.contains(&header("X-Request-Id", "7")));
}

#[test]
fn header_value_keeps_inner_and_trailing_spaces() {
    let input = b"GET / HTTP/1.1\r\nUser-Agent: curl/8 (x86_64 linux)\r\nConnection: close \r\n\r\n";

    let events = record(Role::Server, input);
    assert!(events.contains(&header("User-Agent", "curl/8 (x86_64 linux)")));
    assert!(events.contains(&header("Connection", "close ")));
}

#[test]
fn header_with_space_before_colon() {
    // Key freezes at the space; the colon still routes to the value.
    let input = b"GET / HTTP/1.1\r\nContent-Length :  0\r\n\r\n";

    let events = record(Role::Server, input);
    assert!(events.contains(&header("Content-Length", "0")));
    assert!(events.contains(&Event::ContentLength(0)));
}

#[test]
fn header_with_empty_value() {
    let input = b"GET / HTTP/1.1\r\nX-Empty:\r\nX-Spaces:   \r\n\r\n";

    let events = record(Role::Server, input);
    assert!(events.contains(&header("X-Empty", "")));
    assert!(events.contains(&header("X-Spaces", "")));
}

// ============================================================================
// Response scenarios
// ============================================================================

#[test]
fn client_status_line_empty_body() {
    let input = b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n";

    let events = record(Role::Client, input);
    assert_eq!(
        events,
        vec![
            Event::Proto("HTTP/1.1".to_string()),
            Event::Status(200, "OK".to_string()),
            header("Content-Length", "0"),
            Event::ContentLength(0),
            Event::Complete,
        ]
    );
}

#[test]
fn client_reason_phrase_with_spaces() {
    let input = b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n";

    let events = record(Role::Client, input);
    assert!(events.contains(&Event::Status(404, "Not Found".to_string())));
}

#[test]
fn client_chunked_response() {
    let input =
        b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\nb\r\nhello world\r\n0\r\n\r\n";

    let events = record(Role::Client, input);
    assert!(events.contains(&Event::Body(b"hello world".to_vec())));
    assert_eq!(events.last(), Some(&Event::Complete));
}

// ============================================================================
// Split invariance
// ============================================================================

const CHUNKED_REQUEST: &[u8] =
    b"POST / HTTP/1.1\r\nHost: h\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nbody\r\n0\r\n\r\n";

const TRAILER_REQUEST: &[u8] = b"POST / HTTP/1.1\r\nHost: h\r\nTransfer-Encoding: chunked\r\nTrailer: Md5,Size\r\n\r\n4\r\nbody\r\n0\r\nMd5: abc\r\nSize: 4\r\n\r\n";

const RESPONSE: &[u8] =
    b"HTTP/1.1 200 OK\r\nHost: h\r\nContent-Length: 5\r\n\r\nhello";

#[test]
fn byte_at_a_time_matches_whole_feed() {
    for (role, input) in [
        (Role::Server, CHUNKED_REQUEST),
        (Role::Server, TRAILER_REQUEST),
        (Role::Client, RESPONSE),
    ] {
        let whole = record(role, input);
        let bytewise = record_bytewise(role, input);
        assert_eq!(whole, bytewise);
    }
}

#[test]
fn split_at_every_position_matches_whole_feed() {
    let whole = record(Role::Server, TRAILER_REQUEST);
    for cut in 0..=TRAILER_REQUEST.len() {
        let split = record_split(Role::Server, TRAILER_REQUEST, vec![cut]);
        assert_eq!(whole, split, "cut at {cut}");
    }
}

proptest! {
    #[test]
    fn split_invariance_under_random_fragmentation(
        cuts in prop::collection::vec(0..TRAILER_REQUEST.len(), 0..8)
    ) {
        let whole = record(Role::Server, TRAILER_REQUEST);
        let split = record_split(Role::Server, TRAILER_REQUEST, cuts);
        prop_assert_eq!(whole, split);
    }

    #[test]
    fn pipelined_pair_under_random_fragmentation(
        cuts in prop::collection::vec(0..2 * RESPONSE.len(), 0..8)
    ) {
        let mut doubled = RESPONSE.to_vec();
        doubled.extend_from_slice(RESPONSE);

        let whole = record(Role::Client, &doubled);
        let split = record_split(Role::Client, &doubled, cuts);
        prop_assert_eq!(whole, split);
    }
}

// ============================================================================
// Pipelining
// ============================================================================

#[test]
fn pipelined_messages_repeat_the_event_sequence() {
    let single = b"POST /echo HTTP/1.1\r\nHost: h\r\nContent-Length: 5\r\n\r\nhello";
    let mut doubled = single.to_vec();
    doubled.extend_from_slice(single);

    let one = record(Role::Server, single);
    let two = record(Role::Server, &doubled);

    assert_eq!(two.len(), 2 * one.len());
    assert_eq!(&two[..one.len()], &one[..]);
    assert_eq!(&two[one.len()..], &one[..]);
    assert_eq!(two.iter().filter(|&e| *e == Event::Complete).count(), 2);
}

#[test]
fn no_state_leaks_between_different_messages() {
    // A chunked message with trailers followed by a plain fixed-length one.
    let mut input = TRAILER_REQUEST.to_vec();
    input.extend_from_slice(b"PUT /next HTTP/1.1\r\nContent-Length: 2\r\n\r\nok");

    let events = record(Role::Server, &input);
    let tail = &events[events.iter().position(|e| *e == Event::Complete).unwrap() + 1..];
    assert_eq!(
        tail,
        vec![
            Event::Method("PUT".to_string()),
            Event::Url("/next".to_string()),
            Event::Proto("HTTP/1.1".to_string()),
            header("Content-Length", "2"),
            Event::ContentLength(2),
            Event::Body(b"ok".to_vec()),
            Event::Complete,
        ]
    );
}

#[test]
fn parser_returns_to_start_state_after_each_message() {
    let mut parser = Parser::new(Role::Server, Recorder::default());
    for _ in 0..3 {
        parser.feed(CHUNKED_REQUEST).unwrap();
        assert!(parser.at_message_boundary());
    }
    let completions = parser
        .into_processor()
        .events
        .iter()
        .filter(|&e| *e == Event::Complete)
        .count();
    assert_eq!(completions, 3);
}

// ============================================================================
// Framing and trailer errors
// ============================================================================

#[test]
fn both_framings_rejected() {
    let input = b"POST / HTTP/1.1\r\nContent-Length: 3\r\nTransfer-Encoding: chunked\r\n\r\n";
    assert_eq!(
        fail(Role::Server, input),
        ParseError::UnexpectedContentLength
    );
}

#[test]
fn unsupported_transfer_encoding_rejected() {
    let input = b"POST / HTTP/1.1\r\nTransfer-Encoding: gzip\r\n\r\n";
    assert_eq!(
        fail(Role::Server, input),
        ParseError::UnsupportedTransferEncoding("gzip".to_string())
    );
}

#[test]
fn repeated_transfer_encoding_rejected() {
    let input =
        b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\nTransfer-Encoding: chunked\r\n\r\n";
    assert_eq!(fail(Role::Server, input), ParseError::TooManyTransferEncodings);
}

#[test]
fn negative_content_length_rejected() {
    let input = b"POST / HTTP/1.1\r\nContent-Length: -5\r\n\r\n";
    assert_eq!(fail(Role::Server, input), ParseError::InvalidContentLength);
}

#[test]
fn framing_reserved_trailer_name_rejected() {
    let input =
        b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\nTrailer: Content-Length\r\n\r\n";
    assert_eq!(
        fail(Role::Server, input),
        ParseError::BadTrailerKey("Content-Length".to_string())
    );
}

#[test]
fn missing_advertised_trailer_rejected() {
    let input = b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\nTrailer: Md5,Size\r\n\r\n0\r\nMd5: abc\r\n\r\n";
    assert_eq!(fail(Role::Server, input), ParseError::TrailerExpected);
}

#[test]
fn unadvertised_trailer_rejected() {
    let input = b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\nTrailer: Md5\r\n\r\n0\r\nSize: 4\r\n\r\n";
    assert_eq!(
        fail(Role::Server, input),
        ParseError::InvalidTrailer("Size".to_string())
    );
}

#[test]
fn trailer_after_unadvertised_section_rejected() {
    // Without a Trailer header the last chunk is followed by the bare CRLF.
    let input =
        b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n0\r\nMd5: abc\r\n\r\n";
    assert_eq!(fail(Role::Server, input), ParseError::CrExpected);
}

// ============================================================================
// Consumer-surfaced errors
// ============================================================================

struct RejectingUrl;

impl Processor for RejectingUrl {
    fn on_url(&mut self, _uri: &str) -> Result<(), ParseError> {
        Err(ParseError::InvalidRequestUri)
    }
}

#[test]
fn consumer_url_error_propagates() {
    let mut parser = Parser::new(Role::Server, RejectingUrl);
    assert_eq!(
        parser.feed(b"GET /anything HTTP/1.1\r\n\r\n"),
        Err(ParseError::InvalidRequestUri)
    );
}

#[test]
fn server_processor_rejects_control_bytes_in_uri() {
    let mut parser = Parser::new(Role::Server, ServerProcessor::new(|_| {}));
    assert_eq!(
        parser.feed(b"GET /a\x01b HTTP/1.1\r\n\r\n"),
        Err(ParseError::InvalidRequestUri)
    );
}

// ============================================================================
// Resource limits
// ============================================================================

#[test]
fn read_limit_caps_buffered_body() {
    let config = ParserConfig::default().with_max_read_size(8);
    let mut parser = Parser::with_config(Role::Server, Recorder::default(), config);

    parser
        .feed(b"POST / HTTP/1.1\r\nContent-Length: 64\r\n\r\n")
        .unwrap();
    let result = parser.feed(b"0123456789abcdef");
    assert_eq!(result, Err(ParseError::ReadLimitExceeded { limit: 8 }));
}
