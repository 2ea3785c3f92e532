//! Incremental, non-blocking HTTP/1.x message parser.
//!
//! This crate parses HTTP/1.x request and response streams one delivered
//! byte slice at a time. The [`Parser`] owns all parse state, makes forward
//! progress on any input split (down to one byte per call) and never buffers
//! a whole message: as it crosses syntactic boundaries it drives a
//! [`Processor`] with the pieces (method, URL, protocol, status, headers,
//! body fragments, trailers, completion). Back-to-back messages on the same
//! stream are handled by re-entering the start state after each completion.
//!
//! # Example
//!
//! ```
//! use inlet_http::{Parser, Role, ServerProcessor};
//!
//! let mut requests = Vec::new();
//! let processor = ServerProcessor::new(|request| requests.push(request));
//! let mut parser = Parser::new(Role::Server, processor);
//!
//! // Deliver the stream in as many pieces as the transport produces.
//! parser.feed(b"POST /echo HTTP/1.1\r\nContent-Le").unwrap();
//! parser.feed(b"ngth: 5\r\n\r\nhello").unwrap();
//! # drop(parser);
//! assert_eq!(requests.len(), 1);
//! assert_eq!(requests[0].take_body().into_bytes(), b"hello");
//! ```
//!
//! Body fragments are passed to the processor by reference and are only
//! valid for the duration of the callback; processors that keep body bytes
//! must copy them (the bundled processors copy into an
//! [`inlet_core::BodyReader`]).
//!
//! Any validation failure is fatal for the stream: the parser surfaces the
//! error and the caller is expected to drop it and close the connection.

#![deny(unsafe_code)]
// Pedantic clippy lints allowed (style suggestions, not correctness issues)
#![allow(clippy::must_use_candidate)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]

pub mod chars;
mod error;
mod framing;
pub mod keepalive;
mod parser;
mod processor;

pub use error::ParseError;
pub use framing::{Framing, FramingHeaders};
pub use parser::{Parser, ParserConfig, Role, DEFAULT_MAX_READ_SIZE};
pub use processor::{ClientProcessor, NoopProcessor, Processor, ServerProcessor};
