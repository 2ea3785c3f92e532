//! Core message types for the inlet HTTP/1.x parser.
//!
//! This crate provides the fundamental building blocks shared by the parser
//! and its consumers:
//! - [`Method`], [`HttpVersion`] and [`Headers`]
//! - [`Request`] and [`Response`] message types
//! - [`BodyReader`], a read-once queue of body fragments
//!
//! # Design Principles
//!
//! - No I/O: everything here is plain data assembled by a consumer
//! - Header names are stored in canonical title-case form
//! - All types support `Send`

#![forbid(unsafe_code)]
// Pedantic clippy lints allowed (style suggestions, not correctness issues)
#![allow(clippy::must_use_candidate)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::module_name_repetitions)]

mod body;
mod headers;
mod request;
mod response;

pub use body::BodyReader;
pub use headers::{canonical_header_name, Headers};
pub use request::{parse_http_version, HttpVersion, Method, Request};
pub use response::Response;
