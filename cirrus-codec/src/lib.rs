//! # cirrus-codec
//!
//! Encoding helpers shared by every Cirrus client and server.
//!
//! This crate provides:
//! - `text` - the string form of bound values and path-segment escaping
//! - `json` - lenient JSON decoding and body parsing
//! - `ResponseCodec` - the per-route response decoder chosen at declaration time
//!
//! ## Value text form
//!
//! ```text
//! "abc"        -> abc
//! 42           -> 42
//! true         -> true
//! [1, 2]       -> [1,2]
//! ```
//!
//! Path placeholders are substituted with the text form, percent-encoded as a
//! single path segment.

mod error;
pub mod json;
mod response;
pub mod text;

pub use error::CodecError;
pub use response::ResponseCodec;

// Re-export for convenience
pub use serde_json::Value;
