//! Codec error type.

/// Errors raised while encoding or decoding values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// A value could not be converted to JSON.
    #[error("encode error: {0}")]
    Encode(String),

    /// A JSON value could not be converted to the requested type.
    #[error("decode error: {0}")]
    Decode(String),

    /// A request or response body is not valid JSON.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// A response did not conform to the route's declared model.
    #[error("response does not match model `{model}`: {reason}")]
    ModelMismatch {
        /// Rust type name of the declared model.
        model: &'static str,
        /// Underlying decode failure.
        reason: String,
    },

    /// A percent-encoded path segment is not valid UTF-8.
    #[error("invalid path segment: {0}")]
    InvalidSegment(String),
}
