//! JSON conversion helpers.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::CodecError;

/// Convert a value to JSON.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Value, CodecError> {
    serde_json::to_value(value).map_err(|e| CodecError::Encode(e.to_string()))
}

/// Convert JSON to a concrete type.
///
/// Values that travelled as text (path segments, query strings) arrive as
/// JSON strings. When direct decoding fails and the value is a string, the
/// string is parsed as JSON and decoding is retried, so `"42"` decodes into
/// an integer while `"42"` still decodes into a `String` unchanged.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, CodecError> {
    let text = match &value {
        Value::String(s) => Some(s.clone()),
        _ => None,
    };

    match serde_json::from_value(value) {
        Ok(decoded) => Ok(decoded),
        Err(err) => match text {
            Some(text) => {
                serde_json::from_str(&text).map_err(|_| CodecError::Decode(err.to_string()))
            }
            None => Err(CodecError::Decode(err.to_string())),
        },
    }
}

/// Parse an HTTP body as JSON.
///
/// An empty (or all-whitespace) body parses as `null`.
pub fn parse_body(body: &[u8]) -> Result<Value, CodecError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|e| CodecError::InvalidBody(e.to_string()))
}
