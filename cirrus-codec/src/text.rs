//! String form of bound values and path-segment escaping.

use std::borrow::Cow;

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use serde_json::Value;

use crate::error::CodecError;

/// Characters escaped inside a single path segment.
///
/// Everything outside RFC 3986 `pchar` is escaped, plus `/` so a value can
/// never introduce extra segments. Dot segments cannot be escaped; callers
/// reject `.` and `..` before substituting.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Render a bound value as text.
///
/// Strings are used verbatim (no quotes); every other value uses its compact
/// JSON form.
#[must_use]
pub fn value_to_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}

/// Percent-encode text for use as one path segment.
#[must_use]
pub fn escape_segment(text: &str) -> String {
    utf8_percent_encode(text, PATH_SEGMENT).to_string()
}

/// Decode a percent-encoded path segment.
pub fn unescape_segment(segment: &str) -> Result<String, CodecError> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|e| CodecError::InvalidSegment(e.to_string()))
}
