//! Path templates with `{name}` placeholders.

use cirrus_codec::text::{escape_segment, unescape_segment, value_to_text};

use crate::args::Arguments;
use crate::error::CirrusError;

/// One piece of a parsed path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text, copied as is.
    Literal(String),
    /// A `{name}` placeholder.
    Placeholder(String),
}

/// Error returned for malformed path templates.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathTemplateError {
    /// The template does not start with `/`.
    #[error("path must start with `/`: {0}")]
    NotAbsolute(String),

    /// A `{` has no closing `}` or a `}` has no opening `{`.
    #[error("unbalanced braces in path: {0}")]
    UnbalancedBraces(String),

    /// A placeholder name is not an identifier.
    #[error("invalid placeholder name `{0}`")]
    InvalidPlaceholder(String),

    /// The same placeholder appears twice.
    #[error("placeholder `{0}` appears more than once")]
    DuplicatePlaceholder(String),

    /// A placeholder is glued to other text inside one segment.
    #[error("placeholder `{0}` must fill a whole path segment")]
    PartialSegment(String),
}

/// A parsed path template such as `/items/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parse a template.
    pub fn parse(raw: impl Into<String>) -> Result<Self, PathTemplateError> {
        let raw = raw.into();
        if !raw.starts_with('/') {
            return Err(PathTemplateError::NotAbsolute(raw));
        }

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = raw.char_indices();

        while let Some((start, c)) = chars.next() {
            match c {
                '{' => {
                    let name: String = chars.by_ref().map(|(_, c)| c).take_while(|c| *c != '}').collect();
                    let closed = raw[start + 1..].contains('}');
                    if !closed || name.contains('{') {
                        return Err(PathTemplateError::UnbalancedBraces(raw));
                    }
                    if !is_identifier(&name) {
                        return Err(PathTemplateError::InvalidPlaceholder(name));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(name));
                }
                '}' => return Err(PathTemplateError::UnbalancedBraces(raw)),
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        let template = Self { raw, segments };
        template.check_placeholders()?;
        Ok(template)
    }

    /// The template text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parsed segments in order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Placeholder names in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Whether the template uses the placeholder `name`.
    #[must_use]
    pub fn has_placeholder(&self, name: &str) -> bool {
        self.placeholders().any(|p| p == name)
    }

    /// The template with placeholder names erased, e.g. `/items/{}`.
    ///
    /// Two templates with the same shape match the same requests.
    #[must_use]
    pub fn shape(&self) -> String {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Literal(text) => text.as_str(),
                Segment::Placeholder(_) => "{}",
            })
            .collect()
    }

    /// Substitute bound arguments into the template.
    ///
    /// Each value is rendered in its text form and escaped as one path segment.
    /// Values that would render as an empty, `.` or `..` segment are refused,
    /// since URL normalization would drop or collapse them.
    pub fn resolve(&self, route: &str, args: &Arguments) -> Result<String, CirrusError> {
        let mut path = String::with_capacity(self.raw.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => path.push_str(text),
                Segment::Placeholder(name) => {
                    let value = args.get(name).ok_or_else(|| CirrusError::UnboundPathPlaceholder {
                        route: route.to_string(),
                        placeholder: name.clone(),
                    })?;
                    let text = value_to_text(value);
                    if matches!(text.as_ref(), "" | "." | "..") {
                        return Err(CirrusError::ArgumentBinding {
                            route: route.to_string(),
                            reason: format!(
                                "`{name}` renders as `{text}`, which is not a usable path segment"
                            ),
                        });
                    }
                    path.push_str(&escape_segment(&text));
                }
            }
        }
        Ok(path)
    }

    /// Match a concrete request path against the template.
    ///
    /// Returns the decoded placeholder values in template order, or `None`
    /// when the path does not fit.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<Vec<(String, String)>> {
        let mut rest = path;
        let mut values = Vec::new();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(text) => rest = rest.strip_prefix(text.as_str())?,
                Segment::Placeholder(name) => {
                    let end = match self.segments.get(i + 1) {
                        Some(Segment::Literal(_)) | None => rest.find('/').unwrap_or(rest.len()),
                        Some(Segment::Placeholder(_)) => return None,
                    };
                    let raw = &rest[..end];
                    if raw.is_empty() {
                        return None;
                    }
                    values.push((name.clone(), unescape_segment(raw).ok()?));
                    rest = &rest[end..];
                }
            }
        }

        rest.is_empty().then_some(values)
    }

    fn check_placeholders(&self) -> Result<(), PathTemplateError> {
        let mut seen: Vec<&str> = Vec::new();
        for (i, segment) in self.segments.iter().enumerate() {
            let Segment::Placeholder(name) = segment else {
                continue;
            };
            if seen.contains(&name.as_str()) {
                return Err(PathTemplateError::DuplicatePlaceholder(name.clone()));
            }
            seen.push(name);

            let after_slash = match i.checked_sub(1).map(|p| &self.segments[p]) {
                Some(Segment::Literal(text)) => text.ends_with('/'),
                _ => false,
            };
            let before_slash = match self.segments.get(i + 1) {
                Some(Segment::Literal(text)) => text.starts_with('/'),
                Some(Segment::Placeholder(_)) => false,
                None => true,
            };
            if !after_slash || !before_slash {
                return Err(PathTemplateError::PartialSegment(name.clone()));
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
