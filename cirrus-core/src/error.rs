//! Error types for the Cirrus contract framework.

use std::time::Duration;

pub use cirrus_codec::CodecError;

/// Structural errors found while declaring, validating or binding contracts.
///
/// These indicate a mismatch between a definition and its users. They are
/// raised during startup and are never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractError {
    /// A route declaration breaks a method, body or path rule.
    #[error("invalid route declaration `{route}`: {reason}")]
    InvalidRouteDeclaration {
        /// Name of the offending route.
        route: String,
        /// What rule was broken.
        reason: String,
    },

    /// A path placeholder does not name any signature parameter.
    #[error("route `{route}` has path placeholder `{{{placeholder}}}` with no matching parameter")]
    UnboundPathPlaceholder {
        /// Name of the offending route.
        route: String,
        /// Placeholder name, without braces.
        placeholder: String,
    },

    /// A definition or implementation does not have the required base shape.
    #[error("`{subject}` violates the contract shape: {reason}")]
    ContractViolation {
        /// Name of the definition or implementation.
        subject: String,
        /// Description of the violation.
        reason: String,
        /// Violation found on the base, if this one was caused by it.
        #[source]
        source: Option<Box<ContractError>>,
    },

    /// An implementation leaves routes without a member.
    #[error("`{implementation}` is incomplete; missing routes: {}", .missing.join(", "))]
    IncompleteImplementation {
        /// Name of the implementation.
        implementation: String,
        /// Route names with no member.
        missing: Vec<String>,
    },

    /// A member with the route's name exists but is not marked as a route override.
    #[error(
        "`{implementation}` has a member named `{route}` that is not marked as a route override"
    )]
    MissingOverrideMarker {
        /// Name of the implementation.
        implementation: String,
        /// Route name.
        route: String,
    },
}

/// Transport-level errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// The configured base URL cannot be used.
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),

    /// The request could not be sent or its response could not be read.
    #[error("request failed: {0}")]
    Request(String),

    /// The request did not complete before its deadline.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// IO error from the underlying listener or socket.
    #[error("io error: {0}")]
    Io(std::sync::Arc<std::io::Error>),
}

impl From<std::io::Error> for TransportError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(std::sync::Arc::new(e))
    }
}

/// Main error type for calls made through a bound implementation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CirrusError {
    /// Structural contract error.
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// Call arguments do not fit the route's signature.
    #[error("cannot bind arguments for `{route}`: {reason}")]
    ArgumentBinding {
        /// Route name.
        route: String,
        /// What went wrong.
        reason: String,
    },

    /// A path placeholder had no bound argument at call time.
    #[error("path placeholder `{{{placeholder}}}` of `{route}` has no bound argument")]
    UnboundPathPlaceholder {
        /// Route name.
        route: String,
        /// Placeholder name, without braces.
        placeholder: String,
    },

    /// The remote side answered with a non-success status.
    #[error("remote call failed with status {status}: {body}")]
    RemoteCallFailure {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Codec error.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Error returned by service code behind a route.
    #[error("handler error [{status}]: {message}")]
    Handler {
        /// HTTP status to answer with.
        status: u16,
        /// Human-readable message.
        message: String,
    },

    /// An interceptor refused the call.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// No route with this name exists in the definition.
    #[error("route not found: {0}")]
    RouteNotFound(String),
}

impl CirrusError {
    /// Create a handler error with an HTTP status and message.
    #[must_use]
    pub fn handler(status: u16, message: impl Into<String>) -> Self {
        Self::Handler {
            status,
            message: message.into(),
        }
    }

    /// HTTP status carried by this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteCallFailure { status, .. } | Self::Handler { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if this error comes from a structural contract mismatch.
    #[must_use]
    pub fn is_contract_error(&self) -> bool {
        matches!(self, Self::Contract(_))
    }
}
