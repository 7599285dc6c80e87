//! Interceptor trait and chain implementation.

use std::sync::Arc;

use cirrus_core::{CirrusError, Context, RouteDescriptor};
use serde_json::Value;

/// Error type for interceptor operations.
#[derive(Debug, thiserror::Error)]
pub enum InterceptorError {
    /// Request was rejected by the interceptor.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// Interceptor internal error.
    #[error("interceptor error: {0}")]
    Internal(String),
}

impl From<InterceptorError> for CirrusError {
    fn from(err: InterceptorError) -> Self {
        match err {
            InterceptorError::Rejected(reason) => CirrusError::Rejected(reason),
            InterceptorError::Internal(reason) => {
                CirrusError::Rejected(format!("interceptor error: {reason}"))
            }
        }
    }
}

/// Trait for intercepting remote calls made by client stubs.
///
/// Interceptors can add headers through the context metadata, shorten the
/// deadline, rewrite parsed responses, or reject a call before it is sent.
///
/// ## Example
///
/// ```rust
/// use cirrus_middleware::{Interceptor, InterceptorError};
/// use cirrus_core::{Context, RouteDescriptor};
///
/// struct AuthInterceptor {
///     api_key: String,
/// }
///
/// impl Interceptor for AuthInterceptor {
///     fn intercept_request(
///         &self,
///         ctx: &mut Context,
///         _route: &RouteDescriptor,
///     ) -> Result<(), InterceptorError> {
///         ctx.set_header("authorization", self.api_key.as_str());
///         Ok(())
///     }
/// }
/// ```
pub trait Interceptor: Send + Sync + 'static {
    /// Intercept an outgoing call.
    ///
    /// Runs after the path and query are resolved and before the request is
    /// sent.
    fn intercept_request(
        &self,
        ctx: &mut Context,
        route: &RouteDescriptor,
    ) -> Result<(), InterceptorError> {
        let _ = (ctx, route);
        Ok(())
    }

    /// Intercept a parsed response before it is returned to the caller.
    fn intercept_response(
        &self,
        ctx: &Context,
        route: &RouteDescriptor,
        response: &mut Value,
    ) -> Result<(), InterceptorError> {
        let _ = (ctx, route, response);
        Ok(())
    }

    /// Called when a call fails.
    fn on_error(&self, ctx: &Context, route: &RouteDescriptor, error: &CirrusError) {
        let _ = (ctx, route, error);
    }
}

/// A chain of interceptors.
///
/// Interceptors are executed in order for requests (first to last)
/// and in reverse order for responses (last to first).
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    /// Create a new empty interceptor chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an interceptor to the chain.
    #[must_use]
    pub fn with(mut self, interceptor: impl Interceptor) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Add a shared interceptor to the chain.
    #[must_use]
    pub fn with_shared(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Process a request through all interceptors.
    pub fn intercept_request(
        &self,
        ctx: &mut Context,
        route: &RouteDescriptor,
    ) -> Result<(), InterceptorError> {
        for interceptor in &self.interceptors {
            interceptor.intercept_request(ctx, route)?;
        }
        Ok(())
    }

    /// Process a response through all interceptors (in reverse order).
    pub fn intercept_response(
        &self,
        ctx: &Context,
        route: &RouteDescriptor,
        response: &mut Value,
    ) -> Result<(), InterceptorError> {
        for interceptor in self.interceptors.iter().rev() {
            interceptor.intercept_response(ctx, route, response)?;
        }
        Ok(())
    }

    /// Notify all interceptors of an error.
    pub fn on_error(&self, ctx: &Context, route: &RouteDescriptor, error: &CirrusError) {
        for interceptor in &self.interceptors {
            interceptor.on_error(ctx, route, error);
        }
    }

    /// Check if the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Get the number of interceptors in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }
}

impl std::fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("len", &self.interceptors.len())
            .finish()
    }
}
