//! Trace propagation for remote calls.

use cirrus_core::{CirrusError, Context, RouteDescriptor, TraceId};

use crate::interceptor::{Interceptor, InterceptorError};

/// Interceptor that propagates trace context as HTTP headers.
///
/// This interceptor:
/// - Ensures each call has a trace ID
/// - Sends `x-trace-id`, `x-request-id` and `x-service` headers
/// - Logs failed calls with their route and trace ID
///
/// ## Example
///
/// ```rust,ignore
/// use cirrus_middleware::TracingInterceptor;
///
/// let interceptor = TracingInterceptor::new("inventory-ui");
/// ```
#[derive(Debug, Clone)]
pub struct TracingInterceptor {
    service_name: String,
}

impl TracingInterceptor {
    /// Create a tracing interceptor that reports as `service_name`.
    #[must_use]
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }
}

impl Interceptor for TracingInterceptor {
    fn intercept_request(
        &self,
        ctx: &mut Context,
        route: &RouteDescriptor,
    ) -> Result<(), InterceptorError> {
        let trace_id = ctx.trace_id_or_generate();
        let request_id = ctx.request_id;
        ctx.set_header("x-trace-id", trace_id.to_string());
        ctx.set_header("x-request-id", request_id.to_string());
        ctx.set_header("x-service", self.service_name.as_str());

        tracing::trace!(
            route = route.name(),
            method = %route.method(),
            trace_id = %trace_id,
            request_id,
            "issuing remote call"
        );
        Ok(())
    }

    fn on_error(&self, ctx: &Context, route: &RouteDescriptor, error: &CirrusError) {
        let trace_id = ctx
            .trace_id
            .as_ref()
            .map_or_else(|| "unknown".to_string(), ToString::to_string);

        tracing::error!(
            trace_id = %trace_id,
            request_id = ctx.request_id,
            route = route.name(),
            status = error.status(),
            error = %error,
            "remote call failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cirrus_core::{DefinitionBuilder, RouteDeclaration};

    fn route() -> RouteDescriptor {
        DefinitionBuilder::new("Traced")
            .route(RouteDeclaration::get("ping", "/ping"))
            .unwrap()
            .build()
            .routes()[0]
            .clone()
    }

    #[test]
    fn test_adds_trace_headers() {
        let interceptor = TracingInterceptor::new("test-service");
        let mut ctx = Context::new();

        interceptor.intercept_request(&mut ctx, &route()).unwrap();

        assert!(ctx.trace_id.is_some());
        assert_eq!(
            ctx.header("x-trace-id"),
            Some(ctx.trace_id.unwrap().to_string().as_str())
        );
        assert_eq!(ctx.header("x-service"), Some("test-service"));
        assert_eq!(
            ctx.header("x-request-id"),
            Some(ctx.request_id.to_string().as_str())
        );
    }

    #[test]
    fn test_preserves_existing_trace_id() {
        let interceptor = TracingInterceptor::new("test-service");
        let original = TraceId::from_u128(7);
        let mut ctx = Context::new().with_trace_id(original);

        interceptor.intercept_request(&mut ctx, &route()).unwrap();

        assert_eq!(ctx.trace_id, Some(original));
        assert_eq!(ctx.header("x-trace-id"), Some(original.to_string().as_str()));
    }
}
