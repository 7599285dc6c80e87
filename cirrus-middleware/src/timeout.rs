//! Deadline enforcement for remote calls.

use std::time::{Duration, Instant};

use cirrus_core::{Context, RouteDescriptor};

use crate::interceptor::{Interceptor, InterceptorError};

/// Interceptor that gives every call a deadline.
///
/// Calls without a deadline get the default one. Calls whose deadline lies
/// beyond the maximum are clamped, and calls that already expired are
/// rejected before anything is sent. Relies on `Instant`, so it is meant for
/// native clients.
///
/// ## Example
///
/// ```rust
/// use cirrus_middleware::TimeoutInterceptor;
/// use std::time::Duration;
///
/// let interceptor = TimeoutInterceptor::new(Duration::from_secs(10))
///     .with_max(Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct TimeoutInterceptor {
    default_timeout: Duration,
    max_timeout: Option<Duration>,
}

impl TimeoutInterceptor {
    /// Create a timeout interceptor with the given default timeout.
    #[must_use]
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            default_timeout,
            max_timeout: None,
        }
    }

    /// Clamp longer deadlines to `max_timeout` from now.
    #[must_use]
    pub fn with_max(mut self, max_timeout: Duration) -> Self {
        self.max_timeout = Some(max_timeout);
        self
    }
}

impl Interceptor for TimeoutInterceptor {
    fn intercept_request(
        &self,
        ctx: &mut Context,
        route: &RouteDescriptor,
    ) -> Result<(), InterceptorError> {
        let now = Instant::now();

        ctx.deadline = match (ctx.deadline, self.max_timeout) {
            (Some(deadline), Some(max)) => Some(deadline.min(now + max)),
            (Some(deadline), None) => Some(deadline),
            (None, _) => Some(now + self.default_timeout),
        };

        if ctx.is_expired() {
            return Err(InterceptorError::Rejected(format!(
                "deadline for `{}` already passed",
                route.name()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cirrus_core::{DefinitionBuilder, RouteDeclaration};

    fn route() -> RouteDescriptor {
        DefinitionBuilder::new("Slow")
            .route(RouteDeclaration::get("slow", "/slow"))
            .unwrap()
            .build()
            .routes()[0]
            .clone()
    }

    #[test]
    fn test_sets_default_deadline() {
        let interceptor = TimeoutInterceptor::new(Duration::from_secs(30));
        let mut ctx = Context::new();

        interceptor.intercept_request(&mut ctx, &route()).unwrap();

        assert!(ctx.deadline.is_some());
        assert!(ctx.remaining().unwrap() <= Duration::from_secs(30));
    }

    #[test]
    fn test_preserves_existing_deadline() {
        let interceptor = TimeoutInterceptor::new(Duration::from_secs(30));
        let original = Instant::now() + Duration::from_secs(10);
        let mut ctx = Context::new().with_deadline(original);

        interceptor.intercept_request(&mut ctx, &route()).unwrap();

        assert_eq!(ctx.deadline, Some(original));
    }

    #[test]
    fn test_enforces_max_deadline() {
        let interceptor =
            TimeoutInterceptor::new(Duration::from_secs(30)).with_max(Duration::from_secs(5));
        let mut ctx = Context::new().with_timeout(Duration::from_secs(100));

        interceptor.intercept_request(&mut ctx, &route()).unwrap();

        assert!(ctx.remaining().unwrap() <= Duration::from_secs(5));
    }

    #[test]
    fn test_rejects_expired() {
        let interceptor = TimeoutInterceptor::new(Duration::from_secs(30));
        let mut ctx = Context::new().with_deadline(Instant::now() - Duration::from_secs(1));

        let result = interceptor.intercept_request(&mut ctx, &route());
        assert!(matches!(result, Err(InterceptorError::Rejected(_))));
    }
}
