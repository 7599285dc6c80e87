//! # cirrus-middleware
//!
//! Interceptors run by Cirrus client stubs around every remote call.
//!
//! This crate provides:
//! - `Interceptor` trait for request/response interception
//! - `TimeoutInterceptor` for enforcing deadlines
//! - `TracingInterceptor` for trace propagation (with `tracing` feature)

mod interceptor;
mod timeout;

#[cfg(feature = "tracing")]
mod tracing_middleware;

pub use interceptor::{Interceptor, InterceptorChain, InterceptorError};
pub use timeout::TimeoutInterceptor;

#[cfg(feature = "tracing")]
pub use tracing_middleware::TracingInterceptor;
