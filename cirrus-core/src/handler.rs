//! Callables stored in an implementation's member map.
//!
//! Async handlers back both server routes and suspending client stubs. On
//! `wasm32` their futures are not required to be `Send`, since browser
//! runtimes are single threaded and their HTTP futures are `!Send`.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;

use crate::args::Arguments;
use crate::error::CirrusError;

/// Result of invoking a handler.
pub type HandlerResult = Result<Value, CirrusError>;

/// Boxed future returned by an [`AsyncHandler`].
#[cfg(not(target_arch = "wasm32"))]
pub type HandlerFuture = futures::future::BoxFuture<'static, HandlerResult>;

/// Boxed future returned by an [`AsyncHandler`].
#[cfg(target_arch = "wasm32")]
pub type HandlerFuture = futures::future::LocalBoxFuture<'static, HandlerResult>;

#[cfg(not(target_arch = "wasm32"))]
type AsyncFn = dyn Fn(Arguments) -> HandlerFuture + Send + Sync;

#[cfg(target_arch = "wasm32")]
type AsyncFn = dyn Fn(Arguments) -> HandlerFuture;

/// A callable that suspends until its result is ready.
#[derive(Clone)]
pub struct AsyncHandler(Arc<AsyncFn>);

impl AsyncHandler {
    /// Wrap an async function of bound arguments.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self(Arc::new(move |args| f(args).boxed()))
    }

    /// Wrap an async function of bound arguments.
    #[cfg(target_arch = "wasm32")]
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Arguments) -> Fut + 'static,
        Fut: Future<Output = HandlerResult> + 'static,
    {
        Self(Arc::new(move |args| f(args).boxed_local()))
    }

    /// Invoke the handler.
    pub fn call(&self, args: Arguments) -> HandlerFuture {
        (self.0)(args)
    }
}

impl fmt::Debug for AsyncHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AsyncHandler")
    }
}

/// A callable that occupies the calling thread until its result is ready.
#[derive(Clone)]
pub struct BlockingHandler(Arc<dyn Fn(Arguments) -> HandlerResult + Send + Sync>);

impl BlockingHandler {
    /// Wrap a function of bound arguments.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Arguments) -> HandlerResult + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Invoke the handler.
    pub fn call(&self, args: Arguments) -> HandlerResult {
        (self.0)(args)
    }
}

impl fmt::Debug for BlockingHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BlockingHandler")
    }
}
