//! # cirrus-client
//!
//! Client stub synthesis for Cirrus contracts.
//!
//! Both synthesizers turn an [`InterfaceDefinition`](cirrus_core::InterfaceDefinition)
//! into an [`Implementation`](cirrus_core::Implementation) whose members issue
//! HTTP requests:
//! - [`make_client`] produces suspending stubs (`AsyncHandler`), usable on
//!   native targets and in the browser
//! - [`make_blocking_client`] produces blocking stubs (`BlockingHandler`),
//!   native targets only
//!
//! Both share one request pipeline: resolve the path, move the remaining
//! parameters into the query or body, run interceptors, send, check the
//! status, parse JSON and apply the route's response codec.

mod config;
mod request;
mod suspending;

#[cfg(not(target_arch = "wasm32"))]
mod blocking;

pub use config::ClientConfig;
pub use request::PreparedRequest;
pub use suspending::{make_client, make_client_with};

#[cfg(not(target_arch = "wasm32"))]
pub use blocking::{make_blocking_client, make_blocking_client_with};
