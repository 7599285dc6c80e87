//! # cirrus-server
//!
//! Serving Cirrus implementations over HTTP with axum.
//!
//! This crate provides:
//! - `make_server_router` to bind a validated implementation to an axum `Router`
//! - `BoundRouter`, the bound routes plus the router serving them
//! - `CirrusServer` to mount the API and an optional manifest and run them

mod binder;
mod handler;
mod manifest;
mod serve;

pub use binder::{BoundRouter, RouteEntry, make_server_router};
pub use manifest::manifest_router;
pub use serve::{CirrusServer, ServerConfig};
