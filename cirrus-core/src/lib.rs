//! # cirrus-core
//!
//! Core types for the Cirrus HTTP contract framework.
//!
//! This crate provides:
//! - Error types (`ContractError`, `CirrusError`, `TransportError`)
//! - Route declarations, descriptors and path templates
//! - Interface definitions and the route registry
//! - Bound implementations and the contract validator
//! - Request context (`Context`)

mod args;
mod context;
mod definition;
mod error;
mod handler;
mod implementation;
mod method;
mod path;
mod route;
mod signature;
mod validate;

pub use args::{Arguments, CallArgs};
pub use context::{Context, Metadata, TraceId};
pub use definition::{ContractBase, DefinitionBuilder, InterfaceDefinition};
pub use error::{CirrusError, CodecError, ContractError, TransportError};
pub use handler::{AsyncHandler, BlockingHandler, HandlerFuture, HandlerResult};
pub use implementation::{Implementation, ImplementationBuilder, Member};
pub use method::{HttpMethod, ParseMethodError};
pub use path::{PathTemplate, PathTemplateError, Segment};
pub use route::{MethodPolicy, RouteDeclaration, RouteDescriptor};
pub use signature::{Param, Signature};
pub use validate::{require_definition, require_implementation};

pub use cirrus_codec::{ResponseCodec, Value};

/// Encode any serializable value into a JSON value.
pub fn encode_value<T: serde::Serialize + ?Sized>(value: &T) -> Result<Value, CirrusError> {
    Ok(cirrus_codec::json::encode(value)?)
}

/// Decode a JSON value into a concrete type, parsing text leniently.
pub fn decode_value<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, CirrusError> {
    Ok(cirrus_codec::json::decode(value)?)
}
