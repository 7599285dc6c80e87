//! # Cirrus
//!
//! Declare an HTTP interface once, then serve it and call it from the same
//! declaration.
//!
//! Cirrus provides:
//! - **Route registry**: interface definitions built from route declarations,
//!   checked when they are built
//! - **Contract validation**: implementations must derive from exactly one
//!   definition and bind every route
//! - **Server binding**: an [axum](https://docs.rs/axum) router generated
//!   from an implementation
//! - **Client synthesis**: suspending and blocking clients generated from a
//!   definition
//! - **`#[contract]`**: all of the above from an annotated trait
//!
//! ## Quick Start
//!
//! ```rust
//! use cirrus::{CallArgs, DefinitionBuilder, RouteDeclaration};
//!
//! let definition = DefinitionBuilder::new("Inventory")
//!     .route(RouteDeclaration::get("get_item", "/items/{id}").param("id"))
//!     .unwrap()
//!     .build();
//! assert_eq!(definition.len(), 1);
//!
//! let route = definition.route("get_item").unwrap();
//! let args = route.signature().bind("get_item", CallArgs::new().arg(42)).unwrap();
//! assert_eq!(route.path().resolve("get_item", &args).unwrap(), "/items/42");
//! ```
//!
//! ## Features
//!
//! - `tracing` (default) - Enable the tracing interceptor
//!
//! ## Architecture
//!
//! Cirrus is composed of several crates:
//!
//! - [`cirrus-core`] - Definitions, implementations, validation and errors
//! - [`cirrus-codec`] - JSON and path-segment codecs
//! - [`cirrus-client`] - Suspending and blocking client stubs (reqwest)
//! - [`cirrus-server`] - Server route binder (axum)
//! - [`cirrus-manifest`] - Client-source manifest served next to the API
//! - [`cirrus-middleware`] - Client-side interceptors
//! - [`cirrus-macros`] - Proc macros (`#[contract]`)

// Re-export core types
pub use cirrus_core::{
    Arguments, AsyncHandler, BlockingHandler, CallArgs, CirrusError, CodecError, Context,
    ContractBase, ContractError, DefinitionBuilder, HandlerFuture, HandlerResult, HttpMethod,
    Implementation, ImplementationBuilder, InterfaceDefinition, Member, Metadata, MethodPolicy,
    Param, ParseMethodError, PathTemplate, PathTemplateError, ResponseCodec, RouteDeclaration,
    RouteDescriptor, Segment, Signature, TraceId, TransportError, Value, decode_value,
    encode_value, require_definition, require_implementation,
};

// Re-export clients
pub use cirrus_client::{ClientConfig, PreparedRequest, make_client, make_client_with};

#[cfg(not(target_arch = "wasm32"))]
pub use cirrus_client::{make_blocking_client, make_blocking_client_with};

// Re-export server
#[cfg(not(target_arch = "wasm32"))]
pub use cirrus_server::{
    BoundRouter, CirrusServer, RouteEntry, ServerConfig, make_server_router, manifest_router,
};

// Re-export manifest
#[cfg(not(target_arch = "wasm32"))]
pub use cirrus_manifest::{
    DirectoryManifest, DirectoryManifestBuilder, ManifestError, ManifestProvider, Overview,
    StaticManifest,
};

// Re-export macros
pub use cirrus_macros::contract;

// Re-export middleware
pub use cirrus_middleware::{
    Interceptor, InterceptorChain, InterceptorError, TimeoutInterceptor,
};

#[cfg(feature = "tracing")]
pub use cirrus_middleware::TracingInterceptor;

/// Codec helpers.
pub mod codec {
    pub use cirrus_codec::{json, text};
}

/// Prelude module for convenient imports.
///
/// ```rust
/// use cirrus::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        CallArgs, CirrusError, ClientConfig, ContractError, DefinitionBuilder, HttpMethod,
        Implementation, InterfaceDefinition, RouteDeclaration, Value, contract,
    };

    #[cfg(not(target_arch = "wasm32"))]
    pub use crate::{CirrusServer, ServerConfig, make_server_router};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
