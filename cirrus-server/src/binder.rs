//! Binding implementations to an axum router.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::Query;
use axum::http::Uri;
use axum::routing::{MethodFilter, MethodRouter};
use cirrus_core::{
    AsyncHandler, ContractError, HttpMethod, Implementation, Member, require_implementation,
};

use crate::handler::RouteEndpoint;

/// One registered (method, path, route) triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    /// HTTP method.
    pub method: HttpMethod,
    /// Path template as registered with the router.
    pub path: String,
    /// Route name.
    pub name: String,
}

/// The server-side result of binding an implementation.
///
/// Holds the registered entries in declaration order and the axum router
/// serving them. Mount the router wherever the API should live.
#[derive(Debug)]
pub struct BoundRouter {
    entries: Vec<RouteEntry>,
    router: Router,
}

impl BoundRouter {
    /// Registered routes in declaration order.
    #[must_use]
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no routes were registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Borrow the router.
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Take the router.
    #[must_use]
    pub fn into_router(self) -> Router {
        self.router
    }
}

/// Bind a server implementation to a router.
///
/// Runs the same structural validation as the client synthesizers, then
/// requires every route's member to be a marked override. A same-named
/// member that is not marked fails with
/// [`ContractError::MissingOverrideMarker`].
///
/// ## Example
///
/// ```rust,ignore
/// let bound = make_server_router(&implementation)?;
/// let app = axum::Router::new().nest("/api", bound.into_router());
/// ```
pub fn make_server_router(
    implementation: &Implementation<AsyncHandler>,
) -> Result<BoundRouter, ContractError> {
    let definition = require_implementation(implementation)?;

    let mut entries = Vec::with_capacity(definition.len());
    let mut paths: Vec<(String, MethodRouter)> = Vec::new();

    for route in definition.routes() {
        let handler = match implementation.member(route.name()) {
            Some(Member::Route(handler)) => handler.clone(),
            Some(Member::Plain(_)) => {
                return Err(ContractError::MissingOverrideMarker {
                    implementation: implementation.name().to_string(),
                    route: route.name().to_string(),
                });
            }
            None => {
                return Err(ContractError::IncompleteImplementation {
                    implementation: implementation.name().to_string(),
                    missing: vec![route.name().to_string()],
                });
            }
        };

        let path = route.path().as_str().to_string();
        let endpoint = Arc::new(RouteEndpoint::new(route.clone(), handler));
        let serve = move |uri: Uri, Query(query): Query<HashMap<String, String>>, body: Bytes| {
            let endpoint = endpoint.clone();
            async move { endpoint.dispatch(uri.path(), query, &body).await }
        };

        let filter = method_filter(route.method());
        match paths.iter_mut().find(|(p, _)| *p == path) {
            Some((_, methods)) => {
                let existing = std::mem::replace(methods, MethodRouter::new());
                *methods = existing.on(filter, serve);
            }
            None => paths.push((path.clone(), MethodRouter::new().on(filter, serve))),
        }

        tracing::debug!(
            implementation = implementation.name(),
            route = route.name(),
            method = %route.method(),
            path = %path,
            "bound route"
        );
        entries.push(RouteEntry {
            method: route.method(),
            path,
            name: route.name().to_string(),
        });
    }

    let router = paths
        .into_iter()
        .fold(Router::new(), |router, (path, methods)| router.route(&path, methods));

    tracing::info!(
        implementation = implementation.name(),
        definition = definition.name(),
        routes = entries.len(),
        "bound server router"
    );

    Ok(BoundRouter { entries, router })
}

fn method_filter(method: HttpMethod) -> MethodFilter {
    match method {
        HttpMethod::Get => MethodFilter::GET,
        HttpMethod::Post => MethodFilter::POST,
        HttpMethod::Put => MethodFilter::PUT,
        HttpMethod::Delete => MethodFilter::DELETE,
        HttpMethod::Patch => MethodFilter::PATCH,
        HttpMethod::Options => MethodFilter::OPTIONS,
        HttpMethod::Head => MethodFilter::HEAD,
        HttpMethod::Trace => MethodFilter::TRACE,
    }
}
