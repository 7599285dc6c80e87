//! Request handling for one bound route.

use std::collections::HashMap;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cirrus_codec::json::parse_body;
use cirrus_core::{Arguments, AsyncHandler, CallArgs, CirrusError, RouteDescriptor, Value};
use serde_json::json;

/// A route descriptor paired with the handler serving it.
pub(crate) struct RouteEndpoint {
    route: RouteDescriptor,
    handler: AsyncHandler,
}

impl RouteEndpoint {
    pub(crate) fn new(route: RouteDescriptor, handler: AsyncHandler) -> Self {
        Self { route, handler }
    }

    /// Rebuild arguments from the request, run the handler and encode its result.
    pub(crate) async fn dispatch(
        &self,
        path: &str,
        query: HashMap<String, String>,
        body: &[u8],
    ) -> Response {
        let args = match extract_arguments(&self.route, path, query, body) {
            Ok(args) => args,
            Err(e) => return self.error_response(StatusCode::BAD_REQUEST, &e),
        };

        let output = match self.handler.call(args).await {
            Ok(output) => output,
            Err(e) => return self.error_response(status_for(&e), &e),
        };

        match self.route.response().conform(output) {
            Ok(value) => Json(value).into_response(),
            Err(e) => self.error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.into()),
        }
    }

    fn error_response(&self, status: StatusCode, error: &CirrusError) -> Response {
        if status.is_server_error() {
            tracing::error!(
                route = self.route.name(),
                status = status.as_u16(),
                error = %error,
                "handler failed"
            );
        } else {
            tracing::debug!(
                route = self.route.name(),
                status = status.as_u16(),
                error = %error,
                "request rejected"
            );
        }
        (status, Json(json!({ "error": error.to_string() }))).into_response()
    }
}

/// HTTP status for an error returned by a handler.
pub(crate) fn status_for(error: &CirrusError) -> StatusCode {
    match error {
        CirrusError::ArgumentBinding { .. } | CirrusError::Codec(_) => StatusCode::BAD_REQUEST,
        CirrusError::Handler { status, .. } => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Rebuild call arguments from a request.
///
/// Path values come first, then body fields (routes with a body) or query
/// values (routes without one). Keys that are not signature parameters are
/// ignored, and defaults fill whatever the request left out.
pub(crate) fn extract_arguments(
    route: &RouteDescriptor,
    path: &str,
    query: HashMap<String, String>,
    body: &[u8],
) -> Result<Arguments, CirrusError> {
    let binding_error = |reason: &str| CirrusError::ArgumentBinding {
        route: route.name().to_string(),
        reason: reason.to_string(),
    };

    let matched = route
        .path()
        .match_path(path)
        .ok_or_else(|| binding_error("request path does not match the route template"))?;

    let mut call = CallArgs::new();
    for (name, text) in matched {
        call = call.kwarg(name, Value::String(text));
    }

    let is_extra =
        |name: &str| route.signature().contains(name) && !route.path().has_placeholder(name);

    if route.has_body() {
        match parse_body(body)? {
            Value::Object(fields) => {
                for (name, value) in fields {
                    if is_extra(&name) {
                        call = call.kwarg(name, value);
                    }
                }
            }
            Value::Null => {}
            _ => return Err(binding_error("request body must be a JSON object")),
        }
    } else {
        // Clients leave `null` out of the query, so an absent required
        // parameter stands for `null`.
        for param in route.extra_params() {
            if param.is_required() && !query.contains_key(param.name()) {
                call = call.kwarg(param.name(), Value::Null);
            }
        }
        for (name, text) in query {
            if is_extra(&name) {
                call = call.kwarg(name, Value::String(text));
            }
        }
    }

    route.signature().bind(route.name(), call)
}
