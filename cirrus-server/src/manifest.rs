//! Serving a manifest to sandboxed clients.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use cirrus_codec::text::unescape_segment;
use cirrus_manifest::ManifestProvider;

/// Router serving `provider` under `prefix`.
///
/// The prefix itself answers with the JSON overview. Every path below it is
/// a file name; unknown names answer 404. An empty or `/` prefix serves the
/// manifest as the fallback of the returned router.
pub fn manifest_router<P: ManifestProvider>(prefix: &str, provider: P) -> Router {
    let service = get(serve_manifest::<P>).with_state(Arc::new(provider));
    match prefix.trim_end_matches('/') {
        "" => Router::new().fallback_service(service),
        prefix => Router::new().nest_service(prefix, service),
    }
}

async fn serve_manifest<P: ManifestProvider>(
    State(provider): State<Arc<P>>,
    uri: Uri,
) -> Response {
    let name = uri.path().trim_start_matches('/');
    if name.is_empty() {
        return Json(provider.overview()).into_response();
    }

    let name = match unescape_segment(name) {
        Ok(name) => name,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    match provider.fetch(&name).await {
        Ok(Some(contents)) => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            contents,
        )
            .into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, format!("no manifest file `{name}`")).into_response(),
        Err(e) => {
            tracing::error!(file = %name, error = %e, "failed to read manifest file");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
