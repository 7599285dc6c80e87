//! Suspending client stubs.

use std::sync::Arc;

use cirrus_core::{
    Arguments, AsyncHandler, CirrusError, Implementation, InterfaceDefinition, RouteDescriptor,
    TransportError, Value, require_implementation,
};
use cirrus_middleware::InterceptorChain;

use crate::config::ClientConfig;
use crate::request::{Endpoint, to_reqwest};

/// Synthesize a suspending client for `definition`.
///
/// Every route becomes an [`AsyncHandler`] that performs one HTTP round trip.
/// The result passes the same validation as a server implementation before
/// it is returned.
///
/// ## Example
///
/// ```rust,ignore
/// use cirrus_client::{ClientConfig, make_client};
/// use cirrus_core::CallArgs;
///
/// let client = make_client(&definition, ClientConfig::new("http://127.0.0.1:8000/api"))?;
/// let item = client.call("get_item", CallArgs::new().arg(42)).await?;
/// ```
pub fn make_client(
    definition: &Arc<InterfaceDefinition>,
    config: ClientConfig,
) -> Result<Implementation<AsyncHandler>, CirrusError> {
    make_client_with(definition, config, InterceptorChain::new())
}

/// Synthesize a suspending client whose calls pass through `interceptors`.
pub fn make_client_with(
    definition: &Arc<InterfaceDefinition>,
    config: ClientConfig,
    interceptors: InterceptorChain,
) -> Result<Implementation<AsyncHandler>, CirrusError> {
    let endpoint = Arc::new(Endpoint::new(config, interceptors)?);
    let http = reqwest::Client::builder()
        .build()
        .map_err(|e| TransportError::Request(e.to_string()))?;

    let mut builder =
        Implementation::builder(format!("{}Client", definition.name()), definition.clone());
    for route in definition.routes() {
        let stub = Stub {
            endpoint: endpoint.clone(),
            http: http.clone(),
            route: route.clone(),
        };
        builder = builder.route(
            route.name(),
            AsyncHandler::new(move |args| stub.clone().call(args)),
        );
    }

    let client = builder.build();
    require_implementation(&client)?;
    tracing::debug!(
        client = client.name(),
        base_url = endpoint.base_url(),
        routes = definition.len(),
        "synthesized suspending client"
    );
    Ok(client)
}

#[derive(Clone)]
struct Stub {
    endpoint: Arc<Endpoint>,
    http: reqwest::Client,
    route: RouteDescriptor,
}

impl Stub {
    async fn call(self, args: Arguments) -> Result<Value, CirrusError> {
        let mut ctx = self.endpoint.context();
        match self.round_trip(&mut ctx, &args).await {
            Ok(value) => Ok(value),
            Err(e) => Err(self.endpoint.fail(&ctx, &self.route, e)),
        }
    }

    async fn round_trip(
        &self,
        ctx: &mut cirrus_core::Context,
        args: &Arguments,
    ) -> Result<Value, CirrusError> {
        let request = self.endpoint.begin(ctx, &self.route, args)?;

        let mut builder = self
            .http
            .request(to_reqwest(request.method), self.endpoint.url(&request));
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        for (name, value) in self.endpoint.headers(ctx) {
            builder = builder.header(name, value);
        }
        #[cfg(not(target_arch = "wasm32"))]
        if let Some(remaining) = ctx.remaining() {
            builder = builder.timeout(remaining);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| self.endpoint.transport_error(&e))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.endpoint.transport_error(&e))?;

        self.endpoint.complete(ctx, &self.route, status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use axum::extract::Query;
    use axum::http::HeaderMap;
    use axum::routing::{get, post};
    use cirrus_core::{CallArgs, ContractError, DefinitionBuilder, RouteDeclaration};
    use cirrus_middleware::{Interceptor, InterceptorError};
    use serde_json::json;
    use std::collections::HashMap;

    fn notes() -> Arc<InterfaceDefinition> {
        DefinitionBuilder::new("Notes")
            .route(RouteDeclaration::get("find", "/notes/{id}").param("id").param_default("full", false))
            .unwrap()
            .route(RouteDeclaration::post("create", "/notes").param("text").with_body())
            .unwrap()
            .route(RouteDeclaration::get("missing", "/missing"))
            .unwrap()
            .build()
    }

    async fn spawn_server() -> String {
        let app = axum::Router::new()
            .route(
                "/api/notes/{id}",
                get(
                    |axum::extract::Path(id): axum::extract::Path<String>,
                     Query(query): Query<HashMap<String, String>>,
                     headers: HeaderMap| async move {
                        Json(json!({
                            "id": id,
                            "full": query.get("full"),
                            "tag": headers.get("x-tag").and_then(|v| v.to_str().ok()),
                        }))
                    },
                ),
            )
            .route(
                "/api/notes",
                post(|Json(body): Json<Value>| async move { Json(json!({ "created": body })) }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/api")
    }

    struct Tag;

    impl Interceptor for Tag {
        fn intercept_request(
            &self,
            ctx: &mut cirrus_core::Context,
            _route: &RouteDescriptor,
        ) -> Result<(), InterceptorError> {
            ctx.set_header("x-tag", "blue");
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_round_trips() {
        let base_url = spawn_server().await;
        let client = make_client_with(
            &notes(),
            ClientConfig::new(base_url),
            InterceptorChain::new().with(Tag),
        )
        .unwrap();
        assert_eq!(client.name(), "NotesClient");

        let found = client.call("find", CallArgs::new().arg(7)).await.unwrap();
        assert_eq!(found, json!({"id": "7", "full": "false", "tag": "blue"}));

        let created = client
            .call("create", CallArgs::new().kwarg("text", "hello"))
            .await
            .unwrap();
        assert_eq!(created, json!({"created": {"text": "hello"}}));

        let err = client.call("missing", CallArgs::new()).await.unwrap_err();
        assert!(matches!(err, CirrusError::RemoteCallFailure { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_binding_fails_before_request() {
        let client = make_client(&notes(), ClientConfig::new("http://127.0.0.1:9")).unwrap();
        let err = client.call("find", CallArgs::new()).await.unwrap_err();
        assert!(matches!(err, CirrusError::ArgumentBinding { .. }));
    }

    #[test]
    fn test_layered_definition_rejected() {
        let layered = DefinitionBuilder::new("Layered").extends(notes()).build();
        let err = make_client(&layered, ClientConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            CirrusError::Contract(ContractError::ContractViolation { .. })
        ));
    }

    #[test]
    fn test_invalid_base_url() {
        let err = make_client(&notes(), ClientConfig::new("localhost")).unwrap_err();
        assert!(matches!(
            err,
            CirrusError::Transport(TransportError::InvalidBaseUrl(_))
        ));
    }
}
