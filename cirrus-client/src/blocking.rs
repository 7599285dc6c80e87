//! Blocking client stubs.

use std::sync::{Arc, OnceLock};

use cirrus_core::{
    Arguments, BlockingHandler, CirrusError, Context, Implementation, InterfaceDefinition,
    RouteDescriptor, TransportError, Value, require_implementation,
};
use cirrus_middleware::InterceptorChain;

use crate::config::ClientConfig;
use crate::request::{Endpoint, to_reqwest};

/// Synthesize a blocking client for `definition`.
///
/// Calls occupy the calling thread for one HTTP round trip and must not be
/// made from inside an async runtime.
pub fn make_blocking_client(
    definition: &Arc<InterfaceDefinition>,
    config: ClientConfig,
) -> Result<Implementation<BlockingHandler>, CirrusError> {
    make_blocking_client_with(definition, config, InterceptorChain::new())
}

/// Synthesize a blocking client whose calls pass through `interceptors`.
pub fn make_blocking_client_with(
    definition: &Arc<InterfaceDefinition>,
    config: ClientConfig,
    interceptors: InterceptorChain,
) -> Result<Implementation<BlockingHandler>, CirrusError> {
    let endpoint = Arc::new(Endpoint::new(config, interceptors)?);
    // Built on first call so the client can be synthesized inside a runtime.
    let http = Arc::new(OnceLock::new());

    let mut builder = Implementation::builder(
        format!("{}BlockingClient", definition.name()),
        definition.clone(),
    );
    for route in definition.routes() {
        let stub = Stub {
            endpoint: endpoint.clone(),
            http: http.clone(),
            route: route.clone(),
        };
        builder = builder.route(route.name(), BlockingHandler::new(move |args| stub.call(&args)));
    }

    let client = builder.build();
    require_implementation(&client)?;
    tracing::debug!(
        client = client.name(),
        base_url = endpoint.base_url(),
        routes = definition.len(),
        "synthesized blocking client"
    );
    Ok(client)
}

struct Stub {
    endpoint: Arc<Endpoint>,
    http: Arc<OnceLock<reqwest::blocking::Client>>,
    route: RouteDescriptor,
}

impl Stub {
    fn call(&self, args: &Arguments) -> Result<Value, CirrusError> {
        let mut ctx = self.endpoint.context();
        self.round_trip(&mut ctx, args)
            .map_err(|e| self.endpoint.fail(&ctx, &self.route, e))
    }

    fn client(&self) -> Result<&reqwest::blocking::Client, CirrusError> {
        if let Some(client) = self.http.get() {
            return Ok(client);
        }
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(self.http.get_or_init(|| client))
    }

    fn round_trip(&self, ctx: &mut Context, args: &Arguments) -> Result<Value, CirrusError> {
        let request = self.endpoint.begin(ctx, &self.route, args)?;

        let mut builder = self
            .client()?
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
        if let Some(remaining) = ctx.remaining() {
            builder = builder.timeout(remaining);
        }

        let response = builder
            .send()
            .map_err(|e| self.endpoint.transport_error(&e))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|e| self.endpoint.transport_error(&e))?;

        self.endpoint.complete(ctx, &self.route, status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use axum::routing::get;
    use cirrus_core::{CallArgs, DefinitionBuilder, RouteDeclaration};
    use serde_json::json;
    use std::net::SocketAddr;

    fn counter() -> Arc<InterfaceDefinition> {
        DefinitionBuilder::new("Counter")
            .route(RouteDeclaration::get("read", "/count"))
            .unwrap()
            .route(RouteDeclaration::delete("reset", "/count"))
            .unwrap()
            .build()
    }

    fn spawn_server() -> SocketAddr {
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let app = axum::Router::new().route(
                    "/count",
                    get(|| async { Json(json!(3)) })
                        .delete(|| async { (axum::http::StatusCode::FORBIDDEN, "read only") }),
                );
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
                tx.send(listener.local_addr().unwrap()).unwrap();
                axum::serve(listener, app).await.unwrap();
            });
        });
        rx.recv().unwrap()
    }

    #[test]
    fn test_blocking_round_trip() {
        let addr = spawn_server();
        let client =
            make_blocking_client(&counter(), ClientConfig::new(format!("http://{addr}/"))).unwrap();
        assert_eq!(client.name(), "CounterBlockingClient");

        assert_eq!(client.call("read", CallArgs::new()).unwrap(), json!(3));

        let err = client.call("reset", CallArgs::new()).unwrap_err();
        assert!(matches!(
            err,
            CirrusError::RemoteCallFailure { status: 403, ref body } if body == "read only"
        ));
    }

    #[test]
    fn test_connection_refused() {
        let client =
            make_blocking_client(&counter(), ClientConfig::new("http://127.0.0.1:9")).unwrap();
        assert!(matches!(
            client.call("read", CallArgs::new()),
            Err(CirrusError::Transport(_))
        ));
    }
}
