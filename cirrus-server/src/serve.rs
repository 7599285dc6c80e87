//! Mounting and running a bound API.

use axum::Router;
use cirrus_manifest::ManifestProvider;
use tokio::net::TcpListener;

use crate::binder::BoundRouter;
use crate::manifest::manifest_router;

/// Configuration for [`CirrusServer`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: String,

    /// Prefix the bound API is mounted under.
    pub api_prefix: String,

    /// Prefix the manifest is mounted under, when one is attached.
    pub manifest_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
            api_prefix: "/api".to_string(),
            manifest_prefix: "/static_py".to_string(),
        }
    }
}

impl ServerConfig {
    /// Create a config bound to `bind_addr`.
    #[must_use]
    pub fn new(bind_addr: impl Into<String>) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            ..Default::default()
        }
    }

    /// Set the API prefix.
    #[must_use]
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    /// Set the manifest prefix.
    #[must_use]
    pub fn manifest_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.manifest_prefix = prefix.into();
        self
    }
}

type MountManifest = Box<dyn FnOnce(&str) -> Router + Send>;

/// HTTP server for a bound API and an optional manifest.
///
/// ## Example
///
/// ```rust,ignore
/// use cirrus_server::{CirrusServer, ServerConfig, make_server_router};
///
/// let bound = make_server_router(&implementation)?;
/// CirrusServer::new(bound)
///     .with_config(ServerConfig::new("0.0.0.0:8000"))
///     .run()
///     .await?;
/// ```
pub struct CirrusServer {
    config: ServerConfig,
    api: BoundRouter,
    manifest: Option<MountManifest>,
}

impl CirrusServer {
    /// Create a server for `api` with default configuration.
    #[must_use]
    pub fn new(api: BoundRouter) -> Self {
        Self {
            config: ServerConfig::default(),
            api,
            manifest: None,
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Serve `provider` under the manifest prefix.
    #[must_use]
    pub fn with_manifest<P: ManifestProvider>(mut self, provider: P) -> Self {
        self.manifest = Some(Box::new(move |prefix| manifest_router(prefix, provider)));
        self
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Assemble the full application router.
    #[must_use]
    pub fn into_router(self) -> Router {
        let api = self.api.into_router();
        let mut app = match self.config.api_prefix.trim_end_matches('/') {
            "" => api,
            prefix => Router::new().nest(prefix, api),
        };
        if let Some(mount) = self.manifest {
            app = app.merge(mount(&self.config.manifest_prefix));
        }
        app
    }

    /// Bind the configured address and serve until the process stops.
    pub async fn run(self) -> std::io::Result<()> {
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        tracing::info!(
            addr = %listener.local_addr()?,
            api_prefix = %self.config.api_prefix,
            routes = self.api.len(),
            manifest = self.manifest.is_some(),
            "cirrus server listening"
        );
        axum::serve(listener, self.into_router()).await
    }
}
