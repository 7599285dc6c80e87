//! Client configuration.

use std::time::Duration;

use cirrus_core::TransportError;

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

/// Configuration shared by both client variants.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Prefix every resolved path is appended to.
    pub base_url: String,

    /// Per-call timeout. Ignored on `wasm32`.
    pub timeout: Option<Duration>,

    /// Headers sent with every call.
    pub headers: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Some(Duration::from_secs(30)),
            headers: Vec::new(),
        }
    }
}

impl ClientConfig {
    /// Create a config for `base_url` with default settings.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::default().base_url(base_url)
    }

    /// Set the base URL.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the per-call timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Disable the per-call timeout.
    #[must_use]
    pub fn no_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    /// Add a header sent with every call.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Base URL with any trailing `/` removed.
    pub(crate) fn normalized_base_url(&self) -> Result<String, TransportError> {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        let valid = ["http://", "https://"]
            .iter()
            .any(|scheme| trimmed.len() > scheme.len() && trimmed.starts_with(scheme));
        if !valid {
            return Err(TransportError::InvalidBaseUrl(self.base_url.clone()));
        }
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:8000/api");
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert!(config.headers.is_empty());
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = ClientConfig::new("https://example.com/api/");
        assert_eq!(config.normalized_base_url().unwrap(), "https://example.com/api");
    }

    #[test]
    fn test_invalid_base_urls() {
        for url in ["", "/api", "ftp://example.com", "http://"] {
            assert!(matches!(
                ClientConfig::new(url).normalized_base_url(),
                Err(TransportError::InvalidBaseUrl(_))
            ));
        }
    }

    #[test]
    fn test_builder_setters() {
        let config = ClientConfig::new("http://localhost:9000")
            .no_timeout()
            .header("authorization", "Bearer token");
        assert!(config.timeout.is_none());
        assert_eq!(config.headers.len(), 1);
    }
}
