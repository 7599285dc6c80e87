//! Provider trait and common types.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Error type for manifest operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ManifestError {
    /// A file could not be read or a directory could not be walked.
    #[error("io error: {0}")]
    Io(Arc<std::io::Error>),

    /// A directory given to a manifest does not exist.
    #[error("not a directory: {0}")]
    NotADirectory(String),
}

impl From<std::io::Error> for ManifestError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(Arc::new(e))
    }
}

/// Description of a manifest, served as JSON to the sandboxed runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overview {
    /// Module the runtime imports once every file is loaded.
    pub entry_module: String,
    /// Names of every file in the manifest, sorted.
    pub files: Vec<String>,
    /// Modules the runtime installs from its own package index.
    pub extra_modules: Vec<String>,
}

/// Trait for manifest backends.
///
/// ## Example
///
/// ```rust
/// use cirrus_manifest::{ManifestProvider, StaticManifest};
///
/// let manifest = StaticManifest::new("app.main");
/// manifest.add_file("app/main.py", b"print('hi')".to_vec());
///
/// assert_eq!(manifest.overview().files, vec!["app/main.py".to_string()]);
/// ```
pub trait ManifestProvider: Send + Sync + 'static {
    /// Describe the manifest.
    fn overview(&self) -> Overview;

    /// Read one file by manifest name. Unknown names yield `None`.
    fn fetch(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, ManifestError>> + Send;
}

/// A manifest held entirely in memory.
///
/// Files may be added concurrently while the manifest is being served.
pub struct StaticManifest {
    entry_module: String,
    extra_modules: Vec<String>,
    files: DashMap<String, Arc<[u8]>>,
}

impl StaticManifest {
    /// Create an empty manifest.
    #[must_use]
    pub fn new(entry_module: impl Into<String>) -> Self {
        Self {
            entry_module: entry_module.into(),
            extra_modules: Vec::new(),
            files: DashMap::new(),
        }
    }

    /// Add a module the runtime installs itself.
    #[must_use]
    pub fn with_extra_module(mut self, module: impl Into<String>) -> Self {
        self.extra_modules.push(module.into());
        self
    }

    /// Add or replace a file.
    pub fn add_file(&self, name: impl Into<String>, contents: impl Into<Arc<[u8]>>) {
        self.files.insert(name.into(), contents.into());
    }

    /// Remove a file.
    pub fn remove_file(&self, name: &str) -> bool {
        self.files.remove(name).is_some()
    }

    /// Number of files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if the manifest holds no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl ManifestProvider for StaticManifest {
    fn overview(&self) -> Overview {
        let mut files: Vec<String> = self.files.iter().map(|e| e.key().clone()).collect();
        files.sort();
        Overview {
            entry_module: self.entry_module.clone(),
            files,
            extra_modules: self.extra_modules.clone(),
        }
    }

    async fn fetch(&self, name: &str) -> Result<Option<Vec<u8>>, ManifestError> {
        Ok(self.files.get(name).map(|contents| contents.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_manifest() {
        let manifest = StaticManifest::new("shop.ui").with_extra_module("numpy");
        manifest.add_file("shop/ui.py", b"import shop".to_vec());
        manifest.add_file("shop/__init__.py", Vec::new());

        let overview = manifest.overview();
        assert_eq!(overview.entry_module, "shop.ui");
        assert_eq!(overview.files, ["shop/__init__.py", "shop/ui.py"]);
        assert_eq!(overview.extra_modules, ["numpy"]);

        assert_eq!(
            manifest.fetch("shop/ui.py").await.unwrap().as_deref(),
            Some(&b"import shop"[..])
        );
        assert!(manifest.fetch("nope.py").await.unwrap().is_none());

        assert!(manifest.remove_file("shop/ui.py"));
        assert_eq!(manifest.len(), 1);
    }

    #[test]
    fn test_overview_json() {
        let overview = Overview {
            entry_module: "app".into(),
            files: vec!["app/__init__.py".into()],
            extra_modules: Vec::new(),
        };
        let json = serde_json::to_value(&overview).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "entry_module": "app",
                "files": ["app/__init__.py"],
                "extra_modules": []
            })
        );
    }
}
