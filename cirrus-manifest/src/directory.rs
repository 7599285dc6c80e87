//! Manifests indexed from directories on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::provider::{ManifestError, ManifestProvider, Overview};

/// A manifest of files found under one or more directories.
///
/// Each file is named `<directory name>/<path relative to it>`, using `/`
/// separators on every platform. The index is built once; file contents are
/// read on every fetch.
///
/// ## Example
///
/// ```rust,ignore
/// use cirrus_manifest::DirectoryManifest;
///
/// let manifest = DirectoryManifest::builder("shop.ui")
///     .include("./shop")
///     .extra_module("numpy")
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct DirectoryManifest {
    entry_module: String,
    extra_modules: Vec<String>,
    index: BTreeMap<String, PathBuf>,
}

impl DirectoryManifest {
    /// Start building a manifest whose runtime imports `entry_module`.
    #[must_use]
    pub fn builder(entry_module: impl Into<String>) -> DirectoryManifestBuilder {
        DirectoryManifestBuilder {
            entry_module: entry_module.into(),
            extension: "py".to_string(),
            directories: Vec::new(),
            extra_modules: Vec::new(),
        }
    }

    /// Path on disk backing a manifest name.
    #[must_use]
    pub fn source_path(&self, name: &str) -> Option<&Path> {
        self.index.get(name).map(PathBuf::as_path)
    }

    /// Number of indexed files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if no files were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl ManifestProvider for DirectoryManifest {
    fn overview(&self) -> Overview {
        Overview {
            entry_module: self.entry_module.clone(),
            files: self.index.keys().cloned().collect(),
            extra_modules: self.extra_modules.clone(),
        }
    }

    async fn fetch(&self, name: &str) -> Result<Option<Vec<u8>>, ManifestError> {
        match self.index.get(name) {
            Some(path) => Ok(Some(tokio::fs::read(path).await?)),
            None => Ok(None),
        }
    }
}

/// Builder for [`DirectoryManifest`].
#[derive(Debug, Clone)]
pub struct DirectoryManifestBuilder {
    entry_module: String,
    extension: String,
    directories: Vec<PathBuf>,
    extra_modules: Vec<String>,
}

impl DirectoryManifestBuilder {
    /// Only index files with this extension (default `py`).
    #[must_use]
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Index every matching file under `directory`.
    #[must_use]
    pub fn include(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directories.push(directory.into());
        self
    }

    /// Add a module the runtime installs itself.
    #[must_use]
    pub fn extra_module(mut self, module: impl Into<String>) -> Self {
        self.extra_modules.push(module.into());
        self
    }

    /// Walk the directories and build the index.
    pub fn build(self) -> Result<DirectoryManifest, ManifestError> {
        let mut index = BTreeMap::new();
        for directory in &self.directories {
            if !directory.is_dir() {
                return Err(ManifestError::NotADirectory(directory.display().to_string()));
            }
            let root = directory
                .canonicalize()?
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            walk(directory, &mut |path| {
                if path.extension().is_some_and(|ext| ext == self.extension.as_str()) {
                    let relative = path.strip_prefix(directory).unwrap_or(path);
                    let name = std::iter::once(root.clone())
                        .chain(relative.iter().map(|c| c.to_string_lossy().into_owned()))
                        .filter(|part| !part.is_empty())
                        .collect::<Vec<_>>()
                        .join("/");
                    index.insert(name, path.to_path_buf());
                }
            })?;
        }

        tracing::info!(
            entry_module = %self.entry_module,
            files = index.len(),
            "indexed manifest directories"
        );

        Ok(DirectoryManifest {
            entry_module: self.entry_module,
            extra_modules: self.extra_modules,
            index,
        })
    }
}

fn walk(directory: &Path, visit: &mut dyn FnMut(&Path)) -> Result<(), ManifestError> {
    let mut entries = std::fs::read_dir(directory)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(std::fs::DirEntry::file_name);
    for entry in entries {
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            walk(&path, visit)?;
        } else {
            visit(&path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cirrus-manifest-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join("shop/widgets")).unwrap();
        fs::write(dir.join("shop/__init__.py"), "").unwrap();
        fs::write(dir.join("shop/widgets/cart.py"), "CART = 1").unwrap();
        fs::write(dir.join("shop/README.md"), "docs").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_directory_index() {
        let dir = scratch_dir("index");
        let manifest = DirectoryManifest::builder("shop.ui")
            .include(dir.join("shop"))
            .extra_module("numpy")
            .build()
            .unwrap();

        let overview = manifest.overview();
        assert_eq!(overview.files, ["shop/__init__.py", "shop/widgets/cart.py"]);
        assert_eq!(overview.extra_modules, ["numpy"]);

        let cart = manifest.fetch("shop/widgets/cart.py").await.unwrap();
        assert_eq!(cart.as_deref(), Some(&b"CART = 1"[..]));
        assert!(manifest.fetch("shop/README.md").await.unwrap().is_none());

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_custom_extension() {
        let dir = scratch_dir("extension");
        let manifest = DirectoryManifest::builder("docs")
            .extension("md")
            .include(dir.join("shop"))
            .build()
            .unwrap();
        assert_eq!(manifest.overview().files, ["shop/README.md"]);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_missing_directory() {
        let err = DirectoryManifest::builder("x")
            .include("/definitely/not/here")
            .build()
            .unwrap_err();
        assert!(matches!(err, ManifestError::NotADirectory(_)));
    }
}
