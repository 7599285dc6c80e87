//! # cirrus-manifest
//!
//! Manifests of the source files a sandboxed client runtime loads before it
//! can run Cirrus client stubs.
//!
//! This crate provides:
//! - `ManifestProvider` trait for custom manifest backends
//! - `StaticManifest` for files held in memory
//! - `DirectoryManifest` for files indexed from directories on disk
//! - `Overview`, the JSON document describing a manifest

mod directory;
mod provider;

pub use directory::{DirectoryManifest, DirectoryManifestBuilder};
pub use provider::{ManifestError, ManifestProvider, Overview, StaticManifest};
