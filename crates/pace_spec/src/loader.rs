//! Manifest and catalog loading.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{SpecError, SpecResult};
use crate::models::{Catalog, Manifest};

/// Document format, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    /// JSON for `.json`, YAML for everything else.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => DocumentFormat::Json,
            _ => DocumentFormat::Yaml,
        }
    }
}

/// Loader for manifest and catalog documents.
///
/// Only structural decoding happens here; semantic checks live in
/// [`SpecValidator`](crate::validator::SpecValidator).
pub struct Loader;

impl Loader {
    /// Load a manifest from a file.
    pub fn load_manifest(path: impl AsRef<Path>) -> SpecResult<Manifest> {
        let path = path.as_ref();
        let manifest: Manifest = Self::load_document(path)?;
        info!(
            "Loaded manifest '{}' ({} resources) from {:?}",
            manifest.name,
            manifest.resources.len(),
            path
        );
        Ok(manifest)
    }

    /// Load a single catalog file.
    pub fn load_catalog(path: impl AsRef<Path>) -> SpecResult<Catalog> {
        let path = path.as_ref();
        let catalog: Catalog = Self::load_document(path)?;
        info!("Loaded catalog with {} entries from {:?}", catalog.len(), path);
        Ok(catalog)
    }

    /// Parse a YAML manifest from a byte buffer.
    pub fn parse_manifest(bytes: &[u8]) -> SpecResult<Manifest> {
        Ok(serde_yaml::from_slice(bytes)?)
    }

    /// Parse a YAML catalog from a byte buffer.
    pub fn parse_catalog(bytes: &[u8]) -> SpecResult<Catalog> {
        Ok(serde_yaml::from_slice(bytes)?)
    }

    /// Load a catalog from a file, or merge every catalog document in a directory.
    pub fn load_catalog_path(path: impl AsRef<Path>) -> SpecResult<Catalog> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SpecError::NotFound(path.to_path_buf()));
        }
        if path.is_file() {
            return Self::load_catalog(path);
        }

        let mut catalog = Catalog::new();
        let mut origins: BTreeMap<String, PathBuf> = BTreeMap::new();

        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let file = entry.path();
            if !file.is_file() || !Self::is_catalog_file(file) {
                continue;
            }

            let part: Catalog = Self::load_document(file)?;
            debug!("Merging {} catalog entries from {:?}", part.len(), file);

            for (name, spec) in part.resources {
                if let Some(first) = origins.get(&name) {
                    return Err(SpecError::DuplicateCatalogEntry {
                        name,
                        first: first.clone(),
                        second: file.to_path_buf(),
                    });
                }
                origins.insert(name.clone(), file.to_path_buf());
                catalog.insert(name, spec);
            }
        }

        info!("Loaded catalog with {} entries from {:?}", catalog.len(), path);
        Ok(catalog)
    }

    fn is_catalog_file(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map_or(false, |ext| matches!(ext, "yaml" | "yml" | "json"))
    }

    fn load_document<T: DeserializeOwned>(path: &Path) -> SpecResult<T> {
        debug!("Reading document from {:?}", path);

        if !path.exists() {
            return Err(SpecError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| SpecError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let parsed = match DocumentFormat::from_path(path) {
            DocumentFormat::Json => serde_json::from_str(&content).map_err(|e| e.to_string()),
            DocumentFormat::Yaml => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
        };

        parsed.map_err(|message| SpecError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }
}
