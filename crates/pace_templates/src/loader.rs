//! Template loading functionality.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{TemplateError, TemplateResult};
use crate::renderer::TemplateRenderer;

const TEMPLATE_EXTENSION: &str = "tmpl";

/// Loads `*.tmpl` overrides from a directory.
pub struct TemplateLoader {
    templates_path: PathBuf,
}

impl TemplateLoader {
    /// Create a new template loader.
    pub fn new(templates_path: impl Into<PathBuf>) -> Self {
        Self {
            templates_path: templates_path.into(),
        }
    }

    /// Load every template in the directory on top of the built-in ones.
    ///
    /// `module.tf.tmpl` is registered as `module.tf`, replacing the default.
    pub fn load(&self) -> TemplateResult<TemplateRenderer> {
        let mut renderer = TemplateRenderer::new();

        if !self.templates_path.is_dir() {
            return Err(TemplateError::MissingDirectory(self.templates_path.clone()));
        }

        for entry in WalkDir::new(&self.templates_path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXTENSION) {
                continue;
            }

            let name = match path.file_stem().and_then(|s| s.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };

            debug!("Loading template {} from {:?}", name, path);
            let content = fs::read_to_string(path)?;
            renderer.register(name, content);
        }

        info!(
            "Loaded templates from {:?}: {}",
            self.templates_path,
            renderer.template_names().join(", ")
        );
        Ok(renderer)
    }
}
