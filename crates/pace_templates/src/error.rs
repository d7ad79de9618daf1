//! Error types for templates.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur while rendering artifacts.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Template '{template}' references unknown variable '{variable}'")]
    UnknownVariable { template: String, variable: String },

    #[error("Input '{key}' conflicts with nested input '{nested}'")]
    Conflict { key: String, nested: String },

    #[error("Templates directory does not exist: {0}")]
    MissingDirectory(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
