//! Error types for the resolution and generation pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type IacResult<T> = Result<T, IacError>;

/// Errors that can occur while resolving, building or generating.
#[derive(Error, Debug)]
pub enum IacError {
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Module '{reference}' not found in stack '{stack}'")]
    NotFound { reference: String, stack: String },

    #[error("Module '{reference}' is ambiguous in stack '{stack}': matches {}", candidates.join(", "))]
    AmbiguousReference {
        reference: String,
        stack: String,
        candidates: Vec<String>,
    },

    #[error("Module '{reference}' does not belong to stack '{stack}'")]
    StackMismatch { reference: String, stack: String },

    #[error("Dependency cycle detected: {}", cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    #[error("Resource id '{0}' is declared more than once")]
    DuplicateResourceId(String),

    #[error("Resource id '{id}' is used for both '{existing}' and '{requested}'")]
    ConflictingResourceId {
        id: String,
        existing: String,
        requested: String,
    },

    #[error("Missing required input '{input}' for resource '{id}'")]
    MissingRequiredInput { id: String, input: String },

    #[error("Invalid dependency reference '{reference}' in resource '{id}': expected {{{{ <namespace>.<id>.<output> }}}}")]
    MalformedReference { id: String, reference: String },

    #[error("Unresolved dependency reference '{reference}' in resource '{id}': {reason}")]
    UnresolvedDependency {
        id: String,
        reference: String,
        reason: String,
    },

    #[error("Resources '{first}' and '{second}' would both be written to {artifact}")]
    ArtifactCollision {
        artifact: String,
        first: String,
        second: String,
    },

    #[error("Failed to render resource '{id}': {source}")]
    Render {
        id: String,
        #[source]
        source: pace_templates::TemplateError,
    },

    #[error("Failed to write {path}: {source}")]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Resource '{id}': {source}")]
    Resource {
        id: String,
        #[source]
        source: Box<IacError>,
    },
}

impl IacError {
    /// Attach the id of the resource being processed.
    pub fn in_resource(self, id: impl Into<String>) -> Self {
        IacError::Resource {
            id: id.into(),
            source: Box::new(self),
        }
    }

    /// The underlying error, without resource context.
    pub fn root_cause(&self) -> &IacError {
        match self {
            IacError::Resource { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Id of the resource the error was raised for, if known.
    pub fn resource_id(&self) -> Option<&str> {
        match self {
            IacError::Resource { id, .. }
            | IacError::MissingRequiredInput { id, .. }
            | IacError::MalformedReference { id, .. }
            | IacError::UnresolvedDependency { id, .. }
            | IacError::Render { id, .. } => Some(id.as_str()),
            IacError::DuplicateResourceId(id) | IacError::ConflictingResourceId { id, .. } => {
                Some(id.as_str())
            }
            _ => None,
        }
    }
}
