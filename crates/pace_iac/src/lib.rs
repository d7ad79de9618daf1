//! # pace_iac
//!
//! Turns a developer manifest into Terraform module artifacts.
//!
//! Generation runs in two passes over the manifest:
//!
//! 1. [`ReferenceResolver`] maps every `uses` reference to a catalog entry in
//!    the manifest's stack, walks catalog-declared dependencies depth-first
//!    and records the outputs each resource exposes.
//! 2. [`InputBuilder`] computes each request's module inputs (id binding,
//!    defaults, value mapping and `{{ ref.<id>.<output> }}` injection), and
//!    [`ArtifactGenerator`] renders and writes one artifact per request.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pace_iac::{ArtifactGenerator, GenerateOptions};
//! use pace_spec::Loader;
//! use pace_templates::TemplateRenderer;
//!
//! let manifest = Loader::load_manifest("app.yaml").unwrap();
//! let catalog = Loader::load_catalog_path("catalog.yaml").unwrap();
//!
//! let generator = ArtifactGenerator::new(&catalog, TemplateRenderer::new());
//! let report = generator
//!     .generate(&manifest, &GenerateOptions::new().output_dir("infra"))
//!     .unwrap();
//!
//! for artifact in &report.artifacts {
//!     println!("{}", artifact.path.display());
//! }
//! ```

pub mod builder;
pub mod error;
pub mod generator;
pub mod mapping;
pub mod resolver;
pub mod validator;

pub use builder::{DependencyReference, InputBuilder};
pub use error::{IacError, IacResult};
pub use generator::{
    artifact_file_name, ArtifactGenerator, GenerateOptions, GeneratedArtifact, GenerationReport, RenderedArtifact,
    DEFAULT_ARTIFACT_EXTENSION,
};
pub use mapping::{ValueMaps, ValueTable, SIZE_INPUT};
pub use resolver::{output_reference, DependencyGraph, OutputTable, ReferenceResolver, ResolvedRequest};
pub use validator::validate_manifest;
