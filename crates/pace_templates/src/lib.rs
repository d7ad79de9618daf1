//! # pace_templates
//!
//! Artifact rendering for pace.
//!
//! The generator hands each resource's [`RenderContext`] to an
//! [`ArtifactRenderer`]. [`TemplateRenderer`] is the stock implementation: it
//! owns a table of named templates with `{{ variable }}` placeholders, seeded
//! with a Terraform `module` block template, and formats inputs as HCL.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pace_templates::{TemplateLoader, TemplateRenderer};
//!
//! // Built-in templates only
//! let renderer = TemplateRenderer::new();
//!
//! // Or with overrides from a directory of *.tmpl files
//! let renderer = TemplateLoader::new("templates").load().unwrap();
//! # let _ = renderer;
//! ```

pub mod error;
pub mod hcl;
pub mod loader;
pub mod renderer;

pub use error::{TemplateError, TemplateResult};
pub use loader::TemplateLoader;
pub use renderer::{ArtifactRenderer, RenderContext, TemplateRenderer, MODULE_TEMPLATE};
