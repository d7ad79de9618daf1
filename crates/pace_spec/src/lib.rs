//! # pace_spec
//!
//! Manifest and catalog model for pace.
//!
//! A developer describes the infrastructure an application needs in a
//! manifest (`app.yaml`); the platform team publishes a catalog of reusable
//! Terraform modules (`catalog.yaml`). This crate holds the typed form of both
//! documents, loads them from disk or memory and checks their structure.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pace_spec::{Loader, SpecValidator};
//!
//! let manifest = Loader::load_manifest("app.yaml").unwrap();
//! let catalog = Loader::load_catalog_path("catalogs").unwrap();
//!
//! let result = SpecValidator::validate_manifest(&manifest);
//! for error in &result.errors {
//!     eprintln!("Error: {}", error);
//! }
//! # let _ = catalog;
//! ```

pub mod error;
pub mod loader;
pub mod models;
pub mod validator;
pub mod value;

pub use error::{SpecError, SpecResult};
pub use loader::{DocumentFormat, Loader};
pub use models::{Catalog, InputSpec, Manifest, OutputSpec, ResourceRequest, ResourceSpec, ID_INPUT};
pub use validator::{SpecValidator, ValidationResult};
pub use value::{InputMap, InputValue, Value};
