//! CLI command definitions.
//!
//! This module defines the command structure for the pace CLI.

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use pace_spec::{Catalog, Loader, Manifest};

pub mod generate;
pub mod validate;

/// pace - Terraform modules from application manifests
#[derive(Parser)]
#[command(name = "pace")]
#[command(version, about = "pace - Terraform modules from application manifests")]
#[command(long_about = r#"
pace turns an application manifest (app.yaml) into Terraform module
artifacts, using a catalog of modules published by the platform team.

WORKFLOWS:
  generate  → Resolve the manifest against the catalog and write one .tf per resource
  validate  → Check the manifest and catalog without writing anything

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Validation failure
  4 - Template error
  5 - IaC error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate Terraform artifacts from a manifest
    #[command(visible_alias = "gen")]
    Generate(generate::GenerateArgs),

    /// Validate a manifest against a catalog
    Validate(validate::ValidateArgs),
}

/// Load the manifest and the catalog (a file or a directory of files).
pub(crate) fn load_documents(app_file: &Path, catalog: &Path) -> Result<(Manifest, Catalog)> {
    let manifest = Loader::load_manifest(app_file)
        .with_context(|| format!("Failed to load manifest {}", app_file.display()))?;
    let catalog_doc = Loader::load_catalog_path(catalog)
        .with_context(|| format!("Failed to load catalog {}", catalog.display()))?;

    info!(
        "Loaded manifest '{}' ({} resources) and {} catalog entries",
        manifest.name,
        manifest.resources.len(),
        catalog_doc.len()
    );
    Ok((manifest, catalog_doc))
}
