//! Validate command - Check a manifest and catalog without generating.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use thiserror::Error;
use tracing::info;

use pace_spec::{SpecValidator, ValidationResult};

use super::load_documents;

/// Validation found errors; they have already been printed.
#[derive(Debug, Error)]
#[error("Validation failed with {0} error(s)")]
pub struct ValidationFailed(pub usize);

#[derive(Args)]
pub struct ValidateArgs {
    /// Application manifest
    #[arg(short, long, env = "PACE_APP_FILE", default_value = "app.yaml")]
    app_file: PathBuf,

    /// Catalog file, or a directory of catalog files
    #[arg(short, long, env = "PACE_CATALOG", default_value = "catalogs")]
    catalog: PathBuf,

    /// Directory local module sources are resolved against
    #[arg(long)]
    module_root: Option<PathBuf>,
}

pub fn execute(args: ValidateArgs) -> Result<()> {
    let (manifest, catalog) = load_documents(&args.app_file, &args.catalog)?;
    info!("Validating {} against {}", args.app_file.display(), args.catalog.display());

    println!("📋 Validating catalog...");
    let catalog_result = SpecValidator::validate_catalog(&catalog, args.module_root.as_deref());
    report("Catalog", &catalog_result);

    println!("📋 Validating manifest...");
    let manifest_result = pace_iac::validate_manifest(&manifest, &catalog);
    report("Manifest", &manifest_result);

    let errors = catalog_result.errors.len() + manifest_result.errors.len();
    println!();
    if errors == 0 {
        println!("✅ All validations passed!");
        Ok(())
    } else {
        println!("❌ Some validations failed. Please fix the issues above.");
        Err(ValidationFailed(errors).into())
    }
}

fn report(label: &str, result: &ValidationResult) {
    if result.valid {
        println!("   ✅ {} validation passed", label);
    } else {
        println!("   ❌ {} validation failed:", label);
        for error in &result.errors {
            println!("      - {}", error);
        }
    }

    for warning in &result.warnings {
        println!("   ⚠️  {}", warning);
    }
}
