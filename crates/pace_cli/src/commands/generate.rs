//! Generate command - Write Terraform artifacts for a manifest.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use pace_iac::{ArtifactGenerator, GenerateOptions, DEFAULT_ARTIFACT_EXTENSION};
use pace_templates::{TemplateLoader, TemplateRenderer, MODULE_TEMPLATE};

use super::load_documents;

#[derive(Args)]
pub struct GenerateArgs {
    /// Application manifest
    #[arg(short, long, env = "PACE_APP_FILE", default_value = "app.yaml")]
    app_file: PathBuf,

    /// Catalog file, or a directory of catalog files
    #[arg(short, long, env = "PACE_CATALOG", default_value = "catalogs")]
    catalog: PathBuf,

    /// Directory the artifacts are written to
    #[arg(short, long, env = "PACE_OUTPUT_DIR", default_value = "infra")]
    output_dir: PathBuf,

    /// Directory of *.tmpl files overriding or adding templates
    #[arg(long, env = "PACE_TEMPLATES")]
    templates: Option<PathBuf>,

    /// Template rendered for each resource
    #[arg(long, default_value = MODULE_TEMPLATE)]
    template: String,

    /// Artifact file extension
    #[arg(long, default_value = DEFAULT_ARTIFACT_EXTENSION)]
    extension: String,

    /// Also write artifacts for catalog dependencies not declared in the manifest
    #[arg(long)]
    with_dependencies: bool,

    /// Print the built inputs of each resource as JSON instead of writing files
    #[arg(long)]
    print_inputs: bool,
}

pub fn execute(args: GenerateArgs) -> Result<()> {
    let (manifest, catalog) = load_documents(&args.app_file, &args.catalog)?;

    let renderer = match &args.templates {
        Some(dir) => {
            info!("Loading templates from {}", dir.display());
            TemplateLoader::new(dir)
                .load()
                .with_context(|| format!("Failed to load templates from {}", dir.display()))?
        }
        None => TemplateRenderer::new(),
    };

    let options = GenerateOptions::new()
        .output_dir(&args.output_dir)
        .template(&args.template)
        .extension(&args.extension)
        .include_dependencies(args.with_dependencies);
    let generator = ArtifactGenerator::new(&catalog, renderer);

    if args.print_inputs {
        let artifacts = generator.render(&manifest, &options)?;
        println!("{}", serde_json::to_string_pretty(&artifacts)?);
        return Ok(());
    }

    println!("🏗️  Generating '{}' for stack {}...", manifest.name, manifest.stack);
    let report = generator.generate(&manifest, &options)?;

    for artifact in &report.artifacts {
        println!("   ✅ {} → {}", artifact.id, artifact.path.display());
    }
    println!();
    println!(
        "✅ Wrote {} artifacts to {}",
        report.artifacts.len(),
        args.output_dir.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use pace_iac::IacError;
    use tempfile::tempdir;

    const CATALOG: &str = r#"
resources:
  community/aws/storage/bucket:
    source: terraform-aws-modules/s3-bucket/aws
    version: "3.15.1"
    inputs:
      - from: id
        to: bucket
      - from: versioning
        to: versioning.enabled
"#;

    fn args(dir: &std::path::Path, manifest: &str) -> GenerateArgs {
        fs::write(dir.join("app.yaml"), manifest).unwrap();
        fs::write(dir.join("catalog.yaml"), CATALOG).unwrap();
        GenerateArgs {
            app_file: dir.join("app.yaml"),
            catalog: dir.join("catalog.yaml"),
            output_dir: dir.join("infra"),
            templates: None,
            template: MODULE_TEMPLATE.to_string(),
            extension: DEFAULT_ARTIFACT_EXTENSION.to_string(),
            with_dependencies: false,
            print_inputs: false,
        }
    }

    #[test]
    fn test_generate_writes_artifacts() {
        let dir = tempdir().unwrap();
        let args = args(
            dir.path(),
            "name: demo\nstack: aws\nresources:\n  - id: my-bucket\n    uses: bucket\n    with:\n      versioning: true\n",
        );

        execute(args).unwrap();

        let contents = fs::read_to_string(dir.path().join("infra").join("my-bucket.tf")).unwrap();
        assert!(contents.contains("bucket = \"my-bucket\""));
    }

    #[test]
    fn test_generate_surfaces_pipeline_errors() {
        let dir = tempdir().unwrap();
        let args = args(
            dir.path(),
            "name: demo\nstack: gcp\nresources:\n  - id: my-bucket\n    uses: bucket\n",
        );

        let err = execute(args).unwrap_err();
        let iac = err.downcast_ref::<IacError>().unwrap();
        assert!(matches!(iac.root_cause(), IacError::NotFound { .. }));
        assert!(!dir.path().join("infra").join("my-bucket.tf").exists());
    }
}
