//! Artifact generation.
//!
//! Drives the two passes over a manifest: the dependency walk that fills the
//! output-reference table, then input building and rendering for each
//! request in manifest order.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use pace_spec::{Catalog, InputMap, Manifest, ResourceRequest};
use pace_templates::{ArtifactRenderer, RenderContext, TemplateRenderer, MODULE_TEMPLATE};
use serde::Serialize;
use tracing::{debug, info};

use crate::builder::InputBuilder;
use crate::error::{IacError, IacResult};
use crate::resolver::{DependencyGraph, ReferenceResolver};

/// Extension of generated Terraform files.
pub const DEFAULT_ARTIFACT_EXTENSION: &str = "tf";

/// Options for a generation run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Directory artifacts are written to.
    pub output_dir: PathBuf,
    /// Template rendered for every resource.
    pub template: String,
    /// File extension of artifacts, without the dot.
    pub extension: String,
    /// Also render catalog dependencies the manifest does not declare.
    pub include_dependencies: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("infra"),
            template: MODULE_TEMPLATE.to_string(),
            extension: DEFAULT_ARTIFACT_EXTENSION.to_string(),
            include_dependencies: false,
        }
    }
}

impl GenerateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn template(mut self, name: impl Into<String>) -> Self {
        self.template = name.into();
        self
    }

    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn include_dependencies(mut self, include: bool) -> Self {
        self.include_dependencies = include;
        self
    }
}

/// An artifact rendered in memory.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedArtifact {
    pub id: String,
    pub resource_type: String,
    pub file_name: String,
    pub inputs: InputMap,
    #[serde(skip)]
    pub contents: Vec<u8>,
}

/// An artifact written to disk.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedArtifact {
    pub id: String,
    pub path: PathBuf,
}

/// Outcome of a generation run.
#[derive(Debug, Default, Serialize)]
pub struct GenerationReport {
    pub artifacts: Vec<GeneratedArtifact>,
}

/// File name for the artifact of resource `id`.
///
/// Characters outside `[A-Za-z0-9_.-]` are replaced by `_`.
pub fn artifact_file_name(id: &str, extension: &str) -> String {
    let stem: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}.{}", stem, extension)
}

/// Generates one artifact per resource request.
pub struct ArtifactGenerator<'a, R = TemplateRenderer> {
    catalog: &'a Catalog,
    renderer: R,
    builder: InputBuilder,
}

impl<'a, R: ArtifactRenderer> ArtifactGenerator<'a, R> {
    /// Create a generator over a catalog with the standard input builder.
    pub fn new(catalog: &'a Catalog, renderer: R) -> Self {
        Self {
            catalog,
            renderer,
            builder: InputBuilder::new(),
        }
    }

    /// Use a custom input builder (e.g. with extra value-mapping tables).
    pub fn with_builder(mut self, builder: InputBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Render every artifact in memory.
    pub fn render(&self, manifest: &Manifest, options: &GenerateOptions) -> IacResult<Vec<RenderedArtifact>> {
        let mut artifacts = Vec::new();
        self.for_each_artifact(manifest, options, |artifact| {
            artifacts.push(artifact);
            Ok(())
        })?;
        Ok(artifacts)
    }

    /// Render and write every artifact.
    ///
    /// Stops at the first failure; artifacts already written stay on disk.
    pub fn generate(&self, manifest: &Manifest, options: &GenerateOptions) -> IacResult<GenerationReport> {
        info!(
            "Generating artifacts for '{}' (stack {}) into {:?}",
            manifest.name, manifest.stack, options.output_dir
        );

        fs::create_dir_all(&options.output_dir).map_err(|source| IacError::ArtifactWrite {
            path: options.output_dir.clone(),
            source,
        })?;

        let mut report = GenerationReport::default();
        self.for_each_artifact(manifest, options, |artifact| {
            let path = options.output_dir.join(&artifact.file_name);
            write_artifact(&path, &artifact.contents)?;
            info!("Generated {}", path.display());
            report.artifacts.push(GeneratedArtifact { id: artifact.id, path });
            Ok(())
        })?;

        info!("Generated {} artifacts", report.artifacts.len());
        Ok(report)
    }

    fn for_each_artifact<F>(&self, manifest: &Manifest, options: &GenerateOptions, mut sink: F) -> IacResult<()>
    where
        F: FnMut(RenderedArtifact) -> IacResult<()>,
    {
        check_manifest(manifest)?;

        let resolver = ReferenceResolver::new(self.catalog, &manifest.stack);
        let graph = resolver.resolve_dependency_graph(&manifest.resources)?;

        let targets = artifact_targets(manifest, &graph, options.include_dependencies);
        let file_names = plan_file_names(&targets, &options.extension)?;

        for (request, file_name) in targets.into_iter().zip(file_names) {
            let (resource_type, entry) = resolver.resolve_request(request)?;
            let inputs = self.builder.build_inputs(request, entry, &graph.outputs)?;

            let context = RenderContext {
                request,
                resource_type: &resource_type,
                entry,
                inputs: &inputs,
            };
            let contents = self
                .renderer
                .render(&options.template, &context)
                .map_err(|source| IacError::Render {
                    id: request.id.clone(),
                    source,
                })?;

            debug!("Rendered {} ({} bytes)", file_name, contents.len());
            sink(RenderedArtifact {
                id: request.id.clone(),
                resource_type,
                file_name,
                inputs,
                contents,
            })?;
        }

        Ok(())
    }
}

fn check_manifest(manifest: &Manifest) -> IacResult<()> {
    if manifest.stack.trim().is_empty() {
        return Err(IacError::InvalidManifest("stack must not be empty".to_string()));
    }

    for (index, request) in manifest.resources.iter().enumerate() {
        if request.id.is_empty() {
            return Err(IacError::InvalidManifest(format!(
                "resource #{} has an empty id",
                index + 1
            )));
        }
    }

    Ok(())
}

/// Manifest requests in order, then undeclared dependencies if requested.
fn artifact_targets<'m>(
    manifest: &'m Manifest,
    graph: &'m DependencyGraph,
    include_dependencies: bool,
) -> Vec<&'m ResourceRequest> {
    let mut targets: Vec<&ResourceRequest> = manifest.resources.iter().collect();

    if include_dependencies {
        let declared: HashSet<&str> = manifest.resources.iter().map(|r| r.id.as_str()).collect();
        targets.extend(
            graph
                .order
                .iter()
                .filter(|resolved| !declared.contains(resolved.request.id.as_str()))
                .map(|resolved| &resolved.request),
        );
    }

    targets
}

fn plan_file_names(targets: &[&ResourceRequest], extension: &str) -> IacResult<Vec<String>> {
    let mut claimed: HashMap<String, &str> = HashMap::new();
    let mut names = Vec::with_capacity(targets.len());

    for request in targets {
        let name = artifact_file_name(&request.id, extension);
        if let Some(first) = claimed.insert(name.to_lowercase(), request.id.as_str()) {
            return Err(IacError::ArtifactCollision {
                artifact: name,
                first: first.to_string(),
                second: request.id.clone(),
            });
        }
        names.push(name);
    }

    Ok(names)
}

fn write_artifact(path: &Path, contents: &[u8]) -> IacResult<()> {
    fs::write(path, contents).map_err(|source| IacError::ArtifactWrite {
        path: path.to_path_buf(),
        source,
    })
}
