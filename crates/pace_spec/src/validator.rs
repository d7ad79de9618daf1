//! Structural validation of manifests and catalogs.

use std::collections::HashSet;
use std::path::Path;

use crate::models::{Catalog, Manifest, ResourceSpec};

/// Validation result with details.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(message.into());
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn merge(&mut self, other: ValidationResult) {
        if !other.valid {
            self.valid = false;
        }
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

/// Validator for manifest and catalog documents.
pub struct SpecValidator;

impl SpecValidator {
    /// Validate a manifest on its own, without a catalog.
    pub fn validate_manifest(manifest: &Manifest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if manifest.name.is_empty() {
            result.add_warning("Manifest name is empty");
        }

        if manifest.stack.trim().is_empty() {
            result.add_error("Manifest stack cannot be empty");
        }

        let mut seen = HashSet::new();
        for (index, request) in manifest.resources.iter().enumerate() {
            if request.id.is_empty() {
                result.add_error(format!("Resource #{} has an empty id", index + 1));
            } else if !seen.insert(request.id.as_str()) {
                result.add_error(format!("Resource id '{}' is declared more than once", request.id));
            }

            if request.uses.is_empty() {
                result.add_error(format!("Resource '{}' has an empty 'uses'", request.id));
            }
        }

        result
    }

    /// Validate every catalog entry.
    ///
    /// Local module sources are checked against `base_dir` when given.
    pub fn validate_catalog(catalog: &Catalog, base_dir: Option<&Path>) -> ValidationResult {
        let mut result = ValidationResult::new();

        for (name, spec) in &catalog.resources {
            result.merge(Self::validate_entry(name, spec, base_dir));
        }

        result
    }

    /// Validate a single catalog entry.
    pub fn validate_entry(name: &str, spec: &ResourceSpec, base_dir: Option<&Path>) -> ValidationResult {
        let mut result = ValidationResult::new();

        if spec.source.is_empty() {
            result.add_error(format!("Source for resource '{}' is empty", name));
        } else if spec.is_local_source() {
            if let Some(base) = base_dir {
                let local = base.join(&spec.source);
                if !local.exists() {
                    result.add_warning(format!(
                        "Local source for resource '{}' does not exist: {}",
                        name,
                        local.display()
                    ));
                }
            }
        } else if spec.version.is_empty() {
            result.add_warning(format!("Resource '{}' does not pin a module version", name));
        }

        let mut targets = HashSet::new();
        for input in &spec.inputs {
            if input.from.is_empty() || input.to.is_empty() {
                result.add_error(format!(
                    "Resource '{}' has an input with an empty 'from' or 'to'",
                    name
                ));
                continue;
            }
            if !targets.insert(input.to.as_str()) {
                result.add_error(format!(
                    "Resource '{}' maps more than one input to '{}'",
                    name, input.to
                ));
            }
            if input.required && input.default.is_some() {
                result.add_warning(format!(
                    "Input '{}' of resource '{}' is required, its default is never used",
                    input.from, name
                ));
            }
        }

        let mut outputs = HashSet::new();
        for output in &spec.outputs {
            if output.from.is_empty() || output.to.is_empty() {
                result.add_error(format!(
                    "Resource '{}' has an output with an empty 'from' or 'to'",
                    name
                ));
                continue;
            }
            if !outputs.insert(output.to.as_str()) {
                result.add_error(format!(
                    "Resource '{}' exposes output '{}' more than once",
                    name, output.to
                ));
            }
        }

        for dependency in &spec.dependencies {
            if dependency.id.is_empty() || dependency.uses.is_empty() {
                result.add_error(format!(
                    "Resource '{}' declares a dependency with an empty 'id' or 'uses'",
                    name
                ));
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InputSpec, ResourceRequest};

    #[test]
    fn test_manifest_requires_stack_and_unique_ids() {
        let manifest = Manifest {
            name: "app".into(),
            stack: String::new(),
            default_catalog_scope: None,
            resources: vec![
                ResourceRequest::new("db", "postgres"),
                ResourceRequest::new("db", "postgres"),
            ],
        };

        let result = SpecValidator::validate_manifest(&manifest);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_valid_manifest() {
        let manifest = Manifest {
            name: "app".into(),
            stack: "aws".into(),
            default_catalog_scope: None,
            resources: vec![ResourceRequest::new("db", "postgres")],
        };
        let result = SpecValidator::validate_manifest(&manifest);
        assert!(result.valid);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_catalog_entry_checks() {
        let mut catalog = Catalog::new();
        catalog.insert(
            "community/aws/data/postgres",
            ResourceSpec::new("", "")
                .with_input(InputSpec::new("size", "instance_class"))
                .with_input(InputSpec::new("class", "instance_class"))
                .with_input(InputSpec::new("name", "db_name").required().with_default("app"))
                .with_output("endpoint", "endpoint")
                .with_output("address", "endpoint"),
        );

        let result = SpecValidator::validate_catalog(&catalog, None);
        assert!(!result.valid);
        // empty source, duplicate input target, duplicate output
        assert_eq!(result.errors.len(), 3);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_unpinned_registry_module_warns() {
        let result = SpecValidator::validate_entry(
            "community/aws/net/vpc",
            &ResourceSpec::new("terraform-aws-modules/vpc/aws", ""),
            None,
        );
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
    }
}
