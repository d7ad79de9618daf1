//! Validation of a manifest against a catalog.
//!
//! Unlike generation, which stops at the first failure, validation collects
//! every problem it can find so they can be fixed in one pass.

use pace_spec::{Catalog, Manifest, SpecValidator, ValidationResult};
use tracing::debug;

use crate::builder::InputBuilder;
use crate::error::IacError;
use crate::resolver::ReferenceResolver;

/// Check that `manifest` can be generated against `catalog`.
pub fn validate_manifest(manifest: &Manifest, catalog: &Catalog) -> ValidationResult {
    let mut result = SpecValidator::validate_manifest(manifest);
    if manifest.stack.trim().is_empty() {
        return result;
    }

    let resolver = ReferenceResolver::new(catalog, &manifest.stack);
    let builder = InputBuilder::new();

    for request in manifest.resources.iter().filter(|r| !r.uses.is_empty()) {
        let (resource_type, entry) = match resolver.resolve_request(request) {
            Ok(resolved) => resolved,
            Err(e) => {
                result.add_error(describe(&request.id, &e));
                continue;
            }
        };
        debug!("Validating {} against {}", request.id, resource_type);

        for input in entry.inputs.iter().filter(|i| i.required && !i.is_id()) {
            if !request.with.contains_key(&input.from) {
                result.add_error(format!(
                    "{}: missing required input '{}' for {}",
                    request.id, input.from, resource_type
                ));
            }
        }

        for key in request.with.keys() {
            if entry.input(key).is_none() {
                result.add_warning(format!(
                    "{}: input '{}' is not declared by {} and will be ignored",
                    request.id, key, resource_type
                ));
            }
        }
    }

    // Graph and dry-build errors would repeat what was reported above.
    if !result.valid {
        return result;
    }

    let graph = match resolver.resolve_dependency_graph(&manifest.resources) {
        Ok(graph) => graph,
        Err(e) => {
            result.add_error(match e.resource_id() {
                Some(id) => describe(id, &e),
                None => e.to_string(),
            });
            return result;
        }
    };

    for request in &manifest.resources {
        let entry = match graph.get(&request.id).and_then(|r| catalog.get(&r.resource_type)) {
            Some(entry) => entry,
            None => continue,
        };
        if let Err(e) = builder.build_inputs(request, entry, &graph.outputs) {
            result.add_error(describe(&request.id, &e));
        }
    }

    result
}

fn describe(id: &str, error: &IacError) -> String {
    format!("{}: {}", id, error.root_cause())
}
