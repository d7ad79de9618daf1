//! Input building for a single resource.
//!
//! Turns a request's `with` block into the variables passed to its module:
//! the id convention, required/default handling, value mapping and
//! substitution of `{{ ns.id.output }}` dependency references.

use pace_spec::{InputMap, InputValue, ResourceRequest, ResourceSpec, Value};
use regex::Regex;
use tracing::{debug, warn};

use crate::error::{IacError, IacResult};
use crate::mapping::ValueMaps;
use crate::resolver::OutputTable;

/// A parsed `{{ <namespace>.<id>.<output> }}` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyReference<'a> {
    pub namespace: &'a str,
    pub id: &'a str,
    pub output: &'a str,
}

/// Builds the final input mapping for requests.
#[derive(Debug, Clone)]
pub struct InputBuilder {
    value_maps: ValueMaps,
    reference_pattern: Regex,
}

impl Default for InputBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBuilder {
    /// Create a builder with the standard value-mapping tables.
    pub fn new() -> Self {
        Self::with_value_maps(ValueMaps::standard())
    }

    pub fn with_value_maps(value_maps: ValueMaps) -> Self {
        Self {
            value_maps,
            // Whole value wrapped in {{ }}
            reference_pattern: Regex::new(r"(?s)^\{\{(.*)\}\}$").unwrap(),
        }
    }

    pub fn value_maps(&self) -> &ValueMaps {
        &self.value_maps
    }

    /// Compute the module inputs for `request` against its catalog entry.
    ///
    /// Keys come out sorted by destination name. Optional inputs that are
    /// neither provided nor defaulted are left out.
    pub fn build_inputs(
        &self,
        request: &ResourceRequest,
        spec: &ResourceSpec,
        outputs: &OutputTable,
    ) -> IacResult<InputMap> {
        let mut inputs = InputMap::new();

        for input in spec.inputs.iter().filter(|i| i.is_id()) {
            inputs.insert(input.to.clone(), InputValue::Literal(Value::from(request.id.as_str())));
        }

        for input in spec.inputs.iter().filter(|i| !i.is_id()) {
            let value = match (request.with.get(&input.from), &input.default) {
                (Some(value), _) => value.clone(),
                (None, _) if input.required => {
                    return Err(IacError::MissingRequiredInput {
                        id: request.id.clone(),
                        input: input.from.clone(),
                    });
                }
                (None, Some(default)) => default.clone(),
                (None, None) => continue,
            };

            let value = self.value_maps.apply(&input.from, value);
            let value = self.inject(&request.id, value, outputs)?;
            inputs.insert(input.to.clone(), value);
        }

        for key in request.with.keys() {
            if spec.input(key).is_none() {
                warn!("Resource '{}' sets '{}', which its catalog entry does not declare", request.id, key);
            }
        }

        debug!("Built {} inputs for {}", inputs.len(), request.id);
        Ok(inputs)
    }

    /// Parse a dependency reference.
    ///
    /// Returns `None` when `value` is not wrapped in `{{ }}` at all, and
    /// `Some(None)` when it is but does not have exactly three segments.
    pub fn parse_reference<'v>(&self, value: &'v str) -> Option<Option<DependencyReference<'v>>> {
        let body = self.reference_pattern.captures(value)?.get(1)?.as_str();
        let segments: Vec<&str> = body.split('.').map(str::trim).collect();

        match *segments.as_slice() {
            [namespace, id, output] if !id.is_empty() && !output.is_empty() => {
                Some(Some(DependencyReference {
                    namespace,
                    id,
                    output,
                }))
            }
            _ => Some(None),
        }
    }

    fn inject(&self, request_id: &str, value: Value, outputs: &OutputTable) -> IacResult<InputValue> {
        let text = match value {
            Value::String(text) => text,
            other => return Ok(InputValue::Literal(other)),
        };

        let parsed = self
            .parse_reference(&text)
            .map(|r| r.map(|r| (r.id.to_string(), r.output.to_string())));

        let (dependency, output) = match parsed {
            None => return Ok(InputValue::Literal(Value::String(text))),
            Some(None) => {
                return Err(IacError::MalformedReference {
                    id: request_id.to_string(),
                    reference: text,
                })
            }
            Some(Some(parts)) => parts,
        };

        let row = outputs.row(&dependency).ok_or_else(|| IacError::UnresolvedDependency {
            id: request_id.to_string(),
            reference: text.clone(),
            reason: format!("dependency '{}' not found", dependency),
        })?;

        let address = row.get(&output).ok_or_else(|| IacError::UnresolvedDependency {
            id: request_id.to_string(),
            reference: text.clone(),
            reason: format!("output '{}' not found on dependency '{}'", output, dependency),
        })?;

        debug!("Injected {} into {} as {}", text, request_id, address);
        Ok(InputValue::Reference(address.clone()))
    }
}
