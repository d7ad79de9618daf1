//! Reference resolution and dependency walking.
//!
//! The resolver handles:
//! - Mapping shorthand and fully-qualified `uses` references to catalog entries
//! - Scoping every lookup to the manifest's stack
//! - Walking catalog-declared dependencies depth-first, dependencies first
//! - Building the output-reference table consumed by the input builder

use std::collections::{BTreeMap, HashMap, HashSet};

use pace_spec::{Catalog, ResourceRequest, ResourceSpec};
use tracing::debug;

use crate::error::{IacError, IacResult};

/// Separator between segments of a fully-qualified catalog name.
pub const PATH_SEPARATOR: char = '/';

/// Index of the stack segment in a fully-qualified name (`<scope>/<stack>/...`).
const STACK_SEGMENT: usize = 1;

/// Address of output `from` of the module instantiated for `id`.
pub fn output_reference(id: &str, from: &str) -> String {
    format!("module.{}.{}", id, from)
}

/// Resource id → exposed output name → module address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputTable {
    rows: BTreeMap<String, BTreeMap<String, String>>,
}

impl OutputTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the address of `output` on resource `id`.
    pub fn get(&self, id: &str, output: &str) -> Option<&str> {
        self.rows.get(id)?.get(output).map(String::as_str)
    }

    /// All outputs of resource `id`.
    pub fn row(&self, id: &str) -> Option<&BTreeMap<String, String>> {
        self.rows.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.rows.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, String>)> {
        self.rows.iter().map(|(id, row)| (id.as_str(), row))
    }

    fn insert(&mut self, id: String, row: BTreeMap<String, String>) {
        self.rows.insert(id, row);
    }
}

/// A request together with the catalog entry name it resolved to.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRequest {
    pub request: ResourceRequest,
    pub resource_type: String,
}

/// Result of walking a set of requests and their transitive dependencies.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Output-reference table for every visited id.
    pub outputs: OutputTable,
    /// Every visited request, dependencies before their dependents.
    pub order: Vec<ResolvedRequest>,
}

impl DependencyGraph {
    /// Get the resolved request for an id.
    pub fn get(&self, id: &str) -> Option<&ResolvedRequest> {
        self.order.iter().find(|r| r.request.id == id)
    }
}

enum VisitState {
    InProgress,
    Done(String),
}

/// Resolves references against a catalog, scoped to one stack.
pub struct ReferenceResolver<'a> {
    catalog: &'a Catalog,
    stack: &'a str,
}

impl<'a> ReferenceResolver<'a> {
    /// Create a new reference resolver.
    pub fn new(catalog: &'a Catalog, stack: &'a str) -> Self {
        Self { catalog, stack }
    }

    pub fn stack(&self) -> &str {
        self.stack
    }

    /// Resolve a `uses` reference to a fully-qualified catalog name.
    ///
    /// A reference without `/` is shorthand and must match exactly one catalog
    /// entry whose last segment equals it and which has the resolver's stack
    /// as one of its other segments. A fully-qualified reference is returned unchanged if
    /// its stack segment matches.
    pub fn resolve_reference(&self, reference: &str) -> IacResult<String> {
        if !reference.contains(PATH_SEPARATOR) {
            return self.resolve_shorthand(reference);
        }

        if reference.split(PATH_SEPARATOR).nth(STACK_SEGMENT) != Some(self.stack) {
            return Err(IacError::StackMismatch {
                reference: reference.to_string(),
                stack: self.stack.to_string(),
            });
        }

        Ok(reference.to_string())
    }

    fn resolve_shorthand(&self, reference: &str) -> IacResult<String> {
        let candidates: Vec<&str> = self
            .catalog
            .names()
            .filter(|name| {
                let segments: Vec<&str> = name.split(PATH_SEPARATOR).collect();
                match segments.split_last() {
                    Some((last, parents)) => *last == reference && parents.contains(&self.stack),
                    None => false,
                }
            })
            .collect();

        match candidates.as_slice() {
            [] => Err(IacError::NotFound {
                reference: reference.to_string(),
                stack: self.stack.to_string(),
            }),
            [single] => Ok(single.to_string()),
            _ => Err(IacError::AmbiguousReference {
                reference: reference.to_string(),
                stack: self.stack.to_string(),
                candidates: candidates.iter().map(|c| c.to_string()).collect(),
            }),
        }
    }

    /// Resolve a reference and fetch its catalog entry.
    pub fn resolve_entry(&self, reference: &str) -> IacResult<(String, &'a ResourceSpec)> {
        let name = self.resolve_reference(reference)?;
        match self.catalog.get(&name) {
            Some(entry) => Ok((name, entry)),
            None => Err(IacError::NotFound {
                reference: name,
                stack: self.stack.to_string(),
            }),
        }
    }

    /// Resolve a request's `uses`, naming the request in any error.
    pub fn resolve_request(&self, request: &ResourceRequest) -> IacResult<(String, &'a ResourceSpec)> {
        let resolved = self
            .resolve_entry(&request.uses)
            .map_err(|e| e.in_resource(&request.id))?;
        debug!("Resolved {} ({}) to {}", request.id, request.uses, resolved.0);
        Ok(resolved)
    }

    /// Walk `requests` and their transitive catalog dependencies.
    ///
    /// Each id is resolved once; a dependency's output row is committed
    /// before its dependent's. Re-entering an id that is still being resolved
    /// is a cycle.
    pub fn resolve_dependency_graph(&self, requests: &[ResourceRequest]) -> IacResult<DependencyGraph> {
        let mut seen = HashSet::new();
        for request in requests {
            if !seen.insert(request.id.as_str()) {
                return Err(IacError::DuplicateResourceId(request.id.clone()));
            }
        }

        let mut graph = DependencyGraph::default();
        let mut states = HashMap::new();
        let mut path = Vec::new();

        for request in requests {
            self.visit(request, &mut states, &mut path, &mut graph)?;
        }

        debug!(
            "Resolved dependency graph: {} resources, {} top-level",
            graph.order.len(),
            requests.len()
        );
        Ok(graph)
    }

    fn visit(
        &self,
        request: &ResourceRequest,
        states: &mut HashMap<String, VisitState>,
        path: &mut Vec<String>,
        graph: &mut DependencyGraph,
    ) -> IacResult<()> {
        match states.get(&request.id) {
            Some(VisitState::InProgress) => {
                let start = path.iter().position(|id| *id == request.id).unwrap_or(0);
                let mut cycle = path[start..].to_vec();
                cycle.push(request.id.clone());
                return Err(IacError::CyclicDependency { cycle });
            }
            Some(VisitState::Done(existing)) => {
                let (resource_type, _) = self.resolve_request(request)?;
                if *existing != resource_type {
                    return Err(IacError::ConflictingResourceId {
                        id: request.id.clone(),
                        existing: existing.clone(),
                        requested: resource_type,
                    });
                }
                return Ok(());
            }
            None => {}
        }

        let (resource_type, entry) = self.resolve_request(request)?;

        states.insert(request.id.clone(), VisitState::InProgress);
        path.push(request.id.clone());

        for dependency in &entry.dependencies {
            self.visit(dependency, states, path, graph)?;
        }

        path.pop();

        let row = entry
            .outputs
            .iter()
            .map(|output| (output.to.clone(), output_reference(&request.id, &output.from)))
            .collect();
        graph.outputs.insert(request.id.clone(), row);
        graph.order.push(ResolvedRequest {
            request: request.clone(),
            resource_type: resource_type.clone(),
        });
        states.insert(request.id.clone(), VisitState::Done(resource_type));

        Ok(())
    }
}
