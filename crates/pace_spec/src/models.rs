//! Manifest and catalog definitions.
//!
//! A manifest is what an application developer writes; a catalog is what the
//! platform team publishes. Both are plain data and are not modified once
//! loaded.

use std::collections::BTreeMap;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// The `from` name that always binds to the requesting resource's id.
pub const ID_INPUT: &str = "id";

/// An application's declaration of the infrastructure it needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Application name.
    #[serde(default)]
    pub name: String,
    /// Target platform variant (e.g. "aws"); scopes every reference.
    #[serde(default)]
    pub stack: String,
    /// Catalog scope the manifest was written against.
    #[serde(default, alias = "tap")]
    pub default_catalog_scope: Option<String>,
    /// Requested resources, in declaration order.
    #[serde(default)]
    pub resources: Vec<ResourceRequest>,
}

impl Manifest {
    /// Find a request by id.
    pub fn resource(&self, id: &str) -> Option<&ResourceRequest> {
        self.resources.iter().find(|r| r.id == id)
    }
}

/// One requested infrastructure component.
///
/// Also used for dependencies embedded in catalog entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceRequest {
    /// Unique identifier of this instance (e.g. "primary-db").
    pub id: String,
    /// Shorthand (`bucket`) or fully-qualified (`community/aws/storage/bucket`) type.
    pub uses: String,
    /// Developer-supplied inputs.
    #[serde(default, deserialize_with = "deserialize_with_block")]
    pub with: BTreeMap<String, Value>,
}

/// `with` values cannot be null; name the key instead of failing on the untagged union.
fn deserialize_with_block<'de, D>(deserializer: D) -> Result<BTreeMap<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: BTreeMap<String, Option<Value>> = BTreeMap::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(key, value)| match value {
            Some(value) => Ok((key, value)),
            None => Err(de::Error::custom(format!(
                "null is not a supported value for '{}'",
                key
            ))),
        })
        .collect()
}

impl ResourceRequest {
    pub fn new(id: impl Into<String>, uses: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            uses: uses.into(),
            with: BTreeMap::new(),
        }
    }

    pub fn with_input(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with.insert(name.into(), value.into());
        self
    }
}

/// The platform team's registry of resolvable resource types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Entries keyed by fully-qualified name.
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceSpec>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, name: impl Into<String>, spec: ResourceSpec) {
        self.resources.insert(name.into(), spec);
    }

    /// Get an entry by fully-qualified name.
    pub fn get(&self, name: &str) -> Option<&ResourceSpec> {
        self.resources.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }

    /// Entry names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// A single resource type available in the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceSpec {
    /// Module source (registry address, git URL or local path).
    pub source: String,
    /// Module version; empty for local sources.
    #[serde(default)]
    pub version: String,
    /// Input contract, in declaration order.
    #[serde(default)]
    pub inputs: Vec<InputSpec>,
    /// Exposed outputs, in declaration order.
    #[serde(default)]
    pub outputs: Vec<OutputSpec>,
    /// Resources that must be resolved before this one.
    #[serde(default)]
    pub dependencies: Vec<ResourceRequest>,
}

impl ResourceSpec {
    pub fn new(source: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    pub fn with_input(mut self, input: InputSpec) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn with_output(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.outputs.push(OutputSpec {
            from: from.into(),
            to: to.into(),
        });
        self
    }

    pub fn with_dependency(mut self, dependency: ResourceRequest) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Get the input declared for a `with` key.
    pub fn input(&self, from: &str) -> Option<&InputSpec> {
        self.inputs.iter().find(|i| i.from == from)
    }

    /// Whether the module comes from the local filesystem.
    pub fn is_local_source(&self) -> bool {
        self.source.starts_with("./") || self.source.starts_with("../") || self.source.starts_with('/')
    }
}

/// Mapping from a `with` key to a module variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSpec {
    /// Key written under `with`; `id` binds to the request id.
    pub from: String,
    /// Module variable; dots address nested structure (`versioning.enabled`).
    pub to: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Option<Value>,
}

impl InputSpec {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            required: false,
            default: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn is_id(&self) -> bool {
        self.from == ID_INPUT
    }
}

/// A module output exposed to other resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputSpec {
    /// Output name of the underlying module.
    pub from: String,
    /// Name other resources reference.
    pub to: String,
}
