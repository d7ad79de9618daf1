//! Value-mapping tables applied to developer inputs.
//!
//! Developers write abstract values (`size: large`); the module needs a
//! concrete one (`db.t3.large`). A table is keyed by the input's `from` name.

use std::collections::{BTreeMap, HashMap};

use pace_spec::Value;

/// `with` key translated by the size-tier table.
pub const SIZE_INPUT: &str = "size";

/// Lookup table with a fallback for unrecognized values.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueTable {
    entries: BTreeMap<String, Value>,
    fallback: Value,
}

impl ValueTable {
    /// Create an empty table that maps everything to `fallback`.
    pub fn new(fallback: impl Into<Value>) -> Self {
        Self {
            entries: BTreeMap::new(),
            fallback: fallback.into(),
        }
    }

    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Translate a value. Non-string values are never recognized.
    pub fn apply(&self, value: &Value) -> Value {
        value
            .as_str()
            .and_then(|key| self.entries.get(key))
            .unwrap_or(&self.fallback)
            .clone()
    }

    /// Size tiers to RDS instance classes, defaulting to the smallest class.
    pub fn size_tiers() -> Self {
        Self::new("db.t3.micro")
            .with_entry("small", "db.t3.small")
            .with_entry("medium", "db.t3.medium")
            .with_entry("large", "db.t3.large")
    }
}

/// Set of tables keyed by input `from` name.
#[derive(Debug, Clone, Default)]
pub struct ValueMaps {
    tables: HashMap<String, ValueTable>,
}

impl ValueMaps {
    /// No tables; every value passes through.
    pub fn new() -> Self {
        Self::default()
    }

    /// The tables shipped with pace.
    pub fn standard() -> Self {
        Self::new().with_table(SIZE_INPUT, ValueTable::size_tiers())
    }

    pub fn with_table(mut self, from: impl Into<String>, table: ValueTable) -> Self {
        self.tables.insert(from.into(), table);
        self
    }

    pub fn get(&self, from: &str) -> Option<&ValueTable> {
        self.tables.get(from)
    }

    /// Apply the table for `from`, if there is one.
    pub fn apply(&self, from: &str, value: Value) -> Value {
        match self.tables.get(from) {
            Some(table) => table.apply(&value),
            None => value,
        }
    }
}
