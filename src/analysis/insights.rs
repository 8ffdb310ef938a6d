//! Shared insight record
//!
//! The mutable key-value state threaded through the pipeline. Keys are
//! namespaced by convention (`accuracy.*`, `confidence.*`, `importance.*`,
//! `ensemble.*`, and vendor prefixes for third-party blocks); a block must
//! not remove keys it does not own. The final train-time record serializes
//! into the predictor's persisted state; the global mapping of an
//! inference-time pass reuses this same type.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Open-ended mapping from insight name to structured value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InsightRecord {
    entries: BTreeMap<String, Value>,
}

impl InsightRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from existing entries, e.g. keys precomputed by the
    /// platform before the pipeline runs.
    pub fn from_entries(entries: BTreeMap<String, Value>) -> Self {
        Self { entries }
    }

    /// Number of insights.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the record holds no insights.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Store an insight. Writing an existing key overwrites it
    /// (last-writer-wins); blocks declare their keys via
    /// [`AnalysisBlock::writes`](crate::analysis::AnalysisBlock::writes)
    /// so collisions are auditable at pipeline-construction time.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    /// Serialize `value` and store it under `key`.
    pub fn insert_serialized<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> crate::error::Result<()> {
        self.entries.insert(key.into(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Look up an insight.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Look up an insight as `f64`.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.entries.get(key).and_then(Value::as_f64)
    }

    /// Look up an insight and deserialize it. Absent keys and values of the
    /// wrong shape both yield `None`; dependent blocks treat either as
    /// "insight unavailable" and degrade.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.entries
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Whether an insight is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove an insight. Reserved for the block that owns the key.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Insight names in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterate entries in sorted key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
