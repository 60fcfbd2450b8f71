//! Frozen committed snapshots
//!
//! A `Snapshot` is the immutable committed view of a map. Cloning it is
//! O(1); every commit or apply swaps in a whole new snapshot instead of
//! editing the old one, so readers holding a clone never see a
//! half-updated state.
//!
//! Author: Moroya Sakamoto

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::value::Value;

/// Immutable key → value mapping
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    entries: Arc<BTreeMap<String, Value>>,
}

impl Snapshot {
    pub fn new(entries: BTreeMap<String, Value>) -> Self {
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Look up a key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Membership by key
    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Membership by value (linear scan, deep equality)
    pub fn contains(&self, value: &Value) -> bool {
        self.entries.values().any(|v| v.deep_eq(value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.values()
    }

    /// Borrow the underlying map
    pub fn as_map(&self) -> &BTreeMap<String, Value> {
        &self.entries
    }

    /// Owned copy of the entries, for seeding a draft
    pub fn to_map(&self) -> BTreeMap<String, Value> {
        self.entries.as_ref().clone()
    }

    /// True if both snapshots share storage (no comparison needed)
    pub fn ptr_eq(&self, other: &Snapshot) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.entries == other.entries
    }
}

impl From<BTreeMap<String, Value>> for Snapshot {
    fn from(entries: BTreeMap<String, Value>) -> Self {
        Self::new(entries)
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Snapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        BTreeMap::<String, Value>::deserialize(deserializer).map(Snapshot::new)
    }
}
