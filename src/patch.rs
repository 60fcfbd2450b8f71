//! Patch model
//!
//! A patch describes the transition between two committed states as a
//! per-key mutation set. Each key maps to exactly one of:
//!
//! | Shape | `previous` | `next` |
//! |-------|------------|--------|
//! | Addition | absent | present |
//! | Deletion | present | absent |
//! | Modification | present | present, different |
//!
//! An entry whose `previous` equals its `next` cannot be constructed.
//!
//! Author: Moroya Sakamoto

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::hash::Descriptor;
use crate::value::Value;

/// One key's before/after pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MutationWire", into = "MutationWire")]
pub enum Mutation {
    /// Key did not exist before
    Addition { next: Value },
    /// Key no longer exists after
    Deletion { previous: Value },
    /// Key exists on both sides with different values
    Modification { previous: Value, next: Value },
}

impl Mutation {
    /// Build a mutation from an optional before/after pair
    ///
    /// Returns `None` when the pair is a no-op: both absent, or both
    /// present and deep-equal.
    pub fn between(previous: Option<Value>, next: Option<Value>) -> Option<Mutation> {
        match (previous, next) {
            (None, None) => None,
            (None, Some(next)) => Some(Mutation::Addition { next }),
            (Some(previous), None) => Some(Mutation::Deletion { previous }),
            (Some(previous), Some(next)) => {
                if previous.deep_eq(&next) {
                    None
                } else {
                    Some(Mutation::Modification { previous, next })
                }
            }
        }
    }

    /// Value before the transition
    pub fn previous(&self) -> Option<&Value> {
        match self {
            Mutation::Addition { .. } => None,
            Mutation::Deletion { previous } | Mutation::Modification { previous, .. } => {
                Some(previous)
            }
        }
    }

    /// Value after the transition
    pub fn next(&self) -> Option<&Value> {
        match self {
            Mutation::Deletion { .. } => None,
            Mutation::Addition { next } | Mutation::Modification { next, .. } => Some(next),
        }
    }

    /// Swap `previous` and `next`
    pub fn reversed(self) -> Mutation {
        match self {
            Mutation::Addition { next } => Mutation::Deletion { previous: next },
            Mutation::Deletion { previous } => Mutation::Addition { next: previous },
            Mutation::Modification { previous, next } => Mutation::Modification {
                previous: next,
                next: previous,
            },
        }
    }

    /// Split into the raw `(previous, next)` pair
    pub fn into_parts(self) -> (Option<Value>, Option<Value>) {
        match self {
            Mutation::Addition { next } => (None, Some(next)),
            Mutation::Deletion { previous } => (Some(previous), None),
            Mutation::Modification { previous, next } => (Some(previous), Some(next)),
        }
    }
}

/// Wire shape of a mutation: `{"previous"?: v, "next"?: v}`
#[derive(Serialize, Deserialize)]
struct MutationWire {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    previous: Option<Value>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    next: Option<Value>,
}

/// A field that appears on the wire is `Some`, even when it is `null`.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl TryFrom<MutationWire> for Mutation {
    type Error = String;

    fn try_from(wire: MutationWire) -> Result<Self, Self::Error> {
        Mutation::between(wire.previous, wire.next)
            .ok_or_else(|| String::from("mutation entry is a no-op (previous equals next)"))
    }
}

impl From<Mutation> for MutationWire {
    fn from(m: Mutation) -> Self {
        let (previous, next) = m.into_parts();
        MutationWire { previous, next }
    }
}

/// Immutable description of a transition between two descriptors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    mutations: BTreeMap<String, Mutation>,
    source: Descriptor,
    target: Descriptor,
}

impl Patch {
    pub fn new(
        source: Descriptor,
        target: Descriptor,
        mutations: BTreeMap<String, Mutation>,
    ) -> Self {
        Self {
            mutations,
            source,
            target,
        }
    }

    /// Patch that leaves `at` unchanged
    pub fn identity(at: Descriptor) -> Self {
        Self::new(at, at, BTreeMap::new())
    }

    /// State the patch transitions from
    pub fn source(&self) -> Descriptor {
        self.source
    }

    /// State the patch transitions to
    pub fn target(&self) -> Descriptor {
        self.target
    }

    pub fn mutations(&self) -> &BTreeMap<String, Mutation> {
        &self.mutations
    }

    pub fn mutation(&self, key: &str) -> Option<&Mutation> {
        self.mutations.get(key)
    }

    /// Number of touched keys
    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    /// True if no key is touched (descriptors may still differ)
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Inverse patch: descriptors swapped, every entry reversed
    ///
    /// Applying `p.revert()` to the state produced by `p` restores the
    /// state `p` started from.
    pub fn revert(&self) -> Patch {
        let mutations = self
            .mutations
            .iter()
            .map(|(k, m)| (k.clone(), m.clone().reversed()))
            .collect();
        Patch::new(self.target, self.source, mutations)
    }
}

/// Apply a mutation set to a map in place
///
/// Writes `next` where present, removes the key where it is absent.
/// The caller is responsible for descriptor checks.
pub fn apply_mutations(data: &mut BTreeMap<String, Value>, mutations: &BTreeMap<String, Mutation>) {
    for (key, mutation) in mutations {
        match mutation.next() {
            Some(next) => {
                data.insert(key.clone(), next.clone());
            }
            None => {
                data.remove(key);
            }
        }
    }
}
