//! Structural diff engine
//!
//! Recomputes a patch by comparing two committed snapshots key by key.
//! Used when the incremental patch history between two replicas was not
//! retained. It is the expensive path: cost is linear in the union of
//! keys plus a deep comparison of every shared value, where replaying
//! committed patches costs only the touched keys.
//!
//! 1. Key only in target -> Addition
//! 2. Key only in source -> Deletion
//! 3. Key in both, values not deep-equal -> Modification
//! 4. Key in both, deep-equal -> omitted
//!
//! Author: Moroya Sakamoto

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::hash::Descriptor;
use crate::map::VersionedMap;
use crate::patch::{Mutation, Patch};
use crate::snapshot::Snapshot;
use crate::value::Value;

/// Mutation set turning `old` into `new`
///
/// Both maps are walked once in key order (merge join), so no lookups
/// are needed.
pub fn diff_entries(
    old: &BTreeMap<String, Value>,
    new: &BTreeMap<String, Value>,
) -> BTreeMap<String, Mutation> {
    let mut out = BTreeMap::new();
    let mut old_iter = old.iter().peekable();
    let mut new_iter = new.iter().peekable();

    loop {
        let order = match (old_iter.peek(), new_iter.peek()) {
            (None, None) => break,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some((ok, _)), Some((nk, _))) => ok.cmp(nk),
        };
        match order {
            Ordering::Less => {
                if let Some((key, previous)) = old_iter.next() {
                    out.insert(
                        key.clone(),
                        Mutation::Deletion {
                            previous: previous.clone(),
                        },
                    );
                }
            }
            Ordering::Greater => {
                if let Some((key, next)) = new_iter.next() {
                    out.insert(key.clone(), Mutation::Addition { next: next.clone() });
                }
            }
            Ordering::Equal => {
                if let (Some((key, previous)), Some((_, next))) = (old_iter.next(), new_iter.next())
                {
                    if let Some(m) = Mutation::between(Some(previous.clone()), Some(next.clone())) {
                        out.insert(key.clone(), m);
                    }
                }
            }
        }
    }
    out
}

/// Patch between two snapshots with explicit descriptors
pub fn diff_snapshots(
    source: &Snapshot,
    source_descriptor: Descriptor,
    target: &Snapshot,
    target_descriptor: Descriptor,
) -> Patch {
    let mutations = if source.ptr_eq(target) {
        BTreeMap::new()
    } else {
        diff_entries(source.as_map(), target.as_map())
    };
    Patch::new(source_descriptor, target_descriptor, mutations)
}

/// Patch turning `source`'s committed state into `target`'s
///
/// Drafts are ignored on both sides. Descriptors are copied from the
/// maps' current state.
pub fn diff_maps(source: &VersionedMap, target: &VersionedMap) -> Patch {
    diff_snapshots(
        source.committed(),
        source.descriptor(),
        target.committed(),
        target.descriptor(),
    )
}

impl Patch {
    /// Recompute a patch by structural comparison (see [`diff_maps`])
    pub fn from_diff(source: &VersionedMap, target: &VersionedMap) -> Patch {
        diff_maps(source, target)
    }
}
