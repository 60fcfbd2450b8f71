//! Versioned map
//!
//! A key-value container with a frozen `committed` snapshot and a
//! mutable `draft`. Writes go to the draft; `commit` promotes the draft,
//! bumps the version, rehashes, and hands back the [`Patch`] describing
//! the step. A remote replica replays that patch with `apply`, which is
//! guarded by an optimistic `(hash, version)` check.
//!
//! ```text
//!   set/delete        commit / rollback
//! Clean ───────▶ Dirty ─────────────────▶ Clean
//!   ▲  │                                    │
//!   │  └── commit (empty patch) ────────────┘
//!   └───── apply (Clean only) ──────────────┘
//! ```
//!
//! Author: Moroya Sakamoto

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::diff::diff_entries;
use crate::error::{Error, Result};
use crate::hash::{content_hash, Descriptor, Hash};
use crate::patch::{apply_mutations, Patch};
use crate::snapshot::Snapshot;
use crate::value::Value;

/// Committed snapshot + draft overlay + version descriptor
#[derive(Debug, Clone)]
pub struct VersionedMap {
    /// Last committed (or applied) state
    committed: Snapshot,
    /// Working copy, seeded from `committed`
    draft: BTreeMap<String, Value>,
    /// Incremented on commit, taken from the patch on apply
    version: u64,
    /// Always `content_hash(committed)`, or the hash a trusted patch carried
    hash: Hash,
    /// Draft has edits since the last commit/rollback/apply
    dirty: bool,
}

impl Default for VersionedMap {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionedMap {
    /// Empty map at version 0
    pub fn new() -> Self {
        Self::from_parts(Snapshot::default(), 0, content_hash(&BTreeMap::new()))
    }

    /// Rebuild a clean map from a known committed state
    ///
    /// The hash is taken as given; see [`verify_hash`](Self::verify_hash).
    pub fn from_parts(committed: Snapshot, version: u64, hash: Hash) -> Self {
        let draft = committed.to_map();
        Self {
            committed,
            draft,
            version,
            hash,
            dirty: false,
        }
    }

    // ── Reads ─────────────────────────────────────────────────────────

    /// Read from the draft (sees uncommitted edits)
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.draft.get(key)
    }

    /// Key membership in the committed view
    pub fn has(&self, key: &str) -> bool {
        self.committed.has(key)
    }

    /// Value membership in the committed view (deep equality)
    pub fn contains(&self, value: &Value) -> bool {
        self.committed.contains(value)
    }

    /// Committed snapshot (cheap clone)
    pub fn committed(&self) -> &Snapshot {
        &self.committed
    }

    /// Working copy
    pub fn draft(&self) -> &BTreeMap<String, Value> {
        &self.draft
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn hash(&self) -> Hash {
        self.hash
    }

    /// Current `(hash, version)`
    pub fn descriptor(&self) -> Descriptor {
        Descriptor::new(self.hash, self.version)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// True if the stored hash matches the committed content
    pub fn verify_hash(&self) -> bool {
        content_hash(self.committed.as_map()) == self.hash
    }

    // ── Draft edits ───────────────────────────────────────────────────

    /// Stage `key = value` in the draft
    ///
    /// Writing a value deep-equal to the one already staged is a no-op and
    /// leaves the dirty flag alone.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        if self.draft.get(&key).is_some_and(|old| old.deep_eq(&value)) {
            return self;
        }
        self.draft.insert(key, value);
        self.dirty = true;
        self
    }

    /// Stage removal of `key`. Returns `true` if the draft held it.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.draft.remove(key).is_some();
        if removed {
            self.dirty = true;
        }
        removed
    }

    // ── Transitions ───────────────────────────────────────────────────

    /// Promote the draft and return the patch for this step
    ///
    /// Always advances the version by one, even with nothing staged; the
    /// returned patch then has an empty mutation set.
    pub fn commit(&mut self) -> Patch {
        let source = self.descriptor();
        let mutations = diff_entries(self.committed.as_map(), &self.draft);

        if !mutations.is_empty() {
            self.committed = Snapshot::new(self.draft.clone());
        }
        self.version += 1;
        self.hash = content_hash(self.committed.as_map());
        self.dirty = false;

        let target = self.descriptor();
        debug!(
            source = %source,
            target = %target,
            mutations = mutations.len(),
            "committed draft"
        );
        Patch::new(source, target, mutations)
    }

    /// Discard staged edits
    pub fn rollback(&mut self) {
        if self.dirty {
            debug!(version = self.version, "rolled back draft");
        }
        self.draft = self.committed.to_map();
        self.dirty = false;
    }

    /// Replay a patch produced on another replica
    ///
    /// Fails with [`Error::VersionMismatch`] if the patch does not start at
    /// this map's descriptor, or [`Error::StateConflict`] if the draft has
    /// uncommitted edits. On failure nothing changes. On success the
    /// version and hash are taken from the patch target, not recomputed.
    pub fn apply(&mut self, patch: &Patch) -> Result<()> {
        let actual = self.descriptor();
        if patch.source() != actual {
            warn!(expected = %patch.source(), actual = %actual, "patch rejected: version mismatch");
            return Err(Error::VersionMismatch {
                expected: patch.source(),
                actual,
            });
        }
        if self.dirty {
            warn!(version = self.version, "patch rejected: uncommitted draft");
            return Err(Error::StateConflict);
        }

        let mut next = self.committed.to_map();
        apply_mutations(&mut next, patch.mutations());

        let target = patch.target();
        self.draft = next.clone();
        self.committed = Snapshot::new(next);
        self.version = target.version;
        self.hash = target.hash;
        self.dirty = false;

        debug!(
            source = %actual,
            target = %target,
            mutations = patch.len(),
            "applied patch"
        );
        Ok(())
    }
}
