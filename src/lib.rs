//! patchmap — Versioned Key-Value Map
//!
//! Commit locally, ship the patch, replay it remotely.
//!
//! Optimistic, patch-based synchronization between disconnected replicas
//! of the same dataset:
//! - Committed snapshot + mutable draft, with commit / rollback
//! - Immutable per-key patches produced by every commit
//! - Patch algebra: apply, revert, combine, structural diff
//! - `(hash, version)` descriptors guard every apply
//! - Capability-restricted producer / consumer facades
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`value`] | Stored value model with deep equality |
//! | [`hash`] | FNV-1a content hash and `(hash, version)` descriptors |
//! | [`snapshot`] | Frozen, cheaply shared committed view |
//! | [`map`] | `VersionedMap`: draft edits, commit, rollback, apply |
//! | [`patch`] | Mutation entries, patches, revert |
//! | [`combine`] | Folding contiguous patches into one |
//! | [`diff`] | Structural diff between two committed snapshots |
//! | [`facade`] | Producer / consumer views over a shared map |
//! | [`codec`] | JSON wire forms for snapshots and patches |
//! | [`history`] | Retained patch chain: catch-up and undo |
//! | [`error`] | Error kinds |
//!
//! # Logging
//!
//! Commits, applies, and rejected patches emit `tracing` events at
//! `debug` / `warn`. No subscriber is installed here.
//!
//! # Quick Start
//!
//! ```
//! use patchmap::{Patch, VersionedMap};
//!
//! let mut client = VersionedMap::new();
//! client.set("1", "Robert Heinlein").set("2", "Isaac Asimov");
//! client.commit();
//!
//! // The server starts from the client's snapshot
//! let mut server = VersionedMap::from_json(&client.to_json().unwrap()).unwrap();
//!
//! client.set("3", "Dan Simmons");
//! let patch = client.commit();
//!
//! // Ship the patch as JSON and replay it
//! let wire = patch.to_json().unwrap();
//! server.apply(&Patch::from_json(&wire).unwrap()).unwrap();
//! assert_eq!(server.version(), 2);
//! assert!(server.has("3"));
//! ```
//!
//! Author: Moroya Sakamoto

pub mod codec;
pub mod combine;
pub mod diff;
pub mod error;
pub mod facade;
pub mod hash;
pub mod history;
pub mod map;
pub mod patch;
pub mod snapshot;
pub mod value;

pub use codec::SnapshotWire;
pub use combine::{combine, squash};
pub use diff::{diff_entries, diff_maps, diff_snapshots};
pub use error::{Error, Result};
pub use facade::{Consumer, ConsumerHandle, Producer, ProducerHandle, SharedMap};
pub use hash::{content_hash, value_hash, Descriptor, Hash};
pub use history::PatchLog;
pub use map::VersionedMap;
pub use patch::{apply_mutations, Mutation, Patch};
pub use snapshot::Snapshot;
pub use value::Value;
