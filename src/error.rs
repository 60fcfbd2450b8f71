//! Error types
//!
//! Every error is a local precondition violation: the map or patch
//! involved is left exactly as it was before the failed call.
//!
//! Author: Moroya Sakamoto

use thiserror::Error;

use crate::hash::Descriptor;

/// Errors raised by the versioning engine
#[derive(Debug, Error)]
pub enum Error {
    /// Patch source does not match the replica's current descriptor.
    #[error("version mismatch: patch starts at {expected}, replica is at {actual}")]
    VersionMismatch {
        /// Source descriptor carried by the patch
        expected: Descriptor,
        /// Descriptor of the replica the patch was applied to
        actual: Descriptor,
    },
    /// Replica has uncommitted draft edits.
    #[error("state conflict: replica has uncommitted changes, commit or roll back first")]
    StateConflict,
    /// Two patches do not form a contiguous chain.
    #[error("chain mismatch: first patch ends at {first_target}, second starts at {second_source}")]
    ChainMismatch {
        /// Target descriptor of the earlier patch
        first_target: Descriptor,
        /// Source descriptor of the later patch
        second_source: Descriptor,
    },
    /// Wire form could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = core::result::Result<T, Error>;
