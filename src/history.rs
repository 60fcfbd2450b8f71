//! Retained patch history
//!
//! A `PatchLog` keeps the contiguous chain of patches committed on one
//! replica. With the chain retained, a lagging replica can catch up by
//! replaying one combined patch instead of falling back to a structural
//! diff, and the newest step can be undone by applying its revert.
//!
//! Author: Moroya Sakamoto

use std::collections::VecDeque;

use tracing::debug;

use crate::combine::squash;
use crate::error::{Error, Result};
use crate::hash::Descriptor;
use crate::patch::Patch;

/// Contiguous chain of patches, oldest first
#[derive(Debug, Clone)]
pub struct PatchLog {
    /// Descriptor the oldest retained patch starts from
    base: Descriptor,
    patches: VecDeque<Patch>,
}

impl PatchLog {
    /// Empty log starting at `base`
    pub fn new(base: Descriptor) -> Self {
        Self {
            base,
            patches: VecDeque::new(),
        }
    }

    /// Descriptor of the oldest retained state
    pub fn base(&self) -> Descriptor {
        self.base
    }

    /// Descriptor after the newest patch
    pub fn head(&self) -> Descriptor {
        self.patches.back().map_or(self.base, Patch::target)
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Retained patches, oldest first
    pub fn patches(&self) -> impl Iterator<Item = &Patch> {
        self.patches.iter()
    }

    /// Append a patch; it must start where the log currently ends
    pub fn record(&mut self, patch: Patch) -> Result<()> {
        let head = self.head();
        if patch.source() != head {
            return Err(Error::ChainMismatch {
                first_target: head,
                second_source: patch.source(),
            });
        }
        self.patches.push_back(patch);
        Ok(())
    }

    /// Single patch from `from` to the head
    ///
    /// Returns an identity patch if `from` is the head, and `Ok(None)` if
    /// `from` is not a state in the retained chain (the caller must fall
    /// back to a structural diff or a full snapshot). `record` keeps the
    /// chain contiguous, so [`Error::ChainMismatch`] here means the log
    /// was corrupted.
    pub fn since(&self, from: Descriptor) -> Result<Option<Patch>> {
        if from == self.head() {
            return Ok(Some(Patch::identity(from)));
        }
        match self.patches.iter().position(|p| p.source() == from) {
            Some(start) => squash(self.patches.range(start..)),
            None => Ok(None),
        }
    }

    /// Drop the newest patch and return its revert
    ///
    /// The returned patch applies to a replica at the old head and moves
    /// it back one step.
    pub fn undo(&mut self) -> Option<Patch> {
        let last = self.patches.pop_back()?;
        debug!(from = %last.target(), to = %last.source(), "undo");
        Some(last.revert())
    }

    /// Keep only the newest `keep` patches, returning how many were dropped
    pub fn compact(&mut self, keep: usize) -> usize {
        let excess = self.patches.len().saturating_sub(keep);
        for _ in 0..excess {
            if let Some(dropped) = self.patches.pop_front() {
                self.base = dropped.target();
            }
        }
        if excess > 0 {
            debug!(dropped = excess, base = %self.base, "compacted patch log");
        }
        excess
    }
}
