//! Patch composition
//!
//! Folds two contiguous patches (A→B, B→C) into a single A→C patch.
//! Per key, the combined entry keeps the earliest `previous` and the
//! latest `next`; keys whose net effect is nothing are dropped, so the
//! result never carries a no-op entry.
//!
//! Author: Moroya Sakamoto

use std::collections::btree_map::Entry;

use crate::error::{Error, Result};
use crate::patch::{Mutation, Patch};

/// Combine `first` followed by `second` into one patch
///
/// Fails with [`Error::ChainMismatch`] unless `first.target() ==
/// second.source()`. Applying the result is observably identical to
/// applying `first` then `second`.
pub fn combine(first: &Patch, second: &Patch) -> Result<Patch> {
    if first.target() != second.source() {
        return Err(Error::ChainMismatch {
            first_target: first.target(),
            second_source: second.source(),
        });
    }

    let mut mutations = first.mutations().clone();
    for (key, later) in second.mutations() {
        match mutations.entry(key.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(later.clone());
            }
            Entry::Occupied(mut slot) => {
                let previous = slot.get().previous().cloned();
                match Mutation::between(previous, later.next().cloned()) {
                    Some(merged) => {
                        slot.insert(merged);
                    }
                    // added then removed, or restored to the original
                    None => {
                        slot.remove();
                    }
                }
            }
        }
    }

    Ok(Patch::new(first.source(), second.target(), mutations))
}

/// Combine a whole chain, oldest first
///
/// Returns `Ok(None)` for an empty chain.
pub fn squash<'a, I>(chain: I) -> Result<Option<Patch>>
where
    I: IntoIterator<Item = &'a Patch>,
{
    let mut iter = chain.into_iter();
    let mut acc = match iter.next() {
        Some(first) => first.clone(),
        None => return Ok(None),
    };
    for next in iter {
        acc = combine(&acc, next)?;
    }
    Ok(Some(acc))
}
