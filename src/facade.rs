//! Producer / consumer facades
//!
//! Capability-restricted views for the two sides of a replication pair:
//!
//! - [`Producer`]: `set`, `delete`, `commit`, `rollback`. Authors
//!   patches, cannot read.
//! - [`Consumer`]: `get`, `has`, `contains`, `committed`, `apply`.
//!   Ingests patches and reads, cannot originate edits.
//!
//! [`SharedMap`] owns a map behind single-threaded shared ownership and
//! hands out [`ProducerHandle`] / [`ConsumerHandle`] views. Handles hold
//! no state of their own, so an edit made through any of them (or
//! through the `SharedMap`) is visible to all the others.
//!
//! Author: Moroya Sakamoto

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::error::Result;
use crate::map::VersionedMap;
use crate::patch::Patch;
use crate::snapshot::Snapshot;
use crate::value::Value;

/// Authoring side: mutate and produce patches, no reads
pub trait Producer {
    fn set(&mut self, key: &str, value: Value) -> &mut Self;
    fn delete(&mut self, key: &str) -> bool;
    fn commit(&mut self) -> Patch;
    fn rollback(&mut self);
}

/// Receiving side: read and apply patches, no direct edits
pub trait Consumer {
    /// Owned copy of the draft value (the view cannot lend references)
    fn get(&self, key: &str) -> Option<Value>;
    fn has(&self, key: &str) -> bool;
    fn contains(&self, value: &Value) -> bool;
    fn committed(&self) -> Snapshot;
    fn apply(&mut self, patch: &Patch) -> Result<()>;
}

impl Producer for VersionedMap {
    fn set(&mut self, key: &str, value: Value) -> &mut Self {
        VersionedMap::set(self, key, value)
    }

    fn delete(&mut self, key: &str) -> bool {
        VersionedMap::delete(self, key)
    }

    fn commit(&mut self) -> Patch {
        VersionedMap::commit(self)
    }

    fn rollback(&mut self) {
        VersionedMap::rollback(self)
    }
}

impl Consumer for VersionedMap {
    fn get(&self, key: &str) -> Option<Value> {
        VersionedMap::get(self, key).cloned()
    }

    fn has(&self, key: &str) -> bool {
        VersionedMap::has(self, key)
    }

    fn contains(&self, value: &Value) -> bool {
        VersionedMap::contains(self, value)
    }

    fn committed(&self) -> Snapshot {
        VersionedMap::committed(self).clone()
    }

    fn apply(&mut self, patch: &Patch) -> Result<()> {
        VersionedMap::apply(self, patch)
    }
}

/// Single-threaded shared owner of a [`VersionedMap`]
///
/// Not `Send`: the map is built for single-writer access.
#[derive(Debug, Clone, Default)]
pub struct SharedMap {
    inner: Rc<RefCell<VersionedMap>>,
}

impl VersionedMap {
    /// Move the map behind shared ownership so facades can be created
    pub fn into_shared(self) -> SharedMap {
        SharedMap {
            inner: Rc::new(RefCell::new(self)),
        }
    }
}

impl SharedMap {
    pub fn new(map: VersionedMap) -> Self {
        map.into_shared()
    }

    /// Write-only view over the same map
    pub fn create_producer(&self) -> ProducerHandle {
        ProducerHandle {
            inner: Rc::clone(&self.inner),
        }
    }

    /// Read-and-apply view over the same map
    pub fn create_consumer(&self) -> ConsumerHandle {
        ConsumerHandle {
            inner: Rc::clone(&self.inner),
        }
    }

    /// Full access to the underlying map
    ///
    /// Panics if a mutable borrow is live.
    pub fn borrow(&self) -> Ref<'_, VersionedMap> {
        self.inner.borrow()
    }

    /// Full mutable access to the underlying map
    ///
    /// Panics if any other borrow is live.
    pub fn borrow_mut(&self) -> RefMut<'_, VersionedMap> {
        self.inner.borrow_mut()
    }
}

/// Write-only view (see [`Producer`])
#[derive(Debug, Clone)]
pub struct ProducerHandle {
    inner: Rc<RefCell<VersionedMap>>,
}

impl Producer for ProducerHandle {
    fn set(&mut self, key: &str, value: Value) -> &mut Self {
        self.inner.borrow_mut().set(key, value);
        self
    }

    fn delete(&mut self, key: &str) -> bool {
        self.inner.borrow_mut().delete(key)
    }

    fn commit(&mut self) -> Patch {
        self.inner.borrow_mut().commit()
    }

    fn rollback(&mut self) {
        self.inner.borrow_mut().rollback()
    }
}

/// Read-and-apply view (see [`Consumer`])
#[derive(Debug, Clone)]
pub struct ConsumerHandle {
    inner: Rc<RefCell<VersionedMap>>,
}

impl Consumer for ConsumerHandle {
    fn get(&self, key: &str) -> Option<Value> {
        self.inner.borrow().get(key).cloned()
    }

    fn has(&self, key: &str) -> bool {
        self.inner.borrow().has(key)
    }

    fn contains(&self, value: &Value) -> bool {
        self.inner.borrow().contains(value)
    }

    fn committed(&self) -> Snapshot {
        self.inner.borrow().committed().clone()
    }

    fn apply(&mut self, patch: &Patch) -> Result<()> {
        self.inner.borrow_mut().apply(patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const BARD: &str = "William Shakespeare";
    const KANT: &str = "Emmanuel Kant";

    fn text(s: &str) -> Value {
        Value::from(s)
    }

    #[test]
    fn test_producer_set_then_commit_chains() {
        let shared = VersionedMap::new().into_shared();
        let mut producer = shared.create_producer();
        let consumer = shared.create_consumer();

        let p = producer.set("5", text(KANT)).commit();
        assert_eq!(p.len(), 1);
        assert_eq!(consumer.committed().get("5"), Some(&text(KANT)));
        assert!(consumer.has("5"));
        assert!(consumer.contains(&text(KANT)));
    }

    #[test]
    fn test_consumer_sees_draft_through_get() {
        let shared = SharedMap::new(VersionedMap::new());
        let mut producer = shared.create_producer();
        let consumer = shared.create_consumer();
        producer.set("4", text(BARD));
        assert_eq!(consumer.get("4"), Some(text(BARD)));
        assert!(!consumer.has("4"));
        producer.rollback();
        assert!(consumer.get("4").is_none());
    }

    #[test]
    fn test_consumer_applies_remote_patch() {
        let mut origin = VersionedMap::new();
        let replica = SharedMap::new(origin.clone());
        origin.set("4", BARD);
        let p = origin.commit();

        let mut consumer = replica.create_consumer();
        consumer.apply(&p).unwrap();
        assert_eq!(consumer.get("4"), Some(text(BARD)));
        assert_eq!(replica.borrow().descriptor(), origin.descriptor());
    }

    #[test]
    fn test_consumer_apply_conflicts_with_producer_draft() {
        let mut origin = VersionedMap::new();
        let replica = SharedMap::new(origin.clone());
        origin.set("4", BARD);
        let p = origin.commit();

        let mut producer = replica.create_producer();
        let mut consumer = replica.create_consumer();
        producer.set("x", text("y"));
        assert!(matches!(consumer.apply(&p), Err(Error::StateConflict)));
    }

    #[test]
    fn test_handles_observe_raw_edits() {
        let shared = SharedMap::new(VersionedMap::new());
        let consumer = shared.create_consumer();
        shared.borrow_mut().set("k", 1);
        shared.borrow_mut().commit();
        assert!(consumer.has("k"));
        assert_eq!(shared.borrow().version(), 1);
    }

    #[test]
    fn test_producer_delete() {
        let shared = SharedMap::new(VersionedMap::new());
        let mut producer = shared.create_producer();
        producer.set("k", text("v")).commit();
        assert!(producer.delete("k"));
        assert!(!producer.delete("k"));
        let p = producer.commit();
        assert!(p.mutation("k").unwrap().next().is_none());
        assert!(!shared.create_consumer().has("k"));
    }

    fn author_with<P: Producer>(p: &mut P) -> Patch {
        p.set("1", text("Robert Heinlein")).commit()
    }

    fn read_with<C: Consumer>(c: &C) -> Option<Value> {
        c.get("1")
    }

    #[test]
    fn test_plain_map_implements_both_traits() {
        let mut m = VersionedMap::new();
        let p = author_with(&mut m);
        assert_eq!(p.target().version, 1);
        assert_eq!(read_with(&m), Some(text("Robert Heinlein")));
    }
}
