//! JSON wire forms
//!
//! The only shapes transport and persistence layers ever see:
//!
//! ```text
//! snapshot: { "hash": u64, "version": u64, "data": { key: value, ... } }
//! patch:    { "mutations": { key: { "previous"?: v, "next"?: v } },
//!             "source": { "hash": u64, "version": u64 },
//!             "target": { "hash": u64, "version": u64 } }
//! ```
//!
//! Both forms round-trip exactly. Decoding a snapshot yields a clean map
//! whose hash and version are taken as given.
//!
//! Author: Moroya Sakamoto

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::hash::Hash;
use crate::map::VersionedMap;
use crate::patch::Patch;
use crate::snapshot::Snapshot;

/// Serialized committed state of a [`VersionedMap`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotWire {
    pub hash: Hash,
    pub version: u64,
    pub data: Snapshot,
}

impl From<&VersionedMap> for SnapshotWire {
    fn from(map: &VersionedMap) -> Self {
        SnapshotWire {
            hash: map.hash(),
            version: map.version(),
            data: map.committed().clone(),
        }
    }
}

impl From<SnapshotWire> for VersionedMap {
    fn from(wire: SnapshotWire) -> Self {
        VersionedMap::from_parts(wire.data, wire.version, wire.hash)
    }
}

// ── VersionedMap ──────────────────────────────────────────────────────

impl VersionedMap {
    /// Committed state as a JSON value (draft edits are not included)
    pub fn to_serializable(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(SnapshotWire::from(self))?)
    }

    /// Rebuild a clean map from [`to_serializable`](Self::to_serializable) output
    pub fn from_serializable(value: serde_json::Value) -> Result<VersionedMap> {
        let wire: SnapshotWire = serde_json::from_value(value)?;
        Ok(wire.into())
    }

    /// Committed state as a JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&SnapshotWire::from(self))?)
    }

    pub fn from_json(json: &str) -> Result<VersionedMap> {
        let wire: SnapshotWire = serde_json::from_str(json)?;
        Ok(wire.into())
    }
}

// ── Patch ─────────────────────────────────────────────────────────────

impl Patch {
    pub fn to_serializable(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_serializable(value: serde_json::Value) -> Result<Patch> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Patch> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::value::Value;

    fn authors() -> VersionedMap {
        let mut m = VersionedMap::new();
        m.set("1", "Robert Heinlein").set("2", "Isaac Asimov");
        m.commit();
        m
    }

    #[test]
    fn test_snapshot_json_shape() {
        let m = authors();
        let v = m.to_serializable().unwrap();
        assert_eq!(v["version"], 1);
        assert_eq!(v["hash"], m.hash());
        assert_eq!(v["data"]["1"], "Robert Heinlein");
        assert_eq!(v.as_object().unwrap().len(), 3);
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let m = authors();
        let copy = VersionedMap::from_json(&m.to_json().unwrap()).unwrap();
        assert_eq!(copy.committed(), m.committed());
        assert_eq!(copy.descriptor(), m.descriptor());
        assert!(!copy.is_dirty());
        assert_eq!(copy.to_json().unwrap(), m.to_json().unwrap());
    }

    #[test]
    fn test_snapshot_excludes_draft() {
        let mut m = authors();
        m.set("3", "Dan Simmons");
        let copy = VersionedMap::from_serializable(m.to_serializable().unwrap()).unwrap();
        assert!(copy.get("3").is_none());
        assert_eq!(copy.version(), 1);
    }

    #[test]
    fn test_snapshot_decode_keeps_given_hash() {
        let json = r#"{"hash":7,"version":3,"data":{"k":"v"}}"#;
        let m = VersionedMap::from_json(json).unwrap();
        assert_eq!(m.hash(), 7);
        assert_eq!(m.version(), 3);
        assert_eq!(m.get("k"), Some(&Value::from("v")));
        assert!(!m.verify_hash());
    }

    #[test]
    fn test_snapshot_decode_missing_field_fails() {
        let err = VersionedMap::from_json(r#"{"hash":7,"data":{}}"#).unwrap_err();
        assert!(matches!(err, Error::Codec(_)));
    }

    #[test]
    fn test_non_finite_floats_refuse_to_encode() {
        let mut m = authors();
        m.set("k", f64::NAN).set("j", f64::INFINITY);
        let p = m.commit();

        assert!(matches!(m.to_json(), Err(Error::Codec(_))));
        assert!(matches!(m.to_serializable(), Err(Error::Codec(_))));
        assert!(matches!(p.to_json(), Err(Error::Codec(_))));
        assert!(matches!(p.to_serializable(), Err(Error::Codec(_))));

        // once the offending values are gone the snapshot encodes again
        m.delete("k");
        m.delete("j");
        m.commit();
        let copy = VersionedMap::from_json(&m.to_json().unwrap()).unwrap();
        assert_eq!(copy.committed(), m.committed());
        assert!(copy.verify_hash());
    }

    #[test]
    fn test_patch_roundtrip() {
        let mut m = authors();
        m.set("3", "Dan Simmons");
        m.delete("1");
        m.set("2", Value::Null);
        let p = m.commit();
        let back = Patch::from_json(&p.to_json().unwrap()).unwrap();
        assert_eq!(back, p);
        let back = Patch::from_serializable(p.to_serializable().unwrap()).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn test_patch_json_shape() {
        let mut m = authors();
        m.set("3", "Dan Simmons");
        let p = m.commit();
        let v = p.to_serializable().unwrap();
        assert_eq!(v["mutations"]["3"]["next"], "Dan Simmons");
        assert_eq!(v["source"]["version"], 1);
        assert_eq!(v["target"]["version"], 2);
        assert_eq!(v["target"]["hash"], m.hash());
    }

    #[test]
    fn test_patch_decode_rejects_no_op_entry() {
        let json = r#"{"mutations":{"k":{}},"source":{"hash":1,"version":0},"target":{"hash":2,"version":1}}"#;
        assert!(matches!(Patch::from_json(json), Err(Error::Codec(_))));
    }

    #[test]
    fn test_patch_decode_garbage_fails() {
        assert!(Patch::from_json("not json").is_err());
    }
}
