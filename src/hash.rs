//! Content hashing and state descriptors
//!
//! A committed snapshot is identified by its content hash (FNV-1a 64-bit)
//! together with a version counter. The hash is used for optimistic
//! version checks only; it is not cryptographic.
//!
//! The encoding walks entries in sorted key order and tags every value
//! with its variant, so the same data always hashes the same on every
//! replica and every process.
//!
//! Author: Moroya Sakamoto

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Content hash (FNV-1a 64-bit)
pub type Hash = u64;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

const TAG_NULL: u8 = 0x00;
const TAG_FALSE: u8 = 0x01;
const TAG_TRUE: u8 = 0x02;
const TAG_INT: u8 = 0x03;
const TAG_FLOAT: u8 = 0x04;
const TAG_TEXT: u8 = 0x05;
const TAG_LIST: u8 = 0x06;
const TAG_MAP: u8 = 0x07;

/// Identifies one committed state: `(hash, version)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Descriptor {
    /// Content hash of the committed snapshot
    pub hash: Hash,
    /// Commit counter
    pub version: u64,
}

impl Descriptor {
    pub fn new(hash: Hash, version: u64) -> Self {
        Self { hash, version }
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}@v{}", self.hash, self.version)
    }
}

/// Streaming FNV-1a state
struct Fnv(u64);

impl Fnv {
    #[inline]
    fn byte(&mut self, b: u8) {
        self.0 ^= u64::from(b);
        self.0 = self.0.wrapping_mul(FNV_PRIME);
    }

    #[inline]
    fn bytes(&mut self, data: &[u8]) {
        for &b in data {
            self.byte(b);
        }
    }

    /// Length-prefixed byte string, so `"ab","c"` and `"a","bc"` differ
    fn sized(&mut self, data: &[u8]) {
        self.bytes(&(data.len() as u64).to_le_bytes());
        self.bytes(data);
    }
}

/// Hash a snapshot's entries
pub fn content_hash(data: &BTreeMap<String, Value>) -> Hash {
    let mut h = Fnv(FNV_OFFSET);
    hash_entries(data, &mut h);
    h.0
}

/// Hash a single value on its own
pub fn value_hash(value: &Value) -> Hash {
    let mut h = Fnv(FNV_OFFSET);
    hash_value(value, &mut h);
    h.0
}

fn hash_entries(data: &BTreeMap<String, Value>, h: &mut Fnv) {
    h.bytes(&(data.len() as u64).to_le_bytes());
    for (key, value) in data {
        h.sized(key.as_bytes());
        hash_value(value, h);
    }
}

fn hash_value(value: &Value, h: &mut Fnv) {
    match value {
        Value::Null => h.byte(TAG_NULL),
        Value::Bool(false) => h.byte(TAG_FALSE),
        Value::Bool(true) => h.byte(TAG_TRUE),
        Value::Int(v) => {
            h.byte(TAG_INT);
            h.bytes(&v.to_le_bytes());
        }
        Value::Float(v) => {
            h.byte(TAG_FLOAT);
            h.bytes(&canonical_float_bits(*v).to_le_bytes());
        }
        Value::Text(s) => {
            h.byte(TAG_TEXT);
            h.sized(s.as_bytes());
        }
        Value::List(items) => {
            h.byte(TAG_LIST);
            h.bytes(&(items.len() as u64).to_le_bytes());
            for item in items {
                hash_value(item, h);
            }
        }
        Value::Map(entries) => {
            h.byte(TAG_MAP);
            hash_entries(entries, h);
        }
    }
}

/// Float bits with equal values collapsed (`-0.0` → `0.0`, every NaN → one NaN)
fn canonical_float_bits(v: f64) -> u64 {
    if v.is_nan() {
        f64::NAN.to_bits()
    } else if v == 0.0 {
        0.0f64.to_bits()
    } else {
        v.to_bits()
    }
}
