//! Thin accessor layer over [`fastnbt::Value`].
//!
//! The codec never walks raw trees by hand: every lookup goes through
//! [`get`] with the tag kind it expects, so a tag of the wrong kind reads
//! the same as a missing one.

use std::collections::HashMap;
use std::fmt;

use fastnbt::{LongArray, Value};
use serde::Serialize;

/// Payload of a compound tag.
pub type Compound = HashMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TagKind {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    ByteArray,
    IntArray,
    LongArray,
    List,
    Compound,
}

impl TagKind {
    pub fn of(value: &Value) -> TagKind {
        match value {
            Value::Byte(_) => TagKind::Byte,
            Value::Short(_) => TagKind::Short,
            Value::Int(_) => TagKind::Int,
            Value::Long(_) => TagKind::Long,
            Value::Float(_) => TagKind::Float,
            Value::Double(_) => TagKind::Double,
            Value::String(_) => TagKind::String,
            Value::ByteArray(_) => TagKind::ByteArray,
            Value::IntArray(_) => TagKind::IntArray,
            Value::LongArray(_) => TagKind::LongArray,
            Value::List(_) => TagKind::List,
            Value::Compound(_) => TagKind::Compound,
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Look up `key` and return it only if it holds a tag of `kind`.
pub fn get<'a>(compound: &'a Compound, key: &str, kind: TagKind) -> Option<&'a Value> {
    let value = compound.get(key)?;
    if TagKind::of(value) == kind {
        Some(value)
    } else {
        log::debug!("tag {key:?} is {} where {kind} was expected", TagKind::of(value));
        None
    }
}

/// [`get`] with a fallback for missing or mistyped tags.
pub fn get_or<'a>(compound: &'a Compound, key: &str, kind: TagKind, default: &'a Value) -> &'a Value {
    get(compound, key, kind).unwrap_or(default)
}

pub fn has(compound: &Compound, key: &str) -> bool {
    compound.contains_key(key)
}

pub fn get_compound<'a>(compound: &'a Compound, key: &str) -> Option<&'a Compound> {
    match get(compound, key, TagKind::Compound)? {
        Value::Compound(inner) => Some(inner),
        _ => None,
    }
}

pub fn get_list<'a>(compound: &'a Compound, key: &str) -> Option<&'a [Value]> {
    match get(compound, key, TagKind::List)? {
        Value::List(items) => Some(items),
        _ => None,
    }
}

pub fn get_str<'a>(compound: &'a Compound, key: &str) -> Option<&'a str> {
    match get(compound, key, TagKind::String)? {
        Value::String(s) => Some(s),
        _ => None,
    }
}

pub fn get_long_array<'a>(compound: &'a Compound, key: &str) -> Option<&'a LongArray> {
    match get(compound, key, TagKind::LongArray)? {
        Value::LongArray(longs) => Some(longs),
        _ => None,
    }
}

/// Any integral scalar widened to `i64`. Save formats are loose about
/// byte vs int for small coordinates.
pub fn get_integer(compound: &Compound, key: &str) -> Option<i64> {
    match compound.get(key)? {
        Value::Byte(v) => Some(*v as i64),
        Value::Short(v) => Some(*v as i64),
        Value::Int(v) => Some(*v as i64),
        Value::Long(v) => Some(*v),
        _ => None,
    }
}

pub fn compound<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Value {
    Value::Compound(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
}

pub fn list(items: Vec<Value>) -> Value {
    Value::List(items)
}

pub fn string(s: impl Into<String>) -> Value {
    Value::String(s.into())
}

/// Long array tag from packed words. NBT longs are signed; the bits are kept as-is.
pub fn long_array(words: &[u64]) -> Value {
    Value::LongArray(LongArray::new(words.iter().map(|&w| w as i64).collect()))
}

/// Packed words out of a long array tag.
pub fn words(longs: &LongArray) -> Vec<u64> {
    longs.iter().map(|&l| l as u64).collect()
}
