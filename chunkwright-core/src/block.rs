//! Universal block value shared by every save format.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use fastnbt::Value;
use serde::Serialize;

use crate::error::{ChunkError, Result};
use crate::nbt::{self, Compound, TagKind};

pub const MINECRAFT: &str = "minecraft";

/// Scalar a block property may hold.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    String(String),
}

impl PropertyValue {
    pub fn from_nbt(value: &Value) -> Option<Self> {
        match value {
            Value::Byte(v) => Some(PropertyValue::Byte(*v)),
            Value::Short(v) => Some(PropertyValue::Short(*v)),
            Value::Int(v) => Some(PropertyValue::Int(*v)),
            Value::Long(v) => Some(PropertyValue::Long(*v)),
            Value::String(v) => Some(PropertyValue::String(v.clone())),
            _ => None,
        }
    }

    pub fn to_nbt(&self) -> Value {
        match self {
            PropertyValue::Byte(v) => Value::Byte(*v),
            PropertyValue::Short(v) => Value::Short(*v),
            PropertyValue::Int(v) => Value::Int(*v),
            PropertyValue::Long(v) => Value::Long(*v),
            PropertyValue::String(v) => Value::String(v.clone()),
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Byte(v) => write!(f, "{v}"),
            PropertyValue::Short(v) => write!(f, "{v}"),
            PropertyValue::Int(v) => write!(f, "{v}"),
            PropertyValue::Long(v) => write!(f, "{v}"),
            PropertyValue::String(v) => f.write_str(v),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

/// A named, optionally parameterized voxel type.
///
/// Ordering is by namespace, then base name, then properties. Palettes
/// rely on this order when deduplicating.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Block {
    namespace: String,
    base_name: String,
    properties: BTreeMap<String, PropertyValue>,
}

impl Block {
    pub fn new(namespace: impl Into<String>, base_name: impl Into<String>) -> Result<Self> {
        Self::with_properties(namespace, base_name, BTreeMap::new())
    }

    /// Fails when `namespace` contains `:`, which would not survive a
    /// write and re-read of the full name.
    pub fn with_properties(
        namespace: impl Into<String>,
        base_name: impl Into<String>,
        properties: BTreeMap<String, PropertyValue>,
    ) -> Result<Self> {
        let namespace = namespace.into();
        if namespace.contains(':') {
            return Err(ChunkError::value(format!("block namespace {namespace:?} contains ':'")));
        }
        Ok(Self {
            namespace,
            base_name: base_name.into(),
            properties,
        })
    }

    pub fn air() -> Self {
        Self {
            namespace: MINECRAFT.to_string(),
            base_name: "air".to_string(),
            properties: BTreeMap::new(),
        }
    }

    /// Split `namespace:base_name` at the first `:`. The separator is mandatory.
    pub fn from_full_name(name: &str) -> Result<Self> {
        let (namespace, base_name) = name
            .split_once(':')
            .ok_or_else(|| ChunkError::format(format!("block name {name:?} has no namespace")))?;
        Self::new(namespace, base_name)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn properties(&self) -> &BTreeMap<String, PropertyValue> {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn full_name(&self) -> String {
        format!("{}:{}", self.namespace, self.base_name)
    }

    pub fn is_air(&self) -> bool {
        self.namespace == MINECRAFT && self.base_name == "air" && self.properties.is_empty()
    }

    /// Read one palette entry: `{Name: "ns:base", Properties?: {..}}`.
    pub fn from_palette_entry(entry: &Value) -> Result<Self> {
        let Value::Compound(entry) = entry else {
            return Err(ChunkError::format(format!(
                "palette entry is {} rather than a compound",
                TagKind::of(entry)
            )));
        };
        let name = nbt::get_str(entry, "Name")
            .ok_or_else(|| ChunkError::format("palette entry has no Name"))?;
        let mut block = Self::from_full_name(name)?;
        if let Some(props) = nbt::get_compound(entry, "Properties") {
            block.properties = read_properties(props)?;
        }
        Ok(block)
    }

    /// Inverse of [`Block::from_palette_entry`]. Empty property maps are left out.
    pub fn to_palette_entry(&self) -> Value {
        let mut entry = Compound::new();
        entry.insert("Name".to_string(), nbt::string(self.full_name()));
        if !self.properties.is_empty() {
            entry.insert(
                "Properties".to_string(),
                nbt::compound(self.properties.iter().map(|(k, v)| (k.clone(), v.to_nbt()))),
            );
        }
        Value::Compound(entry)
    }
}

fn read_properties(props: &Compound) -> Result<BTreeMap<String, PropertyValue>> {
    props
        .iter()
        .map(|(key, value)| {
            PropertyValue::from_nbt(value)
                .map(|v| (key.clone(), v))
                .ok_or_else(|| {
                    ChunkError::format(format!(
                        "block property {key:?} is {}, not a scalar",
                        TagKind::of(value)
                    ))
                })
        })
        .collect()
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.base_name)?;
        if !self.properties.is_empty() {
            let props: Vec<String> = self.properties.iter().map(|(k, v)| format!("{k}={v}")).collect();
            write!(f, "[{}]", props.join(","))?;
        }
        Ok(())
    }
}

/// Parses `ns:base` or `ns:base[key=value,...]`; property values are read as strings.
impl FromStr for Block {
    type Err = ChunkError;

    fn from_str(s: &str) -> Result<Self> {
        let (name, props) = match s.split_once('[') {
            Some((name, rest)) => {
                let body = rest
                    .strip_suffix(']')
                    .ok_or_else(|| ChunkError::format(format!("unterminated properties in {s:?}")))?;
                (name, Some(body))
            }
            None => (s, None),
        };
        let mut block = Self::from_full_name(name)?;
        for pair in props.into_iter().flat_map(|body| body.split(',')).filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| ChunkError::format(format!("property {pair:?} has no value")))?;
            block.properties.insert(key.to_string(), PropertyValue::from(value));
        }
        Ok(block)
    }
}
