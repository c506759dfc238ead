//! Whole-chunk decode and encode driven by a resolved [`VersionInterface`].

use std::collections::BTreeMap;

use fastnbt::Value;

use crate::block::Block;
use crate::chunk::{Chunk, Section};
use crate::error::{ChunkError, Result};
use crate::nbt::{self, Compound, TagKind};
use crate::palette;
use crate::section::{self, DecodedSection};
use crate::version::{
    DEFAULT_STATUS, DataRoot, Family, FeatureTable, SectionFormat, StatusFormat, TagLocation,
    VersionInterface,
};

const NAMESPACE_PREFIX: &str = "minecraft:";

/// Output of [`encode`].
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedChunk {
    /// Chunk tree without `DataVersion`.
    pub tree: Value,
    /// Families the chunk carried that the target interface cannot store.
    pub dropped: Vec<Family>,
}

fn require_sections(iface: &VersionInterface) -> Result<()> {
    if iface.features().sections() == SectionFormat::Unsupported {
        return Err(ChunkError::UnsupportedFeature {
            interface: iface.name().to_string(),
            feature: "paletted sections",
        });
    }
    Ok(())
}

fn sections_key(format: SectionFormat) -> &'static str {
    match format {
        SectionFormat::Nested => "sections",
        _ => "Sections",
    }
}

fn coordinate(data: &Compound, key: &str) -> Result<i32> {
    match nbt::get_integer(data, key) {
        None => Ok(0),
        Some(v) => i32::try_from(v).map_err(|_| ChunkError::format(format!("{key} {v} is out of range"))),
    }
}

fn read_status(data: &Compound, format: StatusFormat) -> String {
    let stored = match format {
        StatusFormat::Unsupported => None,
        StatusFormat::Plain => nbt::get_str(data, "Status"),
        StatusFormat::Namespaced => nbt::get_str(data, "Status")
            .map(|s| s.strip_prefix(NAMESPACE_PREFIX).unwrap_or(s)),
    };
    stored.unwrap_or(DEFAULT_STATUS).to_string()
}

fn read_family(data: &Compound, features: &FeatureTable, family: Family) -> Option<Value> {
    let TagLocation::Tag { name, kind } = features.family(family) else {
        return None;
    };
    let value = data.get(name)?;
    let found = TagKind::of(value);
    if found != kind {
        log::warn!("{family} tag {name:?} is {found}, expected {kind}; ignoring it");
        return None;
    }
    Some(value.clone())
}

fn read_sections(data: &Compound, features: &FeatureTable) -> Result<BTreeMap<i32, DecodedSection>> {
    let mut decoded = BTreeMap::new();
    let Some(nodes) = nbt::get_list(data, sections_key(features.sections())) else {
        return Ok(decoded);
    };

    for node in nodes {
        let Value::Compound(node) = node else {
            log::debug!("skipping {} entry in section list", TagKind::of(node));
            continue;
        };
        let cy = nbt::get_integer(node, "Y")
            .ok_or_else(|| ChunkError::format("section has no integer Y tag"))?;
        let cy = i32::try_from(cy).map_err(|_| ChunkError::format(format!("section Y {cy} is out of range")))?;

        let Some(section) = section::decode_section(node, features)? else {
            log::debug!("section {cy} stores no palette; treating as empty");
            continue;
        };
        if decoded.insert(cy, section).is_some() {
            log::warn!("section {cy} appears more than once; keeping the later one");
        }
    }
    Ok(decoded)
}

/// Decode a raw chunk tree (as read from disk, `DataVersion` included or not).
pub fn decode(raw: &Value, iface: &VersionInterface) -> Result<Chunk> {
    require_sections(iface)?;
    let features = iface.features();

    let Value::Compound(top) = raw else {
        return Err(ChunkError::format(format!(
            "chunk tree root is {}, expected a compound",
            TagKind::of(raw)
        )));
    };
    let data = match features.data_root() {
        DataRoot::Level => nbt::get_compound(top, "Level")
            .ok_or_else(|| ChunkError::format("chunk has no Level compound"))?,
        DataRoot::Root => top,
    };

    let mut chunk = Chunk::new(coordinate(data, "xPos")?, coordinate(data, "zPos")?);
    chunk.status = read_status(data, features.status());

    let (heights, decoded): (Vec<i32>, Vec<DecodedSection>) = read_sections(data, features)?.into_iter().unzip();
    let palettes: Vec<Vec<Block>> = decoded.iter().map(|s| s.palette.clone()).collect();
    let merged = palette::merge(&[Block::air()], &palettes);

    for ((cy, section), remap) in heights.into_iter().zip(&decoded).zip(&merged.remaps) {
        let indices = section.indices.iter().map(|&local| remap[local as usize]).collect();
        chunk.sections.insert(cy, Section::from_indices(indices)?);
    }
    chunk.palette = merged.palette;

    for family in Family::ALL {
        chunk.misc.insert(family, read_family(data, features, family));
    }

    log::debug!(
        "decoded chunk ({}, {}) with {} interface: {} sections, {} palette entries",
        chunk.cx,
        chunk.cz,
        iface.name(),
        chunk.sections.len(),
        chunk.palette.len()
    );
    Ok(chunk)
}

/// Encode `chunk` for `iface`. The caller stamps `DataVersion`.
pub fn encode(chunk: &Chunk, iface: &VersionInterface) -> Result<EncodedChunk> {
    require_sections(iface)?;
    let features = iface.features();

    let mut data = Compound::new();
    data.insert("xPos".to_string(), Value::Int(chunk.cx));
    data.insert("zPos".to_string(), Value::Int(chunk.cz));

    match features.status() {
        StatusFormat::Unsupported => {}
        StatusFormat::Plain => {
            data.insert("Status".to_string(), nbt::string(chunk.status.as_str()));
        }
        StatusFormat::Namespaced => {
            let status = if chunk.status.contains(':') {
                chunk.status.clone()
            } else {
                format!("{NAMESPACE_PREFIX}{}", chunk.status)
            };
            data.insert("Status".to_string(), nbt::string(status));
        }
    }

    let mut sections = Vec::with_capacity(chunk.sections.len());
    for (&cy, section) in &chunk.sections {
        match section::encode_section(cy, section.indices(), &chunk.palette, features)? {
            Some(node) => sections.push(node),
            None => log::debug!("section {cy} is only air; omitted"),
        }
    }
    data.insert(sections_key(features.sections()).to_string(), nbt::list(sections));

    let mut dropped = Vec::new();
    for (&family, value) in &chunk.misc {
        let Some(value) = value else { continue };
        match features.family(family) {
            TagLocation::Tag { name, kind } if TagKind::of(value) == kind => {
                data.insert(name.to_string(), value.clone());
            }
            TagLocation::Tag { name, kind } => {
                log::warn!(
                    "{} stores {family} as {kind} {name:?}; dropping the {} fragment",
                    iface.name(),
                    TagKind::of(value)
                );
                dropped.push(family);
            }
            TagLocation::Unsupported => {
                log::warn!("{} cannot store {family}; dropping it", iface.name());
                dropped.push(family);
            }
        }
    }

    let tree = match features.data_root() {
        DataRoot::Level => nbt::compound([("Level", Value::Compound(data))]),
        DataRoot::Root => Value::Compound(data),
    };
    Ok(EncodedChunk { tree, dropped })
}
