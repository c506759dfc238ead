//! Closed feature axes and the table that folds them.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::bitpack::PackLayout;
use crate::nbt::TagKind;

/// Status a chunk gets when its tree carries none.
pub const DEFAULT_STATUS: &str = "full";

/// Auxiliary tag groups carried through a chunk untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    BlockTicks,
    ToBeTicked,
    FluidTicks,
    LiquidsToBeTicked,
    PostProcessing,
    Structures,
    Entities,
    BlockEntities,
    Heightmaps,
    Biomes,
    Lights,
    InhabitedTime,
    LastUpdate,
    MinSection,
    IsLightOn,
}

impl Family {
    pub const ALL: [Family; 15] = [
        Family::BlockTicks,
        Family::ToBeTicked,
        Family::FluidTicks,
        Family::LiquidsToBeTicked,
        Family::PostProcessing,
        Family::Structures,
        Family::Entities,
        Family::BlockEntities,
        Family::Heightmaps,
        Family::Biomes,
        Family::Lights,
        Family::InhabitedTime,
        Family::LastUpdate,
        Family::MinSection,
        Family::IsLightOn,
    ];

    /// Version-independent key used in [`crate::Chunk::misc`].
    pub fn logical_name(self) -> &'static str {
        match self {
            Family::BlockTicks => "block_ticks",
            Family::ToBeTicked => "to_be_ticked",
            Family::FluidTicks => "fluid_ticks",
            Family::LiquidsToBeTicked => "liquids_to_be_ticked",
            Family::PostProcessing => "post_processing",
            Family::Structures => "structures",
            Family::Entities => "entities",
            Family::BlockEntities => "block_entities",
            Family::Heightmaps => "heightmaps",
            Family::Biomes => "biomes",
            Family::Lights => "lights",
            Family::InhabitedTime => "inhabited_time",
            Family::LastUpdate => "last_update",
            Family::MinSection => "min_section",
            Family::IsLightOn => "is_light_on",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.logical_name())
    }
}

/// Where a family lives in the chunk tree for one era, if anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TagLocation {
    Unsupported,
    Tag { name: &'static str, kind: TagKind },
}

impl TagLocation {
    pub const fn tag(name: &'static str, kind: TagKind) -> Self {
        TagLocation::Tag { name, kind }
    }
}

/// Which compound holds chunk data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataRoot {
    /// Everything sits under a `Level` compound.
    Level,
    /// Everything sits at the top of the tree.
    Root,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SectionFormat {
    Unsupported,
    /// `Sections[]` with `Palette` and `BlockStates` side by side.
    Flat,
    /// `sections[]` with `block_states: {palette, data}`.
    Nested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusFormat {
    Unsupported,
    /// `Status: "full"`
    Plain,
    /// `Status: "minecraft:full"`
    Namespaced,
}

/// How entity records name their type.
///
/// Descriptive metadata only: entity fragments pass through untouched, so no
/// decode or encode path consults it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntityFormat {
    IntId,
    NamespacedStrId,
    NamespacedStrIdentifier,
}

/// One override applied on top of an inherited table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    DataRoot(DataRoot),
    Sections(SectionFormat),
    LongArray(PackLayout),
    Status(StatusFormat),
    Family(Family, TagLocation),
    ChunkVersion(u32),
    EntityFormat(EntityFormat),
}

/// Fully resolved behavior for one version interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureTable {
    data_root: DataRoot,
    sections: SectionFormat,
    long_array: PackLayout,
    status: StatusFormat,
    chunk_version: Option<u32>,
    entity_format: EntityFormat,
    families: BTreeMap<Family, TagLocation>,
}

impl Default for FeatureTable {
    fn default() -> Self {
        Self {
            data_root: DataRoot::Level,
            sections: SectionFormat::Unsupported,
            long_array: PackLayout::Dense,
            status: StatusFormat::Unsupported,
            chunk_version: None,
            entity_format: EntityFormat::IntId,
            families: BTreeMap::new(),
        }
    }
}

impl FeatureTable {
    pub fn apply(&mut self, feature: Feature) {
        match feature {
            Feature::DataRoot(root) => self.data_root = root,
            Feature::Sections(format) => self.sections = format,
            Feature::LongArray(layout) => self.long_array = layout,
            Feature::Status(format) => self.status = format,
            Feature::Family(family, TagLocation::Unsupported) => {
                self.families.remove(&family);
            }
            Feature::Family(family, location) => {
                self.families.insert(family, location);
            }
            Feature::ChunkVersion(version) => self.chunk_version = Some(version),
            Feature::EntityFormat(format) => self.entity_format = format,
        }
    }

    /// Copy of `self` with `overrides` applied in order; later ones win.
    pub fn with(&self, overrides: impl IntoIterator<Item = Feature>) -> Self {
        let mut table = self.clone();
        for feature in overrides {
            table.apply(feature);
        }
        table
    }

    pub fn data_root(&self) -> DataRoot {
        self.data_root
    }

    pub fn sections(&self) -> SectionFormat {
        self.sections
    }

    pub fn long_array(&self) -> PackLayout {
        self.long_array
    }

    pub fn status(&self) -> StatusFormat {
        self.status
    }

    pub fn chunk_version(&self) -> Option<u32> {
        self.chunk_version
    }

    /// Descriptive metadata, reported by `describe`.
    pub fn entity_format(&self) -> EntityFormat {
        self.entity_format
    }

    pub fn family(&self, family: Family) -> TagLocation {
        self.families.get(&family).copied().unwrap_or(TagLocation::Unsupported)
    }

    pub fn supports(&self, family: Family) -> bool {
        self.families.contains_key(&family)
    }
}
