//! Interfaces for the save eras this crate knows about.

use super::features::{
    DataRoot, EntityFormat, Family, Feature, SectionFormat, StatusFormat, TagLocation,
};
use super::registry::{Platform, VersionRange, VersionRegistry};
use crate::bitpack::PackLayout;
use crate::nbt::TagKind;

fn family(family: Family, name: &'static str, kind: TagKind) -> Feature {
    Feature::Family(family, TagLocation::tag(name, kind))
}

fn drop_family(family: Family) -> Feature {
    Feature::Family(family, TagLocation::Unsupported)
}

impl VersionRegistry {
    /// Registry with every built-in Java and Bedrock interface.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        register_java(&mut registry);
        register_bedrock(&mut registry);
        registry
    }
}

fn register_java(registry: &mut VersionRegistry) {
    // 1.13: paletted sections, status string, tick lists, structures
    let anvil_1444 = registry.register(
        Platform::Java,
        "anvil_1444",
        VersionRange::new(1444, 1466),
        [
            Feature::DataRoot(DataRoot::Level),
            Feature::Sections(SectionFormat::Flat),
            Feature::LongArray(PackLayout::Dense),
            Feature::Status(StatusFormat::Plain),
            Feature::EntityFormat(EntityFormat::NamespacedStrId),
            family(Family::BlockTicks, "TileTicks", TagKind::List),
            family(Family::ToBeTicked, "ToBeTicked", TagKind::List),
            family(Family::FluidTicks, "LiquidTicks", TagKind::List),
            family(Family::LiquidsToBeTicked, "LiquidsToBeTicked", TagKind::List),
            family(Family::PostProcessing, "PostProcessing", TagKind::List),
            family(Family::Structures, "Structures", TagKind::Compound),
            family(Family::Entities, "Entities", TagKind::List),
            family(Family::BlockEntities, "TileEntities", TagKind::List),
            family(Family::Heightmaps, "HeightMap", TagKind::IntArray),
            family(Family::Biomes, "Biomes", TagKind::IntArray),
            family(Family::Lights, "Lights", TagKind::List),
            family(Family::InhabitedTime, "InhabitedTime", TagKind::Long),
            family(Family::LastUpdate, "LastUpdate", TagKind::Long),
        ],
        None,
    );

    let anvil_1466 = registry.register(
        Platform::Java,
        "anvil_1466",
        VersionRange::new(1466, 2529),
        [family(Family::Heightmaps, "Heightmaps", TagKind::Compound)],
        Some(&anvil_1444),
    );

    // 1.16: entries no longer straddle words
    let anvil_2529 = registry.register(
        Platform::Java,
        "anvil_2529",
        VersionRange::new(2529, 2681),
        [Feature::LongArray(PackLayout::Sparse)],
        Some(&anvil_1466),
    );

    // 1.17: entities live in their own region files
    let anvil_2681 = registry.register(
        Platform::Java,
        "anvil_2681",
        VersionRange::new(2681, 2844),
        [drop_family(Family::Entities)],
        Some(&anvil_2529),
    );

    // 1.18: no Level wrapper, nested block_states, renamed tick lists
    registry.register(
        Platform::Java,
        "anvil_2844",
        VersionRange::starting_at(2844),
        [
            Feature::DataRoot(DataRoot::Root),
            Feature::Sections(SectionFormat::Nested),
            Feature::Status(StatusFormat::Namespaced),
            family(Family::BlockTicks, "block_ticks", TagKind::List),
            family(Family::FluidTicks, "fluid_ticks", TagKind::List),
            drop_family(Family::ToBeTicked),
            drop_family(Family::LiquidsToBeTicked),
            drop_family(Family::Lights),
            drop_family(Family::Biomes),
            family(Family::Structures, "structures", TagKind::Compound),
            family(Family::BlockEntities, "block_entities", TagKind::List),
            family(Family::MinSection, "yPos", TagKind::Int),
            family(Family::IsLightOn, "isLightOn", TagKind::Byte),
        ],
        Some(&anvil_2681),
    );
}

fn register_bedrock(registry: &mut VersionRegistry) {
    // int ids are gone by chunk version 9
    let leveldb_9 = registry.register(
        Platform::Bedrock,
        "leveldb_9",
        VersionRange::new(9, 21),
        [
            Feature::ChunkVersion(9),
            Feature::EntityFormat(EntityFormat::NamespacedStrIdentifier),
        ],
        None,
    );

    registry.register(
        Platform::Bedrock,
        "leveldb_21",
        VersionRange::new(21, 22),
        [Feature::ChunkVersion(21)],
        Some(&leveldb_9),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChunkError;

    #[test]
    fn test_java_eras() {
        let registry = VersionRegistry::builtin();

        let v1444 = registry.resolve(Platform::Java, 1450).unwrap();
        assert_eq!(v1444.name(), "anvil_1444");
        assert_eq!(v1444.features().long_array(), PackLayout::Dense);
        assert_eq!(v1444.features().sections(), SectionFormat::Flat);
        assert_eq!(
            v1444.features().family(Family::Heightmaps),
            TagLocation::tag("HeightMap", TagKind::IntArray)
        );

        let v1466 = registry.resolve(Platform::Java, 1976).unwrap();
        assert_eq!(v1466.name(), "anvil_1466");
        assert_eq!(
            v1466.features().family(Family::Heightmaps),
            TagLocation::tag("Heightmaps", TagKind::Compound)
        );
        assert!(v1466.features().supports(Family::ToBeTicked));

        let v2586 = registry.resolve(Platform::Java, 2586).unwrap();
        assert_eq!(v2586.features().long_array(), PackLayout::Sparse);
        assert!(v2586.features().supports(Family::Entities));

        let v2730 = registry.resolve(Platform::Java, 2730).unwrap();
        assert!(!v2730.features().supports(Family::Entities));
        assert_eq!(v2730.features().long_array(), PackLayout::Sparse);

        let v4671 = registry.resolve(Platform::Java, 4671).unwrap();
        assert_eq!(v4671.name(), "anvil_2844");
        assert_eq!(v4671.features().data_root(), DataRoot::Root);
        assert_eq!(v4671.features().sections(), SectionFormat::Nested);
        assert_eq!(v4671.features().status(), StatusFormat::Namespaced);
        assert_eq!(v4671.features().long_array(), PackLayout::Sparse);
        assert!(!v4671.features().supports(Family::ToBeTicked));
        assert!(!v4671.features().supports(Family::Entities));
        assert_eq!(
            v4671.features().family(Family::BlockTicks),
            TagLocation::tag("block_ticks", TagKind::List)
        );
        assert!(v4671.features().supports(Family::PostProcessing));
    }

    #[test]
    fn test_pre_flattening_is_unsupported() {
        let registry = VersionRegistry::builtin();
        assert!(matches!(
            registry.resolve(Platform::Java, 1343),
            Err(ChunkError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn test_bedrock_eras() {
        let registry = VersionRegistry::builtin();
        let v9 = registry.resolve(Platform::Bedrock, 9).unwrap();
        assert_eq!(v9.features().chunk_version(), Some(9));
        assert_eq!(v9.features().entity_format(), EntityFormat::NamespacedStrIdentifier);

        let v21 = registry.resolve(Platform::Bedrock, 21).unwrap();
        assert_eq!(v21.features().chunk_version(), Some(21));
        assert_eq!(v21.features().entity_format(), EntityFormat::NamespacedStrIdentifier);
        assert_eq!(v21.features().sections(), SectionFormat::Unsupported);

        assert!(registry.resolve(Platform::Bedrock, 22).is_err());
    }
}
