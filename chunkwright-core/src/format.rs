//! Byte-level entry point: NBT bytes in, [`Chunk`] out, and back.

use std::sync::Arc;

use fastnbt::Value;

use crate::chunk::Chunk;
use crate::error::{ChunkError, Result};
use crate::nbt::{self, TagKind};
use crate::pipeline;
use crate::version::{Family, Platform, VersionInterface, VersionRegistry};

/// Version stamped on trees that carry none, which predate the tag.
pub const UNVERSIONED: i32 = -1;

/// Result of [`ChunkFormat::save`].
#[derive(Debug, Clone)]
pub struct SavedChunk {
    pub bytes: Vec<u8>,
    pub interface: Arc<VersionInterface>,
    pub dropped: Vec<Family>,
}

/// Result of [`ChunkFormat::load`].
#[derive(Debug, Clone)]
pub struct LoadedChunk {
    pub chunk: Chunk,
    pub data_version: i32,
    pub interface: Arc<VersionInterface>,
}

/// Reads and writes uncompressed chunk NBT for one platform.
#[derive(Clone)]
pub struct ChunkFormat {
    registry: Arc<VersionRegistry>,
    platform: Platform,
}

impl ChunkFormat {
    pub fn new(registry: Arc<VersionRegistry>, platform: Platform) -> Self {
        Self { registry, platform }
    }

    /// Java format over the built-in registry.
    pub fn java() -> Self {
        Self::new(Arc::new(VersionRegistry::builtin()), Platform::Java)
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn registry(&self) -> &VersionRegistry {
        &self.registry
    }

    pub fn resolve(&self, version: i32) -> Result<Arc<VersionInterface>> {
        self.registry.resolve(self.platform, version)
    }

    /// `DataVersion` of a parsed tree, [`UNVERSIONED`] when missing.
    pub fn data_version(tree: &Value) -> Result<i32> {
        let Value::Compound(root) = tree else {
            return Err(ChunkError::format(format!(
                "chunk tree root is {}, expected a compound",
                TagKind::of(tree)
            )));
        };
        match nbt::get_integer(root, "DataVersion") {
            None => Ok(UNVERSIONED),
            Some(v) => i32::try_from(v).map_err(|_| ChunkError::format(format!("DataVersion {v} is out of range"))),
        }
    }

    pub fn load(&self, bytes: &[u8]) -> Result<LoadedChunk> {
        let tree: Value = fastnbt::from_bytes(bytes)?;
        self.load_tree(&tree)
    }

    pub fn load_tree(&self, tree: &Value) -> Result<LoadedChunk> {
        let data_version = Self::data_version(tree)?;
        let interface = self.resolve(data_version)?;
        let chunk = pipeline::decode(tree, &interface)?;
        Ok(LoadedChunk {
            chunk,
            data_version,
            interface,
        })
    }

    pub fn save(&self, chunk: &Chunk, version: i32) -> Result<SavedChunk> {
        let interface = self.resolve(version)?;
        let encoded = pipeline::encode(chunk, &interface)?;

        let mut tree = encoded.tree;
        if let Value::Compound(root) = &mut tree {
            root.insert("DataVersion".to_string(), Value::Int(version));
        }
        if !encoded.dropped.is_empty() {
            log::warn!(
                "chunk ({}, {}) lost {} families writing {}",
                chunk.cx,
                chunk.cz,
                encoded.dropped.len(),
                interface.name()
            );
        }

        Ok(SavedChunk {
            bytes: fastnbt::to_bytes(&tree)?,
            interface,
            dropped: encoded.dropped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Block, MINECRAFT};

    #[test]
    fn test_save_then_load() {
        let format = ChunkFormat::java();
        let mut chunk = Chunk::new(5, 9);
        chunk.set_block(1, 70, 2, Block::new(MINECRAFT, "gold_block").unwrap()).unwrap();
        chunk.set_block(1, -5, 2, Block::new(MINECRAFT, "deepslate").unwrap()).unwrap();

        let saved = format.save(&chunk, 3700).unwrap();
        assert_eq!(saved.interface.name(), "anvil_2844");

        let loaded = format.load(&saved.bytes).unwrap();
        assert_eq!(loaded.data_version, 3700);
        assert_eq!(loaded.chunk.cx, 5);
        assert_eq!(loaded.chunk.cz, 9);
        assert_eq!(loaded.chunk.block_at(1, 70, 2), Some(&Block::new(MINECRAFT, "gold_block").unwrap()));
        assert_eq!(loaded.chunk.block_at(1, -5, 2), Some(&Block::new(MINECRAFT, "deepslate").unwrap()));
        assert_eq!(loaded.chunk.block_at(0, 70, 0), Some(&Block::air()));
    }

    #[test]
    fn test_missing_data_version_is_unversioned() {
        let format = ChunkFormat::java();
        let tree = nbt::compound([("Level", nbt::compound::<&str>([]))]);
        assert_eq!(ChunkFormat::data_version(&tree).unwrap(), UNVERSIONED);
        let bytes = fastnbt::to_bytes(&tree).unwrap();
        assert!(matches!(
            format.load(&bytes),
            Err(ChunkError::UnsupportedVersion { version: -1, .. })
        ));
    }

    #[test]
    fn test_garbage_bytes() {
        let format = ChunkFormat::java();
        assert!(matches!(format.load(&[0xff, 0x00, 0x13]), Err(ChunkError::Nbt(_))));
    }
}
