//! The `.schematic` container: gzip-compressed NBT holding flat id arrays.

use std::io::{Read, Write};

use chunkwright_core::Platform;
use fastnbt::{ByteArray, Value};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchematicError};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SchematicNbt {
    width: i16,
    height: i16,
    length: i16,
    #[serde(default)]
    materials: Option<String>,
    blocks: ByteArray,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    add_blocks: Option<ByteArray>,
    data: ByteArray,
    #[serde(default)]
    entities: Vec<Value>,
    #[serde(default)]
    tile_entities: Vec<Value>,
    /// Always written empty; scheduled ticks in a source file are not kept.
    #[serde(default, skip_deserializing)]
    tile_ticks: Vec<Value>,
}

fn platform_of(materials: &str) -> Result<Platform> {
    match materials {
        "Alpha" => Ok(Platform::Java),
        "Pocket" => Ok(Platform::Bedrock),
        other => Err(SchematicError::Materials(other.to_string())),
    }
}

fn materials_of(platform: Platform) -> &'static str {
    match platform {
        Platform::Java => "Alpha",
        Platform::Bedrock => "Pocket",
    }
}

fn dimension(name: &str, value: i16) -> Result<u16> {
    u16::try_from(value).map_err(|_| SchematicError::Format(format!("{name} is negative ({value})")))
}

/// A whole schematic held in memory.
///
/// `blocks` and `data` are indexed `(y * length + z) * width + x`.
#[derive(Debug, Clone, PartialEq)]
pub struct Schematic {
    pub platform: Platform,
    pub width: u16,
    pub height: u16,
    pub length: u16,
    /// Block ids, up to 12 bits.
    pub blocks: Vec<u16>,
    /// Block data values, 4 bits.
    pub data: Vec<u8>,
    pub entities: Vec<Value>,
    pub block_entities: Vec<Value>,
}

impl Schematic {
    /// Air-filled schematic.
    pub fn new(platform: Platform, width: u16, height: u16, length: u16) -> Self {
        let volume = width as usize * height as usize * length as usize;
        Self {
            platform,
            width,
            height,
            length,
            blocks: vec![0; volume],
            data: vec![0; volume],
            entities: Vec::new(),
            block_entities: Vec::new(),
        }
    }

    pub fn volume(&self) -> usize {
        self.width as usize * self.height as usize * self.length as usize
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (y * self.length as usize + z) * self.width as usize + x
    }

    pub fn contains(&self, x: i64, y: i64, z: i64) -> bool {
        (0..self.width as i64).contains(&x)
            && (0..self.height as i64).contains(&y)
            && (0..self.length as i64).contains(&z)
    }

    /// Parse file bytes, gzip-compressed or not.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let raw = if bytes.starts_with(&GZIP_MAGIC) {
            let mut out = Vec::new();
            GzDecoder::new(bytes).read_to_end(&mut out)?;
            out
        } else {
            bytes.to_vec()
        };
        let nbt: SchematicNbt = fastnbt::from_bytes(&raw)?;

        let platform = platform_of(nbt.materials.as_deref().unwrap_or_default())?;
        let mut schematic = Self::new(
            platform,
            dimension("Width", nbt.width)?,
            dimension("Height", nbt.height)?,
            dimension("Length", nbt.length)?,
        );
        let volume = schematic.volume();
        if nbt.blocks.len() != volume || nbt.data.len() != volume {
            return Err(SchematicError::Format(format!(
                "{}x{}x{} needs {volume} entries, found {} blocks and {} data",
                schematic.width,
                schematic.height,
                schematic.length,
                nbt.blocks.len(),
                nbt.data.len()
            )));
        }

        schematic.blocks = nbt.blocks.iter().map(|&b| b as u8 as u16).collect();
        if let Some(add) = &nbt.add_blocks {
            if add.len() < volume.div_ceil(2) {
                return Err(SchematicError::Format(format!(
                    "AddBlocks holds {} bytes for {volume} blocks",
                    add.len()
                )));
            }
            for (i, block) in schematic.blocks.iter_mut().enumerate() {
                let byte = add[i / 2] as u8;
                let nibble = if i % 2 == 0 { byte & 0x0F } else { byte >> 4 };
                *block |= (nibble as u16) << 8;
            }
        }
        schematic.data = nbt.data.iter().map(|&d| d as u8 & 0x0F).collect();
        schematic.entities = nbt.entities;
        schematic.block_entities = nbt.tile_entities;

        log::debug!(
            "read {platform} schematic {}x{}x{} with {} entities and {} block entities",
            schematic.width,
            schematic.height,
            schematic.length,
            schematic.entities.len(),
            schematic.block_entities.len()
        );
        Ok(schematic)
    }

    /// Gzip-compressed file bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let volume = self.volume();
        if self.blocks.len() != volume || self.data.len() != volume {
            return Err(SchematicError::Format(format!(
                "arrays hold {} blocks and {} data for a volume of {volume}",
                self.blocks.len(),
                self.data.len()
            )));
        }
        let extent = |v: u16| {
            i16::try_from(v).map_err(|_| SchematicError::Format(format!("dimension {v} exceeds a short")))
        };

        let add_blocks = self.blocks.iter().any(|&b| b > 0xFF).then(|| {
            let nibbles: Vec<u8> = self.blocks.iter().map(|&b| ((b >> 8) & 0x0F) as u8).collect();
            let packed = nibbles
                .chunks(2)
                .map(|pair| (pair[0] | pair.get(1).map_or(0, |high| high << 4)) as i8)
                .collect();
            ByteArray::new(packed)
        });

        let nbt = SchematicNbt {
            width: extent(self.width)?,
            height: extent(self.height)?,
            length: extent(self.length)?,
            materials: Some(materials_of(self.platform).to_string()),
            blocks: ByteArray::new(self.blocks.iter().map(|&b| (b & 0xFF) as u8 as i8).collect()),
            add_blocks,
            data: ByteArray::new(self.data.iter().map(|&d| (d & 0x0F) as i8).collect()),
            entities: self.entities.clone(),
            tile_entities: self.block_entities.clone(),
            tile_ticks: Vec::new(),
        };

        let raw = fastnbt::to_bytes(&nbt)?;
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&raw)?;
        Ok(encoder.finish()?)
    }
}
