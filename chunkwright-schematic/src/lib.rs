//! MCEdit-style `.schematic` files.
//!
//! Blocks are stored as numeric ids plus a data nibble. They become universal
//! [`Block`]s as `numerical:<id>[block_data=<data>]`, with id 0 read as air.

mod chunk;
mod error;
mod file;

use std::collections::BTreeMap;

use chunkwright_core::{Block, Chunk, Family, PropertyValue};
use fastnbt::Value;

pub use chunk::{COLUMN_SIDE, SchematicChunk, SchematicWriter};
pub use error::{Result, SchematicError};
pub use file::Schematic;

pub const NUMERICAL: &str = "numerical";
const BLOCK_DATA: &str = "block_data";

/// Universal block for a numeric id and data value.
pub fn numerical_block(id: u16, data: u8) -> Result<Block> {
    if id == 0 && data == 0 {
        return Ok(Block::air());
    }
    Ok(Block::with_properties(
        NUMERICAL,
        id.to_string(),
        BTreeMap::from([(BLOCK_DATA.to_string(), PropertyValue::Int(data as i32))]),
    )?)
}

/// Inverse of [`numerical_block`].
pub fn numeric_ids(block: &Block) -> Result<(u16, u8)> {
    if block.is_air() {
        return Ok((0, 0));
    }
    let not_numeric = || SchematicError::NotNumeric(block.to_string());
    if block.namespace() != NUMERICAL {
        return Err(not_numeric());
    }
    let id: u16 = block.base_name().parse().map_err(|_| not_numeric())?;
    let data = match block.property(BLOCK_DATA) {
        None => 0,
        Some(PropertyValue::Byte(v)) => *v as i64,
        Some(PropertyValue::Short(v)) => *v as i64,
        Some(PropertyValue::Int(v)) => *v as i64,
        Some(PropertyValue::Long(v)) => *v,
        Some(PropertyValue::String(s)) => s.parse().map_err(|_| not_numeric())?,
    };
    if id > 0x0FFF || !(0..16).contains(&data) {
        return Err(not_numeric());
    }
    Ok((id, data as u8))
}

impl SchematicChunk {
    /// Universal chunk with the column's bottom at world y 0.
    pub fn to_chunk(&self) -> Result<Chunk> {
        let mut chunk = Chunk::new(self.cx, self.cz);
        for y in 0..self.size_y {
            for z in 0..self.size_z {
                for x in 0..self.size_x {
                    let i = self.index(x, y, z);
                    if self.blocks[i] == 0 && self.data[i] == 0 {
                        continue;
                    }
                    chunk.set_block(x, y as i32, z, numerical_block(self.blocks[i], self.data[i])?)?;
                }
            }
        }
        chunk
            .misc
            .insert(Family::BlockEntities, Some(Value::List(self.block_entities.clone())));
        chunk.misc.insert(Family::Entities, Some(Value::List(self.entities.clone())));
        Ok(chunk)
    }

    /// Column of the given size read back out of a universal chunk.
    pub fn from_chunk(chunk: &Chunk, size_x: usize, size_y: usize, size_z: usize) -> Result<Self> {
        if size_x > COLUMN_SIDE || size_z > COLUMN_SIDE {
            return Err(SchematicError::Format(format!(
                "column of {size_x}x{size_z} exceeds {COLUMN_SIDE}x{COLUMN_SIDE}"
            )));
        }
        let mut column = Self::new(chunk.cx, chunk.cz, size_x, size_y, size_z);
        for y in 0..size_y {
            for z in 0..size_z {
                for x in 0..size_x {
                    let Some(block) = chunk.block_at(x, y as i32, z) else { continue };
                    let (id, data) = numeric_ids(block)?;
                    let i = column.index(x, y, z);
                    column.blocks[i] = id;
                    column.data[i] = data;
                }
            }
        }
        let list = |family| match chunk.misc(family) {
            Some(Value::List(items)) => items.clone(),
            _ => Vec::new(),
        };
        column.block_entities = list(Family::BlockEntities);
        column.entities = list(Family::Entities);
        Ok(column)
    }
}
