//! Splitting a schematic into 16x16 columns and putting it back together.

use std::collections::BTreeMap;

use chunkwright_core::nbt;
use fastnbt::Value;

use crate::file::Schematic;

/// Horizontal extent of a column.
pub const COLUMN_SIDE: usize = 16;

/// One column of a schematic, clipped to the schematic's bounds.
///
/// `blocks`/`data` are indexed `(y * size_z + z) * size_x + x` in local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct SchematicChunk {
    pub cx: i32,
    pub cz: i32,
    pub size_x: usize,
    pub size_y: usize,
    pub size_z: usize,
    pub blocks: Vec<u16>,
    pub data: Vec<u8>,
    pub block_entities: Vec<Value>,
    pub entities: Vec<Value>,
}

impl SchematicChunk {
    /// Air-filled column.
    pub fn new(cx: i32, cz: i32, size_x: usize, size_y: usize, size_z: usize) -> Self {
        let volume = size_x * size_y * size_z;
        Self {
            cx,
            cz,
            size_x,
            size_y,
            size_z,
            blocks: vec![0; volume],
            data: vec![0; volume],
            block_entities: Vec::new(),
            entities: Vec::new(),
        }
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (y * self.size_z + z) * self.size_x + x
    }

    /// Schematic coordinates of this column's local origin.
    pub fn origin(&self) -> (usize, usize) {
        (self.cx as usize * COLUMN_SIDE, self.cz as usize * COLUMN_SIDE)
    }
}

fn block_entity_position(entity: &Value) -> Option<(i64, i64, i64)> {
    let Value::Compound(c) = entity else { return None };
    Some((nbt::get_integer(c, "x")?, nbt::get_integer(c, "y")?, nbt::get_integer(c, "z")?))
}

fn entity_position(entity: &Value) -> Option<(f64, f64, f64)> {
    let Value::Compound(c) = entity else { return None };
    let Some(Value::List(pos)) = c.get("Pos") else { return None };
    let coord = |v: &Value| match v {
        Value::Double(d) => Some(*d),
        Value::Float(f) => Some(*f as f64),
        _ => None,
    };
    match pos.as_slice() {
        [x, y, z] => Some((coord(x)?, coord(y)?, coord(z)?)),
        _ => None,
    }
}

impl Schematic {
    /// Every column of the schematic, keyed by `(cx, cz)`.
    ///
    /// Block entities are bucketed by their `x, y, z` tags and entities by
    /// `Pos`; anything outside the bounds is left out.
    pub fn chunks(&self) -> BTreeMap<(i32, i32), SchematicChunk> {
        let (width, height, length) = (self.width as usize, self.height as usize, self.length as usize);
        let mut chunks = BTreeMap::new();

        for cx in 0..width.div_ceil(COLUMN_SIDE) {
            for cz in 0..length.div_ceil(COLUMN_SIDE) {
                let (x0, z0) = (cx * COLUMN_SIDE, cz * COLUMN_SIDE);
                let size_x = COLUMN_SIDE.min(width - x0);
                let size_z = COLUMN_SIDE.min(length - z0);
                let mut chunk = SchematicChunk::new(cx as i32, cz as i32, size_x, height, size_z);
                for y in 0..height {
                    for z in 0..size_z {
                        for x in 0..size_x {
                            let src = self.index(x0 + x, y, z0 + z);
                            let dst = chunk.index(x, y, z);
                            chunk.blocks[dst] = self.blocks[src];
                            chunk.data[dst] = self.data[src];
                        }
                    }
                }
                chunks.insert((cx as i32, cz as i32), chunk);
            }
        }

        for entity in &self.block_entities {
            match block_entity_position(entity) {
                Some((x, y, z)) if self.contains(x, y, z) => {
                    if let Some(chunk) = chunks.get_mut(&((x >> 4) as i32, (z >> 4) as i32)) {
                        chunk.block_entities.push(entity.clone());
                    }
                }
                _ => log::debug!("block entity outside the schematic bounds skipped"),
            }
        }
        for entity in &self.entities {
            match entity_position(entity) {
                Some((x, y, z)) if self.contains(x.floor() as i64, y.floor() as i64, z.floor() as i64) => {
                    let key = ((x.floor() as i64 >> 4) as i32, (z.floor() as i64 >> 4) as i32);
                    if let Some(chunk) = chunks.get_mut(&key) {
                        chunk.entities.push(entity.clone());
                    }
                }
                _ => log::debug!("entity outside the schematic bounds skipped"),
            }
        }
        chunks
    }
}

/// Reassembles columns into one [`Schematic`].
pub struct SchematicWriter {
    schematic: Schematic,
}

impl SchematicWriter {
    pub fn new(platform: chunkwright_core::Platform, width: u16, height: u16, length: u16) -> Self {
        Self {
            schematic: Schematic::new(platform, width, height, length),
        }
    }

    /// Copy `chunk` into place, clipping whatever falls outside the bounds.
    pub fn write(&mut self, chunk: &SchematicChunk) {
        if chunk.cx < 0 || chunk.cz < 0 {
            log::debug!("column ({}, {}) is outside the schematic", chunk.cx, chunk.cz);
            return;
        }
        let (x0, z0) = chunk.origin();
        let s = &mut self.schematic;
        let (width, height, length) = (s.width as usize, s.height as usize, s.length as usize);
        if x0 >= width || z0 >= length {
            log::debug!("column ({}, {}) is outside the schematic", chunk.cx, chunk.cz);
            return;
        }

        for y in 0..chunk.size_y.min(height) {
            for z in 0..chunk.size_z.min(length - z0) {
                for x in 0..chunk.size_x.min(width - x0) {
                    let src = chunk.index(x, y, z);
                    let dst = s.index(x0 + x, y, z0 + z);
                    s.blocks[dst] = chunk.blocks[src];
                    s.data[dst] = chunk.data[src];
                }
            }
        }
        s.block_entities.extend(chunk.block_entities.iter().cloned());
        s.entities.extend(chunk.entities.iter().cloned());
    }

    pub fn finish(self) -> Schematic {
        self.schematic
    }
}
