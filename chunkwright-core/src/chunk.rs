//! Version-independent chunk value.

use std::collections::BTreeMap;

use fastnbt::Value;

use crate::axis::{self, SECTION_SIDE, SECTION_VOLUME};
use crate::block::Block;
use crate::error::{ChunkError, Result};
use crate::palette::Palette;
use crate::version::{DEFAULT_STATUS, Family};

/// 16x16x16 indices into the owning chunk's palette, in XYZ order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    blocks: Box<[u32]>,
}

impl Section {
    /// Section where every voxel holds `index`.
    pub fn filled(index: u32) -> Self {
        Self {
            blocks: vec![index; SECTION_VOLUME].into_boxed_slice(),
        }
    }

    pub fn from_indices(indices: Vec<u32>) -> Result<Self> {
        if indices.len() != SECTION_VOLUME {
            return Err(ChunkError::value(format!(
                "a section holds {SECTION_VOLUME} entries, got {}",
                indices.len()
            )));
        }
        Ok(Self {
            blocks: indices.into_boxed_slice(),
        })
    }

    /// `None` when a coordinate is 16 or more.
    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<u32> {
        axis::in_section(x, y, z).then(|| self.blocks[axis::xyz_index(x, y, z)])
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, index: u32) -> Result<()> {
        if !axis::in_section(x, y, z) {
            return Err(ChunkError::value(format!("({x}, {y}, {z}) lies outside a section")));
        }
        self.blocks[axis::xyz_index(x, y, z)] = index;
        Ok(())
    }

    pub fn indices(&self) -> &[u32] {
        &self.blocks
    }
}

/// A decoded chunk column.
///
/// `misc` holds auxiliary tag families verbatim. A `None` entry means the
/// family was absent or not supported by the source version.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub cx: i32,
    pub cz: i32,
    pub sections: BTreeMap<i32, Section>,
    pub palette: Palette,
    pub status: String,
    pub misc: BTreeMap<Family, Option<Value>>,
}

impl Chunk {
    /// Empty chunk whose palette holds only air.
    pub fn new(cx: i32, cz: i32) -> Self {
        let mut palette = Palette::new();
        palette.intern(Block::air());
        Self {
            cx,
            cz,
            sections: BTreeMap::new(),
            palette,
            status: DEFAULT_STATUS.to_string(),
            misc: BTreeMap::new(),
        }
    }

    /// Block at chunk-local `x`/`z` and world `y`. `None` where no section is
    /// stored or when `x`/`z` fall outside the column.
    pub fn block_at(&self, x: usize, y: i32, z: usize) -> Option<&Block> {
        let section = self.sections.get(&y.div_euclid(SECTION_SIDE as i32))?;
        let local_y = y.rem_euclid(SECTION_SIDE as i32) as usize;
        self.palette.get(section.get(x, local_y, z)?)
    }

    /// Place `block`, creating an air-filled section on demand.
    pub fn set_block(&mut self, x: usize, y: i32, z: usize, block: Block) -> Result<()> {
        if x >= SECTION_SIDE || z >= SECTION_SIDE {
            return Err(ChunkError::value(format!("({x}, {z}) lies outside the chunk column")));
        }
        let index = self.palette.intern(block);
        let cy = y.div_euclid(SECTION_SIDE as i32);
        let local_y = y.rem_euclid(SECTION_SIDE as i32) as usize;
        match self.sections.get_mut(&cy) {
            Some(section) => section.set(x, local_y, z, index),
            None => {
                let air = self.palette.intern(Block::air());
                let mut section = Section::filled(air);
                section.set(x, local_y, z, index)?;
                self.sections.insert(cy, section);
                Ok(())
            }
        }
    }

    /// A present family fragment, if any.
    pub fn misc(&self, family: Family) -> Option<&Value> {
        self.misc.get(&family).and_then(Option::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::MINECRAFT;

    #[test]
    fn test_set_and_get_block() {
        let mut chunk = Chunk::new(0, 0);
        let stone = Block::new(MINECRAFT, "stone").unwrap();
        chunk.set_block(3, -61, 7, stone.clone()).unwrap();

        assert_eq!(chunk.block_at(3, -61, 7), Some(&stone));
        assert_eq!(chunk.block_at(3, -60, 7), Some(&Block::air()));
        assert!(chunk.sections.contains_key(&-4));
        assert_eq!(chunk.block_at(0, 100, 0), None);
    }

    #[test]
    fn test_out_of_column_coordinates() {
        let mut chunk = Chunk::new(0, 0);
        chunk.set_block(0, 0, 0, Block::new(MINECRAFT, "stone").unwrap()).unwrap();
        assert_eq!(chunk.block_at(16, 0, 0), None);
        assert_eq!(chunk.block_at(0, 0, 16), None);
        assert_eq!(chunk.block_at(usize::MAX, 0, 0), None);

        let before = chunk.clone();
        let gold = Block::new(MINECRAFT, "gold_block").unwrap();
        assert!(matches!(chunk.set_block(16, 0, 0, gold.clone()), Err(ChunkError::Value(_))));
        assert!(matches!(chunk.set_block(0, 0, 99, gold), Err(ChunkError::Value(_))));
        assert_eq!(chunk, before);

        let mut section = Section::filled(0);
        assert_eq!(section.get(0, 16, 0), None);
        assert!(section.set(0, 16, 0, 1).is_err());
        assert_eq!(section.get(15, 15, 15), Some(0));
    }

    #[test]
    fn test_section_length_checked() {
        assert!(Section::from_indices(vec![0; SECTION_VOLUME]).is_ok());
        assert!(matches!(Section::from_indices(vec![0; 10]), Err(ChunkError::Value(_))));
    }

    #[test]
    fn test_misc_absent_vs_present() {
        let mut chunk = Chunk::new(0, 0);
        chunk.misc.insert(Family::Structures, None);
        chunk.misc.insert(Family::BlockTicks, Some(Value::List(vec![])));
        assert_eq!(chunk.misc(Family::Structures), None);
        assert_eq!(chunk.misc(Family::Entities), None);
        assert_eq!(chunk.misc(Family::BlockTicks), Some(&Value::List(vec![])));
    }
}
