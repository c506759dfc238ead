//! Chunk-global palettes.
//!
//! Each stored section carries its own small palette. Decoding folds them
//! into one palette per chunk with [`merge`]; encoding goes the other way
//! with [`compact`].

use serde::Serialize;

use crate::block::Block;
use crate::error::{ChunkError, Result};

/// Ordered list of distinct blocks. The position of a block is its index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Palette {
    blocks: Vec<Block>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails with a value error if `blocks` repeats an entry.
    pub fn from_blocks(blocks: Vec<Block>) -> Result<Self> {
        let mut sorted: Vec<&Block> = blocks.iter().collect();
        sorted.sort();
        if let Some(pair) = sorted.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(ChunkError::value(format!("palette repeats {}", pair[0])));
        }
        Ok(Self { blocks })
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, index: u32) -> Option<&Block> {
        self.blocks.get(index as usize)
    }

    pub fn index_of(&self, block: &Block) -> Option<u32> {
        self.blocks.iter().position(|b| b == block).map(|i| i as u32)
    }

    /// Index of `block`, appending it first if it is new.
    pub fn intern(&mut self, block: Block) -> u32 {
        match self.index_of(&block) {
            Some(index) => index,
            None => {
                self.blocks.push(block);
                (self.blocks.len() - 1) as u32
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    pub fn as_slice(&self) -> &[Block] {
        &self.blocks
    }
}

/// Result of [`merge`].
#[derive(Debug, Clone)]
pub struct MergedPalette {
    pub palette: Palette,
    /// `remaps[s][local]` is the global index of entry `local` of section `s`.
    pub remaps: Vec<Vec<u32>>,
}

/// Fold `base` and every section palette into one deduplicated palette.
///
/// All inputs are concatenated and sorted once by the block order, so the
/// output order is by value and not by first appearance.
pub fn merge(base: &[Block], sections: &[Vec<Block>]) -> MergedPalette {
    let all: Vec<&Block> = base.iter().chain(sections.iter().flatten()).collect();
    let mut order: Vec<usize> = (0..all.len()).collect();
    order.sort_by(|&a, &b| all[a].cmp(all[b]));

    let mut unique: Vec<Block> = Vec::new();
    let mut inverse = vec![0u32; all.len()];
    for &pos in &order {
        if unique.last() != Some(all[pos]) {
            unique.push(all[pos].clone());
        }
        inverse[pos] = (unique.len() - 1) as u32;
    }

    let mut remaps = Vec::with_capacity(sections.len());
    let mut offset = base.len();
    for section in sections {
        remaps.push(inverse[offset..offset + section.len()].to_vec());
        offset += section.len();
    }

    MergedPalette {
        palette: Palette { blocks: unique },
        remaps,
    }
}

/// Result of [`compact`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compacted {
    /// Distinct global indices present, ascending.
    pub ids: Vec<u32>,
    /// Input rewritten as positions into `ids`.
    pub indices: Vec<u32>,
}

/// Reduce global indices to a local palette of the ids actually used.
pub fn compact(indices: &[u32]) -> Compacted {
    let mut ids = indices.to_vec();
    ids.sort_unstable();
    ids.dedup();
    let local = indices
        .iter()
        .map(|&id| ids.partition_point(|&g| g < id) as u32)
        .collect();
    Compacted { ids, indices: local }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::MINECRAFT;

    fn b(name: &str) -> Block {
        Block::new(MINECRAFT, name).unwrap()
    }

    #[test]
    fn test_merge_dedups_across_sections() {
        let sections = vec![
            vec![b("stone"), b("dirt")],
            vec![b("dirt"), b("grass_block"), b("air")],
            vec![b("stone")],
        ];
        let merged = merge(&[b("air")], &sections);

        assert_eq!(merged.palette.len(), 4);
        let names: Vec<&str> = merged.palette.iter().map(|b| b.base_name()).collect();
        assert_eq!(names, vec!["air", "dirt", "grass_block", "stone"]);

        for (section, remap) in sections.iter().zip(&merged.remaps) {
            assert_eq!(section.len(), remap.len());
            for (local, &global) in remap.iter().enumerate() {
                assert_eq!(merged.palette.get(global), Some(&section[local]));
            }
        }
    }

    #[test]
    fn test_merge_order_is_by_value() {
        let merged = merge(&[], &[vec![b("stone"), b("andesite")]]);
        assert_eq!(merged.palette.get(0), Some(&b("andesite")));
        assert_eq!(merged.remaps[0], vec![1, 0]);
    }

    #[test]
    fn test_merge_empty() {
        let merged = merge(&[], &[]);
        assert!(merged.palette.is_empty());
        assert!(merged.remaps.is_empty());

        let merged = merge(&[b("air")], &[vec![]]);
        assert_eq!(merged.palette.len(), 1);
        assert_eq!(merged.remaps, vec![Vec::<u32>::new()]);
    }

    #[test]
    fn test_compact() {
        let compacted = compact(&[9, 3, 3, 9, 5]);
        assert_eq!(compacted.ids, vec![3, 5, 9]);
        assert_eq!(compacted.indices, vec![2, 0, 0, 2, 1]);
    }

    #[test]
    fn test_from_blocks_rejects_duplicates() {
        assert!(Palette::from_blocks(vec![b("stone"), b("dirt")]).is_ok());
        assert!(matches!(
            Palette::from_blocks(vec![b("stone"), b("dirt"), b("stone")]),
            Err(ChunkError::Value(_))
        ));
    }

    #[test]
    fn test_intern() {
        let mut palette = Palette::new();
        assert_eq!(palette.intern(b("air")), 0);
        assert_eq!(palette.intern(b("stone")), 1);
        assert_eq!(palette.intern(b("air")), 0);
        assert_eq!(palette.len(), 2);
    }
}
