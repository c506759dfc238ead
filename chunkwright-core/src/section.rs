//! One 16x16x16 section: local palette plus packed indices.

use fastnbt::Value;

use crate::axis::{self, SECTION_VOLUME};
use crate::bitpack::{self, PackLayout};
use crate::block::Block;
use crate::error::{ChunkError, Result};
use crate::nbt::{self, Compound};
use crate::palette::{self, Palette};
use crate::version::{FeatureTable, SectionFormat};

/// Sections never pack with fewer bits than this, whatever the palette size.
pub const MIN_BITS_PER_ENTRY: usize = 4;

/// A section as stored: indices into its own palette, already in XYZ order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSection {
    pub indices: Vec<u32>,
    pub palette: Vec<Block>,
}

/// Entry width for a local palette of `palette_len` blocks.
pub fn section_bits(palette_len: usize) -> usize {
    MIN_BITS_PER_ENTRY.max(bitpack::bits_required(palette_len.saturating_sub(1) as u32))
}

struct StoredBlocks<'a> {
    palette: &'a [Value],
    data: Option<&'a fastnbt::LongArray>,
    /// Single-entry palettes may leave `data` out.
    data_optional: bool,
}

fn stored_blocks<'a>(node: &'a Compound, format: SectionFormat) -> Result<Option<StoredBlocks<'a>>> {
    match format {
        SectionFormat::Flat => Ok(nbt::get_list(node, "Palette").map(|palette| StoredBlocks {
            palette,
            data: nbt::get_long_array(node, "BlockStates"),
            data_optional: false,
        })),
        SectionFormat::Nested => {
            let Some(states) = nbt::get_compound(node, "block_states") else {
                return Ok(None);
            };
            Ok(nbt::get_list(states, "palette").map(|palette| StoredBlocks {
                palette,
                data: nbt::get_long_array(states, "data"),
                data_optional: true,
            }))
        }
        SectionFormat::Unsupported => Err(ChunkError::value("feature table has no section layout")),
    }
}

/// Decode one section node. `Ok(None)` means no palette is stored and the
/// section is all air.
pub fn decode_section(node: &Compound, features: &FeatureTable) -> Result<Option<DecodedSection>> {
    let Some(stored) = stored_blocks(node, features.sections())? else {
        return Ok(None);
    };

    let palette = stored
        .palette
        .iter()
        .map(Block::from_palette_entry)
        .collect::<Result<Vec<_>>>()?;
    if palette.is_empty() {
        return Err(ChunkError::format("section palette is empty"));
    }

    let layout = features.long_array();
    let bits = section_bits(palette.len());
    let disk = match stored.data {
        Some(longs) => {
            let expected = expected_words(palette.len(), layout);
            if longs.len() != expected {
                return Err(ChunkError::format(format!(
                    "section stores {} words; {} palette entries at {bits} bits ({layout:?}) need {expected}",
                    longs.len(),
                    palette.len()
                )));
            }
            bitpack::decode(&nbt::words(longs), SECTION_VOLUME, bits, layout)?
        }
        None if stored.data_optional && palette.len() == 1 => vec![0; SECTION_VOLUME],
        None => return Err(ChunkError::format("section has a palette but no block data")),
    };

    if let Some(&bad) = disk.iter().find(|&&i| i as usize >= palette.len()) {
        return Err(ChunkError::format(format!(
            "section index {bad} is outside its {}-entry palette",
            palette.len()
        )));
    }

    Ok(Some(DecodedSection {
        indices: axis::yzx_to_xyz(&disk),
        palette,
    }))
}

/// Encode one section at height `cy`. `Ok(None)` when it is nothing but air.
///
/// `indices` are global palette indices in XYZ order.
pub fn encode_section(
    cy: i32,
    indices: &[u32],
    global: &Palette,
    features: &FeatureTable,
) -> Result<Option<Value>> {
    if indices.len() != SECTION_VOLUME {
        return Err(ChunkError::value(format!(
            "section {cy} holds {} entries instead of {SECTION_VOLUME}",
            indices.len()
        )));
    }
    let y = i8::try_from(cy)
        .map_err(|_| ChunkError::value(format!("section height {cy} does not fit a byte tag")))?;

    let compacted = palette::compact(indices);
    let blocks = compacted
        .ids
        .iter()
        .map(|&id| {
            global.get(id).ok_or_else(|| {
                ChunkError::value(format!(
                    "section {cy} references index {id} of a {}-entry palette",
                    global.len()
                ))
            })
        })
        .collect::<Result<Vec<&Block>>>()?;

    if blocks.len() == 1 && blocks[0].is_air() {
        return Ok(None);
    }

    let disk = axis::xyz_to_yzx(&compacted.indices);
    let packed = bitpack::encode(&disk, MIN_BITS_PER_ENTRY, features.long_array())?;
    let palette_tag = nbt::list(blocks.iter().map(|b| b.to_palette_entry()).collect());

    let mut section = Compound::new();
    section.insert("Y".to_string(), Value::Byte(y));
    match features.sections() {
        SectionFormat::Flat => {
            section.insert("Palette".to_string(), palette_tag);
            section.insert("BlockStates".to_string(), nbt::long_array(&packed.words));
        }
        SectionFormat::Nested => {
            let mut states = Compound::new();
            states.insert("palette".to_string(), palette_tag);
            if blocks.len() > 1 {
                states.insert("data".to_string(), nbt::long_array(&packed.words));
            }
            section.insert("block_states".to_string(), Value::Compound(states));
        }
        SectionFormat::Unsupported => {
            return Err(ChunkError::value("feature table has no section layout"));
        }
    }
    Ok(Some(Value::Compound(section)))
}

/// Words a section with `palette_len` entries stores under `layout`.
pub fn expected_words(palette_len: usize, layout: PackLayout) -> usize {
    bitpack::words_required(SECTION_VOLUME, section_bits(palette_len), layout)
}
