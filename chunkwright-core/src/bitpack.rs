//! Fixed-width unsigned integers packed into 64-bit words.
//!
//! Two layouts exist on disk:
//! - `Dense`: entries are laid end to end and may straddle two words
//!   (low bits in the first word, high bits in the next).
//! - `Sparse`: `64 / bits` entries per word, never straddling; the unused
//!   high bits of each word stay zero.

use serde::Serialize;

use crate::error::{ChunkError, Result};

/// Widest entry the codec accepts. Entries are decoded into `u32`.
pub const MAX_BITS_PER_ENTRY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PackLayout {
    Dense,
    Sparse,
}

/// Output of [`encode`]: the words plus the entry width that was chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedArray {
    pub words: Vec<u64>,
    pub bits_per_entry: usize,
}

/// Bits needed to store `max_value`, i.e. `ceil(log2(max_value + 1))`. Zero for zero.
#[inline]
pub fn bits_required(max_value: u32) -> usize {
    (u32::BITS - max_value.leading_zeros()) as usize
}

/// Number of words `entry_count` entries of `bits` bits occupy under `layout`.
///
/// `bits` must already be validated (`1..=32`).
#[inline]
pub fn words_required(entry_count: usize, bits: usize, layout: PackLayout) -> usize {
    match layout {
        PackLayout::Dense => (entry_count * bits).div_ceil(64),
        PackLayout::Sparse => entry_count.div_ceil(64 / bits),
    }
}

fn check_bits(bits: usize) -> Result<()> {
    if bits == 0 || bits > MAX_BITS_PER_ENTRY {
        return Err(ChunkError::value(format!(
            "bits per entry must be within 1..={MAX_BITS_PER_ENTRY}, got {bits}"
        )));
    }
    Ok(())
}

#[inline]
fn entry_mask(bits: usize) -> u64 {
    (1u64 << bits) - 1
}

/// Unpack `entry_count` entries of `bits` bits each.
///
/// Extra trailing words are ignored; too few words is a format error.
pub fn decode(words: &[u64], entry_count: usize, bits: usize, layout: PackLayout) -> Result<Vec<u32>> {
    check_bits(bits)?;
    let needed = words_required(entry_count, bits, layout);
    if words.len() < needed {
        return Err(ChunkError::format(format!(
            "packed array holds {} words but {entry_count} entries of {bits} bits ({layout:?}) need {needed}",
            words.len()
        )));
    }

    let mask = entry_mask(bits);
    let values = match layout {
        PackLayout::Dense => (0..entry_count)
            .map(|i| {
                let start = i * bits;
                let word = start / 64;
                let offset = start % 64;
                let mut value = words[word] >> offset;
                if offset + bits > 64 {
                    value |= words[word + 1] << (64 - offset);
                }
                (value & mask) as u32
            })
            .collect(),
        PackLayout::Sparse => {
            let per_word = 64 / bits;
            (0..entry_count)
                .map(|i| {
                    let offset = (i % per_word) * bits;
                    ((words[i / per_word] >> offset) & mask) as u32
                })
                .collect()
        }
    };
    Ok(values)
}

/// Pack `values` using at least `min_bits_per_entry` bits (and never fewer than 1).
pub fn encode(values: &[u32], min_bits_per_entry: usize, layout: PackLayout) -> Result<PackedArray> {
    let max = values.iter().copied().max().unwrap_or(0);
    let bits = min_bits_per_entry.max(bits_required(max)).max(1);
    check_bits(bits)?;

    let mut words = vec![0u64; words_required(values.len(), bits, layout)];
    match layout {
        PackLayout::Dense => {
            for (i, &value) in values.iter().enumerate() {
                let value = value as u64;
                let start = i * bits;
                let word = start / 64;
                let offset = start % 64;
                words[word] |= value << offset;
                if offset + bits > 64 {
                    words[word + 1] |= value >> (64 - offset);
                }
            }
        }
        PackLayout::Sparse => {
            let per_word = 64 / bits;
            for (i, &value) in values.iter().enumerate() {
                words[i / per_word] |= (value as u64) << ((i % per_word) * bits);
            }
        }
    }

    Ok(PackedArray {
        words,
        bits_per_entry: bits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_bits_required() {
        assert_eq!(bits_required(0), 0);
        assert_eq!(bits_required(1), 1);
        assert_eq!(bits_required(2), 2);
        assert_eq!(bits_required(15), 4);
        assert_eq!(bits_required(16), 5);
        assert_eq!(bits_required(u32::MAX), 32);
    }

    #[test]
    fn test_layout_divergence_at_five_bits() {
        let values: Vec<u32> = (0..128).map(|i| i % 32).collect();

        let dense = encode(&values, 5, PackLayout::Dense).unwrap();
        assert_eq!(dense.bits_per_entry, 5);
        assert_eq!(dense.words.len(), 10);

        let sparse = encode(&values, 5, PackLayout::Sparse).unwrap();
        assert_eq!(sparse.words.len(), 11);
        // 12 entries of 5 bits leave the top 4 bits of every word unused
        for word in &sparse.words {
            assert_eq!(word >> 60, 0);
        }

        assert_eq!(decode(&dense.words, 128, 5, PackLayout::Dense).unwrap(), values);
        assert_eq!(decode(&sparse.words, 128, 5, PackLayout::Sparse).unwrap(), values);
    }

    #[test]
    fn test_dense_entry_straddles_words() {
        // entry 12 starts at bit 60: low 4 bits in word 0, high bit in word 1
        let mut values = vec![0u32; 13];
        values[12] = 0b10101;
        let packed = encode(&values, 5, PackLayout::Dense).unwrap();
        assert_eq!(packed.words.len(), 2);
        assert_eq!(packed.words[0] >> 60, 0b0101);
        assert_eq!(packed.words[1], 0b1);
        assert_eq!(decode(&packed.words, 13, 5, PackLayout::Dense).unwrap(), values);
    }

    #[test]
    fn test_sparse_ignores_tail_bits() {
        // garbage in the unused top bits must not leak into entries
        let words = [0xF000_0000_0000_0001u64];
        let values = decode(&words, 12, 5, PackLayout::Sparse).unwrap();
        assert_eq!(values[0], 1);
        assert!(values[1..].iter().all(|&v| v == 0));
    }

    #[test]
    fn test_minimum_width_is_one_bit() {
        let packed = encode(&[0, 0, 0], 0, PackLayout::Dense).unwrap();
        assert_eq!(packed.bits_per_entry, 1);
        assert_eq!(packed.words, vec![0]);
    }

    #[test]
    fn test_empty_input() {
        let packed = encode(&[], 4, PackLayout::Sparse).unwrap();
        assert!(packed.words.is_empty());
        assert_eq!(decode(&[], 0, 4, PackLayout::Sparse).unwrap(), Vec::<u32>::new());
    }

    #[test]
    fn test_truncated_words_rejected() {
        let packed = encode(&vec![3u32; 4096], 4, PackLayout::Dense).unwrap();
        assert_eq!(packed.words.len(), 256);
        let err = decode(&packed.words[..255], 4096, 4, PackLayout::Dense).unwrap_err();
        assert!(matches!(err, ChunkError::Format(_)));
    }

    #[test]
    fn test_invalid_width_rejected() {
        assert!(matches!(decode(&[0], 1, 0, PackLayout::Dense), Err(ChunkError::Value(_))));
        assert!(matches!(decode(&[0], 1, 33, PackLayout::Sparse), Err(ChunkError::Value(_))));
        assert!(matches!(encode(&[1], 40, PackLayout::Dense), Err(ChunkError::Value(_))));
    }

    #[test]
    fn test_random_round_trip() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut counts = vec![0usize, 1, 2, 3, 63, 64, 65, 127, 128, 129, 1000, 4095, 4096];
        counts.extend((0..8).map(|_| rng.random_range(0..=4096usize)));

        for layout in [PackLayout::Dense, PackLayout::Sparse] {
            for bits in 1..=32usize {
                for &count in &counts {
                    let max = if bits == 32 { u32::MAX } else { (1u32 << bits) - 1 };
                    let values: Vec<u32> = (0..count).map(|_| rng.random_range(0..=max)).collect();
                    let packed = encode(&values, bits, layout).unwrap();
                    assert_eq!(packed.bits_per_entry, bits);
                    assert_eq!(packed.words.len(), words_required(count, bits, layout));
                    let decoded = decode(&packed.words, count, bits, layout).unwrap();
                    assert_eq!(decoded, values, "layout {layout:?}, bits {bits}, count {count}");
                }
            }
        }
    }
}
