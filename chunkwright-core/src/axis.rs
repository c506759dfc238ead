//! Coordinate order of the 4096 entries in a section.
//!
//! On disk a section is stored Y-major (`index = y*256 + z*16 + x`); in
//! memory it is X-major (`index = x*256 + y*16 + z`). The two functions here
//! are exact inverses and are the only place the permutation lives.

pub const SECTION_SIDE: usize = 16;
pub const SECTION_VOLUME: usize = SECTION_SIDE * SECTION_SIDE * SECTION_SIDE;

/// Whether section-local coordinates fall inside one section.
#[inline]
pub fn in_section(x: usize, y: usize, z: usize) -> bool {
    x < SECTION_SIDE && y < SECTION_SIDE && z < SECTION_SIDE
}

/// Flat index in the in-memory (XYZ) order.
#[inline]
pub fn xyz_index(x: usize, y: usize, z: usize) -> usize {
    (x * SECTION_SIDE + y) * SECTION_SIDE + z
}

/// Flat index in the on-disk (YZX) order.
#[inline]
pub fn yzx_index(x: usize, y: usize, z: usize) -> usize {
    (y * SECTION_SIDE + z) * SECTION_SIDE + x
}

/// Reorder disk-order entries into memory order.
pub fn yzx_to_xyz<T: Copy + Default>(disk: &[T]) -> Vec<T> {
    debug_assert_eq!(disk.len(), SECTION_VOLUME);
    let mut out = vec![T::default(); SECTION_VOLUME];
    for x in 0..SECTION_SIDE {
        for y in 0..SECTION_SIDE {
            for z in 0..SECTION_SIDE {
                out[xyz_index(x, y, z)] = disk[yzx_index(x, y, z)];
            }
        }
    }
    out
}

/// Reorder memory-order entries into disk order. Inverse of [`yzx_to_xyz`].
pub fn xyz_to_yzx<T: Copy + Default>(memory: &[T]) -> Vec<T> {
    debug_assert_eq!(memory.len(), SECTION_VOLUME);
    let mut out = vec![T::default(); SECTION_VOLUME];
    for x in 0..SECTION_SIDE {
        for y in 0..SECTION_SIDE {
            for z in 0..SECTION_SIDE {
                out[yzx_index(x, y, z)] = memory[xyz_index(x, y, z)];
            }
        }
    }
    out
}
