//! Version-aware codec for paletted chunk NBT.
//!
//! Reads chunk trees written by many schema revisions into a universal
//! [`Chunk`] and writes them back out for any registered revision:
//! - `bitpack`: packed index arrays (dense and sparse layouts)
//! - `palette`: chunk-global palette merging
//! - `section`: one 16x16x16 section
//! - `version`: feature tables per schema revision
//! - `pipeline`: whole-chunk decode/encode
//! - `format` and `payload`: bytes in, bytes out

pub mod axis;
pub mod bitpack;
pub mod block;
pub mod chunk;
pub mod error;
pub mod format;
pub mod nbt;
pub mod palette;
pub mod payload;
pub mod pipeline;
pub mod section;
pub mod version;

pub use block::{Block, PropertyValue};
pub use chunk::{Chunk, Section};
pub use error::{ChunkError, Result};
pub use format::ChunkFormat;
pub use palette::Palette;
pub use pipeline::EncodedChunk;
pub use version::{Family, FeatureTable, Platform, VersionInterface, VersionRange, VersionRegistry};
