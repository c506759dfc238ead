//! Chunk payload framing.
//!
//! A stored chunk is `[length:4 BE][compression:1][data]` where `length`
//! counts the compression byte plus the data.

use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

use flate2::Compression as Level;
use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use lz4_java_wrc::{Lz4BlockInput, Lz4BlockOutput};

use crate::error::{ChunkError, Result};

const HEADER_LEN: usize = 5;
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const LZ4_MAGIC: &[u8] = b"LZ4Block";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Gzip = 1,
    Zlib = 2,
    None = 3,
    Lz4 = 4,
}

impl Compression {
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Result<Self> {
        match id {
            1 => Ok(Compression::Gzip),
            2 => Ok(Compression::Zlib),
            3 => Ok(Compression::None),
            4 => Ok(Compression::Lz4),
            other => Err(ChunkError::format(format!("unknown compression type {other}"))),
        }
    }

    pub fn compress(self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Compression::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), Level::default());
                encoder.write_all(data)?;
                Ok(encoder.finish()?)
            }
            Compression::Zlib => {
                let mut encoder = ZlibEncoder::new(Vec::new(), Level::default());
                encoder.write_all(data)?;
                Ok(encoder.finish()?)
            }
            Compression::None => Ok(data.to_vec()),
            Compression::Lz4 => {
                let mut out = Vec::new();
                Lz4BlockOutput::new(&mut out).write_all(data)?;
                Ok(out)
            }
        }
    }

    pub fn decompress(self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        match self {
            Compression::Gzip => GzDecoder::new(data).read_to_end(&mut out)?,
            Compression::Zlib => ZlibDecoder::new(data).read_to_end(&mut out)?,
            Compression::None => {
                out.extend_from_slice(data);
                data.len()
            }
            Compression::Lz4 => Lz4BlockInput::new(data).read_to_end(&mut out)?,
        };
        Ok(out)
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Compression::Gzip => "gzip",
            Compression::Zlib => "zlib",
            Compression::None => "none",
            Compression::Lz4 => "lz4",
        };
        f.write_str(name)
    }
}

impl FromStr for Compression {
    type Err = ChunkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "gzip" => Ok(Compression::Gzip),
            "zlib" => Ok(Compression::Zlib),
            "none" => Ok(Compression::None),
            "lz4" => Ok(Compression::Lz4),
            other => Err(ChunkError::value(format!("unknown compression {other:?}"))),
        }
    }
}

/// Compress `nbt` and frame it.
pub fn wrap(nbt: &[u8], compression: Compression) -> Result<Vec<u8>> {
    let compressed = compression.compress(nbt)?;
    let total_len = u32::try_from(compressed.len() + 1)
        .map_err(|_| ChunkError::value("payload does not fit a 32-bit length"))?;

    let mut result = Vec::with_capacity(HEADER_LEN + compressed.len());
    result.extend_from_slice(&total_len.to_be_bytes());
    result.push(compression.id());
    result.extend_from_slice(&compressed);
    Ok(result)
}

/// Strip the frame and decompress. Trailing padding after `length` is ignored.
pub fn unwrap(payload: &[u8]) -> Result<(Vec<u8>, Compression)> {
    if payload.len() < HEADER_LEN {
        return Err(ChunkError::format(format!("payload of {} bytes has no header", payload.len())));
    }
    let total_len = u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]) as usize;
    if total_len == 0 || payload.len() - 4 < total_len {
        return Err(ChunkError::format(format!(
            "payload declares {total_len} bytes but holds {}",
            payload.len() - 4
        )));
    }
    let compression = Compression::from_id(payload[4])?;
    let data = &payload[HEADER_LEN..4 + total_len];
    Ok((compression.decompress(data)?, compression))
}

/// Compression of unframed bytes, told apart by their leading magic.
///
/// Uncompressed NBT starts with a tag id (0x0a for a root compound), which
/// none of the magics collide with.
pub fn sniff(bytes: &[u8]) -> Compression {
    match bytes {
        _ if bytes.starts_with(&GZIP_MAGIC) => Compression::Gzip,
        // CMF 0x78 is deflate with a 32K window; FLG varies with the level
        [0x78, 0x01 | 0x5e | 0x9c | 0xda, ..] => Compression::Zlib,
        _ if bytes.starts_with(LZ4_MAGIC) => Compression::Lz4,
        _ => Compression::None,
    }
}

/// Bare NBT file bytes in any of the [`Compression`] encodings.
pub fn decompress_auto(bytes: &[u8]) -> Result<Vec<u8>> {
    sniff(bytes).decompress(bytes)
}
