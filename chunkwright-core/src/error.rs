use thiserror::Error;

use crate::version::Platform;

pub type Result<T> = std::result::Result<T, ChunkError>;

/// Everything that can go wrong while turning a chunk tree into a [`crate::Chunk`] or back.
///
/// A failed decode never yields a partial chunk.
#[derive(Error, Debug)]
pub enum ChunkError {
    /// Stored data is truncated or inconsistent.
    #[error("format error: {0}")]
    Format(String),
    #[error("no registered {platform} interface supports version {version}")]
    UnsupportedVersion { platform: Platform, version: i32 },
    /// Invalid parameters handed to a codec.
    #[error("value error: {0}")]
    Value(String),
    #[error("interface {interface} has no support for {feature}")]
    UnsupportedFeature { interface: String, feature: &'static str },
    #[error("nbt error: {0}")]
    Nbt(#[from] fastnbt::error::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ChunkError {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        ChunkError::Format(msg.into())
    }

    pub(crate) fn value(msg: impl Into<String>) -> Self {
        ChunkError::Value(msg.into())
    }
}
