use thiserror::Error;

pub type Result<T> = std::result::Result<T, SchematicError>;

#[derive(Error, Debug)]
pub enum SchematicError {
    #[error("\"{0}\" is not a supported platform for a schematic file")]
    Materials(String),
    /// Array sizes or dimensions do not agree.
    #[error("malformed schematic: {0}")]
    Format(String),
    #[error("block {0} has no numeric id")]
    NotNumeric(String),
    #[error(transparent)]
    Chunk(#[from] chunkwright_core::ChunkError),
    #[error("nbt error: {0}")]
    Nbt(#[from] fastnbt::error::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
