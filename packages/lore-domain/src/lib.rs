mod category;
mod chunk;

pub use category::{Category, UnknownCategory};
pub use chunk::{Chunk, ChunkMetadata, chunk_id};
