//! Utility helpers mirrored from upstream `json-pack/src/util/`.

pub mod buffers;
mod compression_table;
mod decompression_table;

pub use compression_table::{CompressionError, CompressionTable};
pub use decompression_table::{DecompressionError, DecompressionTable};
