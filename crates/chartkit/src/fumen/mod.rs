//! Fumen V2 binary chart codec.
//!
//! - `layout` - record offsets and sizes
//! - `ByteReader` / `ByteWriter` - little-endian byte cursors
//! - `FumenChart` and its records
//! - `read_fumen_*` / `write_fumen_*` - decoding and encoding

mod bytes;
pub mod layout;
mod reader;
mod types;
mod writer;

pub use bytes::*;
pub use reader::*;
pub use types::*;
pub use writer::*;

/// Extension written by the converters.
pub const EXTENSION: &str = ".fumen";
