//! The LZ4 frame format.
//!
//! An lz4-compressed file typically consists of a single frame: the magic
//! number, a descriptor, a sequence of size-prefixed blocks, and a zero
//! sentinel. The format is self-terminating, so frames can be embedded or
//! concatenated without an outer length.
//!
//! [`CompressionSettings`] writes frames with linked blocks and no checksums;
//! [`FrameDecoder`] reads frames from any conformant encoder, skipping
//! whatever optional header fields and checksums they carry.

mod compress;
mod decompress;
mod header;

/// The four magic bytes at the start of every LZ4 frame (little endian).
pub const MAGIC: u32 = 0x184D2204;
/// Set in a block's length prefix when its payload is stored uncompressed.
const INCOMPRESSIBLE: u32 = 1 << 31;
/// Backreferences reach at most 64 KiB back; also the decode history size.
pub const WINDOW_SIZE: usize = 64 * 1024;
/// Blocks carry at most this many input bytes.
pub(crate) const MAX_BLOCK_SIZE: usize = 4 * 1024 * 1024;
/// Block-maximum-size descriptor id for 4 MiB, the only size we emit.
pub(crate) const MAX_BLOCK_SIZE_ID: u8 = 7;

pub use compress::*;
pub use decompress::*;
