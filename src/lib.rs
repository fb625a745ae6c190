//! LZ4-compatible compression with optimal parsing.
//!
//! Greedy LZ4 encoders take the first match they find. This crate instead
//! indexes every position of the 64 KiB sliding window in two hash chains,
//! then runs a backward dynamic program over each block that weighs every
//! possible match length against plain literals, in units of actual encoded
//! bytes. The output is a normal LZ4 frame that any conformant decoder
//! accepts; it is just smaller than what a greedy encoder would have written.
//!
//! The [`framed`] module is the public surface: [`framed::CompressionSettings`]
//! writes frames, [`framed::FrameDecoder`] reads them back through a 64 KiB
//! ring history. The [`raw`] module holds the per-block machinery (window,
//! chain index, cost engine, serializer) for anyone who wants blocks without
//! the container.

#![forbid(unsafe_code)]

pub mod framed;
pub mod raw;

pub use framed::{decompress_frame, CompressionSettings, DecompressionError, FrameDecoder};
