use byteorder::{WriteBytesExt, LE};
use fehler::throws;
use std::hash::Hasher;
use std::io::{self, Read, Write};
use twox_hash::XxHash32;

use super::{INCOMPRESSIBLE, MAGIC, MAX_BLOCK_SIZE, MAX_BLOCK_SIZE_ID};
use crate::raw::{BlockEncoder, Window, BLOCK_END_NO_MATCH, MAX_CHAIN_LENGTH};

/// A builder-style struct that configures compression settings.
/// This is how you compress LZ4 frames.
///
/// Create it using `Default::default()`. The default is full optimal
/// parsing; trade compression for speed with [`level`](Self::level) or
/// [`max_chain_length`](Self::max_chain_length).
///
/// Frames are always written with linked blocks, 4 MiB maximum block size
/// and no checksums; verifying integrity is the caller's business.
pub struct CompressionSettings<'a> {
    max_chain_length: u16,
    dictionary: Option<&'a [u8]>,
}

impl<'a> Default for CompressionSettings<'a> {
    fn default() -> Self {
        Self { max_chain_length: MAX_CHAIN_LENGTH, dictionary: None }
    }
}

impl<'a> CompressionSettings<'a> {
    /// How many candidate improvements the match search accepts per position
    /// before giving up.
    ///
    /// 0 disables matching entirely, so every block is stored raw. 1 to 3
    /// parse greedily, 4 to 6 lazily; anything higher runs the full optimal
    /// parse, and 65535 never binds inside a 64 KiB window.
    pub fn max_chain_length(&mut self, v: u16) -> &mut Self {
        self.max_chain_length = v;
        self
    }

    /// The conventional 0–9 compression-level dial, mapped onto
    /// [`max_chain_length`](Self::max_chain_length): 0 stays 0, 1 through 8
    /// map to themselves, 9 and above mean unlimited.
    pub fn level(&mut self, level: u32) -> &mut Self {
        self.max_chain_length = match level {
            0 => 0,
            1..=8 => level as u16,
            _ => MAX_CHAIN_LENGTH,
        };
        self
    }

    /// Share a dictionary with the decompressing side.
    ///
    /// The last 64 KiB of the dictionary become history for the first block,
    /// so early input can be encoded as matches against it. Only the first
    /// block benefits; later blocks reference the stream itself. The frame
    /// does not record that a dictionary was used.
    pub fn dictionary(&mut self, dict: &'a [u8]) -> &mut Self {
        self.dictionary = Some(dict);
        self
    }

    /// Compress `reader` to `writer` as one complete LZ4 frame.
    ///
    /// In-memory use is the slice case: any `&[u8]` reads, any
    /// `&mut Vec<u8>` writes and its length is the cursor.
    #[throws(io::Error)]
    pub fn compress<R: Read, W: Write>(&self, mut reader: R, mut writer: W) {
        // Fixed descriptor: version 1, linked blocks, no checksums, no
        // content size, no dictionary id; 4 MiB max block size. The header
        // checksum is the second byte of XXH32 over the descriptor.
        let mut header = Vec::new();
        header.write_u32::<LE>(MAGIC)?;
        header.write_u8(1 << 6)?;
        header.write_u8(MAX_BLOCK_SIZE_ID << 4)?;
        let mut hasher = XxHash32::with_seed(0);
        hasher.write(&header[4..]); // skip magic for header checksum
        header.write_u8((hasher.finish() >> 8) as u8)?;
        writer.write_all(&header)?;

        let mut window = Window::new();
        let mut dictionary_prefix = 0u64;
        if let Some(dict) = self.dictionary {
            window.install_prefix(dict);
            dictionary_prefix = window.end();
        }

        let mut encoder = BlockEncoder::new(self.max_chain_length);
        let mut first_block = true;
        loop {
            let block_start = window.end();
            let block_size = window.fill_from(&mut reader, MAX_BLOCK_SIZE)?;
            if block_size == 0 {
                break;
            }

            // The first block may look back across the whole dictionary;
            // later blocks only re-index the tail positions the previous
            // block stopped short of.
            let lookback = if first_block {
                dictionary_prefix
            } else {
                window.data_zero().min(BLOCK_END_NO_MATCH as u64)
            };

            let payload = if self.max_chain_length == 0 {
                Vec::new()
            } else {
                encoder.compress_block(&window, block_start, lookback)
            };

            // did compression do harm?
            if !payload.is_empty() && payload.len() < block_size {
                writer.write_u32::<LE>(payload.len() as u32)?;
                writer.write_all(&payload)?;
            } else {
                writer.write_u32::<LE>(block_size as u32 | INCOMPRESSIBLE)?;
                writer.write_all(window.range(block_start, window.end()))?;
            }

            window.retain_recent();
            first_block = false;
        }
        writer.write_u32::<LE>(0)?;
    }
}
