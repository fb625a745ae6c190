use byteorder::{ReadBytesExt, LE};
use fehler::{throw, throws};
use std::io::{self, Cursor, Read};
use thiserror::Error;

use super::header::{self, Flags};
use super::{INCOMPRESSIBLE, MAGIC, WINDOW_SIZE};
use crate::raw::MIN_MATCH;

/// Errors when decompressing an LZ4 frame.
///
/// All of these are fatal: decoding stops and nothing is guaranteed about
/// partial output.
#[derive(Error, Debug)]
pub enum DecompressionError {
    #[error("error reading from the input you gave me")]
    InputError(#[from] io::Error),
    #[error("invalid header")]
    HeaderParseError(#[from] header::ParseError),
    #[error("wrong magic number in file header: {0:08x}")]
    WrongMagic(u32),
    #[error("a compressed block contains a match offset of zero")]
    InvalidOffset,
}
type Error = DecompressionError; // do it this way for better docs

/// The decode history: a 64 KiB ring holding the most recent output.
///
/// Decoded bytes accumulate at `pos`; whenever the write cursor wraps, the
/// full ring is flushed to the output sink. Matches copy from earlier ring
/// positions, which is sound because no backreference reaches further than
/// the ring is long.
struct History {
    ring: Vec<u8>,
    pos: usize,
}

impl History {
    fn new() -> Self {
        History { ring: vec![0; WINDOW_SIZE], pos: 0 }
    }

    /// Preload the tail of a dictionary as initial history.
    ///
    /// It lands at the end of the ring, right where backreferences from the
    /// first decoded bytes wrap around to.
    fn preload(&mut self, dictionary: &[u8]) {
        let tail = dictionary.len().min(WINDOW_SIZE);
        self.ring[WINDOW_SIZE - tail..].copy_from_slice(&dictionary[dictionary.len() - tail..]);
    }

    /// Append plain bytes (literals or a raw block), flushing on wrap.
    fn push_bytes(&mut self, mut src: &[u8], output: &mut Vec<u8>) {
        while !src.is_empty() {
            let room = WINDOW_SIZE - self.pos;
            let take = room.min(src.len());
            self.ring[self.pos..self.pos + take].copy_from_slice(&src[..take]);
            self.pos += take;
            src = &src[take..];
            if self.pos == WINDOW_SIZE {
                output.extend_from_slice(&self.ring);
                self.pos = 0;
            }
        }
    }

    /// Replay `match_length` bytes from `delta` positions back.
    fn copy_match(&mut self, delta: usize, match_length: usize, output: &mut Vec<u8>) {
        let reference = (self.pos + WINDOW_SIZE - delta) % WINDOW_SIZE;

        if self.pos + match_length < WINDOW_SIZE && reference + match_length < WINDOW_SIZE {
            if self.pos >= reference + match_length || reference >= self.pos + match_length {
                // disjoint regions, bulk copy
                self.ring.copy_within(reference..reference + match_length, self.pos);
                self.pos += match_length;
            } else {
                // the copy reads its own output as it goes; this is how LZ4
                // encodes runs (delta 1 replicates the previous byte)
                for i in 0..match_length {
                    self.ring[self.pos] = self.ring[reference + i];
                    self.pos += 1;
                }
            }
        } else {
            // read or write wraps around the ring end, single bytes
            let mut reference = reference;
            for _ in 0..match_length {
                self.ring[self.pos] = self.ring[reference];
                self.pos += 1;
                reference += 1;
                if self.pos == WINDOW_SIZE {
                    output.extend_from_slice(&self.ring);
                    self.pos = 0;
                }
                reference %= WINDOW_SIZE;
            }
        }
    }

    /// Emit whatever the last wrap did not flush.
    fn flush_tail(&self, output: &mut Vec<u8>) {
        output.extend_from_slice(&self.ring[..self.pos]);
    }
}

/// This is how LZ4 encodes varints.
/// Just keep reading and adding while it's all FF.
#[throws(io::Error)]
fn read_lsic(initial: u8, reader: &mut Cursor<&[u8]>) -> u64 {
    let mut value = initial as u64;
    if value == 0xF {
        loop {
            let more = reader.read_u8()?;
            value += more as u64;
            if more != 0xFF {
                break;
            }
        }
    }
    value
}

/// Decode one compressed block payload into the history ring.
#[throws]
fn decode_block(history: &mut History, input: &[u8], output: &mut Vec<u8>) {
    let mut reader = Cursor::new(input);
    while (reader.position() as usize) < input.len() {
        let token = reader.read_u8()?;

        let num_literals = read_lsic(token >> 4, &mut reader)? as usize;
        let literals_at = reader.position() as usize;
        let literals = input
            .get(literals_at..literals_at + num_literals)
            .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))?;
        history.push_bytes(literals, output);
        reader.set_position((literals_at + num_literals) as u64);

        // the final sequence of a block is literals only
        if reader.position() as usize == input.len() {
            break;
        }

        let delta = reader.read_u16::<LE>()? as usize;
        if delta == 0 {
            throw!(Error::InvalidOffset);
        }

        let match_length = MIN_MATCH + read_lsic(token & 0xF, &mut reader)? as usize;
        history.copy_match(delta, match_length, output);
    }
}

/// Read an LZ4-compressed frame.
///
/// Parsing the header happens in [`new`](Self::new);
/// [`decompress_to`](Self::decompress_to) then drains every block into the
/// output. Checksums announced by the header are skipped, never verified.
pub struct FrameDecoder<R: Read> {
    reader: R,
    flags: Flags,
    history: History,
    read_buf: Vec<u8>,
}

impl<R: Read> FrameDecoder<R> {
    #[throws]
    pub fn new(mut reader: R) -> Self {
        let magic = reader.read_u32::<LE>()?;
        if magic != MAGIC {
            throw!(Error::WrongMagic(magic));
        }

        let flags = Flags::parse(reader.read_u8()?)?;

        // everything else in the header only tells us how much to skip:
        // block-maxsize byte, optional content size and dictionary id,
        // and the header checksum byte
        let mut skip = 1 + 1;
        if flags.content_size() {
            skip += 8;
        }
        if flags.dictionary_id() {
            skip += 4;
        }
        let mut scratch = [0u8; 14];
        reader.read_exact(&mut scratch[..skip])?;

        FrameDecoder { reader, flags, history: History::new(), read_buf: Vec::new() }
    }

    /// Use `dictionary` as pre-history for the first block, matching an
    /// encoder that was given the same bytes. Call before decompressing.
    pub fn dictionary(&mut self, dictionary: &[u8]) -> &mut Self {
        self.history.preload(dictionary);
        self
    }

    /// Decode every block and append the plaintext to `output`.
    #[throws]
    pub fn decompress_to(&mut self, output: &mut Vec<u8>) {
        loop {
            let block_length = self.reader.read_u32::<LE>()?;
            let is_compressed = block_length & INCOMPRESSIBLE == 0;
            let payload_length = (block_length & !INCOMPRESSIBLE) as usize;
            if payload_length == 0 {
                break;
            }

            self.read_buf.resize(payload_length, 0);
            self.reader.read_exact(&mut self.read_buf)?;

            if is_compressed {
                decode_block(&mut self.history, &self.read_buf, output)?;
            } else {
                // raw blocks still enter the history; the next block may
                // reference their bytes
                self.history.push_bytes(&self.read_buf, output);
            }

            if self.flags.block_checksums() {
                self.reader.read_u32::<LE>()?;
            }
        }

        if self.flags.content_checksum() {
            self.reader.read_u32::<LE>()?;
        }

        self.history.flush_tail(output);
    }
}

/// Convenience wrapper: decompress a whole frame into a fresh vector.
#[throws]
pub fn decompress_frame<R: Read>(reader: R) -> Vec<u8> {
    let mut output = Vec::new();
    FrameDecoder::new(reader)?.decompress_to(&mut output)?;
    output
}
