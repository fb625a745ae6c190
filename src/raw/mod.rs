//! The raw LZ4 block layer: everything between input bytes and one block's
//! serialized payload.
//!
//! A block is compressed in four steps. The [`Window`] maps absolute stream
//! offsets to an owned byte buffer that always retains the last 64 KiB of
//! history. The [`ChainIndex`] publishes, for every position, a chain of
//! earlier positions whose first four bytes are identical, and walks that
//! chain to find the longest match. The cost engine then sweeps the block
//! backwards and decides per position whether a literal or some prefix of the
//! found match yields the fewest encoded bytes. Finally the serializer walks
//! the decisions forward and emits the LZ4 block byte sequence.
//!
//! None of this knows about frames; the `framed` module owns the container.

mod compress;
mod index;
mod parse;
mod serialize;
mod window;

pub use compress::BlockEncoder;
pub use index::ChainIndex;
pub use parse::Matches;
pub use window::Window;

/// Matches shorter than this cannot be encoded.
pub const MIN_MATCH: usize = 4;
/// Emission length of a plain literal in the match table.
pub(crate) const JUST_LITERAL: u32 = 1;
/// No match may start closer than this to the end of a block.
pub(crate) const BLOCK_END_NO_MATCH: usize = 12;
/// The last bytes of every block are always emitted as literals.
pub(crate) const BLOCK_END_LITERALS: usize = 5;
/// Backreferences reach at most this far; also the chain ring size minus one.
pub const MAX_DISTANCE: usize = 65_535;
/// Chain entry meaning "no earlier occurrence in range".
pub(crate) const END_OF_CHAIN: u16 = 0;
/// Chain cap that never binds within a 64 KiB window, i.e. optimal parsing.
pub const MAX_CHAIN_LENGTH: u16 = 65_535;
/// Run-of-same-byte length beyond which the cost engine stops trying
/// sub-lengths and takes the whole run.
pub(crate) const MAX_SAME_LETTER: u32 = 19 + 255 * 256;
/// Literal and match lengths are extended in bytes of at most this value.
pub(crate) const MAX_LENGTH_CODE: u32 = 255;

pub(crate) const HASH_BITS: u32 = 20;
pub(crate) const HASH_SIZE: usize = 1 << HASH_BITS;
/// Park-Miller multiplier; the top [`HASH_BITS`] bits of the product spread
/// four input bytes over the table.
pub(crate) const HASH_MULTIPLIER: u32 = 48_271;

/// Chain cap up to which the encoder parses greedily instead of optimally.
pub(crate) const SHORT_CHAINS_GREEDY: u16 = 3;
/// Chain cap up to which the encoder adds one lazy look-ahead per match.
pub(crate) const SHORT_CHAINS_LAZY: u16 = 6;
