use byteorder::{ByteOrder, LE};

use super::{END_OF_CHAIN, HASH_BITS, HASH_MULTIPLIER, HASH_SIZE, JUST_LITERAL, MAX_DISTANCE};

/// `last_hash` value for "this hash has never been seen".
const NEVER_SEEN: u64 = u64::MAX;
/// Both chains are physical rings of this many slots, indexed by
/// `position & MAX_DISTANCE`. A slot stays valid exactly as long as its
/// position is within [`MAX_DISTANCE`] of the newest indexed position.
const RING_SIZE: usize = MAX_DISTANCE + 1;

/// 20-bit hash of a 4-byte little-endian load.
#[inline]
fn hash32(four_bytes: u32) -> u32 {
    (four_bytes.wrapping_mul(HASH_MULTIPLIER) >> (32 - HASH_BITS)) & (HASH_SIZE as u32 - 1)
}

#[inline]
fn four_at(data: &[u8], index: usize) -> u32 {
    LE::read_u32(&data[index..])
}

/// True if the four bytes at `a` equal the four bytes at `b`.
#[inline]
fn match4(data: &[u8], a: usize, b: usize) -> bool {
    four_at(data, a) == four_at(data, b)
}

/// The dual-chain match index over the sliding window.
///
/// Two chains cover every indexed position. The coarse chain
/// (`previous_hash`) links positions whose 4-byte prefixes share the same
/// 20-bit hash; it is dense and cheap to extend. The exact chain
/// (`previous_exact`) links positions whose 4-byte prefixes are
/// byte-identical; it is what the match search follows, so hash collisions
/// never cost a re-read during the search itself. Chain entries are
/// distances, so a chain is walked by subtraction.
pub struct ChainIndex {
    /// hash → absolute offset of the newest position with that hash.
    last_hash: Vec<u64>,
    /// Ring: distance to the previous position with the same hash.
    previous_hash: Vec<u16>,
    /// Ring: distance to the previous position with the same four bytes.
    previous_exact: Vec<u16>,
}

impl ChainIndex {
    pub fn new() -> Self {
        ChainIndex {
            last_hash: vec![NEVER_SEEN; HASH_SIZE],
            previous_hash: vec![END_OF_CHAIN; RING_SIZE],
            previous_exact: vec![END_OF_CHAIN; RING_SIZE],
        }
    }

    /// Index the position `pos` and publish both chain entries for it.
    ///
    /// Returns true iff an exact predecessor within range was found, i.e.
    /// a later match search starting at `pos` has at least one candidate.
    pub fn update(&mut self, data: &[u8], data_zero: u64, pos: u64) -> bool {
        let four = four_at(data, (pos - data_zero) as usize);
        let hash = hash32(four);
        let previous = self.last_hash[hash as usize];
        self.last_hash[hash as usize] = pos;

        let slot = pos as usize & MAX_DISTANCE;
        if previous == NEVER_SEEN || pos - previous > MAX_DISTANCE as u64 {
            self.previous_hash[slot] = END_OF_CHAIN;
            self.previous_exact[slot] = END_OF_CHAIN;
            return false;
        }

        let mut distance = (pos - previous) as u32;
        self.previous_hash[slot] = distance as u16;

        // Walk the coarse chain until the four bytes match exactly. Stop if
        // the chain drifts onto an older chain with a different hash, runs
        // past the window, or ends.
        let mut candidate = previous;
        let found = loop {
            // a stale hash entry from before the last trim can sit just
            // below the window when re-indexing block-boundary positions
            if candidate < data_zero {
                break false;
            }
            let candidate_four = four_at(data, (candidate - data_zero) as usize);
            if candidate_four == four {
                break true;
            }
            if hash32(candidate_four) != hash {
                break false;
            }
            let next = self.previous_hash[candidate as usize & MAX_DISTANCE];
            if next == END_OF_CHAIN {
                break false;
            }
            distance += next as u32;
            if distance > MAX_DISTANCE as u32 {
                break false;
            }
            candidate -= next as u64;
        };

        if !found {
            self.previous_exact[slot] = END_OF_CHAIN;
            return false;
        }
        self.previous_exact[slot] = distance as u16;
        true
    }

    /// Find the longest match for `pos` along the exact chain.
    ///
    /// `stop` is the buffer index past which no match may extend (block end
    /// minus the literal tail). Returns `(length, distance)`: `length >= 4`
    /// with `distance` in `[1, MAX_DISTANCE]` for a match, or `(1, 0)` for
    /// "emit a literal". `max_chain_length` caps how many improvements are
    /// accepted before the search stops.
    pub fn longest_match(
        &self,
        data: &[u8],
        data_zero: u64,
        pos: u64,
        stop: usize,
        max_chain_length: u16,
    ) -> (u32, u16) {
        let current = (pos - data_zero) as usize;
        let mut best_length = JUST_LITERAL;
        let mut best_distance = 0u16;
        let mut steps_left = max_chain_length;

        let mut distance = self.previous_exact[pos as usize & MAX_DISTANCE];
        let mut total_distance: u32 = 0;
        while distance != END_OF_CHAIN {
            total_distance += distance as u32;
            if total_distance > MAX_DISTANCE as u32 {
                break;
            }
            distance = self.previous_exact[(pos - total_distance as u64) as usize & MAX_DISTANCE];

            // first byte a longer match would have to contribute
            let at_least = current + best_length as usize + 1;
            if at_least > stop {
                break;
            }

            let back = total_distance as usize;

            // Phase 1: scan backward from at_least towards current, four
            // bytes at a time. Both sequences start with the same four
            // bytes; if they differ at all, the difference is likely near
            // the tail, so probing there rejects hopeless candidates before
            // any forward work. The last iteration may re-compare a few
            // bytes below `current`; a check to avoid that costs more than
            // the duplicate comparison.
            let mut phase1 = at_least as i64 - 4;
            while phase1 > current as i64 && match4(data, phase1 as usize, phase1 as usize - back) {
                phase1 -= 4;
            }
            if phase1 > current as i64 {
                continue;
            }

            // Phase 2: everything up to at_least matches, so this candidate
            // is a new best; extend forward until mismatch or stop.
            let mut phase2 = at_least;
            while phase2 + 4 <= stop && match4(data, phase2, phase2 - back) {
                phase2 += 4;
            }
            while phase2 < stop && data[phase2] == data[phase2 - back] {
                phase2 += 1;
            }

            best_length = (phase2 - current) as u32;
            best_distance = total_distance as u16;

            steps_left -= 1;
            if steps_left == 0 {
                break;
            }
        }

        (best_length, best_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_20_bits() {
        for &x in &[0u32, 1, 0xDEAD_BEEF, u32::MAX, 48_271] {
            assert!(hash32(x) < HASH_SIZE as u32);
        }
    }

    #[test]
    fn exact_chain_skips_collisions() {
        // two positions sharing first four bytes, far enough apart to have
        // other data in between
        let mut data = vec![0u8; 64];
        data[0..6].copy_from_slice(b"abcdef");
        data[40..46].copy_from_slice(b"abcdxy");
        let mut index = ChainIndex::new();
        for pos in 0..=40u64 {
            index.update(&data, 0, pos);
        }
        let (length, distance) = index.longest_match(&data, 0, 40, data.len() - 5, 65_535);
        assert_eq!(distance, 40);
        assert_eq!(length, 4);
    }

    #[test]
    fn no_candidate_means_literal() {
        let data = b"abcdefghijklmnopqrstuvwxyz0123456789".to_vec();
        let mut index = ChainIndex::new();
        for pos in 0..20u64 {
            assert!(!index.update(&data, 0, pos));
        }
    }
}
