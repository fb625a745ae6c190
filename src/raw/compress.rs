use super::index::ChainIndex;
use super::parse::{estimate_costs, Matches};
use super::serialize::select_best_matches;
use super::window::Window;
use super::{
    BLOCK_END_LITERALS, BLOCK_END_NO_MATCH, JUST_LITERAL, MAX_SAME_LETTER, SHORT_CHAINS_GREEDY,
    SHORT_CHAINS_LAZY,
};

/// Compresses one block at a time against the history in a [`Window`].
///
/// Owns the chain index, which persists across blocks so that matches may
/// reach back into the previous block. `max_chain_length` is the effort knob:
/// 0 finds nothing (the block serializes as pure literals), 1–3 parse
/// greedily, 4–6 add one lazy look-ahead per match, anything above runs the
/// full cost model over every candidate.
pub struct BlockEncoder {
    max_chain_length: u16,
    index: ChainIndex,
}

impl BlockEncoder {
    pub fn new(max_chain_length: u16) -> Self {
        BlockEncoder { max_chain_length, index: ChainIndex::new() }
    }

    pub fn max_chain_length(&self) -> u16 {
        self.max_chain_length
    }

    /// Compress the bytes `[block_start, window.end())` into a serialized
    /// LZ4 block payload.
    ///
    /// `lookback` is how many positions before `block_start` get their chain
    /// entries (re)built before matching begins: the block-end positions the
    /// previous block never indexed, or the whole dictionary prefix for the
    /// first block. The caller decides whether the payload is worth keeping
    /// (it may well be longer than the input for incompressible data).
    pub fn compress_block(&mut self, window: &Window, block_start: u64, lookback: u64) -> Vec<u8> {
        let block_size = (window.end() - block_start) as usize;
        let mut matches = Matches::with_len(block_size);

        if self.max_chain_length > 0 {
            self.populate(&mut matches, window, block_start, lookback);

            if block_size > BLOCK_END_NO_MATCH && self.max_chain_length > SHORT_CHAINS_GREEDY {
                estimate_costs(&mut matches);
            }
        }

        select_best_matches(&matches, window.range(block_start, window.end()))
    }

    /// Fill the match table: index every position, and find the longest
    /// match wherever the parse policy asks for one.
    fn populate(&mut self, matches: &mut Matches, window: &Window, block_start: u64, lookback: u64) {
        let data = window.as_slice();
        let data_zero = window.data_zero();
        let block_size = (window.end() - block_start) as usize;

        let is_greedy = self.max_chain_length <= SHORT_CHAINS_GREEDY;
        let is_lazy = !is_greedy && self.max_chain_length <= SHORT_CHAINS_LAZY;
        // positions still to skip after a greedy/lazy match
        let mut skip_matches: u32 = 0;
        // in lazy mode, the position right after a match is still searched
        let mut lazy_evaluation = false;

        // matches may not extend into the literal tail
        let stop = data.len().saturating_sub(BLOCK_END_LITERALS);

        // block-relative; negative for the lookback prefix
        let mut i = -(lookback as i64);
        let upper = block_size as i64 - BLOCK_END_NO_MATCH as i64;
        while i <= upper {
            let pos = (block_start as i64 + i) as u64;

            // Inside a very long self-referencing run the predecessor's
            // match tells us everything: inherit it one byte shorter rather
            // than walking the chain again.
            if i > 0 {
                let iu = i as usize;
                let local = window.local(pos);
                if data[local] == data[local - 1]
                    && matches.distances[iu - 1] == 1
                    && matches.lengths[iu - 1] > MAX_SAME_LETTER
                {
                    matches.distances[iu] = 1;
                    matches.lengths[iu] = matches.lengths[iu - 1] - 1;
                    i += 1;
                    continue;
                }
            }

            let has_candidate = self.index.update(data, data_zero, pos);

            // lookback positions only feed the index
            if !has_candidate || i < 0 {
                i += 1;
                continue;
            }

            if skip_matches > 0 {
                skip_matches -= 1;
                if !lazy_evaluation {
                    i += 1;
                    continue;
                }
                lazy_evaluation = false;
            }

            let (length, distance) =
                self.index.longest_match(data, data_zero, pos, stop, self.max_chain_length);
            let iu = i as usize;
            matches.lengths[iu] = length;
            matches.distances[iu] = distance;

            if (is_greedy || is_lazy) && length != JUST_LITERAL {
                // resume right past the match: skip length-1 positions, one
                // of which is the lazy probe when in lazy mode
                lazy_evaluation = is_lazy && skip_matches == 0;
                skip_matches = length - 1;
            }

            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window_over(input: &[u8]) -> Window {
        let mut window = Window::new();
        let mut reader = input;
        window.fill_from(&mut reader, input.len()).unwrap();
        window
    }

    #[test]
    fn short_blocks_are_all_literals() {
        let window = window_over(b"abcabc");
        let mut encoder = BlockEncoder::new(65_535);
        let payload = encoder.compress_block(&window, 0, 0);
        // no room for a match before the literal tail
        assert_eq!(payload, vec![0x60, b'a', b'b', b'c', b'a', b'b', b'c']);
    }

    #[test]
    fn repetition_compresses() {
        let input: Vec<u8> = b"0123456789".iter().copied().cycle().take(400).collect();
        let window = window_over(&input);
        let mut encoder = BlockEncoder::new(65_535);
        let payload = encoder.compress_block(&window, 0, 0);
        assert!(payload.len() < input.len() / 4);
    }

    #[test]
    fn chain_cap_zero_finds_nothing() {
        let input = [b'z'; 100];
        let window = window_over(&input);
        let mut encoder = BlockEncoder::new(0);
        let payload = encoder.compress_block(&window, 0, 0);
        // pure literals: token + overflow byte + the input itself
        assert_eq!(payload.len(), input.len() + 2);
        assert_eq!(payload[0], 0xF0);
    }
}
