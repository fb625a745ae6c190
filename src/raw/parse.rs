use super::{BLOCK_END_LITERALS, JUST_LITERAL, MAX_LENGTH_CODE, MAX_SAME_LETTER, MIN_MATCH};

/// Per-block match table: one `(length, distance)` pair per position.
///
/// Before cost estimation, `lengths[i]` holds the longest match found at
/// position `i` (or 1 for "literal"). After [`estimate_costs`] it holds the
/// emission length the cost model chose; `distances` is never rewritten.
/// Interpreted forward: each position either consumes one literal
/// (`length <= 1`) or skips `length` bytes as a match.
pub struct Matches {
    pub(crate) lengths: Vec<u32>,
    pub(crate) distances: Vec<u16>,
}

impl Matches {
    pub(crate) fn with_len(block_size: usize) -> Self {
        Matches {
            lengths: vec![JUST_LITERAL; block_size],
            distances: vec![0; block_size],
        }
    }

    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }
}

/// Backward dynamic program over one block: rewrite `lengths` so that the
/// forward walk emits the fewest possible encoded bytes.
///
/// `cost[i]` is the number of encoded bytes needed for positions `[i..end)`.
/// Computed right to left; the trailing literal tail is constant cost and
/// stays at zero. At each position the literal option competes against every
/// usable prefix of the found match, both priced with their variable-length
/// token fields.
pub(crate) fn estimate_costs(matches: &mut Matches) {
    let block_end = matches.lengths.len();
    let mut cost = vec![0u32; block_end];

    // the tail is always literals, so the run count starts there
    let mut num_literals = BLOCK_END_LITERALS as u32;

    for i in (0..=block_end - 1 - BLOCK_END_LITERALS).rev() {
        num_literals += 1;
        let mut best_length = JUST_LITERAL;
        let mut min_cost = cost[i + 1] + 1;

        // an extra length byte is due at 15 literals and at every further 255
        if num_literals >= 15 {
            if num_literals == 15
                || (num_literals >= 15 + MAX_LENGTH_CODE
                    && (num_literals - 15) % MAX_LENGTH_CODE == 0)
            {
                min_cost += 1;
            }
        }

        let match_length = matches.lengths[i];
        let match_distance = matches.distances[i];

        if match_length >= MAX_SAME_LETTER && match_distance == 1 {
            // A self-referencing run this long would make the sub-length
            // sweep quadratic in the run length. Take the whole run; the
            // price is token + offset + the length bytes it needs.
            best_length = match_length;
            min_cost = cost[i + match_length as usize] + 1 + 2 + 1 + (match_length - 19) / 255;
        } else {
            // token + offset; grows by one byte at length 19, 19+255, ...
            let mut extra_cost: u32 = 1 + 2;
            let mut next_cost_increase: u32 = 18;

            for length in MIN_MATCH as u32..=match_length {
                let current_cost = cost[i + length as usize] + extra_cost;
                // <= so that equal cost prefers the match: a match breaks a
                // literal run and can save a length byte further back that
                // this sweep has not priced yet
                if current_cost <= min_cost {
                    min_cost = current_cost;
                    best_length = length;
                }
                if length == next_cost_increase {
                    extra_cost += 1;
                    next_cost_increase += MAX_LENGTH_CODE;
                }
            }
        }

        cost[i] = min_cost;
        matches.lengths[i] = best_length;
        if best_length != JUST_LITERAL {
            num_literals = 0;
        }
    }
}
