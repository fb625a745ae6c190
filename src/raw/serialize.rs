use super::{JUST_LITERAL, MAX_LENGTH_CODE, MIN_MATCH};
use super::parse::Matches;

/// Append a length that overflowed its 4-bit token field: bytes of 255 until
/// the remainder fits in one byte (which may be zero).
fn push_overflow(out: &mut Vec<u8>, mut value: u32) {
    while value >= MAX_LENGTH_CODE {
        out.push(MAX_LENGTH_CODE as u8);
        value -= MAX_LENGTH_CODE;
    }
    out.push(value as u8);
}

/// Walk the decided match table forward and emit the LZ4 block byte sequence.
///
/// `block` holds exactly the bytes the table describes. Every sequence is
/// token, literal-length overflow, literals, offset, match-length overflow;
/// the final sequence carries only literals and stops after them.
pub(crate) fn select_best_matches(matches: &Matches, block: &[u8]) -> Vec<u8> {
    let n = matches.len();
    let mut out = Vec::with_capacity(n);

    let mut literals_from = 0;
    let mut num_literals = 0usize;
    let mut last_token = false;

    let mut offset = 0;
    while offset < n {
        let length = matches.lengths[offset];
        let distance = matches.distances[offset];

        if length <= JUST_LITERAL {
            if num_literals == 0 {
                literals_from = offset;
            }
            num_literals += 1;
            offset += 1;
            if offset < n {
                continue;
            }
            last_token = true;
        } else {
            offset += length as usize;
        }

        // 4 is implied by the format; the final token has no match at all
        let match_length = if last_token { 0 } else { length as usize - MIN_MATCH };

        let mut token = if match_length < 15 { match_length as u8 } else { 15 };
        if num_literals < 15 {
            token |= (num_literals as u8) << 4;
            out.push(token);
        } else {
            out.push(token | 0xF0);
            push_overflow(&mut out, num_literals as u32 - 15);
        }

        if num_literals > 0 {
            out.extend_from_slice(&block[literals_from..literals_from + num_literals]);
            if last_token {
                break;
            }
            num_literals = 0;
        }

        out.push((distance & 0xFF) as u8);
        out.push((distance >> 8) as u8);

        if match_length >= 15 {
            push_overflow(&mut out, match_length as u32 - 15);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serialize(lengths: Vec<u32>, distances: Vec<u16>, block: &[u8]) -> Vec<u8> {
        assert_eq!(lengths.len(), block.len());
        let matches = Matches { lengths, distances };
        select_best_matches(&matches, block)
    }

    #[test]
    fn literals_only() {
        let block = b"abc";
        let out = serialize(vec![1, 1, 1], vec![0, 0, 0], block);
        assert_eq!(out, vec![0x30, b'a', b'b', b'c']);
    }

    #[test]
    fn literal_run_of_fifteen_needs_an_overflow_byte() {
        let block = [b'x'; 15];
        let out = serialize(vec![1; 15], vec![0; 15], &block);
        assert_eq!(out[0], 0xF0);
        assert_eq!(out[1], 0); // 15 + 0
        assert_eq!(&out[2..], &block[..]);
    }

    #[test]
    fn match_splits_the_sequence() {
        // "abcdabcd" + 5-byte tail, match of 4 at position 4, distance 4
        let block = b"abcdabcdwxyz!";
        let mut lengths = vec![1u32; block.len()];
        let mut distances = vec![0u16; block.len()];
        lengths[4] = 4;
        distances[4] = 4;
        let out = serialize(lengths, distances, block);
        assert_eq!(
            out,
            vec![0x40, b'a', b'b', b'c', b'd', 4, 0, 0x50, b'w', b'x', b'y', b'z', b'!']
        );
    }

    #[test]
    fn long_match_overflows_the_low_nibble() {
        // literal 'a', then a match of 25 at distance 1, then 5 tail literals
        let mut lengths = vec![1u32; 31];
        let mut distances = vec![0u16; 31];
        lengths[1] = 25;
        distances[1] = 1;
        let block: Vec<u8> = std::iter::repeat(b'a').take(31).collect();
        let out = serialize(lengths, distances, &block);
        // 25 - 4 = 21 = 15 in the token + 6 in the overflow byte
        assert_eq!(out, vec![0x1F, b'a', 1, 0, 6, 0x50, b'a', b'a', b'a', b'a', b'a']);
    }
}
