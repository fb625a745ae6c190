//! Byte-level checks of the emitted frames: fixed header, block size
//! prefixes, token layout, raw fallback, and the degenerate inputs that
//! exercise each encoder fast path.

use lz_tight::framed::{decompress_frame, CompressionSettings};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::convert::TryInto;

const FRAME_HEADER: [u8; 7] = [0x04, 0x22, 0x4D, 0x18, 0x40, 0x70, 0xDF];

fn compress(input: &[u8], max_chain_length: u16) -> Vec<u8> {
    let mut output = Vec::new();
    CompressionSettings::default()
        .max_chain_length(max_chain_length)
        .compress(input, &mut output)
        .unwrap();
    output
}

#[test]
fn empty_input_is_eleven_bytes() {
    let frame = compress(b"", 65_535);
    let mut expected = FRAME_HEADER.to_vec();
    expected.extend_from_slice(&[0, 0, 0, 0]);
    assert_eq!(frame, expected);
}

#[test]
fn header_is_always_the_same_seven_bytes() {
    for &chain in &[0u16, 3, 65_535] {
        let frame = compress(b"anything at all", chain);
        assert_eq!(&frame[..7], &FRAME_HEADER[..]);
        assert_eq!(&frame[frame.len() - 4..], &[0, 0, 0, 0]);
    }
}

#[test]
fn hello_world_exact_encoding() {
    // "Hello W" at offset 13 is the only usable match; its start includes
    // neither the "!" (different byte) nor anything past the literal tail
    let frame = compress(b"Hello World. Hello World!", 65_535);

    let mut expected = FRAME_HEADER.to_vec();
    expected.extend_from_slice(&22u32.to_le_bytes());
    expected.push(0xD3); // 13 literals, match length 7
    expected.extend_from_slice(b"Hello World. ");
    expected.extend_from_slice(&[0x0D, 0x00]); // offset 13
    expected.push(0x50); // final token: 5 literals
    expected.extend_from_slice(b"orld!");
    expected.extend_from_slice(&[0, 0, 0, 0]);

    assert_eq!(frame, expected);
    assert_eq!(decompress_frame(&frame[..]).unwrap(), b"Hello World. Hello World!");
}

#[test]
fn single_byte_run_self_overlap_encoding() {
    // one literal, then a match that reads its own output at offset 1
    let input = [0x41u8; 1024];
    let frame = compress(&input, 65_535);

    let mut expected = FRAME_HEADER.to_vec();
    expected.extend_from_slice(&14u32.to_le_bytes());
    expected.push(0x1F); // 1 literal, match length >= 19
    expected.push(0x41);
    expected.extend_from_slice(&[0x01, 0x00]); // offset 1
    // match length 1018: code 1014 = 15 (token) + 255*3 + 234
    expected.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0xEA]);
    expected.push(0x50); // final token: 5 literals
    expected.extend_from_slice(&[0x41; 5]);
    expected.extend_from_slice(&[0, 0, 0, 0]);

    assert_eq!(frame, expected);
    assert!(decompress_frame(&frame[..]).unwrap() == input);
}

#[test]
fn long_zero_run_compresses_to_a_tiny_frame() {
    // long enough that the run shortcut carries the match table, at a lazy
    // level so the sub-length sweep never runs over the whole run
    let input = vec![0u8; 200_000];
    let frame = compress(&input, 6);

    assert!(frame.len() < 900, "frame is {} bytes", frame.len());
    // one literal, then a single giant offset-1 match
    assert_eq!(frame[11], 0x1F);
    assert_eq!(frame[12], 0x00);
    assert_eq!(&frame[13..15], &[0x01, 0x00]);
    assert!(decompress_frame(&frame[..]).unwrap() == input);
}

#[test]
fn incompressible_blocks_fall_back_to_raw() {
    // 4 MiB + 96 bytes of seeded noise: one full raw block, one raw tail
    const BLOCK: usize = 4 * 1024 * 1024;
    let mut input = vec![0u8; BLOCK + 96];
    StdRng::seed_from_u64(0xDECAF).fill_bytes(&mut input);

    let frame = compress(&input, 65_535);

    // block 1: size prefix with the high bit set, payload verbatim
    let prefix1 = u32::from_le_bytes([frame[7], frame[8], frame[9], frame[10]]);
    assert_eq!(prefix1, BLOCK as u32 | 0x8000_0000);
    assert_eq!(&frame[11..11 + BLOCK], &input[..BLOCK]);

    // block 2: the 96-byte tail, also raw
    let at = 11 + BLOCK;
    let prefix2 = u32::from_le_bytes([frame[at], frame[at + 1], frame[at + 2], frame[at + 3]]);
    assert_eq!(prefix2, 96u32 | 0x8000_0000);
    assert_eq!(&frame[at + 4..at + 4 + 96], &input[BLOCK..]);

    // sentinel and nothing else
    assert_eq!(&frame[at + 4 + 96..], &[0, 0, 0, 0]);
    assert!(decompress_frame(&frame[..]).unwrap() == input);
}

#[test]
fn level_zero_stores_everything_raw() {
    let input: Vec<u8> = b"so compressible, so compressible".iter().copied().cycle().take(500).collect();
    let mut frame = Vec::new();
    CompressionSettings::default().level(0).compress(&input[..], &mut frame).unwrap();

    let prefix = u32::from_le_bytes([frame[7], frame[8], frame[9], frame[10]]);
    assert_eq!(prefix, 500u32 | 0x8000_0000);
    assert_eq!(frame.len(), 7 + 4 + 500 + 4);
    assert!(decompress_frame(&frame[..]).unwrap() == input);
}

#[test]
fn stream_tail_is_stored_as_literals() {
    // 64 KiB whose first and last eight bytes agree; the final eight fall
    // inside the no-match zone, so they must appear verbatim at the end of
    // the last block, right before the sentinel
    let mut input = vec![0u8; 65_536];
    StdRng::seed_from_u64(0xB0B).fill_bytes(&mut input);
    let head: [u8; 8] = input[..8].try_into().unwrap();
    input[65_528..].copy_from_slice(&head);

    let frame = compress(&input, 65_535);
    let payload_end = frame.len() - 4;
    assert_eq!(&frame[payload_end - 8..payload_end], &head[..]);
    assert!(decompress_frame(&frame[..]).unwrap() == input);
}

#[test]
fn multi_block_roundtrip_with_compressed_blocks() {
    // compressible enough to produce compressed blocks on both sides of the
    // 4 MiB boundary
    let pattern: Vec<u8> = (0u8..=255).collect();
    let input: Vec<u8> =
        pattern.iter().copied().cycle().take(4 * 1024 * 1024 + 1000).collect();
    let frame = compress(&input, 3);
    assert!(frame.len() < input.len() / 100);
    assert!(decompress_frame(&frame[..]).unwrap() == input);
}
