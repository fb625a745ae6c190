#![allow(non_upper_case_globals)]

use bitflags::bitflags;
use fehler::{throw, throws};
use thiserror::Error;

bitflags! {
    pub struct Flags: u8 {
        const IndependentBlocks = 0b00100000;
        const BlockChecksums    = 0b00010000;
        const ContentSize       = 0b00001000;
        const ContentChecksum   = 0b00000100;
        const DictionaryId      = 0b00000001;
    }
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("file version {0} not supported")]
    UnsupportedVersion(u8),
}

impl Flags {
    /// Accept any version-1 flag byte. Unknown and reserved bits are
    /// ignored; the fields they would announce are skipped during decoding
    /// anyway.
    #[throws(ParseError)]
    pub fn parse(i: u8) -> Self {
        let version = i >> 6;
        if version != 1 {
            throw!(ParseError::UnsupportedVersion(version));
        }

        Flags::from_bits_truncate(i)
    }

    pub fn independent_blocks(&self) -> bool { self.contains(Flags::IndependentBlocks) }
    pub fn block_checksums(&self)    -> bool { self.contains(Flags::BlockChecksums) }
    pub fn content_size(&self)       -> bool { self.contains(Flags::ContentSize) }
    pub fn content_checksum(&self)   -> bool { self.contains(Flags::ContentChecksum) }
    pub fn dictionary_id(&self)      -> bool { self.contains(Flags::DictionaryId) }
}
