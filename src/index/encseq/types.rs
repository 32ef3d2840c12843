//! Constants and on-disk types of the encoded-sequence index

use super::alphabet::AlphabetKind;
use crate::utils::{read_u32_le, read_word, write_u32_le, write_word};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Any symbol that is not a regular character
pub const WILDCARD: u8 = 254;

/// Boundary between two sequences
pub const SEPARATOR: u8 = 255;

/// Wildcards and separators never match anything, not even themselves
#[inline]
pub fn is_special(symbol: u8) -> bool {
    symbol >= WILDCARD
}

/// Magic number for encseq.bin
pub const ENCSEQ_MAGIC: u32 = 0x53455153; // "SQES" in little-endian

/// Current version of the index format
pub const ENCSEQ_VERSION: u32 = 1;

pub const META_FILE: &str = "meta.json";
pub const SYMBOLS_FILE: &str = "encseq.bin";
pub const SEPARATORS_FILE: &str = "ssp.bin";

/// Header of encseq.bin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncseqHeader {
    pub magic: u32,
    pub version: u32,
    /// Number of symbols following the header
    pub total_length: u64,
    /// Reserved
    pub flags: u32,
}

impl EncseqHeader {
    /// Size of header in bytes
    pub const SIZE: usize = 4 + 4 + 8 + 4; // 20 bytes

    pub fn new(total_length: u64) -> Self {
        Self {
            magic: ENCSEQ_MAGIC,
            version: ENCSEQ_VERSION,
            total_length,
            flags: 0,
        }
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        write_u32_le(writer, self.magic)?;
        write_u32_le(writer, self.version)?;
        write_word(writer, self.total_length)?;
        write_u32_le(writer, self.flags)
    }

    /// Parse and check the header at the start of `data`
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            bail!("Invalid {}: file too small", SYMBOLS_FILE);
        }
        let mut cursor = &data[..Self::SIZE];
        let header = Self {
            magic: read_u32_le(&mut cursor)?,
            version: read_u32_le(&mut cursor)?,
            total_length: read_word(&mut cursor)?,
            flags: read_u32_le(&mut cursor)?,
        };

        if header.magic != ENCSEQ_MAGIC {
            bail!("Invalid {}: bad magic number", SYMBOLS_FILE);
        }
        if header.version != ENCSEQ_VERSION {
            bail!("Unsupported {} version: {}", SYMBOLS_FILE, header.version);
        }
        Ok(header)
    }
}

/// Index metadata stored in meta.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncseqMeta {
    pub version: u32,
    pub alphabet: AlphabetKind,
    pub total_length: u64,
    pub num_of_sequences: u64,
    /// One per sequence, in order
    pub descriptions: Vec<String>,
}
