//! Symbol alphabets for encoded sequences

use super::types::{SEPARATOR, WILDCARD};
use serde::{Deserialize, Serialize};
use std::fmt;

const DNA_CHARACTERS: &[u8] = b"ACGT";
const PROTEIN_CHARACTERS: &[u8] = b"LVIFKREDAGSTNQYWPHMC";

/// Printed in place of a separator when decoding
pub const SEPARATOR_CHAR: u8 = b'|';

/// Alphabets known to the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AlphabetKind {
    Dna,
    Protein,
}

impl fmt::Display for AlphabetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlphabetKind::Dna => write!(f, "dna"),
            AlphabetKind::Protein => write!(f, "protein"),
        }
    }
}

/// Maps raw characters to symbol codes and back.
///
/// Regular characters get the codes `0..num_of_chars` in alphabet order.
/// Lower case is folded, and every character outside the alphabet becomes
/// [`WILDCARD`].
#[derive(Clone)]
pub struct Alphabet {
    kind: AlphabetKind,
    characters: &'static [u8],
    wildcard: u8,
    symbolmap: [u8; 256],
}

impl Alphabet {
    pub fn new(kind: AlphabetKind) -> Self {
        let (characters, wildcard) = match kind {
            AlphabetKind::Dna => (DNA_CHARACTERS, b'N'),
            AlphabetKind::Protein => (PROTEIN_CHARACTERS, b'X'),
        };

        let mut symbolmap = [WILDCARD; 256];
        for (code, &c) in characters.iter().enumerate() {
            symbolmap[c as usize] = code as u8;
            symbolmap[c.to_ascii_lowercase() as usize] = code as u8;
        }
        if kind == AlphabetKind::Dna {
            // RNA input
            symbolmap[b'U' as usize] = symbolmap[b'T' as usize];
            symbolmap[b'u' as usize] = symbolmap[b'T' as usize];
        }

        Self {
            kind,
            characters,
            wildcard,
            symbolmap,
        }
    }

    pub fn dna() -> Self {
        Self::new(AlphabetKind::Dna)
    }

    pub fn protein() -> Self {
        Self::new(AlphabetKind::Protein)
    }

    pub fn kind(&self) -> AlphabetKind {
        self.kind
    }

    /// Number of regular symbols
    pub fn num_of_chars(&self) -> usize {
        self.characters.len()
    }

    #[inline]
    pub fn encode(&self, c: u8) -> u8 {
        self.symbolmap[c as usize]
    }

    pub fn encode_seq(&self, raw: &[u8]) -> Vec<u8> {
        raw.iter().map(|&c| self.encode(c)).collect()
    }

    /// Printable character for a symbol code
    #[inline]
    pub fn decode(&self, code: u8) -> u8 {
        match code {
            SEPARATOR => SEPARATOR_CHAR,
            _ => self
                .characters
                .get(code as usize)
                .copied()
                .unwrap_or(self.wildcard),
        }
    }

    pub fn decode_seq(&self, codes: &[u8]) -> Vec<u8> {
        codes.iter().map(|&code| self.decode(code)).collect()
    }
}

impl fmt::Debug for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Alphabet")
            .field("kind", &self.kind)
            .field("characters", &String::from_utf8_lossy(self.characters))
            .finish()
    }
}

impl PartialEq for Alphabet {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for Alphabet {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dna_encoding() {
        let dna = Alphabet::dna();
        assert_eq!(dna.num_of_chars(), 4);
        assert_eq!(dna.encode_seq(b"ACGTacgtU"), vec![0, 1, 2, 3, 0, 1, 2, 3, 3]);
        assert_eq!(dna.encode(b'N'), WILDCARD);
        assert_eq!(dna.encode(b'-'), WILDCARD);
    }

    #[test]
    fn test_decoding() {
        let dna = Alphabet::dna();
        assert_eq!(dna.decode_seq(&[0, 3, WILDCARD, SEPARATOR, 2]), b"ATN|G");

        let protein = Alphabet::protein();
        assert_eq!(protein.num_of_chars(), 20);
        assert_eq!(protein.encode(b'm'), 18);
        assert_eq!(protein.decode_seq(&protein.encode_seq(b"MKVB")), b"MKVX");
    }

    #[test]
    fn test_kind_serde() {
        let json = serde_json::to_string(&AlphabetKind::Protein).unwrap();
        assert_eq!(json, "\"protein\"");
        let kind: AlphabetKind = serde_json::from_str("\"dna\"").unwrap();
        assert_eq!(Alphabet::new(kind), Alphabet::dna());
    }
}
