use super::alphabet::Alphabet;
use super::types::{is_special, EncseqMeta, ENCSEQ_VERSION, SEPARATOR};
use crate::index::intset::AnyIntset;
use anyhow::{bail, Result};
use memmap2::Mmap;
use std::ops::Deref;

/// Symbol buffer, either built in memory or mapped from encseq.bin
pub(super) enum Symbols {
    Owned(Vec<u8>),
    Mapped { mmap: Mmap, offset: usize },
}

impl Deref for Symbols {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Symbols::Owned(symbols) => symbols,
            Symbols::Mapped { mmap, offset } => &mmap[*offset..],
        }
    }
}

/// A collection of sequences encoded over one alphabet and stored as a
/// single buffer, with [`SEPARATOR`] between consecutive sequences.
///
/// Separator positions are kept in an [`AnyIntset`], which answers the
/// "which sequence contains position p" question without scanning.
pub struct Encseq {
    alphabet: Alphabet,
    symbols: Symbols,
    descriptions: Vec<String>,
    separators: Option<AnyIntset>,
}

impl Encseq {
    pub(super) fn from_parts(
        alphabet: Alphabet,
        symbols: Symbols,
        descriptions: Vec<String>,
        separators: Option<AnyIntset>,
    ) -> Self {
        Self {
            alphabet,
            symbols,
            descriptions,
            separators,
        }
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// All symbols, separators included
    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    pub fn total_length(&self) -> usize {
        self.symbols.len()
    }

    /// Symbol at `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos >= total_length()`.
    #[inline]
    pub fn get_encoded_char(&self, pos: usize) -> u8 {
        self.symbols[pos]
    }

    /// Symbols `start..=end`, or `None` if the range leaves the sequence
    pub fn extract_encoded(&self, start: usize, end: usize) -> Option<&[u8]> {
        if start > end {
            return None;
        }
        self.symbols.get(start..=end)
    }

    pub fn num_of_sequences(&self) -> usize {
        self.separators.as_ref().map_or(0, |set| set.size()) + 1
    }

    /// Separator positions in increasing order
    pub fn separator_positions(&self) -> Vec<usize> {
        self.separators
            .as_ref()
            .map(|set| set.iter().map(|pos| pos as usize).collect())
            .unwrap_or_default()
    }

    pub fn separators(&self) -> Option<&AnyIntset> {
        self.separators.as_ref()
    }

    /// Number of the sequence containing `pos`.
    ///
    /// A separator counts towards the sequence it ends.
    pub fn seqnum(&self, pos: usize) -> Option<usize> {
        if pos >= self.total_length() {
            return None;
        }
        Some(
            self.separators
                .as_ref()
                .map_or(0, |set| set.get_idx_smallest_geq(pos as u64)),
        )
    }

    /// Position of the first symbol of sequence `seqnum`
    pub fn seqstartpos(&self, seqnum: usize) -> Option<usize> {
        if seqnum >= self.num_of_sequences() {
            return None;
        }
        if seqnum == 0 {
            return Some(0);
        }
        let separators = self.separators.as_ref()?;
        let previous = separators.get(seqnum - 1).ok()?;
        Some(previous as usize + 1)
    }

    pub fn seqlength(&self, seqnum: usize) -> Option<usize> {
        let start = self.seqstartpos(seqnum)?;
        let end = match self.separators.as_ref() {
            Some(set) if seqnum < set.size() => set.get(seqnum).ok()? as usize,
            _ => self.total_length(),
        };
        Some(end - start)
    }

    /// Encoded symbols of sequence `seqnum`, without its separator
    pub fn sequence(&self, seqnum: usize) -> Option<&[u8]> {
        let start = self.seqstartpos(seqnum)?;
        let len = self.seqlength(seqnum)?;
        self.symbols.get(start..start + len)
    }

    pub fn description(&self, seqnum: usize) -> Option<&str> {
        self.descriptions.get(seqnum).map(String::as_str)
    }

    pub fn descriptions(&self) -> &[String] {
        &self.descriptions
    }

    pub fn meta(&self) -> EncseqMeta {
        EncseqMeta {
            version: ENCSEQ_VERSION,
            alphabet: self.alphabet.kind(),
            total_length: self.total_length() as u64,
            num_of_sequences: self.num_of_sequences() as u64,
            descriptions: self.descriptions.clone(),
        }
    }

    /// Full consistency check: every symbol is valid and the stored
    /// separator set matches the separators in the buffer
    pub fn check(&self) -> Result<()> {
        let num_of_chars = self.alphabet.num_of_chars();
        if let Some(pos) = self
            .symbols
            .iter()
            .position(|&c| !is_special(c) && c as usize >= num_of_chars)
        {
            bail!(
                "symbol {} at position {} is outside the {} alphabet",
                self.symbols[pos],
                pos,
                self.alphabet.kind()
            );
        }

        let found: Vec<usize> = memchr::memchr_iter(SEPARATOR, &self.symbols).collect();
        if found != self.separator_positions() {
            bail!(
                "separator table lists {} positions, the sequence has {}",
                self.num_of_sequences() - 1,
                found.len()
            );
        }
        if let Some(set) = self.separators.as_ref() {
            set.validate()?;
        }
        if self.descriptions.len() != self.num_of_sequences() {
            bail!(
                "{} descriptions for {} sequences",
                self.descriptions.len(),
                self.num_of_sequences()
            );
        }
        Ok(())
    }
}

impl std::fmt::Debug for Encseq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Encseq")
            .field("alphabet", &self.alphabet.kind())
            .field("total_length", &self.total_length())
            .field("num_of_sequences", &self.num_of_sequences())
            .finish()
    }
}
