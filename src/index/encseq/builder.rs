//! Builds an [`Encseq`] from raw, pre-encoded or FASTA input.
//!
//! Every added sequence is appended to one symbol buffer; a separator is
//! inserted between consecutive sequences.

use super::alphabet::Alphabet;
use super::sequence::{Encseq, Symbols};
use super::types::SEPARATOR;
use crate::index::intset::AnyIntset;
use anyhow::{bail, Context, Result};
use bio::io::fasta::Reader as FastaReader;
use log::debug;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub struct EncseqBuilder {
    alphabet: Alphabet,
    symbols: Vec<u8>,
    descriptions: Vec<String>,
}

impl EncseqBuilder {
    pub fn new(alphabet: Alphabet) -> Self {
        Self {
            alphabet,
            symbols: Vec::new(),
            descriptions: Vec::new(),
        }
    }

    /// Append one already encoded sequence
    pub fn add_encoded(&mut self, symbols: &[u8]) {
        self.add_encoded_with_description(symbols, String::new());
    }

    pub fn add_encoded_with_description(&mut self, symbols: &[u8], description: String) {
        self.push_separator();
        self.symbols.extend_from_slice(symbols);
        self.descriptions.push(description);
    }

    /// Append encoded symbols that may already contain separators; each
    /// separator-delimited piece counts as its own sequence
    pub fn add_multiple_encoded(&mut self, symbols: &[u8]) {
        self.push_separator();
        self.symbols.extend_from_slice(symbols);
        let count = memchr::memchr_iter(SEPARATOR, symbols).count() + 1;
        self.descriptions
            .extend(std::iter::repeat_n(String::new(), count));
    }

    /// Encode `raw` with the builder's alphabet and append it
    pub fn add_plain(&mut self, description: &str, raw: &[u8]) {
        let encoded = self.alphabet.encode_seq(raw);
        self.add_encoded_with_description(&encoded, description.to_string());
    }

    /// Append every record of a FASTA file, returning how many were read
    pub fn add_fasta(&mut self, path: &Path) -> Result<usize> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let reader = FastaReader::new(BufReader::new(file));

        let mut count = 0;
        for record in reader.records() {
            let record =
                record.with_context(|| format!("Failed to read FASTA record from {}", path.display()))?;
            let description = match record.desc() {
                Some(desc) => format!("{} {}", record.id(), desc),
                None => record.id().to_string(),
            };
            self.add_plain(&description, record.seq());
            count += 1;
        }
        if count == 0 {
            bail!("{} contains no FASTA records", path.display());
        }

        debug!("read {} sequences from {}", count, path.display());
        Ok(count)
    }

    /// Number of symbols added so far, separators included
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn build(self) -> Result<Encseq> {
        if self.symbols.is_empty() {
            bail!("cannot build an empty encoded sequence");
        }

        let positions: Vec<u64> = memchr::memchr_iter(SEPARATOR, &self.symbols)
            .map(|pos| pos as u64)
            .collect();
        let separators = if positions.is_empty() {
            None
        } else {
            let maxelement = (self.symbols.len() - 1) as u64;
            let set = AnyIntset::from_sorted(maxelement, &positions)
                .context("Failed to build separator table")?;
            debug!(
                "stored {} separators as {} intset ({} bytes)",
                positions.len(),
                set.width(),
                set.size_of_struct()
            );
            Some(set)
        };

        Ok(Encseq::from_parts(
            self.alphabet,
            Symbols::Owned(self.symbols),
            self.descriptions,
            separators,
        ))
    }

    fn push_separator(&mut self) {
        if !self.descriptions.is_empty() {
            self.symbols.push(SEPARATOR);
        }
    }
}
