//! Writes an encoded sequence to an index directory

use super::sequence::Encseq;
use super::types::*;
use anyhow::{Context, Result};
use log::info;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes the files of an encoded-sequence index
pub struct EncseqWriter;

impl EncseqWriter {
    /// Write all index files to `dir`, creating it if needed.
    ///
    /// Creates:
    /// - meta.json: alphabet, lengths and descriptions
    /// - encseq.bin: header followed by the symbols
    /// - ssp.bin: separator positions (only with more than one sequence)
    pub fn write(dir: &Path, encseq: &Encseq) -> Result<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create index directory {}", dir.display()))?;

        Self::write_meta(dir, encseq)?;
        Self::write_symbols(dir, encseq)?;
        Self::write_separators(dir, encseq)?;

        info!(
            "wrote {} sequences ({} symbols) to {}",
            encseq.num_of_sequences(),
            encseq.total_length(),
            dir.display()
        );
        Ok(())
    }

    fn write_meta(dir: &Path, encseq: &Encseq) -> Result<()> {
        let path = dir.join(META_FILE);
        let json = serde_json::to_string_pretty(&encseq.meta())?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", META_FILE))?;
        Ok(())
    }

    fn write_symbols(dir: &Path, encseq: &Encseq) -> Result<()> {
        let path = dir.join(SYMBOLS_FILE);
        let mut file = BufWriter::with_capacity(65536, File::create(&path)?);

        EncseqHeader::new(encseq.total_length() as u64).write(&mut file)?;
        file.write_all(encseq.symbols())?;

        file.flush()?;
        Ok(())
    }

    fn write_separators(dir: &Path, encseq: &Encseq) -> Result<()> {
        let path = dir.join(SEPARATORS_FILE);
        let Some(separators) = encseq.separators() else {
            // A stale table from an earlier index would contradict meta.json
            if path.exists() {
                fs::remove_file(&path)?;
            }
            return Ok(());
        };

        let mut file = BufWriter::with_capacity(65536, File::create(&path)?);
        separators
            .write(&mut file)
            .with_context(|| format!("Failed to write {}", SEPARATORS_FILE))?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::encseq::{Alphabet, EncseqBuilder};
    use tempfile::tempdir;

    #[test]
    fn test_write_index() {
        let temp_dir = tempdir().unwrap();
        let index_dir = temp_dir.path().join("idx");

        let mut builder = EncseqBuilder::new(Alphabet::dna());
        builder.add_plain("a", b"ACGT");
        builder.add_plain("b", b"TT");
        let encseq = builder.build().unwrap();

        EncseqWriter::write(&index_dir, &encseq).unwrap();

        assert!(index_dir.join(META_FILE).exists());
        assert!(index_dir.join(SEPARATORS_FILE).exists());

        let data = fs::read(index_dir.join(SYMBOLS_FILE)).unwrap();
        assert_eq!(data.len(), EncseqHeader::SIZE + 7);
        assert_eq!(&data[..4], b"SQES");
        assert_eq!(&data[EncseqHeader::SIZE..], &[0, 1, 2, 3, SEPARATOR, 3, 3]);

        let meta: EncseqMeta =
            serde_json::from_str(&fs::read_to_string(index_dir.join(META_FILE)).unwrap()).unwrap();
        assert_eq!(meta.num_of_sequences, 2);
        assert_eq!(meta.descriptions, vec!["a", "b"]);
    }

    #[test]
    fn test_single_sequence_skips_separator_file() {
        let temp_dir = tempdir().unwrap();

        let mut builder = EncseqBuilder::new(Alphabet::dna());
        builder.add_plain("only", b"ACGTN");
        EncseqWriter::write(temp_dir.path(), &builder.build().unwrap()).unwrap();

        assert!(!temp_dir.path().join(SEPARATORS_FILE).exists());
    }
}
