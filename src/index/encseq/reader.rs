//! Opens an encoded-sequence index with the symbols memory-mapped

use super::alphabet::Alphabet;
use super::sequence::{Encseq, Symbols};
use super::types::*;
use crate::index::intset::AnyIntset;
use anyhow::{bail, Context, Result};
use log::debug;
use memmap2::Mmap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

impl Encseq {
    /// Open the index written to `dir` by [`super::EncseqWriter`]
    pub fn open(dir: &Path) -> Result<Self> {
        let meta = Self::read_meta(dir)?;

        let symbols_path = dir.join(SYMBOLS_FILE);
        let file = File::open(&symbols_path)
            .with_context(|| format!("Failed to open {}", symbols_path.display()))?;
        let mmap = unsafe { Mmap::map(&file)? };

        let header = EncseqHeader::parse(&mmap)?;
        if header.total_length != meta.total_length {
            bail!(
                "{} holds {} symbols but {} records {}",
                SYMBOLS_FILE,
                header.total_length,
                META_FILE,
                meta.total_length
            );
        }
        let stored = (mmap.len() - EncseqHeader::SIZE) as u64;
        if stored != header.total_length {
            bail!(
                "Truncated {}: expected {} symbols, found {}",
                SYMBOLS_FILE,
                header.total_length,
                stored
            );
        }
        if header.total_length == 0 {
            bail!("Invalid {}: no symbols", SYMBOLS_FILE);
        }

        let separators = Self::read_separators(dir, meta.num_of_sequences)?;
        if meta.descriptions.len() as u64 != meta.num_of_sequences {
            bail!(
                "{} lists {} descriptions for {} sequences",
                META_FILE,
                meta.descriptions.len(),
                meta.num_of_sequences
            );
        }

        debug!(
            "opened {} ({} symbols, {} sequences)",
            dir.display(),
            meta.total_length,
            meta.num_of_sequences
        );

        Ok(Encseq::from_parts(
            Alphabet::new(meta.alphabet),
            Symbols::Mapped {
                mmap,
                offset: EncseqHeader::SIZE,
            },
            meta.descriptions,
            separators,
        ))
    }

    /// Read meta.json of an index directory
    pub fn read_meta(dir: &Path) -> Result<EncseqMeta> {
        let path = dir.join(META_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let meta: EncseqMeta = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        if meta.version != ENCSEQ_VERSION {
            bail!("Unsupported index version: {}", meta.version);
        }
        Ok(meta)
    }

    fn read_separators(dir: &Path, num_of_sequences: u64) -> Result<Option<AnyIntset>> {
        if num_of_sequences <= 1 {
            return Ok(None);
        }

        let path = dir.join(SEPARATORS_FILE);
        let file = File::open(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let set = AnyIntset::read(&mut BufReader::new(file))
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if set.size() as u64 != num_of_sequences - 1 {
            bail!(
                "{} holds {} separators for {} sequences",
                SEPARATORS_FILE,
                set.size(),
                num_of_sequences
            );
        }
        Ok(Some(set))
    }
}
