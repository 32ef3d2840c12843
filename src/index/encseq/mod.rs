//! Encoded sequences and their on-disk index.
//!
//! ## File Format
//!
//! An index directory holds:
//! - `meta.json`: alphabet, total length, sequence count and descriptions
//! - `encseq.bin`: a 20-byte header followed by one byte per symbol
//! - `ssp.bin`: separator positions as a persisted Intset

pub mod alphabet;
pub mod builder;
pub mod reader;
pub mod sequence;
pub mod types;
pub mod writer;

pub use alphabet::{Alphabet, AlphabetKind};
pub use builder::EncseqBuilder;
pub use sequence::Encseq;
pub use types::*;
pub use writer::EncseqWriter;
