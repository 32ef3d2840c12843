//! # seqmatch - Maximal substring matching over encoded sequences
//!
//! seqmatch encodes sequence collections into a compact on-disk index and
//! reports maximal matches, either between a query and the index or as
//! repeats within the index.
//!
//! ## Architecture
//!
//! The crate is organized into these main modules:
//!
//! - [`index`] - Integer sets, encoded sequences and suffix sorting
//! - [`maxpairs`] - Maximal-pair enumeration, query and self matching
//! - [`output`] - Match listings and mismatch reports
//! - [`utils`] - Utility functions (word I/O, progress bars)
//!
//! ## Quick Start
//!
//! ```ignore
//! use seqmatch::index::encseq::Alphabet;
//! use seqmatch::index::suffix_array::SortConfig;
//! use seqmatch::maxpairs::sarr_query_substring_match;
//!
//! let alphabet = Alphabet::dna();
//! let db = alphabet.encode_seq(b"TTACGTAC");
//! let query = alphabet.encode_seq(b"GACGTAG");
//!
//! sarr_query_substring_match(&db, &query, 4, &alphabet, &SortConfig::default(), |m| {
//!     println!("{}", m);
//!     Ok(())
//! })?;
//! ```
//!
//! ## Separator sets
//!
//! Separator positions are stored in an [`index::intset::AnyIntset`]: only
//! the low-order bits of each position are kept, next to a table of section
//! starts indexed by the high-order bits.

pub mod index;
pub mod maxpairs;
pub mod output;
pub mod utils;
