//! Index structures for encoded sequence collections
//!
//! - [`intset`] - Section-indexed integer sets for sorted positions
//! - [`encseq`] - Encoded sequences and their on-disk index directory
//! - [`suffix_array`] - Suffix sorting, pattern search and lcp streaming
//! - [`stats`] - Index statistics

pub mod encseq;
pub mod intset;
pub mod stats;
pub mod suffix_array;
