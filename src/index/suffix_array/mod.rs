//! Suffix sorting over encoded sequences
//!
//! ## Architecture
//!
//! - `builder`: Suffix order, prefix bucketing and part-wise sorting
//! - `reader`: Pattern search and the sequential `(suffix, lcp)` reader
//! - `types`: Configuration and part types

pub mod builder;
pub mod reader;
pub mod types;

pub use builder::{compare_suffixes, lcp, recommended_prefix_length, SuffixArray, SuffixSorter};
pub use reader::{compare_prefix, SequentialSuffixReader};
pub use types::*;
