//! Types for suffix sorting

use serde::{Deserialize, Serialize};

/// Longest prefix used to bucket suffixes
pub const MAX_PREFIX_LENGTH: usize = 16;

/// Upper bound on the number of buckets, whatever the prefix length
pub const MAX_BUCKETS: u64 = 1 << 24;

/// Default ratio of buckets to sequence length for the prefix heuristic
pub const RECOMMENDED_MULTIPLIER: f64 = 0.25;

/// Configuration for suffix sorting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortConfig {
    /// Number of parts the regular suffixes are delivered in (default: 1)
    pub numofparts: usize,
    /// Bucket prefix length; chosen from the sequence length when unset
    pub prefixlength: Option<usize>,
    /// Buckets per symbol allowed by the prefix heuristic (default: 0.25)
    pub multiplier: f64,
    /// Parts with at least this many suffixes sort their buckets in
    /// parallel (default: 100k)
    pub parallel_threshold: usize,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            numofparts: 1,
            prefixlength: None,
            multiplier: RECOMMENDED_MULTIPLIER,
            parallel_threshold: 100_000,
        }
    }
}

/// One batch of sorted suffixes handed out by the sorter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixPart {
    /// Suffix start positions in suffix order
    pub suffixes: Vec<usize>,
    /// Set for the final part, the suffixes starting with a special symbol
    pub special: bool,
}

/// A suffix together with the length of its longest common prefix with
/// the suffix before it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LcpEntry {
    pub suffix: usize,
    pub lcp: usize,
}
