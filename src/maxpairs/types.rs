//! Match records and matching configuration

use crate::index::suffix_array::SortConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Exit code used when query and self matching disagree
pub const EXIT_PROGRAMMING_ERROR: i32 = 2;

/// A maximal match between the database and one query sequence.
///
/// Ordered by `queryseqnum`, then `querystart`, `dbstart` and `len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Substringmatch {
    /// Query sequence the match lies in
    pub queryseqnum: usize,
    /// Start relative to the query sequence
    pub querystart: usize,
    /// Start in the database
    pub dbstart: usize,
    pub len: usize,
}

impl fmt::Display for Substringmatch {
    /// `len dbstart queryseqnum querystart`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.len, self.dbstart, self.queryseqnum, self.querystart
        )
    }
}

/// A maximal repeat within an indexed collection, with both occurrences
/// given as sequence number and offset in that sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Repeat {
    pub len: usize,
    pub seqnum1: usize,
    pub start1: usize,
    pub seqnum2: usize,
    pub start2: usize,
}

impl fmt::Display for Repeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.len, self.seqnum1, self.start1, self.seqnum2, self.start2
        )
    }
}

/// Settings of the sampling harness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Number of random samples (default: 100)
    pub samples: usize,
    /// Minimum match length (default: 8)
    pub minlength: usize,
    /// Length of the sampled database and query substrings (default: 1000)
    pub substringlength: usize,
    /// RNG seed; drawn from the OS when unset
    pub seed: Option<u64>,
    /// Show a progress bar on stderr (default: true)
    pub show_progress: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            samples: 100,
            minlength: 8,
            substringlength: 1000,
            seed: None,
            show_progress: true,
        }
    }
}

/// Configuration file contents; command-line flags override it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Minimum match length for `selfmatch` and `query` (default: 20)
    pub minlength: usize,
    pub sort: SortConfig,
    pub validation: ValidationConfig,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            minlength: 20,
            sort: SortConfig::default(),
            validation: ValidationConfig::default(),
        }
    }
}

impl MatchConfig {
    /// Load a JSON configuration file; missing fields keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substringmatch_order() {
        let m = |queryseqnum, querystart, dbstart, len| Substringmatch {
            queryseqnum,
            querystart,
            dbstart,
            len,
        };
        let mut matches = vec![m(1, 0, 0, 5), m(0, 3, 1, 4), m(0, 3, 0, 9), m(0, 3, 0, 4)];
        matches.sort();
        assert_eq!(
            matches,
            vec![m(0, 3, 0, 4), m(0, 3, 0, 9), m(0, 3, 1, 4), m(1, 0, 0, 5)]
        );
        assert_eq!(m(2, 7, 11, 5).to_string(), "5 11 2 7");
    }

    #[test]
    fn test_load_partial_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"minlength": 12, "validation": {{"seed": 7}}}}"#).unwrap();

        let config = MatchConfig::load(file.path()).unwrap();
        assert_eq!(config.minlength, 12);
        assert_eq!(config.validation.seed, Some(7));
        assert_eq!(config.validation.samples, 100);
        assert_eq!(config.sort, SortConfig::default());
    }

    #[test]
    fn test_load_invalid_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "minlength = 3").unwrap();
        let err = MatchConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));

        assert_eq!(MatchConfig::load_or_default(None).unwrap(), MatchConfig::default());
    }
}
