//! Randomized agreement check between query mode and self mode.
//!
//! Each sample draws a database substring and a query substring from an
//! encoded sequence, runs both modes and compares the sorted results. A
//! disagreement is a bug in the matching code: the harness prints both
//! result lists and both sequences, then exits the process.

use super::query::sarr_query_substring_match;
use super::selfmatch::sarr_self_substring_match;
use super::types::{Substringmatch, ValidationConfig, EXIT_PROGRAMMING_ERROR};
use crate::index::encseq::{is_special, Alphabet, Encseq, SEPARATOR};
use crate::index::suffix_array::SortConfig;
use crate::output::write_mismatch_report;
use crate::utils::sample_progress;
use anyhow::{bail, Context, Result};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;

/// Sorted results of both modes for one sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleCheck {
    pub querymatches: Vec<Substringmatch>,
    pub selfmatches: Vec<Substringmatch>,
}

impl SampleCheck {
    pub fn agree(&self) -> bool {
        self.querymatches == self.selfmatches
    }
}

/// Outcome of a harness run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationSummary {
    pub samples: usize,
    /// Samples run through both modes
    pub checked: usize,
    /// Samples starting or ending with a separator
    pub skipped: usize,
    /// Matches found over all checked samples
    pub matches: usize,
}

/// Run both modes on one database/query pair and collect sorted results
pub fn check_sample(
    dbseq: &[u8],
    query: &[u8],
    minlength: usize,
    alphabet: &Alphabet,
    config: &SortConfig,
) -> Result<SampleCheck> {
    let mut querymatches = Vec::new();
    sarr_query_substring_match(dbseq, query, minlength, alphabet, config, |m| {
        querymatches.push(m);
        Ok(())
    })
    .context("Query mode matching failed")?;

    let mut selfmatches = Vec::new();
    sarr_self_substring_match(dbseq, query, minlength, alphabet, config, |m| {
        selfmatches.push(m);
        Ok(())
    })
    .context("Self mode matching failed")?;

    querymatches.sort_unstable();
    selfmatches.sort_unstable();
    Ok(SampleCheck {
        querymatches,
        selfmatches,
    })
}

/// Copy up to `substringlength` symbols from a random start.
///
/// With `replace`, every special symbol in the copy becomes a random
/// regular symbol.
pub fn sample_substring<R: Rng>(
    rng: &mut R,
    symbols: &[u8],
    num_of_chars: usize,
    substringlength: usize,
    replace: bool,
) -> Vec<u8> {
    if symbols.is_empty() {
        return Vec::new();
    }
    let start = rng.gen_range(0..symbols.len());
    let end = symbols.len().min(start + substringlength);
    let mut sample = symbols[start..end].to_vec();
    if replace {
        for symbol in sample.iter_mut().filter(|c| is_special(**c)) {
            *symbol = rng.gen_range(0..num_of_chars) as u8;
        }
    }
    sample
}

fn touches_separator(seq: &[u8]) -> bool {
    seq.first() == Some(&SEPARATOR) || seq.last() == Some(&SEPARATOR)
}

/// Check query mode against self mode on random samples of `encseq`.
///
/// Exits the process with [`EXIT_PROGRAMMING_ERROR`] on the first sample
/// where the modes disagree.
pub fn test_maxpairs(
    encseq: &Encseq,
    config: &ValidationConfig,
    sort: &SortConfig,
) -> Result<ValidationSummary> {
    let symbols = encseq.symbols();
    let alphabet = encseq.alphabet();
    let num_of_chars = alphabet.num_of_chars();

    let substringlength = config.substringlength.min(symbols.len() / 2);
    if substringlength == 0 {
        bail!(
            "sequence of length {} is too short to draw samples from",
            symbols.len()
        );
    }

    let seed = config.seed.unwrap_or_else(|| rand::thread_rng().r#gen());
    info!(
        "testing {} samples of length {} with minlength {} (seed {})",
        config.samples, substringlength, config.minlength, seed
    );
    let mut rng = StdRng::seed_from_u64(seed);

    let mut summary = ValidationSummary {
        samples: config.samples,
        ..ValidationSummary::default()
    };
    let progress = sample_progress(config.samples as u64, config.show_progress);

    for _ in 0..config.samples {
        progress.inc(1);
        let dbseq = sample_substring(&mut rng, symbols, num_of_chars, substringlength, false);
        let query = sample_substring(&mut rng, symbols, num_of_chars, substringlength, true);
        if touches_separator(&dbseq) || touches_separator(&query) {
            summary.skipped += 1;
            continue;
        }

        debug!(
            "run query match for dblen={}, querylen={}, minlength={}",
            dbseq.len(),
            query.len(),
            config.minlength
        );
        let check = check_sample(&dbseq, &query, config.minlength, alphabet, sort)?;
        if !check.agree() {
            progress.finish_and_clear();
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            write_mismatch_report(&mut out, &check, &dbseq, &query, alphabet)?;
            out.flush()?;
            std::process::exit(EXIT_PROGRAMMING_ERROR);
        }
        summary.checked += 1;
        summary.matches += check.querymatches.len();
    }

    progress.finish_and_clear();
    info!(
        "{} samples checked, {} skipped, {} matches",
        summary.checked, summary.skipped, summary.matches
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::encseq::{EncseqBuilder, WILDCARD};

    fn random_encseq(rng: &mut StdRng, lengths: &[usize]) -> Encseq {
        let mut builder = EncseqBuilder::new(Alphabet::dna());
        for &len in lengths {
            let seq: Vec<u8> = (0..len).map(|_| rng.gen_range(0..4)).collect();
            builder.add_encoded(&seq);
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_sample_substring_truncates_at_end() {
        let mut rng = StdRng::seed_from_u64(1);
        let symbols = vec![0u8, 1, 2, 3, 0, 1];
        for _ in 0..100 {
            let sample = sample_substring(&mut rng, &symbols, 4, 4, false);
            assert!(!sample.is_empty() && sample.len() <= 4);
            let windows: Vec<&[u8]> = symbols.windows(sample.len()).collect();
            assert!(windows.contains(&sample.as_slice()));
        }
    }

    #[test]
    fn test_sample_substring_replaces_specials() {
        let mut rng = StdRng::seed_from_u64(2);
        let symbols = vec![SEPARATOR, WILDCARD, SEPARATOR, WILDCARD];
        for _ in 0..20 {
            let sample = sample_substring(&mut rng, &symbols, 4, 4, true);
            assert!(sample.iter().all(|&c| c < 4));
            let kept = sample_substring(&mut rng, &symbols, 4, 4, false);
            assert!(kept.iter().all(|&c| is_special(c)));
        }
    }

    #[test]
    fn test_check_sample_agrees() {
        let alphabet = Alphabet::dna();
        let db = alphabet.encode_seq(b"ACGTACGGTACGTTACG");
        let query = alphabet.encode_seq(b"TTACGTACGG");
        let check = check_sample(&db, &query, 3, &alphabet, &SortConfig::default()).unwrap();
        assert!(check.agree());
        assert!(!check.querymatches.is_empty());
    }

    #[test]
    fn test_disagreement_is_reported() {
        let m = Substringmatch {
            queryseqnum: 0,
            querystart: 0,
            dbstart: 0,
            len: 4,
        };
        let check = SampleCheck {
            querymatches: vec![m],
            selfmatches: vec![],
        };
        assert!(!check.agree());
    }

    #[test]
    fn test_harness_on_random_sequences() {
        let mut rng = StdRng::seed_from_u64(3);
        let encseq = random_encseq(&mut rng, &[300, 150, 400]);
        let config = ValidationConfig {
            samples: 40,
            minlength: 4,
            substringlength: 120,
            seed: Some(99),
            show_progress: false,
        };
        let summary = test_maxpairs(&encseq, &config, &SortConfig::default()).unwrap();
        assert_eq!(summary.samples, 40);
        assert_eq!(summary.checked + summary.skipped, 40);
        assert!(summary.checked > 0);
    }

    #[test]
    fn test_harness_is_reproducible() {
        let mut rng = StdRng::seed_from_u64(4);
        let encseq = random_encseq(&mut rng, &[200, 200]);
        let config = ValidationConfig {
            samples: 15,
            minlength: 3,
            substringlength: 50,
            seed: Some(5),
            show_progress: false,
        };
        let first = test_maxpairs(&encseq, &config, &SortConfig::default()).unwrap();
        let second = test_maxpairs(&encseq, &config, &SortConfig::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_harness_rejects_tiny_sequence() {
        let encseq = {
            let mut builder = EncseqBuilder::new(Alphabet::dna());
            builder.add_plain("x", b"A");
            builder.build().unwrap()
        };
        let result = test_maxpairs(&encseq, &ValidationConfig::default(), &SortConfig::default());
        assert!(result.is_err());
    }
}
