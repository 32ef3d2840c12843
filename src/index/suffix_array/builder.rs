//! Suffix sorting
//!
//! Suffixes are bucketed by the code of their first `prefixlength` symbols
//! with a counting sort, then each bucket is sorted by comparing suffixes
//! directly. Buckets are handed out in parts so a consumer can start before
//! the whole array is sorted.
//!
//! Suffix order: regular symbols compare by code and every special symbol
//! is larger than every regular one. Two specials compare by position, and
//! the end of the sequence behaves like a special at position `len`. So no
//! two distinct suffixes are equal and a common prefix never extends over
//! a special symbol.

use super::types::*;
use crate::index::encseq::is_special;
use anyhow::{bail, Result};
use log::debug;
use rayon::prelude::*;
use std::cmp::Ordering;

/// Compare the suffixes starting at `a` and `b`.
///
/// The scan goes symbol by symbol up to the first difference, so a bucket of
/// low-complexity text such as a long poly-A run costs time quadratic in the
/// run length.
#[inline]
pub fn compare_suffixes(symbols: &[u8], a: usize, b: usize) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }

    let mut i = a;
    let mut j = b;
    loop {
        let ca = symbols.get(i).copied().filter(|&c| !is_special(c));
        let cb = symbols.get(j).copied().filter(|&c| !is_special(c));
        match (ca, cb) {
            (Some(x), Some(y)) if x != y => return x.cmp(&y),
            (Some(_), Some(_)) => {}
            (Some(_), None) => return Ordering::Less,
            (None, Some(_)) => return Ordering::Greater,
            // Both special or past the end
            (None, None) => return i.cmp(&j),
        }
        i += 1;
        j += 1;
    }
}

/// Length of the longest common prefix of two suffixes, counting only
/// regular symbols
#[inline]
pub fn lcp(symbols: &[u8], a: usize, b: usize) -> usize {
    if a >= symbols.len() || b >= symbols.len() {
        return 0;
    }
    symbols[a..]
        .iter()
        .zip(&symbols[b..])
        .take_while(|&(&x, &y)| x == y && !is_special(x))
        .count()
}

/// Largest prefix length `k >= 1` with `(num_of_chars + 1)^k` buckets not
/// exceeding `total_length * multiplier`.
///
/// Only affects how the work is bucketed, never the result.
pub fn recommended_prefix_length(num_of_chars: usize, total_length: usize, multiplier: f64) -> usize {
    let base = num_of_chars as u64 + 1;
    let limit = (total_length as f64 * multiplier).min(MAX_BUCKETS as f64) as u64;

    let mut prefixlength = 1;
    let mut buckets = base;
    while prefixlength < MAX_PREFIX_LENGTH {
        match buckets.checked_mul(base) {
            Some(next) if next <= limit => {
                buckets = next;
                prefixlength += 1;
            }
            _ => break,
        }
    }
    prefixlength
}

/// Clamp a requested prefix length to what the bucket table allows
fn fit_prefix_length(base: u64, requested: usize) -> usize {
    let mut prefixlength = requested.clamp(1, MAX_PREFIX_LENGTH);
    while prefixlength > 1 {
        match base.checked_pow(prefixlength as u32) {
            Some(buckets) if buckets <= MAX_BUCKETS => break,
            _ => prefixlength -= 1,
        }
    }
    prefixlength
}

/// Code of the first `prefixlength` symbols of the suffix at `pos`, in base
/// `num_of_chars + 1`. A special symbol or the end contributes the digit
/// `num_of_chars`; every digit after it is 0.
fn bucket_code(symbols: &[u8], pos: usize, prefixlength: usize, num_of_chars: usize) -> usize {
    let base = num_of_chars + 1;
    let mut code = 0;
    let mut ended = false;
    for offset in 0..prefixlength {
        let digit = if ended {
            0
        } else {
            match symbols.get(pos + offset) {
                Some(&c) if !is_special(c) => c as usize,
                _ => {
                    ended = true;
                    num_of_chars
                }
            }
        };
        code = code * base + digit;
    }
    code
}

/// Delivers the suffix array of a symbol buffer part by part.
///
/// The regular parts come first, in suffix order. The final part holds the
/// suffixes that start with a special symbol and is flagged `special`.
pub struct SuffixSorter<'a> {
    symbols: &'a [u8],
    parallel_threshold: usize,
    prefixlength: usize,
    /// Suffix positions grouped by bucket, unsorted within a bucket
    bucketed: Vec<usize>,
    /// Bucket `b` occupies `bucketed[bucketstart[b]..bucketstart[b + 1]]`
    bucketstart: Vec<usize>,
    /// Bucket ranges of the regular parts
    partbounds: Vec<usize>,
    /// First bucket whose suffixes start with a special symbol
    specialbucket: usize,
    nextpart: usize,
    special_done: bool,
}

impl<'a> SuffixSorter<'a> {
    pub fn new(symbols: &'a [u8], num_of_chars: usize, config: &SortConfig) -> Result<Self> {
        if num_of_chars == 0 || num_of_chars >= WILDCARD_CODE {
            bail!("alphabet size {} is not supported", num_of_chars);
        }
        if let Some(pos) = symbols
            .iter()
            .position(|&c| !is_special(c) && c as usize >= num_of_chars)
        {
            bail!(
                "symbol {} at position {} exceeds alphabet size {}",
                symbols[pos],
                pos,
                num_of_chars
            );
        }

        let base = num_of_chars as u64 + 1;
        let requested = config.prefixlength.unwrap_or_else(|| {
            recommended_prefix_length(num_of_chars, symbols.len(), config.multiplier)
        });
        let prefixlength = fit_prefix_length(base, requested);
        let num_buckets = (num_of_chars + 1).pow(prefixlength as u32);
        let specialbucket = num_of_chars * (num_buckets / (num_of_chars + 1));

        let codes: Vec<usize> = if symbols.len() >= config.parallel_threshold {
            (0..symbols.len())
                .into_par_iter()
                .map(|pos| bucket_code(symbols, pos, prefixlength, num_of_chars))
                .collect()
        } else {
            (0..symbols.len())
                .map(|pos| bucket_code(symbols, pos, prefixlength, num_of_chars))
                .collect()
        };

        // Counting sort by bucket code
        let mut bucketstart = vec![0usize; num_buckets + 1];
        for &code in &codes {
            bucketstart[code + 1] += 1;
        }
        for bucket in 0..num_buckets {
            bucketstart[bucket + 1] += bucketstart[bucket];
        }
        let mut fill = bucketstart.clone();
        let mut bucketed = vec![0usize; symbols.len()];
        for (pos, &code) in codes.iter().enumerate() {
            bucketed[fill[code]] = pos;
            fill[code] += 1;
        }

        let numofparts = config.numofparts.max(1);
        let regular = bucketstart[specialbucket];
        let target = regular.div_ceil(numofparts).max(1);
        let mut partbounds = vec![0];
        let mut limit = target;
        for bucket in 0..specialbucket {
            if bucketstart[bucket + 1] >= limit && partbounds.len() < numofparts {
                partbounds.push(bucket + 1);
                limit = bucketstart[bucket + 1] + target;
            }
        }
        if partbounds.last() != Some(&specialbucket) {
            partbounds.push(specialbucket);
        }

        debug!(
            "bucketed {} suffixes: prefixlength={}, buckets={}, parts={}",
            symbols.len(),
            prefixlength,
            num_buckets,
            partbounds.len() - 1
        );

        Ok(Self {
            symbols,
            parallel_threshold: config.parallel_threshold,
            prefixlength,
            bucketed,
            bucketstart,
            partbounds,
            specialbucket,
            nextpart: 0,
            special_done: false,
        })
    }

    pub fn prefixlength(&self) -> usize {
        self.prefixlength
    }

    /// Number of regular parts
    pub fn numofparts(&self) -> usize {
        self.partbounds.len() - 1
    }

    /// Sort and return the next part, `None` after the special part
    pub fn next_part(&mut self) -> Option<SuffixPart> {
        if self.nextpart + 1 < self.partbounds.len() {
            let lo = self.partbounds[self.nextpart];
            let hi = self.partbounds[self.nextpart + 1];
            self.nextpart += 1;
            return Some(SuffixPart {
                suffixes: self.sort_buckets(lo, hi),
                special: false,
            });
        }
        if self.special_done {
            return None;
        }
        self.special_done = true;
        let num_buckets = self.bucketstart.len() - 1;
        Some(SuffixPart {
            suffixes: self.sort_buckets(self.specialbucket, num_buckets),
            special: true,
        })
    }

    /// Suffixes of buckets `lo..hi`, each bucket sorted
    fn sort_buckets(&self, lo: usize, hi: usize) -> Vec<usize> {
        let symbols = self.symbols;
        let mut part = self.bucketed[self.bucketstart[lo]..self.bucketstart[hi]].to_vec();
        let parallel = part.len() >= self.parallel_threshold;

        let mut buckets: Vec<&mut [usize]> = Vec::new();
        let mut rest: &mut [usize] = &mut part;
        for bucket in lo..hi {
            let size = self.bucketstart[bucket + 1] - self.bucketstart[bucket];
            if size == 0 {
                continue;
            }
            let (current, tail) = std::mem::take(&mut rest).split_at_mut(size);
            if size > 1 {
                buckets.push(current);
            }
            rest = tail;
        }

        if parallel {
            buckets.into_par_iter().for_each(|bucket| {
                bucket.sort_unstable_by(|&a, &b| compare_suffixes(symbols, a, b))
            });
        } else {
            for bucket in buckets {
                bucket.sort_unstable_by(|&a, &b| compare_suffixes(symbols, a, b));
            }
        }

        part
    }
}

impl Iterator for SuffixSorter<'_> {
    type Item = SuffixPart;

    fn next(&mut self) -> Option<SuffixPart> {
        self.next_part()
    }
}

/// Codes from here on are special symbols
const WILDCARD_CODE: usize = crate::index::encseq::WILDCARD as usize;

/// Complete suffix array of a symbol buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixArray {
    pub(super) suffixes: Vec<usize>,
}

impl SuffixArray {
    /// Sort every suffix of `symbols`, specials included
    pub fn build(symbols: &[u8], num_of_chars: usize, config: &SortConfig) -> Result<Self> {
        let sorter = SuffixSorter::new(symbols, num_of_chars, config)?;
        let mut suffixes = Vec::with_capacity(symbols.len());
        for part in sorter {
            suffixes.extend_from_slice(&part.suffixes);
        }
        Ok(Self { suffixes })
    }

    pub fn suffixes(&self) -> &[usize] {
        &self.suffixes
    }

    pub fn len(&self) -> usize {
        self.suffixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::encseq::{SEPARATOR, WILDCARD};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_symbols(rng: &mut StdRng, len: usize, num_of_chars: u8) -> Vec<u8> {
        (0..len)
            .map(|_| match rng.gen_range(0..40) {
                0 => SEPARATOR,
                1 => WILDCARD,
                _ => rng.gen_range(0..num_of_chars),
            })
            .collect()
    }

    /// Reference key: regular symbols up to the first special, then the
    /// position of that special
    fn suffix_key(symbols: &[u8], pos: usize) -> Vec<(u8, usize)> {
        let mut key = Vec::new();
        for (offset, &c) in symbols[pos..].iter().enumerate() {
            if is_special(c) {
                key.push((1, pos + offset));
                return key;
            }
            key.push((0, c as usize));
        }
        key.push((1, symbols.len()));
        key
    }

    fn naive_suffix_array(symbols: &[u8]) -> Vec<usize> {
        let mut suffixes: Vec<usize> = (0..symbols.len()).collect();
        suffixes.sort_by_key(|&pos| suffix_key(symbols, pos));
        suffixes
    }

    #[test]
    fn test_suffix_order_with_separator() {
        // A C A | A C
        let symbols = [0, 1, 0, SEPARATOR, 0, 1];
        let sa = SuffixArray::build(&symbols, 4, &SortConfig::default()).unwrap();
        assert_eq!(sa.suffixes(), &[0, 4, 2, 1, 5, 3]);

        assert_eq!(lcp(&symbols, 0, 4), 2);
        assert_eq!(lcp(&symbols, 4, 2), 1);
        assert_eq!(lcp(&symbols, 2, 1), 0);
        assert_eq!(lcp(&symbols, 1, 5), 1);
        assert_eq!(lcp(&symbols, 5, 3), 0);
    }

    #[test]
    fn test_specials_never_match() {
        let symbols = [WILDCARD, WILDCARD, 2, WILDCARD];
        assert_eq!(lcp(&symbols, 0, 1), 0);
        assert_eq!(compare_suffixes(&symbols, 0, 1), Ordering::Less);
        assert_eq!(compare_suffixes(&symbols, 3, 1), Ordering::Greater);
        // Regular symbol sorts before any special
        assert_eq!(compare_suffixes(&symbols, 2, 0), Ordering::Less);
        assert_eq!(compare_suffixes(&symbols, 2, 2), Ordering::Equal);
    }

    #[test]
    fn test_matches_naive_order() {
        let mut rng = StdRng::seed_from_u64(42);
        for round in 0..30 {
            let len = rng.gen_range(1..400);
            let symbols = random_symbols(&mut rng, len, 4);
            let config = SortConfig {
                prefixlength: Some(1 + round % 5),
                ..SortConfig::default()
            };
            let sa = SuffixArray::build(&symbols, 4, &config).unwrap();
            assert_eq!(sa.suffixes(), naive_suffix_array(&symbols).as_slice());
        }
    }

    #[test]
    fn test_parts_concatenate_to_full_array() {
        let mut rng = StdRng::seed_from_u64(3);
        let symbols = random_symbols(&mut rng, 2000, 20);
        let full = SuffixArray::build(&symbols, 20, &SortConfig::default()).unwrap();

        let config = SortConfig {
            numofparts: 4,
            parallel_threshold: 100,
            ..SortConfig::default()
        };
        let mut sorter = SuffixSorter::new(&symbols, 20, &config).unwrap();
        assert!(sorter.numofparts() > 1 && sorter.numofparts() <= 4);

        let mut joined = Vec::new();
        let mut saw_special = false;
        while let Some(part) = sorter.next_part() {
            assert!(!saw_special, "special part must come last");
            if part.special {
                saw_special = true;
                assert!(part.suffixes.iter().all(|&pos| is_special(symbols[pos])));
            } else {
                assert!(part.suffixes.iter().all(|&pos| !is_special(symbols[pos])));
            }
            joined.extend(part.suffixes);
        }
        assert!(saw_special);
        assert_eq!(joined, full.suffixes());
    }

    #[test]
    fn test_recommended_prefix_length() {
        assert_eq!(recommended_prefix_length(4, 1000, 0.25), 3);
        assert_eq!(recommended_prefix_length(4, 10, 0.25), 1);
        assert_eq!(recommended_prefix_length(4, 1 << 40, 0.25), 10);
        assert_eq!(recommended_prefix_length(20, 0, 0.25), 1);
    }

    #[test]
    fn test_oversized_prefix_is_clamped() {
        let config = SortConfig {
            prefixlength: Some(64),
            ..SortConfig::default()
        };
        let sorter = SuffixSorter::new(&[0, 1, 2], 20, &config).unwrap();
        // 21^5 = 4084101 <= 2^24 < 21^6
        assert_eq!(sorter.prefixlength(), 5);
    }

    #[test]
    fn test_rejects_symbols_outside_alphabet() {
        assert!(SuffixSorter::new(&[0, 7, 1], 4, &SortConfig::default()).is_err());
        assert!(SuffixSorter::new(&[0], 0, &SortConfig::default()).is_err());
    }

    #[test]
    fn test_poly_a_sorts_by_position() {
        // Every suffix of A^n is a prefix of the one before it
        let symbols = vec![0u8; 3000];
        let sa = SuffixArray::build(&symbols, 4, &SortConfig::default()).unwrap();
        assert!(sa.suffixes().iter().copied().eq(0..symbols.len()));

        // A wildcard splits the run; the tail after it is a shorter run
        let mut split = vec![0u8; 10];
        split[6] = WILDCARD;
        let sa = SuffixArray::build(&split, 4, &SortConfig::default()).unwrap();
        assert_eq!(sa.suffixes(), naive_suffix_array(&split).as_slice());
        assert_eq!(sa.suffixes(), &[0, 1, 2, 3, 7, 4, 8, 5, 9, 6]);
    }
}
