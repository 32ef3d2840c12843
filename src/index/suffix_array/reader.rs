//! Reading sorted suffixes: pattern search over a complete suffix array and
//! a sequential reader that streams `(suffix, lcp)` pairs part by part.

use super::builder::{lcp, SuffixArray, SuffixSorter};
use super::types::*;
use crate::index::encseq::is_special;
use anyhow::Result;
use std::cmp::Ordering;
use std::ops::Range;

/// Compare the suffix at `suffix` with `pattern`, looking at no more than
/// `pattern.len()` symbols. `Equal` means the suffix starts with `pattern`.
#[inline]
pub fn compare_prefix(symbols: &[u8], suffix: usize, pattern: &[u8]) -> Ordering {
    for (offset, &p) in pattern.iter().enumerate() {
        match symbols.get(suffix + offset) {
            Some(&c) if !is_special(c) => match c.cmp(&p) {
                Ordering::Equal => {}
                other => return other,
            },
            // Specials and the end sort after every regular symbol
            _ => return Ordering::Greater,
        }
    }
    Ordering::Equal
}

impl SuffixArray {
    /// Range of suffix array indices whose suffixes start with `pattern`
    pub fn search(&self, symbols: &[u8], pattern: &[u8]) -> Range<usize> {
        if pattern.is_empty() || self.suffixes.is_empty() {
            return 0..0;
        }

        let lo = self.lower_bound(symbols, pattern);
        let hi = self.upper_bound(symbols, pattern, lo);
        lo..hi
    }

    /// First index whose suffix does not sort before `pattern`
    fn lower_bound(&self, symbols: &[u8], pattern: &[u8]) -> usize {
        let mut lo = 0;
        let mut hi = self.suffixes.len();

        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if compare_prefix(symbols, self.suffixes[mid], pattern) == Ordering::Less {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }

        lo
    }

    /// First index at or after `start` whose suffix does not start with
    /// `pattern`
    fn upper_bound(&self, symbols: &[u8], pattern: &[u8], start: usize) -> usize {
        let mut lo = start;
        let mut hi = self.suffixes.len();

        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if compare_prefix(symbols, self.suffixes[mid], pattern) == Ordering::Greater {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }

        lo
    }

    /// Number of occurrences of `pattern`
    pub fn count_matches(&self, symbols: &[u8], pattern: &[u8]) -> usize {
        self.search(symbols, pattern).len()
    }
}

/// Streams the suffixes that start with a regular symbol, in suffix order,
/// each with its lcp against the suffix before it.
///
/// Parts are pulled from the sorter on demand; the lcp of the first suffix
/// of a part is taken against the last suffix of the previous part. The
/// special part ends the stream.
pub struct SequentialSuffixReader<'a> {
    symbols: &'a [u8],
    sorter: SuffixSorter<'a>,
    page: std::vec::IntoIter<usize>,
    previous: Option<usize>,
    pages: usize,
    finished: bool,
}

impl<'a> SequentialSuffixReader<'a> {
    pub fn new(symbols: &'a [u8], num_of_chars: usize, config: &SortConfig) -> Result<Self> {
        let sorter = SuffixSorter::new(symbols, num_of_chars, config)?;
        Ok(Self::from_sorter(symbols, sorter))
    }

    pub fn from_sorter(symbols: &'a [u8], sorter: SuffixSorter<'a>) -> Self {
        Self {
            symbols,
            sorter,
            page: Vec::new().into_iter(),
            previous: None,
            pages: 0,
            finished: false,
        }
    }

    /// Number of parts read so far
    pub fn pages(&self) -> usize {
        self.pages
    }
}

impl Iterator for SequentialSuffixReader<'_> {
    type Item = LcpEntry;

    fn next(&mut self) -> Option<LcpEntry> {
        loop {
            if let Some(suffix) = self.page.next() {
                let lcp = self
                    .previous
                    .map_or(0, |previous| lcp(self.symbols, previous, suffix));
                self.previous = Some(suffix);
                return Some(LcpEntry { suffix, lcp });
            }
            if self.finished {
                return None;
            }
            match self.sorter.next_part() {
                Some(part) if !part.special => {
                    self.pages += 1;
                    self.page = part.suffixes.into_iter();
                }
                _ => {
                    self.finished = true;
                    return None;
                }
            }
        }
    }
}
