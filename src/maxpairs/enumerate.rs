//! Bottom-up enumeration of maximal pairs over lcp-intervals.
//!
//! Suffixes arrive in suffix order, each with its lcp against the previous
//! suffix. Every open interval keeps its positions partitioned by left
//! context, so pairs that are left-maximal can be reported as soon as two
//! subtrees meet. Right-maximality holds by construction: two positions
//! meet at the interval whose lcp is their full common prefix.

use crate::index::encseq::is_special;
use crate::index::suffix_array::{LcpEntry, SequentialSuffixReader, SortConfig};
use anyhow::{bail, Result};
use log::debug;

/// Positions grouped by left context; the last class is "undefined"
type Positions = Vec<Vec<usize>>;

#[derive(Debug)]
struct Interval {
    lcp: usize,
    positions: Positions,
}

fn empty_positions(classes: usize) -> Positions {
    vec![Vec::new(); classes]
}

/// Report every pair between `carry` and `node` whose left contexts differ
/// or are both undefined, then move `carry` into `node`.
///
/// Intervals shorter than `minlength` hold no positions and report nothing.
fn merge<F>(node: &mut Interval, carry: Positions, minlength: usize, sink: &mut F) -> Result<()>
where
    F: FnMut(usize, usize, usize) -> Result<()>,
{
    if node.lcp < minlength {
        return Ok(());
    }

    let undefined = node.positions.len() - 1;
    for (a, left) in carry.iter().enumerate() {
        if left.is_empty() {
            continue;
        }
        for (b, right) in node.positions.iter().enumerate() {
            if a == b && a != undefined {
                continue;
            }
            for &p in left {
                for &q in right {
                    sink(node.lcp, p, q)?;
                }
            }
        }
    }

    for (class, positions) in carry.into_iter().enumerate() {
        node.positions[class].extend(positions);
    }
    Ok(())
}

/// Maximal pair enumerator fed one [`LcpEntry`] at a time.
///
/// The sink receives `(len, pos1, pos2)` in no particular orientation; an
/// error from the sink aborts the scan.
pub struct MaxpairsEnumerator<'a, F> {
    symbols: &'a [u8],
    num_of_chars: usize,
    minlength: usize,
    stack: Vec<Interval>,
    /// Leaf waiting for its lcp with the next suffix
    pending: Option<usize>,
    sink: F,
}

impl<'a, F> MaxpairsEnumerator<'a, F>
where
    F: FnMut(usize, usize, usize) -> Result<()>,
{
    pub fn new(symbols: &'a [u8], num_of_chars: usize, minlength: usize, sink: F) -> Result<Self> {
        if minlength == 0 {
            bail!("minimum match length must be at least 1");
        }
        let classes = num_of_chars + 1;
        Ok(Self {
            symbols,
            num_of_chars,
            minlength,
            stack: vec![Interval {
                lcp: 0,
                positions: empty_positions(classes),
            }],
            pending: None,
            sink,
        })
    }

    pub fn process(&mut self, entry: LcpEntry) -> Result<()> {
        match self.pending.replace(entry.suffix) {
            Some(previous) => self.process_leaf(previous, entry.lcp),
            None => Ok(()),
        }
    }

    /// Flush the last leaf and hand back the sink
    pub fn finish(mut self) -> Result<F> {
        if let Some(last) = self.pending.take() {
            self.process_leaf(last, 0)?;
        }
        Ok(self.sink)
    }

    fn left_class(&self, pos: usize) -> Result<usize> {
        if pos == 0 {
            return Ok(self.num_of_chars);
        }
        match self.symbols.get(pos - 1) {
            Some(&c) if is_special(c) => Ok(self.num_of_chars),
            Some(&c) if (c as usize) < self.num_of_chars => Ok(c as usize),
            Some(&c) => bail!("symbol {} at position {} is outside the alphabet", c, pos - 1),
            None => bail!("suffix {} is beyond the sequence end", pos),
        }
    }

    /// Insert the leaf `suffix`, whose lcp with the next suffix is `lc`
    fn process_leaf(&mut self, suffix: usize, lc: usize) -> Result<()> {
        let classes = self.num_of_chars + 1;
        let mut carry = empty_positions(classes);
        carry[self.left_class(suffix)?].push(suffix);

        loop {
            let Some(top) = self.stack.last_mut() else {
                bail!("lcp interval stack is empty");
            };
            if top.lcp > lc {
                merge(top, carry, self.minlength, &mut self.sink)?;
                match self.stack.pop() {
                    Some(closed) => carry = closed.positions,
                    None => bail!("lcp interval stack is empty"),
                }
            } else if top.lcp == lc {
                return merge(top, carry, self.minlength, &mut self.sink);
            } else {
                let positions = if lc >= self.minlength {
                    carry
                } else {
                    empty_positions(classes)
                };
                self.stack.push(Interval { lcp: lc, positions });
                return Ok(());
            }
        }
    }
}

/// Enumerate all maximal pairs of length at least `minlength` in `symbols`
pub fn enumerate_maxpairs<F>(
    symbols: &[u8],
    num_of_chars: usize,
    minlength: usize,
    config: &SortConfig,
    sink: F,
) -> Result<()>
where
    F: FnMut(usize, usize, usize) -> Result<()>,
{
    let mut enumerator = MaxpairsEnumerator::new(symbols, num_of_chars, minlength, sink)?;
    let mut reader = SequentialSuffixReader::new(symbols, num_of_chars, config)?;
    for entry in reader.by_ref() {
        enumerator.process(entry)?;
    }
    enumerator.finish()?;

    debug!(
        "enumerated maximal pairs over {} symbols in {} parts",
        symbols.len(),
        reader.pages()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::encseq::{Alphabet, SEPARATOR, WILDCARD};
    use crate::index::suffix_array::lcp;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// `(len, smaller, larger)` for every maximal pair, by definition
    fn brute_force(symbols: &[u8], minlength: usize) -> Vec<(usize, usize, usize)> {
        let left_differs = |p: usize, q: usize| {
            p == 0
                || q == 0
                || is_special(symbols[p - 1])
                || is_special(symbols[q - 1])
                || symbols[p - 1] != symbols[q - 1]
        };
        let mut pairs = Vec::new();
        for p in 0..symbols.len() {
            for q in p + 1..symbols.len() {
                let len = lcp(symbols, p, q);
                if len >= minlength && left_differs(p, q) {
                    pairs.push((len, p, q));
                }
            }
        }
        pairs.sort_unstable();
        pairs
    }

    fn enumerated(
        symbols: &[u8],
        num_of_chars: usize,
        minlength: usize,
        config: &SortConfig,
    ) -> Vec<(usize, usize, usize)> {
        let mut pairs = Vec::new();
        enumerate_maxpairs(symbols, num_of_chars, minlength, config, |len, p, q| {
            pairs.push((len, p.min(q), p.max(q)));
            Ok(())
        })
        .unwrap();
        pairs.sort_unstable();
        pairs
    }

    #[test]
    fn test_small_repeat() {
        // ACGTTACGTA: "ACGT" occurs at 0 and 5
        let symbols = Alphabet::dna().encode_seq(b"ACGTTACGTA");
        let pairs = enumerated(&symbols, 4, 3, &SortConfig::default());
        assert_eq!(pairs, vec![(4, 0, 5)]);
    }

    #[test]
    fn test_left_extension_is_not_maximal() {
        // "CGT" at 1 and 6 is preceded by A both times
        let symbols = Alphabet::dna().encode_seq(b"ACGTTACGTA");
        let pairs = enumerated(&symbols, 4, 3, &SortConfig::default());
        assert!(!pairs.contains(&(3, 1, 6)));
    }

    #[test]
    fn test_tandem_repeat() {
        let symbols = Alphabet::dna().encode_seq(b"AAAAAA");
        let expected = brute_force(&symbols, 2);
        assert_eq!(enumerated(&symbols, 4, 2, &SortConfig::default()), expected);
        // Every pair (0, q) is maximal: the left end is position 0
        assert!(expected.contains(&(5, 0, 1)));
        assert!(expected.contains(&(2, 0, 4)));
    }

    #[test]
    fn test_specials_break_matches() {
        let mut symbols = Alphabet::dna().encode_seq(b"ACGTA");
        symbols.push(SEPARATOR);
        symbols.extend(Alphabet::dna().encode_seq(b"ACGTC"));
        symbols.push(WILDCARD);
        symbols.extend(Alphabet::dna().encode_seq(b"ACGT"));

        let pairs = enumerated(&symbols, 4, 2, &SortConfig::default());
        assert_eq!(pairs, brute_force(&symbols, 2));
        assert!(pairs.contains(&(4, 0, 6)));
        assert!(pairs.contains(&(4, 6, 12)));
    }

    #[test]
    fn test_nothing_above_minlength() {
        let symbols = Alphabet::dna().encode_seq(b"ACGTACGT");
        assert!(enumerated(&symbols, 4, 5, &SortConfig::default()).is_empty());
    }

    #[test]
    fn test_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(11);
        let configs = [
            SortConfig::default(),
            SortConfig {
                numofparts: 3,
                prefixlength: Some(2),
                ..SortConfig::default()
            },
        ];
        for round in 0..60 {
            let len = rng.gen_range(1..120);
            let symbols: Vec<u8> = (0..len)
                .map(|_| match rng.gen_range(0..20) {
                    0 => SEPARATOR,
                    1 => WILDCARD,
                    _ => rng.gen_range(0..2),
                })
                .collect();
            let minlength = rng.gen_range(1..6);
            let config = &configs[round % configs.len()];
            assert_eq!(
                enumerated(&symbols, 2, minlength, config),
                brute_force(&symbols, minlength),
                "symbols {:?}, minlength {}",
                symbols,
                minlength
            );
        }
    }

    #[test]
    fn test_sink_error_aborts() {
        let symbols = Alphabet::dna().encode_seq(b"ACGTACGTACGT");
        let mut calls = 0;
        let result = enumerate_maxpairs(&symbols, 4, 2, &SortConfig::default(), |_, _, _| {
            calls += 1;
            bail!("stop")
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_zero_minlength() {
        let symbols = Alphabet::dna().encode_seq(b"ACGT");
        let result = enumerate_maxpairs(&symbols, 4, 0, &SortConfig::default(), |_, _, _| Ok(()));
        assert!(result.is_err());
    }
}
