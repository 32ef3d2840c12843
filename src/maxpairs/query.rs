//! Query mode: match a query against the suffix array of the database

use super::types::Substringmatch;
use crate::index::encseq::{is_special, Alphabet, EncseqBuilder, SEPARATOR};
use crate::index::suffix_array::{SortConfig, SuffixArray};
use anyhow::{bail, Context, Result};
use log::debug;

/// True when the match of `db[dbstart..]` and `query[querystart..]` cannot
/// be extended to the left
#[inline]
pub fn is_left_maximal(db: &[u8], dbstart: usize, query: &[u8], querystart: usize) -> bool {
    if dbstart == 0 || querystart == 0 {
        return true;
    }
    let a = db[dbstart - 1];
    let b = query[querystart - 1];
    is_special(a) || is_special(b) || a != b
}

/// Number of leading regular symbols `a` and `b` share
#[inline]
pub fn common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter()
        .zip(b)
        .take_while(|&(&x, &y)| x == y && !is_special(x))
        .count()
}

/// Report every maximal match of length at least `minlength` between
/// `dbseq` and `query`.
///
/// Both inputs are encoded over `alphabet` and may hold several sequences
/// delimited by separators. Query positions are reported relative to the
/// query sequence they lie in.
pub fn sarr_query_substring_match<F>(
    dbseq: &[u8],
    query: &[u8],
    minlength: usize,
    alphabet: &Alphabet,
    config: &SortConfig,
    mut sink: F,
) -> Result<()>
where
    F: FnMut(Substringmatch) -> Result<()>,
{
    if minlength == 0 {
        bail!("minimum match length must be at least 1");
    }
    if query.is_empty() {
        bail!("query sequence is empty");
    }

    let mut builder = EncseqBuilder::new(alphabet.clone());
    builder.add_multiple_encoded(dbseq);
    let db = builder.build().context("Failed to encode database sequence")?;
    let dbsymbols = db.symbols();
    let sa = SuffixArray::build(dbsymbols, alphabet.num_of_chars(), config)
        .context("Failed to sort database suffixes")?;

    let mut queryseqnum = 0;
    let mut seqstart = 0;
    let mut reported = 0usize;
    for querystart in 0..query.len() {
        if query[querystart] == SEPARATOR {
            queryseqnum += 1;
            seqstart = querystart + 1;
            continue;
        }
        if querystart + minlength > query.len() {
            break;
        }
        let pattern = &query[querystart..querystart + minlength];
        if pattern.iter().any(|&c| is_special(c)) {
            continue;
        }

        for &dbstart in &sa.suffixes()[sa.search(dbsymbols, pattern)] {
            if !is_left_maximal(dbsymbols, dbstart, query, querystart) {
                continue;
            }
            let len = minlength
                + common_prefix(
                    &dbsymbols[dbstart + minlength..],
                    &query[querystart + minlength..],
                );
            sink(Substringmatch {
                queryseqnum,
                querystart: querystart - seqstart,
                dbstart,
                len,
            })?;
            reported += 1;
        }
    }

    debug!(
        "query mode: dblen={}, querylen={}, minlength={}, {} matches",
        dbsymbols.len(),
        query.len(),
        minlength,
        reported
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dna(raw: &[u8]) -> Vec<u8> {
        Alphabet::dna().encode_seq(raw)
    }

    fn query_matches(db: &[u8], query: &[u8], minlength: usize) -> Vec<Substringmatch> {
        let mut matches = Vec::new();
        sarr_query_substring_match(
            db,
            query,
            minlength,
            &Alphabet::dna(),
            &SortConfig::default(),
            |m| {
                matches.push(m);
                Ok(())
            },
        )
        .unwrap();
        matches.sort();
        matches
    }

    #[test]
    fn test_left_maximal() {
        let db = dna(b"ACGT");
        let query = dna(b"TCGT");
        assert!(is_left_maximal(&db, 0, &query, 2));
        assert!(is_left_maximal(&db, 1, &query, 0));
        assert!(!is_left_maximal(&db, 3, &query, 3));
        assert!(is_left_maximal(&db, 1, &query, 1));
    }

    #[test]
    fn test_common_prefix_stops_at_special() {
        let mut a = dna(b"ACG");
        a.push(SEPARATOR);
        a.push(0);
        let mut b = dna(b"ACG");
        b.push(SEPARATOR);
        b.push(0);
        assert_eq!(common_prefix(&a, &b), 3);
        assert_eq!(common_prefix(&a, &dna(b"ACT")), 2);
    }

    #[test]
    fn test_single_match() {
        let matches = query_matches(&dna(b"TTACGTAC"), &dna(b"GACGTAG"), 4);
        assert_eq!(
            matches,
            vec![Substringmatch {
                queryseqnum: 0,
                querystart: 1,
                dbstart: 2,
                len: 5,
            }]
        );
    }

    #[test]
    fn test_query_sequences_are_numbered() {
        let mut query = dna(b"CCACGT");
        query.push(SEPARATOR);
        query.extend(dna(b"ACGTT"));
        let matches = query_matches(&dna(b"ACGT"), &query, 4);
        assert_eq!(
            matches,
            vec![
                Substringmatch {
                    queryseqnum: 0,
                    querystart: 2,
                    dbstart: 0,
                    len: 4,
                },
                Substringmatch {
                    queryseqnum: 1,
                    querystart: 0,
                    dbstart: 0,
                    len: 4,
                },
            ]
        );
    }

    #[test]
    fn test_no_match_across_database_separator() {
        let mut db = dna(b"AAC");
        db.push(SEPARATOR);
        db.extend(dna(b"GTT"));
        assert!(query_matches(&db, &dna(b"ACGT"), 3).is_empty());
    }

    #[test]
    fn test_invalid_arguments() {
        let alphabet = Alphabet::dna();
        let config = SortConfig::default();
        let ok = |_: Substringmatch| -> Result<()> { Ok(()) };
        let db = dna(b"ACGT");
        assert!(sarr_query_substring_match(&db, &db, 0, &alphabet, &config, ok).is_err());
        assert!(sarr_query_substring_match(&[], &db, 2, &alphabet, &config, ok).is_err());
        assert!(sarr_query_substring_match(&db, &[], 2, &alphabet, &config, ok).is_err());
    }
}
