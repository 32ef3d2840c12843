//! Self mode: enumerate maximal pairs of `db ++ SEPARATOR ++ query` and
//! keep the pairs that cross from the database into the query

use super::enumerate::enumerate_maxpairs;
use super::types::{Repeat, Substringmatch};
use crate::index::encseq::{Alphabet, Encseq, EncseqBuilder, SEPARATOR};
use crate::index::suffix_array::SortConfig;
use anyhow::{bail, Context, Result};
use log::debug;

/// Positions of the separators in `seq`
pub fn sequence_to_mark_positions(seq: &[u8]) -> Vec<usize> {
    memchr::memchr_iter(SEPARATOR, seq).collect()
}

/// Number of the sequence containing `pos`, given the separator positions
/// of a buffer of length `totallength`. `None` for a separator or a
/// position past the end.
pub fn sep_to_seqnum(markpos: &[usize], totallength: usize, pos: usize) -> Option<usize> {
    if pos >= totallength {
        return None;
    }
    let seqnum = markpos.partition_point(|&mark| mark < pos);
    match markpos.get(seqnum) {
        Some(&mark) if mark == pos => None,
        _ => Some(seqnum),
    }
}

/// Turns raw pairs over the concatenation into [`Substringmatch`]es
pub struct SelfMatchCollector<'a, F> {
    dblen: usize,
    querylen: usize,
    markpos: &'a [usize],
    sink: F,
}

impl<'a, F> SelfMatchCollector<'a, F>
where
    F: FnMut(Substringmatch) -> Result<()>,
{
    pub fn new(dblen: usize, querylen: usize, markpos: &'a [usize], sink: F) -> Self {
        Self {
            dblen,
            querylen,
            markpos,
            sink,
        }
    }

    /// Handle one pair; pairs that do not cross the database boundary are
    /// dropped
    pub fn store(&mut self, len: usize, pos1: usize, pos2: usize) -> Result<()> {
        let (dbstart, querystart) = if pos1 <= pos2 { (pos1, pos2) } else { (pos2, pos1) };
        if dbstart >= self.dblen || querystart <= self.dblen {
            return Ok(());
        }

        let pos = querystart - (self.dblen + 1);
        let Some(queryseqnum) = sep_to_seqnum(self.markpos, self.querylen, pos) else {
            bail!(
                "match at query position {} does not lie in any query sequence",
                pos
            );
        };
        let querystart = if queryseqnum == 0 {
            pos
        } else {
            pos - (self.markpos[queryseqnum - 1] + 1)
        };

        (self.sink)(Substringmatch {
            queryseqnum,
            querystart,
            dbstart,
            len,
        })
    }
}

/// Report every maximal match of length at least `minlength` between
/// `dbseq` and `query` by self-matching their concatenation.
///
/// Produces the same matches as [`super::sarr_query_substring_match`].
pub fn sarr_self_substring_match<F>(
    dbseq: &[u8],
    query: &[u8],
    minlength: usize,
    alphabet: &Alphabet,
    config: &SortConfig,
    sink: F,
) -> Result<()>
where
    F: FnMut(Substringmatch) -> Result<()>,
{
    if minlength == 0 {
        bail!("minimum match length must be at least 1");
    }
    if dbseq.is_empty() || query.is_empty() {
        bail!(
            "cannot self-match an empty sequence (dblen={}, querylen={})",
            dbseq.len(),
            query.len()
        );
    }

    let mut builder = EncseqBuilder::new(alphabet.clone());
    builder.add_multiple_encoded(dbseq);
    builder.add_encoded(query);
    let encseq = builder
        .build()
        .context("Failed to encode database and query")?;

    let markpos = sequence_to_mark_positions(query);
    let mut collector = SelfMatchCollector::new(dbseq.len(), query.len(), &markpos, sink);
    enumerate_maxpairs(
        encseq.symbols(),
        alphabet.num_of_chars(),
        minlength,
        config,
        |len, pos1, pos2| collector.store(len, pos1, pos2),
    )?;

    debug!(
        "self mode: dblen={}, querylen={}, minlength={}",
        dbseq.len(),
        query.len(),
        minlength
    );
    Ok(())
}

/// Report every maximal repeat of length at least `minlength` in an
/// indexed collection, including repeats between different sequences
pub fn encseq_repeats<F>(
    encseq: &Encseq,
    minlength: usize,
    config: &SortConfig,
    mut sink: F,
) -> Result<()>
where
    F: FnMut(Repeat) -> Result<()>,
{
    let locate = |pos: usize| -> Result<(usize, usize)> {
        let seqnum = encseq
            .seqnum(pos)
            .with_context(|| format!("position {} is outside the sequence", pos))?;
        let start = encseq
            .seqstartpos(seqnum)
            .with_context(|| format!("sequence {} has no start position", seqnum))?;
        Ok((seqnum, pos - start))
    };

    enumerate_maxpairs(
        encseq.symbols(),
        encseq.alphabet().num_of_chars(),
        minlength,
        config,
        |len, pos1, pos2| {
            let (seqnum1, start1) = locate(pos1.min(pos2))?;
            let (seqnum2, start2) = locate(pos1.max(pos2))?;
            sink(Repeat {
                len,
                seqnum1,
                start1,
                seqnum2,
                start2,
            })
        },
    )
}
