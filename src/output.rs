//! Output formatting for match listings and mismatch reports

use crate::index::encseq::Alphabet;
use crate::maxpairs::{Repeat, SampleCheck, Substringmatch};
use anyhow::Result;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

fn stdout(color: bool) -> StandardStream {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

/// Write one match as `len dbstart queryseqnum querystart`
pub fn write_match<W: WriteColor>(out: &mut W, m: &Substringmatch) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
    write!(out, "{}", m.len)?;
    out.reset()?;
    write!(out, " ")?;

    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    write!(out, "{}", m.dbstart)?;
    out.reset()?;
    write!(out, " ")?;

    out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
    write!(out, "{}", m.queryseqnum)?;
    out.reset()?;
    write!(out, " ")?;

    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    write!(out, "{}", m.querystart)?;
    out.reset()?;
    writeln!(out)
}

/// Write one repeat as `len seqnum1 start1 seqnum2 start2`
pub fn write_repeat<W: WriteColor>(out: &mut W, r: &Repeat) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
    write!(out, "{}", r.len)?;
    out.reset()?;

    for (seqnum, start) in [(r.seqnum1, r.start1), (r.seqnum2, r.start2)] {
        write!(out, " ")?;
        out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
        write!(out, "{}", seqnum)?;
        out.reset()?;
        write!(out, " ")?;
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(out, "{}", start)?;
        out.reset()?;
    }
    writeln!(out)
}

/// Print query matches, one per line
pub fn print_matches(matches: &[Substringmatch], color: bool) -> io::Result<()> {
    let mut out = stdout(color);
    for m in matches {
        write_match(&mut out, m)?;
    }
    Ok(())
}

/// Print repeats, one per line
pub fn print_repeats(repeats: &[Repeat], color: bool) -> io::Result<()> {
    let mut out = stdout(color);
    for r in repeats {
        write_repeat(&mut out, r)?;
    }
    Ok(())
}

/// Describe a failed sample: both result lists, then both sequences as
/// FASTA records named `dbseq` and `queryseq`
pub fn write_mismatch_report<W: Write>(
    out: &mut W,
    check: &SampleCheck,
    dbseq: &[u8],
    query: &[u8],
    alphabet: &Alphabet,
) -> Result<()> {
    writeln!(out, "failure for query of length {}", query.len())?;
    writeln!(out, "querymatches")?;
    for m in &check.querymatches {
        writeln!(out, "{}", m)?;
    }
    writeln!(out, "dbmatches")?;
    for m in &check.selfmatches {
        writeln!(out, "{}", m)?;
    }

    let mut fasta = bio::io::fasta::Writer::new(&mut *out);
    fasta.write("dbseq", None, &alphabet.decode_seq(dbseq))?;
    fasta.write("queryseq", None, &alphabet.decode_seq(query))?;
    fasta.flush()?;
    Ok(())
}
