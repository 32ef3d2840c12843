use crate::index::encseq::Encseq;
use anyhow::Result;
use std::path::Path;

/// Display statistics of an encoded-sequence index
pub fn show_stats(dir: &Path, check: bool) -> Result<()> {
    let encseq = Encseq::open(dir)?;
    let meta = encseq.meta();

    println!("Index Statistics");
    println!("================");
    println!();
    println!("Index location:   {}", dir.display());
    println!("Index version:    {}", meta.version);
    println!("Alphabet:         {}", meta.alphabet);
    println!("Total length:     {}", meta.total_length);
    println!("Sequences:        {}", meta.num_of_sequences);

    match encseq.separators() {
        Some(set) => println!(
            "Separators:       {} ({} intset, {})",
            set.size(),
            set.width(),
            format_size(set.size_of_struct() as u64)
        ),
        None => println!("Separators:       none"),
    }

    println!();
    println!("Sequence lengths:");
    for seqnum in 0..encseq.num_of_sequences().min(15) {
        let description = encseq.description(seqnum).unwrap_or_default();
        let length = encseq.seqlength(seqnum).unwrap_or_default();
        println!("  {:>6} {:>12}  {}", seqnum, length, description);
    }
    if encseq.num_of_sequences() > 15 {
        println!("  ... and {} more", encseq.num_of_sequences() - 15);
    }

    if let Ok(size) = dir_size(dir) {
        println!();
        println!("Index size:       {}", format_size(size));
    }

    if check {
        encseq.check()?;
        println!();
        println!("Consistency check passed");
    }

    Ok(())
}

/// Calculate directory size recursively
fn dir_size(path: &Path) -> std::io::Result<u64> {
    let mut size = 0;
    if path.is_dir() {
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() {
                size += entry.metadata()?.len();
            } else if path.is_dir() {
                size += dir_size(&path)?;
            }
        }
    }
    Ok(size)
}

/// Format byte size to human readable
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
