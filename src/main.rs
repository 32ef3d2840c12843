use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{info, LevelFilter};
use seqmatch::index::encseq::{Alphabet, AlphabetKind, Encseq, EncseqBuilder, EncseqWriter};
use seqmatch::index::stats::show_stats;
use seqmatch::maxpairs::{encseq_repeats, sarr_query_substring_match, test_maxpairs, MatchConfig};
use seqmatch::output::{print_matches, print_repeats};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "seqmatch")]
#[command(about = "Maximal substring matches over encoded sequence indexes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// When to color match listings
    #[arg(long, global = true, value_enum, default_value_t = ColorMode::Auto)]
    color: ColorMode,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ColorMode {
    Auto,
    Never,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode FASTA files into an index directory
    Encode {
        /// Input FASTA files
        #[arg(required = true)]
        fasta: Vec<PathBuf>,

        /// Index directory to write
        #[arg(short, long)]
        output: PathBuf,

        #[arg(long, value_enum, default_value_t = AlphabetKind::Dna)]
        alphabet: AlphabetKind,
    },
    /// Show index statistics
    Stats {
        /// Index directory
        dir: PathBuf,

        /// Verify symbols and separator table
        #[arg(long)]
        check: bool,
    },
    /// Report all maximal repeats within the index
    Selfmatch {
        /// Index directory
        dir: PathBuf,

        /// Minimum match length
        #[arg(short = 'l', long)]
        minlength: Option<usize>,
    },
    /// Report maximal matches between a query and the index
    Query {
        /// Index directory
        dir: PathBuf,

        /// Query FASTA file
        query: PathBuf,

        /// Minimum match length
        #[arg(short = 'l', long)]
        minlength: Option<usize>,
    },
    /// Check that query and self matching agree on random samples
    TestMaxpairs {
        /// Index directory
        dir: PathBuf,

        /// Number of samples
        #[arg(long)]
        samples: Option<usize>,

        /// Minimum match length
        #[arg(short = 'l', long)]
        minlength: Option<usize>,

        /// Length of the sampled substrings
        #[arg(long)]
        substringlength: Option<usize>,

        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,

        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,
    },
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    // Only fails when a logger is already installed
    let _ = builder.try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let mut config = MatchConfig::load_or_default(cli.config.as_deref())?;
    let color = cli.color == ColorMode::Auto;

    match cli.command {
        Commands::Encode {
            fasta,
            output,
            alphabet,
        } => {
            encode(&fasta, &output, alphabet)?;
        }
        Commands::Stats { dir, check } => {
            show_stats(&dir, check)?;
        }
        Commands::Selfmatch { dir, minlength } => {
            let minlength = minlength.unwrap_or(config.minlength);
            let encseq = Encseq::open(&dir)?;
            let mut repeats = Vec::new();
            encseq_repeats(&encseq, minlength, &config.sort, |r| {
                repeats.push(r);
                Ok(())
            })?;
            repeats.sort_unstable();
            info!("{} maximal repeats of length >= {}", repeats.len(), minlength);
            print_repeats(&repeats, color)?;
        }
        Commands::Query {
            dir,
            query,
            minlength,
        } => {
            let minlength = minlength.unwrap_or(config.minlength);
            let encseq = Encseq::open(&dir)?;
            let queryseq = read_query(&query, encseq.alphabet())?;
            let mut matches = Vec::new();
            sarr_query_substring_match(
                encseq.symbols(),
                queryseq.symbols(),
                minlength,
                encseq.alphabet(),
                &config.sort,
                |m| {
                    matches.push(m);
                    Ok(())
                },
            )?;
            matches.sort_unstable();
            info!("{} maximal matches of length >= {}", matches.len(), minlength);
            print_matches(&matches, color)?;
        }
        Commands::TestMaxpairs {
            dir,
            samples,
            minlength,
            substringlength,
            seed,
            no_progress,
        } => {
            let validation = &mut config.validation;
            if let Some(samples) = samples {
                validation.samples = samples;
            }
            if let Some(minlength) = minlength {
                validation.minlength = minlength;
            }
            if let Some(substringlength) = substringlength {
                validation.substringlength = substringlength;
            }
            if seed.is_some() {
                validation.seed = seed;
            }
            if no_progress {
                validation.show_progress = false;
            }

            let encseq = Encseq::open(&dir)?;
            let summary = test_maxpairs(&encseq, &config.validation, &config.sort)?;
            println!(
                "{} samples: {} checked, {} skipped, {} matches",
                summary.samples, summary.checked, summary.skipped, summary.matches
            );
        }
    }

    Ok(())
}

fn encode(fasta: &[PathBuf], output: &Path, alphabet: AlphabetKind) -> Result<()> {
    let mut builder = EncseqBuilder::new(Alphabet::new(alphabet));
    let mut count = 0;
    for path in fasta {
        count += builder.add_fasta(path)?;
    }
    let encseq = builder.build()?;
    EncseqWriter::write(output, &encseq)
        .with_context(|| format!("Failed to write index to {}", output.display()))?;
    println!(
        "Encoded {} sequences ({} symbols) into {}",
        count,
        encseq.total_length(),
        output.display()
    );
    Ok(())
}

fn read_query(path: &Path, alphabet: &Alphabet) -> Result<Encseq> {
    let mut builder = EncseqBuilder::new(alphabet.clone());
    builder.add_fasta(path)?;
    builder.build()
}
