use std::fs::File;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, error};

use wordfreq::{Config, FrequencyTable};

/// Count word frequencies in a text file using batch-parallel chunk workers.
#[derive(Parser)]
#[command(name = "wordfreq")]
#[command(about = "Count word frequencies in a text file", long_about = None)]
struct Cli {
    /// Input file to count
    path: PathBuf,

    /// Bytes read per chunk before boundary trimming
    #[arg(long, default_value_t = wordfreq::DEFAULT_CHUNK_SIZE)]
    chunk_size: NonZeroUsize,

    /// Worker slots, i.e. chunks processed concurrently per batch
    #[arg(long, default_value_t = wordfreq::DEFAULT_WORKERS)]
    workers: NonZeroUsize,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .with_target(cli.verbose >= 2)
        .init();

    if let Err(e) = run(&cli) {
        error!("fatal: {e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = Config {
        chunk_size: cli.chunk_size,
        workers: cli.workers,
    };
    debug!(
        "counting '{}' with chunk size {} and {} workers",
        cli.path.display(),
        config.chunk_size,
        config.workers
    );

    let file: File = File::open(&cli.path)
        .with_context(|| format!("could not open file '{}'", cli.path.display()))?;

    let table: FrequencyTable = wordfreq::count(file, &config)?;
    debug!("{} distinct words, {} tokens total", table.len(), table.total());

    for (word, count) in table.into_sorted() {
        println!("{} {}", String::from_utf8_lossy(&word), count);
    }
    Ok(())
}
