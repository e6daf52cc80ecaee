use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread::available_parallelism;
use std::time::Instant;
use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use lotto_tally::codec::Footprint;
use lotto_tally::fixture::{append_tickets, DEFAULT_TARGET_LINES};
use lotto_tally::ingest::{ingest, Backend, IngestOptions};
use lotto_tally::matcher::WinningSet;
use lotto_tally::reduce::reduce;
use lotto_tally::{clamp_workers, MAX_WORKERS};

#[derive(Debug, Parser)]
#[command(version, about = "Count lottery winners in a file of tickets", long_about = None)]
struct Args {
    /// Ticket file, five numbers per line
    path: PathBuf,

    /// Worker threads. Without it random tickets are appended to PATH instead
    threads: Option<usize>,

    /// Line count the generated file should reach
    #[arg(long, default_value_t = DEFAULT_TARGET_LINES)]
    lines: usize,

    /// Winning numbers, e.g. "1 4 22 56 90". Read from stdin when absent
    #[arg(long)]
    winning: Option<String>,

    /// Map the file into memory instead of streaming each segment
    #[arg(long)]
    mmap: bool,

    /// Count whatever could be read when some segments fail
    #[arg(long)]
    allow_partial: bool,

    /// Print the memory taken by the loaded tickets
    #[arg(long)]
    footprint: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let Some(threads) = args.threads else {
        return generate(&args);
    };
    let workers = workers(threads);

    let start = Instant::now();
    let options = IngestOptions {
        workers,
        backend: if args.mmap { Backend::Mapped } else { Backend::Buffered },
        fail_fast: !args.allow_partial,
    };
    let ingestion = ingest(&args.path, &options)
        .with_context(|| format!("cannot read {}", args.path.display()))?;
    info!(
        tickets = ingestion.tickets.len(),
        lines = ingestion.lines,
        malformed = ingestion.malformed,
        elapsed = ?start.elapsed(),
        "read tickets"
    );

    let tickets = if args.allow_partial {
        for f in &ingestion.failures {
            warn!(segment = f.ordinal, start = f.range.start, end = f.range.end, "segment missing from the count: {}", f.error);
        }
        ingestion.tickets
    } else {
        ingestion.into_complete()?
    };

    if args.footprint {
        println!("{}", Footprint::for_tickets(tickets.len()));
    }

    let winning = match &args.winning {
        Some(line) => WinningSet::parse(line)?,
        None => read_winning()?,
    };

    let start = Instant::now();
    let result = reduce(&tickets, &winning, workers);
    println!("{result}");
    info!(winning = %winning, elapsed = ?start.elapsed(), "counted matches");

    Ok(())
}

fn generate(args: &Args) -> anyhow::Result<()> {
    let start = Instant::now();
    let appended = append_tickets(&args.path, args.lines, &mut rand::thread_rng())
        .with_context(|| format!("cannot write {}", args.path.display()))?;
    println!("Appended {appended} lines to {}", args.path.display());
    info!(elapsed = ?start.elapsed(), "generated tickets");
    Ok(())
}

/// Cap the requested thread count and compare it with the machine.
fn workers(requested: usize) -> usize {
    if requested > MAX_WORKERS {
        warn!("thread count capped at {MAX_WORKERS}");
    }
    let workers = clamp_workers(requested);

    let cores = available_parallelism().map(|n| n.get()).unwrap_or(1).min(MAX_WORKERS);
    info!(cores, workers, "worker threads");
    if workers > cores {
        warn!("using {workers} threads with only {cores} CPU cores may cause overhead");
    } else if workers < cores {
        info!("consider {cores} threads to match the CPU cores");
    }
    workers
}

fn read_winning() -> anyhow::Result<WinningSet> {
    eprint!("Enter 5 winning numbers (space-separated): ");
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).context("cannot read winning numbers")?;
    Ok(WinningSet::parse(&line)?)
}
