//! Bitcoin puzzle key search CLI
//!
//! Usage:
//!   btc_puzzle                  # Prompt for a range from data/ranges.json
//!   btc_puzzle -r 20 -w 8       # Search range #20 with 8 workers
//!   btc_puzzle -r 1 --unbounded # Keep counting past the range maximum

use std::io::{self, BufRead, Write};
use std::process;

use clap::Parser;

use btc_puzzle::config::ConfigError;
use btc_puzzle::data::DataError;
use btc_puzzle::output::{format_number, save_result};
use btc_puzzle::{
    Catalog, Config, Hash160Deriver, MatchSet, Outcome, ProgressSnapshot, RunReport, SearchError,
    WorkerPool,
};

fn main() {
    env_logger::init();
    let config = Config::parse();

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        process::exit(1);
    }

    if let Err(e) = run(&config) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(config: &Config) -> Result<(), RunError> {
    let catalog = Catalog::load(&config.data_dir)?;

    println!("Bitcoin Puzzle Key Search");
    println!("=========================");
    println!("CPUs detected: {}", num_cpus::get());

    let number = match config.range {
        Some(number) => number,
        None => prompt_range(catalog.len())?,
    };
    let puzzle = catalog.select(number)?;

    let overrides = config.target_overrides()?;
    let targets = if overrides.is_empty() {
        MatchSet::new([puzzle.target])
    } else {
        MatchSet::new(overrides)
    };

    let options = config.search_options();

    // Print startup info
    println!("Range #{}:   {}", puzzle.number, puzzle.range);
    for target in targets.iter() {
        println!("Target:     {} ({})", target, target.to_hex());
    }
    println!("Workers:    {}", options.workers);
    println!("Limit:      {:?}", options.limit);
    println!();

    let pool = WorkerPool::start(
        &puzzle.range,
        targets,
        Hash160Deriver::new(),
        &options,
        print_progress,
    )?;

    // Set up ctrl-c handler
    let cancel = pool.cancel_handle();
    ctrlc::set_handler(move || {
        cancel.cancel();
    })
    .expect("Error setting Ctrl-C handler");

    println!("Searching... (Press Ctrl+C to stop)\n");

    let report = pool.wait()?;

    match &report.outcome {
        Outcome::Found(result) => {
            println!("\n=== Key Found ===");
            println!("Private Key: {}", result.private_key_hex());
            match result.wif() {
                Ok(wif) => println!("WIF:         {}", wif),
                Err(e) => eprintln!("Could not encode WIF: {}", e),
            }
            println!("Worker:      {}", result.worker_id);

            match save_result(result, &config.output) {
                Ok(()) => println!("Key saved to {}", config.output.display()),
                Err(e) => eprintln!("Could not save key to {}: {}", config.output.display(), e),
            }
        }
        Outcome::Exhausted => println!("\nRange exhausted without a match."),
        Outcome::Cancelled => println!("\nStopped by user."),
    }

    print_summary(&report);
    Ok(())
}

/// Asks for a range number on stdin until a valid one is entered.
fn prompt_range(count: usize) -> io::Result<usize> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("Choose a range (1 to {}): ", count);
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no range number entered",
            ));
        };
        match line?.trim().parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => return Ok(n),
            _ => println!("Invalid number. Enter a value between 1 and {}.", count),
        }
    }
}

fn print_progress(snapshot: &ProgressSnapshot) {
    println!(
        "[{:>4}s] Checked {} keys ({}/s)",
        snapshot.elapsed.as_secs(),
        format_number(snapshot.dispatched),
        format_number(snapshot.keys_per_second() as u64)
    );
}

fn print_summary(report: &RunReport) {
    println!("\n--- Final Statistics ---");
    println!("Keys checked:   {}", format_number(report.dispatched));
    println!("Time elapsed:   {:.2}s", report.elapsed.as_secs_f64());
    println!(
        "Average speed:  {}/s",
        format_number(report.keys_per_second() as u64)
    );
}

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error("Failed to read range number: {0}")]
    Prompt(#[from] io::Error),
}
