//! Runtime configuration for the key search.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::crypto::{AddressError, Fingerprint};
use crate::worker::{RangeLimit, SearchOptions};

/// Bitcoin puzzle range key search
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Directory holding ranges.json and wallets.json
    #[arg(short = 'd', long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Range number to search (1-based; prompted for when omitted)
    #[arg(short = 'r', long)]
    pub range: Option<usize>,

    /// Number of worker threads (default: number of CPU cores)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Progress report interval in seconds
    #[arg(short = 'i', long, default_value = "5")]
    pub report_interval: u64,

    /// File that found keys are appended to
    #[arg(short = 'o', long, default_value = "found_keys.txt")]
    pub output: PathBuf,

    /// Keep counting past the range maximum instead of stopping there
    #[arg(long, default_value = "false")]
    pub unbounded: bool,

    /// Target address or hex HASH160, replacing the range's wallet (repeatable)
    #[arg(short = 't', long = "target")]
    pub targets: Vec<String>,
}

impl Config {
    /// Returns the number of workers, defaulting to CPU count
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count() == 0 {
            return Err(ConfigError::InvalidWorkers);
        }

        if self.report_interval == 0 {
            return Err(ConfigError::InvalidInterval);
        }

        if self.range == Some(0) {
            return Err(ConfigError::InvalidRange);
        }

        self.target_overrides()?;
        Ok(())
    }

    /// Returns the decoded `--target` values, empty when none were given
    pub fn target_overrides(&self) -> Result<Vec<Fingerprint>, ConfigError> {
        self.targets
            .iter()
            .map(|t| {
                t.parse::<Fingerprint>()
                    .map_err(|source| ConfigError::InvalidTarget {
                        target: t.clone(),
                        source,
                    })
            })
            .collect()
    }

    /// Returns how the range maximum is treated
    pub fn range_limit(&self) -> RangeLimit {
        if self.unbounded {
            RangeLimit::Advisory
        } else {
            RangeLimit::Enforced
        }
    }

    /// Returns the engine options described by this configuration
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            workers: self.worker_count(),
            report_interval: Duration::from_secs(self.report_interval),
            limit: self.range_limit(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Worker count must be at least 1")]
    InvalidWorkers,
    #[error("Report interval must be at least 1 second")]
    InvalidInterval,
    #[error("Range numbers start at 1")]
    InvalidRange,
    #[error("Invalid target {target:?}: {source}")]
    InvalidTarget {
        target: String,
        #[source]
        source: AddressError,
    },
}
