//! Found-key log and console number formatting.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::crypto::DeriveError;
use crate::worker::SearchResult;

/// Formats one line of the found-key log.
pub fn log_line(result: &SearchResult) -> Result<String, DeriveError> {
    Ok(format!(
        "Date/Time: {} | Private key: {} | WIF: {}\n",
        result.found_at.format("%Y-%m-%d %H:%M:%S"),
        result.private_key_hex(),
        result.wif()?
    ))
}

/// Appends a found result to `path`, creating the file if needed.
pub fn save_result(result: &SearchResult, path: &Path) -> Result<(), SaveError> {
    let line = log_line(result)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())?;
    Ok(())
}

/// Formats a count with a K/M/B suffix.
pub fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1e9)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1e6)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1e3)
    } else {
        n.to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("Failed to write result: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode result: {0}")]
    Encode(#[from] DeriveError),
}
