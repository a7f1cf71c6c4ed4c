//! Range and wallet definition files.
//!
//! `ranges.json` lists the selectable key ranges and `wallets.json` the
//! target wallet of each range, matched by position:
//!
//! ```json
//! { "ranges": [ { "min": "0x1", "max": "0x1", "status": 1 } ] }
//! { "wallets": [ "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH" ] }
//! ```
//!
//! Wallets may be given as P2PKH addresses or as 40-hex HASH160 values.

use std::fs;
use std::path::{Path, PathBuf};

use num_bigint::BigUint;
use serde::Deserialize;

use crate::crypto::{AddressError, Fingerprint};
use crate::worker::KeyRange;

pub const RANGES_FILE: &str = "ranges.json";
pub const WALLETS_FILE: &str = "wallets.json";

/// One entry of `ranges.json`, as written on disk.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RangeEntry {
    pub min: String,
    pub max: String,
    #[serde(default)]
    pub status: i64,
}

impl RangeEntry {
    /// Parses the hex bounds into a key range.
    pub fn key_range(&self) -> Result<KeyRange, DataError> {
        let min = parse_hex(&self.min)?;
        let max = parse_hex(&self.max)?;
        KeyRange::new(min, max).map_err(|_| DataError::InvertedRange {
            min: self.min.clone(),
            max: self.max.clone(),
        })
    }
}

#[derive(Deserialize)]
struct RangesFile {
    ranges: Vec<RangeEntry>,
}

#[derive(Deserialize)]
struct WalletsFile {
    wallets: Vec<String>,
}

/// A validated target for one selectable range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    /// 1-based position in the files
    pub number: usize,
    pub range: KeyRange,
    pub target: Fingerprint,
}

/// The loaded range and wallet definitions.
#[derive(Debug, Clone)]
pub struct Catalog {
    ranges: Vec<RangeEntry>,
    wallets: Vec<Fingerprint>,
}

impl Catalog {
    /// Loads `ranges.json` and `wallets.json` from `dir`.
    pub fn load(dir: &Path) -> Result<Self, DataError> {
        let ranges = load_ranges(&dir.join(RANGES_FILE))?;
        let wallets = load_wallets(&dir.join(WALLETS_FILE))?;
        Self::new(ranges, wallets)
    }

    /// Pairs ranges with wallets, checking every range has one.
    pub fn new(ranges: Vec<RangeEntry>, wallets: Vec<Fingerprint>) -> Result<Self, DataError> {
        if ranges.is_empty() {
            return Err(DataError::NoRanges);
        }
        if wallets.len() < ranges.len() {
            return Err(DataError::MissingWallets {
                ranges: ranges.len(),
                wallets: wallets.len(),
            });
        }
        Ok(Self { ranges, wallets })
    }

    /// Number of selectable ranges.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn entries(&self) -> &[RangeEntry] {
        &self.ranges
    }

    /// Selects a range by its 1-based number.
    pub fn select(&self, number: usize) -> Result<Puzzle, DataError> {
        if number == 0 || number > self.ranges.len() {
            return Err(DataError::NoSuchRange {
                number,
                count: self.ranges.len(),
            });
        }
        let index = number - 1;
        Ok(Puzzle {
            number,
            range: self.ranges[index].key_range()?,
            target: self.wallets[index],
        })
    }
}

/// Reads the range list.
pub fn load_ranges(path: &Path) -> Result<Vec<RangeEntry>, DataError> {
    let file: RangesFile = read_json(path)?;
    Ok(file.ranges)
}

/// Reads and decodes the wallet list.
pub fn load_wallets(path: &Path) -> Result<Vec<Fingerprint>, DataError> {
    let file: WalletsFile = read_json(path)?;
    file.wallets
        .iter()
        .enumerate()
        .map(|(index, wallet)| {
            wallet.parse::<Fingerprint>().map_err(|source| DataError::InvalidWallet {
                number: index + 1,
                source,
            })
        })
        .collect()
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, DataError> {
    let text = fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| DataError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses a hex integer with or without a `0x` prefix.
pub fn parse_hex(s: &str) -> Result<BigUint, DataError> {
    let s = s.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    BigUint::parse_bytes(digits.as_bytes(), 16).ok_or_else(|| DataError::InvalidHex(s.to_string()))
}

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid hex integer: {0:?}")]
    InvalidHex(String),
    #[error("Range minimum {min} is greater than maximum {max}")]
    InvertedRange { min: String, max: String },
    #[error("Wallet #{number} is invalid: {source}")]
    InvalidWallet {
        number: usize,
        #[source]
        source: AddressError,
    },
    #[error("No ranges defined")]
    NoRanges,
    #[error("{ranges} ranges defined but only {wallets} wallets")]
    MissingWallets { ranges: usize, wallets: usize },
    #[error("Range #{number} does not exist (choose 1 to {count})")]
    NoSuchRange { number: usize, count: usize },
}
