//! # btc_puzzle
//!
//! Linear search of a private-key range for Bitcoin P2PKH target wallets.
//!
//! ## Architecture
//!
//! - `crypto`: HASH160 derivation, address and WIF encodings
//! - `matcher`: Target fingerprint matching
//! - `worker`: The search engine (enumerator, dispatcher, workers, coordinator)
//! - `data`: Range and wallet definition files
//! - `output`: Found-key log
//! - `config`: Runtime configuration

pub mod config;
pub mod crypto;
pub mod data;
pub mod matcher;
pub mod output;
pub mod worker;

pub use config::Config;
pub use crypto::{AddressDeriver, Fingerprint, Hash160Deriver};
pub use data::{Catalog, Puzzle};
pub use matcher::{MatchResult, MatchSet};
pub use worker::{
    CancelHandle, KeyRange, Outcome, ProgressSnapshot, RangeLimit, RunReport, SearchError,
    SearchOptions, SearchResult, WorkerPool,
};
