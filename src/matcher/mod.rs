//! Target matching for derived fingerprints.
//!
//! A run compares every derived fingerprint byte-for-byte against a small,
//! immutable set of targets shared by all workers.

mod target;

pub use target::{MatchResult, MatchSet};
