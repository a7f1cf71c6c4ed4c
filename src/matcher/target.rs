//! Target set implementation.

use crate::crypto::Fingerprint;

/// Result of a match operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    /// Fingerprint is one of the targets
    Match,
    /// No match
    NoMatch,
}

impl MatchResult {
    #[inline]
    pub fn is_match(self) -> bool {
        matches!(self, MatchResult::Match)
    }
}

/// The immutable set of fingerprints a run searches for.
///
/// Target sets hold one wallet per selected range, so a linear scan over a
/// deduplicated vector beats hashing.
#[derive(Debug, Clone, Default)]
pub struct MatchSet {
    targets: Vec<Fingerprint>,
}

impl MatchSet {
    /// Creates a target set, dropping duplicates.
    pub fn new(targets: impl IntoIterator<Item = Fingerprint>) -> Self {
        let mut deduped: Vec<Fingerprint> = Vec::new();
        for target in targets {
            if !deduped.contains(&target) {
                deduped.push(target);
            }
        }
        Self { targets: deduped }
    }

    /// A set that never matches.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Checks a derived fingerprint against every target.
    #[inline]
    pub fn matches(&self, fingerprint: &Fingerprint) -> MatchResult {
        if self
            .targets
            .iter()
            .any(|t| t.as_bytes() == fingerprint.as_bytes())
        {
            MatchResult::Match
        } else {
            MatchResult::NoMatch
        }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fingerprint> {
        self.targets.iter()
    }
}
