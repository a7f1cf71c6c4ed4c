//! Sequential keyspace enumeration.

use std::fmt;

use num_bigint::BigUint;

use super::SearchError;

/// An inclusive range of candidate private keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    min: BigUint,
    max: BigUint,
}

impl KeyRange {
    /// Creates a range covering `min..=max`.
    pub fn new(min: BigUint, max: BigUint) -> Result<Self, SearchError> {
        if min > max {
            return Err(SearchError::InvertedRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Creates a range of `len` keys starting at `min`, i.e. `[min, min + len)`.
    pub fn with_len(min: BigUint, len: u64) -> Result<Self, SearchError> {
        if len == 0 {
            return Err(SearchError::EmptyRange);
        }
        let max = &min + (len - 1);
        Ok(Self { min, max })
    }

    pub fn min(&self) -> &BigUint {
        &self.min
    }

    pub fn max(&self) -> &BigUint {
        &self.max
    }

    /// Number of keys in the range.
    pub fn len(&self) -> BigUint {
        &self.max - &self.min + 1u32
    }

    pub fn contains(&self, key: &BigUint) -> bool {
        &self.min <= key && key <= &self.max
    }
}

impl fmt::Display for KeyRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}..={:#x}", self.min, self.max)
    }
}

/// Whether the enumerator stops at the range maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangeLimit {
    /// Stop after yielding `max`; the run can end exhausted
    #[default]
    Enforced,
    /// `max` is informational and enumeration never ends on its own
    Advisory,
}

/// Produces the gap-free, strictly increasing sequence of candidates.
///
/// Each call to `next` is one arbitrary-precision increment of the cursor.
/// The enumerator is owned by a single dispatcher; it is not shared.
#[derive(Debug)]
pub struct KeyEnumerator {
    cursor: BigUint,
    end: Option<BigUint>,
}

impl KeyEnumerator {
    pub fn new(range: &KeyRange, limit: RangeLimit) -> Self {
        let end = match limit {
            RangeLimit::Enforced => Some(range.max.clone()),
            RangeLimit::Advisory => None,
        };
        Self {
            cursor: range.min.clone(),
            end,
        }
    }

    /// The next candidate that would be produced.
    pub fn cursor(&self) -> &BigUint {
        &self.cursor
    }
}

impl Iterator for KeyEnumerator {
    type Item = BigUint;

    fn next(&mut self) -> Option<BigUint> {
        if let Some(end) = &self.end {
            if &self.cursor > end {
                return None;
            }
        }
        let candidate = self.cursor.clone();
        self.cursor += 1u32;
        Some(candidate)
    }
}
