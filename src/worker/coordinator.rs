//! First-winner arbitration of a run's terminal outcome.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Local};
use num_bigint::BigUint;

use crate::crypto::{encode_wif, secret_key_bytes, DeriveError};

use super::Shutdown;

/// Result of a successful key search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// The private key whose fingerprint matched
    pub candidate: BigUint,
    /// When the matching worker observed it
    pub found_at: DateTime<Local>,
    /// The ID of the worker that found this result
    pub worker_id: usize,
}

impl SearchResult {
    pub fn new(candidate: BigUint, worker_id: usize) -> Self {
        Self {
            candidate,
            found_at: Local::now(),
            worker_id,
        }
    }

    /// Returns the private key as 64 zero-padded hex digits.
    pub fn private_key_hex(&self) -> String {
        format!("{:064x}", self.candidate)
    }

    /// Returns the private key in compressed WIF.
    pub fn wif(&self) -> Result<String, DeriveError> {
        secret_key_bytes(&self.candidate).map(|bytes| encode_wif(&bytes))
    }
}

/// Terminal state of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Found(SearchResult),
    Exhausted,
    Cancelled,
}

impl Outcome {
    pub fn result(&self) -> Option<&SearchResult> {
        match self {
            Outcome::Found(result) => Some(result),
            _ => None,
        }
    }
}

/// What the coordinator settled on. A derivation failure takes the same slot
/// as the terminal outcomes so that nothing else can be decided after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Decided(Outcome),
    Failed(DeriveError),
}

/// Accepts exactly one decision per run.
///
/// Every decision goes through a compare-and-set on `claimed`; the first
/// caller stores its verdict and raises the shutdown signal, every later
/// caller gets `false` back and must discard what it was delivering.
#[derive(Debug)]
pub struct ResultCoordinator {
    claimed: AtomicBool,
    verdict: Mutex<Option<Verdict>>,
    shutdown: Arc<Shutdown>,
}

impl ResultCoordinator {
    pub fn new(shutdown: Arc<Shutdown>) -> Self {
        Self {
            claimed: AtomicBool::new(false),
            verdict: Mutex::new(None),
            shutdown,
        }
    }

    /// Delivers a match. Never blocks; returns whether it was accepted.
    pub fn offer(&self, result: SearchResult) -> bool {
        self.decide(Verdict::Decided(Outcome::Found(result)))
    }

    /// Records an operator cancellation.
    pub fn cancel(&self) -> bool {
        self.decide(Verdict::Decided(Outcome::Cancelled))
    }

    /// Records that the range was drained with no match.
    pub fn exhaust(&self) -> bool {
        self.decide(Verdict::Decided(Outcome::Exhausted))
    }

    /// Records a fatal derivation failure.
    pub fn fail(&self, err: DeriveError) -> bool {
        self.decide(Verdict::Failed(err))
    }

    fn decide(&self, verdict: Verdict) -> bool {
        if self
            .claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        *self.verdict.lock().unwrap_or_else(PoisonError::into_inner) = Some(verdict);
        self.shutdown.raise();
        true
    }

    pub fn is_decided(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }

    /// Returns a copy of the verdict, if one has been stored.
    pub fn verdict(&self) -> Option<Verdict> {
        self.verdict
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn shutdown(&self) -> &Arc<Shutdown> {
        &self.shutdown
    }
}

/// Cloneable handle that cancels a running search, e.g. from a signal handler.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    coordinator: Arc<ResultCoordinator>,
}

impl CancelHandle {
    pub(crate) fn new(coordinator: Arc<ResultCoordinator>) -> Self {
        Self { coordinator }
    }

    /// Requests cancellation. Returns `false` if the run was already decided.
    pub fn cancel(&self) -> bool {
        self.coordinator.cancel()
    }
}
