//! CPU-based worker that checks candidates against the targets.

use std::sync::Arc;

use crossbeam_channel::Receiver;
use num_bigint::BigUint;

use crate::crypto::AddressDeriver;
use crate::matcher::MatchSet;

use super::{ResultCoordinator, RunStats, SearchResult, Shutdown};

/// How a worker left its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// Queue was closed and drained
    Drained,
    /// Observed shutdown before taking another candidate
    Stopped,
    /// Found a match and its delivery was accepted
    Won,
    /// Found a match but another decision had already been made
    Lost,
    /// Derivation failed
    Failed,
}

/// A CPU worker that derives and tests queued candidates.
pub struct CpuWorker<D> {
    /// Worker ID
    id: usize,
    /// Receiving half of the candidate queue
    queue: Receiver<BigUint>,
    /// The fingerprints to match against
    targets: Arc<MatchSet>,
    /// Key to fingerprint derivation
    deriver: Arc<D>,
    /// Where matches and failures are delivered
    coordinator: Arc<ResultCoordinator>,
    /// Run statistics
    stats: Arc<RunStats>,
}

impl<D: AddressDeriver> CpuWorker<D> {
    /// Creates a new CPU worker.
    pub fn new(
        id: usize,
        queue: Receiver<BigUint>,
        targets: Arc<MatchSet>,
        deriver: Arc<D>,
        coordinator: Arc<ResultCoordinator>,
        stats: Arc<RunStats>,
    ) -> Self {
        Self {
            id,
            queue,
            targets,
            deriver,
            coordinator,
            stats,
        }
    }

    /// Runs the worker loop.
    ///
    /// Takes candidates one at a time until:
    /// - The queue is closed and empty
    /// - Shutdown is raised (checked before each candidate)
    /// - A match is found, whether or not its delivery wins
    /// - Derivation fails, which is reported as fatal to the run
    pub fn run(&self) -> WorkerExit {
        let shutdown: &Shutdown = self.coordinator.shutdown();

        for candidate in self.queue.iter() {
            if shutdown.is_raised() {
                return WorkerExit::Stopped;
            }

            let fingerprint = match self.deriver.derive(&candidate) {
                Ok(fp) => fp,
                Err(e) => {
                    log::warn!("worker {} failed to derive: {}", self.id, e);
                    self.coordinator.fail(e);
                    return WorkerExit::Failed;
                }
            };
            self.stats.record_check();

            if self.targets.matches(&fingerprint).is_match() {
                let result = SearchResult::new(candidate, self.id);
                return if self.coordinator.offer(result) {
                    WorkerExit::Won
                } else {
                    WorkerExit::Lost
                };
            }
        }

        WorkerExit::Drained
    }

    /// Returns the worker ID.
    pub fn id(&self) -> usize {
        self.id
    }
}
