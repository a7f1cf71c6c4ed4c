//! Worker pool management and run wiring.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::bounded;
use num_bigint::BigUint;

use crate::crypto::{AddressDeriver, DeriveError};
use crate::matcher::MatchSet;

use super::coordinator::{CancelHandle, Outcome, ResultCoordinator, Verdict};
use super::cpu::CpuWorker;
use super::dispatcher::{DispatchEnd, Dispatcher};
use super::enumerator::{KeyEnumerator, KeyRange, RangeLimit};
use super::progress::{ProgressReporter, ProgressSnapshot, RunStats};
use super::Shutdown;

/// Tuning knobs for one run.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Number of worker threads; also the queue capacity
    pub workers: usize,
    /// Progress report interval
    pub report_interval: Duration,
    /// Whether the range maximum ends the run
    pub limit: RangeLimit,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            report_interval: Duration::from_secs(5),
            limit: RangeLimit::Enforced,
        }
    }
}

/// Final statistics and terminal outcome of a run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: Outcome,
    /// Candidates enqueued by the dispatcher
    pub dispatched: u64,
    /// Candidates fully derived and compared by workers
    pub checked: u64,
    pub elapsed: Duration,
}

impl RunReport {
    /// Returns the average dispatch rate (keys per second).
    pub fn keys_per_second(&self) -> f64 {
        ProgressSnapshot {
            dispatched: self.dispatched,
            elapsed: self.elapsed,
        }
        .keys_per_second()
    }
}

/// A running search: one dispatcher, a pool of CPU workers and a progress
/// reporter, all sharing run-scoped state that is dropped with the pool.
pub struct WorkerPool {
    /// Number of workers
    num_workers: usize,
    /// Worker thread handles (Option to allow taking during wait)
    handles: Option<Vec<JoinHandle<()>>>,
    /// Dispatcher thread handle
    dispatcher: Option<JoinHandle<DispatchEnd>>,
    /// Progress reporter thread handle
    reporter: Option<JoinHandle<()>>,
    /// Arbiter of the terminal outcome
    coordinator: Arc<ResultCoordinator>,
    /// Shared statistics
    stats: Arc<RunStats>,
    /// Start time
    start_time: Instant,
}

impl WorkerPool {
    /// Starts a search over `range`.
    ///
    /// `on_progress` is called from the reporter thread every
    /// `options.report_interval` until the run is decided.
    pub fn start<D, F>(
        range: &KeyRange,
        targets: MatchSet,
        deriver: D,
        options: &SearchOptions,
        on_progress: F,
    ) -> Result<Self, SearchError>
    where
        D: AddressDeriver + 'static,
        F: FnMut(&ProgressSnapshot) + Send + 'static,
    {
        if options.workers == 0 {
            return Err(SearchError::NoWorkers);
        }

        let shutdown = Arc::new(Shutdown::new());
        let coordinator = Arc::new(ResultCoordinator::new(shutdown.clone()));
        let stats = Arc::new(RunStats::new());
        let start_time = Instant::now();

        let mut pool = Self {
            num_workers: options.workers,
            handles: Some(Vec::with_capacity(options.workers)),
            dispatcher: None,
            reporter: None,
            coordinator,
            stats,
            start_time,
        };

        // On a spawn failure, dropping `pool` cancels and joins whatever
        // was already started.
        pool.spawn_all(range, targets, deriver, options, on_progress)?;

        log::info!(
            "search started over {} with {} workers ({:?} max)",
            range,
            options.workers,
            options.limit
        );
        Ok(pool)
    }

    fn spawn_all<D, F>(
        &mut self,
        range: &KeyRange,
        targets: MatchSet,
        deriver: D,
        options: &SearchOptions,
        on_progress: F,
    ) -> Result<(), SearchError>
    where
        D: AddressDeriver + 'static,
        F: FnMut(&ProgressSnapshot) + Send + 'static,
    {
        let (queue_tx, queue_rx) = bounded::<BigUint>(options.workers);
        let targets = Arc::new(targets);
        let deriver = Arc::new(deriver);

        for id in 0..options.workers {
            let worker = CpuWorker::new(
                id,
                queue_rx.clone(),
                targets.clone(),
                deriver.clone(),
                self.coordinator.clone(),
                self.stats.clone(),
            );
            let handle = spawn(format!("puzzle-worker-{}", id), move || {
                let exit = worker.run();
                log::debug!("worker {} exited: {:?}", worker.id(), exit);
            })?;
            if let Some(handles) = self.handles.as_mut() {
                handles.push(handle);
            }
        }
        drop(queue_rx);

        let dispatcher = Dispatcher::new(
            KeyEnumerator::new(range, options.limit),
            queue_tx,
            self.coordinator.shutdown().clone(),
            self.stats.clone(),
        );
        self.dispatcher = Some(spawn("puzzle-dispatcher".into(), move || dispatcher.run())?);

        let reporter = ProgressReporter::new(
            options.report_interval,
            self.stats.clone(),
            self.coordinator.shutdown().clone(),
            self.start_time,
        );
        self.reporter = Some(spawn("puzzle-progress".into(), move || {
            reporter.run(on_progress)
        })?);

        Ok(())
    }

    /// Blocks until the run reaches its terminal state and every thread has
    /// stopped.
    pub fn wait(mut self) -> Result<RunReport, SearchError> {
        let mut panicked = false;

        let dispatch_end = match self.dispatcher.take().map(JoinHandle::join) {
            Some(Ok(end)) => Some(end),
            Some(Err(_)) => {
                panicked = true;
                None
            }
            None => None,
        };

        if let Some(handles) = self.handles.take() {
            for handle in handles {
                panicked |= handle.join().is_err();
            }
        }

        // Every candidate was handed out and every worker has returned, so
        // no match is still in flight.
        if dispatch_end == Some(DispatchEnd::Exhausted) {
            self.coordinator.exhaust();
        }

        self.coordinator.shutdown().raise();
        if let Some(reporter) = self.reporter.take() {
            panicked |= reporter.join().is_err();
        }

        if panicked {
            return Err(SearchError::ThreadPanicked);
        }

        let outcome = match self.coordinator.verdict() {
            Some(Verdict::Decided(outcome)) => outcome,
            Some(Verdict::Failed(err)) => return Err(SearchError::Derivation(err)),
            None => return Err(SearchError::Undecided),
        };

        let report = RunReport {
            outcome,
            dispatched: self.stats.dispatched(),
            checked: self.stats.checked(),
            elapsed: self.elapsed(),
        };
        log::info!(
            "search finished: {:?} after {} candidates",
            report.outcome,
            report.dispatched
        );
        Ok(report)
    }

    /// Requests cancellation of the run.
    pub fn cancel(&self) -> bool {
        self.coordinator.cancel()
    }

    /// Returns a handle for cancelling from elsewhere (e.g., signal handlers).
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle::new(self.coordinator.clone())
    }

    /// Returns true once a terminal outcome has been decided.
    pub fn is_decided(&self) -> bool {
        self.coordinator.is_decided()
    }

    /// Returns the number of workers.
    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Returns the number of candidates dispatched so far.
    pub fn dispatched(&self) -> u64 {
        self.stats.dispatched()
    }

    /// Returns the number of candidates checked so far.
    pub fn checked(&self) -> u64 {
        self.stats.checked()
    }

    /// Returns the elapsed time since the run started.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns the current dispatch rate (keys per second).
    pub fn keys_per_second(&self) -> f64 {
        ProgressSnapshot {
            dispatched: self.dispatched(),
            elapsed: self.elapsed(),
        }
        .keys_per_second()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.coordinator.cancel();
        // Wait for threads to finish if they haven't been joined
        if let Some(dispatcher) = self.dispatcher.take() {
            let _ = dispatcher.join();
        }
        if let Some(handles) = self.handles.take() {
            for handle in handles {
                let _ = handle.join();
            }
        }
        if let Some(reporter) = self.reporter.take() {
            let _ = reporter.join();
        }
    }
}

fn spawn<T, F>(name: String, f: F) -> Result<JoinHandle<T>, SearchError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    thread::Builder::new()
        .name(name)
        .spawn(f)
        .map_err(SearchError::Spawn)
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Range minimum {min:#x} is greater than maximum {max:#x}")]
    InvertedRange { min: BigUint, max: BigUint },
    #[error("Range must contain at least one key")]
    EmptyRange,
    #[error("At least one worker is required")]
    NoWorkers,
    #[error("Failed to spawn search thread: {0}")]
    Spawn(#[source] io::Error),
    #[error("Derivation failed, run aborted: {0}")]
    Derivation(#[source] DeriveError),
    #[error("A search thread panicked")]
    ThreadPanicked,
    #[error("Search ended without a terminal outcome")]
    Undecided,
}
