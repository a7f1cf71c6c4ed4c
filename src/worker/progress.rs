//! Run counters and periodic throughput reporting.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{select, tick};

use super::Shutdown;

/// Counters shared by the threads of one run.
#[derive(Debug, Default)]
pub struct RunStats {
    /// Candidates successfully enqueued (written by the dispatcher only)
    dispatched: AtomicU64,
    /// Candidates whose fingerprint was derived and compared
    checked: AtomicU64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_dispatch(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_check(&self) {
        self.checked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    pub fn checked(&self) -> u64 {
        self.checked.load(Ordering::Relaxed)
    }
}

/// A point-in-time view of run progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    pub dispatched: u64,
    pub elapsed: Duration,
}

impl ProgressSnapshot {
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Returns the average rate since the run started (keys per second).
    pub fn keys_per_second(&self) -> f64 {
        let elapsed = self.elapsed_seconds();
        if elapsed > 0.0 {
            self.dispatched as f64 / elapsed
        } else {
            0.0
        }
    }
}

/// Samples the run counters on a fixed interval until shutdown.
pub struct ProgressReporter {
    interval: Duration,
    stats: Arc<RunStats>,
    shutdown: Arc<Shutdown>,
    start_time: Instant,
}

impl ProgressReporter {
    pub fn new(
        interval: Duration,
        stats: Arc<RunStats>,
        shutdown: Arc<Shutdown>,
        start_time: Instant,
    ) -> Self {
        Self {
            interval,
            stats,
            shutdown,
            start_time,
        }
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            dispatched: self.stats.dispatched(),
            elapsed: self.start_time.elapsed(),
        }
    }

    /// Runs the reporting loop, handing each snapshot to `observer`.
    ///
    /// Returns as soon as the shutdown signal is raised, without waiting for
    /// the next tick.
    pub fn run<F>(self, mut observer: F)
    where
        F: FnMut(&ProgressSnapshot),
    {
        let ticker = tick(self.interval);
        loop {
            select! {
                recv(ticker) -> _ => observer(&self.snapshot()),
                recv(self.shutdown.signal()) -> _ => break,
            }
        }
        log::debug!("progress reporter stopped");
    }
}
