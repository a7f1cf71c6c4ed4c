//! The concurrent key-search engine.
//!
//! This module provides:
//! - Sequential keyspace enumeration feeding a bounded queue
//! - Multi-threaded CPU workers pulling from that queue
//! - First-winner arbitration of the run's terminal outcome
//! - Periodic throughput reporting
//!
//! Control flow: `Dispatcher` → bounded queue → N `CpuWorker`s →
//! `ResultCoordinator`, whose decision raises the run's `Shutdown` signal
//! seen by the dispatcher, the workers and the `ProgressReporter`.

mod coordinator;
mod cpu;
mod dispatcher;
mod enumerator;
mod pool;
mod progress;
mod shutdown;

pub use coordinator::{CancelHandle, Outcome, ResultCoordinator, SearchResult, Verdict};
pub use cpu::{CpuWorker, WorkerExit};
pub use dispatcher::{DispatchEnd, Dispatcher};
pub use enumerator::{KeyEnumerator, KeyRange, RangeLimit};
pub use pool::{RunReport, SearchError, SearchOptions, WorkerPool};
pub use progress::{ProgressReporter, ProgressSnapshot, RunStats};
pub use shutdown::Shutdown;
