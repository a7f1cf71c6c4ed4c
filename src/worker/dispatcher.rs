//! Single producer feeding candidates into the worker queue.

use std::sync::Arc;

use crossbeam_channel::{select, Sender};
use num_bigint::BigUint;

use super::{KeyEnumerator, RunStats, Shutdown};

/// Why the dispatcher stopped producing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchEnd {
    /// The enumerator ran out of candidates
    Exhausted,
    /// Shutdown was raised, or every worker had already gone away
    Stopped,
}

/// Owns the enumerator and the sending half of the bounded queue.
///
/// Dropping the dispatcher drops the sender, which is what tells workers
/// that no more candidates will come.
pub struct Dispatcher {
    enumerator: KeyEnumerator,
    queue: Sender<BigUint>,
    shutdown: Arc<Shutdown>,
    stats: Arc<RunStats>,
}

impl Dispatcher {
    pub fn new(
        enumerator: KeyEnumerator,
        queue: Sender<BigUint>,
        shutdown: Arc<Shutdown>,
        stats: Arc<RunStats>,
    ) -> Self {
        Self {
            enumerator,
            queue,
            shutdown,
            stats,
        }
    }

    /// Runs the dispatch loop until the range is exhausted or shutdown.
    ///
    /// Blocks on a full queue, but wakes up as soon as shutdown is raised.
    pub fn run(mut self) -> DispatchEnd {
        loop {
            if self.shutdown.is_raised() {
                return DispatchEnd::Stopped;
            }
            let Some(candidate) = self.enumerator.next() else {
                log::debug!("enumerator exhausted at {:#x}", self.enumerator.cursor());
                return DispatchEnd::Exhausted;
            };

            select! {
                send(self.queue, candidate) -> sent => match sent {
                    Ok(()) => self.stats.record_dispatch(),
                    Err(_) => return DispatchEnd::Stopped,
                },
                recv(self.shutdown.signal()) -> _ => return DispatchEnd::Stopped,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::{KeyRange, RangeLimit};
    use crossbeam_channel::bounded;
    use std::thread;
    use std::time::Duration;

    fn dispatcher(
        len: u64,
        capacity: usize,
    ) -> (Dispatcher, crossbeam_channel::Receiver<BigUint>, Arc<Shutdown>, Arc<RunStats>) {
        let range = KeyRange::with_len(BigUint::from(100u32), len).unwrap();
        let (tx, rx) = bounded(capacity);
        let shutdown = Arc::new(Shutdown::new());
        let stats = Arc::new(RunStats::new());
        let d = Dispatcher::new(
            KeyEnumerator::new(&range, RangeLimit::Enforced),
            tx,
            shutdown.clone(),
            stats.clone(),
        );
        (d, rx, shutdown, stats)
    }

    #[test]
    fn test_dispatches_whole_range_then_closes() {
        let (d, rx, _shutdown, stats) = dispatcher(50, 4);
        let handle = thread::spawn(move || d.run());

        let received: Vec<BigUint> = rx.iter().collect();
        assert_eq!(handle.join().unwrap(), DispatchEnd::Exhausted);
        assert_eq!(received.len(), 50);
        assert_eq!(received[0], BigUint::from(100u32));
        assert_eq!(received[49], BigUint::from(149u32));
        assert_eq!(stats.dispatched(), 50);
    }

    #[test]
    fn test_unblocks_on_shutdown_when_queue_full() {
        let (d, rx, shutdown, stats) = dispatcher(1_000, 2);
        let handle = thread::spawn(move || d.run());

        // Nobody consumes, so the dispatcher parks on the third send.
        while stats.dispatched() < 2 {
            thread::sleep(Duration::from_millis(1));
        }
        shutdown.raise();
        assert_eq!(handle.join().unwrap(), DispatchEnd::Stopped);
        assert_eq!(stats.dispatched(), 2);

        // Queue is closed after the buffered items.
        assert_eq!(rx.iter().count(), 2);
    }

    #[test]
    fn test_stops_when_workers_are_gone() {
        let (d, rx, _shutdown, stats) = dispatcher(1_000, 1);
        drop(rx);
        assert_eq!(d.run(), DispatchEnd::Stopped);
        assert_eq!(stats.dispatched(), 0);
    }
}
