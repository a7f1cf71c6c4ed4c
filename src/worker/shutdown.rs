//! Run-scoped shutdown signal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use crossbeam_channel::{bounded, Receiver, Sender};

/// A one-shot signal raised when a run reaches its terminal state.
///
/// It can be polled through `is_raised`, or waited on in a
/// `crossbeam_channel::select!` through `signal`: raising drops the only
/// sender, which makes the receiver permanently ready.
#[derive(Debug)]
pub struct Shutdown {
    raised: AtomicBool,
    closer: Mutex<Option<Sender<()>>>,
    signal: Receiver<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, rx) = bounded(0);
        Self {
            raised: AtomicBool::new(false),
            closer: Mutex::new(Some(tx)),
            signal: rx,
        }
    }

    /// Raises the signal. Returns `true` only for the call that raised it.
    pub fn raise(&self) -> bool {
        if self.raised.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.closer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        true
    }

    #[inline]
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    /// Receiver that becomes disconnected once the signal is raised.
    pub fn signal(&self) -> &Receiver<()> {
        &self.signal
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
