use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

/// A process-wide gauge of in-flight library operations.
///
/// It knows nothing about *what* is busy. Admission gates bump the count
/// when an operation starts and drop it when the operation ends; the UI bumps
/// the cycle once per redraw while anything is busy. The cycle restarts at
/// zero whenever the count leaves or returns to zero.
///
/// The two counters are independent atomics, no invariant spans both.
#[derive(Debug)]
pub struct BusyState {
    count: AtomicU64,
    cycle: AtomicU64,
    changed: watch::Sender<u64>,
}

impl Default for BusyState {
    fn default() -> Self {
        Self::new()
    }
}

impl BusyState {
    pub fn new() -> Self {
        let (changed, _) = watch::channel(0);
        Self { count: AtomicU64::new(0), cycle: AtomicU64::new(0), changed }
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }

    pub fn is_busy(&self) -> bool {
        self.count() > 0
    }

    pub fn cycle(&self) -> u64 {
        self.cycle.load(Ordering::SeqCst)
    }

    /// Advance the UI cycle, returning the new value.
    pub fn next_cycle(&self) -> u64 {
        self.cycle.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Observe changes to the busy count instead of polling it.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changed.subscribe()
    }

    pub(crate) fn increment(&self) -> u64 {
        let count = self.count.fetch_add(1, Ordering::SeqCst) + 1;
        if count == 1 {
            self.cycle.store(0, Ordering::SeqCst);
        }
        self.publish();
        count
    }

    pub(crate) fn decrement(&self) -> u64 {
        let count = match self.count.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1)) {
            Ok(previous) => previous - 1,
            Err(_) => {
                tracing::debug!("Busy count decremented below zero; ignoring");
                return 0;
            },
        };
        if count == 0 {
            self.cycle.store(0, Ordering::SeqCst);
        }
        self.publish();
        count
    }

    fn publish(&self) {
        // Re-read under the channel's lock so the last publisher always
        // leaves the current count behind, whatever order racing updates
        // arrive in.
        self.changed.send_modify(|count| *count = self.count.load(Ordering::SeqCst));
    }
}
