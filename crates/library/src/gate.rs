use crate::busy::BusyState;
use crate::error::{ErrorKind, Result};
use derive_more::Display;
use exn::ResultExt;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::sync::{Semaphore, SemaphorePermit};

/// How many operations of one kind may run against a library at once.
pub const MAX_IN_FLIGHT: usize = 1;

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum Operation {
    #[display("load")]
    Load,
    #[display("scan")]
    Scan,
}

/// Non-blocking admission for one kind of library operation.
///
/// Admission either succeeds immediately or fails with
/// [`ErrorKind::LibraryBusy`]; nobody ever waits in line.
#[derive(Debug)]
pub(crate) struct Gate {
    operation: Operation,
    slots: Semaphore,
}

impl Gate {
    pub(crate) fn new(operation: Operation) -> Self {
        Self { operation, slots: Semaphore::new(MAX_IN_FLIGHT) }
    }

    pub(crate) fn try_admit<'a>(&'a self, busy: &'a BusyState, library: &Path) -> Result<Admission<'a>> {
        let permit = self.slots.try_acquire().or_raise(|| ErrorKind::LibraryBusy {
            operation: self.operation,
            path: library.to_path_buf(),
            max: MAX_IN_FLIGHT,
        })?;
        busy.increment();
        Ok(Admission { _permit: permit, busy, started: Instant::now() })
    }

    pub(crate) fn is_occupied(&self) -> bool {
        self.slots.available_permits() < MAX_IN_FLIGHT
    }
}

/// Proof of admission. Dropping it, on any path, frees the slot and
/// decrements the busy gauge.
#[must_use]
pub(crate) struct Admission<'a> {
    _permit: SemaphorePermit<'a>,
    busy: &'a BusyState,
    started: Instant,
}

impl Admission<'_> {
    pub(crate) fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Drop for Admission<'_> {
    fn drop(&mut self) {
        self.busy.decrement();
    }
}
