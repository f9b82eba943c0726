//! Media libraries: rooted directory trees kept in sync with an index.
//!
//! A [`Library`] is opened once per configured root. Its lifecycle is two
//! phases, run by [`orchestrate::populate`]:
//!
//! 1. **Load** ([`Library::load`]) republishes everything the index already
//!    knows about, without touching the filesystem.
//! 2. **Scan** ([`Library::scan`]) walks the tree, classifies every file, and
//!    indexes the ones the index has never seen. Once the walk is done,
//!    orphaned subtitles are matched up with videos
//!    ([`Library::reconcile`]).
//!
//! Each phase is guarded by its own single-slot gate, so a second load or
//! scan of the same library is refused (never queued) while one is running.
//! Every admitted operation is counted on the shared [`BusyState`].

mod busy;
pub mod error;
mod gate;
mod handler;
mod library;
mod load;
pub mod orchestrate;
mod reconcile;
mod scan;

pub use crate::busy::BusyState;
pub use crate::gate::{MAX_IN_FLIGHT, Operation};
pub use crate::handler::{Discovery, PathHandler, RecordId};
pub use crate::library::{Library, Outcome};
pub use crate::reconcile::Reconciliation;
pub use reel_index::DiscoveryMethod;
use std::path::PathBuf;
use std::sync::Arc;

/// State shared by every library in the process.
#[derive(Debug, Clone)]
pub struct Context {
    /// Directory holding one index store per library.
    pub data_dir: PathBuf,
    pub busy: Arc<BusyState>,
    /// Whether the user already asked for detailed output; used to decide if
    /// hints about raising verbosity are worth printing.
    pub verbose: bool,
}

impl Context {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into(), busy: Arc::default(), verbose: false }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}
