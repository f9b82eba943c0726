use crate::Context;
use crate::busy::BusyState;
use crate::error::{ErrorKind, Result};
use crate::gate::{Gate, Operation};
use exn::ResultExt;
use reel_index::Database;
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use time::OffsetDateTime;

/// What a load or scan reports back once it has finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Outcome {
    /// Records loaded, or newly inserted by a scan.
    pub total: u64,
    pub elapsed: Duration,
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Timings {
    pub(crate) load_elapsed: Duration,
    pub(crate) scan_elapsed: Duration,
    pub(crate) last_scan: Option<OffsetDateTime>,
}

/// One root directory tree and the store that indexes it.
///
/// A library lives for as long as the process does. Loads and scans are
/// admitted one at a time per kind (see [`Library::load`] and
/// [`Library::scan`]); any number of libraries may run side by side.
#[derive(Debug)]
pub struct Library {
    working_dir: PathBuf,
    root: PathBuf,
    name: String,
    max_depth: u32,
    pub(crate) db: Database,
    pub(crate) busy: Arc<BusyState>,
    pub(crate) load_gate: Gate,
    pub(crate) scan_gate: Gate,
    timings: Mutex<Timings>,
}

impl Library {
    /// Open the library rooted at `root`, creating its store inside the
    /// context's data directory if this is the first time it has been seen.
    ///
    /// `max_depth` limits how many directory levels below the root a scan
    /// visits; zero means unlimited. Fails with
    /// [`ErrorKind::DuplicateLibrary`] if any of `existing` already has the
    /// same canonical root, and [`ErrorKind::InvalidLibrary`] if the root
    /// cannot be resolved or listed, or its store cannot be opened.
    pub async fn open(ctx: &Context, root: impl AsRef<Path>, max_depth: u32, existing: &[Arc<Library>]) -> Result<Self> {
        let root = root.as_ref();
        let invalid = || ErrorKind::InvalidLibrary(root.to_path_buf());
        let working_dir = std::env::current_dir().or_raise(invalid)?;
        let abs = tokio::fs::canonicalize(working_dir.join(root)).await.or_raise(invalid)?;
        if existing.iter().any(|library| library.root == abs) {
            exn::bail!(ErrorKind::DuplicateLibrary(abs));
        }
        let mut listing = tokio::fs::read_dir(&abs).await.or_raise(invalid)?;
        listing.next_entry().await.or_raise(invalid)?;
        let db = Database::open(&ctx.data_dir, &abs).await.or_raise(|| ErrorKind::InvalidLibrary(abs.clone()))?;
        let name = abs.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_else(|| abs.display().to_string());
        tracing::debug!(library = %name, root = %abs.display(), store = %db, first_appearance = db.is_first_appearance(), "Opened library");
        Ok(Self {
            working_dir,
            root: abs,
            name,
            max_depth,
            db,
            busy: Arc::clone(&ctx.busy),
            load_gate: Gate::new(Operation::Load),
            scan_gate: Gate::new(Operation::Scan),
            timings: Mutex::default(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical absolute path of the library root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The working directory at the time the library was opened.
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn is_loading(&self) -> bool {
        self.load_gate.is_occupied()
    }

    pub fn is_scanning(&self) -> bool {
        self.scan_gate.is_occupied()
    }

    /// When the last scan finished, if one has.
    pub fn last_scan(&self) -> Option<OffsetDateTime> {
        self.timings().last_scan
    }

    /// Total time spent loading, across every load so far.
    pub fn load_elapsed(&self) -> Duration {
        self.timings().load_elapsed
    }

    /// Total time spent scanning, across every scan so far.
    pub fn scan_elapsed(&self) -> Duration {
        self.timings().scan_elapsed
    }

    fn timings(&self) -> Timings {
        *self.timings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn record_timings(&self, update: impl FnOnce(&mut Timings)) {
        update(&mut self.timings.lock().unwrap_or_else(PoisonError::into_inner));
    }
}

impl Display for Library {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{{{:?}, {:?}, {}}}", self.name, self.root.display().to_string(), self.db)
    }
}
