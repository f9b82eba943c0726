//! Running the load-then-scan lifecycle for many libraries at once.
//!
//! Libraries are fully independent and run in parallel. Within a library
//! the scan task owns the load task's handle and awaits its result before
//! it starts walking, so a scan never overlaps the load it follows.

use crate::error::{ErrorKind, Result};
use crate::handler::PathHandler;
use crate::library::Library;
use crate::{Context, DiscoveryMethod};
use exn::ResultExt;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// How one library came through its load and scan.
#[derive(Debug)]
pub struct Populated {
    pub library: Arc<Library>,
    /// Entities republished from the index.
    pub loaded: u64,
    /// Entities newly found on disk.
    pub found: u64,
}

impl Populated {
    pub fn total(&self) -> u64 {
        self.loaded + self.found
    }
}

/// The running tasks for one library.
#[derive(Debug)]
pub struct LibraryTasks {
    library: Arc<Library>,
    scan: JoinHandle<Result<Populated>>,
}

impl LibraryTasks {
    pub fn library(&self) -> &Arc<Library> {
        &self.library
    }

    pub fn is_finished(&self) -> bool {
        self.scan.is_finished()
    }

    /// Wait for the scan (and therefore the load before it) to finish.
    pub async fn join(self) -> Result<Populated> {
        let root = self.library.root().to_path_buf();
        self.scan.await.or_raise(|| ErrorKind::Interrupted(root))?
    }
}

/// Start loading then scanning every library, returning immediately.
///
/// `make_handler` is asked for one handler per phase per library, tagged
/// with the phase it will be used for. A library whose store was created by
/// this process has nothing to load, so its load phase finishes with zero
/// entities without touching the store. A failed load is logged and does not
/// prevent the scan.
pub fn populate<F, H>(ctx: &Context, libraries: &[Arc<Library>], make_handler: F) -> Vec<LibraryTasks>
where
    F: Fn(DiscoveryMethod) -> H,
    H: PathHandler + 'static,
{
    libraries
        .iter()
        .map(|library| {
            let load = spawn_load(Arc::clone(library), make_handler(DiscoveryMethod::Load));
            let scan = spawn_scan(Arc::clone(library), make_handler(DiscoveryMethod::Scan), load, ctx.verbose);
            LibraryTasks { library: Arc::clone(library), scan }
        })
        .collect()
}

/// Wait for every library, in the order they were started.
pub async fn join_all(tasks: Vec<LibraryTasks>) -> Vec<Result<Populated>> {
    futures::future::join_all(tasks.into_iter().map(LibraryTasks::join)).await
}

fn spawn_load<H: PathHandler + 'static>(library: Arc<Library>, handler: H) -> JoinHandle<Result<u64>> {
    tokio::spawn(async move {
        if library.database().is_first_appearance() {
            tracing::debug!(library = %library.name(), "New library, skipping load");
            return Ok(0);
        }
        Ok(library.load(&handler).await?.total)
    })
}

fn spawn_scan<H: PathHandler + 'static>(
    library: Arc<Library>,
    handler: H,
    load: JoinHandle<Result<u64>>,
    verbose: bool,
) -> JoinHandle<Result<Populated>> {
    tokio::spawn(async move {
        let loaded = match load.await {
            Ok(Ok(loaded)) => loaded,
            Ok(Err(err)) => {
                let kind: &ErrorKind = &err;
                tracing::warn!(library = %library.name(), "Load failed, scanning anyway: {kind}");
                0
            },
            Err(err) => {
                tracing::error!(library = %library.name(), "Load task did not complete: {err}");
                0
            },
        };
        let found = library.scan(&handler).await?.total;
        if loaded + found == 0 {
            tracing::warn!(library = %library.name(), root = %library.root().display(), "No media found: library is empty!");
            if !verbose {
                tracing::info!("Raise the log verbosity to see which files were skipped and why");
            }
        }
        Ok(Populated { library, loaded, found })
    })
}
