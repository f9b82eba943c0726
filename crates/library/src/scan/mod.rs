//! Scanning: walking a library on disk and indexing what is new.

mod walk;

use crate::error::Result;
use crate::handler::PathHandler;
use crate::library::{Library, Outcome};
use reel_index::DiscoveryMethod;
use time::OffsetDateTime;
use tracing::instrument;

impl Library {
    /// Walk the library, indexing every classified file the index has not
    /// seen before and notifying `handler` about each one (and about every
    /// unclassified file). Files already indexed are left alone, so scanning
    /// an unchanged tree twice inserts nothing the second time.
    ///
    /// Problems with individual entries are logged and skipped. A successful
    /// walk is followed by [`Library::reconcile`], whose failure is returned
    /// here after the scan's own bookkeeping is done.
    ///
    /// Fails immediately with [`ErrorKind::LibraryBusy`] if this library is
    /// already being scanned.
    ///
    /// [`ErrorKind::LibraryBusy`]: crate::error::ErrorKind::LibraryBusy
    #[instrument(skip_all, fields(library = %self.name()))]
    pub async fn scan<H: PathHandler>(&self, handler: &H) -> Result<Outcome> {
        let admission = self.scan_gate.try_admit(&self.busy, self.root())?;
        let tally = self.db.tally();
        tally.reset(DiscoveryMethod::Scan);
        tracing::debug!(root = %self.root().display(), max_depth = self.max_depth(), "Scanning library");

        let result = match self.walk(handler, self.root().to_path_buf(), 0).await {
            Ok(()) => self.reconcile_admitted(false).await.map(|_| ()),
            Err(err) => Err(err),
        };

        let elapsed = admission.elapsed();
        self.record_timings(|timings| {
            timings.scan_elapsed += elapsed;
            timings.last_scan = Some(OffsetDateTime::now_utc());
        });
        drop(admission);

        let (total, summary) = tally.summary(DiscoveryMethod::Scan);
        if total > 0 {
            tracing::info!(library = %self.name(), "Finished scanning ({summary} found in {elapsed:.2?})");
        } else {
            tracing::info!(library = %self.name(), "Finished scanning (no new media found in {elapsed:.2?})");
        }
        result?;
        Ok(Outcome { total, elapsed })
    }
}
