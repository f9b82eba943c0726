//! Loading: republishing what the index already knows.

use crate::error::{ErrorKind, Result};
use crate::handler::{PathHandler, RecordId};
use crate::library::{Library, Outcome};
use exn::ResultExt;
use reel_index::{CollectionId, DiscoveryMethod};
use reel_media::Entity;
use std::ops::ControlFlow;
use tracing::instrument;

impl Library {
    /// Hand every indexed entity to `handler`, collection by collection,
    /// without touching the filesystem or changing the index.
    ///
    /// Fails immediately with [`ErrorKind::LibraryBusy`] if this library is
    /// already being loaded.
    #[instrument(skip_all, fields(library = %self.name()))]
    pub async fn load<H: PathHandler>(&self, handler: &H) -> Result<Outcome> {
        let admission = self.load_gate.try_admit(&self.busy, self.root())?;
        let tally = self.db.tally();
        tally.reset(DiscoveryMethod::Load);

        let mut result = Ok(());
        for collection in CollectionId::ALL {
            match self.load_collection(handler, collection).await {
                Ok(count) => tally.set(DiscoveryMethod::Load, collection, count),
                Err(err) => {
                    result = Err(err);
                    break;
                },
            }
        }

        let elapsed = admission.elapsed();
        self.record_timings(|timings| timings.load_elapsed += elapsed);
        drop(admission);

        let (total, summary) = tally.summary(DiscoveryMethod::Load);
        if total > 0 {
            tracing::info!(library = %self.name(), "Finished loading ({summary} loaded in {elapsed:.2?})");
        } else {
            tracing::info!(library = %self.name(), "Finished loading (no media loaded in {elapsed:.2?})");
        }
        result?;
        Ok(Outcome { total, elapsed })
    }

    /// Returns how many entities were handed to `handler`. Documents that no
    /// longer describe a valid entity are logged and skipped.
    async fn load_collection<H: PathHandler>(&self, handler: &H, collection: CollectionId) -> Result<u64> {
        let kind = collection.kind();
        let mut loaded = 0;
        self.db
            .collection(collection)
            .for_each(|id, record| {
                let entity = match Entity::from_record(kind, &record) {
                    Ok(entity) => entity,
                    Err(err) => {
                        let err: &reel_media::error::ErrorKind = &err;
                        tracing::warn!(library = %self.name(), id, collection = %collection, "Skipping unreadable document: {err}");
                        return ControlFlow::Continue(());
                    },
                };
                tracing::trace!(library = %self.name(), id, kind = %kind, path = %entity.path().display(), "Loaded file");
                match &entity {
                    Entity::Media(media) => handler.media(self, &media.file.abs_path, RecordId::new(id, media)),
                    Entity::Subtitles(subtitles) => {
                        handler.support(self, &subtitles.file.abs_path, RecordId::new(id, subtitles))
                    },
                }
                loaded += 1;
                ControlFlow::Continue(())
            })
            .await
            .or_raise(|| ErrorKind::Database(self.root().to_path_buf()))?;
        Ok(loaded)
    }
}
