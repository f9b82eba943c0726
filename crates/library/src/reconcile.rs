//! Matching subtitles up with the videos they belong to.
//!
//! The heuristic is conservative: a subtitle belongs to a video
//! when both live in the same directory and their file names are identical
//! up to the extension, ignoring case. `Heat.mkv` claims `heat.SRT`, but not
//! `Heat.en.srt` or `../Heat.srt`.

use crate::error::{ErrorKind, Result};
use crate::handler::RecordId;
use crate::library::Library;
use exn::ResultExt;
use reel_index::{Collection, CollectionId};
use reel_media::{Media, Record, Subtitles};
use std::collections::HashMap;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// What a reconciliation pass did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Subtitles that were considered.
    pub candidates: usize,
    /// Considered subtitles that now have at least one video.
    pub associated: usize,
    /// Considered subtitles that are still orphans.
    pub remaining: usize,
}

type MatchKey = (PathBuf, String);

fn match_key(path: &Path) -> Option<MatchKey> {
    Some((path.parent()?.to_path_buf(), path.file_stem()?.to_string_lossy().to_lowercase()))
}

impl Library {
    /// Associate subtitles with candidate videos, persisting the association
    /// on both sides.
    ///
    /// Only orphaned subtitles are considered unless `force` is set, in which
    /// case every subtitle is re-evaluated. Runs automatically at the end of
    /// every successful [`Library::scan`]. Documents that no longer describe
    /// a valid entity are logged and skipped. Any other failure stops the
    /// pass; the associations already persisted are kept.
    ///
    /// Shares the scan admission, so it fails immediately with
    /// [`ErrorKind::LibraryBusy`] while this library is being scanned.
    #[instrument(skip(self), fields(library = %self.name()))]
    pub async fn reconcile(&self, force: bool) -> Result<Reconciliation> {
        let _admission = self.scan_gate.try_admit(&self.busy, self.root())?;
        self.reconcile_admitted(force).await
    }

    /// The reconciliation pass proper. Callers must hold the scan admission.
    pub(crate) async fn reconcile_admitted(&self, force: bool) -> Result<Reconciliation> {
        self.reconcile_inner(force).await.or_raise(|| ErrorKind::Reconcile)
    }

    async fn reconcile_inner(&self, force: bool) -> Result<Reconciliation> {
        let subtitles = self.db.collection(CollectionId::Subtitles);
        let mut candidates = Vec::new();
        for (id, record) in self.documents(&subtitles).await? {
            let entity = match Subtitles::try_from(&record) {
                Ok(entity) => entity,
                Err(err) => {
                    self.skip_unreadable(id, CollectionId::Subtitles, &err);
                    continue;
                },
            };
            if force || entity.is_orphan() {
                candidates.push(RecordId::new(id, entity));
            }
        }
        let mut outcome = Reconciliation { candidates: candidates.len(), ..Reconciliation::default() };
        if candidates.is_empty() {
            return Ok(outcome);
        }
        if force {
            tracing::debug!(library = %self.name(), "Re-evaluating {} subtitles", candidates.len());
        } else {
            tracing::warn!(library = %self.name(), "Identified {} orphan subtitles", candidates.len());
        }

        let videos = self.db.collection(CollectionId::Video);
        let mut by_key = self.videos_by_key(&videos).await?;
        for RecordId { id, entity: mut subtitle } in candidates {
            let matches = match match_key(subtitle.path()) {
                Some(key) => by_key.get_mut(&key),
                None => None,
            };
            let Some(matches) = matches else {
                outcome.remaining += 1;
                continue;
            };
            let mut changed = false;
            for video in matches.iter_mut() {
                changed |= subtitle.associate_video(video.entity.path());
                if video.entity.associate_subtitles(subtitle.path()) {
                    let record = Record::try_from(&video.entity)
                        .or_raise(|| ErrorKind::InvalidRecord(video.entity.path().into()))?;
                    videos.update(video.id, &record).await.or_raise(|| ErrorKind::Database(video.entity.path().into()))?;
                }
            }
            if changed {
                let record = Record::try_from(&subtitle).or_raise(|| ErrorKind::InvalidRecord(subtitle.path().into()))?;
                subtitles.update(id, &record).await.or_raise(|| ErrorKind::Database(subtitle.path().into()))?;
            }
            tracing::trace!(library = %self.name(), id, path = %subtitle.path().display(), videos = subtitle.known_videos.len(), "Associated subtitles");
            outcome.associated += 1;
        }

        if outcome.remaining > 0 {
            tracing::warn!(
                library = %self.name(),
                "Still unable to associate {} orphan subtitles with any media; consider renaming or moving the files to something more conventional",
                outcome.remaining,
            );
        }
        Ok(outcome)
    }

    /// Every video, grouped by the key subtitles are matched against.
    async fn videos_by_key(&self, videos: &Collection) -> Result<HashMap<MatchKey, Vec<RecordId<Media>>>> {
        let mut by_key: HashMap<MatchKey, Vec<RecordId<Media>>> = HashMap::new();
        for (id, record) in self.documents(videos).await? {
            let media = match Media::try_from(&record) {
                Ok(media) => media,
                Err(err) => {
                    self.skip_unreadable(id, CollectionId::Video, &err);
                    continue;
                },
            };
            if let Some(key) = match_key(media.path()) {
                by_key.entry(key).or_default().push(RecordId::new(id, media));
            }
        }
        Ok(by_key)
    }

    fn skip_unreadable(&self, id: i64, collection: CollectionId, err: &reel_media::error::Error) {
        let err: &reel_media::error::ErrorKind = err;
        tracing::warn!(library = %self.name(), id, collection = %collection, "Skipping unreadable document: {err}");
    }

    async fn documents(&self, collection: &Collection) -> Result<Vec<(i64, Record)>> {
        let mut documents = Vec::new();
        collection
            .for_each(|id, record| {
                documents.push((id, record));
                ControlFlow::Continue(())
            })
            .await
            .or_raise(|| ErrorKind::Database(self.root().into()))?;
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/srv/Heat/Heat.mkv", "/srv/Heat/Heat.srt", true)]
    #[case("/srv/Heat/Heat.mkv", "/srv/Heat/HEAT.SRT", true)]
    #[case("/srv/Heat/Heat.mkv", "/srv/Heat/Heat.en.srt", false)]
    #[case("/srv/Heat/Heat.mkv", "/srv/Heat/Subs/Heat.srt", false)]
    #[case("/srv/Heat/Heat.mkv", "/srv/Ronin/Heat.srt", false)]
    #[case("/srv/Heat/Heat.mkv", "/srv/Heat/unrelated.srt", false)]
    fn test_match_key(#[case] video: &str, #[case] subtitles: &str, #[case] expected: bool) {
        let video = match_key(Path::new(video)).unwrap();
        let subtitles = match_key(Path::new(subtitles)).unwrap();
        assert_eq!(video == subtitles, expected);
    }
}
