use crate::error::{Error, ErrorKind, Result};
use crate::handler::{PathHandler, RecordId};
use crate::library::Library;
use exn::{OptionExt, ResultExt};
use futures::future::BoxFuture;
use reel_index::{ABS_PATH, DiscoveryMethod};
use reel_media::{Entity, FileAttrs, FileStat, Record, classify_path};
use std::fs::Metadata;
use std::path::{Path, PathBuf};

impl Library {
    /// Visit one entry found `depth` levels below the root (the root itself
    /// is depth 0, its children depth 1).
    ///
    /// Boxed, because it recurses through [`Library::descend`].
    pub(super) fn walk<'a, H: PathHandler>(
        &'a self,
        handler: &'a H,
        path: PathBuf,
        depth: u32,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let rel = path.strip_prefix(self.root()).or_raise(|| ErrorKind::InvalidPath(path.clone()))?.to_path_buf();
            let meta = tokio::fs::symlink_metadata(&path).await.or_raise(|| ErrorKind::InvalidStat(path.clone()))?;
            let file_type = meta.file_type();
            if file_type.is_dir() {
                return self.descend(handler, &path, depth).await;
            }
            if file_type.is_symlink() {
                exn::bail!(ErrorKind::InvalidFile { path, reason: "symbolic links are not supported" });
            }
            // Devices, pipes, sockets and whatever else the platform has.
            if !file_type.is_file() {
                exn::bail!(ErrorKind::InvalidFile { path, reason: "not a regular file" });
            }
            self.index_file(handler, path, rel, &meta).await
        })
    }

    async fn descend<H: PathHandler>(&self, handler: &H, dir: &Path, depth: u32) -> Result<()> {
        let next = depth + 1;
        if self.max_depth() != 0 && next > self.max_depth() {
            exn::bail!(ErrorKind::DirDepth { path: dir.to_path_buf(), limit: self.max_depth() });
        }
        let mut listing = tokio::fs::read_dir(dir).await.or_raise(|| ErrorKind::DirOpen(dir.to_path_buf()))?;
        let mut children = Vec::new();
        while let Some(entry) = listing.next_entry().await.or_raise(|| ErrorKind::DirOpen(dir.to_path_buf()))? {
            children.push(entry.path());
        }
        // Listing order is whatever the filesystem hands back; sort so that
        // IDs are handed out in the same order on every platform.
        children.sort();
        for child in children {
            if let Err(err) = self.walk(handler, child, next).await {
                self.report(&err);
            }
        }
        Ok(())
    }

    fn report(&self, err: &Error) {
        let kind: &ErrorKind = err;
        if kind.is_informational() {
            tracing::debug!(library = %self.name(), "Skipping entry: {kind}");
        } else {
            tracing::warn!(library = %self.name(), "Skipping entry: {kind}");
        }
    }

    async fn index_file<H: PathHandler>(&self, handler: &H, path: PathBuf, rel: PathBuf, meta: &Metadata) -> Result<()> {
        let file_type = classify_path(&path);
        if !file_type.kind.is_known() {
            handler.other(self, &path);
            return Ok(());
        }
        let collection = self.db.collection_for(file_type.kind).or_raise(|| ErrorKind::Database(path.clone()))?;
        let abs = path.to_str().ok_or_raise(|| ErrorKind::InvalidPath(path.clone()))?;
        let seen = collection.query_eq(ABS_PATH, abs).await.or_raise(|| ErrorKind::Database(path.clone()))?;
        if !seen.is_empty() {
            return Ok(());
        }

        let stat = FileStat::from_metadata(meta).or_raise(|| ErrorKind::InvalidStat(path.clone()))?;
        let entity = Entity::new(FileAttrs::new(path.clone(), rel, stat, file_type))
            .or_raise(|| ErrorKind::InvalidRecord(path.clone()))?;
        let record = Record::try_from(&entity).or_raise(|| ErrorKind::InvalidRecord(path.clone()))?;
        let id = collection.insert(&record).await.or_raise(|| ErrorKind::Database(path.clone()))?;
        self.db.tally().increment(DiscoveryMethod::Scan, collection.id());

        tracing::trace!(library = %self.name(), id, kind = %entity.kind(), path = %path.display(), "Discovered file");
        match &entity {
            Entity::Media(media) => handler.media(self, &path, RecordId::new(id, media)),
            Entity::Subtitles(subtitles) => handler.support(self, &path, RecordId::new(id, subtitles)),
        }
        Ok(())
    }
}
