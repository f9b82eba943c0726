use crate::Library;
use reel_index::DiscoveryMethod;
use reel_media::{Media, Subtitles};
use std::path::Path;
use time::OffsetDateTime;

/// A stored entity together with the ID the index assigned it, so whoever
/// receives it never needs a second lookup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecordId<T> {
    pub id: i64,
    pub entity: T,
}

impl<T> RecordId<T> {
    pub fn new(id: i64, entity: T) -> Self {
        Self { id, entity }
    }

    pub fn borrowed(&self) -> RecordId<&T> {
        RecordId { id: self.id, entity: &self.entity }
    }
}

impl<T: Clone> RecordId<&T> {
    pub fn cloned(self) -> RecordId<T> {
        RecordId { id: self.id, entity: self.entity.clone() }
    }
}

/// An entity on its way downstream, stamped with when and how it was found.
/// Never persisted.
#[derive(Clone, Debug)]
pub struct Discovery<T> {
    pub at: OffsetDateTime,
    pub method: DiscoveryMethod,
    pub record: RecordId<T>,
}

impl<T> Discovery<T> {
    pub fn new(method: DiscoveryMethod, record: RecordId<T>) -> Self {
        Self { at: OffsetDateTime::now_utc(), method, record }
    }
}

/// Callbacks invoked as a load or scan comes across files.
///
/// Every method defaults to doing nothing, so implementors only override the
/// ones they care about. Entities are borrowed: a handler that wants to keep
/// one must clone it.
pub trait PathHandler: Send + Sync {
    /// A playable file was loaded or newly indexed.
    fn media(&self, _library: &Library, _path: &Path, _media: RecordId<&Media>) {}
    /// A subtitle file was loaded or newly indexed.
    fn support(&self, _library: &Library, _path: &Path, _subtitles: RecordId<&Subtitles>) {}
    /// A regular file that the library does not index.
    fn other(&self, _library: &Library, _path: &Path) {}
}

impl PathHandler for () {}
