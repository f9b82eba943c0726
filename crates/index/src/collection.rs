//! Document collections, one per indexed entity kind.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use futures::TryStreamExt;
use reel_media::{EntityClass, Kind, Record};
use serde_json::Value;
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::fmt::{self, Display, Formatter};
use std::ops::ControlFlow;
use tracing::instrument;

/// The field every collection indexes: a file's absolute path.
pub const ABS_PATH: &str = "absPath";

/// Identifies one (class, kind) collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollectionId {
    Audio,
    Video,
    Subtitles,
}

impl CollectionId {
    /// Every collection, in the order loads visit them.
    pub const ALL: [CollectionId; 3] = [CollectionId::Audio, CollectionId::Video, CollectionId::Subtitles];

    pub fn kind(self) -> Kind {
        match self {
            CollectionId::Audio => Kind::AUDIO,
            CollectionId::Video => Kind::VIDEO,
            CollectionId::Subtitles => Kind::SUBTITLES,
        }
    }

    pub fn class(self) -> EntityClass {
        self.kind().class()
    }

    /// Name the collection's documents are stored under.
    pub fn name(self) -> &'static str {
        match self {
            CollectionId::Audio => "media.audio",
            CollectionId::Video => "media.video",
            CollectionId::Subtitles => "support.subtitles",
        }
    }

    pub fn indexed_fields(self) -> &'static [&'static str] {
        &[ABS_PATH]
    }

    pub(crate) fn ordinal(self) -> usize {
        match self {
            CollectionId::Audio => 0,
            CollectionId::Video => 1,
            CollectionId::Subtitles => 2,
        }
    }
}

impl TryFrom<Kind> for CollectionId {
    type Error = crate::error::Error;
    fn try_from(kind: Kind) -> Result<Self> {
        match kind {
            Kind::AUDIO => Ok(CollectionId::Audio),
            Kind::VIDEO => Ok(CollectionId::Video),
            Kind::SUBTITLES => Ok(CollectionId::Subtitles),
            Kind::Unknown => exn::bail!(ErrorKind::UnknownCollection(kind.to_string())),
        }
    }
}

impl Display for CollectionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Handle to a single collection.
///
/// Looking a document up and inserting it are separate statements: callers
/// that need "insert if absent" must make sure nobody else writes the same
/// collection in between.
#[derive(Debug, Clone)]
pub struct Collection {
    pool: SqlitePool,
    id: CollectionId,
}

impl Collection {
    pub(crate) fn new(pool: SqlitePool, id: CollectionId) -> Self {
        Self { pool, id }
    }

    pub fn id(&self) -> CollectionId {
        self.id
    }

    /// Insert a document, returning its store-assigned ID.
    #[instrument(level = "trace", skip(self, record), fields(collection = %self.id))]
    pub async fn insert(&self, record: &Record) -> Result<i64> {
        let body = record.to_json().or_raise(|| ErrorKind::InvalidData)?;
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        let id = sqlx::query(include_str!("../queries/insert_document.sql"))
            .bind(self.id.name())
            .bind(body)
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?
            .last_insert_rowid();
        self.write_index(&mut tx, id, record).await?;
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        Ok(id)
    }

    /// Replace the document stored under `id`, re-indexing it.
    #[instrument(level = "trace", skip(self, record), fields(collection = %self.id))]
    pub async fn update(&self, id: i64, record: &Record) -> Result<()> {
        let body = record.to_json().or_raise(|| ErrorKind::InvalidData)?;
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        let updated = sqlx::query(include_str!("../queries/update_document.sql"))
            .bind(body)
            .bind(id)
            .bind(self.id.name())
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?
            .rows_affected();
        if updated == 0 {
            exn::bail!(ErrorKind::NotFound(id));
        }
        sqlx::query(include_str!("../queries/delete_index_entries.sql"))
            .bind(id)
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        self.write_index(&mut tx, id, record).await?;
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    async fn write_index(&self, tx: &mut Transaction<'_, Sqlite>, id: i64, record: &Record) -> Result<()> {
        for field in self.id.indexed_fields() {
            let value = match record.get(field) {
                None | Some(Value::Null) => continue,
                Some(Value::String(value)) => value.clone(),
                Some(other) => other.to_string(),
            };
            sqlx::query(include_str!("../queries/insert_index_entry.sql"))
                .bind(id)
                .bind(self.id.name())
                .bind(*field)
                .bind(value)
                .execute(&mut **tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
        }
        Ok(())
    }

    pub async fn get(&self, id: i64) -> Result<Option<Record>> {
        let row: Option<(i64, String)> = sqlx::query_as(include_str!("../queries/get_document.sql"))
            .bind(id)
            .bind(self.id.name())
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(|(_, body)| Record::from_json(&body).or_raise(|| ErrorKind::InvalidData)).transpose()
    }

    /// IDs of every document whose indexed `field` equals `value`.
    pub async fn query_eq(&self, field: &str, value: &str) -> Result<Vec<i64>> {
        if !self.id.indexed_fields().contains(&field) {
            exn::bail!(ErrorKind::UndefinedIndex { collection: self.id.to_string(), field: field.to_string() });
        }
        sqlx::query_scalar::<_, i64>(include_str!("../queries/query_index_eq.sql"))
            .bind(self.id.name())
            .bind(field)
            .bind(value)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)
    }

    /// Visit every document in insertion order until the visitor breaks.
    /// Returns the number of documents visited.
    ///
    /// The visitor runs while a connection is held open, so it must not try
    /// to use this store itself.
    pub async fn for_each<F>(&self, mut visit: F) -> Result<u64>
    where
        F: FnMut(i64, Record) -> ControlFlow<()>,
    {
        let mut rows = sqlx::query_as::<_, (i64, String)>(include_str!("../queries/list_documents.sql"))
            .bind(self.id.name())
            .fetch(&self.pool);
        let mut visited = 0;
        while let Some((id, body)) = rows.try_next().await.or_raise(|| ErrorKind::Database)? {
            let record = Record::from_json(&body).or_raise(|| ErrorKind::InvalidData)?;
            visited += 1;
            if visit(id, record).is_break() {
                break;
            }
        }
        Ok(visited)
    }

    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(include_str!("../queries/count_documents.sql"))
            .bind(self.id.name())
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        u64::try_from(count).or_raise(|| ErrorKind::InvalidData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use rstest::rstest;

    fn record(path: &str) -> Record {
        let mut record = Record::new();
        record.insert(ABS_PATH, path).insert("title", "Heat");
        record
    }

    #[rstest]
    #[case(Kind::AUDIO, CollectionId::Audio)]
    #[case(Kind::VIDEO, CollectionId::Video)]
    #[case(Kind::SUBTITLES, CollectionId::Subtitles)]
    fn test_collection_for_kind(#[case] kind: Kind, #[case] expected: CollectionId) {
        let id = CollectionId::try_from(kind).unwrap();
        assert_eq!(id, expected);
        assert_eq!(id.kind(), kind);
    }

    #[tokio::test]
    async fn test_insert_then_query() {
        let db = Database::connect_in_memory().await.unwrap();
        let videos = db.collection(CollectionId::Video);
        let first = videos.insert(&record("/srv/Heat.mkv")).await.unwrap();
        let second = videos.insert(&record("/srv/Ronin.mkv")).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(videos.query_eq(ABS_PATH, "/srv/Heat.mkv").await.unwrap(), vec![first]);
        assert!(videos.query_eq(ABS_PATH, "/srv/Collateral.mkv").await.unwrap().is_empty());
        assert_eq!(videos.get(second).await.unwrap(), Some(record("/srv/Ronin.mkv")));
        assert_eq!(videos.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_collections_are_separate() {
        let db = Database::connect_in_memory().await.unwrap();
        let id = db.collection(CollectionId::Video).insert(&record("/srv/Heat.mkv")).await.unwrap();
        let audio = db.collection(CollectionId::Audio);
        assert!(audio.query_eq(ABS_PATH, "/srv/Heat.mkv").await.unwrap().is_empty());
        assert_eq!(audio.get(id).await.unwrap(), None);
        assert_eq!(audio.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_query_on_unindexed_field_fails() {
        let db = Database::connect_in_memory().await.unwrap();
        let err = db.collection(CollectionId::Audio).query_eq("title", "Heat").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::UndefinedIndex { .. }));
    }

    #[tokio::test]
    async fn test_update_reindexes() {
        let db = Database::connect_in_memory().await.unwrap();
        let subtitles = db.collection(CollectionId::Subtitles);
        let id = subtitles.insert(&record("/srv/Heat.srt")).await.unwrap();
        subtitles.update(id, &record("/srv/Heat.en.srt")).await.unwrap();
        assert!(subtitles.query_eq(ABS_PATH, "/srv/Heat.srt").await.unwrap().is_empty());
        assert_eq!(subtitles.query_eq(ABS_PATH, "/srv/Heat.en.srt").await.unwrap(), vec![id]);
        let err = subtitles.update(id + 100, &record("/srv/nope.srt")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_for_each_stops_early() {
        let db = Database::connect_in_memory().await.unwrap();
        let audio = db.collection(CollectionId::Audio);
        for n in 0..5 {
            audio.insert(&record(&format!("/srv/{n}.mp3"))).await.unwrap();
        }
        let mut seen = Vec::new();
        let visited = audio
            .for_each(|_, record| {
                seen.push(record.str(ABS_PATH).unwrap().to_string());
                if seen.len() == 3 { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
            })
            .await
            .unwrap();
        assert_eq!(visited, 3);
        assert_eq!(seen, ["/srv/0.mp3", "/srv/1.mp3", "/srv/2.mp3"]);
        assert_eq!(audio.for_each(|_, _| ControlFlow::Continue(())).await.unwrap(), 5);
    }
}
