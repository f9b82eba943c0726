//! Store connection and pool management.

use crate::collection::{Collection, CollectionId};
use crate::error::{ErrorKind, Result};
use crate::tally::Tally;
use exn::ResultExt;
use reel_media::Kind;
use sqlx::SqliteConnection;
use sqlx::pool::PoolConnectionMetadata;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::instrument;

/// Embedded migrations that are run automatically on connect.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
// Load and scan of one library never overlap, so a handful is plenty.
const MAX_CONNECTIONS: u32 = 4;
const STORE_EXTENSION: &str = "sqlite3";

/// The file name of the store backing the library rooted at `root`.
///
/// The root's base name keeps the file recognisable; the hash of the full
/// path keeps two libraries called "Movies" apart.
pub fn store_name(root: &Path) -> String {
    let name = root.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_else(|| "root".to_string());
    let hash = blake3::hash(root.as_os_str().as_encoded_bytes()).to_hex();
    format!("{name}-{}.{STORE_EXTENSION}", &hash.as_str()[..16])
}

/// A library's document store.
///
/// Cloning is cheap: clones share the connection pool and the tally.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    path: Option<PathBuf>,
    first_appearance: bool,
    tally: Arc<Tally>,
}

impl Database {
    async fn new(
        options: SqliteConnectOptions,
        max: Option<u32>,
        path: Option<PathBuf>,
        first_appearance: bool,
    ) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            // Query-based PRAGMAs must run on every pooled connection, not
            // just the first one handed out.
            .after_connect(|conn, meta| Box::pin(async move { Self::apply_pragmas(conn, meta).await }))
            .max_connections(max.unwrap_or(MAX_CONNECTIONS))
            .connect_with(options)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let db = Self { pool, path, first_appearance, tally: Arc::default() };
        db.migrate().await?;
        Ok(db)
    }

    /// Open (or create) the store for the library rooted at `root`, inside
    /// `data_dir`. The directory is created if it doesn't exist.
    pub async fn open(data_dir: impl AsRef<Path>, root: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        tokio::fs::create_dir_all(data_dir).await.or_raise(|| ErrorKind::Storage(data_dir.to_path_buf()))?;
        Self::connect(data_dir.join(store_name(root.as_ref()))).await
    }

    /// Connect to the store at the given path.
    ///
    /// Creates the file if it doesn't exist (a "first appearance") and runs
    /// migrations.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let exists = tokio::fs::try_exists(path).await.or_raise(|| ErrorKind::Storage(path.to_path_buf()))?;
        let options = Self::base_options().filename(path).create_if_missing(true);
        Self::new(options, None, Some(path.to_path_buf()), !exists).await
    }

    /// Connect to an in-memory store (useful for testing).
    ///
    /// Do NOT apply `#[cfg(test)]` so that other crates can also use this in
    /// their tests. An in-memory store is always a first appearance.
    pub async fn connect_in_memory() -> Result<Self> {
        let options = Self::base_options().filename(":memory:");
        // Every connection to ":memory:" is its own database.
        Self::new(options, Some(1), None, true).await
    }

    fn base_options() -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .foreign_keys(true)
            .synchronous(SqliteSynchronous::Normal)
            // A scan inserts one document at a time while a concurrent
            // reader (the UI) may be walking the same collection.
            .busy_timeout(std::time::Duration::from_millis(1500))
    }

    async fn apply_pragmas(conn: &mut SqliteConnection, _meta: PoolConnectionMetadata) -> sqlx::Result<()> {
        sqlx::query(
            r#"
                PRAGMA wal_autocheckpoint = 800;
                PRAGMA cache_size = -8192;
                PRAGMA temp_store = MEMORY;
            "#,
        )
        .execute(conn)
        .await?;
        Ok(())
    }

    #[instrument("performing store migrations", skip(self))]
    async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await.or_raise(|| ErrorKind::Migration)
    }

    /// `true` if the store did not exist before it was opened, meaning there
    /// is provably nothing in it to load.
    pub fn is_first_appearance(&self) -> bool {
        self.first_appearance
    }

    /// Location of the store on disk, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    pub fn collection(&self, id: CollectionId) -> Collection {
        Collection::new(self.pool.clone(), id)
    }

    /// The collection for an entity kind; the unknown kind has none.
    pub fn collection_for(&self, kind: Kind) -> Result<Collection> {
        Ok(self.collection(CollectionId::try_from(kind)?))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the connection pool, waiting for connections to be returned.
    pub async fn close(&self) {
        // Let SQLite update query planner statistics
        _ = sqlx::query("PRAGMA optimize").execute(&self.pool).await;
        self.pool.close().await;
    }
}

impl Display for Database {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}", path.display()),
            None => f.write_str(":memory:"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_in_memory() {
        let db = Database::connect_in_memory().await.unwrap();
        assert!(!db.pool().is_closed());
        assert!(db.is_first_appearance());
        assert_eq!(db.to_string(), ":memory:");
        db.close().await;
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = Database::connect_in_memory().await.unwrap();
        db.migrate().await.unwrap();
        db.close().await;
    }

    #[tokio::test]
    async fn test_first_appearance_only_once() {
        let data = tempfile::tempdir().unwrap();
        let root = Path::new("/srv/media/Movies");
        let db = Database::open(data.path().join("libraries"), root).await.unwrap();
        assert!(db.is_first_appearance());
        assert!(db.path().unwrap().starts_with(data.path().join("libraries")));
        db.close().await;
        let db = Database::open(data.path().join("libraries"), root).await.unwrap();
        assert!(!db.is_first_appearance());
        db.close().await;
    }

    #[test]
    fn test_store_name_distinguishes_same_base_name() {
        let a = store_name(Path::new("/srv/a/Movies"));
        let b = store_name(Path::new("/srv/b/Movies"));
        assert!(a.starts_with("Movies-"));
        assert!(a.ends_with(".sqlite3"));
        assert_ne!(a, b);
        assert_eq!(a, store_name(Path::new("/srv/a/Movies")));
    }

    #[tokio::test]
    async fn test_unknown_kind_has_no_collection() {
        let db = Database::connect_in_memory().await.unwrap();
        let err = db.collection_for(Kind::Unknown).unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnknownCollection(_)));
        assert!(db.collection_for(Kind::VIDEO).is_ok());
    }
}
