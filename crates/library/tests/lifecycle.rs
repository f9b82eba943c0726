mod common;

use common::{add, open, tree};
use reel_library::error::ErrorKind;
use reel_library::orchestrate::{join_all, populate};
use reel_library::{BusyState, Context, DiscoveryMethod, Library, PathHandler, RecordId};
use reel_media::{Media, Subtitles};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier, Mutex};

#[tokio::test]
async fn test_open_names_library_after_root() {
    let parent = tempfile::tempdir().unwrap();
    add(parent.path(), &["Films/Heat.mkv"]);
    let data = tempfile::tempdir().unwrap();
    let ctx = Context::new(data.path());

    let library = open(&ctx, &parent.path().join("Films"), 3).await;

    assert_eq!(library.name(), "Films");
    assert_eq!(library.max_depth(), 3);
    assert!(library.root().is_absolute());
    assert!(!library.is_loading());
    assert!(!library.is_scanning());
    assert!(library.last_scan().is_none());
    let store = library.database().path().unwrap();
    assert!(store.starts_with(data.path()));
    assert!(store.file_name().unwrap().to_string_lossy().starts_with("Films-"));
}

#[tokio::test]
async fn test_open_rejects_duplicate_roots() {
    let root = tree(&["Heat.mkv"]);
    let data = tempfile::tempdir().unwrap();
    let ctx = Context::new(data.path());
    let first = Arc::new(open(&ctx, root.path(), 0).await);

    let again = Library::open(&ctx, root.path().join("."), 0, &[Arc::clone(&first)]).await.unwrap_err();

    assert!(matches!(&*again, ErrorKind::DuplicateLibrary(path) if path == first.root()));
}

#[tokio::test]
async fn test_open_rejects_invalid_roots() {
    let root = tree(&["Heat.mkv"]);
    let data = tempfile::tempdir().unwrap();
    let ctx = Context::new(data.path());

    for path in [root.path().join("missing"), root.path().join("Heat.mkv")] {
        let err = Library::open(&ctx, &path, 0, &[]).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidLibrary(_)), "{path:?}: {err:?}");
    }
}

/// Records the phase of every callback into a log shared by both phases.
struct Tagged {
    method: DiscoveryMethod,
    log: Arc<Mutex<Vec<DiscoveryMethod>>>,
}

impl PathHandler for Tagged {
    fn media(&self, _library: &Library, _path: &Path, _media: RecordId<&Media>) {
        self.log.lock().unwrap().push(self.method);
    }

    fn support(&self, _library: &Library, _path: &Path, _subtitles: RecordId<&Subtitles>) {
        self.log.lock().unwrap().push(self.method);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_populate_scans_after_loading() {
    let root = tree(&["Heat.mkv", "Heat.srt", "Blue Train.flac"]);
    let data = tempfile::tempdir().unwrap();
    {
        let ctx = Context::new(data.path());
        let library = open(&ctx, root.path(), 0).await;
        library.scan(&()).await.unwrap();
        library.database().close().await;
    }
    add(root.path(), &["Ronin.mkv", "Ronin.srt"]);

    let ctx = Context::new(data.path());
    let library = Arc::new(open(&ctx, root.path(), 0).await);
    let log = Arc::new(Mutex::new(Vec::new()));
    let tasks = populate(&ctx, &[Arc::clone(&library)], |method| Tagged { method, log: Arc::clone(&log) });
    let mut results = join_all(tasks).await;

    let populated = results.pop().unwrap().unwrap();
    assert_eq!((populated.loaded, populated.found, populated.total()), (3, 2, 5));
    assert!(Arc::ptr_eq(&populated.library, &library));
    let log = log.lock().unwrap().clone();
    assert_eq!(
        log,
        [[DiscoveryMethod::Load; 3].as_slice(), [DiscoveryMethod::Scan; 2].as_slice()].concat(),
    );
    assert_eq!(ctx.busy.count(), 0);
}

#[tokio::test]
async fn test_populate_skips_load_for_new_libraries() {
    let root = tree(&["Heat.mkv", "Heat.srt"]);
    let data = tempfile::tempdir().unwrap();
    let ctx = Context::new(data.path());
    let library = Arc::new(open(&ctx, root.path(), 0).await);
    let log = Arc::new(Mutex::new(Vec::new()));

    let tasks = populate(&ctx, &[Arc::clone(&library)], |method| Tagged { method, log: Arc::clone(&log) });
    let populated = join_all(tasks).await.pop().unwrap().unwrap();

    assert_eq!((populated.loaded, populated.found), (0, 2));
    assert_eq!(*log.lock().unwrap(), [DiscoveryMethod::Scan; 2]);
    assert!(library.last_scan().is_some());
    assert!(library.load_elapsed().is_zero());
}

#[tokio::test]
async fn test_populate_empty_library() {
    let root = tree(&["README.md"]);
    let data = tempfile::tempdir().unwrap();
    let ctx = Context::new(data.path());
    let library = Arc::new(open(&ctx, root.path(), 0).await);

    let tasks = populate(&ctx, &[library], |_| ());
    let populated = join_all(tasks).await.pop().unwrap().unwrap();

    assert_eq!(populated.total(), 0);
}

/// Holds every library's scan open until all of them have been admitted.
struct Rendezvous {
    busy: Arc<BusyState>,
    barrier: Arc<Barrier>,
    observed: Arc<Mutex<Vec<u64>>>,
    waited: AtomicBool,
}

impl PathHandler for Rendezvous {
    fn media(&self, _library: &Library, _path: &Path, _media: RecordId<&Media>) {
        if self.waited.swap(true, Ordering::SeqCst) {
            return;
        }
        // First rendezvous: every scan has been admitted. Second: every
        // count has been read, so nobody can have finished in between.
        self.barrier.wait();
        self.observed.lock().unwrap().push(self.busy.count());
        self.barrier.wait();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_busy_counts_every_admitted_operation() {
    const LIBRARIES: usize = 3;
    let data = tempfile::tempdir().unwrap();
    let ctx = Context::new(data.path());
    let cycles = ctx.busy.subscribe();
    let barrier = Arc::new(Barrier::new(LIBRARIES));
    let observed = Arc::new(Mutex::new(Vec::new()));
    let roots: Vec<_> = (0..LIBRARIES).map(|_| tree(&["Heat.mkv"])).collect();
    let mut scans = Vec::new();
    for root in &roots {
        let library = Arc::new(open(&ctx, root.path(), 0).await);
        let handler = Rendezvous {
            busy: Arc::clone(&ctx.busy),
            barrier: Arc::clone(&barrier),
            observed: Arc::clone(&observed),
            waited: AtomicBool::new(false),
        };
        scans.push(tokio::spawn(async move { library.scan(&handler).await.map(|outcome| outcome.total) }));
    }

    for scan in scans {
        assert_eq!(scan.await.unwrap().unwrap(), 1);
    }

    assert_eq!(*observed.lock().unwrap(), [LIBRARIES as u64; LIBRARIES]);
    assert_eq!(ctx.busy.count(), 0);
    assert!(!ctx.busy.is_busy());
    assert!(cycles.has_changed().unwrap());
    assert_eq!(*cycles.borrow(), 0);
}
