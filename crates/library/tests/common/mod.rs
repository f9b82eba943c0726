#![allow(dead_code)]

use reel_index::{ABS_PATH, CollectionId};
use reel_library::{Context, Library, PathHandler, RecordId};
use reel_media::{Media, Record, Subtitles};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// Create a temporary directory tree containing `files` (relative paths).
pub fn tree(files: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    add(dir.path(), files);
    dir
}

pub fn add(root: &Path, files: &[&str]) {
    for file in files {
        let path = root.join(file);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, file.as_bytes()).unwrap();
    }
}

pub async fn open(ctx: &Context, root: &Path, max_depth: u32) -> Library {
    Library::open(ctx, root, max_depth, &[]).await.unwrap()
}

pub async fn documents(library: &Library, collection: CollectionId) -> Vec<(i64, Record)> {
    let mut documents = Vec::new();
    library
        .database()
        .collection(collection)
        .for_each(|id, record| {
            documents.push((id, record));
            ControlFlow::Continue(())
        })
        .await
        .unwrap();
    documents
}

pub async fn indexed_paths(library: &Library, collection: CollectionId) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> =
        documents(library, collection).await.into_iter().map(|(_, record)| record.path(ABS_PATH).unwrap()).collect();
    paths.sort();
    paths
}

pub async fn subtitles(library: &Library, name: &str) -> Subtitles {
    documents(library, CollectionId::Subtitles)
        .await
        .into_iter()
        .filter_map(|(_, record)| Subtitles::try_from(&record).ok())
        .find(|subtitles| subtitles.file.file_name() == name)
        .unwrap()
}

pub async fn video(library: &Library, name: &str) -> Media {
    documents(library, CollectionId::Video)
        .await
        .into_iter()
        .filter_map(|(_, record)| Media::try_from(&record).ok())
        .find(|media| media.file.file_name() == name)
        .unwrap()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Seen {
    Media(PathBuf, i64),
    Support(PathBuf, i64),
    Other(PathBuf),
}

/// Remembers every callback, in order.
#[derive(Debug, Default)]
pub struct Recorder {
    seen: Mutex<Vec<Seen>>,
}

impl Recorder {
    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    pub fn media(&self) -> usize {
        self.seen().iter().filter(|seen| matches!(seen, Seen::Media(..))).count()
    }

    pub fn support(&self) -> usize {
        self.seen().iter().filter(|seen| matches!(seen, Seen::Support(..))).count()
    }

    pub fn other(&self) -> usize {
        self.seen().iter().filter(|seen| matches!(seen, Seen::Other(..))).count()
    }
}

impl PathHandler for Recorder {
    fn media(&self, _library: &Library, path: &Path, media: RecordId<&Media>) {
        assert_eq!(path, media.entity.path());
        self.seen.lock().unwrap().push(Seen::Media(path.to_path_buf(), media.id));
    }

    fn support(&self, _library: &Library, path: &Path, subtitles: RecordId<&Subtitles>) {
        assert_eq!(path, subtitles.entity.path());
        self.seen.lock().unwrap().push(Seen::Support(path.to_path_buf(), subtitles.id));
    }

    fn other(&self, _library: &Library, path: &Path) {
        self.seen.lock().unwrap().push(Seen::Other(path.to_path_buf()));
    }
}
