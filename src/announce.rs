//! Stand-in for the interactive front end: collects every discovery the
//! libraries announce into an in-memory view.

use reel_library::{Discovery, DiscoveryMethod, Library, PathHandler, RecordId};
use reel_media::{Entity, Media, Subtitles};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

pub type Feed = mpsc::UnboundedReceiver<Discovery<Entity>>;

/// Forwards everything a load or scan comes across to the view.
#[derive(Debug, Clone)]
pub struct Announcer {
    method: DiscoveryMethod,
    sender: mpsc::UnboundedSender<Discovery<Entity>>,
}

impl Announcer {
    pub fn channel() -> (mpsc::UnboundedSender<Discovery<Entity>>, Feed) {
        mpsc::unbounded_channel()
    }

    pub fn new(method: DiscoveryMethod, sender: mpsc::UnboundedSender<Discovery<Entity>>) -> Self {
        Self { method, sender }
    }

    fn announce(&self, id: i64, entity: Entity) {
        // The view only goes away once every library has finished.
        _ = self.sender.send(Discovery::new(self.method, RecordId::new(id, entity)));
    }
}

impl PathHandler for Announcer {
    fn media(&self, _library: &Library, _path: &Path, media: RecordId<&Media>) {
        self.announce(media.id, Entity::Media(media.entity.clone()));
    }

    fn support(&self, _library: &Library, _path: &Path, subtitles: RecordId<&Subtitles>) {
        self.announce(subtitles.id, Entity::Subtitles(subtitles.entity.clone()));
    }

    fn other(&self, library: &Library, path: &Path) {
        tracing::trace!(library = %library.name(), path = %path.display(), method = %self.method, "Ignoring unclassified file");
    }
}

/// The latest known state of every announced file.
#[derive(Debug, Default)]
pub struct View {
    entities: HashMap<PathBuf, Discovery<Entity>>,
}

impl View {
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn count(&self, method: DiscoveryMethod) -> usize {
        self.entities.values().filter(|discovery| discovery.method == method).count()
    }

    fn insert(&mut self, discovery: Discovery<Entity>) {
        tracing::trace!(
            id = discovery.record.id,
            method = %discovery.method,
            at = %discovery.at,
            path = %discovery.record.entity.path().display(),
            "Discovered {}",
            discovery.record.entity.kind(),
        );
        self.entities.insert(discovery.record.entity.path().to_path_buf(), discovery);
    }
}

/// Drain the feed until every announcer has been dropped.
pub async fn consume(mut feed: Feed) -> View {
    let mut view = View::default();
    while let Some(discovery) = feed.recv().await {
        view.insert(discovery);
    }
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_media::{FileAttrs, FileStat, classify};
    use time::OffsetDateTime;

    fn discovery(method: DiscoveryMethod, path: &str) -> Discovery<Entity> {
        let stat = FileStat { size: 1, mode: 0o644, modified: OffsetDateTime::UNIX_EPOCH };
        let entity = Entity::new(FileAttrs::new(path, path.trim_start_matches('/'), stat, classify("mkv"))).unwrap();
        Discovery::new(method, RecordId::new(1, entity))
    }

    #[tokio::test]
    async fn test_view_keeps_latest_discovery_per_path() {
        let (sender, feed) = Announcer::channel();
        sender.send(discovery(DiscoveryMethod::Load, "/srv/Heat.mkv")).unwrap();
        sender.send(discovery(DiscoveryMethod::Load, "/srv/Ronin.mkv")).unwrap();
        sender.send(discovery(DiscoveryMethod::Scan, "/srv/Heat.mkv")).unwrap();
        drop(sender);
        let view = consume(feed).await;
        assert_eq!(view.len(), 2);
        assert_eq!(view.count(DiscoveryMethod::Load), 1);
        assert_eq!(view.count(DiscoveryMethod::Scan), 1);
    }
}
