use crate::collection::CollectionId;
use derive_more::Display;
use std::sync::atomic::{AtomicU64, Ordering};

/// How an entity came to be known.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum DiscoveryMethod {
    /// Rehydrated from the store.
    #[display("load")]
    Load,
    /// Found by walking the library on disk.
    #[display("scan")]
    Scan,
}

impl DiscoveryMethod {
    fn ordinal(self) -> usize {
        match self {
            DiscoveryMethod::Load => 0,
            DiscoveryMethod::Scan => 1,
        }
    }
}

/// Running per-collection counts of entities discovered by each method.
///
/// Counters are independent atomics; a summary read while a scan is running
/// is a snapshot of each counter, not of the whole tally.
#[derive(Debug, Default)]
pub struct Tally {
    counts: [[AtomicU64; 3]; 2],
}

impl Tally {
    fn counter(&self, method: DiscoveryMethod, collection: CollectionId) -> &AtomicU64 {
        &self.counts[method.ordinal()][collection.ordinal()]
    }

    pub fn increment(&self, method: DiscoveryMethod, collection: CollectionId) -> u64 {
        self.counter(method, collection).fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn set(&self, method: DiscoveryMethod, collection: CollectionId, count: u64) {
        self.counter(method, collection).store(count, Ordering::Relaxed);
    }

    pub fn reset(&self, method: DiscoveryMethod) {
        for collection in CollectionId::ALL {
            self.set(method, collection, 0);
        }
    }

    pub fn get(&self, method: DiscoveryMethod, collection: CollectionId) -> u64 {
        self.counter(method, collection).load(Ordering::Relaxed)
    }

    pub fn total(&self, method: DiscoveryMethod) -> u64 {
        CollectionId::ALL.into_iter().map(|collection| self.get(method, collection)).sum()
    }

    /// The total for `method`, and a human-readable breakdown such as
    /// `"2 audio, 1 video"`. Empty collections are left out.
    pub fn summary(&self, method: DiscoveryMethod) -> (u64, String) {
        let parts: Vec<String> = CollectionId::ALL
            .into_iter()
            .filter_map(|collection| match self.get(method, collection) {
                0 => None,
                n => Some(format!("{n} {}", collection.kind())),
            })
            .collect();
        (self.total(method), parts.join(", "))
    }
}
