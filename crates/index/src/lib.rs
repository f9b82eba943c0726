//! SQLite-backed document collections for media libraries.
//!
//! Each library owns exactly one store. Inside it, every indexed [`Kind`]
//! has its own collection of JSON documents (see [`reel_media::Record`]),
//! addressed by a store-assigned integer ID. Documents can be looked up by
//! equality on a small set of indexed fields, or visited in full.
//!
//! The store is not the source of truth: the files on disk are. Deleting a
//! store only means the next scan rediscovers everything.
//!
//! [`Kind`]: reel_media::Kind

mod collection;
mod db;
pub mod error;
mod tally;

pub use crate::collection::{ABS_PATH, Collection, CollectionId};
pub use crate::db::{Database, store_name};
pub use crate::tally::{DiscoveryMethod, Tally};
