//! File classification and typed entities for media libraries.
//!
//! A file discovered inside a library is classified by its extension into a
//! [`Kind`], and (if it is something we index) turned into an [`Entity`].
//! Entities are persisted as a generic, ordered [`Record`] of named fields,
//! and every entity type has a strict two-way mapping to and from that shape.

mod classify;
pub mod entity;
pub mod error;
mod kind;
mod record;

pub use crate::classify::{AUDIO, FileType, SUBTITLES, TypeTable, VIDEO, classify, classify_path};
pub use crate::entity::{Entity, FileAttrs, FileStat, Media, MediaDetails, MediaInfo, Subtitles};
pub use crate::kind::{EntityClass, Kind, MediaKind, SupportKind};
pub use crate::record::Record;
