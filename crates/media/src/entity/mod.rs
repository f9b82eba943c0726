//! Typed entities for indexed files.
//!
//! Every entity shares a [`FileAttrs`] bundle by composition. Media adds
//! user-facing [`MediaInfo`] and kind-specific [`MediaDetails`]; subtitles
//! only track which videos they are known to belong to.

mod media;
mod subtitles;

pub use self::media::{Media, MediaDetails, MediaInfo};
pub use self::subtitles::Subtitles;
use crate::classify::FileType;
use crate::error::{ErrorKind, Result};
use crate::kind::Kind;
use crate::record::{Record, format_time, path_value};
use exn::ResultExt;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

/// The live attributes of a file, captured at the moment it was inspected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileStat {
    pub size: u64,
    pub mode: u32,
    pub modified: OffsetDateTime,
}

impl FileStat {
    /// Capture attributes from (link-unfollowed) metadata.
    pub fn from_metadata(meta: &Metadata) -> std::io::Result<Self> {
        Ok(Self { size: meta.len(), mode: mode_of(meta), modified: OffsetDateTime::from(meta.modified()?) })
    }
}

#[cfg(unix)]
fn mode_of(meta: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode()
}

#[cfg(not(unix))]
fn mode_of(meta: &Metadata) -> u32 {
    if meta.permissions().readonly() { 0o444 } else { 0o644 }
}

/// Attributes common to every indexed file.
#[derive(Clone, Debug, PartialEq)]
pub struct FileAttrs {
    pub abs_path: PathBuf,
    /// Path relative to the library root.
    pub rel_path: PathBuf,
    pub size: u64,
    pub mode: u32,
    pub modified: OffsetDateTime,
    pub file_type: FileType,
    /// When the file was first indexed.
    pub added: OffsetDateTime,
}

impl FileAttrs {
    pub fn new(abs_path: impl Into<PathBuf>, rel_path: impl Into<PathBuf>, stat: FileStat, file_type: FileType) -> Self {
        Self {
            abs_path: abs_path.into(),
            rel_path: rel_path.into(),
            size: stat.size,
            mode: stat.mode,
            modified: stat.modified,
            file_type,
            added: OffsetDateTime::now_utc(),
        }
    }

    pub fn kind(&self) -> Kind {
        self.file_type.kind
    }

    /// The final component of the path, or an empty string for a bare root.
    pub fn file_name(&self) -> String {
        self.abs_path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default()
    }

    fn write(&self, record: &mut Record) -> Result<()> {
        record
            .insert("absPath", path_value("absPath", &self.abs_path)?)
            .insert("relPath", path_value("relPath", &self.rel_path)?)
            .insert("size", self.size)
            .insert("mode", self.mode)
            .insert("modified", format_time("modified", self.modified)?)
            .insert("kind", self.file_type.kind.as_str())
            .insert("ext", self.file_type.ext.as_str())
            .insert("typeName", self.file_type.name.as_str())
            .insert("added", format_time("added", self.added)?);
        Ok(())
    }

    fn read(record: &Record) -> Result<Self> {
        let kind = record.str("kind")?.parse::<Kind>().or_raise(|| ErrorKind::InvalidField("kind"))?;
        Ok(Self {
            abs_path: record.path("absPath")?,
            rel_path: record.path("relPath")?,
            size: record.u64("size")?,
            mode: record.u32("mode")?,
            modified: record.time("modified")?,
            file_type: FileType::new(kind, record.str("ext")?, record.str("typeName")?),
            added: record.time("added")?,
        })
    }
}

/// Any entity the library indexes.
#[derive(Clone, Debug, PartialEq)]
pub enum Entity {
    Media(Media),
    Subtitles(Subtitles),
}

impl Entity {
    /// Build a fresh entity for a newly discovered file, dispatching on its
    /// classified kind.
    pub fn new(file: FileAttrs) -> Result<Self> {
        match file.kind() {
            Kind::Media(_) => Ok(Entity::Media(Media::new(file)?)),
            Kind::Support(_) => Ok(Entity::Subtitles(Subtitles::new(file)?)),
            Kind::Unknown => exn::bail!(ErrorKind::UnknownKind(file.file_type.ext)),
        }
    }

    /// Rehydrate an entity stored in the collection for `kind`.
    pub fn from_record(kind: Kind, record: &Record) -> Result<Self> {
        let entity = match kind {
            Kind::Media(_) => Entity::Media(Media::try_from(record)?),
            Kind::Support(_) => Entity::Subtitles(Subtitles::try_from(record)?),
            Kind::Unknown => exn::bail!(ErrorKind::UnknownKind(kind.to_string())),
        };
        if entity.kind() != kind {
            exn::bail!(ErrorKind::KindMismatch { expected: kind.to_string(), found: entity.kind().to_string() });
        }
        Ok(entity)
    }

    pub fn file(&self) -> &FileAttrs {
        match self {
            Entity::Media(media) => &media.file,
            Entity::Subtitles(subtitles) => &subtitles.file,
        }
    }

    pub fn kind(&self) -> Kind {
        self.file().kind()
    }

    pub fn path(&self) -> &Path {
        &self.file().abs_path
    }
}

impl TryFrom<&Entity> for Record {
    type Error = crate::error::Error;
    fn try_from(entity: &Entity) -> Result<Self> {
        match entity {
            Entity::Media(media) => Record::try_from(media),
            Entity::Subtitles(subtitles) => Record::try_from(subtitles),
        }
    }
}

/// Reject a record whose `kind` field does not belong where it is being read.
fn expect_kind(found: Kind, accept: impl Fn(Kind) -> bool, expected: &str) -> Result<()> {
    if !accept(found) {
        exn::bail!(ErrorKind::KindMismatch { expected: expected.to_string(), found: found.to_string() });
    }
    Ok(())
}
