use super::{FileAttrs, expect_kind};
use crate::error::{Error, ErrorKind, Result};
use crate::kind::{Kind, MediaKind};
use crate::record::{Record, format_time, path_value};
use serde_json::Value;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

/// User-facing metadata for playable media.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaInfo {
    pub title: String,
    pub description: Option<String>,
    pub release_date: Option<OffsetDateTime>,
    pub playback_command: Option<String>,
}

/// Fields that only make sense for one kind of media.
#[derive(Clone, Debug, PartialEq)]
pub enum MediaDetails {
    Audio {
        album: Option<String>,
        track: Option<u32>,
    },
    Video {
        /// Every subtitle file believed to belong to this video.
        known_subtitles: Vec<PathBuf>,
        /// The subtitle file currently selected for playback.
        subtitles: Option<PathBuf>,
    },
}

impl MediaDetails {
    fn empty(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Audio => MediaDetails::Audio { album: None, track: None },
            MediaKind::Video => MediaDetails::Video { known_subtitles: Vec::new(), subtitles: None },
        }
    }
}

/// A playable audio or video file.
#[derive(Clone, Debug, PartialEq)]
pub struct Media {
    pub file: FileAttrs,
    pub info: MediaInfo,
    pub details: MediaDetails,
}

impl Media {
    /// Build media for a newly discovered file; the title defaults to the
    /// file name until something better is known.
    pub fn new(file: FileAttrs) -> Result<Self> {
        let Kind::Media(kind) = file.kind() else {
            exn::bail!(ErrorKind::KindMismatch { expected: "media".to_string(), found: file.kind().to_string() });
        };
        let info = MediaInfo { title: file.file_name(), description: None, release_date: None, playback_command: None };
        Ok(Self { file, info, details: MediaDetails::empty(kind) })
    }

    pub fn kind(&self) -> MediaKind {
        match self.details {
            MediaDetails::Audio { .. } => MediaKind::Audio,
            MediaDetails::Video { .. } => MediaKind::Video,
        }
    }

    pub fn path(&self) -> &Path {
        &self.file.abs_path
    }

    pub fn known_subtitles(&self) -> &[PathBuf] {
        match &self.details {
            MediaDetails::Video { known_subtitles, .. } => known_subtitles,
            MediaDetails::Audio { .. } => &[],
        }
    }

    pub fn selected_subtitles(&self) -> Option<&Path> {
        match &self.details {
            MediaDetails::Video { subtitles, .. } => subtitles.as_deref(),
            MediaDetails::Audio { .. } => None,
        }
    }

    /// Record `path` as a candidate subtitle for this video, selecting it if
    /// nothing is selected yet. Returns `true` if anything changed.
    ///
    /// Audio never carries subtitles, so this is a no-op for audio.
    pub fn associate_subtitles(&mut self, path: &Path) -> bool {
        let MediaDetails::Video { known_subtitles, subtitles } = &mut self.details else {
            return false;
        };
        let mut changed = false;
        if !known_subtitles.iter().any(|known| known == path) {
            known_subtitles.push(path.to_path_buf());
            changed = true;
        }
        if subtitles.is_none() {
            *subtitles = Some(path.to_path_buf());
            changed = true;
        }
        changed
    }
}

impl TryFrom<&Media> for Record {
    type Error = Error;
    fn try_from(media: &Media) -> Result<Self> {
        let mut record = Record::new();
        media.file.write(&mut record)?;
        let release_date = match media.info.release_date {
            Some(date) => Value::String(format_time("releaseDate", date)?),
            None => Value::Null,
        };
        record
            .insert("title", media.info.title.as_str())
            .insert("description", media.info.description.clone())
            .insert("releaseDate", release_date)
            .insert("playbackCommand", media.info.playback_command.clone());
        match &media.details {
            MediaDetails::Audio { album, track } => {
                record.insert("album", album.clone()).insert("track", *track);
            },
            MediaDetails::Video { known_subtitles, subtitles } => {
                let known = known_subtitles.iter().map(|p| path_value("knownSubtitles", p)).collect::<Result<Vec<_>>>()?;
                let selected = match subtitles {
                    Some(path) => path_value("subtitles", path)?,
                    None => Value::Null,
                };
                record.insert("knownSubtitles", known).insert("subtitles", selected);
            },
        }
        Ok(record)
    }
}

impl TryFrom<&Record> for Media {
    type Error = Error;
    fn try_from(record: &Record) -> Result<Self> {
        let file = FileAttrs::read(record)?;
        expect_kind(file.kind(), |kind| kind.class() == crate::EntityClass::Media, "media")?;
        let info = MediaInfo {
            title: record.str("title")?.to_string(),
            description: record.optional_str("description")?.map(str::to_string),
            release_date: record.optional_time("releaseDate")?,
            playback_command: record.optional_str("playbackCommand")?.map(str::to_string),
        };
        let details = match file.kind() {
            Kind::AUDIO => MediaDetails::Audio {
                album: record.optional_str("album")?.map(str::to_string),
                track: match record.get("track") {
                    Some(Value::Null) => None,
                    Some(_) => Some(record.u32("track")?),
                    None => exn::bail!(ErrorKind::MissingField("track")),
                },
            },
            _ => MediaDetails::Video {
                known_subtitles: record.paths("knownSubtitles")?,
                subtitles: record.optional_path("subtitles")?,
            },
        };
        Ok(Self { file, info, details })
    }
}
