use super::{FileAttrs, expect_kind};
use crate::error::{Error, ErrorKind, Result};
use crate::kind::Kind;
use crate::record::{Record, path_value};
use std::path::{Path, PathBuf};

/// A subtitle file.
///
/// Subtitles are "orphaned" until they are associated with at least one
/// video.
#[derive(Clone, Debug, PartialEq)]
pub struct Subtitles {
    pub file: FileAttrs,
    pub known_videos: Vec<PathBuf>,
}

impl Subtitles {
    pub fn new(file: FileAttrs) -> Result<Self> {
        if file.kind() != Kind::SUBTITLES {
            exn::bail!(ErrorKind::KindMismatch { expected: Kind::SUBTITLES.to_string(), found: file.kind().to_string() });
        }
        Ok(Self { file, known_videos: Vec::new() })
    }

    pub fn path(&self) -> &Path {
        &self.file.abs_path
    }

    pub fn is_orphan(&self) -> bool {
        self.known_videos.is_empty()
    }

    /// Returns `true` if the video was not already known.
    pub fn associate_video(&mut self, path: &Path) -> bool {
        if self.known_videos.iter().any(|known| known == path) {
            return false;
        }
        self.known_videos.push(path.to_path_buf());
        true
    }
}

impl TryFrom<&Subtitles> for Record {
    type Error = Error;
    fn try_from(subtitles: &Subtitles) -> Result<Self> {
        let mut record = Record::new();
        subtitles.file.write(&mut record)?;
        let known = subtitles.known_videos.iter().map(|p| path_value("knownVideos", p)).collect::<Result<Vec<_>>>()?;
        record.insert("knownVideos", known);
        Ok(record)
    }
}

impl TryFrom<&Record> for Subtitles {
    type Error = Error;
    fn try_from(record: &Record) -> Result<Self> {
        let file = FileAttrs::read(record)?;
        expect_kind(file.kind(), |kind| kind == Kind::SUBTITLES, Kind::SUBTITLES.as_str())?;
        Ok(Self { file, known_videos: record.paths("knownVideos")? })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::tests::attrs;

    #[test]
    fn test_round_trip() {
        let mut subtitles = Subtitles::new(attrs("Heat (1995)/Heat.srt")).unwrap();
        assert!(subtitles.is_orphan());
        assert!(subtitles.associate_video(Path::new("/srv/media/Heat (1995)/Heat.mkv")));
        assert!(!subtitles.associate_video(Path::new("/srv/media/Heat (1995)/Heat.mkv")));
        let record = Record::try_from(&subtitles).unwrap();
        let restored = Subtitles::try_from(&record).unwrap();
        assert_eq!(restored, subtitles);
        assert_eq!(restored.file.size, 734_003_200);
        assert!(!restored.is_orphan());
    }

    #[test]
    fn test_media_record_is_not_subtitles() {
        let media = crate::Media::new(attrs("Heat.mkv")).unwrap();
        let record = Record::try_from(&media).unwrap();
        let err = Subtitles::try_from(&record).unwrap_err();
        assert!(matches!(&*err, ErrorKind::KindMismatch { .. }));
    }
}
