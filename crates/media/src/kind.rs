use crate::error::{Error, ErrorKind};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Top-level category of a discovered file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityClass {
    /// Something playable.
    Media,
    /// An auxiliary file that only makes sense alongside media.
    Support,
    Unknown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Audio,
    Video,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SupportKind {
    Subtitles,
}

/// Sub-category of a discovered file within its [`EntityClass`].
///
/// The class is implied by the variant, so a `Kind` can never name a media
/// kind under the support class (or the other way around).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Kind {
    Media(MediaKind),
    Support(SupportKind),
    /// Not something the library indexes.
    #[default]
    Unknown,
}

impl Kind {
    pub const AUDIO: Kind = Kind::Media(MediaKind::Audio);
    pub const VIDEO: Kind = Kind::Media(MediaKind::Video);
    pub const SUBTITLES: Kind = Kind::Support(SupportKind::Subtitles);

    #[must_use]
    pub fn class(self) -> EntityClass {
        match self {
            Kind::Media(_) => EntityClass::Media,
            Kind::Support(_) => EntityClass::Support,
            Kind::Unknown => EntityClass::Unknown,
        }
    }

    #[must_use]
    pub fn is_known(self) -> bool {
        !matches!(self, Kind::Unknown)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Media(MediaKind::Audio) => "audio",
            Kind::Media(MediaKind::Video) => "video",
            Kind::Support(SupportKind::Subtitles) => "subtitles",
            Kind::Unknown => "unknown",
        }
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for EntityClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityClass::Media => "media",
            EntityClass::Support => "support",
            EntityClass::Unknown => "unknown",
        })
    }
}

impl FromStr for Kind {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "audio" => Ok(Kind::AUDIO),
            "video" => Ok(Kind::VIDEO),
            "subtitles" => Ok(Kind::SUBTITLES),
            _ => exn::bail!(ErrorKind::UnknownKind(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Kind::AUDIO, EntityClass::Media)]
    #[case(Kind::VIDEO, EntityClass::Media)]
    #[case(Kind::SUBTITLES, EntityClass::Support)]
    #[case(Kind::Unknown, EntityClass::Unknown)]
    fn test_class(#[case] kind: Kind, #[case] expected: EntityClass) {
        assert_eq!(kind.class(), expected);
    }

    #[rstest]
    #[case("audio", Kind::AUDIO)]
    #[case("Video", Kind::VIDEO)]
    #[case("SUBTITLES", Kind::SUBTITLES)]
    fn test_from_str(#[case] test: &str, #[case] expected: Kind) {
        assert_eq!(test.parse::<Kind>().unwrap(), expected);
        assert_eq!(expected.to_string(), test.to_lowercase());
    }

    #[rstest]
    #[case("unknown")]
    #[case("")]
    #[case("podcast")]
    fn test_from_str_rejects_unindexed_kinds(#[case] test: &str) {
        assert!(test.parse::<Kind>().is_err());
    }
}
