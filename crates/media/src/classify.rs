use crate::kind::Kind;
use std::path::Path;

/// Human-readable type names paired with the (lowercase, dot-less) extensions
/// that identify them.
///
/// Some extensions legitimately appear under more than one name (`sub` is
/// used by several subtitle formats); the first entry wins, but only the
/// [`Kind`] the table belongs to is relied upon downstream.
pub type TypeTable = &'static [(&'static str, &'static [&'static str])];

pub const AUDIO: TypeTable = &[
    ("3D Solar UK Ltd", &["ivs"]),
    ("ACT Lossy ADPCM", &["act"]),
    ("Adaptive Multi-Rate", &["amr"]),
    ("Adaptive Multi-Rate Wideband", &["awb"]),
    ("Advanced Audio Coding", &["aac"]),
    ("Apple AIFF", &["aiff"]),
    ("Audible Audiobook", &["aa", "aax"]),
    ("Dialogic ADPCM", &["vox"]),
    ("Digital Speech Standard", &["dss"]),
    ("Electronic Arts IFF-8SVX", &["8svx"]),
    ("Free Lossless Audio Codec", &["flac"]),
    ("GSM Telephony", &["gsm"]),
    ("iKlax Media", &["iklax"]),
    ("Linear PCM", &["sln"]),
    ("Microsoft WAV", &["wav"]),
    ("Microsoft Windows Media Audio", &["wma"]),
    ("Monkey's Audio", &["ape"]),
    ("MPEG Layer III", &["mp3"]),
    ("MPEG-4 Part 14", &["m4a", "m4b"]),
    ("Musepack", &["mpc"]),
    ("NCH Dictation", &["dct"]),
    ("Nintendo (NES) Sound Format", &["nsf"]),
    ("Ogg Audio", &["oga", "mogg"]),
    ("Opus", &["opus"]),
    ("RAW Audio Format", &["raw"]),
    ("RealAudio", &["ra"]),
    ("Samsung Yamaha Ringtone", &["mmf"]),
    ("Sony Compressed Voice", &["dvf", "msv"]),
    ("Sun/Unix/Java Audio", &["au"]),
    ("True Audio Lossless", &["tta"]),
    ("WavPack", &["wv"]),
];

pub const VIDEO: TypeTable = &[
    ("3GPP", &["3gp"]),
    ("3GPP2", &["3g2"]),
    ("Advanced Systems Format", &["asf"]),
    ("AMV Video", &["amv"]),
    ("Audio Video Interleave", &["avi"]),
    ("Dirac", &["drc"]),
    ("Flash Video", &["flv", "f4v", "f4p", "f4a", "f4b"]),
    ("Graphics Interchange Format Video", &["gifv"]),
    ("Material Exchange Format", &["mxf"]),
    ("Matroska", &["mkv"]),
    ("MPEG Transport Stream", &["mts", "m2ts"]),
    ("MPEG-1", &["mp2", "mpe", "mpv"]),
    ("MPEG-1/MPEG-2", &["mpg", "mpeg"]),
    ("MPEG-2", &["m2v"]),
    ("MPEG-4 Part 14", &["mp4", "m4p", "m4v"]),
    ("Multiple-image Network Graphics", &["mng"]),
    ("Nullsoft Streaming Video", &["nsv"]),
    ("Ogg Video", &["ogv", "ogg"]),
    ("QuickTime File Format", &["mov", "qt"]),
    ("Raw Video", &["yuv"]),
    ("RealMedia", &["rm"]),
    ("RealMedia Variable Bitrate", &["rmvb"]),
    ("RoQ FMV", &["roq"]),
    ("Standardized Video Interview", &["svi"]),
    ("Video Object", &["vob"]),
    ("WebM", &["webm"]),
    ("Windows Media Video", &["wmv"]),
];

pub const SUBTITLES: TypeTable = &[
    ("AQTitle", &["aqt"]),
    ("CVD", &["cvd"]),
    ("DKS", &["dks"]),
    ("Gloss Subtitle", &["gsub"]),
    ("JACOSub", &["jss"]),
    ("MPL2", &["mpl"]),
    ("Phoenix Subtitle", &["pjs"]),
    ("PowerDivX", &["psb"]),
    ("RealText", &["rt"]),
    ("SAMI", &["smi"]),
    ("SubRip", &["srt"]),
    ("SubStation Alpha", &["ssa"]),
    ("Advanced SubStation Alpha", &["ass"]),
    ("Structured Subtitle Format", &["ssf"]),
    ("Spruce Subtitle Format", &["stl"]),
    ("MicroDVD", &["sub"]),
    ("MPSub", &["sub"]),
    ("SubViewer", &["sub"]),
    ("VobSub", &["sub", "idx"]),
    ("SVCD", &["svcd"]),
    ("MPEG-4 Timed Text", &["ttxt"]),
    ("Universal Subtitle Format", &["usf"]),
];

/// Lookup order: audio before video, then subtitles.
const PRIORITY: &[(Kind, TypeTable)] = &[(Kind::AUDIO, AUDIO), (Kind::VIDEO, VIDEO), (Kind::SUBTITLES, SUBTITLES)];

/// The classification of a single file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileType {
    pub kind: Kind,
    /// Lowercase extension, without the leading dot.
    pub ext: String,
    /// Human-readable type name, empty for unknown files.
    pub name: String,
}

impl FileType {
    pub fn new(kind: Kind, ext: impl Into<String>, name: impl Into<String>) -> Self {
        Self { kind, ext: ext.into(), name: name.into() }
    }
}

/// Classify a file extension (with or without its leading dot).
#[must_use]
pub fn classify(ext: &str) -> FileType {
    let ext = ext.strip_prefix('.').unwrap_or(ext).to_lowercase();
    PRIORITY
        .iter()
        .find_map(|(kind, table)| {
            table
                .iter()
                .find(|(_, exts)| exts.contains(&ext.as_str()))
                .map(|(name, _)| FileType::new(*kind, ext.as_str(), *name))
        })
        .unwrap_or_else(|| FileType::new(Kind::Unknown, ext, ""))
}

/// Classify a file by the extension of its path.
///
/// Paths without an extension (including dotfiles such as `.srt`), or whose
/// extension is not valid UTF-8, are unknown.
#[must_use]
pub fn classify_path(path: impl AsRef<Path>) -> FileType {
    path.as_ref().extension().and_then(|ext| ext.to_str()).map(classify).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("mp3", Kind::AUDIO, "MPEG Layer III")]
    #[case("FLAC", Kind::AUDIO, "Free Lossless Audio Codec")]
    #[case(".m4b", Kind::AUDIO, "MPEG-4 Part 14")]
    #[case("mkv", Kind::VIDEO, "Matroska")]
    #[case("Mp4", Kind::VIDEO, "MPEG-4 Part 14")]
    #[case("ogg", Kind::VIDEO, "Ogg Video")]
    #[case("srt", Kind::SUBTITLES, "SubRip")]
    #[case("idx", Kind::SUBTITLES, "VobSub")]
    #[case("txt", Kind::Unknown, "")]
    #[case("", Kind::Unknown, "")]
    fn test_classify(#[case] ext: &str, #[case] kind: Kind, #[case] name: &str) {
        let file_type = classify(ext);
        assert_eq!(file_type.kind, kind);
        assert_eq!(file_type.name, name);
        assert_eq!(file_type.ext, ext.trim_start_matches('.').to_lowercase());
    }

    #[test]
    fn test_shared_extension_still_classifies_kind() {
        // Several subtitle formats claim "sub"; which name is reported does not matter.
        let file_type = classify("sub");
        assert_eq!(file_type.kind, Kind::SUBTITLES);
        assert!(!file_type.name.is_empty());
    }

    #[rstest]
    #[case("Movies/Heat (1995).MKV", Kind::VIDEO)]
    #[case("music/track01.opus", Kind::AUDIO)]
    #[case("Movies/Heat (1995).en.srt", Kind::SUBTITLES)]
    #[case("Movies/.srt", Kind::Unknown)]
    #[case("Movies/README", Kind::Unknown)]
    #[case("cover.jpg", Kind::Unknown)]
    fn test_classify_path(#[case] path: &str, #[case] expected: Kind) {
        assert_eq!(classify_path(path).kind, expected);
    }

    #[test]
    fn test_tables_are_lowercase_without_dots() {
        for (_, table) in PRIORITY {
            for (name, exts) in table.iter() {
                assert!(!name.is_empty());
                for ext in exts.iter() {
                    assert_eq!(*ext, ext.to_lowercase());
                    assert!(!ext.starts_with('.'));
                }
            }
        }
    }
}
