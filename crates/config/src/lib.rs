//! Configuration for reel.
//!
//! Settings are layered, later layers winning:
//!
//! 1. Built-in defaults.
//! 2. A TOML file: `config.toml` in the platform config directory, or an
//!    explicitly given path (which must exist).
//! 3. Environment variables prefixed with `REEL_`, nested keys separated by
//!    a double underscore (`REEL_MAX_DEPTH=3`).
//!
//! ```toml
//! data_dir = "/var/lib/reel"
//! max_depth = 0
//!
//! [[libraries]]
//! path = "/srv/media/Movies"
//!
//! [[libraries]]
//! path = "/srv/media/Music"
//! max_depth = 4
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "REEL_";
const CONFIG_FILE: &str = "config.toml";

/// One configured library root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryConfig {
    pub path: PathBuf,
    /// Overrides [`Config::max_depth`] for this library.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<u32>,
}

impl LibraryConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), max_depth: None }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding one index store per library.
    pub data_dir: PathBuf,
    /// How many directory levels below a library root to scan; 0 is unlimited.
    pub max_depth: u32,
    #[serde(default)]
    pub libraries: Vec<LibraryConfig>,
}

impl Config {
    /// Defaults rooted at `data_dir`, with no libraries configured.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into(), max_depth: 0, libraries: Vec::new() }
    }

    /// Load configuration from the default locations, or from `file` if one
    /// is given.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "reel");
        let defaults = match &dirs {
            Some(dirs) => Self::with_data_dir(dirs.data_dir().join("libraries")),
            None => Self::with_data_dir(PathBuf::new()),
        };
        let file = match file {
            Some(file) if !file.is_file() => exn::bail!(ErrorKind::NotFound(file.to_path_buf())),
            Some(file) => Some(file.to_path_buf()),
            None => dirs.as_ref().map(|dirs| dirs.config_dir().join(CONFIG_FILE)),
        };
        let mut figment = Figment::from(Serialized::defaults(defaults));
        if let Some(file) = &file {
            tracing::debug!(path = %file.display(), "Reading configuration file");
            figment = figment.merge(Toml::file(file));
        }
        Self::from_figment(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Extract a configuration from an arbitrary figment.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        figment.extract().or_raise(|| ErrorKind::Invalid)
    }

    /// Check the fully assembled configuration, after any command-line
    /// overrides have been applied.
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            exn::bail!(ErrorKind::NoHomeDirectory);
        }
        Ok(())
    }

    /// Effective traversal depth for a library.
    pub fn max_depth_for(&self, library: &LibraryConfig) -> u32 {
        library.max_depth.unwrap_or(self.max_depth)
    }
}
