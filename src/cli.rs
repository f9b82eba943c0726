use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use reel_config::{Config, LibraryConfig};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Index media libraries, keeping each library's store in step with disk.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Library root directories, in addition to any configured ones.
    #[arg(value_name = "LIBRARY")]
    pub libraries: Vec<PathBuf>,
    /// Log what is skipped and why.
    #[arg(short, long)]
    pub verbose: bool,
    /// Log every file as it is discovered.
    #[arg(short, long)]
    pub trace: bool,
    /// Read configuration from this file instead of the default location.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Directory holding one index store per library.
    #[arg(short, long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
    /// Directory levels below each root to scan (0 is unlimited).
    #[arg(short, long, value_name = "N")]
    pub max_depth: Option<u32>,
    /// Write log output to this file instead of standard error.
    #[arg(short, long, value_name = "FILE")]
    pub log: Option<PathBuf>,
}

impl Cli {
    pub fn is_verbose(&self) -> bool {
        self.verbose || self.trace
    }

    /// Default log directive when `RUST_LOG` is not set.
    fn log_directive(&self) -> &'static str {
        match (self.trace, self.verbose) {
            (true, _) => "trace,sqlx=warn",
            (false, true) => "debug,sqlx=warn",
            (false, false) => "info,sqlx=warn",
        }
    }

    /// Install the global subscriber. `RUST_LOG` takes precedence over the
    /// verbosity flags.
    pub fn init_logging(&self) -> Result<()> {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| self.log_directive().into());
        let (stderr, file) = match &self.log {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .or_raise(|| ErrorKind::LogFile(path.clone()))?;
                (None, Some(tracing_subscriber::fmt::layer().with_writer(Mutex::new(file)).with_ansi(false)))
            },
            None => (Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)), None),
        };
        tracing_subscriber::registry().with(filter).with(stderr).with(file).init();
        Ok(())
    }

    /// Command-line options win over configuration; library paths given on
    /// the command line are added to the configured ones.
    pub fn apply(&self, config: &mut Config) {
        if let Some(data_dir) = &self.data_dir {
            config.data_dir = data_dir.clone();
        }
        if let Some(max_depth) = self.max_depth {
            config.max_depth = max_depth;
        }
        config.libraries.extend(self.libraries.iter().cloned().map(LibraryConfig::new));
    }
}
