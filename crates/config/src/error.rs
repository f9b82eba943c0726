//! Config Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration loading.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Neither a config file nor a data directory was given, and the
    /// platform has no home directory to derive them from.
    #[display("no home directory; pass a data directory explicitly")]
    NoHomeDirectory,
    #[display("config file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    #[display("invalid configuration")]
    Invalid,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
