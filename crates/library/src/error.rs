//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Traversal errors (`InvalidPath` through `InvalidFile`) are per-entry: they
//! are logged and the entry skipped, and never end a scan on their own.

use crate::gate::Operation;
use derive_more::{Display, Error};
use std::path::PathBuf;

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("invalid library: {}", _0.display())]
    InvalidLibrary(#[error(not(source))] PathBuf),
    #[display("library already open: {}", _0.display())]
    DuplicateLibrary(#[error(not(source))] PathBuf),
    #[display("max number of concurrent {operation} operations reached: {} (max = {max})", path.display())]
    LibraryBusy { operation: Operation, path: PathBuf, max: usize },
    #[display("invalid path: {}", _0.display())]
    InvalidPath(#[error(not(source))] PathBuf),
    #[display("could not stat: {}", _0.display())]
    InvalidStat(#[error(not(source))] PathBuf),
    #[display("depth limit ({limit}) reached, not descending: {}", path.display())]
    DirDepth { path: PathBuf, limit: u32 },
    #[display("could not read directory: {}", _0.display())]
    DirOpen(#[error(not(source))] PathBuf),
    #[display("{reason}: {}", path.display())]
    InvalidFile { path: PathBuf, reason: &'static str },
    #[display("index error for: {}", _0.display())]
    Database(#[error(not(source))] PathBuf),
    #[display("could not convert entity: {}", _0.display())]
    InvalidRecord(#[error(not(source))] PathBuf),
    #[display("subtitle reconciliation failed")]
    Reconcile,
    #[display("library task did not run to completion: {}", _0.display())]
    Interrupted(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::LibraryBusy { .. })
    }

    /// Returns `true` for conditions worth noting but not worth a warning.
    pub fn is_informational(&self) -> bool {
        matches!(self, ErrorKind::DirDepth { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_path_names_only_the_path() {
        let kind = ErrorKind::InvalidPath(PathBuf::from("/srv/Movies/Heat.mkv"));
        assert_eq!(kind.to_string(), "invalid path: /srv/Movies/Heat.mkv");
        assert!(!kind.is_retryable());
        assert!(!kind.is_informational());
    }
}
