//! Index Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An index error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for index operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("database error")]
    Database,
    #[display("database migration error")]
    Migration,
    #[display("could not prepare store location: {}", _0.display())]
    Storage(#[error(not(source))] PathBuf),
    /// The unknown kind never has a collection.
    #[display("no collection exists for {_0} entities")]
    UnknownCollection(#[error(not(source))] String),
    #[display("collection {collection} has no index on field '{field}'")]
    UndefinedIndex { collection: String, field: String },
    #[display("document {_0} does not exist")]
    NotFound(#[error(not(source))] i64),
    /// Serialization/deserialization error.
    #[display("invalid document data")]
    InvalidData,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Database)
    }
}
