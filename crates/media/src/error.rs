//! Media Error Types
//!
//! Conversion between typed entities and generic records is strict: a record
//! that is missing a field, or holds a value of the wrong shape, is rejected
//! instead of being patched up with defaults.

use derive_more::{Display, Error};

/// A media error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for media operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("record is missing field '{_0}'")]
    MissingField(#[error(not(source))] &'static str),
    #[display("record field '{_0}' has an invalid value")]
    InvalidField(#[error(not(source))] &'static str),
    #[display("record describes {found}, expected {expected}")]
    KindMismatch { expected: String, found: String },
    #[display("unknown entity kind: {_0}")]
    UnknownKind(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
