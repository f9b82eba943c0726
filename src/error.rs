use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("could not open log file: {}", _0.display())]
    LogFile(#[error(not(source))] PathBuf),
    #[display("no valid libraries provided")]
    NoLibraries,
}
