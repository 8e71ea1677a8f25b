use std::io;
use std::path::PathBuf;

/// Errors that can abort the pipeline. Per-file errors during checksumming
/// or content comparison are not represented here: the spec treats those as
/// "not equal" and logs them, rather than failing the run (see
/// `comparator.rs` and `checksum.rs`).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0} is not a directory")]
    InvalidInput(PathBuf),

    #[error("sorter I/O failure: {0}")]
    Sorter(#[source] io::Error),

    #[error("directory walk failure: {0}")]
    Walk(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
