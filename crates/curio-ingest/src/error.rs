use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while tokenizing an input file.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("read record {record}: {source}")]
    Record { record: usize, source: csv::Error },
    #[error("input has no header row")]
    MissingHeader,
}

pub type Result<T> = std::result::Result<T, IngestError>;
