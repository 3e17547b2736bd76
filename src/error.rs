use std::path::PathBuf;

use thiserror::Error;

/// Fatal failures of the training pipeline. There is no retry or partial
/// salvage; every variant aborts the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed csv input: {0}")]
    Csv(#[from] csv::Error),
    #[error("schema error: {0}")]
    Schema(String),
    #[error("column {column:?}, row {row}: {value:?} is not a finite number")]
    TypeConversion {
        column: String,
        row: usize,
        value: String,
    },
    #[error("no rows survived cleaning")]
    Empty,
    #[error("failed to encode or decode model parameters: {0}")]
    Json(#[from] serde_json::Error),
}
