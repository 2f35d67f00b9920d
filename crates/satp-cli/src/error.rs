//! CLI error types.

use std::path::PathBuf;

use satp_link::LinkError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Link(#[from] LinkError),

    #[error("data file {}: {source}", .path.display())]
    DataFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("data file {} holds no payload", .0.display())]
    EmptyDataFile(PathBuf),

    #[error("data file {}: {message}", .path.display())]
    InvalidDataFile { path: PathBuf, message: String },

    #[error("failed to install Ctrl-C handler: {0}")]
    Signal(#[from] ctrlc::Error),

    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
