use std::{io, path::PathBuf};

/// Errors that can occur when using the file logger.
#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("Failed to open log file '{path}': {source}")]
    OpenFailed { path: PathBuf, source: io::Error },
    #[error("Failed to rename file from '{from}' to '{to}': {source}")]
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
    #[error("Failed to reopen log file '{path}' after rotation: {source}")]
    RotateFailed { path: PathBuf, source: io::Error },
    #[error("Failed to set file permissions for '{path}': {source}")]
    SetPermissionsFailed { path: PathBuf, source: io::Error },
    #[error("Failed to write to log file '{path}': {source}")]
    WriteFailed { path: PathBuf, source: io::Error },
    #[error("Unknown log level: '{0}'")]
    UnknownLevel(String),
    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type Result<T> = std::result::Result<T, LoggerError>;
