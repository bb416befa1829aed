//! Error types shared by every stage of the pipeline

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Fatal, whole-run failures.
///
/// Per-item download problems never surface here; they are reported as
/// [`crate::services::download_types::DownloadOutcome::Failed`] and counted.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required input file (capture, CSV, link list, settings) does not exist
    #[error("input file not found: {path}")]
    MissingInputFile { path: PathBuf },

    /// The CSV header lacks the column a tool operates on
    #[error("column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },

    /// The captured request could not be understood
    #[error("could not parse captured request: {message}")]
    Parse { message: String },

    /// The service answered with a non-success status
    #[error("HTTP {status} {reason}: {body}")]
    Http {
        status: u16,
        reason: String,
        body: String,
    },

    /// Network-level failure (connect, timeout, TLS, ...)
    #[error("transport error: {message}")]
    Transport { message: String },

    #[error("invalid settings: {message}")]
    InvalidSettings { message: String },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl Error {
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn invalid_settings<S: Into<String>>(message: S) -> Self {
        Self::InvalidSettings {
            message: message.into(),
        }
    }

    pub fn missing_input<P: Into<PathBuf>>(path: P) -> Self {
        Self::MissingInputFile { path: path.into() }
    }

    pub fn missing_column<S: Into<String>, P: Into<PathBuf>>(column: S, path: P) -> Self {
        Self::MissingColumn {
            column: column.into(),
            path: path.into(),
        }
    }
}
