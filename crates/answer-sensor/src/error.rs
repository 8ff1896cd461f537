//! Sensor error types

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SensorError {
    #[error("Configuration error: {0}")]
    Config(&'static str),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Glob pattern error: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Glob error: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("Missing response {index} in {dir}")]
    MissingResponse { dir: PathBuf, index: usize },

    #[error("Task error: {0}")]
    Task(String),
}

impl SensorError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SensorError::Io {
            path: path.into(),
            source,
        }
    }
}
