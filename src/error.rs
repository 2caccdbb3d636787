//! Error taxonomy shared by every stage of the pipeline

use std::path::PathBuf;

/// Errors raised while loading, estimating or writing
#[derive(Debug, thiserror::Error)]
pub enum LingamError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {} at line {line}, column {column}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: u64,
        column: usize,
        message: String,
    },

    #[error("Estimation error: {0}")]
    Estimation(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl LingamError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LingamError::Io { path: path.into(), source }
    }

    pub fn estimation(message: impl Into<String>) -> Self {
        LingamError::Estimation(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        LingamError::Config(message.into())
    }
}

pub type Result<T> = std::result::Result<T, LingamError>;
