// In crates/result-store/src/error.rs

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Result {0:?} not found")]
    NotFound(String),

    #[error("Invalid result name: {0:?}")]
    InvalidName(String),

    #[error("Unable to list results in {path}")]
    ListFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to access {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse summary {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Whether the error means "there is no such result", as opposed to a
    /// failure reading one that exists.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound(_) | Error::InvalidName(_) => true,
            Error::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
