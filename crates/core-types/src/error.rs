// In crates/core-types/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown trade side: {0:?}")]
    UnknownSide(String),

    #[error("Unknown data mode: {0:?} (expected \"backtest\" or \"live\")")]
    UnknownMode(String),
}

pub type Result<T> = std::result::Result<T, Error>;
