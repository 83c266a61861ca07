use std::result::Result as StdResult;

use thiserror::Error;

/// Errors raised by core domain helpers.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = StdResult<T, CoreError>;
