use std::result::Result as StdResult;

use thiserror::Error;

/// Errors raised while building or parsing core domain values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid page size: {0} (expected one of 10, 20, 30, 40, 50)")]
    InvalidPageSize(u32),

    #[error("Invalid page number: {0}")]
    InvalidPage(String),

    #[error("Invalid sort direction: {0}")]
    InvalidSortDirection(String),

    #[error("Unknown OAuth provider: {0}")]
    UnknownProvider(String),

    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = StdResult<T, CoreError>;
