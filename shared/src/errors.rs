//! Shared error types for record handling

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Expected a JSON object, found {found}")]
    NotAnObject { found: String },

    #[error("Expected a JSON array of records, found {found}")]
    NotAnArray { found: String },

    #[error("Invalid record at position {index}: {message}")]
    InvalidRecord { index: usize, message: String },

    #[error("Invalid log level: {level}")]
    InvalidLogLevel { level: String },

    #[error("Tracing initialization failed: {message}")]
    TracingInit { message: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
