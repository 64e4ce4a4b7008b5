//! Error types for Chronoscope

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("malformed query parameter {key}: {message}")]
    MalformedQuery { key: String, message: String },

    #[error("failed to parse {identifier}: {message}")]
    ParseFailure { identifier: String, message: String },

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound(identifier.into())
    }

    pub fn malformed_query(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedQuery {
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn parse_failure(identifier: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseFailure {
            identifier: identifier.into(),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
