use thiserror::Error;

use crate::db::IndexError;


#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl SearchError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog(message.into())
    }
}

impl From<config::ConfigError> for SearchError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}


pub type Result<T> = std::result::Result<T, SearchError>;
