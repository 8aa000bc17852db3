use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::FeedType;

#[derive(Error, Debug)]
pub enum UnifeedError {
    #[error("Failed to detect feed type")]
    UnknownFeedType,

    #[error("Failed to parse {dialect} feed: {message}")]
    Malformed { dialect: FeedType, message: String },

    #[error("Input of {size} bytes exceeds the {limit} byte limit")]
    InputTooLarge { size: usize, limit: usize },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Other(String),
}

impl UnifeedError {
    pub fn malformed(dialect: FeedType, message: impl Into<String>) -> Self {
        Self::Malformed {
            dialect,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, UnifeedError>;
