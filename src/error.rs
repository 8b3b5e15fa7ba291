//! Error types shared across the search pipeline
//!
//! Only the edges can fail: fetching articles and loading configuration.
//! The matcher and presenter are total functions and never produce errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("request to content API failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("content API returned {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("unknown configuration key `{0}`")]
    UnknownConfigKey(String),
}

pub type Result<T> = std::result::Result<T, SearchError>;
