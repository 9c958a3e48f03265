//! Error types for typeahead-search

use typeahead_core::ShareId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Share not found: {0}")]
    ShareNotFound(ShareId),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SearchError>;
