//! Error types for typeahead-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid UUID: {0}")]
    InvalidId(#[from] uuid::Error),

    #[error("Invalid config value for {key}: {reason}")]
    InvalidConfig { key: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
