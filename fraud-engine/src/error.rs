//! Error types for fraud engine

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Rejection of a malformed transaction, naming the offending field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Wire name of the field that failed validation
    pub field: String,

    /// Human-readable reason
    pub message: String,
}

impl ValidationError {
    /// Create new validation error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Fraud engine error
#[derive(Debug, Error)]
pub enum Error {
    /// Transaction failed validation; nothing was scored or recorded
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error while loading configuration
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
