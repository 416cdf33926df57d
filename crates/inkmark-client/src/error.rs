//! Error types for store and feed operations.

use thiserror::Error;

/// Result type for store and feed operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by the store gateway and the change feed.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("no row matched the delete: {0}")]
    NotFound(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Subscription error: {0}")]
    Subscription(String),

    #[error("Subscription closed")]
    SubscriptionClosed,

    #[error("Operation timed out")]
    Timeout,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Check if this error is worth retrying.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Http(msg) => {
                msg.contains("408")
                    || msg.contains("429")
                    || msg.contains("502")
                    || msg.contains("503")
                    || msg.contains("504")
            }
            StoreError::Timeout => true,
            StoreError::NotFound(_) => false,
            _ => false,
        }
    }
}
