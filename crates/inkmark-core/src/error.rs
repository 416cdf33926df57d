//! Error types for the reconciliation engine.

use inkmark_client::StoreError;
use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced to callers of the engine.
///
/// None of these is fatal to the session; the worst-case recovery path is
/// always a full resync from the store's authoritative list.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EngineError {
    /// The raw input did not normalize to an absolute URL. No gateway call
    /// is made and the collection is untouched.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// The store rejected a mutation. An add leaves the collection
    /// untouched; a delete triggers a full resync instead of a local
    /// revert.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
