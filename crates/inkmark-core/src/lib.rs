//! # Inkmark Core
//!
//! Client-side state reconciliation engine for the Inkmark bookmark
//! manager. One [`session::Session`] owns one user's in-memory collection
//! and merges three input streams into it: user-initiated adds, user-
//! initiated deletes, and the push change feed. Every mutation path is
//! keyed on the server-assigned record id and checks presence against
//! current state before touching anything, so the collection converges no
//! matter how the streams interleave or how often the feed redelivers.

pub mod collection;
pub mod error;
pub mod meta;
pub mod normalize;
pub mod session;

pub use collection::Collection;
pub use error::{EngineError, Result};
pub use meta::{resolve, PageMeta};
pub use normalize::normalize_url;
pub use session::{Session, SessionOptions, SessionState};
