pub mod client;
pub mod error;
pub mod types;

pub use client::{ChangeFeed, ClientConfig, FeedSubscription, HttpFeed, RestStore, StoreGateway};
pub use error::{Result, StoreError};
pub use types::{Bookmark, BookmarkDraft, ConnectionState, FeedEvent, FeedMessage};
