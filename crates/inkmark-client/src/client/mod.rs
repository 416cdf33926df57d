//! Store gateway and change-feed client implementations.

mod config;
mod feed;
pub mod retry;
mod store;

pub use config::ClientConfig;
pub use feed::{ChangeFeed, FeedSubscription, HttpFeed};
pub use retry::{RetryConfig, RetryDecision, RetryState};
pub use store::{RestStore, StoreGateway};
