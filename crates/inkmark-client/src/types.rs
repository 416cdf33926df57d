//! Data model shared by the store gateway and the change feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted bookmark row.
///
/// `id` and `created_at` are always server-assigned; clients never supply
/// them. `created_at` is the only sort key (descending at read time).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub user_id: String,
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub favicon_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Client-supplied fields for a create call. The store fills in `id` and
/// `created_at` and echoes the full row back.
#[derive(Clone, Debug, Serialize)]
pub struct BookmarkDraft {
    pub user_id: String,
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub favicon_url: Option<String>,
}

/// A row-level change pushed by the feed.
///
/// Delivery is at-least-once with no ordering guarantee; consumers must
/// treat every variant as safe to apply any number of times.
#[derive(Clone, Debug)]
pub enum FeedEvent {
    Insert(Bookmark),
    Update(Bookmark),
    Delete { id: String },
}

impl FeedEvent {
    /// The id of the row this event refers to.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            FeedEvent::Insert(record) | FeedEvent::Update(record) => &record.id,
            FeedEvent::Delete { id } => id,
        }
    }
}

/// Health of the push channel. Tracked for observability only; mutations
/// never gate on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Degraded,
}

/// Everything a subscription can deliver: a row change or a transition of
/// the channel itself.
#[derive(Clone, Debug)]
pub enum FeedMessage {
    Change(FeedEvent),
    Status(ConnectionState),
}
