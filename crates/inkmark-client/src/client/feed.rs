//! Streaming change-feed client.
//!
//! One subscription is one long-lived NDJSON stream scoped to a single
//! owner. The wire makes no ordering or uniqueness promises: events may be
//! duplicated or coalesced, and an event is only ever emitted after the
//! triggering write is durable.

use crate::client::config::ClientConfig;
use crate::error::{Result, StoreError};
use crate::types::{Bookmark, ConnectionState, FeedEvent, FeedMessage};
use async_trait::async_trait;
use bytes::BytesMut;
use futures::StreamExt;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Abstraction over the push channel delivering row-level changes.
#[async_trait]
pub trait ChangeFeed: Send + Sync + 'static {
    async fn subscribe(&self, owner: &str) -> Result<FeedSubscription>;
}

/// Handle to an established subscription.
///
/// Wraps the delivery channel; dropping the handle or calling
/// [`FeedSubscription::unsubscribe`] tears the stream down.
pub struct FeedSubscription {
    receiver: async_channel::Receiver<FeedMessage>,
    reader: Option<tokio::task::JoinHandle<()>>,
}

impl FeedSubscription {
    /// Wrap a bare channel. Used by in-process feed doubles in tests.
    pub fn new(receiver: async_channel::Receiver<FeedMessage>) -> Self {
        Self {
            receiver,
            reader: None,
        }
    }

    fn with_reader(
        receiver: async_channel::Receiver<FeedMessage>,
        reader: tokio::task::JoinHandle<()>,
    ) -> Self {
        Self {
            receiver,
            reader: Some(reader),
        }
    }

    /// Next message, or `None` once the subscription is closed.
    pub async fn next(&mut self) -> Option<FeedMessage> {
        self.receiver.recv().await.ok()
    }

    /// Idempotent: safe to call repeatedly or on an already-closed handle.
    pub fn unsubscribe(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        self.receiver.close();
    }
}

impl Drop for FeedSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    event: String,
    #[serde(default)]
    record: Option<Bookmark>,
    #[serde(default)]
    old: Option<WireKey>,
}

#[derive(Debug, Deserialize)]
struct WireKey {
    id: String,
}

/// Decode one NDJSON frame. `Ok(None)` is a heartbeat or blank keep-alive
/// line, not an event.
fn parse_line(line: &str) -> Result<Option<FeedEvent>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let message: WireMessage = serde_json::from_str(line)?;
    match message.event.as_str() {
        "INSERT" => message
            .record
            .map(FeedEvent::Insert)
            .map(Some)
            .ok_or_else(|| StoreError::Subscription("INSERT without record".to_string())),
        "UPDATE" => message
            .record
            .map(FeedEvent::Update)
            .map(Some)
            .ok_or_else(|| StoreError::Subscription("UPDATE without record".to_string())),
        "DELETE" => message
            .old
            .map(|key| FeedEvent::Delete { id: key.id })
            .map(Some)
            .ok_or_else(|| StoreError::Subscription("DELETE without old key".to_string())),
        "HEARTBEAT" => Ok(None),
        other => Err(StoreError::Subscription(format!(
            "unknown feed event: {}",
            other
        ))),
    }
}

/// HTTP streaming implementation of [`ChangeFeed`].
///
/// Each subscription runs a reader task that reconnects with bounded,
/// jittered backoff when the stream drops, reporting `Degraded` on loss and
/// `Connected` on every (re)establishment.
#[derive(Clone)]
pub struct HttpFeed {
    client: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl HttpFeed {
    pub fn new(config: ClientConfig) -> Result<Self> {
        url::Url::parse(&config.base_url)
            .map_err(|e| StoreError::Config(format!("bad base url: {}", e)))?;
        // No overall timeout: the stream is expected to stay open for the
        // whole session, bounded only by heartbeats.
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| StoreError::Config(e.to_string()))?;
        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    fn feed_url(&self, owner: &str) -> String {
        format!(
            "{}/feed/bookmarks?user_id=eq.{}",
            self.config.base_url,
            utf8_percent_encode(owner, NON_ALPHANUMERIC)
        )
    }

    /// Run one stream until it ends or errors, pushing decoded events into
    /// the delivery channel. Returns `Ok` on graceful end-of-stream or a
    /// gone receiver.
    async fn stream_once(
        &self,
        owner: &str,
        subscription_id: &str,
        tx: &async_channel::Sender<FeedMessage>,
    ) -> Result<()> {
        let response = self
            .client
            .get(self.feed_url(owner))
            .header("apikey", &self.config.api_key)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.bearer_token),
            )
            .header("Accept", "application/x-ndjson")
            .header("Subscription-Id", subscription_id)
            .header("Heartbeats", format!("{}s", self.config.heartbeat_secs))
            .send()
            .await
            .map_err(|e| StoreError::Subscription(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StoreError::Subscription(format!(
                "subscribe returned {}",
                response.status()
            )));
        }

        if tx
            .send(FeedMessage::Status(ConnectionState::Connected))
            .await
            .is_err()
        {
            return Ok(());
        }

        let mut stream = response.bytes_stream();
        let mut buf = BytesMut::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| StoreError::Subscription(e.to_string()))?;
            buf.extend_from_slice(&chunk);

            while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
                let frame = buf.split_to(pos + 1);
                let line = std::str::from_utf8(&frame)
                    .map_err(|_| StoreError::Subscription("non-utf8 frame".to_string()))?;
                match parse_line(line) {
                    Ok(Some(event)) => {
                        if tx.send(FeedMessage::Change(event)).await.is_err() {
                            return Ok(());
                        }
                    }
                    Ok(None) => {}
                    Err(e) => tracing::warn!("[Feed] dropping malformed frame: {}", e),
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl ChangeFeed for HttpFeed {
    async fn subscribe(&self, owner: &str) -> Result<FeedSubscription> {
        let (tx, rx) = async_channel::unbounded::<FeedMessage>();
        let feed = self.clone();
        let owner = owner.to_string();
        let subscription_id = uuid::Uuid::new_v4().to_string();
        let max_backoff = Duration::from_secs(self.config.max_reconnect_backoff_secs.max(1));

        let reader = tokio::spawn(async move {
            let _ = tx
                .send(FeedMessage::Status(ConnectionState::Connecting))
                .await;
            let mut backoff = Duration::from_secs(1);

            loop {
                match feed.stream_once(&owner, &subscription_id, &tx).await {
                    Ok(()) => {
                        tracing::info!("[Feed] stream for {} ended, reconnecting", owner);
                        backoff = Duration::from_secs(1);
                    }
                    Err(e) => {
                        tracing::warn!("[Feed] stream error for {}: {}", owner, e);
                    }
                }

                if tx
                    .send(FeedMessage::Status(ConnectionState::Degraded))
                    .await
                    .is_err()
                {
                    break;
                }

                let jitter = Duration::from_millis(rand::random::<u64>() % 250);
                tokio::time::sleep(backoff + jitter).await;
                backoff = std::cmp::min(backoff * 2, max_backoff);
            }

            tracing::debug!("[Feed] reader for {} stopped", owner);
        });

        Ok(FeedSubscription::with_reader(rx, reader))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_insert() {
        let line = r#"{"event":"INSERT","record":{"id":"b-1","user_id":"u-1","url":"https://a.com/","created_at":"2026-01-05T10:00:00Z"}}"#;
        match parse_line(line).unwrap() {
            Some(FeedEvent::Insert(record)) => assert_eq!(record.id, "b-1"),
            other => panic!("expected insert, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_delete_carries_bare_id() {
        let line = r#"{"event":"DELETE","old":{"id":"b-9"}}"#;
        match parse_line(line).unwrap() {
            Some(FeedEvent::Delete { id }) => assert_eq!(id, "b-9"),
            other => panic!("expected delete, got {:?}", other),
        }
    }

    #[test]
    fn test_heartbeat_and_blank_lines_are_not_events() {
        assert!(parse_line(r#"{"event":"HEARTBEAT"}"#).unwrap().is_none());
        assert!(parse_line("\n").unwrap().is_none());
        assert!(parse_line("").unwrap().is_none());
    }

    #[test]
    fn test_insert_without_record_is_an_error() {
        assert!(parse_line(r#"{"event":"INSERT"}"#).is_err());
    }

    #[test]
    fn test_unknown_event_is_an_error() {
        assert!(parse_line(r#"{"event":"TRUNCATE"}"#).is_err());
    }

    #[tokio::test]
    async fn test_unsubscribe_is_idempotent() {
        let (tx, rx) = async_channel::unbounded::<FeedMessage>();
        let mut sub = FeedSubscription::new(rx);
        sub.unsubscribe();
        sub.unsubscribe();
        assert!(tx
            .send(FeedMessage::Status(ConnectionState::Connected))
            .await
            .is_err());
        assert!(sub.next().await.is_none());
    }
}
