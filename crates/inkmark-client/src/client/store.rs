//! REST gateway to the bookmark store.

use crate::client::config::ClientConfig;
use crate::client::retry::{parse_retry_after, RetryDecision, RetryState};
use crate::error::{Result, StoreError};
use crate::types::{Bookmark, BookmarkDraft};
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use std::sync::Arc;
use std::time::Duration;

/// Abstraction over the persistent bookmark store.
///
/// The store is the single source of truth: `create` returns the full row
/// with the server-assigned `id` and `created_at`, and `list_by_owner` is
/// the authoritative snapshot used for resync.
#[async_trait]
pub trait StoreGateway: Send + Sync + 'static {
    async fn create(&self, draft: &BookmarkDraft) -> Result<Bookmark>;

    /// Delete scoped by both id and owner. A delete matching no row owned
    /// by the caller fails with [`StoreError::NotFound`]; it never silently
    /// no-ops, so one tenant cannot blind-delete another's rows.
    async fn delete_where(&self, id: &str, owner: &str) -> Result<()>;

    /// Full snapshot for one owner, ordered by `created_at` descending.
    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Bookmark>>;
}

/// PostgREST-style HTTP implementation of [`StoreGateway`].
#[derive(Clone)]
pub struct RestStore {
    client: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl RestStore {
    pub fn new(config: ClientConfig) -> Result<Self> {
        url::Url::parse(&config.base_url)
            .map_err(|e| StoreError::Config(format!("bad base url: {}", e)))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| StoreError::Config(e.to_string()))?;
        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// Build on an existing reqwest client (shared pool).
    pub fn with_client(client: reqwest::Client, config: ClientConfig) -> Self {
        Self {
            client,
            config: Arc::new(config),
        }
    }

    fn rows_url(&self) -> String {
        format!("{}/bookmarks", self.config.base_url)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.config.api_key).header(
            "Authorization",
            format!("Bearer {}", self.config.bearer_token),
        )
    }

    async fn send_with_retries(
        &self,
        build: impl Fn() -> reqwest::RequestBuilder,
    ) -> Result<reqwest::Response> {
        let mut retry = RetryState::new(self.config.retry.clone());

        loop {
            match build().send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    if (400..600).contains(&status) {
                        let retry_after = response
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(parse_retry_after);

                        match retry.should_retry_status(status, retry_after) {
                            RetryDecision::Retry(delay) => {
                                tracing::warn!(
                                    "[Store] status {} (attempt {}), retrying in {:?}",
                                    status,
                                    retry.attempts,
                                    delay
                                );
                                tokio::time::sleep(delay).await;
                                continue;
                            }
                            RetryDecision::DontRetry => {
                                let message = response.text().await.unwrap_or_default();
                                return Err(StoreError::Http(format!(
                                    "{} {}",
                                    status,
                                    message.trim()
                                )));
                            }
                        }
                    }
                    return Ok(response);
                }
                Err(e) => {
                    let timed_out = e.is_timeout();
                    match retry.should_retry_error() {
                        RetryDecision::Retry(delay) => {
                            tracing::warn!(
                                "[Store] transport error ({}), retrying in {:?}",
                                e,
                                delay
                            );
                            tokio::time::sleep(delay).await;
                        }
                        RetryDecision::DontRetry => {
                            return Err(if timed_out {
                                StoreError::Timeout
                            } else {
                                StoreError::Http(e.to_string())
                            });
                        }
                    }
                }
            }
        }
    }

    async fn read_rows(response: reqwest::Response) -> Result<Vec<Bookmark>> {
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Http(e.to_string()))?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl StoreGateway for RestStore {
    async fn create(&self, draft: &BookmarkDraft) -> Result<Bookmark> {
        let url = self.rows_url();
        let response = self
            .send_with_retries(|| {
                self.authed(self.client.post(&url))
                    .header("Prefer", "return=representation")
                    .json(draft)
            })
            .await?;

        // The store echoes the created row back as a one-element array.
        let mut rows = Self::read_rows(response).await?;
        let record = rows
            .pop()
            .ok_or_else(|| StoreError::Http("create returned no row".to_string()))?;
        tracing::debug!("[Store] created {} -> {}", record.url, record.id);
        Ok(record)
    }

    async fn delete_where(&self, id: &str, owner: &str) -> Result<()> {
        let url = format!(
            "{}?id=eq.{}&user_id=eq.{}",
            self.rows_url(),
            encode(id),
            encode(owner)
        );
        let response = self
            .send_with_retries(|| {
                self.authed(self.client.delete(&url)).header("Prefer", "return=representation")
            })
            .await?;

        // Representation of the deleted rows; empty means nothing matched
        // the id+owner pair.
        let rows = Self::read_rows(response).await?;
        if rows.is_empty() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        tracing::debug!("[Store] deleted {} for {}", id, owner);
        Ok(())
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Bookmark>> {
        let url = format!(
            "{}?user_id=eq.{}&order=created_at.desc",
            self.rows_url(),
            encode(owner)
        );
        let response = self.send_with_retries(|| self.authed(self.client.get(&url))).await?;
        Self::read_rows(response).await
    }
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_passes_plain_ids() {
        assert_eq!(encode("b-1"), "b%2D1");
        assert_eq!(encode("abc123"), "abc123");
    }

    #[test]
    fn test_encode_escapes_query_metacharacters() {
        assert_eq!(encode("a&b=c"), "a%26b%3Dc");
    }

    #[test]
    fn test_rows_url() {
        let store =
            RestStore::new(ClientConfig::new("https://store.example.com/", "k", "t")).unwrap();
        assert_eq!(store.rows_url(), "https://store.example.com/bookmarks");
    }
}
