//! Configuration for the store gateway and the change feed.

use crate::client::retry::RetryConfig;

/// Configuration shared by [`crate::RestStore`] and [`crate::HttpFeed`].
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL of the store's REST surface, without a trailing slash.
    pub base_url: String,
    /// Project api key, sent on every request.
    pub api_key: String,
    /// Per-user bearer token.
    pub bearer_token: String,
    /// Request timeout in milliseconds for one-shot gateway calls. The
    /// feed stream deliberately carries no overall timeout.
    pub request_timeout_ms: u64,
    /// Retry behavior for gateway calls.
    pub retry: RetryConfig,
    /// Heartbeat interval requested from the feed, in seconds.
    pub heartbeat_secs: u64,
    /// Ceiling for the feed reconnect backoff, in seconds.
    pub max_reconnect_backoff_secs: u64,
}

impl ClientConfig {
    #[must_use]
    pub fn new(base_url: &str, api_key: &str, bearer_token: &str) -> Self {
        ClientConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            bearer_token: bearer_token.to_string(),
            ..Default::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: String::new(),
            api_key: String::new(),
            bearer_token: String::new(),
            request_timeout_ms: 30000,
            retry: RetryConfig::default(),
            heartbeat_secs: 30,
            max_reconnect_backoff_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.request_timeout_ms, 30000);
        assert_eq!(config.heartbeat_secs, 30);
        assert_eq!(config.max_reconnect_backoff_secs, 30);
        assert!(config.base_url.is_empty());
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let config = ClientConfig::new("https://store.example.com/", "key", "token");
        assert_eq!(config.base_url, "https://store.example.com");
        assert_eq!(config.api_key, "key");
        assert_eq!(config.bearer_token, "token");
    }

    #[test]
    fn test_partial_override() {
        let config = ClientConfig {
            request_timeout_ms: 5000,
            ..Default::default()
        };
        assert_eq!(config.request_timeout_ms, 5000);
        assert_eq!(config.heartbeat_secs, 30);
    }
}
