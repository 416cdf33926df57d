//! Raw-input URL normalization.

use crate::error::{EngineError, Result};
use url::Url;

/// Normalize raw user input to an absolute URL.
///
/// Input with no `http`/`https` scheme gets `https://` prefixed first;
/// whatever still fails to parse as an absolute URL is rejected without
/// ever reaching the gateway.
pub fn normalize_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidUrl(raw.to_string()));
    }

    let candidate = if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    Url::parse(&candidate).map_err(|_| EngineError::InvalidUrl(raw.to_string()))
}

fn has_scheme(input: &str) -> bool {
    let lower = input.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
