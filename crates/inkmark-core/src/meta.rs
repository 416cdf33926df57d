//! Best-effort display metadata derived from a URL.
//!
//! Pure string work, no network. Absence of a derivable title or icon is a
//! normal `None` outcome, never an error.

use url::Url;

/// Fallback display metadata for a bookmark.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageMeta {
    pub title: Option<String>,
    pub favicon_url: Option<String>,
}

/// Derive a fallback title and favicon reference from a normalized URL.
///
/// The title comes from the last path segment (`-`/`_` become spaces, a
/// trailing extension is stripped, first letter upper-cased), falling back
/// to the hostname without a leading `www.` when the path is bare.
#[must_use]
pub fn resolve(url: &Url) -> PageMeta {
    let Some(host) = url.host_str() else {
        return PageMeta::default();
    };

    let favicon_url = Some(format!(
        "https://www.google.com/s2/favicons?domain={}&sz=64",
        host
    ));

    let last_segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last());

    let raw_title = match last_segment {
        Some(segment) => strip_extension(&segment.replace(['-', '_'], " ")).to_string(),
        None => host.strip_prefix("www.").unwrap_or(host).to_string(),
    };

    let title = capitalize(&raw_title);
    PageMeta {
        title: if title.is_empty() { None } else { Some(title) },
        favicon_url,
    }
}

/// Drop a trailing `.ext` when there is one. A lone trailing dot is kept.
fn strip_extension(segment: &str) -> &str {
    match segment.rfind('.') {
        Some(pos) if pos + 1 < segment.len() => &segment[..pos],
        _ => segment,
    }
}

fn capitalize(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
