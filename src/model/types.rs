//! Normalized entity structs.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Markup fragments the search API embeds in snippets (`<span class="searchmatch">`).
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

/// One hit from the full-text search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub page_id: i64,
    pub title: String,
    /// Raw snippet as returned by the API; may contain markup.
    pub snippet: String,
}

impl SearchResult {
    pub fn new(page_id: i64, title: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            page_id,
            title: title.into(),
            snippet: snippet.into(),
        }
    }

    /// Snippet with tags removed and the usual entities decoded, for terminal display.
    pub fn snippet_text(&self) -> String {
        let stripped = TAG_RE.replace_all(&self.snippet, "");
        stripped
            .replace("&quot;", "\"")
            .replace("&#039;", "'")
            .replace("&#39;", "'")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&nbsp;", " ")
            .replace("&amp;", "&")
    }

    /// Canonical article link under `base`.
    pub fn article_url(&self, base: &str) -> String {
        article_url(base, &self.title)
    }
}

/// Build an article URL: spaces become underscores, the rest is percent-encoded.
pub fn article_url(base: &str, title: &str) -> String {
    let slug = title.replace(' ', "_");
    format!("{base}{}", urlencoding::encode(&slug))
}

/// A past search term and when it was last searched (unix millis).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub term: String,
    pub timestamp: i64,
}

impl HistoryEntry {
    pub fn new(term: impl Into<String>, timestamp: i64) -> Self {
        Self {
            term: term.into(),
            timestamp,
        }
    }
}
