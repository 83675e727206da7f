//! Wikipedia search client.
//!
//! Two read-only endpoints of `api.php`:
//! - `action=query&list=search` for full-text results (up to 50),
//! - `action=opensearch` for a single "did you mean" title.
//!
//! Responses are decoded into typed schemas at this boundary. The
//! [`SearchBackend`] methods surface errors; [`WikiClient::search`] and
//! [`WikiClient::suggest`] are the fail-soft forms that degrade to an empty
//! list / `None`. A single attempt is made, there is no retry.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::model::types::SearchResult;

/// Matches requested per search.
pub const SEARCH_LIMIT: usize = 50;

/// Result counts at or below this trigger a suggestion lookup.
pub const SUGGESTION_THRESHOLD: usize = 3;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("search API returned HTTP {0}")]
    Status(u16),
    #[error("failed to decode response: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("unexpected response shape: {0}")]
    Shape(&'static str),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

/// Source of search results and suggestions.
pub trait SearchBackend: Send + Sync + 'static {
    fn fetch_results(
        &self,
        term: &str,
    ) -> impl Future<Output = Result<Vec<SearchResult>, SearchError>> + Send;

    fn fetch_suggestion(
        &self,
        term: &str,
    ) -> impl Future<Output = Result<Option<String>, SearchError>> + Send;
}

/// `action=query&list=search` response (minimal fields).
#[derive(Debug, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    query: Option<QueryBody>,
}

#[derive(Debug, Deserialize)]
struct QueryBody {
    #[serde(default)]
    search: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
struct RawHit {
    pageid: i64,
    title: String,
    #[serde(default)]
    snippet: String,
}

impl From<RawHit> for SearchResult {
    fn from(hit: RawHit) -> Self {
        SearchResult::new(hit.pageid, hit.title, hit.snippet)
    }
}

/// Hits of a decoded full-text search. Missing `query` or `query.search` is an empty result.
pub fn search_results(response: QueryResponse) -> Vec<SearchResult> {
    response
        .query
        .map(|q| q.search.into_iter().map(SearchResult::from).collect())
        .unwrap_or_default()
}

/// Pick the suggestion out of an opensearch reply
/// (`[term, [titles...], [descriptions...], [urls...]]`) and apply the
/// no-self-suggestion rule.
pub fn opensearch_suggestion(
    value: &serde_json::Value,
    term: &str,
) -> Result<Option<String>, SearchError> {
    let titles = value
        .as_array()
        .and_then(|parts| parts.get(1))
        .and_then(serde_json::Value::as_array)
        .ok_or(SearchError::Shape("opensearch titles array missing"))?;
    let first = titles.first().and_then(serde_json::Value::as_str);
    Ok(normalize_suggestion(first, term))
}

/// Drop empty candidates and candidates equal to `term` ignoring case.
pub fn normalize_suggestion(candidate: Option<&str>, term: &str) -> Option<String> {
    let candidate = candidate?.trim();
    if candidate.is_empty() || candidate.to_lowercase() == term.trim().to_lowercase() {
        return None;
    }
    Some(candidate.to_string())
}

/// reqwest-backed client for a MediaWiki `api.php`.
#[derive(Clone)]
pub struct WikiClient {
    http: Client,
    api_url: String,
}

impl WikiClient {
    pub fn new(config: &AppConfig) -> Result<Self, SearchError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("wikisearch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            api_url: config.api_url.clone(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Full-text search; any failure yields an empty list.
    pub async fn search(&self, term: &str) -> Vec<SearchResult> {
        match self.fetch_results(term).await {
            Ok(results) => results,
            Err(e) => {
                warn!(term, "search failed: {e}");
                Vec::new()
            }
        }
    }

    /// Top suggestion for `term`; any failure yields `None`.
    pub async fn suggest(&self, term: &str) -> Option<String> {
        match self.fetch_suggestion(term).await {
            Ok(suggestion) => suggestion,
            Err(e) => {
                debug!(term, "suggestion lookup failed: {e}");
                None
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        params: &[(&str, &str)],
    ) -> Result<T, SearchError> {
        let response = self.http.get(&self.api_url).query(params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }
        response.json::<T>().await.map_err(|e| {
            if e.is_decode() {
                SearchError::Decode(e)
            } else {
                SearchError::Transport(e)
            }
        })
    }
}

impl SearchBackend for WikiClient {
    async fn fetch_results(&self, term: &str) -> Result<Vec<SearchResult>, SearchError> {
        let limit = SEARCH_LIMIT.to_string();
        let response: QueryResponse = self
            .get_json(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", term),
                ("utf8", ""),
                ("srlimit", limit.as_str()),
                ("format", "json"),
            ])
            .await?;
        let results = search_results(response);
        debug!(term, count = results.len(), "search completed");
        Ok(results)
    }

    async fn fetch_suggestion(&self, term: &str) -> Result<Option<String>, SearchError> {
        let value: serde_json::Value = self
            .get_json(&[
                ("action", "opensearch"),
                ("search", term),
                ("limit", "1"),
                ("namespace", "0"),
                ("format", "json"),
            ])
            .await?;
        opensearch_suggestion(&value, term)
    }
}
