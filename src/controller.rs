//! Application controller: the search workflow state machine.
//!
//! ```text
//! Idle ──submit──▶ Searching ──ok──▶ Succeeded (Idle)
//!                      │
//!                      └──error/timeout──▶ Failed (Idle)
//! ```
//!
//! Every search is tagged with a monotonically increasing sequence number
//! carried by its [`SearchTicket`]. Results and suggestions arriving with a
//! ticket that is no longer the latest are dropped, so an older response can
//! never overwrite a newer query-of-record.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::history::HistoryManager;
use crate::model::types::{HistoryEntry, SearchResult};
use crate::pagination::{
    PageItem, PageState, clamp_page, page_count, paginate, renderable_page_list,
};
use crate::search::client::{SUGGESTION_THRESHOLD, normalize_suggestion};
use crate::search::{SearchBackend, SearchError};
use crate::storage::prefs::PreferenceStore;
use crate::ui::components::theme::ThemePreference;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    #[default]
    Idle,
    Searching,
    /// Idle after a successful search.
    Succeeded,
    /// Idle after a failed search. Rendered exactly like zero results.
    Failed,
}

/// Mutable UI state owned by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    /// Query-of-record: the term behind `results`, not the live input.
    pub query: String,
    pub results: Vec<SearchResult>,
    pub phase: SearchPhase,
    pub current_page: usize,
    pub suggestion: Option<String>,
    pub history_open: bool,
    /// Diagnostic text of the last failed search.
    pub last_failure: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            query: String::new(),
            results: Vec::new(),
            phase: SearchPhase::Idle,
            current_page: 1,
            suggestion: None,
            history_open: false,
            last_failure: None,
        }
    }
}

/// Identifies one submitted search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    seq: u64,
    term: String,
}

impl SearchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn term(&self) -> &str {
        &self.term
    }
}

/// One result as presented to a front end.
#[derive(Debug, Clone, Serialize)]
pub struct ResultView {
    pub page_id: i64,
    pub title: String,
    pub snippet: String,
    pub url: String,
}

/// Serializable view of everything a front end needs to draw.
#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    pub query: String,
    pub phase: SearchPhase,
    pub total_results: usize,
    pub page_size: usize,
    pub page: PageState,
    pub pages: Vec<PageItem>,
    pub results: Vec<ResultView>,
    pub suggestion: Option<String>,
    pub dark_mode: bool,
    pub history: Vec<HistoryEntry>,
}

pub struct Controller<B: SearchBackend> {
    backend: Arc<B>,
    state: AppState,
    history: HistoryManager,
    theme: ThemePreference,
    seq: u64,
    page_size: usize,
    request_timeout: Duration,
    article_base: String,
}

impl<B: SearchBackend> Controller<B> {
    pub fn new(
        backend: B,
        store: Arc<dyn PreferenceStore>,
        config: &AppConfig,
        system_dark: bool,
    ) -> Self {
        Self {
            backend: Arc::new(backend),
            state: AppState::default(),
            history: HistoryManager::load(Arc::clone(&store)),
            theme: ThemePreference::load(store, system_dark),
            seq: 0,
            page_size: config.page_size.max(1),
            request_timeout: config.request_timeout,
            article_base: config.article_base.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Search workflow
    // ------------------------------------------------------------------

    /// Enter `Searching` for `raw`. Returns `None` (and changes nothing) when
    /// the trimmed term is empty.
    pub fn begin_search(&mut self, raw: &str) -> Option<SearchTicket> {
        let term = raw.trim();
        if term.is_empty() {
            return None;
        }
        self.seq += 1;
        self.state.query = term.to_string();
        self.state.phase = SearchPhase::Searching;
        self.state.current_page = 1;
        self.state.suggestion = None;
        self.state.last_failure = None;
        debug!(seq = self.seq, term, "search started");
        Some(SearchTicket {
            seq: self.seq,
            term: term.to_string(),
        })
    }

    /// Apply the outcome of `ticket`'s search.
    ///
    /// Returns the ticket back when the result set is small enough that a
    /// suggestion should be fetched for it.
    pub fn finish_search(
        &mut self,
        ticket: SearchTicket,
        outcome: Result<Vec<SearchResult>, SearchError>,
    ) -> Option<SearchTicket> {
        if !self.is_current(&ticket) {
            debug!(
                seq = ticket.seq,
                latest = self.seq,
                term = %ticket.term,
                "dropping stale search response"
            );
            return None;
        }

        match outcome {
            Ok(results) => {
                info!(term = %ticket.term, count = results.len(), "search succeeded");
                let wants_suggestion = results.len() <= SUGGESTION_THRESHOLD;
                self.state.results = results;
                self.state.phase = SearchPhase::Succeeded;
                self.state.history_open = false;
                self.history.record(&ticket.term);
                wants_suggestion.then_some(ticket)
            }
            Err(e) => {
                warn!(term = %ticket.term, "search failed: {e}");
                self.state.results.clear();
                self.state.suggestion = None;
                self.state.phase = SearchPhase::Failed;
                self.state.last_failure = Some(e.to_string());
                None
            }
        }
    }

    /// Store a suggestion fetched for `ticket`. Returns false if the ticket is stale.
    pub fn apply_suggestion(&mut self, ticket: &SearchTicket, suggestion: Option<String>) -> bool {
        if !self.is_current(ticket) {
            debug!(seq = ticket.seq, latest = self.seq, "dropping stale suggestion");
            return false;
        }
        self.state.suggestion = normalize_suggestion(suggestion.as_deref(), &ticket.term);
        true
    }

    /// Submit `raw` and wait for its results (bounded by the request timeout).
    ///
    /// The returned ticket, if any, asks for a follow-up suggestion; pass it to
    /// [`Self::refine_suggestion`] or [`Self::spawn_suggestion`].
    pub async fn submit(&mut self, raw: &str) -> Option<SearchTicket> {
        let ticket = self.begin_search(raw)?;
        let limit = self.request_timeout;
        let outcome = match tokio::time::timeout(limit, self.backend.fetch_results(&ticket.term))
            .await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(SearchError::Timeout(limit)),
        };
        self.finish_search(ticket, outcome)
    }

    /// Fetch and apply the suggestion for `ticket` inline.
    pub async fn refine_suggestion(&mut self, ticket: SearchTicket) -> bool {
        let suggestion =
            suggestion_or_none(self.backend.as_ref(), &ticket.term, self.request_timeout).await;
        self.apply_suggestion(&ticket, suggestion)
    }

    /// Fetch the suggestion for `ticket` in the background. Feed the reply to
    /// [`Self::apply_suggestion`] when it resolves.
    pub fn spawn_suggestion(&self, ticket: SearchTicket) -> JoinHandle<(SearchTicket, Option<String>)> {
        let backend = Arc::clone(&self.backend);
        let limit = self.request_timeout;
        tokio::spawn(async move {
            let suggestion = suggestion_or_none(backend.as_ref(), &ticket.term, limit).await;
            (ticket, suggestion)
        })
    }

    /// Submit and, when warranted, wait for the suggestion as well.
    /// Returns false if the term was empty.
    pub async fn run_query(&mut self, raw: &str) -> bool {
        if raw.trim().is_empty() {
            return false;
        }
        if let Some(ticket) = self.submit(raw).await {
            self.refine_suggestion(ticket).await;
        }
        true
    }

    /// Re-run the history entry at `index` (0 = newest).
    pub async fn rerun_history(&mut self, index: usize) -> Option<SearchTicket> {
        let term = self.history.get(index)?.term.clone();
        self.submit(&term).await
    }

    /// Search for the current suggestion, if there is one.
    pub async fn accept_suggestion(&mut self) -> Option<SearchTicket> {
        let term = self.state.suggestion.clone()?;
        self.submit(&term).await
    }

    fn is_current(&self, ticket: &SearchTicket) -> bool {
        ticket.seq == self.seq
    }

    // ------------------------------------------------------------------
    // Pagination
    // ------------------------------------------------------------------

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_state(&self) -> PageState {
        PageState::new(
            self.state.current_page,
            page_count(self.state.results.len(), self.page_size),
        )
    }

    pub fn visible_results(&self) -> &[SearchResult] {
        paginate(&self.state.results, self.state.current_page, self.page_size)
    }

    pub fn page_list(&self) -> Vec<PageItem> {
        let page = self.page_state();
        renderable_page_list(page.current_page, page.total_pages)
    }

    /// Jump to `page`, clamped to the valid range. Returns the page now shown.
    pub fn set_page(&mut self, page: usize) -> usize {
        let total = page_count(self.state.results.len(), self.page_size);
        self.state.current_page = clamp_page(page, total);
        self.state.current_page
    }

    pub fn next_page(&mut self) -> bool {
        let page = self.page_state();
        if !page.has_next() {
            return false;
        }
        self.set_page(page.current_page + 1);
        true
    }

    pub fn prev_page(&mut self) -> bool {
        let page = self.page_state();
        if !page.has_prev() {
            return false;
        }
        self.set_page(page.current_page - 1);
        true
    }

    // ------------------------------------------------------------------
    // History, theme, and view state
    // ------------------------------------------------------------------

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn remove_history(&mut self, term: &str) -> bool {
        self.history.remove(term)
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn open_history(&mut self) {
        self.state.history_open = true;
    }

    pub fn close_history(&mut self) {
        self.state.history_open = false;
    }

    pub fn theme(&self) -> &ThemePreference {
        &self.theme
    }

    /// Flip dark mode. Returns the new value.
    pub fn toggle_theme(&mut self) -> bool {
        self.theme.toggle()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn article_base(&self) -> &str {
        &self.article_base
    }

    pub fn snapshot(&self) -> StateSnapshot {
        let results = self
            .visible_results()
            .iter()
            .map(|r| ResultView {
                page_id: r.page_id,
                title: r.title.clone(),
                snippet: r.snippet_text(),
                url: r.article_url(&self.article_base),
            })
            .collect();
        StateSnapshot {
            query: self.state.query.clone(),
            phase: self.state.phase,
            total_results: self.state.results.len(),
            page_size: self.page_size,
            page: self.page_state(),
            pages: self.page_list(),
            results,
            suggestion: self.state.suggestion.clone(),
            dark_mode: self.theme.is_dark(),
            history: self.history.entries().to_vec(),
        }
    }
}

async fn suggestion_or_none<B: SearchBackend>(
    backend: &B,
    term: &str,
    limit: Duration,
) -> Option<String> {
    match tokio::time::timeout(limit, backend.fetch_suggestion(term)).await {
        Ok(Ok(suggestion)) => suggestion,
        Ok(Err(e)) => {
            debug!(term, "suggestion lookup failed: {e}");
            None
        }
        Err(_) => {
            debug!(term, "suggestion lookup timed out");
            None
        }
    }
}
