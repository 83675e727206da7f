//! Search history: newest-first, one entry per term, capped at
//! [`MAX_HISTORY_ENTRIES`].
//!
//! The list is persisted to the preference store as a JSON array after every
//! mutation. Store failures are logged and the in-memory list stays
//! authoritative for the rest of the session.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::model::types::HistoryEntry;
use crate::storage::prefs::{HISTORY_KEY, PreferenceStore, StoreError};

/// Maximum number of history entries kept.
pub const MAX_HISTORY_ENTRIES: usize = 50;

pub struct HistoryManager {
    store: Arc<dyn PreferenceStore>,
    entries: Vec<HistoryEntry>,
}

impl HistoryManager {
    /// Load history from `store`. Missing or corrupt data yields an empty list.
    pub fn load(store: Arc<dyn PreferenceStore>) -> Self {
        let entries = match store.get(HISTORY_KEY) {
            Some(raw) => match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
                Ok(entries) => sanitize(entries),
                Err(e) => {
                    warn!("search history is corrupt, starting empty: {e}");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        debug!(count = entries.len(), "loaded search history");
        Self { store, entries }
    }

    /// Write the current list to the store.
    pub fn save(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string(&self.entries)?;
        self.store.set(HISTORY_KEY, &json)
    }

    /// Move `term` to the front with the current time.
    pub fn record(&mut self, term: &str) {
        self.record_at(term, Utc::now().timestamp_millis());
    }

    /// Move `term` to the front with an explicit timestamp.
    pub fn record_at(&mut self, term: &str, timestamp: i64) {
        self.entries.retain(|e| e.term != term);
        self.entries.insert(0, HistoryEntry::new(term, timestamp));
        self.entries.truncate(MAX_HISTORY_ENTRIES);
        self.persist();
    }

    /// Drop the entry for `term`, if any.
    pub fn remove(&mut self, term: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.term != term);
        let removed = self.entries.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            warn!("failed to persist search history: {e}");
        }
    }
}

/// Re-establish list invariants on data written by someone else.
fn sanitize(entries: Vec<HistoryEntry>) -> Vec<HistoryEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter_map(|mut e| {
            let trimmed = e.term.trim();
            if trimmed.is_empty() {
                return None;
            }
            if trimmed.len() != e.term.len() {
                e.term = trimmed.to_string();
            }
            seen.insert(e.term.clone()).then_some(e)
        })
        .take(MAX_HISTORY_ENTRIES)
        .collect()
}
