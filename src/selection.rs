//! Language selection for the popular repositories screen.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::BattleError;
use crate::fetch_cache::{CacheLookup, Completion, FetchCache, FetchTicket};
use crate::types::RepoSummary;

pub const DEFAULT_LANGUAGE: &str = "All";

/// Languages offered by the navigation bar.
pub const LANGUAGES: [&str; 5] = ["All", "JavaScript", "Ruby", "Java", "Python"];

pub type RepoList = Vec<RepoSummary>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    pub selected: String,
    pub error: Option<String>,
}

impl SelectionState {
    pub fn new(selected: impl Into<String>) -> Self {
        Self {
            selected: selected.into(),
            error: None,
        }
    }

    /// Switching key always clears the previous error.
    pub fn select(&self, key: &str) -> Self {
        Self {
            selected: key.to_string(),
            error: None,
        }
    }

    pub fn fail(&self, message: &str) -> Self {
        Self {
            selected: self.selected.clone(),
            error: Some(message.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum SelectionStatus {
    Loading,
    Error(String),
    Ready(Arc<RepoList>),
}

#[derive(Debug)]
pub struct SelectionController {
    state: SelectionState,
    cache: FetchCache<RepoList>,
}

impl SelectionController {
    pub fn new(default_key: impl Into<String>) -> Self {
        Self {
            state: SelectionState::new(default_key),
            cache: FetchCache::new(),
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn selected(&self) -> &str {
        &self.state.selected
    }

    pub fn cache(&self) -> &FetchCache<RepoList> {
        &self.cache
    }

    /// Returns a ticket when the caller has to fetch `key`.
    pub fn update_selection(&mut self, key: &str) -> Option<FetchTicket> {
        self.state = self.state.select(key);
        debug!(language = key, "selection changed");

        match self.cache.select(key) {
            CacheLookup::Miss(ticket) => Some(ticket),
            CacheLookup::Hit(_) | CacheLookup::Pending => None,
        }
    }

    pub fn apply_fetch(&mut self, ticket: FetchTicket, result: Result<RepoList, BattleError>) {
        let key = ticket.key().to_string();

        match self.cache.complete(ticket, result) {
            Completion::Stored => {
                info!(language = %key, "repositories cached");
            }
            Completion::Failed(e) => {
                warn!(language = %key, error = %e, "repository fetch failed");
                if key == self.state.selected {
                    self.state = self.state.fail(e.user_message());
                } else {
                    debug!(language = %key, selected = %self.state.selected, "ignoring failure for superseded selection");
                }
            }
            Completion::Stale => {}
        }
    }

    pub fn status(&self) -> SelectionStatus {
        if let Some(entry) = self.cache.get(&self.state.selected) {
            return SelectionStatus::Ready(entry);
        }
        match &self.state.error {
            Some(message) => SelectionStatus::Error(message.clone()),
            None => SelectionStatus::Loading,
        }
    }

    /// Forget everything fetched so far. Outstanding fetches become stale.
    pub fn unmount(&mut self) {
        self.cache.clear();
        self.state = SelectionState::new(self.state.selected.clone());
    }

    /// Unmount, then fetch the current key again.
    pub fn refresh(&mut self) -> Option<FetchTicket> {
        self.unmount();
        let current = self.state.selected.clone();
        self.update_selection(&current)
    }
}
