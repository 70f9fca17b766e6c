//! Session-wide filter/navigation state
//!
//! Single source of truth for the selected organization, project, date
//! filtering, metadata filters, and table pagination. The store is an
//! explicit, injectable container (passed around behind an `Arc`, never an
//! ambient global): typed setters mutate the state under a lock and publish
//! the new snapshot on a watch channel for subscribers.
//!
//! All setters are synchronous, infallible, in-memory mutations. Writers are
//! last-writer-wins; concurrent read-modify-write (e.g. a pagination reset
//! racing a manual page change) must go through
//! [`FilterStore::update_tasks_pagination`].
//!
//! The state is the only locally persisted artifact: each mutation is
//! serialized to a JSON file so it survives in-session navigation, and
//! [`FilterStore::clear_storage`] purges it on logout or unrecoverable
//! render errors.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::{DateRange, DateRangePreset, FilterSet};

/// Table pagination owned by the filter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Zero-based page index
    pub page_index: usize,
    /// Rows per page, always positive
    pub page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: 10,
        }
    }
}

/// Snapshot of the navigation state shared across views.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationState {
    pub selected_org_id: Option<String>,
    pub project_id: Option<String>,
    pub data_filters: FilterSet,
    pub tasks_pagination: Pagination,
}

/// Injectable store for the navigation state.
pub struct FilterStore {
    state: Mutex<NavigationState>,
    tx: watch::Sender<NavigationState>,
    storage_path: Option<PathBuf>,
}

impl FilterStore {
    /// In-memory store without persistence.
    pub fn new() -> Self {
        Self::with_storage(None)
    }

    /// Store backed by a JSON file; prior state is restored if present.
    pub fn with_storage(storage_path: Option<PathBuf>) -> Self {
        let initial = storage_path
            .as_deref()
            .and_then(load_state)
            .unwrap_or_default();
        let (tx, _rx) = watch::channel(initial.clone());
        Self {
            state: Mutex::new(initial),
            tx,
            storage_path,
        }
    }

    /// Current state snapshot.
    pub fn snapshot(&self) -> NavigationState {
        self.state.lock().unwrap().clone()
    }

    /// Subscribe to state snapshots; the receiver always holds the latest.
    pub fn subscribe(&self) -> watch::Receiver<NavigationState> {
        self.tx.subscribe()
    }

    /// Select an organization.
    ///
    /// Selecting a new org does not clear the project filter state; callers
    /// that want both cleared must call [`FilterStore::set_project_id`] too.
    pub fn set_selected_org_id(&self, org_id: Option<String>) {
        self.mutate(|state| state.selected_org_id = org_id);
    }

    /// Select a project.
    pub fn set_project_id(&self, project_id: Option<String>) {
        self.mutate(|state| state.project_id = project_id);
    }

    /// Select a preset time window.
    ///
    /// The preset takes display precedence but the stored explicit range is
    /// not deleted; clearing the preset brings it back.
    pub fn set_date_range_preset(&self, preset: Option<DateRangePreset>) {
        self.mutate(|state| state.data_filters.date_range_preset = preset);
    }

    /// Set an explicit time window, normalized to whole days.
    ///
    /// Does NOT clear the preset: a non-null preset keeps display
    /// precedence until the caller passes `set_date_range_preset(None)`.
    pub fn set_date_range(&self, range: DateRange) {
        self.mutate(|state| state.data_filters.date_range = Some(range.normalized()));
    }

    /// Replace the data filters wholesale.
    ///
    /// This is a full replace, not a merge; callers wanting a partial update
    /// must spread the previous value themselves.
    pub fn set_data_filters(&self, filters: FilterSet) {
        self.mutate(|state| state.data_filters = filters);
    }

    /// Update the task-id search term; resets the page index.
    pub fn set_task_id_search(&self, search: Option<String>) {
        self.mutate(|state| {
            state.data_filters.task_id_search = search;
            state.tasks_pagination.page_index = 0;
        });
    }

    /// Update the session-id search term; resets the page index.
    pub fn set_session_id_search(&self, search: Option<String>) {
        self.mutate(|state| {
            state.data_filters.session_id_search = search;
            state.tasks_pagination.page_index = 0;
        });
    }

    /// Set pagination to a fixed value.
    pub fn set_tasks_pagination(&self, pagination: Pagination) {
        self.mutate(|state| state.tasks_pagination = pagination);
    }

    /// Update pagination from its current value.
    ///
    /// Use this form when another writer may race (e.g. a search-driven
    /// page reset): the closure sees the value as of this mutation.
    pub fn update_tasks_pagination(&self, f: impl FnOnce(Pagination) -> Pagination) {
        self.mutate(|state| state.tasks_pagination = f(state.tasks_pagination));
    }

    /// Reset the state and purge the persisted file.
    ///
    /// Invoked on logout and on unrecoverable render errors.
    pub fn clear_storage(&self) {
        {
            let mut state = self.state.lock().unwrap();
            *state = NavigationState::default();
        }
        if let Some(path) = &self.storage_path {
            if let Err(e) = std::fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), error = %e, "failed to purge filter state");
                }
            }
        }
        self.tx.send_replace(NavigationState::default());
    }

    fn mutate(&self, f: impl FnOnce(&mut NavigationState)) {
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            f(&mut state);
            state.clone()
        };
        self.persist(&snapshot);
        self.tx.send_replace(snapshot);
    }

    fn persist(&self, state: &NavigationState) {
        let Some(path) = &self.storage_path else {
            return;
        };
        let result = serde_json::to_string_pretty(state)
            .map_err(crate::error::Error::from)
            .and_then(|json| {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, json).map_err(crate::error::Error::from)
            });
        // Persistence is best-effort; setters stay infallible.
        if let Err(e) = result {
            tracing::warn!(path = %path.display(), error = %e, "failed to persist filter state");
        }
    }
}

impl Default for FilterStore {
    fn default() -> Self {
        Self::new()
    }
}

fn load_state(path: &Path) -> Option<NavigationState> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(state) => Some(state),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt filter state");
            None
        }
    }
}
