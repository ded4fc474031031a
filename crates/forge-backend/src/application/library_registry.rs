//! LibraryRegistry: the backend's record of every app the user saved.
//!
//! # Entry lifecycle (for beginners)
//!
//! ```text
//!   save ──►  idle  ──launch──►  running
//!               │                   │
//!               └───── remove ──────┴──►  (gone)
//! ```
//!
//! - `save` copies a catalog item into the library.  The new entry starts
//!   `idle` at version `1.0.0` and has never been launched.
//! - `launch` marks the entry `running` and stamps the launch time.
//!   Launching a running entry just refreshes the stamp.
//! - `remove` deletes the entry.
//!
//! Entries are kept in the order they were saved; that is the order the
//! library is listed in.

use forge_core::{CatalogItem, LibraryEntry, LifecycleState};

/// Version assigned to freshly saved entries.
pub const INITIAL_VERSION: &str = "1.0.0";

/// Ordered registry of saved library entries.
#[derive(Debug, Default)]
pub struct LibraryRegistry {
    entries: Vec<LibraryEntry>,
}

impl LibraryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all entries in save order.
    pub fn all(&self) -> Vec<LibraryEntry> {
        self.entries.clone()
    }

    pub fn get(&self, id: &str) -> Option<&LibraryEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries currently in the `running` state.
    pub fn running_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.state.is_running())
            .count()
    }

    /// Saves `item` as a new idle entry.
    ///
    /// Returns `None` when an entry with the same id already exists.
    pub fn save(&mut self, item: &CatalogItem) -> Option<LibraryEntry> {
        if self.contains(&item.id) {
            return None;
        }
        let entry = LibraryEntry {
            id: item.id.clone(),
            name: item.name.clone(),
            category: item.category.clone(),
            provider_id: item.provider_id.clone(),
            provider_name: item.provider_name.clone(),
            version: INITIAL_VERSION.to_string(),
            state: LifecycleState::Idle,
            last_launched: None,
        };
        self.entries.push(entry.clone());
        Some(entry)
    }

    /// Marks the entry running with `launched_at` (unix seconds).
    ///
    /// Returns `None` when no entry has this id.
    pub fn launch(&mut self, id: &str, launched_at: u64) -> Option<LibraryEntry> {
        let entry = self.entries.iter_mut().find(|entry| entry.id == id)?;
        entry.state = LifecycleState::Running;
        entry.last_launched = Some(launched_at);
        Some(entry.clone())
    }

    /// Removes the entry.  Returns `false` if there was nothing to remove.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }
}
