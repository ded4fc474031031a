//! The Domain Snapshot Store: the client-side copy of every backend domain.
//!
//! The store holds four independent sub-snapshots:
//!
//! | Sub-snapshot          | Contents                                         |
//! |-----------------------|--------------------------------------------------|
//! | [`CatalogSnapshot`]   | filter, matching items, and the selection cursor |
//! | [`LibrarySnapshot`]   | saved library entries                            |
//! | [`RuntimeSnapshot`]   | last runtime configuration echoed by the backend |
//! | [`ProviderSnapshot`]  | provider reference data                          |
//!
//! The store is a pure data holder.  Every setter compares the incoming value
//! with the current one and reports whether anything changed, so the caller
//! can project exactly the mutations that happened and nothing else.
//!
//! # Invariants held by the setters
//!
//! - Catalog item ids are unique within a listing, and library entry ids are
//!   unique within the library; duplicates are dropped (first one wins).
//! - Replacing the catalog listing and re-evaluating the selection is one
//!   step: after [`DomainStore::replace_catalog`] the selection either refers
//!   to an item of the new listing or is cleared.
//! - Nothing here derives runtime counters from the library.

use std::collections::HashSet;

use crate::domain::catalog::{CatalogFilter, CatalogItem, Provider};
use crate::domain::library::LibraryEntry;
use crate::domain::runtime::RuntimeConfig;

/// What happened to the selection when a new catalog listing was stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    /// Nothing was selected before the replacement.
    NoSelection,
    /// The selected item is part of the new listing and stays selected.
    Preserved,
    /// The selected item is absent from the new listing; the selection was
    /// cleared.
    Cleared,
}

/// Catalog listing plus the currently inspected item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSnapshot {
    filter: CatalogFilter,
    items: Vec<CatalogItem>,
    selection: Option<CatalogItem>,
}

impl CatalogSnapshot {
    /// The filter that produced [`CatalogSnapshot::items`].
    pub fn filter(&self) -> &CatalogFilter {
        &self.filter
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    /// Full detail of the inspected item, if any.
    pub fn selection(&self) -> Option<&CatalogItem> {
        self.selection.as_ref()
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selection.as_ref().map(|item| item.id.as_str())
    }
}

/// Saved library entries, in backend order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibrarySnapshot {
    entries: Vec<LibraryEntry>,
}

impl LibrarySnapshot {
    pub fn entries(&self) -> &[LibraryEntry] {
        &self.entries
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
}

/// The runtime configuration as last echoed by the backend.
///
/// `None` until the first successful fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeSnapshot {
    config: Option<RuntimeConfig>,
}

impl RuntimeSnapshot {
    pub fn config(&self) -> Option<&RuntimeConfig> {
        self.config.as_ref()
    }
}

/// Provider reference data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSnapshot {
    providers: Vec<Provider>,
}

impl ProviderSnapshot {
    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }
}

/// Authoritative client-side copy of all domains.
///
/// See the [module documentation](self) for the invariants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainStore {
    catalog: CatalogSnapshot,
    library: LibrarySnapshot,
    runtime: RuntimeSnapshot,
    providers: ProviderSnapshot,
}

impl DomainStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog(&self) -> &CatalogSnapshot {
        &self.catalog
    }

    pub fn library(&self) -> &LibrarySnapshot {
        &self.library
    }

    pub fn runtime(&self) -> &RuntimeSnapshot {
        &self.runtime
    }

    pub fn providers(&self) -> &ProviderSnapshot {
        &self.providers
    }

    // ── Catalog + selection ──────────────────────────────────────────────────

    /// Replaces the catalog listing wholesale and re-evaluates the selection
    /// in the same step.
    ///
    /// A selected item that is present in `items` stays selected and its
    /// detail is superseded by the new listing's copy; one that is absent is
    /// cleared.
    ///
    /// Returns `None` when the filter, the listing, and the selection are all
    /// unchanged.
    pub fn replace_catalog(
        &mut self,
        filter: CatalogFilter,
        items: Vec<CatalogItem>,
    ) -> Option<SelectionChange> {
        let items = dedup_by_id(items, |item| &item.id);

        let (selection, change) = match self.catalog.selection.as_ref() {
            None => (None, SelectionChange::NoSelection),
            Some(selected) => match items.iter().find(|item| item.id == selected.id) {
                Some(fresh) => (Some(fresh.clone()), SelectionChange::Preserved),
                None => (None, SelectionChange::Cleared),
            },
        };

        let next = CatalogSnapshot {
            filter,
            items,
            selection,
        };
        if next == self.catalog {
            return None;
        }
        self.catalog = next;
        Some(change)
    }

    /// Makes `item` the selection.  The item does not have to be part of the
    /// current listing.
    pub fn select(&mut self, item: CatalogItem) -> bool {
        if self.catalog.selection.as_ref() == Some(&item) {
            return false;
        }
        self.catalog.selection = Some(item);
        true
    }

    /// Clears the selection.  Returns `false` when nothing was selected.
    pub fn clear_selection(&mut self) -> bool {
        self.catalog.selection.take().is_some()
    }

    // ── Library ──────────────────────────────────────────────────────────────

    /// Replaces every library entry.
    pub fn replace_library(&mut self, entries: Vec<LibraryEntry>) -> bool {
        let entries = dedup_by_id(entries, |entry| &entry.id);
        if entries == self.library.entries {
            return false;
        }
        self.library.entries = entries;
        true
    }

    /// Updates the entry with the same id in place, or appends it.
    pub fn upsert_library_entry(&mut self, entry: LibraryEntry) -> bool {
        match self.library.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) if *existing == entry => false,
            Some(existing) => {
                *existing = entry;
                true
            }
            None => {
                self.library.entries.push(entry);
                true
            }
        }
    }

    /// Removes the entry with `id`.  Returns `false` when it was not present.
    pub fn remove_library_entry(&mut self, id: &str) -> bool {
        let before = self.library.entries.len();
        self.library.entries.retain(|entry| entry.id != id);
        self.library.entries.len() != before
    }

    // ── Runtime config ───────────────────────────────────────────────────────

    pub fn replace_runtime(&mut self, config: RuntimeConfig) -> bool {
        if self.runtime.config.as_ref() == Some(&config) {
            return false;
        }
        self.runtime.config = Some(config);
        true
    }

    // ── Providers ────────────────────────────────────────────────────────────

    pub fn replace_providers(&mut self, providers: Vec<Provider>) -> bool {
        let providers = dedup_by_id(providers, |provider| &provider.id);
        if providers == self.providers.providers {
            return false;
        }
        self.providers.providers = providers;
        true
    }
}

/// Drops every element whose id was already seen, keeping the first.
fn dedup_by_id<T>(items: Vec<T>, id: impl Fn(&T) -> &String) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(id(item).clone()))
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
