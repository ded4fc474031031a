//! SyncController: keeps the Domain Snapshot Store consistent with the backend.
//!
//! This is the heart of the client.  Every user action and every backend
//! notification ends up as one call on [`SyncController`], and the controller
//! is the only code that ever writes to the [`DomainStore`].
//!
//! # The hazard (for beginners)
//!
//! Every operation suspends while it waits for the backend, and other
//! operations run in the meantime.  Without care, three things go wrong:
//!
//! 1. **Out-of-order answers.**  The user types a filter, and a moment later
//!    the backend announces a catalog rebuild.  Both trigger a catalog
//!    listing.  If the older listing arrives last it would overwrite the
//!    newer one.
//! 2. **Torn views.**  Saving an app changes the library *and* the runtime
//!    counters.  If the two were stored separately, the screen could show
//!    the new library next to the old "N apps saved" line.
//! 3. **Duplicate expensive work.**  Clicking "refresh sources" twice would
//!    rebuild the backend cache twice.
//!
//! # How each hazard is handled
//!
//! 1. Each domain (catalog, selection, library, runtime) has its own
//!    [`RequestSequence`].  A request takes a tag before it is sent; when the
//!    answer arrives the controller checks, under the store lock, that no
//!    newer tag was issued since.  Otherwise the answer is discarded and the
//!    operation reports [`Landing::Superseded`].
//! 2. Library changes always travel with a runtime fetch.  Both answers are
//!    awaited first, then written and projected in one step as
//!    [`SnapshotView::LibraryWithRuntime`].  Library mutations (save, launch,
//!    remove) are additionally queued behind each other, so one mutation
//!    never discards another mutation's entry update.
//! 3. [`SyncController::refresh_catalog_cache`] holds an in-flight flag; a
//!    second call while it is set fails with [`SyncError::Busy`].
//!
//! ```text
//!   command / notification
//!            │
//!            ▼
//!   issue tag ──► gateway call (suspends, bounded by the call timeout)
//!                        │
//!                        ▼
//!   ┌──────── store lock ─────────────────────────┐
//!   │ tag still latest? ── no ──► Superseded       │
//!   │        │ yes                                  │
//!   │ compare-and-replace ── unchanged ──► done    │
//!   │        │ changed                              │
//!   │ projector.project(view) ──► view channel     │
//!   └──────────────────────────────────────────────┘
//! ```
//!
//! The store lock is a plain `std::sync::Mutex` that is never held across an
//! `.await`, so each write and its projection happen before any other write
//! can begin.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use forge_core::{
    CatalogFilter, DomainStore, Gateway, GatewayError, LibraryEntry, RefreshSummary,
    RequestSequence, RuntimeConfig, RuntimeConfigPatch, SelectionChange, SequenceTag,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::errors::{Operation, SyncError};
use super::projector::{Projector, SnapshotView};

/// Per-call gateway timeout used when none is configured.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Construction-time settings for [`SyncController`].
#[derive(Debug, Clone, PartialEq)]
pub struct SyncSettings {
    /// Upper bound on every individual gateway call.
    pub call_timeout: Duration,
    /// Filter used by [`SyncController::initialize`] and by catalog resyncs
    /// until the first [`SyncController::apply_filter`].
    pub initial_filter: CatalogFilter,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            call_timeout: DEFAULT_CALL_TIMEOUT,
            initial_filter: CatalogFilter::unfiltered(),
        }
    }
}

/// What a successful operation did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    /// The store changed and the change was projected.
    Applied,
    /// The answer was current but identical to what the store already held;
    /// nothing was projected.
    Unchanged,
    /// A newer request for the same domain was issued while this one was in
    /// flight; the answer was discarded.
    Superseded,
}

#[derive(Debug, Clone, Copy)]
enum Touched {
    Providers,
    Catalog,
    Runtime,
    LibraryWithRuntime,
}

/// Result of a write attempted under the store lock.
enum Write {
    Stale,
    Unchanged,
    Changed(Touched),
}

enum LibraryUpdate {
    Replace(Vec<LibraryEntry>),
    Upsert(LibraryEntry),
    Remove(String),
}

#[derive(Debug, Clone, Copy)]
struct PairTags {
    library: SequenceTag,
    runtime: SequenceTag,
}

#[derive(Debug, Default)]
struct Sequences {
    catalog: RequestSequence,
    selection: RequestSequence,
    library: RequestSequence,
    runtime: RequestSequence,
}

/// Clears the in-flight flag when the owning operation ends, on every path.
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// The Synchronization Controller.
///
/// All operations take `&self`, so one controller (usually in an `Arc`) can
/// serve many concurrently running operations.
pub struct SyncController<P: Projector> {
    gateway: Arc<dyn Gateway>,
    projector: P,
    views: mpsc::UnboundedSender<P::Output>,
    store: Mutex<DomainStore>,
    active_filter: Mutex<CatalogFilter>,
    sequences: Sequences,
    refresh_in_flight: AtomicBool,
    library_lane: tokio::sync::Mutex<()>,
    call_timeout: Duration,
}

impl<P: Projector> SyncController<P> {
    /// Creates a controller over an empty store.
    ///
    /// Returns the controller and the receiving end of the view channel: one
    /// projector output arrives there for every store mutation, in mutation
    /// order.
    pub fn new(
        gateway: Arc<dyn Gateway>,
        projector: P,
        settings: SyncSettings,
    ) -> (Self, mpsc::UnboundedReceiver<P::Output>) {
        let (views, rx) = mpsc::unbounded_channel();
        let controller = Self {
            gateway,
            projector,
            views,
            store: Mutex::new(DomainStore::new()),
            active_filter: Mutex::new(settings.initial_filter),
            sequences: Sequences::default(),
            refresh_in_flight: AtomicBool::new(false),
            library_lane: tokio::sync::Mutex::new(()),
            call_timeout: settings.call_timeout,
        };
        (controller, rx)
    }

    /// A copy of the current store contents.
    pub fn store(&self) -> DomainStore {
        self.lock_store().clone()
    }

    /// The filter of the most recently issued catalog listing.
    pub fn active_filter(&self) -> CatalogFilter {
        self.lock_active_filter().clone()
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// `true` while a catalog cache rebuild is outstanding.
    pub fn is_refreshing(&self) -> bool {
        self.refresh_in_flight.load(Ordering::Acquire)
    }

    // ── Startup ──────────────────────────────────────────────────────────────

    /// Loads the provider list, then the catalog (with the active filter) and
    /// the library + runtime pair concurrently.
    ///
    /// Each of the three lands on its own; a failure in one does not undo the
    /// others.  The first failure is returned.
    pub async fn initialize(&self) -> Result<(), SyncError> {
        let operation = Operation::Initialize;

        let providers = self.call(operation, self.gateway.list_providers()).await?;
        let provider_count = providers.len();
        self.commit(|store| {
            if store.replace_providers(providers) {
                Write::Changed(Touched::Providers)
            } else {
                Write::Unchanged
            }
        });

        let (filter, tag) = self.reissue_active_filter();
        let (catalog, library) = tokio::join!(
            self.fetch_catalog(operation, tag, filter),
            self.resync_pair(operation),
        );
        catalog?;
        library?;

        info!(providers = provider_count, "client initialized");
        Ok(())
    }

    // ── Catalog ──────────────────────────────────────────────────────────────

    /// Lists the catalog items matching `filter` and replaces the catalog
    /// snapshot with them.
    ///
    /// `filter` becomes the active filter immediately.  The selection is kept
    /// if the selected item is part of the new listing and cleared otherwise.
    pub async fn apply_filter(&self, filter: CatalogFilter) -> Result<Landing, SyncError> {
        let tag = {
            let mut active = self.lock_active_filter();
            *active = filter.clone();
            self.sequences.catalog.issue()
        };
        self.fetch_catalog(Operation::ApplyFilter, tag, filter).await
    }

    /// Asks the backend to rebuild its catalog cache, then relists the
    /// catalog with the active filter.
    ///
    /// # Errors
    ///
    /// [`SyncError::Busy`] if a rebuild requested through this controller is
    /// still outstanding; no request is sent in that case.
    pub async fn refresh_catalog_cache(&self) -> Result<RefreshSummary, SyncError> {
        let operation = Operation::RefreshCatalogCache;
        let _in_flight = BusyGuard::try_acquire(&self.refresh_in_flight)
            .ok_or(SyncError::Busy { operation })?;

        let summary = self
            .call(operation, self.gateway.refresh_catalog_cache())
            .await?;
        let (filter, tag) = self.reissue_active_filter();
        self.fetch_catalog(operation, tag, filter).await?;

        info!(
            items = summary.items_discovered,
            providers = summary.providers_discovered,
            "sources refreshed: {} apps from {} providers",
            summary.items_discovered,
            summary.providers_discovered
        );
        Ok(summary)
    }

    /// Handles the backend's `catalog-refreshed` notification.
    pub async fn on_backend_catalog_refreshed(&self) -> Result<Landing, SyncError> {
        let (filter, tag) = self.reissue_active_filter();
        self.fetch_catalog(Operation::CatalogRefreshed, tag, filter)
            .await
    }

    /// Fetches one item's full detail and makes it the selection.
    ///
    /// The item does not have to be part of the current listing.
    ///
    /// # Errors
    ///
    /// [`SyncError::NotFound`] if the item no longer exists; the selection is
    /// cleared first (unless a newer inspection is already under way).
    pub async fn inspect_item(&self, id: &str) -> Result<Landing, SyncError> {
        let operation = Operation::InspectItem;
        let tag = self.sequences.selection.issue();

        match self.call(operation, self.gateway.get_catalog_item(id)).await? {
            Some(item) => Ok(self.commit(|store| {
                if !is_latest("selection", &self.sequences.selection, tag) {
                    return Write::Stale;
                }
                if store.select(item) {
                    Write::Changed(Touched::Catalog)
                } else {
                    Write::Unchanged
                }
            })),
            None => {
                self.commit(|store| {
                    if !is_latest("selection", &self.sequences.selection, tag) {
                        return Write::Stale;
                    }
                    if store.clear_selection() {
                        Write::Changed(Touched::Catalog)
                    } else {
                        Write::Unchanged
                    }
                });
                Err(SyncError::NotFound {
                    operation,
                    id: id.to_string(),
                })
            }
        }
    }

    // ── Library ──────────────────────────────────────────────────────────────

    /// Saves a catalog item to the library.
    ///
    /// # Errors
    ///
    /// When the backend saves nothing the store is left untouched and the
    /// error says why: [`SyncError::Rejected`] if the library already holds
    /// the item, [`SyncError::NotFound`] otherwise.
    pub async fn save_to_library(&self, catalog_item_id: &str) -> Result<Landing, SyncError> {
        let operation = Operation::SaveToLibrary;
        let _lane = self.library_lane.lock().await;

        let saved = self
            .call(operation, self.gateway.save_library_item(catalog_item_id))
            .await?;
        let Some(entry) = saved else {
            let already_saved = self.lock_store().library().contains(catalog_item_id);
            return Err(if already_saved {
                SyncError::Rejected {
                    operation,
                    reason: format!("{catalog_item_id} is already in the library"),
                }
            } else {
                SyncError::NotFound {
                    operation,
                    id: catalog_item_id.to_string(),
                }
            });
        };

        let name = entry.name.clone();
        let landing = self
            .land_mutation(operation, LibraryUpdate::Upsert(entry))
            .await?;
        info!(entry = catalog_item_id, %name, "saved to library");
        Ok(landing)
    }

    /// Launches a library entry; the entry is updated in place.
    ///
    /// # Errors
    ///
    /// [`SyncError::NotFound`] if the entry no longer exists upstream; a
    /// local copy is removed (with a runtime resync) before returning.
    pub async fn launch(&self, entry_id: &str) -> Result<Landing, SyncError> {
        let operation = Operation::Launch;
        let _lane = self.library_lane.lock().await;

        match self
            .call(operation, self.gateway.launch_library_entry(entry_id))
            .await?
        {
            Some(entry) => {
                let landing = self
                    .land_mutation(operation, LibraryUpdate::Upsert(entry))
                    .await?;
                info!(entry = entry_id, "launched app");
                Ok(landing)
            }
            None => {
                let known_locally = self.lock_store().library().contains(entry_id);
                if known_locally {
                    self.land_mutation(operation, LibraryUpdate::Remove(entry_id.to_string()))
                        .await?;
                }
                Err(SyncError::NotFound {
                    operation,
                    id: entry_id.to_string(),
                })
            }
        }
    }

    /// Removes a library entry.  Removing an entry that is already gone, both
    /// upstream and locally, succeeds without touching the store.
    pub async fn remove_from_library(&self, entry_id: &str) -> Result<Landing, SyncError> {
        let operation = Operation::RemoveFromLibrary;
        let _lane = self.library_lane.lock().await;

        let removed = self
            .call(operation, self.gateway.remove_library_entry(entry_id))
            .await?;
        let known_locally = self.lock_store().library().contains(entry_id);
        if !removed && !known_locally {
            debug!(entry = entry_id, "entry already absent");
            return Ok(Landing::Unchanged);
        }

        let landing = self
            .land_mutation(operation, LibraryUpdate::Remove(entry_id.to_string()))
            .await?;
        info!(entry = entry_id, "removed from library");
        Ok(landing)
    }

    /// Refetches the library and the runtime configuration as a pair.
    pub async fn resync_library(&self) -> Result<Landing, SyncError> {
        let landing = self.resync_pair(Operation::ResyncLibrary).await?;
        info!("library refreshed");
        Ok(landing)
    }

    /// Handles the backend's `library-changed` notification.
    pub async fn on_backend_library_changed(&self) -> Result<Landing, SyncError> {
        self.resync_pair(Operation::LibraryChanged).await
    }

    // ── Runtime ──────────────────────────────────────────────────────────────

    /// Validates and submits a partial runtime update, then stores the
    /// backend's echo (never the submitted values).
    ///
    /// The runtime tag is taken when the request goes out, so an echo that
    /// arrives after a later update's echo (or a later pair's counters) is
    /// discarded.
    ///
    /// # Errors
    ///
    /// [`SyncError::Invalid`] before any backend call if the patch fails
    /// validation.
    pub async fn update_runtime_config(
        &self,
        patch: RuntimeConfigPatch,
    ) -> Result<Landing, SyncError> {
        let operation = Operation::UpdateRuntimeConfig;
        patch
            .validate()
            .map_err(|source| SyncError::Invalid { operation, source })?;

        let tag = self.sequences.runtime.issue();
        let echoed = self
            .call(operation, self.gateway.update_runtime_config(&patch))
            .await?;
        let sync_interval_sec = echoed.sync_interval_sec;
        let landing = self.commit(|store| {
            if !is_latest("runtime", &self.sequences.runtime, tag) {
                return Write::Stale;
            }
            if store.replace_runtime(echoed) {
                Write::Changed(Touched::Runtime)
            } else {
                Write::Unchanged
            }
        });

        info!(sync_interval_sec, "runtime settings updated");
        Ok(landing)
    }

    // ── Internals ────────────────────────────────────────────────────────────

    fn lock_store(&self) -> MutexGuard<'_, DomainStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_active_filter(&self) -> MutexGuard<'_, CatalogFilter> {
        self.active_filter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn reissue_active_filter(&self) -> (CatalogFilter, SequenceTag) {
        let active = self.lock_active_filter();
        (active.clone(), self.sequences.catalog.issue())
    }

    /// Issues both tags under the store lock, so that two pairs can never
    /// interleave their tags (a pair whose library tag is older always has
    /// the older runtime tag too).
    fn issue_pair(&self) -> PairTags {
        let _store = self.lock_store();
        PairTags {
            library: self.sequences.library.issue(),
            runtime: self.sequences.runtime.issue(),
        }
    }

    /// Runs one gateway call under the call timeout.
    async fn call<T, F>(&self, operation: Operation, request: F) -> Result<T, SyncError>
    where
        F: Future<Output = Result<T, GatewayError>>,
    {
        match tokio::time::timeout(self.call_timeout, request).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(error)) => {
                warn!(%operation, %error, "gateway call failed");
                Err(SyncError::from_gateway(operation, error))
            }
            Err(_) => {
                warn!(
                    %operation,
                    timeout_ms = millis_saturating(self.call_timeout),
                    "gateway call timed out"
                );
                Err(SyncError::timed_out(operation, self.call_timeout))
            }
        }
    }

    async fn fetch_catalog(
        &self,
        operation: Operation,
        tag: SequenceTag,
        filter: CatalogFilter,
    ) -> Result<Landing, SyncError> {
        debug!(
            %operation,
            %tag,
            query = ?filter.query(),
            provider = ?filter.provider_id(),
            "listing catalog"
        );
        let items = self
            .call(operation, self.gateway.list_catalog_items(&filter))
            .await?;

        Ok(self.commit(|store| {
            if !is_latest("catalog", &self.sequences.catalog, tag) {
                return Write::Stale;
            }
            match store.replace_catalog(filter, items) {
                None => Write::Unchanged,
                Some(change) => {
                    if change == SelectionChange::Cleared {
                        debug!("selected item not in new listing; selection cleared");
                    }
                    Write::Changed(Touched::Catalog)
                }
            }
        }))
    }

    /// Fetches the runtime configuration after an acknowledged library
    /// mutation and lands both together.
    async fn land_mutation(
        &self,
        operation: Operation,
        update: LibraryUpdate,
    ) -> Result<Landing, SyncError> {
        let tags = self.issue_pair();
        let config = self
            .call(operation, self.gateway.get_runtime_config())
            .await?;
        Ok(self.land_pair(tags, update, config))
    }

    async fn resync_pair(&self, operation: Operation) -> Result<Landing, SyncError> {
        let tags = self.issue_pair();
        let (entries, config) = tokio::try_join!(
            self.call(operation, self.gateway.list_library_entries()),
            self.call(operation, self.gateway.get_runtime_config()),
        )?;
        Ok(self.land_pair(tags, LibraryUpdate::Replace(entries), config))
    }

    /// Writes a library update and its runtime configuration in one step.
    ///
    /// The pair is discarded if a newer library request exists.  The runtime
    /// half alone is skipped if a newer runtime request exists: that newer
    /// answer was issued after this one and already reflects this library
    /// state.
    fn land_pair(&self, tags: PairTags, update: LibraryUpdate, config: RuntimeConfig) -> Landing {
        self.commit(|store| {
            if !is_latest("library", &self.sequences.library, tags.library) {
                return Write::Stale;
            }
            let library_changed = match update {
                LibraryUpdate::Replace(entries) => store.replace_library(entries),
                LibraryUpdate::Upsert(entry) => store.upsert_library_entry(entry),
                LibraryUpdate::Remove(id) => store.remove_library_entry(&id),
            };
            let runtime_changed = if is_latest("runtime", &self.sequences.runtime, tags.runtime) {
                store.replace_runtime(config)
            } else {
                false
            };
            if library_changed || runtime_changed {
                Write::Changed(Touched::LibraryWithRuntime)
            } else {
                Write::Unchanged
            }
        })
    }

    /// Performs `write` under the store lock and, if it changed anything,
    /// projects the touched view before releasing the lock.
    fn commit(&self, write: impl FnOnce(&mut DomainStore) -> Write) -> Landing {
        let mut store = self.lock_store();
        let touched = match write(&mut *store) {
            Write::Stale => return Landing::Superseded,
            Write::Unchanged => return Landing::Unchanged,
            Write::Changed(touched) => touched,
        };

        let view = match touched {
            Touched::Providers => SnapshotView::Providers(store.providers()),
            Touched::Catalog => SnapshotView::Catalog(store.catalog()),
            Touched::Runtime => SnapshotView::Runtime(store.runtime()),
            Touched::LibraryWithRuntime => SnapshotView::LibraryWithRuntime {
                library: store.library(),
                runtime: store.runtime(),
            },
        };
        debug!(domain = view.domain(), "projecting");
        let output = self.projector.project(view);
        if self.views.send(output).is_err() {
            debug!("view receiver closed; projection dropped");
        }
        Landing::Applied
    }
}

fn is_latest(domain: &'static str, sequence: &RequestSequence, tag: SequenceTag) -> bool {
    let latest = sequence.is_latest(tag);
    if !latest {
        debug!(
            domain,
            %tag,
            latest = sequence.current(),
            "discarding stale response"
        );
    }
    latest
}

/// Milliseconds in `duration`, clamped to `u64::MAX`.
fn millis_saturating(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
