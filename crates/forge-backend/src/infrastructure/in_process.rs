//! InProcessBackend: the backend served from the client's own process.
//!
//! # Threading model (for beginners)
//!
//! The client calls the backend through the async [`Gateway`] trait, possibly
//! with several calls outstanding at once.  All backend state sits behind a
//! single `std::sync::Mutex`; every call takes the lock, does a short
//! synchronous update, and releases it before returning.  The lock is never
//! held across an `.await`, so a plain (non-async) mutex is enough.
//!
//! # Notifications
//!
//! Effective changes are announced on a `tokio::sync::broadcast` channel:
//!
//! | Change                                 | Notification       |
//! |----------------------------------------|--------------------|
//! | catalog cache rebuilt                  | `CatalogRefreshed` |
//! | entry saved, launched, or removed      | `LibraryChanged`   |
//!
//! Calls that change nothing (saving an already-saved item, removing a
//! missing entry) emit nothing.  Sending with no subscribers is not an error.
//!
//! # Simulated latency
//!
//! [`InProcessBackend::with_latency`] delays every call by a fixed duration
//! before it touches any state.  Demos use it to make overlapping requests
//! observable.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use forge_core::{
    CatalogFilter, CatalogItem, Gateway, GatewayError, LibraryEntry, Notification, Provider,
    RefreshSummary, RuntimeConfig, RuntimeConfigPatch,
};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::application::catalog_index::{CatalogAdapter, CatalogIndex};
use crate::application::library_registry::LibraryRegistry;
use crate::application::runtime_settings::RuntimeSettings;
use crate::infrastructure::adapters::configured_adapters;

/// Capacity of the notification channel.  Subscribers that fall further
/// behind than this lose the oldest notifications.
const NOTIFICATION_CAPACITY: usize = 64;

struct BackendState {
    catalog: CatalogIndex,
    library: LibraryRegistry,
    settings: RuntimeSettings,
}

impl BackendState {
    fn runtime_config(&self) -> RuntimeConfig {
        self.settings
            .to_config(self.library.len(), self.library.running_count())
    }
}

/// A [`Gateway`] backed by in-memory state.
pub struct InProcessBackend {
    adapters: Vec<Box<dyn CatalogAdapter>>,
    state: Mutex<BackendState>,
    notifications: broadcast::Sender<Notification>,
    latency: Duration,
}

impl InProcessBackend {
    /// Creates a backend over the built-in provider adapters.
    pub fn new() -> Self {
        Self::with_adapters(configured_adapters())
    }

    /// Creates a backend over `adapters`; the catalog is built immediately.
    pub fn with_adapters(adapters: Vec<Box<dyn CatalogAdapter>>) -> Self {
        let catalog = CatalogIndex::build(&adapters);
        let (notifications, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self {
            adapters,
            state: Mutex::new(BackendState {
                catalog,
                library: LibraryRegistry::new(),
                settings: RuntimeSettings::default(),
            }),
            notifications,
            latency: Duration::ZERO,
        }
    }

    /// Delays every gateway call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Returns a receiver for every notification sent from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, BackendState>, GatewayError> {
        self.state
            .lock()
            .map_err(|_| GatewayError::Unavailable("backend state lock poisoned".to_string()))
    }

    fn notify(&self, notification: Notification) {
        // Err only means nobody is subscribed.
        let receivers = self.notifications.send(notification).unwrap_or(0);
        debug!(%notification, receivers, "notification sent");
    }
}

impl Default for InProcessBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[async_trait]
impl Gateway for InProcessBackend {
    async fn list_providers(&self) -> Result<Vec<Provider>, GatewayError> {
        self.simulate_latency().await;
        Ok(self.lock()?.catalog.providers().to_vec())
    }

    async fn list_catalog_items(
        &self,
        filter: &CatalogFilter,
    ) -> Result<Vec<CatalogItem>, GatewayError> {
        self.simulate_latency().await;
        Ok(self.lock()?.catalog.filter(filter))
    }

    async fn get_catalog_item(&self, id: &str) -> Result<Option<CatalogItem>, GatewayError> {
        self.simulate_latency().await;
        Ok(self.lock()?.catalog.get(id).cloned())
    }

    async fn refresh_catalog_cache(&self) -> Result<RefreshSummary, GatewayError> {
        self.simulate_latency().await;
        let rebuilt = CatalogIndex::build(&self.adapters);
        let summary = RefreshSummary {
            items_discovered: u32::try_from(rebuilt.len()).unwrap_or(u32::MAX),
            providers_discovered: u32::try_from(rebuilt.providers().len()).unwrap_or(u32::MAX),
        };
        self.lock()?.catalog = rebuilt;

        info!(
            items = summary.items_discovered,
            providers = summary.providers_discovered,
            "catalog cache rebuilt"
        );
        self.notify(Notification::CatalogRefreshed);
        Ok(summary)
    }

    async fn list_library_entries(&self) -> Result<Vec<LibraryEntry>, GatewayError> {
        self.simulate_latency().await;
        Ok(self.lock()?.library.all())
    }

    async fn save_library_item(
        &self,
        catalog_item_id: &str,
    ) -> Result<Option<LibraryEntry>, GatewayError> {
        self.simulate_latency().await;
        let saved = {
            let mut state = self.lock()?;
            match state.catalog.get(catalog_item_id).cloned() {
                Some(item) => state.library.save(&item),
                None => None,
            }
        };

        if saved.is_some() {
            self.notify(Notification::LibraryChanged);
        }
        Ok(saved)
    }

    async fn launch_library_entry(
        &self,
        entry_id: &str,
    ) -> Result<Option<LibraryEntry>, GatewayError> {
        self.simulate_latency().await;
        let launched = self.lock()?.library.launch(entry_id, unix_now());

        if launched.is_some() {
            self.notify(Notification::LibraryChanged);
        }
        Ok(launched)
    }

    async fn remove_library_entry(&self, entry_id: &str) -> Result<bool, GatewayError> {
        self.simulate_latency().await;
        let removed = self.lock()?.library.remove(entry_id);

        if removed {
            self.notify(Notification::LibraryChanged);
        }
        Ok(removed)
    }

    async fn get_runtime_config(&self) -> Result<RuntimeConfig, GatewayError> {
        self.simulate_latency().await;
        Ok(self.lock()?.runtime_config())
    }

    async fn update_runtime_config(
        &self,
        patch: &RuntimeConfigPatch,
    ) -> Result<RuntimeConfig, GatewayError> {
        self.simulate_latency().await;
        let mut state = self.lock()?;
        state.settings.apply(patch);
        Ok(state.runtime_config())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    #[tokio::test]
    async fn test_save_unknown_item_returns_none_without_notification() {
        // Arrange
        let backend = InProcessBackend::new();
        let mut rx = backend.subscribe();

        // Act
        let saved = backend.save_library_item("no-such-item").await.unwrap();

        // Assert
        assert!(saved.is_none());
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn test_save_then_save_again_returns_none() {
        let backend = InProcessBackend::new();

        let first = backend.save_library_item("tftmeta-level-timer").await.unwrap();
        let second = backend.save_library_item("tftmeta-level-timer").await.unwrap();

        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(backend.list_library_entries().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_effective_library_changes_notify_subscribers() {
        let backend = InProcessBackend::new();
        let mut rx = backend.subscribe();

        backend.save_library_item("tftmeta-level-timer").await.unwrap();
        backend.launch_library_entry("tftmeta-level-timer").await.unwrap();
        backend.remove_library_entry("tftmeta-level-timer").await.unwrap();
        backend.remove_library_entry("tftmeta-level-timer").await.unwrap();

        for _ in 0..3 {
            assert_eq!(rx.try_recv(), Ok(Notification::LibraryChanged));
        }
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn test_runtime_counters_follow_the_library() {
        // Arrange
        let backend = InProcessBackend::new();
        backend.save_library_item("tftmeta-comp-scout").await.unwrap();
        backend.save_library_item("porofessor-rune-assist").await.unwrap();

        // Act
        backend.launch_library_entry("porofessor-rune-assist").await.unwrap();
        let config = backend.get_runtime_config().await.unwrap();

        // Assert
        assert_eq!(config.library_count, 2);
        assert_eq!(config.running_count, 1);
    }

    #[tokio::test]
    async fn test_update_runtime_config_echoes_clamped_value() {
        let backend = InProcessBackend::new();

        let echoed = backend
            .update_runtime_config(&RuntimeConfigPatch::new().sync_interval_sec(2))
            .await
            .unwrap();

        assert_eq!(echoed.sync_interval_sec, 5);
        assert_eq!(backend.get_runtime_config().await.unwrap(), echoed);
    }

    #[tokio::test]
    async fn test_refresh_reports_counts_and_notifies() {
        let backend = InProcessBackend::new();
        let mut rx = backend.subscribe();

        let summary = backend.refresh_catalog_cache().await.unwrap();

        assert_eq!(summary.items_discovered, 6);
        assert_eq!(summary.providers_discovered, 2);
        assert_eq!(rx.try_recv(), Ok(Notification::CatalogRefreshed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_latency_delays_calls() {
        let backend = InProcessBackend::new().with_latency(Duration::from_millis(250));
        let started = tokio::time::Instant::now();

        backend.list_providers().await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(250));
    }
}
