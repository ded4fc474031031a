//! The Backend Gateway contract.
//!
//! The [`Gateway`] trait lists every request/response call the client may
//! make.  The client depends only on this trait; the in-process backend (and
//! any remote transport) implements it.
//!
//! # Absent vs. error
//!
//! Calls that look something up return `Ok(None)` when the referenced item
//! does not exist.  `Err(GatewayError)` is reserved for failures to get an
//! answer at all ([`GatewayError::Unavailable`]) and for business rules the
//! backend refuses to apply ([`GatewayError::Rejected`]).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::catalog::{CatalogFilter, CatalogItem, Provider};
use crate::domain::library::LibraryEntry;
use crate::domain::runtime::{RuntimeConfig, RuntimeConfigPatch};

/// Failure reported by a gateway call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The backend could not be reached or did not produce an answer.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The backend refused the request on a business rule.
    #[error("backend rejected the request: {0}")]
    Rejected(String),
}

/// Aggregate counts returned by a catalog cache rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSummary {
    pub items_discovered: u32,
    pub providers_discovered: u32,
}

/// Request/response operations offered by the backend.
///
/// All methods take `&self`; implementations are shared between concurrently
/// outstanding calls.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Lists providers in display order.
    async fn list_providers(&self) -> Result<Vec<Provider>, GatewayError>;

    /// Lists catalog items matching `filter`, in display order.
    async fn list_catalog_items(
        &self,
        filter: &CatalogFilter,
    ) -> Result<Vec<CatalogItem>, GatewayError>;

    /// Fetches one item's full detail; `None` if it no longer exists.
    async fn get_catalog_item(&self, id: &str) -> Result<Option<CatalogItem>, GatewayError>;

    /// Rebuilds the upstream catalog cache.
    async fn refresh_catalog_cache(&self) -> Result<RefreshSummary, GatewayError>;

    /// Lists library entries in display order.
    async fn list_library_entries(&self) -> Result<Vec<LibraryEntry>, GatewayError>;

    /// Copies a catalog item into the library.
    ///
    /// `None` means the item is already saved or no longer exists.
    async fn save_library_item(
        &self,
        catalog_item_id: &str,
    ) -> Result<Option<LibraryEntry>, GatewayError>;

    /// Marks an entry running and stamps its launch time.
    ///
    /// `None` means the entry no longer exists.
    async fn launch_library_entry(
        &self,
        entry_id: &str,
    ) -> Result<Option<LibraryEntry>, GatewayError>;

    /// Deletes an entry; `false` if there was nothing to delete.
    async fn remove_library_entry(&self, entry_id: &str) -> Result<bool, GatewayError>;

    /// Reads the runtime configuration including the derived counters.
    async fn get_runtime_config(&self) -> Result<RuntimeConfig, GatewayError>;

    /// Applies a partial update and returns the resulting configuration.
    async fn update_runtime_config(
        &self,
        patch: &RuntimeConfigPatch,
    ) -> Result<RuntimeConfig, GatewayError>;
}
