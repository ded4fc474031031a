//! UI command bridge: exposes controller operations to a UI shell as JSON.
//!
//! A desktop or web shell calls these functions (for example from a Tauri
//! command handler or a WebSocket message loop) and serialises the return
//! value straight to JSON.  Nothing in the application layer imports this
//! module.
//!
//! # Data Transfer Objects (DTOs)
//!
//! The store hands out borrowed snapshots with private fields.  The DTOs
//! here are plain owned structs with `camelCase` field names, so the JSON
//! matches what a JavaScript UI expects:
//!
//! ```json
//! { "id": "tftmeta-level-timer", "providerName": "TFT Meta", "priceUsd": 0.0 }
//! ```
//!
//! # `CommandResult<T>` envelope
//!
//! Every bridge function returns `CommandResult<T>` rather than `Result<T, E>`
//! so that every response has the same shape:
//! `{ success, data, error, errorKind, operation }`.  `errorKind` and
//! `operation` let the UI pick its wording ("already in progress", "no longer
//! exists") without parsing the message.

use forge_core::{
    CatalogFilter, CatalogItem, CatalogSnapshot, DomainStore, LibraryEntry, LibrarySnapshot,
    Provider, RefreshSummary, RuntimeConfig, RuntimeConfigPatch,
};
use serde::{Deserialize, Serialize};

use crate::application::errors::{ErrorKind, Operation, SyncError};
use crate::application::projector::Projector;
use crate::application::sync_controller::SyncController;

// ── Data Transfer Objects ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDto {
    pub id: String,
    pub name: String,
    pub region: String,
    pub source_url: String,
}

impl From<&Provider> for ProviderDto {
    fn from(p: &Provider) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            region: p.region.clone(),
            source_url: p.source_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItemDto {
    pub id: String,
    pub name: String,
    pub category: String,
    pub provider_id: String,
    pub provider_name: String,
    pub source_url: String,
    pub price_usd: f64,
    pub rating: f64,
    pub stock: u32,
}

impl From<&CatalogItem> for CatalogItemDto {
    fn from(item: &CatalogItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            category: item.category.clone(),
            provider_id: item.provider_id.clone(),
            provider_name: item.provider_name.clone(),
            source_url: item.source_url.clone(),
            price_usd: item.price_usd,
            rating: item.rating,
            stock: item.stock,
        }
    }
}

/// The Discover pane: active filter, listing, and the inspected item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverDto {
    pub query: Option<String>,
    pub provider: Option<String>,
    pub items: Vec<CatalogItemDto>,
    pub selected: Option<CatalogItemDto>,
}

impl From<&CatalogSnapshot> for DiscoverDto {
    fn from(catalog: &CatalogSnapshot) -> Self {
        Self {
            query: catalog.filter().query().map(str::to_string),
            provider: catalog.filter().provider_id().map(str::to_string),
            items: catalog.items().iter().map(CatalogItemDto::from).collect(),
            selected: catalog.selection().map(CatalogItemDto::from),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryEntryDto {
    pub id: String,
    pub name: String,
    pub category: String,
    pub provider_id: String,
    pub provider_name: String,
    pub version: String,
    pub state: String,
    pub last_launched: Option<u64>,
}

impl From<&LibraryEntry> for LibraryEntryDto {
    fn from(e: &LibraryEntry) -> Self {
        Self {
            id: e.id.clone(),
            name: e.name.clone(),
            category: e.category.clone(),
            provider_id: e.provider_id.clone(),
            provider_name: e.provider_name.clone(),
            version: e.version.clone(),
            state: e.state.to_string(),
            last_launched: e.last_launched,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfigDto {
    pub low_resource_mode: bool,
    pub ingestion_enabled: bool,
    pub sync_interval_sec: u32,
    pub library_count: u32,
    pub running_count: u32,
}

impl From<&RuntimeConfig> for RuntimeConfigDto {
    fn from(c: &RuntimeConfig) -> Self {
        Self {
            low_resource_mode: c.low_resource_mode,
            ingestion_enabled: c.ingestion_enabled,
            sync_interval_sec: c.sync_interval_sec,
            library_count: c.library_count,
            running_count: c.running_count,
        }
    }
}

/// The Library pane: entries plus the backend's counters, which arrive
/// together with every library change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryDto {
    pub entries: Vec<LibraryEntryDto>,
    pub runtime: Option<RuntimeConfigDto>,
}

impl LibraryDto {
    fn from_store(library: &LibrarySnapshot, runtime: Option<&RuntimeConfig>) -> Self {
        Self {
            entries: library.entries().iter().map(LibraryEntryDto::from).collect(),
            runtime: runtime.map(RuntimeConfigDto::from),
        }
    }
}

/// Partial runtime update as submitted by a settings form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfigPatchDto {
    pub low_resource_mode: Option<bool>,
    pub ingestion_enabled: Option<bool>,
    pub sync_interval_sec: Option<i64>,
}

impl From<RuntimeConfigPatchDto> for RuntimeConfigPatch {
    fn from(dto: RuntimeConfigPatchDto) -> Self {
        RuntimeConfigPatch {
            low_resource_mode: dto.low_resource_mode,
            ingestion_enabled: dto.ingestion_enabled,
            sync_interval_sec: dto.sync_interval_sec,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshDto {
    pub items: u32,
    pub providers: u32,
}

impl From<RefreshSummary> for RefreshDto {
    fn from(s: RefreshSummary) -> Self {
        Self {
            items: s.items_discovered,
            providers: s.providers_discovered,
        }
    }
}

/// Everything the UI shows, in one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDto {
    pub providers: Vec<ProviderDto>,
    pub discover: DiscoverDto,
    pub library: LibraryDto,
}

impl From<&DomainStore> for SnapshotDto {
    fn from(store: &DomainStore) -> Self {
        Self {
            providers: store
                .providers()
                .providers()
                .iter()
                .map(ProviderDto::from)
                .collect(),
            discover: DiscoverDto::from(store.catalog()),
            library: LibraryDto::from_store(store.library(), store.runtime().config()),
        }
    }
}

// ── Response envelope ─────────────────────────────────────────────────────────

/// Unified response wrapper returned by every bridge function.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub error_kind: Option<ErrorKind>,
    pub operation: Option<Operation>,
}

impl<T: Serialize> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            error_kind: None,
            operation: None,
        }
    }

    pub fn err(error: &SyncError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
            operation: Some(error.operation()),
        }
    }

    fn from_result<R>(result: Result<R, SyncError>, data: impl FnOnce() -> T) -> Self {
        match result {
            Ok(_) => Self::ok(data()),
            Err(error) => Self::err(&error),
        }
    }
}

// ── Queries ───────────────────────────────────────────────────────────────────

pub fn get_snapshot<P: Projector>(controller: &SyncController<P>) -> CommandResult<SnapshotDto> {
    CommandResult::ok(SnapshotDto::from(&controller.store()))
}

pub fn get_discover<P: Projector>(controller: &SyncController<P>) -> CommandResult<DiscoverDto> {
    CommandResult::ok(DiscoverDto::from(controller.store().catalog()))
}

pub fn get_library<P: Projector>(controller: &SyncController<P>) -> CommandResult<LibraryDto> {
    let store = controller.store();
    CommandResult::ok(LibraryDto::from_store(
        store.library(),
        store.runtime().config(),
    ))
}

/// `data` is `None` until the runtime configuration has been fetched once.
pub fn get_runtime_config<P: Projector>(
    controller: &SyncController<P>,
) -> CommandResult<Option<RuntimeConfigDto>> {
    CommandResult::ok(
        controller
            .store()
            .runtime()
            .config()
            .map(RuntimeConfigDto::from),
    )
}

// ── Actions ───────────────────────────────────────────────────────────────────

/// Applies a filter from raw form input (blank means "any").
pub async fn apply_filter<P: Projector>(
    controller: &SyncController<P>,
    query: Option<String>,
    provider: Option<String>,
) -> CommandResult<DiscoverDto> {
    let filter = CatalogFilter::new(query.as_deref(), provider.as_deref());
    let result = controller.apply_filter(filter).await;
    CommandResult::from_result(result, || DiscoverDto::from(controller.store().catalog()))
}

pub async fn inspect_item<P: Projector>(
    controller: &SyncController<P>,
    id: String,
) -> CommandResult<DiscoverDto> {
    let result = controller.inspect_item(&id).await;
    CommandResult::from_result(result, || DiscoverDto::from(controller.store().catalog()))
}

pub async fn refresh_sources<P: Projector>(
    controller: &SyncController<P>,
) -> CommandResult<RefreshDto> {
    match controller.refresh_catalog_cache().await {
        Ok(summary) => CommandResult::ok(RefreshDto::from(summary)),
        Err(error) => CommandResult::err(&error),
    }
}

pub async fn save_to_library<P: Projector>(
    controller: &SyncController<P>,
    id: String,
) -> CommandResult<LibraryDto> {
    let result = controller.save_to_library(&id).await;
    CommandResult::from_result(result, || library_dto(controller))
}

pub async fn launch<P: Projector>(
    controller: &SyncController<P>,
    id: String,
) -> CommandResult<LibraryDto> {
    let result = controller.launch(&id).await;
    CommandResult::from_result(result, || library_dto(controller))
}

pub async fn remove_from_library<P: Projector>(
    controller: &SyncController<P>,
    id: String,
) -> CommandResult<LibraryDto> {
    let result = controller.remove_from_library(&id).await;
    CommandResult::from_result(result, || library_dto(controller))
}

pub async fn refresh_library<P: Projector>(
    controller: &SyncController<P>,
) -> CommandResult<LibraryDto> {
    let result = controller.resync_library().await;
    CommandResult::from_result(result, || library_dto(controller))
}

pub async fn update_runtime_config<P: Projector>(
    controller: &SyncController<P>,
    patch: RuntimeConfigPatchDto,
) -> CommandResult<Option<RuntimeConfigDto>> {
    let result = controller.update_runtime_config(patch.into()).await;
    CommandResult::from_result(result, || {
        controller
            .store()
            .runtime()
            .config()
            .map(RuntimeConfigDto::from)
    })
}

fn library_dto<P: Projector>(controller: &SyncController<P>) -> LibraryDto {
    let store = controller.store();
    LibraryDto::from_store(store.library(), store.runtime().config())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
