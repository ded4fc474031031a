//! # forge-core
//!
//! Shared domain model and backend contract for Forge, the app catalog /
//! library / runtime-settings desktop client.
//!
//! This crate is used by both the in-process backend and the client
//! controller.  It has zero dependencies on async runtimes, sockets, or UI
//! frameworks.
//!
//! # Architecture overview
//!
//! Forge keeps three independent backend-managed domains visible on screen:
//!
//! - the **catalog** of discoverable apps (filterable by text and provider),
//! - the user's **library** of saved apps with a lifecycle state,
//! - the mutable **runtime configuration**.
//!
//! This crate defines:
//!
//! - **`domain`** – The data types of the three domains and the
//!   [`DomainStore`]: the client-side snapshot of all three plus the
//!   "selected catalog item" cursor.  The store has no behaviour beyond
//!   compare-and-replace setters; who may call them is decided by the client.
//!
//! - **`protocol`** – The contract with the backend: the [`Gateway`] trait
//!   (request/response calls), the push [`Notification`]s the backend emits,
//!   and [`RequestSequence`], the monotonically increasing tag used to drop
//!   responses that were overtaken by a newer request.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `forge_core::CatalogItem` instead of `forge_core::domain::catalog::CatalogItem`.
pub use domain::catalog::{CatalogFilter, CatalogItem, Provider};
pub use domain::library::{LibraryEntry, LifecycleState};
pub use domain::runtime::{PatchError, RuntimeConfig, RuntimeConfigPatch};
pub use domain::store::{
    CatalogSnapshot, DomainStore, LibrarySnapshot, ProviderSnapshot, RuntimeSnapshot,
    SelectionChange,
};
pub use protocol::gateway::{Gateway, GatewayError, RefreshSummary};
pub use protocol::notification::Notification;
pub use protocol::sequence::{RequestSequence, SequenceTag};

#[cfg(any(test, feature = "mock"))]
pub use protocol::gateway::MockGateway;
