//! Domain entities for Forge.
//!
//! Pure data types with no infrastructure dependencies.  Everything in this
//! module can be constructed and tested without a runtime, a backend, or a
//! window.
//!
//! # Sub-modules
//!
//! - **`catalog`**  – Providers, catalog items, and the catalog filter with
//!   its inclusion test.
//! - **`library`**  – Saved library entries and their lifecycle state.
//! - **`runtime`**  – The runtime configuration echoed by the backend and the
//!   partial update the client may submit.
//! - **`store`**    – The Domain Snapshot Store holding the latest fetched
//!   copy of every domain.

pub mod catalog;
pub mod library;
pub mod runtime;
pub mod store;
