//! Backend business rules.
//!
//! # Sub-modules
//!
//! - **`catalog_index`** – The [`CatalogAdapter`](catalog_index::CatalogAdapter)
//!   abstraction over upstream providers, validation of what they return, and
//!   the de-duplicated, filterable catalog built from them.
//!
//! - **`library_registry`** – The saved library entries and their lifecycle
//!   transitions (save, launch, remove).
//!
//! - **`runtime_settings`** – Operator settings, the sync-interval clamp, and
//!   the derived counters reported with every read.

pub mod catalog_index;
pub mod library_registry;
pub mod runtime_settings;
