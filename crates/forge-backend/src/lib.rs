//! forge-backend library entry point.
//!
//! An in-process implementation of the Forge backend.  It owns the catalog
//! (built from upstream provider adapters), the user's library, and the
//! runtime settings, and serves them through the [`forge_core::Gateway`]
//! contract exactly as a remote backend would: every call is asynchronous,
//! and effective changes are announced as push [`forge_core::Notification`]s.
//!
//! # Layers
//!
//! - **`application`** – The backend's own business rules: the catalog index
//!   with its filter, the library registry, and the runtime settings.  No
//!   async, no channels.
//! - **`infrastructure`** – The provider adapters that produce raw catalog
//!   data and [`InProcessBackend`], which glues everything behind the
//!   gateway trait.

pub mod application;
pub mod infrastructure;

pub use infrastructure::in_process::InProcessBackend;
