//! # forge-client
//!
//! The client side of Forge: the synchronization controller that owns the
//! domain snapshot store, the projector contract, and the adapters a shell
//! needs around them (event loop, text projector, UI bridge, config file).
//!
//! `main.rs` is a thin headless shell over this library; the integration
//! tests in `tests/` drive the same public API.

pub mod application;
pub mod infrastructure;
