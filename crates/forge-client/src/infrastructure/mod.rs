//! Infrastructure layer of the client.
//!
//! Contains the concrete adapters around the application layer: the
//! plain-text projector, the event loop that pumps commands and backend
//! notifications, the JSON bridge for a UI shell, and configuration storage.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `forge_core`, but MUST NOT be imported by the `application` layer.

pub mod event_loop;
pub mod storage;
pub mod text_projector;
pub mod ui_bridge;
