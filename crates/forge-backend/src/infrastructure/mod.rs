//! Infrastructure layer for the backend.
//!
//! Contains the concrete upstream provider adapters and the in-process
//! gateway implementation.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `forge_core`, but MUST NOT be imported by the `application` layer.

pub mod adapters;
pub mod in_process;
