//! Application layer of the client.
//!
//! Everything here depends only on `forge_core` abstractions (the
//! [`Gateway`](forge_core::Gateway) trait and the domain types) and on the
//! [`Projector`](projector::Projector) trait defined in this layer.  There is
//! no file system access and no knowledge of which backend is on the other
//! side of the gateway.
//!
//! # Sub-modules
//!
//! - **`sync_controller`** – The Synchronization Controller: the only writer
//!   of the Domain Snapshot Store.  Decides when each domain is stale, issues
//!   refetches, drops responses that were overtaken, and projects every
//!   change.  This is where all the concurrency hazards live.
//!
//! - **`commands`** – One [`Command`](commands::Command) per external trigger
//!   (user action or backend notification) and the dispatcher that maps it to
//!   a controller operation.
//!
//! - **`projector`** – The contract for turning a sub-snapshot into
//!   something a UI can render.
//!
//! - **`errors`** – The failure taxonomy every controller operation reports.

pub mod commands;
pub mod errors;
pub mod projector;
pub mod sync_controller;
