//! The contract between the client and the backend.

pub mod gateway;
pub mod notification;
pub mod sequence;

pub use gateway::{Gateway, GatewayError, RefreshSummary};
pub use notification::Notification;
pub use sequence::{RequestSequence, SequenceTag};
