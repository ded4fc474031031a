//! Failure taxonomy for controller operations.
//!
//! Every controller operation either fully succeeds (store updated and
//! projected) or fails with exactly one [`SyncError`].  The error always names
//! the [`Operation`] that failed so the presentation layer can word its
//! message without guessing.
//!
//! | Kind        | Meaning                                   | Store      | Retry?          |
//! |-------------|-------------------------------------------|------------|-----------------|
//! | `NotFound`  | referenced id vanished upstream           | self-heals | no              |
//! | `Busy`      | exclusive operation already in flight     | untouched  | yes, later      |
//! | `Invalid`   | client-side validation failed             | untouched  | no, fix input   |
//! | `Transport` | timeout or backend unreachable            | untouched  | yes             |
//! | `Rejected`  | backend refused on a business rule        | untouched  | no              |

use std::fmt;
use std::time::Duration;

use forge_core::{GatewayError, PatchError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The controller operation an error or report refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    Initialize,
    ApplyFilter,
    RefreshCatalogCache,
    InspectItem,
    SaveToLibrary,
    Launch,
    RemoveFromLibrary,
    UpdateRuntimeConfig,
    ResyncLibrary,
    CatalogRefreshed,
    LibraryChanged,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::Initialize => "initialize",
            Operation::ApplyFilter => "apply filter",
            Operation::RefreshCatalogCache => "refresh catalog cache",
            Operation::InspectItem => "inspect item",
            Operation::SaveToLibrary => "save to library",
            Operation::Launch => "launch",
            Operation::RemoveFromLibrary => "remove from library",
            Operation::UpdateRuntimeConfig => "update runtime config",
            Operation::ResyncLibrary => "resync library",
            Operation::CatalogRefreshed => "catalog refreshed",
            Operation::LibraryChanged => "library changed",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Discriminant of a [`SyncError`], for callers that only branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    NotFound,
    Busy,
    Invalid,
    Transport,
    Rejected,
}

/// Why a controller operation failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// The referenced item or entry no longer exists upstream.  The stale
    /// local copy has already been cleared or removed.
    #[error("{operation} failed: {id} no longer exists")]
    NotFound { operation: Operation, id: String },

    /// An exclusive operation is already in flight; nothing was sent.
    #[error("{operation} failed: already in progress")]
    Busy { operation: Operation },

    /// Client-side validation failed; nothing was sent.
    #[error("{operation} failed: {source}")]
    Invalid {
        operation: Operation,
        #[source]
        source: PatchError,
    },

    /// The backend could not be reached or did not answer in time.
    #[error("{operation} failed: {reason}")]
    Transport { operation: Operation, reason: String },

    /// The backend (or the client on its behalf) refused the request.
    #[error("{operation} rejected: {reason}")]
    Rejected { operation: Operation, reason: String },
}

impl SyncError {
    /// Maps a gateway failure onto the taxonomy.
    pub fn from_gateway(operation: Operation, error: GatewayError) -> Self {
        match error {
            GatewayError::Unavailable(reason) => SyncError::Transport { operation, reason },
            GatewayError::Rejected(reason) => SyncError::Rejected { operation, reason },
        }
    }

    /// A call that did not complete within `limit`.
    pub fn timed_out(operation: Operation, limit: Duration) -> Self {
        SyncError::Transport {
            operation,
            reason: format!("timed out after {} ms", limit.as_millis()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::NotFound { .. } => ErrorKind::NotFound,
            SyncError::Busy { .. } => ErrorKind::Busy,
            SyncError::Invalid { .. } => ErrorKind::Invalid,
            SyncError::Transport { .. } => ErrorKind::Transport,
            SyncError::Rejected { .. } => ErrorKind::Rejected,
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            SyncError::NotFound { operation, .. }
            | SyncError::Busy { operation }
            | SyncError::Invalid { operation, .. }
            | SyncError::Transport { operation, .. }
            | SyncError::Rejected { operation, .. } => *operation,
        }
    }

    /// `true` when repeating the same request later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Busy | ErrorKind::Transport)
    }
}
