//! Runtime configuration domain.
//!
//! The runtime configuration is owned by the backend.  The client submits a
//! [`RuntimeConfigPatch`] and always adopts the backend's echo, because the
//! backend may clamp or ignore individual fields.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Operator-facing settings plus the counters the backend derives from the
/// library.
///
/// `library_count` and `running_count` are supplied by the backend and are
/// never recomputed on the client, even when the client holds a library
/// snapshot that would allow it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    pub low_resource_mode: bool,
    pub ingestion_enabled: bool,
    /// Background sync interval in seconds; always positive.
    pub sync_interval_sec: u32,
    pub library_count: u32,
    pub running_count: u32,
}

/// Client-side validation failure for a [`RuntimeConfigPatch`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    #[error("sync interval must be a positive number of seconds, got {0}")]
    NonPositiveSyncInterval(i64),

    #[error("sync interval {0} exceeds the supported range")]
    SyncIntervalOutOfRange(i64),
}

impl PatchError {
    /// Name of the offending field, for form-level error display.
    pub fn field(&self) -> &'static str {
        "syncIntervalSec"
    }
}

/// A partial runtime-configuration update.  Absent fields are left as the
/// backend currently has them.
///
/// The sync interval is carried as a signed integer so that raw form input
/// (which may be zero or negative) reaches [`RuntimeConfigPatch::validate`]
/// instead of being silently wrapped or truncated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_resource_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingestion_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_interval_sec: Option<i64>,
}

impl RuntimeConfigPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn low_resource_mode(mut self, enabled: bool) -> Self {
        self.low_resource_mode = Some(enabled);
        self
    }

    pub fn ingestion_enabled(mut self, enabled: bool) -> Self {
        self.ingestion_enabled = Some(enabled);
        self
    }

    pub fn sync_interval_sec(mut self, seconds: i64) -> Self {
        self.sync_interval_sec = Some(seconds);
        self
    }

    /// `true` when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.low_resource_mode.is_none()
            && self.ingestion_enabled.is_none()
            && self.sync_interval_sec.is_none()
    }

    /// Checks the patch before it is sent to the backend.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::NonPositiveSyncInterval`] for a zero or negative
    /// interval and [`PatchError::SyncIntervalOutOfRange`] for one that does
    /// not fit in `u32`.
    pub fn validate(&self) -> Result<(), PatchError> {
        match self.sync_interval_sec {
            Some(seconds) if seconds <= 0 => Err(PatchError::NonPositiveSyncInterval(seconds)),
            Some(seconds) if u32::try_from(seconds).is_err() => {
                Err(PatchError::SyncIntervalOutOfRange(seconds))
            }
            _ => Ok(()),
        }
    }
}
