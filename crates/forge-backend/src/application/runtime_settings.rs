//! Runtime settings owned by the backend.
//!
//! The backend accepts partial updates and is free to adjust what it is
//! given: the sync interval is clamped to
//! [`MIN_SYNC_INTERVAL_SEC`]..=[`MAX_SYNC_INTERVAL_SEC`].  Clients always
//! adopt the [`RuntimeConfig`] the backend echoes back.

use forge_core::{RuntimeConfig, RuntimeConfigPatch};

pub const MIN_SYNC_INTERVAL_SEC: u32 = 5;
pub const MAX_SYNC_INTERVAL_SEC: u32 = 300;

/// The stored (non-derived) part of the runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSettings {
    pub low_resource_mode: bool,
    pub ingestion_enabled: bool,
    pub sync_interval_sec: u32,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            low_resource_mode: true,
            ingestion_enabled: false,
            sync_interval_sec: 30,
        }
    }
}

impl RuntimeSettings {
    /// Applies every field present in `patch`, clamping the sync interval.
    pub fn apply(&mut self, patch: &RuntimeConfigPatch) {
        if let Some(enabled) = patch.low_resource_mode {
            self.low_resource_mode = enabled;
        }
        if let Some(enabled) = patch.ingestion_enabled {
            self.ingestion_enabled = enabled;
        }
        if let Some(seconds) = patch.sync_interval_sec {
            self.sync_interval_sec = clamp_sync_interval(seconds);
        }
    }

    /// Combines the settings with the library counters into the
    /// configuration reported to clients.
    pub fn to_config(&self, library_count: usize, running_count: usize) -> RuntimeConfig {
        RuntimeConfig {
            low_resource_mode: self.low_resource_mode,
            ingestion_enabled: self.ingestion_enabled,
            sync_interval_sec: self.sync_interval_sec,
            library_count: saturating_u32(library_count),
            running_count: saturating_u32(running_count),
        }
    }
}

fn clamp_sync_interval(seconds: i64) -> u32 {
    let clamped = seconds.clamp(
        i64::from(MIN_SYNC_INTERVAL_SEC),
        i64::from(MAX_SYNC_INTERVAL_SEC),
    );
    // In range after the clamp.
    clamped as u32
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
