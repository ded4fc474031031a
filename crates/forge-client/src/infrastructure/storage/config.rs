//! TOML-based configuration for the Forge client.
//!
//! The default location is platform-specific:
//! - Windows:  `%APPDATA%\Forge\config.toml`
//! - Linux:    `~/.config/forge/config.toml`
//! - macOS:    `~/Library/Application Support/Forge/config.toml`
//!
//! Example:
//!
//! ```toml
//! [client]
//! log_level = "debug"
//! call_timeout_ms = 5000
//!
//! [discover]
//! query = "module"
//! provider = "porofessor"
//!
//! [backend]
//! simulated_latency_ms = 150
//! ```
//!
//! Every field has a serde default, so a missing file, a missing section, or
//! a missing key all fall back to the values in the `Default` impls.  The
//! `[discover]` section is the catalog filter the client starts with.

use std::path::{Path, PathBuf};
use std::time::Duration;

use forge_core::CatalogFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level client configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    #[serde(default)]
    pub client: ClientSection,
    #[serde(default)]
    pub discover: DiscoverSection,
    #[serde(default)]
    pub backend: BackendSection,
}

/// General client behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientSection {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Upper bound on every individual backend call, in milliseconds.
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
    /// Upper bound on a whole command, which may make several backend calls.
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,
}

/// The catalog filter applied at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscoverSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

/// Settings for the in-process backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackendSection {
    /// Artificial delay added to every backend call.  Zero disables it.
    #[serde(default)]
    pub simulated_latency_ms: u64,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_call_timeout_ms() -> u64 {
    10_000
}
fn default_command_timeout_ms() -> u64 {
    30_000
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            call_timeout_ms: default_call_timeout_ms(),
            command_timeout_ms: default_command_timeout_ms(),
        }
    }
}

impl ClientConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.client.call_timeout_ms)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.client.command_timeout_ms)
    }

    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.backend.simulated_latency_ms)
    }

    /// The configured startup filter, normalised.
    pub fn initial_filter(&self) -> CatalogFilter {
        CatalogFilter::new(
            self.discover.query.as_deref(),
            self.discover.provider.as_deref(),
        )
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the default config file.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads the config at `path`, returning `ClientConfig::default()` if the
/// file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<ClientConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ClientConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Persists `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(config: &ClientConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("Forge"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("forge"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("Forge")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("forge_test_{}", Uuid::new_v4()))
    }

    #[test]
    fn test_default_config_matches_first_run_values() {
        // Arrange / Act
        let cfg = ClientConfig::default();

        // Assert
        assert_eq!(cfg.client.log_level, "info");
        assert_eq!(cfg.call_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.command_timeout(), Duration::from_secs(30));
        assert!(cfg.simulated_latency().is_zero());
        assert!(cfg.initial_filter().is_unfiltered());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let cfg: ClientConfig = toml::from_str("").expect("deserialize empty");
        assert_eq!(cfg, ClientConfig::default());
    }

    #[test]
    fn test_partial_section_overrides_only_named_keys() {
        // Arrange
        let toml_str = r#"
[client]
call_timeout_ms = 2500
"#;

        // Act
        let cfg: ClientConfig = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert_eq!(cfg.client.call_timeout_ms, 2500);
        assert_eq!(cfg.client.log_level, "info");
    }

    #[test]
    fn test_discover_section_becomes_normalised_filter() {
        let toml_str = r#"
[discover]
query = "  module "
provider = ""
"#;

        let cfg: ClientConfig = toml::from_str(toml_str).unwrap();
        let filter = cfg.initial_filter();

        assert_eq!(filter.query(), Some("module"));
        assert_eq!(filter.provider_id(), None);
    }

    #[test]
    fn test_absent_discover_fields_are_omitted_from_toml() {
        let toml_str = toml::to_string_pretty(&ClientConfig::default()).unwrap();
        assert!(!toml_str.contains("query"));
        assert!(!toml_str.contains("provider"));
    }

    #[test]
    fn test_invalid_toml_returns_parse_error() {
        // Arrange
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[[[ not valid toml").unwrap();

        // Act
        let result = load_config_from(&path);

        // Assert
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_config_from_missing_file_returns_default() {
        let path = scratch_dir().join("config.toml");
        assert_eq!(load_config_from(&path).unwrap(), ClientConfig::default());
    }

    #[test]
    fn test_save_and_load_round_trip_via_temp_dir() {
        // Arrange – nested directory that does not exist yet
        let dir = scratch_dir();
        let path = dir.join("nested").join("config.toml");
        let mut cfg = ClientConfig::default();
        cfg.client.log_level = "debug".to_string();
        cfg.discover.provider = Some("porofessor".to_string());
        cfg.backend.simulated_latency_ms = 150;

        // Act
        save_config_to(&cfg, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();

        // Assert
        assert_eq!(loaded, cfg);

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_config_file_path_ends_with_config_toml() {
        // NoPlatformConfigDir (stripped CI env) is also acceptable.
        if let Ok(path) = config_file_path() {
            assert!(path.ends_with("config.toml"), "got {path:?}");
        }
    }
}
