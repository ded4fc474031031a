//! Forge headless client: entry point.
//!
//! Wires the in-process backend, the synchronization controller, the text
//! projector, and the event loop, then drives a scripted session through the
//! same command channel a UI would use.  Every projected view is printed as
//! it is produced, followed by a final JSON snapshot of the store.
//!
//! # Usage
//!
//! ```text
//! forge [OPTIONS]
//!
//! Options:
//!   --config      <PATH>  Config file [default: platform config dir]
//!   --query       <TEXT>  Initial catalog query
//!   --provider    <ID>    Initial provider filter
//!   --timeout-ms  <MS>    Per-call backend timeout
//!   --latency-ms  <MS>    Simulated backend latency per call
//!   --write-config        Save the effective configuration and continue
//! ```
//!
//! Each option can also be set through the environment (`FORGE_CONFIG`,
//! `FORGE_QUERY`, `FORGE_PROVIDER`, `FORGE_TIMEOUT_MS`, `FORGE_LATENCY_MS`).
//! Command-line values win over the environment, which wins over the file.
//!
//! ```text
//! main()
//!  ├─ ClientConfig           -- file + CLI overrides
//!  ├─ InProcessBackend       -- Gateway + notification broadcast
//!  ├─ SyncController         -- store, sequences, projector
//!  └─ EventLoop (task)       -- commands + notifications → controller
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use forge_backend::InProcessBackend;
use forge_core::{CatalogFilter, RuntimeConfigPatch};
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use forge_client::application::commands::{Command, CommandOutcome};
use forge_client::application::sync_controller::{SyncController, SyncSettings};
use forge_client::infrastructure::event_loop::{CommandReport, EventLoop};
use forge_client::infrastructure::storage::config::{
    config_file_path, load_config_from, save_config_to, ClientConfig,
};
use forge_client::infrastructure::text_projector::{RenderedView, TextProjector};
use forge_client::infrastructure::ui_bridge;

/// Capacity of the UI command queue.
const COMMAND_QUEUE_CAPACITY: usize = 32;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Forge headless client.
#[derive(Debug, Parser)]
#[command(
    name = "forge",
    about = "Headless Forge client: catalog, library, and runtime settings kept in sync",
    version
)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, env = "FORGE_CONFIG")]
    config: Option<PathBuf>,

    /// Free-text catalog query applied at startup.
    #[arg(long, env = "FORGE_QUERY")]
    query: Option<String>,

    /// Provider id applied at startup.
    #[arg(long, env = "FORGE_PROVIDER")]
    provider: Option<String>,

    /// Upper bound on each backend call, in milliseconds.
    #[arg(long, env = "FORGE_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    /// Artificial delay added to every backend call, in milliseconds.
    #[arg(long, env = "FORGE_LATENCY_MS")]
    latency_ms: Option<u64>,

    /// Write the effective configuration back to the config file.
    #[arg(long)]
    write_config: bool,
}

impl Cli {
    /// Loads the config file and applies the command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if no config path is given and the platform config
    /// directory cannot be determined, or if the file exists but cannot be
    /// read or parsed.
    fn into_client_config(self) -> anyhow::Result<(ClientConfig, PathBuf, bool)> {
        let path = match self.config {
            Some(path) => path,
            None => config_file_path().context("cannot locate the default config file")?,
        };
        let mut config = load_config_from(&path)
            .with_context(|| format!("failed to load config from {}", path.display()))?;

        if let Some(query) = self.query {
            config.discover.query = Some(query);
        }
        if let Some(provider) = self.provider {
            config.discover.provider = Some(provider);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.client.call_timeout_ms = timeout_ms;
        }
        if let Some(latency_ms) = self.latency_ms {
            config.backend.simulated_latency_ms = latency_ms;
        }
        Ok((config, path, self.write_config))
    }
}

/// The demo session: every controller operation at least once, including
/// the failure paths.
fn scripted_session() -> Vec<Command> {
    vec![
        Command::Initialize,
        Command::InspectItem("porofessor-match-insight".to_string()),
        // Keeps the selection: the inspected item is still listed.
        Command::ApplyFilter(CatalogFilter::unfiltered().with_provider("porofessor")),
        // Clears it: only the rune assist module matches.
        Command::ApplyFilter(
            CatalogFilter::unfiltered()
                .with_query("module")
                .with_provider("porofessor"),
        ),
        Command::SaveToLibrary("porofessor-rune-assist".to_string()),
        Command::SaveToLibrary("tftmeta-level-timer".to_string()),
        Command::SaveToLibrary("tftmeta-level-timer".to_string()),
        Command::Launch("tftmeta-level-timer".to_string()),
        Command::UpdateRuntimeConfig(
            RuntimeConfigPatch::new()
                .ingestion_enabled(true)
                .sync_interval_sec(2),
        ),
        Command::UpdateRuntimeConfig(RuntimeConfigPatch::new().sync_interval_sec(-5)),
        Command::RefreshCatalogCache,
        Command::RemoveFromLibrary("porofessor-rune-assist".to_string()),
        Command::RemoveFromLibrary("porofessor-rune-assist".to_string()),
        Command::ResyncLibrary,
    ]
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (config, config_path, write_config) = cli.into_client_config()?;

    // `RUST_LOG` wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.client.log_level)),
        )
        .init();

    if write_config {
        save_config_to(&config, &config_path)
            .with_context(|| format!("failed to write config to {}", config_path.display()))?;
        info!(path = %config_path.display(), "configuration saved");
    }

    info!(
        call_timeout_ms = config.client.call_timeout_ms,
        latency_ms = config.backend.simulated_latency_ms,
        "Forge client starting"
    );

    // ── Wiring ────────────────────────────────────────────────────────────────
    let backend = Arc::new(InProcessBackend::new().with_latency(config.simulated_latency()));
    let notifications = backend.subscribe();
    let settings = SyncSettings {
        call_timeout: config.call_timeout(),
        initial_filter: config.initial_filter(),
    };
    let (controller, mut views) = SyncController::new(backend, TextProjector, settings);
    let controller = Arc::new(controller);

    let (event_loop, commands, mut reports) =
        EventLoop::new(Arc::clone(&controller), notifications, COMMAND_QUEUE_CAPACITY);
    let running = tokio::spawn(
        event_loop
            .with_command_timeout(config.command_timeout())
            .run(),
    );

    // ── Scripted session ──────────────────────────────────────────────────────
    for command in scripted_session() {
        commands
            .send(command.clone())
            .await
            .context("event loop stopped unexpectedly")?;
        wait_for_report(&mut reports, &command).await?;
        print_views(&mut views);
    }

    drop(commands);
    running.await.context("event loop task failed")?;
    print_views(&mut views);

    let snapshot = ui_bridge::get_snapshot(&*controller);
    println!(
        "{}",
        serde_json::to_string_pretty(&snapshot).context("failed to serialise snapshot")?
    );

    info!("Forge client stopped");
    Ok(())
}

/// Waits for the report of `command`, logging reports of other commands
/// (backend notifications) that finish in the meantime.
async fn wait_for_report(
    reports: &mut mpsc::UnboundedReceiver<CommandReport>,
    command: &Command,
) -> anyhow::Result<()> {
    loop {
        let report = reports
            .recv()
            .await
            .context("report channel closed before the command finished")?;
        let mine = &report.command == command;
        match (&report.result, mine) {
            (Ok(outcome), true) => println!("ok    {}: {}", command.operation(), describe(outcome)),
            (Err(error), true) => println!("error {error}"),
            (result, false) => debug!(operation = %report.command.operation(), ?result, "background command finished"),
        }
        if mine {
            return Ok(());
        }
    }
}

fn describe(outcome: &CommandOutcome) -> String {
    match outcome {
        CommandOutcome::Initialized => "initialized".to_string(),
        CommandOutcome::Landed(landing) => format!("{landing:?}").to_lowercase(),
        CommandOutcome::Refreshed(summary) => format!(
            "sources refreshed: {} apps from {} providers",
            summary.items_discovered, summary.providers_discovered
        ),
    }
}

fn print_views(views: &mut mpsc::UnboundedReceiver<RenderedView>) {
    while let Ok(view) = views.try_recv() {
        print!("{view}");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_cli_overrides_win_over_config_file() {
        // Arrange
        let dir = std::env::temp_dir().join(format!("forge_cli_{}", Uuid::new_v4()));
        let path = dir.join("config.toml");
        let mut file_config = ClientConfig::default();
        file_config.discover.query = Some("timer".to_string());
        file_config.client.call_timeout_ms = 2500;
        save_config_to(&file_config, &path).unwrap();
        let cli = Cli::parse_from([
            "forge",
            "--config",
            path.to_str().unwrap(),
            "--query",
            "module",
        ]);

        // Act
        let (config, resolved, write) = cli.into_client_config().unwrap();

        // Assert
        assert_eq!(resolved, path);
        assert!(!write);
        assert_eq!(config.discover.query.as_deref(), Some("module"));
        assert_eq!(config.client.call_timeout_ms, 2500);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_config_file_yields_defaults() {
        let path = std::env::temp_dir()
            .join(format!("forge_cli_{}", Uuid::new_v4()))
            .join("config.toml");
        let cli = Cli::parse_from(["forge", "--config", path.to_str().unwrap(), "--latency-ms", "75"]);

        let (config, _, _) = cli.into_client_config().unwrap();

        assert_eq!(config.backend.simulated_latency_ms, 75);
        assert_eq!(config.client.call_timeout_ms, 10_000);
    }

    #[test]
    fn test_scripted_session_starts_with_initialize() {
        let session = scripted_session();
        assert_eq!(session.first(), Some(&Command::Initialize));
        assert!(session.contains(&Command::RefreshCatalogCache));
    }

    #[test]
    fn test_describe_landing_is_lowercase() {
        use forge_client::application::sync_controller::Landing;
        assert_eq!(describe(&CommandOutcome::Landed(Landing::Superseded)), "superseded");
    }
}
