//! End-to-end tests: event loop → controller → in-process backend → text
//! projector, wired the same way `main.rs` wires them.
//!
//! Commands are sent through the event loop's channel and each test waits
//! for the command's report before checking rendered views or the bridge's
//! JSON snapshot.  Backend notifications flow back through the loop as well,
//! so reports for `BackendLibraryChanged` / `BackendCatalogRefreshed` show up
//! in between; [`Session::run`] skips past them.

use std::sync::Arc;

use forge_backend::InProcessBackend;
use forge_core::{CatalogFilter, RuntimeConfigPatch};
use tokio::sync::mpsc;

use forge_client::application::commands::{Command, CommandOutcome};
use forge_client::application::errors::{ErrorKind, SyncError};
use forge_client::application::sync_controller::{Landing, SyncController, SyncSettings};
use forge_client::infrastructure::event_loop::{CommandReport, EventLoop};
use forge_client::infrastructure::text_projector::{
    RenderedView, TextProjector, NO_COUNTERS, NO_ITEMS, NO_LIBRARY,
};
use forge_client::infrastructure::ui_bridge;

struct Session {
    controller: Arc<SyncController<TextProjector>>,
    commands: mpsc::Sender<Command>,
    reports: mpsc::UnboundedReceiver<CommandReport>,
    views: mpsc::UnboundedReceiver<RenderedView>,
    running: tokio::task::JoinHandle<()>,
}

impl Session {
    fn start() -> Self {
        let backend = Arc::new(InProcessBackend::new());
        let notifications = backend.subscribe();
        let (controller, views) =
            SyncController::new(backend, TextProjector, SyncSettings::default());
        let controller = Arc::new(controller);
        let (event_loop, commands, reports) =
            EventLoop::new(Arc::clone(&controller), notifications, 16);
        let running = tokio::spawn(event_loop.run());
        Self {
            controller,
            commands,
            reports,
            views,
            running,
        }
    }

    /// Sends `command` and returns its result, skipping reports of
    /// notification-driven commands.
    async fn run(&mut self, command: Command) -> Result<CommandOutcome, SyncError> {
        self.commands.send(command.clone()).await.unwrap();
        loop {
            let report = self.reports.recv().await.unwrap();
            if report.command == command {
                return report.result;
            }
        }
    }

    fn views(&mut self) -> Vec<RenderedView> {
        let mut seen = Vec::new();
        while let Ok(view) = self.views.try_recv() {
            seen.push(view);
        }
        seen
    }

    async fn stop(self) {
        drop(self.commands);
        self.running.await.unwrap();
    }
}

#[tokio::test]
async fn test_initialize_renders_every_pane() {
    // Arrange
    let mut session = Session::start();

    // Act
    let outcome = session.run(Command::Initialize).await;

    // Assert
    assert_eq!(outcome, Ok(CommandOutcome::Initialized));
    let views = session.views();
    let domains: Vec<&str> = views.iter().map(|v| v.domain).collect();
    assert_eq!(domains[0], "providers");
    assert!(domains.contains(&"catalog"));
    assert!(domains.contains(&"library+runtime"));

    let providers = views[0].section("Providers").unwrap();
    assert_eq!(providers.lines[0], "All Providers");
    assert_eq!(providers.lines.len(), 3);

    let catalog = views.iter().find(|v| v.domain == "catalog").unwrap();
    assert_eq!(catalog.section("Discover").unwrap().lines.len(), 6);

    session.stop().await;
}

#[tokio::test]
async fn test_filter_with_no_matches_renders_placeholder() {
    let mut session = Session::start();
    session.run(Command::Initialize).await.unwrap();
    session.views();

    let outcome = session
        .run(Command::ApplyFilter(
            CatalogFilter::unfiltered().with_query("no such app"),
        ))
        .await;

    assert_eq!(outcome, Ok(CommandOutcome::Landed(Landing::Applied)));
    let views = session.views();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].section("Discover").unwrap().lines, vec![NO_ITEMS]);

    session.stop().await;
}

#[tokio::test]
async fn test_library_flow_keeps_summary_in_step_with_entries() {
    // Arrange
    let mut session = Session::start();
    session.run(Command::Initialize).await.unwrap();

    // Act
    session
        .run(Command::SaveToLibrary("porofessor-rune-assist".to_string()))
        .await
        .unwrap();
    session
        .run(Command::SaveToLibrary("tftmeta-level-timer".to_string()))
        .await
        .unwrap();
    session
        .run(Command::Launch("tftmeta-level-timer".to_string()))
        .await
        .unwrap();
    session.run(Command::ResyncLibrary).await.unwrap();

    // Assert – every library view carries a summary that matches its entries
    for view in session.views() {
        let Some(library) = view.section("Library") else {
            continue;
        };
        if library.lines[0] == NO_LIBRARY || library.lines[0] == NO_COUNTERS {
            continue;
        }
        let listed = library.lines.len() - 1;
        assert!(
            library.lines[0].starts_with(&format!("{listed} apps saved")),
            "summary out of step: {:?}",
            library.lines
        );
    }
    let store = session.controller.store();
    let runtime = store.runtime().config().unwrap();
    assert_eq!(runtime.library_count, 2);
    assert_eq!(runtime.running_count, 1);

    session.stop().await;
}

#[tokio::test]
async fn test_failures_surface_as_reports_with_kinds() {
    let mut session = Session::start();
    session.run(Command::Initialize).await.unwrap();
    session
        .run(Command::SaveToLibrary("tftmeta-comp-scout".to_string()))
        .await
        .unwrap();

    let duplicate = session
        .run(Command::SaveToLibrary("tftmeta-comp-scout".to_string()))
        .await;
    let missing = session
        .run(Command::InspectItem("no-such-item".to_string()))
        .await;
    let invalid = session
        .run(Command::UpdateRuntimeConfig(
            RuntimeConfigPatch::new().sync_interval_sec(0),
        ))
        .await;

    assert_eq!(duplicate.unwrap_err().kind(), ErrorKind::Rejected);
    assert_eq!(missing.unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(invalid.unwrap_err().kind(), ErrorKind::Invalid);

    session.stop().await;
}

#[tokio::test]
async fn test_snapshot_json_reflects_the_session() {
    // Arrange
    let mut session = Session::start();
    session.run(Command::Initialize).await.unwrap();
    session
        .run(Command::InspectItem("porofessor-match-insight".to_string()))
        .await
        .unwrap();
    session
        .run(Command::SaveToLibrary("porofessor-match-insight".to_string()))
        .await
        .unwrap();
    session
        .run(Command::UpdateRuntimeConfig(
            RuntimeConfigPatch::new().low_resource_mode(false),
        ))
        .await
        .unwrap();
    let refreshed = session.run(Command::RefreshCatalogCache).await.unwrap();

    // Act
    let snapshot = ui_bridge::get_snapshot(&*session.controller);
    let json = serde_json::to_value(&snapshot).unwrap();

    // Assert
    assert!(matches!(refreshed, CommandOutcome::Refreshed(_)));
    assert_eq!(json["success"], true);
    let data = &json["data"];
    assert_eq!(data["providers"].as_array().unwrap().len(), 2);
    assert_eq!(data["discover"]["selected"]["id"], "porofessor-match-insight");
    assert_eq!(
        data["library"]["entries"][0]["id"],
        "porofessor-match-insight"
    );
    assert_eq!(data["library"]["entries"][0]["state"], "idle");
    assert_eq!(data["library"]["runtime"]["lowResourceMode"], false);
    assert_eq!(data["library"]["runtime"]["libraryCount"], 1);

    session.stop().await;
}
