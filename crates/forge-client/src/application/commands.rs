//! Commands: one value per external trigger, and the dispatcher that runs it.
//!
//! A UI (or the headless shell in `main.rs`) never calls the controller's
//! methods by name.  It sends a [`Command`]; [`dispatch`] maps the command to
//! exactly one controller operation.  Backend notifications are converted to
//! commands too (`Command::from(notification)`), so both sources flow
//! through the same path and show up the same way in logs and reports.

use std::time::Duration;

use forge_core::{CatalogFilter, Notification, RefreshSummary, RuntimeConfigPatch};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::errors::{Operation, SyncError};
use super::projector::Projector;
use super::sync_controller::{Landing, SyncController};

/// A user action or backend notification to be handled by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "args", rename_all = "camelCase")]
pub enum Command {
    Initialize,
    ApplyFilter(CatalogFilter),
    RefreshCatalogCache,
    InspectItem(String),
    SaveToLibrary(String),
    Launch(String),
    RemoveFromLibrary(String),
    UpdateRuntimeConfig(RuntimeConfigPatch),
    ResyncLibrary,
    BackendCatalogRefreshed,
    BackendLibraryChanged,
}

impl Command {
    /// The controller operation this command runs.
    pub fn operation(&self) -> Operation {
        match self {
            Command::Initialize => Operation::Initialize,
            Command::ApplyFilter(_) => Operation::ApplyFilter,
            Command::RefreshCatalogCache => Operation::RefreshCatalogCache,
            Command::InspectItem(_) => Operation::InspectItem,
            Command::SaveToLibrary(_) => Operation::SaveToLibrary,
            Command::Launch(_) => Operation::Launch,
            Command::RemoveFromLibrary(_) => Operation::RemoveFromLibrary,
            Command::UpdateRuntimeConfig(_) => Operation::UpdateRuntimeConfig,
            Command::ResyncLibrary => Operation::ResyncLibrary,
            Command::BackendCatalogRefreshed => Operation::CatalogRefreshed,
            Command::BackendLibraryChanged => Operation::LibraryChanged,
        }
    }
}

impl From<Notification> for Command {
    fn from(notification: Notification) -> Self {
        match notification {
            Notification::CatalogRefreshed => Command::BackendCatalogRefreshed,
            Notification::LibraryChanged => Command::BackendLibraryChanged,
        }
    }
}

/// What a successfully dispatched command produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Initialized,
    Landed(Landing),
    Refreshed(RefreshSummary),
}

/// Runs `command` on `controller`.
pub async fn dispatch<P: Projector>(
    controller: &SyncController<P>,
    command: Command,
) -> Result<CommandOutcome, SyncError> {
    debug!(operation = %command.operation(), "dispatching command");
    match command {
        Command::Initialize => controller
            .initialize()
            .await
            .map(|()| CommandOutcome::Initialized),
        Command::RefreshCatalogCache => controller
            .refresh_catalog_cache()
            .await
            .map(CommandOutcome::Refreshed),
        Command::ApplyFilter(filter) => controller
            .apply_filter(filter)
            .await
            .map(CommandOutcome::Landed),
        Command::InspectItem(id) => controller
            .inspect_item(&id)
            .await
            .map(CommandOutcome::Landed),
        Command::SaveToLibrary(id) => controller
            .save_to_library(&id)
            .await
            .map(CommandOutcome::Landed),
        Command::Launch(id) => controller.launch(&id).await.map(CommandOutcome::Landed),
        Command::RemoveFromLibrary(id) => controller
            .remove_from_library(&id)
            .await
            .map(CommandOutcome::Landed),
        Command::UpdateRuntimeConfig(patch) => controller
            .update_runtime_config(patch)
            .await
            .map(CommandOutcome::Landed),
        Command::ResyncLibrary => controller
            .resync_library()
            .await
            .map(CommandOutcome::Landed),
        Command::BackendCatalogRefreshed => controller
            .on_backend_catalog_refreshed()
            .await
            .map(CommandOutcome::Landed),
        Command::BackendLibraryChanged => controller
            .on_backend_library_changed()
            .await
            .map(CommandOutcome::Landed),
    }
}

/// Like [`dispatch`], but gives up after `limit` with a transport error.
///
/// Abandoning a command is safe: every operation writes the store once, at
/// the end, without suspending, so an abandoned command either already
/// landed or never will.  Only [`Command::Initialize`] writes more than once;
/// an abandoned initialize may leave some domains loaded and others not.
pub async fn dispatch_with_timeout<P: Projector>(
    controller: &SyncController<P>,
    command: Command,
    limit: Duration,
) -> Result<CommandOutcome, SyncError> {
    let operation = command.operation();
    match tokio::time::timeout(limit, dispatch(controller, command)).await {
        Ok(result) => result,
        Err(_) => Err(SyncError::timed_out(operation, limit)),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use forge_core::{CatalogItem, MockGateway};

    use super::*;
    use crate::application::errors::ErrorKind;
    use crate::application::projector::SnapshotView;
    use crate::application::sync_controller::SyncSettings;

    struct Domains;

    impl Projector for Domains {
        type Output = &'static str;

        fn project(&self, view: SnapshotView<'_>) -> &'static str {
            view.domain()
        }
    }

    fn item(id: &str) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            name: id.to_string(),
            category: "Tools".to_string(),
            provider_id: "p1".to_string(),
            provider_name: "P One".to_string(),
            source_url: "https://p1.example".to_string(),
            price_usd: 0.0,
            rating: 3.0,
            stock: 1,
        }
    }

    #[test]
    fn test_notifications_map_to_backend_commands() {
        assert_eq!(
            Command::from(Notification::CatalogRefreshed),
            Command::BackendCatalogRefreshed
        );
        assert_eq!(
            Command::from(Notification::LibraryChanged).operation(),
            Operation::LibraryChanged
        );
    }

    #[test]
    fn test_command_serialises_with_tag_and_args() {
        let json = serde_json::to_value(Command::InspectItem("a".to_string())).unwrap();
        assert_eq!(json["command"], "inspectItem");
        assert_eq!(json["args"], "a");
    }

    #[tokio::test]
    async fn test_dispatch_apply_filter_reports_landing() {
        // Arrange
        let mut gateway = MockGateway::new();
        gateway
            .expect_list_catalog_items()
            .returning(|_| Ok(vec![item("a")]));
        let (controller, mut views) =
            SyncController::new(Arc::new(gateway), Domains, SyncSettings::default());

        // Act
        let outcome = dispatch(
            &controller,
            Command::ApplyFilter(CatalogFilter::unfiltered().with_query("a")),
        )
        .await;

        // Assert
        assert_eq!(outcome, Ok(CommandOutcome::Landed(Landing::Applied)));
        assert_eq!(views.try_recv().unwrap(), "catalog");
    }

    #[tokio::test]
    async fn test_dispatch_invalid_patch_is_reported_for_its_operation() {
        let (controller, _views) =
            SyncController::new(Arc::new(MockGateway::new()), Domains, SyncSettings::default());

        let error = dispatch(
            &controller,
            Command::UpdateRuntimeConfig(RuntimeConfigPatch::new().sync_interval_sec(0)),
        )
        .await
        .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Invalid);
        assert_eq!(error.operation(), Operation::UpdateRuntimeConfig);
    }
}
