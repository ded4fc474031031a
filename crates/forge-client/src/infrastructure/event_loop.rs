//! Event loop: feeds UI commands and backend notifications to the controller.
//!
//! ```text
//!  UI ── mpsc<Command> ──────────┐
//!                                ├──► EventLoop ──► one task per command
//!  backend ── broadcast<Notification> ┘                  │
//!                                                        ▼
//!                                     SyncController::dispatch
//!                                                        │
//!                               mpsc<CommandReport> ◄────┘
//! ```
//!
//! Every command runs in its own Tokio task, so a slow backend call never
//! blocks the next user action; ordering between overlapping commands is the
//! controller's job, not the loop's.  Each finished command produces one
//! [`CommandReport`] on the report channel.
//!
//! An optional per-command timeout bounds each command as a whole (the
//! controller already bounds each individual backend call).
//!
//! If the loop falls behind the notification channel (`Lagged`), the missed
//! notifications are unknown, so both domains that notifications cover are
//! resynced.  The loop ends when every command sender has been dropped, after
//! the commands already started have finished.

use std::sync::Arc;
use std::time::Duration;

use forge_core::Notification;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::application::commands::{dispatch, dispatch_with_timeout, Command, CommandOutcome};
use crate::application::errors::SyncError;
use crate::application::projector::Projector;
use crate::application::sync_controller::SyncController;

/// The result of one dispatched command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReport {
    pub command: Command,
    pub result: Result<CommandOutcome, SyncError>,
}

pub struct EventLoop<P: Projector> {
    controller: Arc<SyncController<P>>,
    commands: mpsc::Receiver<Command>,
    notifications: broadcast::Receiver<Notification>,
    reports: mpsc::UnboundedSender<CommandReport>,
    command_timeout: Option<Duration>,
}

impl<P: Projector> EventLoop<P> {
    /// Creates a loop over `controller`.
    ///
    /// Returns the loop, the sender UIs use to submit commands (bounded by
    /// `capacity`), and the receiver of command reports.
    pub fn new(
        controller: Arc<SyncController<P>>,
        notifications: broadcast::Receiver<Notification>,
        capacity: usize,
    ) -> (
        Self,
        mpsc::Sender<Command>,
        mpsc::UnboundedReceiver<CommandReport>,
    ) {
        let (command_tx, commands) = mpsc::channel(capacity);
        let (reports, report_rx) = mpsc::unbounded_channel();
        let event_loop = Self {
            controller,
            commands,
            notifications,
            reports,
            command_timeout: None,
        };
        (event_loop, command_tx, report_rx)
    }

    /// Abandons any command still running after `limit`; it is reported as a
    /// transport failure.
    pub fn with_command_timeout(mut self, limit: Duration) -> Self {
        self.command_timeout = Some(limit);
        self
    }

    /// Runs until the command channel closes and in-flight commands finish.
    pub async fn run(mut self) {
        let mut tasks = JoinSet::new();
        let mut notifications_open = true;

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.spawn(&mut tasks, command),
                    None => break,
                },
                received = self.notifications.recv(), if notifications_open => match received {
                    Ok(notification) => {
                        debug!(%notification, "backend notification");
                        self.spawn(&mut tasks, Command::from(notification));
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "notifications lagged; resyncing catalog and library");
                        self.spawn(&mut tasks, Command::BackendCatalogRefreshed);
                        self.spawn(&mut tasks, Command::BackendLibraryChanged);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("notification channel closed");
                        notifications_open = false;
                    }
                },
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        warn!("command task ended abnormally: {e}");
                    }
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                warn!("command task ended abnormally: {e}");
            }
        }
        info!("event loop stopped");
    }

    fn spawn(&self, tasks: &mut JoinSet<()>, command: Command) {
        let controller = Arc::clone(&self.controller);
        let reports = self.reports.clone();
        let command_timeout = self.command_timeout;
        tasks.spawn(async move {
            let result = match command_timeout {
                Some(limit) => dispatch_with_timeout(&*controller, command.clone(), limit).await,
                None => dispatch(&*controller, command.clone()).await,
            };
            if let Err(error) = &result {
                debug!(kind = ?error.kind(), "{error}");
            }
            // The report receiver may be gone during shutdown.
            let _ = reports.send(CommandReport { command, result });
        });
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
