//! Debounced auto-save
//!
//! An [`AutoSaver`] owns a [`ChecklistEditor`] inside a tokio task. Edits are
//! sent to the task over a channel; each accepted edit re-arms a debounce
//! deadline, and when it passes the accumulated `(Checklist, DirtyMask)` is
//! submitted through a [`MergeTransport`]. Commands that arrive while a save
//! is in flight wait in the channel until it completes.
//!
//! A failed save keeps the local checklist and mask. Nothing is retried until
//! the next edit re-arms the deadline or [`AutoSaver::flush`] is called, and
//! the retry carries all dirt accumulated so far.

use crate::audit::Actor;
use crate::editor::{ChecklistEditor, Edit};
use crate::error::SyncError;
use crate::service::SyncService;
use crate::store::ProjectId;
use async_trait::async_trait;
use portal_checklist::Checklist;
use portal_merge::DirtyMask;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Command channel capacity
const COMMAND_BUFFER: usize = 64;

/// Delivery of a merge request to the sync service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MergeTransport: Send + Sync {
    /// Submit local state; returns the persisted merge result
    async fn submit(&self, local: Checklist, dirty: DirtyMask) -> Result<Checklist, SyncError>;
}

/// Transport calling a [`SyncService`] in the same process
#[derive(Debug, Clone)]
pub struct LocalTransport {
    service: Arc<SyncService>,
    project: ProjectId,
    actor: Actor,
}

impl LocalTransport {
    /// Create transport saving as `actor` into `project`
    #[must_use]
    pub fn new(service: Arc<SyncService>, project: ProjectId, actor: Actor) -> Self {
        Self {
            service,
            project,
            actor,
        }
    }
}

#[async_trait]
impl MergeTransport for LocalTransport {
    async fn submit(&self, local: Checklist, dirty: DirtyMask) -> Result<Checklist, SyncError> {
        self.service
            .sync(&self.project, &self.actor, &local, &dirty)
            .await
    }
}

/// Auto-saver state as seen from outside
#[derive(Debug, Clone, PartialEq)]
pub struct SaveStatus {
    /// Local checklist
    pub checklist: Checklist,
    /// Unsynced dirt
    pub dirty: DirtyMask,
    /// Error of the most recent save, cleared by a successful one
    pub last_error: Option<String>,
    /// Successful saves so far
    pub saves: usize,
}

enum Command {
    Edit(Edit, oneshot::Sender<Result<(), SyncError>>),
    Flush(oneshot::Sender<Result<(), SyncError>>),
    Status(oneshot::Sender<SaveStatus>),
    Shutdown,
}

/// Handle to a running auto-save task
#[derive(Debug)]
pub struct AutoSaver {
    commands: mpsc::Sender<Command>,
    task: JoinHandle<ChecklistEditor>,
}

impl AutoSaver {
    /// Spawn the auto-save task on the current runtime
    #[must_use]
    pub fn spawn(
        editor: ChecklistEditor,
        transport: Arc<dyn MergeTransport>,
        debounce: Duration,
    ) -> Self {
        let (commands, receiver) = mpsc::channel(COMMAND_BUFFER);
        let worker = SaveWorker {
            editor,
            transport,
            debounce,
            commands: receiver,
            last_error: None,
            saves: 0,
        };
        let task = tokio::spawn(worker.run());
        Self { commands, task }
    }

    /// Apply an edit locally and re-arm the debounce deadline
    ///
    /// # Errors
    /// - `SyncError::Checklist` if the edit addresses a missing target
    /// - `SyncError::Stopped` if the task is gone
    pub async fn edit(&self, edit: Edit) -> Result<(), SyncError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Edit(edit, reply)).await?;
        response.await.map_err(|_| SyncError::Stopped)?
    }

    /// Save now, without waiting for the deadline
    ///
    /// # Errors
    /// The save's error, or `SyncError::Stopped`.
    pub async fn flush(&self) -> Result<(), SyncError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Flush(reply)).await?;
        response.await.map_err(|_| SyncError::Stopped)?
    }

    /// Current local state
    ///
    /// # Errors
    /// `SyncError::Stopped` if the task is gone.
    pub async fn status(&self) -> Result<SaveStatus, SyncError> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Status(reply)).await?;
        response.await.map_err(|_| SyncError::Stopped)
    }

    /// Save pending edits once more, stop the task and return the editor
    ///
    /// # Errors
    /// `SyncError::Stopped` if the task panicked.
    pub async fn shutdown(self) -> Result<ChecklistEditor, SyncError> {
        // a closed channel means the task already exited; join it either way
        let _ = self.commands.send(Command::Shutdown).await;
        self.task.await.map_err(|_| SyncError::Stopped)
    }

    async fn send(&self, command: Command) -> Result<(), SyncError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SyncError::Stopped)
    }
}

struct SaveWorker {
    editor: ChecklistEditor,
    transport: Arc<dyn MergeTransport>,
    debounce: Duration,
    commands: mpsc::Receiver<Command>,
    last_error: Option<String>,
    saves: usize,
}

impl SaveWorker {
    async fn run(mut self) -> ChecklistEditor {
        let mut deadline: Option<Instant> = None;

        loop {
            let command = if let Some(at) = deadline {
                tokio::select! {
                    command = self.commands.recv() => command,
                    () = tokio::time::sleep_until(at) => {
                        deadline = None;
                        // failure is recorded in last_error
                        let _ = self.save().await;
                        continue;
                    }
                }
            } else {
                self.commands.recv().await
            };

            let Some(command) = command else {
                tracing::debug!("auto-saver handle dropped");
                break;
            };

            match command {
                Command::Edit(edit, reply) => {
                    let result = self.editor.apply(edit).map_err(SyncError::from);
                    if result.is_ok() {
                        deadline = Some(Instant::now() + self.debounce);
                    }
                    let _ = reply.send(result);
                }
                Command::Flush(reply) => {
                    deadline = None;
                    let _ = reply.send(self.save().await);
                }
                Command::Status(reply) => {
                    let _ = reply.send(self.status());
                }
                Command::Shutdown => {
                    if self.editor.is_dirty() {
                        let _ = self.save().await;
                    }
                    break;
                }
            }
        }

        self.editor
    }

    async fn save(&mut self) -> Result<(), SyncError> {
        if !self.editor.is_dirty() {
            return Ok(());
        }

        let (local, dirty) = self.editor.snapshot();
        match self.transport.submit(local, dirty).await {
            Ok(merged) => {
                self.editor.accept(merged);
                self.last_error = None;
                self.saves += 1;
                tracing::debug!(saves = self.saves, "auto-save complete");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    retryable = err.is_retryable(),
                    "auto-save failed, keeping local edits"
                );
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    fn status(&self) -> SaveStatus {
        SaveStatus {
            checklist: self.editor.checklist().clone(),
            dirty: self.editor.dirty().clone(),
            last_error: self.last_error.clone(),
            saves: self.saves,
        }
    }
}
