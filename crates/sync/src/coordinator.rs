//! The persistence coordinator.
//!
//! Bridges the in-memory [`Store`] to a [`TaskBackend`]: loads state on
//! startup and on every authentication transition, applies mutations
//! optimistically and rolls them back when the backend call fails, and
//! debounces auto-saves on the local path.
//!
//! Every mutation captures its own pre-state snapshot at dispatch time
//! and rolls back by dispatching ordinary reducer actions, so the store
//! keeps a single mutation path. The coordinator takes `&mut self` for
//! every mutation, which keeps at most one backend write in flight per
//! board instance; the local whole-file read-modify-write relies on that.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use hebdo_protocol::{
    Action, BoardState, PersistedState, Store, TaskDraft, TaskId, TaskPatch, Week,
    compact_columns, generate_task_id, resolve_drop,
};
use hebdo_storage::{StorageError, TaskBackend, save_state};

use crate::auth::{AuthStatus, BackendKind, select_backend};
use crate::error::{Result, SyncError};
use crate::transfer;

/// Quiet period before a state change is written to the local envelope.
pub const DEFAULT_AUTOSAVE_DEBOUNCE: Duration = Duration::from_millis(500);

/// Coordinates the task store with the active storage backend.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use hebdo_protocol::TaskDraft;
/// use hebdo_storage::LocalStore;
/// use hebdo_sync::{AuthStatus, Coordinator};
///
/// # async fn example() -> hebdo_sync::Result<()> {
/// let local = Arc::new(LocalStore::at_default_location()?);
/// let mut coordinator = Coordinator::new(local, None);
/// coordinator.set_auth_status(AuthStatus::Guest).await;
///
/// coordinator
///     .create_task(TaskDraft::new("Water the plants", "2025-09-07"))
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct Coordinator {
    store: Store,
    local: Arc<dyn TaskBackend>,
    remote: Option<Arc<dyn TaskBackend>>,
    backend_kind: BackendKind,
    auth: AuthStatus,
    save_path: Option<PathBuf>,
    debounce: Duration,
    pending_save: Option<JoinHandle<()>>,
}

impl Coordinator {
    /// Creates a coordinator over the given backends.
    ///
    /// The session starts as a guest on the local backend; call
    /// [`set_auth_status`](Self::set_auth_status) to load data and to
    /// switch backends when the auth provider answers.
    #[must_use]
    pub fn new(local: Arc<dyn TaskBackend>, remote: Option<Arc<dyn TaskBackend>>) -> Self {
        Self {
            store: Store::new(),
            local,
            remote,
            backend_kind: BackendKind::Local,
            auth: AuthStatus::default(),
            save_path: None,
            debounce: DEFAULT_AUTOSAVE_DEBOUNCE,
            pending_save: None,
        }
    }

    /// Enables debounced auto-save of the full state to `path` while the
    /// local backend is active.
    #[must_use]
    pub fn with_autosave(mut self, path: impl Into<PathBuf>, debounce: Duration) -> Self {
        self.save_path = Some(path.into());
        self.debounce = debounce;
        self
    }

    /// The current board state.
    #[must_use]
    pub fn state(&self) -> &BoardState {
        self.store.state()
    }

    /// The current authentication status.
    #[must_use]
    pub fn auth_status(&self) -> &AuthStatus {
        &self.auth
    }

    /// Which backend the coordinator is currently writing through.
    #[must_use]
    pub fn backend_kind(&self) -> BackendKind {
        self.backend_kind
    }

    /// Records a new authentication status and reloads through the backend
    /// it selects.
    ///
    /// Tasks are never merged across backends; the previous in-memory list
    /// is simply replaced by whatever the newly selected backend holds.
    pub async fn set_auth_status(&mut self, status: AuthStatus) {
        let kind = match select_backend(&status) {
            BackendKind::Remote if self.remote.is_some() => BackendKind::Remote,
            _ => BackendKind::Local,
        };
        debug!(?kind, "authentication status changed");
        self.auth = status;
        self.backend_kind = kind;
        self.initial_load().await;
    }

    /// Loads the board through the active backend.
    ///
    /// On failure the board comes up empty with a user-visible error; the
    /// loading flag clears in every case.
    pub async fn initial_load(&mut self) {
        self.store.dispatch(Action::SetLoading(true));
        let backend = Arc::clone(self.backend());
        match backend.list_tasks().await {
            Ok(mut tasks) => {
                compact_columns(&mut tasks);
                self.store.dispatch(Action::LoadState {
                    tasks,
                    week: Some(Week::current()),
                });
                self.store.dispatch(Action::SetError(None));
            }
            Err(e) => {
                warn!(error = %e, "initial load failed, starting with an empty board");
                self.store.dispatch(Action::LoadState {
                    tasks: Vec::new(),
                    week: Some(Week::current()),
                });
                self.store.dispatch(Action::SetError(Some(e.to_string())));
            }
        }
    }

    /// Creates a task optimistically.
    ///
    /// The draft is validated first; an empty title fails without touching
    /// the store or the backend. On backend failure the optimistic task is
    /// removed again. On success against a remote backend the task adopts
    /// the server's canonical id, which is also the id returned.
    ///
    /// # Errors
    ///
    /// [`SyncError::Validation`] when the draft is invalid,
    /// [`SyncError::Storage`] when the backend call failed.
    pub async fn create_task(&mut self, mut draft: TaskDraft) -> Result<TaskId> {
        draft.validate()?;
        let id = match draft.id.clone() {
            Some(id) => id,
            None => {
                let id = generate_task_id();
                draft.id = Some(id.clone());
                id
            }
        };
        if draft.order.is_none() {
            draft.order = Some(self.store.state().column_tasks(&draft.column).len());
        }

        self.store.dispatch(Action::AddTask(draft.clone()));
        self.schedule_autosave();

        let backend = Arc::clone(self.backend());
        match backend.create_task(&draft).await {
            Ok(created) if created.id != id => {
                self.store.dispatch(Action::UpdateTask {
                    id,
                    patch: TaskPatch {
                        id: Some(created.id.clone()),
                        created_at: Some(created.created_at),
                        ..TaskPatch::default()
                    },
                });
                self.schedule_autosave();
                Ok(created.id)
            }
            Ok(_) => Ok(id),
            Err(e) => {
                self.store.dispatch(Action::DeleteTask(id));
                self.fail(e)
            }
        }
    }

    /// Updates a task optimistically.
    ///
    /// Unknown ids are a no-op. On backend failure the patched fields are
    /// restored from the pre-mutation snapshot.
    ///
    /// # Errors
    ///
    /// [`SyncError::Validation`] when the patch empties the title,
    /// [`SyncError::Storage`] when the backend call failed.
    pub async fn update_task(&mut self, id: &str, patch: TaskPatch) -> Result<()> {
        if let Some(title) = &patch.title
            && title.trim().is_empty()
        {
            return Err(SyncError::Validation(
                hebdo_protocol::ProtocolError::InvalidTaskTitle,
            ));
        }
        let Some(snapshot) = self.store.state().task(id).cloned() else {
            debug!(%id, "update for unknown task ignored");
            return Ok(());
        };
        let rollback = patch.restoring(&snapshot);

        self.store.dispatch(Action::UpdateTask {
            id: snapshot.id.clone(),
            patch: patch.clone(),
        });
        self.schedule_autosave();

        let backend = Arc::clone(self.backend());
        match backend.update_task(id, &patch).await {
            Ok(_) => Ok(()),
            Err(e) => {
                self.store.dispatch(Action::UpdateTask {
                    id: snapshot.id,
                    patch: rollback,
                });
                self.fail(e)
            }
        }
    }

    /// Toggles a task's completion optimistically.
    ///
    /// The toggle is its own inverse, so rollback simply toggles again.
    ///
    /// # Errors
    ///
    /// [`SyncError::Storage`] when the backend call failed.
    pub async fn toggle_complete(&mut self, id: &str) -> Result<()> {
        let Some(snapshot) = self.store.state().task(id).cloned() else {
            debug!(%id, "toggle for unknown task ignored");
            return Ok(());
        };

        self.store.dispatch(Action::ToggleTaskComplete(id.to_string()));
        self.schedule_autosave();

        let patch = TaskPatch {
            completed: Some(!snapshot.completed),
            ..TaskPatch::default()
        };
        let backend = Arc::clone(self.backend());
        match backend.update_task(id, &patch).await {
            Ok(_) => Ok(()),
            Err(e) => {
                self.store.dispatch(Action::ToggleTaskComplete(id.to_string()));
                self.fail(e)
            }
        }
    }

    /// Deletes a task optimistically.
    ///
    /// Deleting compacts the column, so rollback restores the captured
    /// pre-mutation task list wholesale rather than re-appending one task.
    ///
    /// # Errors
    ///
    /// [`SyncError::Storage`] when the backend call failed.
    pub async fn delete_task(&mut self, id: &str) -> Result<()> {
        if self.store.state().task(id).is_none() {
            debug!(%id, "delete for unknown task ignored");
            return Ok(());
        }
        let snapshot = self.store.state().tasks.clone();
        let week = self.store.state().current_week;

        self.store.dispatch(Action::DeleteTask(id.to_string()));
        self.schedule_autosave();

        let backend = Arc::clone(self.backend());
        match backend.delete_task(id).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.store.dispatch(Action::LoadState {
                    tasks: snapshot,
                    week,
                });
                self.fail(e)
            }
        }
    }

    /// Moves a task to `column` at position `order`, optimistically.
    ///
    /// Persists the new column and order of every task the renumbering
    /// touched, one update per task. The first backend failure restores
    /// the captured pre-mutation task list wholesale.
    ///
    /// # Errors
    ///
    /// [`SyncError::Storage`] when a backend call failed.
    pub async fn move_task(&mut self, id: &str, column: &str, order: usize) -> Result<()> {
        if self.store.state().task(id).is_none() {
            debug!(%id, "move for unknown task ignored");
            return Ok(());
        }
        let snapshot = self.store.state().tasks.clone();
        let week = self.store.state().current_week;

        self.store.dispatch(Action::MoveTask {
            id: id.to_string(),
            column: column.to_string(),
            order,
        });
        self.schedule_autosave();

        let changed: Vec<(TaskId, TaskPatch)> = self
            .store
            .state()
            .tasks
            .iter()
            .filter_map(|task| {
                let before = snapshot.iter().find(|t| t.id == task.id)?;
                if before.column == task.column && before.order == task.order {
                    return None;
                }
                let patch = TaskPatch {
                    column: (before.column != task.column).then(|| task.column.clone()),
                    order: Some(task.order),
                    ..TaskPatch::default()
                };
                Some((task.id.clone(), patch))
            })
            .collect();

        let backend = Arc::clone(self.backend());
        for (task_id, patch) in changed {
            if let Err(e) = backend.update_task(&task_id, &patch).await {
                self.store.dispatch(Action::LoadState {
                    tasks: snapshot,
                    week,
                });
                return self.fail(e);
            }
        }
        Ok(())
    }

    /// Handles a raw drop event from the drag layer.
    ///
    /// `over_id` may name a task or a column. Unresolvable drops (unknown
    /// ids, a card dropped onto itself) are a no-op.
    ///
    /// # Errors
    ///
    /// [`SyncError::Storage`] when a backend call failed.
    pub async fn drop_task(&mut self, active_id: &str, over_id: &str) -> Result<()> {
        let Some(intent) = resolve_drop(&self.store.state().tasks, active_id, over_id) else {
            return Ok(());
        };
        let task_id = intent.task_id.clone();
        self.move_task(&task_id, &intent.column, intent.index).await
    }

    /// Shows the next work week.
    pub fn go_to_next_week(&mut self) {
        self.store.dispatch(Action::GoToNextWeek);
        self.schedule_autosave();
    }

    /// Shows the previous work week.
    pub fn go_to_previous_week(&mut self) {
        self.store.dispatch(Action::GoToPreviousWeek);
        self.schedule_autosave();
    }

    /// Jumps back to the week containing today.
    pub fn go_to_current_week(&mut self) {
        self.store.dispatch(Action::GoToCurrentWeek);
        self.schedule_autosave();
    }

    /// Serializes the full current state to a portable JSON document.
    ///
    /// # Errors
    ///
    /// [`SyncError::Export`] when serialization fails.
    pub fn export_data(&self) -> Result<String> {
        transfer::to_json(&transfer::export_document(self.store.state()))
    }

    /// Replaces the board wholesale with an imported document.
    ///
    /// The document runs through the same migration path as a loaded
    /// envelope. On the local path the result is persisted immediately;
    /// the remote contract defines no bulk operation, so a remote session
    /// only replaces the in-memory board.
    ///
    /// # Errors
    ///
    /// [`SyncError::InvalidImport`] when the text cannot be understood.
    pub async fn import_data(&mut self, text: &str) -> Result<()> {
        let imported = transfer::parse(text)?;
        let week = imported.current_week.or_else(|| Some(Week::current()));
        self.store.dispatch(Action::LoadState {
            tasks: imported.tasks,
            week,
        });
        // A pending debounced save would carry pre-import state; flush
        // replaces it with the imported board.
        self.flush();
        Ok(())
    }

    /// Writes any pending auto-save immediately.
    ///
    /// Call before shutdown so the debounce window cannot swallow the last
    /// change.
    pub fn flush(&mut self) {
        if let Some(pending) = self.pending_save.take() {
            pending.abort();
        }
        self.persist_now();
    }

    fn backend(&self) -> &Arc<dyn TaskBackend> {
        match self.backend_kind {
            BackendKind::Remote => self.remote.as_ref().unwrap_or(&self.local),
            BackendKind::Local => &self.local,
        }
    }

    fn fail<T>(&mut self, error: StorageError) -> Result<T> {
        self.store.dispatch(Action::SetError(Some(error.to_string())));
        self.schedule_autosave();
        Err(SyncError::Storage(error))
    }

    /// Timer-reset debounce: every state change aborts the pending save
    /// and starts a fresh quiet period.
    fn schedule_autosave(&mut self) {
        if self.backend_kind != BackendKind::Local {
            return;
        }
        let Some(path) = self.save_path.clone() else {
            return;
        };
        if let Some(pending) = self.pending_save.take() {
            pending.abort();
        }
        let snapshot = PersistedState::from(self.store.state());
        let debounce = self.debounce;
        self.pending_save = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            save_state(&path, &snapshot);
        }));
    }

    fn persist_now(&self) {
        if self.backend_kind != BackendKind::Local {
            return;
        }
        if let Some(path) = &self.save_path {
            save_state(path, &PersistedState::from(self.store.state()));
        }
    }
}
