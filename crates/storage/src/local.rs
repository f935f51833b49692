//! File-backed task storage.
//!
//! The local backend keeps the whole board in one versioned envelope file
//! (see [`crate::envelope`]). Every operation reads the envelope, mutates
//! the task list, and writes the envelope back; there are no partial
//! writes. The file itself has no concurrency control, so the coordinator
//! keeps at most one mutation in flight per board instance.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use hebdo_protocol::{PersistedState, Task, TaskDraft, TaskPatch, renumber_column};

use crate::backend::TaskBackend;
use crate::envelope::{load_state, save_state};
use crate::error::{Result, StorageError};

/// File name of the board envelope under the data directory.
const BOARD_FILE: &str = "board.json";

/// Application directory under the platform data dir.
const DATA_DIR: &str = "hebdo";

/// Task storage backed by the local envelope file.
///
/// # Examples
///
/// ```no_run
/// use hebdo_storage::{LocalStore, TaskBackend};
/// use hebdo_protocol::TaskDraft;
///
/// # async fn example() -> hebdo_storage::Result<()> {
/// let store = LocalStore::at_default_location()?;
/// let task = store.create_task(&TaskDraft::new("Buy milk", "2025-09-07")).await?;
/// assert_eq!(task.column, "2025-09-07");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    /// Creates a store over the given envelope file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store at the platform data directory, typically
    /// `~/.local/share/hebdo/board.json` on Linux.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] when the platform data
    /// directory cannot be determined.
    pub fn at_default_location() -> Result<Self> {
        let dir = dirs::data_dir().ok_or_else(|| StorageError::Unavailable {
            reason: "could not determine the user data directory".to_string(),
        })?;
        Ok(Self::new(dir.join(DATA_DIR).join(BOARD_FILE)))
    }

    /// The envelope file this store reads and writes.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> PersistedState {
        // Corrupt or missing data degrades to an empty board.
        load_state(&self.path).unwrap_or_default()
    }

    fn write(&self, state: &PersistedState) {
        save_state(&self.path, state);
    }
}

#[async_trait]
impl TaskBackend for LocalStore {
    async fn list_tasks(&self) -> Result<Vec<Task>> {
        Ok(self.read().tasks)
    }

    async fn create_task(&self, draft: &TaskDraft) -> Result<Task> {
        let mut state = self.read();
        let task = Task::from_draft(draft.clone(), &state.tasks);
        state.tasks.push(task.clone());
        self.write(&state);
        Ok(task)
    }

    async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Task> {
        let mut state = self.read();
        let Some(task) = state.tasks.iter_mut().find(|t| t.id == id) else {
            return Err(StorageError::NotFound(id.to_string()));
        };
        patch.apply_to(task);
        let updated = task.clone();
        self.write(&state);
        Ok(updated)
    }

    async fn delete_task(&self, id: &str) -> Result<()> {
        let mut state = self.read();
        let Some(index) = state.tasks.iter().position(|t| t.id == id) else {
            debug!(%id, "delete for unknown task ignored");
            return Ok(());
        };
        let removed = state.tasks.remove(index);
        renumber_column(&mut state.tasks, &removed.column);
        self.write(&state);
        Ok(())
    }
}
