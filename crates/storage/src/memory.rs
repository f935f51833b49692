//! In-memory task storage.
//!
//! [`MemoryStore`] implements the backend contract over a plain vector.
//! It backs ephemeral guest sessions and, with its failure injection
//! hook, serves as the test double for rollback scenarios in the sync
//! layer.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use hebdo_protocol::{Task, TaskDraft, TaskPatch, renumber_column};

use crate::backend::TaskBackend;
use crate::error::{Result, StorageError};

/// A vector-backed in-memory backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tasks: RwLock<Vec<Task>>,
    fail_requests: AtomicUsize,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with tasks.
    #[must_use]
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: RwLock::new(tasks),
            fail_requests: AtomicUsize::new(0),
        }
    }

    /// Makes the next `count` requests fail with
    /// [`StorageError::Unavailable`].
    pub fn fail_next_requests(&self, count: usize) {
        self.fail_requests.store(count, Ordering::SeqCst);
    }

    /// A snapshot of the stored tasks.
    pub async fn tasks(&self) -> Vec<Task> {
        self.tasks.read().await.clone()
    }

    fn take_failure(&self) -> Result<()> {
        let armed = self
            .fail_requests
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if armed {
            return Err(StorageError::Unavailable {
                reason: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TaskBackend for MemoryStore {
    async fn list_tasks(&self) -> Result<Vec<Task>> {
        self.take_failure()?;
        Ok(self.tasks.read().await.clone())
    }

    async fn create_task(&self, draft: &TaskDraft) -> Result<Task> {
        self.take_failure()?;
        let mut tasks = self.tasks.write().await;
        let task = Task::from_draft(draft.clone(), &tasks);
        tasks.push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Task> {
        self.take_failure()?;
        let mut tasks = self.tasks.write().await;
        let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
            return Err(StorageError::NotFound(id.to_string()));
        };
        patch.apply_to(task);
        Ok(task.clone())
    }

    async fn delete_task(&self, id: &str) -> Result<()> {
        self.take_failure()?;
        let mut tasks = self.tasks.write().await;
        if let Some(index) = tasks.iter().position(|t| t.id == id) {
            let removed = tasks.remove(index);
            renumber_column(&mut tasks, &removed.column);
        }
        Ok(())
    }
}
