//! The storage capability interface.
//!
//! Every persistence medium the board can sync against implements
//! [`TaskBackend`]. The trait is object-safe so the active backend can be
//! chosen at runtime from the authentication status and injected as an
//! `Arc<dyn TaskBackend>`; callers never branch on which variant they
//! hold.

use async_trait::async_trait;
use hebdo_protocol::{Task, TaskDraft, TaskPatch};

use crate::error::Result;

/// A persistence medium for tasks.
///
/// The contract all implementations share:
///
/// - [`list_tasks`](Self::list_tasks) fails with
///   [`StorageError::Unavailable`](crate::StorageError::Unavailable) when
///   the medium is unreachable. The local implementation treats corrupt
///   data as "no saved data" and returns an empty list instead of failing.
/// - [`create_task`](Self::create_task) fills in the id, creation
///   timestamp, and order when the draft leaves them out, and returns the
///   canonical stored record.
/// - [`update_task`](Self::update_task) fails with
///   [`StorageError::NotFound`](crate::StorageError::NotFound) when the id
///   is unknown.
/// - [`delete_task`](Self::delete_task) is idempotent: deleting an id that
///   does not exist is not an error.
#[async_trait]
pub trait TaskBackend: Send + Sync {
    /// Returns every stored task.
    async fn list_tasks(&self) -> Result<Vec<Task>>;

    /// Stores a new task and returns the canonical record.
    async fn create_task(&self, draft: &TaskDraft) -> Result<Task>;

    /// Applies a partial update and returns the full updated record.
    async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Task>;

    /// Removes a task. Unknown ids succeed silently.
    async fn delete_task(&self, id: &str) -> Result<()>;
}
