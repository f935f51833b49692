//! Task types for the weekly board.
//!
//! This module defines the core persisted entity ([`Task`]) together with
//! the two partial shapes the rest of the system works with: [`TaskDraft`]
//! for creation and [`TaskPatch`] for shallow-merge updates and their
//! inverses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, Result};

/// Unique identifier for a task.
///
/// Ids are opaque strings. Locally created tasks receive an id from
/// [`generate_task_id`]; once a create round-trip succeeds against a remote
/// backend, the task adopts the backend's canonical id instead.
pub type TaskId = String;

/// Key of the column a task is grouped under.
///
/// On the day board this is a `YYYY-MM-DD` date string (see
/// [`Week::column_key`](crate::week::Week::column_key)) or a plain day name
/// such as `"sunday"`.
pub type ColumnKey = String;

/// Generates a fresh client-side task id.
///
/// The id combines the creation timestamp with a random suffix, so ids sort
/// roughly by creation time and never collide across sessions.
///
/// # Examples
///
/// ```
/// use hebdo_protocol::generate_task_id;
///
/// let a = generate_task_id();
/// let b = generate_task_id();
/// assert_ne!(a, b);
/// ```
#[must_use]
pub fn generate_task_id() -> TaskId {
    let suffix = uuid::Uuid::new_v4().simple();
    format!("{}-{}", Utc::now().timestamp_millis(), suffix)
}

/// A task on the weekly board.
///
/// Tasks live in day columns and carry a zero-based `order` within their
/// column. After every successful mutation the orders within one column are
/// contiguous (`0..count`), which is the invariant the reordering logic in
/// [`crate::reorder`] maintains.
///
/// # Examples
///
/// ```
/// use hebdo_protocol::{Task, TaskDraft};
///
/// let draft = TaskDraft::new("Water the plants", "2025-09-07");
/// let task = Task::from_draft(draft, &[]);
/// assert_eq!(task.order, 0);
/// assert!(!task.completed);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier for this task.
    pub id: TaskId,
    /// Short summary shown on the card. Required to be non-empty on save.
    pub title: String,
    /// Free-form markdown body.
    #[serde(default)]
    pub description: String,
    /// The column this task currently lives in.
    pub column: ColumnKey,
    /// Zero-based position within the column.
    #[serde(default)]
    pub order: usize,
    /// Whether the task has been completed.
    #[serde(default)]
    pub completed: bool,
    /// When this task was created (epoch milliseconds when serialized).
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// Project this task belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Parent task in a project hierarchy, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl Task {
    /// Materializes a draft into a full task.
    ///
    /// Fields the draft leaves out get their documented defaults: the id is
    /// generated, `created_at` is now, and `order` appends to the end of
    /// the draft's column as counted over `existing`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hebdo_protocol::{Task, TaskDraft};
    ///
    /// let first = Task::from_draft(TaskDraft::new("One", "sunday"), &[]);
    /// let second = Task::from_draft(TaskDraft::new("Two", "sunday"), &[first.clone()]);
    /// assert_eq!(second.order, 1);
    /// assert_ne!(first.id, second.id);
    /// ```
    #[must_use]
    pub fn from_draft(draft: TaskDraft, existing: &[Task]) -> Self {
        let order = draft
            .order
            .unwrap_or_else(|| existing.iter().filter(|t| t.column == draft.column).count());
        Self {
            id: draft.id.unwrap_or_else(generate_task_id),
            title: draft.title,
            description: draft.description,
            column: draft.column,
            order,
            completed: draft.completed,
            created_at: Utc::now(),
            project_id: draft.project_id,
            parent_id: draft.parent_id,
        }
    }
}

/// The partial shape used to create a task.
///
/// Only `title` and `column` are required; everything else defaults when
/// the draft is materialized by [`Task::from_draft`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    /// Explicit id, when the caller has already generated one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TaskId>,
    /// Task title. Must be non-empty to pass [`TaskDraft::validate`].
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Target column.
    pub column: ColumnKey,
    /// Explicit position; appended to the end of the column when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<usize>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl TaskDraft {
    /// Creates a draft with the given title and column.
    ///
    /// # Examples
    ///
    /// ```
    /// use hebdo_protocol::TaskDraft;
    ///
    /// let draft = TaskDraft::new("Fix the gate", "2025-09-08");
    /// assert_eq!(draft.column, "2025-09-08");
    /// assert!(draft.order.is_none());
    /// ```
    #[must_use]
    pub fn new(title: impl Into<String>, column: impl Into<ColumnKey>) -> Self {
        Self {
            title: title.into(),
            column: column.into(),
            ..Self::default()
        }
    }

    /// Checks that the draft can be saved.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidTaskTitle`] when the title is empty
    /// or whitespace-only.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(ProtocolError::InvalidTaskTitle);
        }
        Ok(())
    }
}

/// A shallow-merge update for a task.
///
/// Every field is optional; [`TaskPatch::apply_to`] only touches the fields
/// that are present. A patch may carry a replacement `id` so a locally
/// created task can adopt the backend's canonical id after a successful
/// create. The nested options on `project_id` and `parent_id` distinguish
/// "leave unchanged" (outer `None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TaskId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<ColumnKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Option<String>>,
}

impl TaskPatch {
    /// Returns `true` if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the patch to `task`, overwriting only the present fields.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(id) = &self.id {
            task.id = id.clone();
        }
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(column) = &self.column {
            task.column = column.clone();
        }
        if let Some(order) = self.order {
            task.order = order;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(created_at) = self.created_at {
            task.created_at = created_at;
        }
        if let Some(project_id) = &self.project_id {
            task.project_id = project_id.clone();
        }
        if let Some(parent_id) = &self.parent_id {
            task.parent_id = parent_id.clone();
        }
    }

    /// Builds the inverse of this patch against a pre-mutation snapshot.
    ///
    /// For every field this patch would touch, the returned patch carries
    /// the snapshot's value, so applying the result restores the task to
    /// its pre-mutation shape exactly.
    ///
    /// # Examples
    ///
    /// ```
    /// use hebdo_protocol::{Task, TaskDraft, TaskPatch};
    ///
    /// let original = Task::from_draft(TaskDraft::new("Old title", "sunday"), &[]);
    /// let patch = TaskPatch {
    ///     title: Some("New title".to_string()),
    ///     ..TaskPatch::default()
    /// };
    /// let rollback = patch.restoring(&original);
    ///
    /// let mut task = original.clone();
    /// patch.apply_to(&mut task);
    /// rollback.apply_to(&mut task);
    /// assert_eq!(task, original);
    /// ```
    #[must_use]
    pub fn restoring(&self, snapshot: &Task) -> TaskPatch {
        TaskPatch {
            id: self.id.as_ref().map(|_| snapshot.id.clone()),
            title: self.title.as_ref().map(|_| snapshot.title.clone()),
            description: self.description.as_ref().map(|_| snapshot.description.clone()),
            column: self.column.as_ref().map(|_| snapshot.column.clone()),
            order: self.order.map(|_| snapshot.order),
            completed: self.completed.map(|_| snapshot.completed),
            created_at: self.created_at.map(|_| snapshot.created_at),
            project_id: self.project_id.as_ref().map(|_| snapshot.project_id.clone()),
            parent_id: self.parent_id.as_ref().map(|_| snapshot.parent_id.clone()),
        }
    }
}


#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::option;
    use proptest::prelude::*;

    prop_compose! {
        fn arb_task()(
            id in "[a-z0-9]{4,12}",
            title in "[a-zA-Z][a-zA-Z0-9 ]{0,40}",
            description in "[a-zA-Z0-9 .,!?]{0,80}",
            column in prop_oneof![Just("2025-09-07"), Just("2025-09-08"), Just("sunday")],
            order in 0usize..16,
            completed in any::<bool>(),
            project_id in option::of("[a-z0-9]{4}"),
        ) -> Task {
            Task {
                id,
                title,
                description,
                column: column.to_string(),
                order,
                completed,
                created_at: Utc::now(),
                project_id,
                parent_id: None,
            }
        }
    }

    prop_compose! {
        fn arb_patch()(
            title in option::of("[a-zA-Z][a-zA-Z0-9 ]{0,20}"),
            description in option::of("[a-z ]{0,30}"),
            column in option::of(prop_oneof![Just("2025-09-07"), Just("monday")]),
            order in option::of(0usize..16),
            completed in option::of(any::<bool>()),
            project_id in option::of(option::of("[a-z0-9]{4}")),
        ) -> TaskPatch {
            TaskPatch {
                id: None,
                title,
                description,
                column: column.map(str::to_string),
                order,
                completed,
                created_at: None,
                project_id: project_id.map(|inner| inner.map(|s| s.to_string())),
                parent_id: None,
            }
        }
    }

    proptest! {
        /// Applying a patch and then its restoring inverse is the identity.
        #[test]
        fn patch_then_restoring_is_identity(original in arb_task(), patch in arb_patch()) {
            let rollback = patch.restoring(&original);
            let mut mutated = original.clone();
            patch.apply_to(&mut mutated);
            rollback.apply_to(&mut mutated);
            prop_assert_eq!(mutated, original);
        }

        /// Serialization roundtrips preserve every field.
        #[test]
        fn task_json_roundtrip(task in arb_task()) {
            let json = serde_json::to_string(&task).expect("serialize");
            let parsed: Task = serde_json::from_str(&json).expect("deserialize");
            prop_assert_eq!(parsed.id, task.id);
            prop_assert_eq!(parsed.title, task.title);
            prop_assert_eq!(parsed.column, task.column);
            prop_assert_eq!(parsed.order, task.order);
            prop_assert_eq!(parsed.completed, task.completed);
        }
    }
}
