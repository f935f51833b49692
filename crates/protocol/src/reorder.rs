//! Reordering logic for drag-and-drop moves.
//!
//! A completed drag arrives either as an explicit `(task, column, position)`
//! triple or as the raw `(active_id, over_id)` pair a drag library reports.
//! [`resolve_drop`] turns the raw pair into a [`MoveIntent`], and
//! [`apply_move`] executes the intent, renumbering every affected column so
//! orders stay contiguous.

use crate::task::{ColumnKey, Task, TaskId};

/// A resolved move: put `task_id` into `column` at `index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveIntent {
    /// The task being moved.
    pub task_id: TaskId,
    /// The column the task lands in.
    pub column: ColumnKey,
    /// Insertion index into the target column with the moved task removed;
    /// clamped to the column length on application.
    pub index: usize,
}

/// Resolves a raw drop event into a [`MoveIntent`].
///
/// `over_id` may name another task (drop on a card) or, when no task
/// matches, a column (drop on empty column space). Dropping on a card in
/// the same column inserts after the card when the drag moves downward and
/// before it when the drag moves upward, matching what the user sees as
/// the dragged card displaces whatever it passes. Dropping on a card in a
/// different column always inserts before that card, since there is no
/// original position in the new column to compare against.
///
/// Returns `None` when `active_id` matches no task or when the drop cannot
/// be resolved (for example a card dropped onto itself); callers keep the
/// previous state untouched.
#[must_use]
pub fn resolve_drop(tasks: &[Task], active_id: &str, over_id: &str) -> Option<MoveIntent> {
    let active = tasks.iter().find(|t| t.id == active_id)?;

    let Some(over) = tasks.iter().find(|t| t.id == over_id) else {
        // No task with that id: the drop landed on empty column space.
        let index = tasks
            .iter()
            .filter(|t| t.column == over_id && t.id != active_id)
            .count();
        return Some(MoveIntent {
            task_id: active.id.clone(),
            column: over_id.to_string(),
            index,
        });
    };

    let frame = sorted_column(tasks, &over.column, active_id);
    let position = frame.iter().position(|t| t.id == over.id)?;
    let moving_down = active.column == over.column && active.order < over.order;
    let index = if moving_down { position + 1 } else { position };

    Some(MoveIntent {
        task_id: active.id.clone(),
        column: over.column.clone(),
        index,
    })
}

/// Applies a [`MoveIntent`] and returns the full replacement task list.
///
/// The target column is rebuilt with the moved task spliced in at the
/// clamped index and renumbered `0..count`; when the task changes columns
/// its former column is renumbered as well. Other columns pass through
/// untouched. Returns `None` when the intent's task does not exist, so the
/// caller's state stays unchanged rather than being partially written.
#[must_use]
pub fn apply_move(tasks: &[Task], intent: &MoveIntent) -> Option<Vec<Task>> {
    let mut moved = tasks.iter().find(|t| t.id == intent.task_id)?.clone();
    let source_column = std::mem::replace(&mut moved.column, intent.column.clone());

    let mut frame: Vec<Task> = tasks
        .iter()
        .filter(|t| t.column == intent.column && t.id != intent.task_id)
        .cloned()
        .collect();
    frame.sort_by_key(|t| t.order);
    let index = intent.index.min(frame.len());
    frame.insert(index, moved);
    for (position, task) in frame.iter_mut().enumerate() {
        task.order = position;
    }

    let mut result: Vec<Task> = tasks
        .iter()
        .filter(|t| t.column != intent.column && t.id != intent.task_id)
        .cloned()
        .collect();
    result.extend(frame);

    if source_column != intent.column {
        renumber_column(&mut result, &source_column);
    }

    Some(result)
}

/// Reassigns contiguous orders `0..count` to the tasks of one column,
/// preserving their current relative order.
pub fn renumber_column(tasks: &mut [Task], column: &str) {
    let mut members: Vec<usize> = (0..tasks.len())
        .filter(|&i| tasks[i].column == column)
        .collect();
    members.sort_by_key(|&i| tasks[i].order);
    for (position, &i) in members.iter().enumerate() {
        tasks[i].order = position;
    }
}

/// Renumbers every column in the list.
///
/// Used when data enters from outside the reducer (disk, the network, an
/// import), where gaps or duplicate orders may have crept in.
pub fn compact_columns(tasks: &mut [Task]) {
    let mut columns: Vec<ColumnKey> = tasks.iter().map(|t| t.column.clone()).collect();
    columns.sort();
    columns.dedup();
    for column in columns {
        renumber_column(tasks, &column);
    }
}

fn sorted_column<'a>(tasks: &'a [Task], column: &str, exclude: &str) -> Vec<&'a Task> {
    let mut frame: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.column == column && t.id != exclude)
        .collect();
    frame.sort_by_key(|t| t.order);
    frame
}
