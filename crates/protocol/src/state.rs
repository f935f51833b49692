//! Board state and the reducer that drives it.
//!
//! All in-memory mutation flows through [`reduce`], a total transition
//! function over [`Action`]. The [`Store`] wraps the current state and is
//! the single mutation entry point. Asynchronous side effects live in the
//! sync layer, never here; the persistence code issues the same actions
//! the UI would, including the compensating actions used for rollback.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::reorder::{MoveIntent, apply_move, renumber_column};
use crate::task::{ColumnKey, Task, TaskDraft, TaskId, TaskPatch};
use crate::week::Week;

/// The in-memory board state the UI renders from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardState {
    /// Every known task, across all columns and weeks.
    pub tasks: Vec<Task>,
    /// The week currently shown. `None` only in the brief window before
    /// the first load resolves it.
    pub current_week: Option<Week>,
    /// Whether an initial load is in flight.
    pub loading: bool,
    /// The most recent user-visible error, if any.
    pub error: Option<String>,
}

impl BoardState {
    /// Looks up a task by id.
    #[must_use]
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// The tasks of `column`, sorted by their `order`.
    #[must_use]
    pub fn column_tasks(&self, column: &str) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self.tasks.iter().filter(|t| t.column == column).collect();
        tasks.sort_by_key(|t| t.order);
        tasks
    }

    /// The dates of the visible day columns.
    ///
    /// Empty until the first week has been set; callers treat that as "no
    /// columns to render", not as a failure.
    #[must_use]
    pub fn column_dates(&self) -> Vec<NaiveDate> {
        self.current_week
            .map(|week| week.dates().to_vec())
            .unwrap_or_default()
    }
}

/// The serializable subset of [`BoardState`].
///
/// This is the `data` payload of the persisted envelope and the body of
/// export documents; the transient `loading` and `error` fields never
/// reach disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub current_week: Option<Week>,
}

impl From<&BoardState> for PersistedState {
    fn from(state: &BoardState) -> Self {
        Self {
            tasks: state.tasks.clone(),
            current_week: state.current_week,
        }
    }
}

/// A state transition of the board.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Replaces tasks and the current week wholesale and clears `loading`.
    LoadState {
        tasks: Vec<Task>,
        week: Option<Week>,
    },
    /// Appends a new task, filling id and order defaults from the draft.
    AddTask(TaskDraft),
    /// Shallow-merges a patch into the matching task; unknown ids are a
    /// no-op.
    UpdateTask { id: TaskId, patch: TaskPatch },
    /// Removes a task and compacts the orders of its former column.
    DeleteTask(TaskId),
    /// Flips a task's `completed` flag.
    ToggleTaskComplete(TaskId),
    /// Moves a task to `column` at position `order` (clamped), renumbering
    /// every affected column.
    MoveTask {
        id: TaskId,
        column: ColumnKey,
        order: usize,
    },
    /// Replaces the current week.
    SetCurrentWeek(Week),
    /// Advances one work week; a no-op before the first week is set.
    GoToNextWeek,
    /// Goes back one work week; a no-op before the first week is set.
    GoToPreviousWeek,
    /// Jumps to the week containing today.
    GoToCurrentWeek,
    /// Sets the loading flag.
    SetLoading(bool),
    /// Records or clears the user-visible error message.
    SetError(Option<String>),
}

/// Applies one action to the state and returns the next state.
///
/// The function is total: actions referencing missing tasks leave the
/// state unchanged rather than failing, so a dispatch can never panic or
/// leave a partial write behind.
#[must_use]
pub fn reduce(mut state: BoardState, action: Action) -> BoardState {
    match action {
        Action::LoadState { tasks, week } => {
            state.tasks = tasks;
            state.current_week = week;
            state.loading = false;
        }
        Action::AddTask(draft) => {
            let task = Task::from_draft(draft, &state.tasks);
            state.tasks.push(task);
        }
        Action::UpdateTask { id, patch } => {
            if let Some(task) = state.tasks.iter_mut().find(|t| t.id == id) {
                patch.apply_to(task);
            }
        }
        Action::DeleteTask(id) => {
            if let Some(index) = state.tasks.iter().position(|t| t.id == id) {
                let removed = state.tasks.remove(index);
                renumber_column(&mut state.tasks, &removed.column);
            }
        }
        Action::ToggleTaskComplete(id) => {
            if let Some(task) = state.tasks.iter_mut().find(|t| t.id == id) {
                task.completed = !task.completed;
            }
        }
        Action::MoveTask { id, column, order } => {
            let intent = MoveIntent {
                task_id: id,
                column,
                index: order,
            };
            if let Some(tasks) = apply_move(&state.tasks, &intent) {
                state.tasks = tasks;
            }
        }
        Action::SetCurrentWeek(week) => state.current_week = Some(week),
        Action::GoToNextWeek => {
            if let Some(week) = state.current_week {
                state.current_week = Some(week.next());
            }
        }
        Action::GoToPreviousWeek => {
            if let Some(week) = state.current_week {
                state.current_week = Some(week.previous());
            }
        }
        Action::GoToCurrentWeek => state.current_week = Some(Week::current()),
        Action::SetLoading(loading) => state.loading = loading,
        Action::SetError(error) => state.error = error,
    }
    state
}

/// Mutable holder around [`BoardState`].
///
/// `dispatch` is the only way state changes. The holder is deliberately
/// not `Sync`-shared: the application drives it from a single event loop,
/// so transitions are atomic with respect to each other.
///
/// # Examples
///
/// ```
/// use hebdo_protocol::{Action, Store, TaskDraft};
///
/// let mut store = Store::new();
/// store.dispatch(Action::AddTask(TaskDraft::new("Water the plants", "2025-09-07")));
/// assert_eq!(store.state().tasks.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Store {
    state: BoardState,
}

impl Store {
    /// Creates a store with empty initial state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store over a pre-existing state.
    #[must_use]
    pub fn with_state(state: BoardState) -> Self {
        Self { state }
    }

    /// Applies one action to the current state.
    pub fn dispatch(&mut self, action: Action) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> &BoardState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn task(id: &str, column: &str, order: usize) -> Task {
        Task {
            id: id.to_string(),
            title: format!("task {id}"),
            description: String::new(),
            column: column.to_string(),
            order,
            completed: false,
            created_at: Utc::now(),
            project_id: None,
            parent_id: None,
        }
    }

    fn week() -> Week {
        Week::bounds(NaiveDate::from_ymd_opt(2025, 9, 10).unwrap())
    }

    #[test]
    fn load_state_replaces_wholesale_and_clears_loading() {
        let mut store = Store::with_state(BoardState {
            tasks: vec![task("old", "sunday", 0)],
            current_week: None,
            loading: true,
            error: None,
        });
        store.dispatch(Action::LoadState {
            tasks: vec![task("new", "monday", 0)],
            week: Some(week()),
        });

        let state = store.state();
        assert_eq!(state.tasks.len(), 1);
        assert_eq!(state.tasks[0].id, "new");
        assert_eq!(state.current_week, Some(week()));
        assert!(!state.loading);
    }

    #[test]
    fn add_task_defaults_order_to_end_of_column() {
        let mut store = Store::new();
        store.dispatch(Action::AddTask(TaskDraft::new("one", "sunday")));
        store.dispatch(Action::AddTask(TaskDraft::new("two", "sunday")));
        store.dispatch(Action::AddTask(TaskDraft::new("other", "monday")));

        let sunday = store.state().column_tasks("sunday");
        assert_eq!(sunday.len(), 2);
        assert_eq!(sunday[0].order, 0);
        assert_eq!(sunday[1].order, 1);
        assert_eq!(store.state().column_tasks("monday")[0].order, 0);
    }

    #[test]
    fn add_task_generates_an_id_when_absent() {
        let mut store = Store::new();
        store.dispatch(Action::AddTask(TaskDraft::new("one", "sunday")));
        assert!(!store.state().tasks[0].id.is_empty());
    }

    #[test]
    fn update_task_merges_present_fields() {
        let mut store = Store::with_state(BoardState {
            tasks: vec![task("a", "sunday", 0)],
            ..BoardState::default()
        });
        store.dispatch(Action::UpdateTask {
            id: "a".to_string(),
            patch: TaskPatch {
                title: Some("renamed".to_string()),
                ..TaskPatch::default()
            },
        });

        let updated = store.state().task("a").unwrap();
        assert_eq!(updated.title, "renamed");
        assert_eq!(updated.column, "sunday");
    }

    #[test]
    fn update_unknown_task_is_a_noop() {
        let initial = BoardState {
            tasks: vec![task("a", "sunday", 0)],
            ..BoardState::default()
        };
        let next = reduce(
            initial.clone(),
            Action::UpdateTask {
                id: "ghost".to_string(),
                patch: TaskPatch {
                    title: Some("nope".to_string()),
                    ..TaskPatch::default()
                },
            },
        );
        assert_eq!(next, initial);
    }

    #[test]
    fn delete_task_compacts_the_column() {
        let mut store = Store::with_state(BoardState {
            tasks: vec![
                task("a", "sunday", 0),
                task("b", "sunday", 1),
                task("c", "sunday", 2),
            ],
            ..BoardState::default()
        });
        store.dispatch(Action::DeleteTask("b".to_string()));

        let sunday = store.state().column_tasks("sunday");
        assert_eq!(sunday.len(), 2);
        assert_eq!((sunday[0].id.as_str(), sunday[0].order), ("a", 0));
        assert_eq!((sunday[1].id.as_str(), sunday[1].order), ("c", 1));
    }

    #[test]
    fn delete_unknown_task_is_a_noop() {
        let initial = BoardState {
            tasks: vec![task("a", "sunday", 0)],
            ..BoardState::default()
        };
        let next = reduce(initial.clone(), Action::DeleteTask("ghost".to_string()));
        assert_eq!(next, initial);
    }

    #[test]
    fn toggle_flips_completion() {
        let mut store = Store::with_state(BoardState {
            tasks: vec![task("a", "sunday", 0)],
            ..BoardState::default()
        });
        store.dispatch(Action::ToggleTaskComplete("a".to_string()));
        assert!(store.state().task("a").unwrap().completed);
        store.dispatch(Action::ToggleTaskComplete("a".to_string()));
        assert!(!store.state().task("a").unwrap().completed);
    }

    #[test]
    fn move_task_reorders_through_the_reconciler() {
        let mut store = Store::with_state(BoardState {
            tasks: vec![task("a", "sunday", 0), task("b", "sunday", 1)],
            ..BoardState::default()
        });
        store.dispatch(Action::MoveTask {
            id: "b".to_string(),
            column: "monday".to_string(),
            order: 0,
        });

        assert_eq!(store.state().task("b").unwrap().column, "monday");
        assert_eq!(store.state().task("a").unwrap().order, 0);
    }

    #[test]
    fn week_navigation_requires_a_current_week() {
        let mut store = Store::new();
        store.dispatch(Action::GoToNextWeek);
        assert_eq!(store.state().current_week, None);

        store.dispatch(Action::SetCurrentWeek(week()));
        store.dispatch(Action::GoToNextWeek);
        assert_eq!(store.state().current_week, Some(week().next()));
        store.dispatch(Action::GoToPreviousWeek);
        assert_eq!(store.state().current_week, Some(week()));
    }

    #[test]
    fn go_to_current_week_resolves_today() {
        let mut store = Store::new();
        store.dispatch(Action::GoToCurrentWeek);
        assert_eq!(store.state().current_week, Some(Week::current()));
    }

    #[test]
    fn column_dates_are_empty_without_a_week() {
        let store = Store::new();
        assert!(store.state().column_dates().is_empty());

        let mut store = store;
        store.dispatch(Action::SetCurrentWeek(week()));
        assert_eq!(store.state().column_dates().len(), 5);
    }

    #[test]
    fn error_and_loading_flags_roundtrip() {
        let mut store = Store::new();
        store.dispatch(Action::SetLoading(true));
        store.dispatch(Action::SetError(Some("offline".to_string())));
        assert!(store.state().loading);
        assert_eq!(store.state().error.as_deref(), Some("offline"));

        store.dispatch(Action::SetLoading(false));
        store.dispatch(Action::SetError(None));
        assert!(!store.state().loading);
        assert_eq!(store.state().error, None);
    }

    #[test]
    fn persisted_state_drops_transient_fields() {
        let state = BoardState {
            tasks: vec![task("a", "sunday", 0)],
            current_week: Some(week()),
            loading: true,
            error: Some("offline".to_string()),
        };
        let persisted = PersistedState::from(&state);
        let json = serde_json::to_value(&persisted).expect("serialize");
        assert!(json.get("loading").is_none());
        assert!(json.get("error").is_none());
        assert!(json.get("currentWeek").is_some());
    }
}

#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    const COLUMNS: [&str; 3] = ["2025-09-07", "2025-09-08", "2025-09-09"];

    #[derive(Debug, Clone)]
    enum Op {
        Add { column: usize },
        Delete { seed: usize },
        Move { seed: usize, column: usize, order: usize },
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..COLUMNS.len()).prop_map(|column| Op::Add { column }),
            (0usize..32).prop_map(|seed| Op::Delete { seed }),
            (0usize..32, 0usize..COLUMNS.len(), 0usize..12)
                .prop_map(|(seed, column, order)| Op::Move { seed, column, order }),
        ]
    }

    fn contiguous(tasks: &[Task]) -> bool {
        COLUMNS.iter().all(|column| {
            let mut orders: Vec<usize> = tasks
                .iter()
                .filter(|t| t.column == *column)
                .map(|t| t.order)
                .collect();
            orders.sort_unstable();
            orders.iter().enumerate().all(|(i, &o)| i == o)
        })
    }

    proptest! {
        /// After every add, delete, or move, each column's orders are
        /// exactly 0..count with no gaps or duplicates.
        #[test]
        fn action_sequences_keep_columns_contiguous(ops in proptest::collection::vec(arb_op(), 1..40)) {
            let mut store = Store::new();
            for (i, op) in ops.into_iter().enumerate() {
                let action = match op {
                    Op::Add { column } => Some(Action::AddTask(TaskDraft::new(
                        format!("task {i}"),
                        COLUMNS[column],
                    ))),
                    Op::Delete { seed } => {
                        let tasks = &store.state().tasks;
                        (!tasks.is_empty())
                            .then(|| Action::DeleteTask(tasks[seed % tasks.len()].id.clone()))
                    }
                    Op::Move { seed, column, order } => {
                        let tasks = &store.state().tasks;
                        (!tasks.is_empty()).then(|| Action::MoveTask {
                            id: tasks[seed % tasks.len()].id.clone(),
                            column: COLUMNS[column].to_string(),
                            order,
                        })
                    }
                };
                if let Some(action) = action {
                    store.dispatch(action);
                    prop_assert!(contiguous(&store.state().tasks));
                }
            }
        }
    }
}
