//! Shared types and board logic for the hebdo application.
//!
//! This crate defines the data model and the pure state logic every other
//! component builds on:
//!
//! - [`task`]: the task entity and its partial create/update shapes
//! - [`week`]: the Sunday-through-Thursday work-week calculator
//! - [`state`]: board state, actions, and the reducer state machine
//! - [`reorder`]: drag-and-drop move resolution and column renumbering
//! - [`error`]: validation error types
//!
//! # Examples
//!
//! Driving a board through the store:
//!
//! ```
//! use hebdo_protocol::{Action, Store, TaskDraft};
//!
//! let mut store = Store::new();
//! store.dispatch(Action::AddTask(TaskDraft::new("Water the plants", "2025-09-07")));
//! store.dispatch(Action::AddTask(TaskDraft::new("File the report", "2025-09-07")));
//!
//! let column = store.state().column_tasks("2025-09-07");
//! assert_eq!(column.len(), 2);
//! assert_eq!(column[1].title, "File the report");
//! ```

pub mod error;
pub mod reorder;
pub mod state;
pub mod task;
pub mod week;

// Re-export primary types at crate root for convenience
pub use error::{ProtocolError, Result};
pub use reorder::{MoveIntent, apply_move, compact_columns, renumber_column, resolve_drop};
pub use state::{Action, BoardState, PersistedState, Store, reduce};
pub use task::{ColumnKey, Task, TaskDraft, TaskId, TaskPatch, generate_task_id};
pub use week::{WORK_WEEK_DAYS, Week, is_same_day, is_today};
