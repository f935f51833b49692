//! End-to-end tests over the real local backend.
//!
//! These walk the same path the application does: a coordinator over a
//! `LocalStore`, mutations through the optimistic wrappers, and a fresh
//! coordinator afterwards to prove the envelope on disk carries the
//! board across sessions.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use hebdo_protocol::{TaskDraft, Week};
use hebdo_storage::{LocalStore, SCHEMA_VERSION};
use hebdo_sync::{AuthStatus, Coordinator};

async fn open_board(dir: &TempDir) -> Coordinator {
    let path = dir.path().join("board.json");
    let local = Arc::new(LocalStore::new(&path));
    let mut coordinator =
        Coordinator::new(local, None).with_autosave(&path, Duration::from_millis(500));
    coordinator.set_auth_status(AuthStatus::Guest).await;
    coordinator
}

#[tokio::test]
async fn a_week_of_edits_survives_reopening_the_board() {
    let dir = TempDir::new().unwrap();

    let (groceries, laundry) = {
        let mut board = open_board(&dir).await;
        let groceries = board
            .create_task(TaskDraft::new("Groceries", "2025-09-07"))
            .await
            .unwrap();
        let laundry = board
            .create_task(TaskDraft::new("Laundry", "2025-09-07"))
            .await
            .unwrap();
        board
            .create_task(TaskDraft::new("Call the bank", "2025-09-08"))
            .await
            .unwrap();

        board.toggle_complete(&groceries).await.unwrap();
        // Drag laundry onto the Monday column.
        board.drop_task(&laundry, "2025-09-08").await.unwrap();
        board.flush();
        (groceries, laundry)
    };

    let board = open_board(&dir).await;
    let state = board.state();
    assert_eq!(state.tasks.len(), 3);
    assert!(state.task(&groceries).unwrap().completed);

    let monday = state.column_tasks("2025-09-08");
    assert_eq!(monday.len(), 2);
    assert_eq!(monday[1].id, laundry);
    assert_eq!(monday[0].order, 0);
    assert_eq!(monday[1].order, 1);

    let sunday = state.column_tasks("2025-09-07");
    assert_eq!(sunday.len(), 1);
    assert_eq!(sunday[0].order, 0);
}

#[tokio::test]
async fn reorders_inside_a_column_persist() {
    let dir = TempDir::new().unwrap();
    let mut board = open_board(&dir).await;

    let first = board
        .create_task(TaskDraft::new("First", "2025-09-07"))
        .await
        .unwrap();
    let second = board
        .create_task(TaskDraft::new("Second", "2025-09-07"))
        .await
        .unwrap();

    // Drag the top card down onto the second one.
    board.drop_task(&first, &second).await.unwrap();
    board.flush();

    let reopened = open_board(&dir).await;
    let column = reopened.state().column_tasks("2025-09-07");
    assert_eq!(column[0].id, second);
    assert_eq!(column[1].id, first);
}

#[tokio::test]
async fn export_can_rebuild_a_wiped_board() {
    let dir = TempDir::new().unwrap();
    let mut board = open_board(&dir).await;

    board
        .create_task(TaskDraft::new("Keep me", "2025-09-07"))
        .await
        .unwrap();
    let exported = board.export_data().unwrap();

    // Wipe the board, then restore from the export.
    let id = board.state().tasks[0].id.clone();
    board.delete_task(&id).await.unwrap();
    assert!(board.state().tasks.is_empty());

    board.import_data(&exported).await.unwrap();
    assert_eq!(board.state().tasks.len(), 1);
    assert_eq!(board.state().tasks[0].title, "Keep me");

    // The import also reached the envelope on disk.
    let reopened = open_board(&dir).await;
    assert_eq!(reopened.state().tasks.len(), 1);
}

#[tokio::test]
async fn version_one_data_on_disk_heals_on_first_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("board.json");
    fs::write(
        &path,
        r#"{
            "version": 1,
            "data": {"tasks": [
                {"id": "old-1", "title": "From a past schema", "column": "2025-09-07"}
            ]},
            "timestamp": 0
        }"#,
    )
    .unwrap();

    let board = open_board(&dir).await;
    let task = board.state().task("old-1").unwrap();
    assert_eq!(task.order, 0);
    assert!(!task.completed);

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["version"], u64::from(SCHEMA_VERSION));
}

#[tokio::test]
async fn week_navigation_follows_the_calendar() {
    let dir = TempDir::new().unwrap();
    let mut board = open_board(&dir).await;

    let start = board.state().current_week.unwrap();
    assert_eq!(start, Week::current());

    board.go_to_next_week();
    board.go_to_next_week();
    let ahead = board.state().current_week.unwrap();
    assert_eq!(ahead.start().date() - start.start().date(), chrono::Duration::days(14));

    board.go_to_current_week();
    assert_eq!(board.state().current_week.unwrap(), start);
}
