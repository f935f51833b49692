//! The versioned persistence envelope.
//!
//! Saved board state is wrapped in an [`Envelope`] carrying a schema
//! version and a write timestamp. Loading compares the stored version
//! against [`SCHEMA_VERSION`], runs the migration chain when the data is
//! older, and immediately rewrites the migrated result so the next load
//! skips migration. Data that cannot be recognized at all is discarded
//! with a warning; the board then starts fresh instead of surfacing a
//! parse error.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use hebdo_protocol::{PersistedState, Week, compact_columns, generate_task_id};

use crate::error::Result;

/// Current schema version of the persisted envelope.
pub const SCHEMA_VERSION: u32 = 2;

/// The on-disk wrapper around persisted state.
///
/// `data` stays a raw JSON value until the migration chain has brought it
/// up to the current schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Schema version the data was written with. Envelopes from before
    /// versioning carry no tag and count as version 1.
    #[serde(default = "legacy_version")]
    pub version: u32,
    /// The persisted state payload.
    pub data: Value,
    /// When the envelope was written, in epoch milliseconds.
    #[serde(default)]
    pub timestamp: i64,
}

fn legacy_version() -> u32 {
    1
}

/// Writes `state` to `path`, wrapped in a current-version envelope.
///
/// Failures are logged and swallowed: losing one save is recoverable
/// (the next save retries with the same in-memory state), while surfacing
/// the error would take down an otherwise healthy session.
pub fn save_state(path: &Path, state: &PersistedState) {
    if let Err(e) = write_envelope(path, state) {
        warn!(path = %path.display(), error = %e, "failed to write board state");
    }
}

/// Loads persisted state from `path`.
///
/// Returns `None` when no file exists or when the contents cannot be
/// recognized; the caller initializes a fresh board in both cases. Stale
/// envelopes are migrated and rewritten at the current version before the
/// state is returned.
pub fn load_state(path: &Path) -> Option<PersistedState> {
    if !path.exists() {
        return None;
    }
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read saved board");
            return None;
        }
    };
    let envelope: Envelope = match serde_json::from_str(&raw) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "discarding corrupt saved board");
            return None;
        }
    };

    let stale = envelope.version < SCHEMA_VERSION;
    let state = upgrade(envelope)?;
    if stale {
        debug!(path = %path.display(), "rewriting migrated board at the current schema version");
        save_state(path, &state);
    }
    Some(state)
}

/// Brings an envelope up to the current schema and parses its payload.
///
/// Returns `None` when the payload is structurally unrecognizable. The
/// parsed state is normalized on the way out: column orders are compacted
/// and the stored week is re-bounded from its start date.
pub fn upgrade(mut envelope: Envelope) -> Option<PersistedState> {
    for version in envelope.version.max(1)..SCHEMA_VERSION {
        let migrated = match version {
            1 => migrate_v1_to_v2(&mut envelope.data),
            _ => Some(()),
        };
        if migrated.is_none() {
            warn!(version, "saved board has an unrecognizable shape, starting fresh");
            return None;
        }
    }

    let mut state: PersistedState = match serde_json::from_value(envelope.data) {
        Ok(state) => state,
        Err(e) => {
            warn!(error = %e, "saved board does not parse, starting fresh");
            return None;
        }
    };
    compact_columns(&mut state.tasks);
    state.current_week = state.current_week.map(|week| Week::bounds(week.start().date()));
    Some(state)
}

/// Normalizes every version-1 task record so the current schema's required
/// fields are all present, filling defaults instead of rejecting records.
/// Entries that are not objects at all are dropped.
fn migrate_v1_to_v2(data: &mut Value) -> Option<()> {
    let root = data.as_object_mut()?;
    let tasks = match root.get_mut("tasks") {
        Some(Value::Array(tasks)) => tasks,
        Some(_) => return None,
        None => {
            root.insert("tasks".to_string(), json!([]));
            return Some(());
        }
    };

    // Next free order per column, for records saved without one.
    let mut next_order: HashMap<String, u64> = HashMap::new();
    for record in tasks.iter() {
        if let Some(object) = record.as_object()
            && let Some(column) = object.get("column").and_then(Value::as_str)
            && let Some(order) = object.get("order").and_then(Value::as_u64)
        {
            let next = next_order.entry(column.to_string()).or_insert(0);
            *next = (*next).max(order + 1);
        }
    }

    tasks.retain(Value::is_object);
    for record in tasks.iter_mut() {
        let object = record.as_object_mut()?;
        fill_string(object, "id", generate_task_id);
        fill_string(object, "title", String::new);
        fill_string(object, "description", String::new);
        fill_string(object, "column", String::new);
        if !object.get("completed").is_some_and(Value::is_boolean) {
            object.insert("completed".to_string(), json!(false));
        }
        if !object.get("createdAt").is_some_and(Value::is_number) {
            object.insert("createdAt".to_string(), json!(Utc::now().timestamp_millis()));
        }
        if !object.get("order").is_some_and(Value::is_u64) {
            let column = object
                .get("column")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let next = next_order.entry(column).or_insert(0);
            object.insert("order".to_string(), json!(*next));
            *next += 1;
        }
    }
    Some(())
}

fn fill_string(object: &mut Map<String, Value>, key: &str, default: impl FnOnce() -> String) {
    if !object.get(key).is_some_and(Value::is_string) {
        object.insert(key.to_string(), Value::String(default()));
    }
}

fn write_envelope(path: &Path, state: &PersistedState) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.exists()) {
        fs::create_dir_all(parent)?;
    }
    let envelope = Envelope {
        version: SCHEMA_VERSION,
        data: serde_json::to_value(state)?,
        timestamp: Utc::now().timestamp_millis(),
    };
    let content = serde_json::to_string_pretty(&envelope)?;

    // Atomic-ish write via temp file + rename.
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
