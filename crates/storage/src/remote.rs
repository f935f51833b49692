//! Remote task-API storage.
//!
//! Each operation maps to one HTTP request against a task service. The
//! wire records in this module are the only place that speaks the
//! transport vocabulary; most notably the API calls the column field
//! `date`, and that translation never leaks into the internal task shape.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use hebdo_protocol::{ColumnKey, Task, TaskDraft, TaskId, TaskPatch};

use crate::backend::TaskBackend;
use crate::error::{Result, StorageError};

/// Task storage backed by a remote task API.
///
/// Requests carry a bearer token when one was provided. The token is held
/// as a [`SecretString`] so it cannot leak through debug output.
///
/// # Examples
///
/// ```no_run
/// use secrecy::SecretString;
/// use hebdo_storage::{RemoteStore, TaskBackend};
///
/// # async fn example() -> hebdo_storage::Result<()> {
/// let token = SecretString::from("api_token".to_string());
/// let store = RemoteStore::new("https://tasks.example.com/api", Some(token));
/// let tasks = store.list_tasks().await?;
/// println!("{} tasks", tasks.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RemoteStore {
    http: reqwest::Client,
    base_url: String,
    token: Option<SecretString>,
}

impl RemoteStore {
    /// Creates a client for the task API at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, token: Option<SecretString>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            token,
        }
    }

    /// Returns whether requests carry a bearer token.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn tasks_url(&self) -> String {
        format!("{}/tasks", self.base_url)
    }

    fn task_url(&self, id: &str) -> String {
        format!("{}/tasks/{id}", self.base_url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }
}

#[async_trait]
impl TaskBackend for RemoteStore {
    #[instrument(skip(self))]
    async fn list_tasks(&self) -> Result<Vec<Task>> {
        let response = self.authorize(self.http.get(self.tasks_url())).send().await?;
        if !response.status().is_success() {
            return Err(error_for_status(response).await);
        }
        let records: Vec<WireTask> = response.json().await?;
        debug!(count = records.len(), "fetched tasks");
        Ok(records.into_iter().map(Task::from).collect())
    }

    #[instrument(skip(self, draft), fields(column = %draft.column))]
    async fn create_task(&self, draft: &TaskDraft) -> Result<Task> {
        let response = self
            .authorize(self.http.post(self.tasks_url()))
            .json(&WireDraft::from(draft))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_for_status(response).await);
        }
        let record: WireTask = response.json().await?;
        debug!(id = %record.id, "created task");
        Ok(record.into())
    }

    #[instrument(skip(self, patch))]
    async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Task> {
        let response = self
            .authorize(self.http.patch(self.task_url(id)))
            .json(&WirePatch::from(patch))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound(id.to_string()));
        }
        if !response.status().is_success() {
            return Err(error_for_status(response).await);
        }
        let record: WireTask = response.json().await?;
        Ok(record.into())
    }

    #[instrument(skip(self))]
    async fn delete_task(&self, id: &str) -> Result<()> {
        let response = self
            .authorize(self.http.delete(self.task_url(id)))
            .send()
            .await?;
        // An id the server no longer knows still counts as deleted.
        if response.status() == StatusCode::NOT_FOUND || response.status().is_success() {
            return Ok(());
        }
        Err(error_for_status(response).await)
    }
}

async fn error_for_status(response: Response) -> StorageError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    StorageError::Api { status, message }
}

/// A task record as the API speaks it.
///
/// The `date` field is the transport name for the internal `column`;
/// every other field passes through by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTask {
    id: TaskId,
    title: String,
    #[serde(default)]
    description: String,
    date: ColumnKey,
    #[serde(default)]
    order: usize,
    #[serde(default)]
    completed: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_id: Option<String>,
}

impl From<WireTask> for Task {
    fn from(record: WireTask) -> Self {
        Task {
            id: record.id,
            title: record.title,
            description: record.description,
            column: record.date,
            order: record.order,
            completed: record.completed,
            created_at: record.created_at,
            project_id: record.project_id,
            parent_id: record.parent_id,
        }
    }
}

/// The create-request body. The server assigns the canonical id and
/// creation timestamp, so neither is sent.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireDraft<'a> {
    title: &'a str,
    description: &'a str,
    date: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    order: Option<usize>,
    completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_id: Option<&'a str>,
}

impl<'a> From<&'a TaskDraft> for WireDraft<'a> {
    fn from(draft: &'a TaskDraft) -> Self {
        Self {
            title: &draft.title,
            description: &draft.description,
            date: &draft.column,
            order: draft.order,
            completed: draft.completed,
            project_id: draft.project_id.as_deref(),
            parent_id: draft.parent_id.as_deref(),
        }
    }
}

/// The update-request body. Only the fields present in the patch are
/// serialized; id and creation timestamp stay server-owned and are never
/// sent.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct WirePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(rename = "date", skip_serializing_if = "Option::is_none")]
    column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    order: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_id: Option<Option<String>>,
}

impl From<&TaskPatch> for WirePatch {
    fn from(patch: &TaskPatch) -> Self {
        Self {
            title: patch.title.clone(),
            description: patch.description.clone(),
            column: patch.column.clone(),
            order: patch.order,
            completed: patch.completed,
            project_id: patch.project_id.clone(),
            parent_id: patch.parent_id.clone(),
        }
    }
}
