//! Task API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{created, ok, ApiResult};
use crate::errors::AppError;
use crate::models::{
    AddAttachmentRequest, Attachment, CreateTaskRequest, RemoveAttachmentRequest, Task,
    UpdateTaskRequest, UpdateTaskStatusRequest,
};
use crate::AppState;

/// Query parameters for listing tasks.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksParams {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

/// GET /api/tasks - List tasks, optionally filtered by project.
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(params): Query<ListTasksParams>,
) -> ApiResult<Vec<Task>> {
    let tasks = state
        .repo
        .list_tasks(params.project_id.as_deref(), params.limit, params.offset)
        .await?;
    ok(tasks)
}

/// GET /api/tasks/:id - Get a single task.
pub async fn get_task(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Task> {
    match state.repo.get_task(&id).await? {
        Some(task) => ok(task),
        None => Err(AppError::NotFound(format!("Task {} not found", id))),
    }
}

/// POST /api/tasks - Create a new task.
pub async fn create_task(
    State(state): State<AppState>,
    Json(request): Json<CreateTaskRequest>,
) -> ApiResult<Task> {
    if request.title.trim().is_empty() {
        return Err(AppError::Validation("Task title is required".to_string()));
    }
    if request.project_id.trim().is_empty() {
        return Err(AppError::Validation("Project id is required".to_string()));
    }
    if request.author_id.trim().is_empty() {
        return Err(AppError::Validation("Author id is required".to_string()));
    }

    let task = state.repo.create_task(&request).await?;

    if let Err(e) = state.search.index_task(&task).await {
        tracing::warn!("Failed to index task: {}", e);
    }

    created(task)
}

/// PUT /api/tasks/:id - Update a task.
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateTaskRequest>,
) -> ApiResult<Task> {
    let task = state.repo.update_task(&id, &request).await?;

    if let Err(e) = state.search.index_task(&task).await {
        tracing::warn!("Failed to re-index task: {}", e);
    }

    ok(task)
}

/// PATCH /api/tasks/:id/status - Move a task to another board column.
pub async fn update_task_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateTaskStatusRequest>,
) -> ApiResult<Task> {
    let task = state.repo.update_task_status(&id, request.status).await?;
    ok(task)
}

/// DELETE /api/tasks/:id - Delete a task.
pub async fn delete_task(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.repo.delete_task(&id).await?;

    if let Err(e) = state.search.remove(&id).await {
        tracing::warn!("Failed to remove task from index: {}", e);
    }

    ok(())
}

/// POST /api/tasks/:id/attachments - Record a file attachment.
pub async fn add_task_attachment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AddAttachmentRequest>,
) -> ApiResult<Task> {
    if request.file_name.trim().is_empty() || request.file_url.trim().is_empty() {
        return Err(AppError::Validation(
            "File name and file url are required".to_string(),
        ));
    }

    let attachment = Attachment {
        file_name: request.file_name,
        file_url: request.file_url,
        uploaded_by: request.uploaded_by,
    };
    let task = state.repo.add_task_attachment(&id, attachment).await?;
    ok(task)
}

/// DELETE /api/tasks/:id/attachments - Remove a file attachment.
pub async fn remove_task_attachment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<RemoveAttachmentRequest>,
) -> ApiResult<Task> {
    let task = state
        .repo
        .remove_task_attachment(&id, &request.file_url)
        .await?;
    ok(task)
}
