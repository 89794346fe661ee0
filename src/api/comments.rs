//! Task comment API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{created, ok, ApiResult};
use crate::errors::AppError;
use crate::models::{Comment, CreateCommentRequest};
use crate::AppState;

/// GET /api/tasks/:id/comments - List comments on a task.
pub async fn list_comments(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> ApiResult<Vec<Comment>> {
    let comments = state.repo.list_comments(&task_id).await?;
    ok(comments)
}

/// POST /api/tasks/:id/comments - Post a comment on a task.
pub async fn create_comment(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(request): Json<CreateCommentRequest>,
) -> ApiResult<Comment> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("Comment text is required".to_string()));
    }
    if request.author_id.trim().is_empty() {
        return Err(AppError::Validation("Author id is required".to_string()));
    }

    let comment = state.repo.create_comment(&task_id, &request).await?;
    created(comment)
}

/// DELETE /api/comments/:id - Delete a comment.
pub async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.repo.delete_comment(&id).await?;
    ok(())
}
