//! Project API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{created, ok, ApiResult, ListParams};
use crate::errors::AppError;
use crate::models::{
    AddAttachmentRequest, Attachment, CreateProjectRequest, Project, ProjectMemberRequest,
    RemoveAttachmentRequest, UpdateProjectRequest,
};
use crate::AppState;

/// GET /api/projects - List projects.
pub async fn list_projects(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<Project>> {
    let projects = state.repo.list_projects(params.limit, params.offset).await?;
    ok(projects)
}

/// GET /api/projects/:id - Get a single project.
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Project> {
    match state.repo.get_project(&id).await? {
        Some(project) => ok(project),
        None => Err(AppError::NotFound(format!("Project {} not found", id))),
    }
}

/// POST /api/projects - Create a new project.
pub async fn create_project(
    State(state): State<AppState>,
    Json(request): Json<CreateProjectRequest>,
) -> ApiResult<Project> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("Project name is required".to_string()));
    }

    let project = state.repo.create_project(&request).await?;

    if let Err(e) = state.search.index_project(&project).await {
        tracing::warn!("Failed to index project: {}", e);
    }

    created(project)
}

/// PUT /api/projects/:id - Update a project.
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateProjectRequest>,
) -> ApiResult<Project> {
    let project = state.repo.update_project(&id, &request).await?;

    if let Err(e) = state.search.index_project(&project).await {
        tracing::warn!("Failed to re-index project: {}", e);
    }

    ok(project)
}

/// DELETE /api/projects/:id - Delete a project.
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.repo.delete_project(&id).await?;

    if let Err(e) = state.search.remove(&id).await {
        tracing::warn!("Failed to remove project from index: {}", e);
    }

    ok(())
}

/// POST /api/projects/:id/members - Add a user to the project team.
pub async fn add_project_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ProjectMemberRequest>,
) -> ApiResult<Project> {
    if request.user_id.trim().is_empty() {
        return Err(AppError::Validation("User id is required".to_string()));
    }

    let project = state.repo.add_project_member(&id, &request.user_id).await?;
    ok(project)
}

/// DELETE /api/projects/:id/members - Remove a user from the project team.
pub async fn remove_project_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ProjectMemberRequest>,
) -> ApiResult<Project> {
    let project = state
        .repo
        .remove_project_member(&id, &request.user_id)
        .await?;
    ok(project)
}

/// POST /api/projects/:id/attachments - Record a file attachment.
pub async fn add_project_attachment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AddAttachmentRequest>,
) -> ApiResult<Project> {
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
    let project = state.repo.add_project_attachment(&id, attachment).await?;
    ok(project)
}

/// DELETE /api/projects/:id/attachments - Remove a file attachment.
pub async fn remove_project_attachment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<RemoveAttachmentRequest>,
) -> ApiResult<Project> {
    let project = state
        .repo
        .remove_project_attachment(&id, &request.file_url)
        .await?;
    ok(project)
}
