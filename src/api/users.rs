//! User API endpoints.
//!
//! Users are provisioned through the auth webhook, so there is no create
//! endpoint here; the API surface is read, update and delete.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{ok, ApiResult};
use crate::errors::AppError;
use crate::models::{UpdateUserRequest, User};
use crate::AppState;

/// GET /api/users - List users.
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    let users = state.repo.list_users().await?;
    ok(users)
}

/// GET /api/users/:id - Get a user by internal id.
pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<User> {
    match state.repo.get_user(&id).await? {
        Some(user) => ok(user),
        None => Err(AppError::NotFound(format!("User {} not found", id))),
    }
}

/// GET /api/users/clerk/:clerkId - Look a user up by external-auth id.
pub async fn get_user_by_clerk_id(
    State(state): State<AppState>,
    Path(clerk_id): Path<String>,
) -> ApiResult<User> {
    match state.repo.get_user_by_clerk_id(&clerk_id).await? {
        Some(user) => ok(user),
        None => Err(AppError::NotFound(format!(
            "User with clerk id {} not found",
            clerk_id
        ))),
    }
}

/// PUT /api/users/:id - Update a user profile.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<User> {
    let user = state.repo.update_user(&id, &request).await?;

    if let Err(e) = state.search.index_user(&user).await {
        tracing::warn!("Failed to re-index user: {}", e);
    }

    ok(user)
}

/// DELETE /api/users/:id - Delete a user.
pub async fn delete_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.repo.delete_user(&id).await?;

    if let Err(e) = state.search.remove(&id).await {
        tracing::warn!("Failed to remove user from index: {}", e);
    }

    ok(())
}
