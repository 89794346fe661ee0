//! Team API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{created, ok, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateTeamRequest, Team, UpdateTeamRequest};
use crate::AppState;

/// GET /api/teams - List teams.
pub async fn list_teams(State(state): State<AppState>) -> ApiResult<Vec<Team>> {
    let teams = state.repo.list_teams().await?;
    ok(teams)
}

/// GET /api/teams/:id - Get a single team.
pub async fn get_team(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Team> {
    match state.repo.get_team(&id).await? {
        Some(team) => ok(team),
        None => Err(AppError::NotFound(format!("Team {} not found", id))),
    }
}

/// POST /api/teams - Create a team.
pub async fn create_team(
    State(state): State<AppState>,
    Json(request): Json<CreateTeamRequest>,
) -> ApiResult<Team> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("Team name is required".to_string()));
    }

    let team = state.repo.create_team(&request).await?;
    created(team)
}

/// PUT /api/teams/:id - Update a team.
pub async fn update_team(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateTeamRequest>,
) -> ApiResult<Team> {
    let team = state.repo.update_team(&id, &request).await?;
    ok(team)
}

/// DELETE /api/teams/:id - Delete a team.
pub async fn delete_team(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.repo.delete_team(&id).await?;
    ok(())
}
