//! Opportunity (bid solicitation) API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{created, ok, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateOpportunityRequest, Opportunity, UpdateOpportunityRequest};
use crate::AppState;

/// Query parameters for listing opportunities.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOpportunitiesParams {
    #[serde(default)]
    pub project_id: Option<String>,
}

/// GET /api/opportunities - List opportunities, optionally filtered by project.
pub async fn list_opportunities(
    State(state): State<AppState>,
    Query(params): Query<ListOpportunitiesParams>,
) -> ApiResult<Vec<Opportunity>> {
    let opportunities = state
        .repo
        .list_opportunities(params.project_id.as_deref())
        .await?;
    ok(opportunities)
}

/// GET /api/opportunities/:id - Get a single opportunity.
pub async fn get_opportunity(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Opportunity> {
    match state.repo.get_opportunity(&id).await? {
        Some(opportunity) => ok(opportunity),
        None => Err(AppError::NotFound(format!("Opportunity {} not found", id))),
    }
}

/// POST /api/opportunities - Publish a new opportunity.
pub async fn create_opportunity(
    State(state): State<AppState>,
    Json(request): Json<CreateOpportunityRequest>,
) -> ApiResult<Opportunity> {
    if request.title.trim().is_empty() {
        return Err(AppError::Validation(
            "Opportunity title is required".to_string(),
        ));
    }
    if request.project_id.trim().is_empty() {
        return Err(AppError::Validation("Project id is required".to_string()));
    }

    let opportunity = state.repo.create_opportunity(&request).await?;
    created(opportunity)
}

/// PUT /api/opportunities/:id - Update an opportunity.
pub async fn update_opportunity(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateOpportunityRequest>,
) -> ApiResult<Opportunity> {
    let opportunity = state.repo.update_opportunity(&id, &request).await?;
    ok(opportunity)
}

/// DELETE /api/opportunities/:id - Delete an opportunity.
pub async fn delete_opportunity(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.repo.delete_opportunity(&id).await?;
    ok(())
}
