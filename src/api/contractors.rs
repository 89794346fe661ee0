//! Contractor API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{created, ok, ApiResult, ListParams};
use crate::errors::AppError;
use crate::models::{
    AddComplianceDocumentRequest, Contractor, CreateContractorRequest,
    RemoveComplianceDocumentRequest, UpdateContractorRequest,
};
use crate::AppState;

/// GET /api/contractors - List contractors.
pub async fn list_contractors(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<Contractor>> {
    let contractors = state
        .repo
        .list_contractors(params.limit, params.offset)
        .await?;
    ok(contractors)
}

/// GET /api/contractors/:id - Get a single contractor.
pub async fn get_contractor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Contractor> {
    match state.repo.get_contractor(&id).await? {
        Some(contractor) => ok(contractor),
        None => Err(AppError::NotFound(format!("Contractor {} not found", id))),
    }
}

/// POST /api/contractors - Register a contractor.
pub async fn create_contractor(
    State(state): State<AppState>,
    Json(request): Json<CreateContractorRequest>,
) -> ApiResult<Contractor> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation(
            "Contractor name is required".to_string(),
        ));
    }

    let contractor = state.repo.create_contractor(&request).await?;
    created(contractor)
}

/// PUT /api/contractors/:id - Update a contractor.
pub async fn update_contractor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateContractorRequest>,
) -> ApiResult<Contractor> {
    let contractor = state.repo.update_contractor(&id, &request).await?;
    ok(contractor)
}

/// DELETE /api/contractors/:id - Delete a contractor.
pub async fn delete_contractor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.repo.delete_contractor(&id).await?;
    ok(())
}

/// POST /api/contractors/:id/compliance-documents - Record a compliance upload.
pub async fn add_contractor_compliance_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AddComplianceDocumentRequest>,
) -> ApiResult<Contractor> {
    if request.name.trim().is_empty() || request.file_url.trim().is_empty() {
        return Err(AppError::Validation(
            "Document name and file url are required".to_string(),
        ));
    }

    let contractor = state
        .repo
        .add_contractor_compliance_document(&id, &request.name, &request.file_url)
        .await?;
    ok(contractor)
}

/// DELETE /api/contractors/:id/compliance-documents - Remove a compliance document.
pub async fn remove_contractor_compliance_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<RemoveComplianceDocumentRequest>,
) -> ApiResult<Contractor> {
    let contractor = state
        .repo
        .remove_contractor_compliance_document(&id, &request.file_url)
        .await?;
    ok(contractor)
}
