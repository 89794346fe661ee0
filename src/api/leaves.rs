//! Leave request API endpoints.
//!
//! Reviewing a leave (approve/reject) is gated on the HR review tokens.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{created, ok, ApiResult};
use crate::auth::{Caller, LEAVE_REVIEW};
use crate::errors::AppError;
use crate::models::{CreateLeaveRequest, Leave, UpdateLeaveStatusRequest};
use crate::AppState;

/// Query parameters for listing leave requests.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLeavesParams {
    #[serde(default)]
    pub employee_id: Option<String>,
}

/// GET /api/leaves - List leave requests, optionally for one employee.
pub async fn list_leaves(
    State(state): State<AppState>,
    Query(params): Query<ListLeavesParams>,
) -> ApiResult<Vec<Leave>> {
    let leaves = state
        .repo
        .list_leaves(params.employee_id.as_deref())
        .await?;
    ok(leaves)
}

/// GET /api/leaves/:id - Get a single leave request.
pub async fn get_leave(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Leave> {
    match state.repo.get_leave(&id).await? {
        Some(leave) => ok(leave),
        None => Err(AppError::NotFound(format!("Leave {} not found", id))),
    }
}

/// POST /api/leaves - File a leave request.
pub async fn create_leave(
    State(state): State<AppState>,
    Json(request): Json<CreateLeaveRequest>,
) -> ApiResult<Leave> {
    if request.employee_id.trim().is_empty() {
        return Err(AppError::Validation("Employee id is required".to_string()));
    }
    if request.leave_type.trim().is_empty() {
        return Err(AppError::Validation("Leave type is required".to_string()));
    }
    if request.start_date.trim().is_empty() || request.end_date.trim().is_empty() {
        return Err(AppError::Validation(
            "Start and end dates are required".to_string(),
        ));
    }

    let leave = state.repo.create_leave(&request).await?;
    created(leave)
}

/// PATCH /api/leaves/:id/status - Approve or reject a leave request.
pub async fn update_leave_status(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Json(request): Json<UpdateLeaveStatusRequest>,
) -> ApiResult<Leave> {
    caller.require_any(LEAVE_REVIEW)?;

    let leave = state.repo.set_leave_status(&id, request.status).await?;
    ok(leave)
}

/// DELETE /api/leaves/:id - Withdraw a leave request.
pub async fn delete_leave(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.repo.delete_leave(&id).await?;
    ok(())
}
