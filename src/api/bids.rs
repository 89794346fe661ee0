//! Bid API endpoints.
//!
//! Listing applies a server-side visibility filter: callers without a
//! bid-viewing permission only ever receive their own bids, regardless of
//! what the client asks for. Status changes are gated on review tokens and
//! cascade to the linked opportunity in one transaction.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{created, ok, ApiResult};
use crate::auth::{has_any, Caller, BID_REVIEW, BID_VIEW_ALL};
use crate::errors::AppError;
use crate::models::{Bid, BidView, CreateBidRequest, UpdateBidStatusRequest};
use crate::AppState;

/// Query parameters for listing bids.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBidsParams {
    pub project_id: String,
}

/// GET /api/bids?projectId= - List bids for a project.
///
/// Privileged callers see every bid; everyone else sees only their own.
pub async fn list_bids(
    State(state): State<AppState>,
    caller: Caller,
    Query(params): Query<ListBidsParams>,
) -> ApiResult<Vec<BidView>> {
    let bids = if has_any(&caller.user.permissions, BID_VIEW_ALL) {
        state.repo.list_bids_for_project(&params.project_id).await?
    } else {
        state
            .repo
            .list_bids_for_contractor(&params.project_id, &caller.user.clerk_id)
            .await?
    };

    let mut views = Vec::with_capacity(bids.len());
    for bid in bids {
        let contractor_name = state
            .repo
            .get_user_by_clerk_id(&bid.contractor_id)
            .await?
            .map(|u| u.display_name);
        views.push(BidView {
            bid,
            contractor_name,
        });
    }

    ok(views)
}

/// GET /api/bids/:id - Get a single bid.
pub async fn get_bid(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Bid> {
    match state.repo.get_bid(&id).await? {
        Some(bid) => ok(bid),
        None => Err(AppError::NotFound(format!("Bid {} not found", id))),
    }
}

/// POST /api/bids - Submit a bid.
pub async fn create_bid(
    State(state): State<AppState>,
    Json(request): Json<CreateBidRequest>,
) -> ApiResult<Bid> {
    if request.project_id.trim().is_empty() {
        return Err(AppError::Validation("Project id is required".to_string()));
    }
    if request.contractor_id.trim().is_empty() {
        return Err(AppError::Validation(
            "Contractor id is required".to_string(),
        ));
    }
    if !request.price.is_finite() || request.price < 0.0 {
        return Err(AppError::Validation(
            "Price must be a non-negative number".to_string(),
        ));
    }

    let bid = state.repo.create_bid(&request).await?;
    created(bid)
}

/// PATCH /api/bids/:id/status - Approve, reject or revert a bid.
///
/// Requires a review token. The opportunity cascade happens in the same
/// transaction as the bid write.
pub async fn update_bid_status(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Json(request): Json<UpdateBidStatusRequest>,
) -> ApiResult<Bid> {
    caller.require_any(BID_REVIEW)?;

    let bid = state
        .repo
        .set_bid_status(&id, request.status, request.opportunity_id.as_deref())
        .await?;
    ok(bid)
}

/// DELETE /api/bids/:id - Withdraw a bid.
pub async fn delete_bid(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.repo.delete_bid(&id).await?;
    ok(())
}
