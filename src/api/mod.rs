//! REST API module.
//!
//! Contains all API routes and handlers following the frontend contract.

mod bids;
mod comments;
mod contractors;
mod employees;
mod leaves;
mod opportunities;
mod projects;
mod search;
mod suppliers;
mod tasks;
mod teams;
mod users;
mod webhook;

pub use bids::*;
pub use comments::*;
pub use contractors::*;
pub use employees::*;
pub use leaves::*;
pub use opportunities::*;
pub use projects::*;
pub use search::*;
pub use suppliers::*;
pub use tasks::*;
pub use teams::*;
pub use users::*;
pub use webhook::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Success response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip)]
    status: StatusCode,
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        Self {
            status,
            success: true,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, crate::errors::AppError>;

/// Create a 200 OK API response.
pub fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(StatusCode::OK, data))
}

/// Create a 201 Created API response.
pub fn created<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(StatusCode::CREATED, data))
}

/// Common pagination query parameters for list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}
