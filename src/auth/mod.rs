//! Authentication and authorization module.
//!
//! Two layers: a PSK gate over the whole API surface (constant-time
//! comparison to mitigate timing attacks), and per-handler permission
//! checks resolved from the caller's user record. Permission checks run
//! server-side for every gated operation; the UI's own gating is advisory.

use axum::{
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use subtle::ConstantTimeEq;

use crate::errors::{codes, AppError, ErrorDetails, ErrorResponse};
use crate::models::User;
use crate::AppState;

/// Header name for the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Header carrying the caller's external-auth identifier.
pub const CALLER_HEADER: &str = "x-caller-id";

/// Well-known permission tokens.
pub mod tokens {
    pub const ADMIN: &str = "admin";
    pub const PROJECT_MANAGER: &str = "project_manager";
    pub const PROCUREMENT_TEAM: &str = "procurement_team";
    pub const HR_TEAM: &str = "hr_team";
    pub const CAN_SEE_ALL_SUBMITTED_BID: &str = "can_see_all_submitted_bid";
}

/// Tokens allowed to see every submitted bid on a project.
pub const BID_VIEW_ALL: &[&str] = &[
    tokens::ADMIN,
    tokens::PROJECT_MANAGER,
    tokens::PROCUREMENT_TEAM,
    tokens::CAN_SEE_ALL_SUBMITTED_BID,
];

/// Tokens allowed to approve, reject or revert a bid.
pub const BID_REVIEW: &[&str] = &[
    tokens::ADMIN,
    tokens::PROJECT_MANAGER,
    tokens::PROCUREMENT_TEAM,
];

/// Tokens allowed to review leave requests.
pub const LEAVE_REVIEW: &[&str] = &[tokens::ADMIN, tokens::HR_TEAM];

/// Single source of truth for the capability check.
pub fn has_any(granted: &[String], required_any: &[&str]) -> bool {
    granted
        .iter()
        .any(|g| required_any.iter().any(|r| g == r))
}

/// The authenticated caller of a gated endpoint, resolved from the
/// `x-caller-id` header against the users table.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user: User,
}

impl Caller {
    /// Reject with 403 unless the caller holds one of the required tokens.
    pub fn require_any(&self, required: &[&str]) -> Result<(), AppError> {
        if has_any(&self.user.permissions, required) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Insufficient permissions for this operation".to_string(),
            ))
        }
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let clerk_id = parts
            .headers
            .get(CALLER_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Unauthorized(format!("Missing {} header", CALLER_HEADER))
            })?;

        let user = state
            .repo
            .get_user_by_clerk_id(clerk_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Unknown caller".to_string()))?;

        Ok(Caller { user })
    }
}

/// PSK authentication layer function that takes the expected PSK as a parameter.
pub async fn psk_auth_layer(
    expected_psk: Option<String>,
    request: Request,
    next: Next,
) -> Response {
    // If no PSK is configured, allow all requests (dev mode)
    let Some(expected) = expected_psk else {
        return next.run(request).await;
    };

    // Get the API key from the request header
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    match provided {
        Some(provided_key) => {
            if constant_time_compare(&provided_key, &expected) {
                next.run(request).await
            } else {
                unauthorized_response("Invalid API key")
            }
        }
        None => {
            // Also check Authorization header as bearer token
            let bearer = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
                .map(|s| s.to_string());

            match bearer {
                Some(bearer_key) if constant_time_compare(&bearer_key, &expected) => {
                    next.run(request).await
                }
                _ => unauthorized_response("Missing or invalid API key"),
            }
        }
    }
}

/// Perform constant-time string comparison.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Create an unauthorized response.
fn unauthorized_response(message: &str) -> Response {
    let body = ErrorResponse {
        success: false,
        error: ErrorDetails {
            code: codes::UNAUTHORIZED.to_string(),
            message: message.to_string(),
        },
    };

    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn granted(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_constant_time_compare_equal() {
        assert!(constant_time_compare("test-key-123", "test-key-123"));
    }

    #[test]
    fn test_constant_time_compare_not_equal() {
        assert!(!constant_time_compare("test-key-123", "test-key-124"));
    }

    #[test]
    fn test_constant_time_compare_different_lengths() {
        assert!(!constant_time_compare("short", "much-longer-key"));
    }

    #[test]
    fn test_has_any_match() {
        assert!(has_any(&granted(&["admin"]), BID_VIEW_ALL));
        assert!(has_any(
            &granted(&["contractor", "can_see_all_submitted_bid"]),
            BID_VIEW_ALL
        ));
    }

    #[test]
    fn test_has_any_no_match() {
        assert!(!has_any(&granted(&["contractor"]), BID_VIEW_ALL));
        assert!(!has_any(&[], BID_REVIEW));
        // Tokens are opaque strings, not prefixes
        assert!(!has_any(&granted(&["admin2"]), BID_REVIEW));
    }
}
