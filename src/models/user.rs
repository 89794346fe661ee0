//! User model. Users originate from the external auth provider's
//! `user.created` webhook and carry the permission tokens that gate
//! privileged API operations.

use serde::{Deserialize, Serialize};

/// An application user linked to an external-auth identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    /// Identifier assigned by the external auth provider.
    pub clerk_id: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    /// Opaque permission tokens, e.g. `admin`, `project_manager`.
    #[serde(default)]
    pub permissions: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Payload for provisioning a user, built from the auth provider's
/// `user.created` webhook event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub clerk_id: String,
    pub display_name: String,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Request body for updating a user profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}
