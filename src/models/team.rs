//! Team model.

use serde::{Deserialize, Serialize};

/// A delivery team with its owner and manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_owner_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_manager_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for creating a team.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamRequest {
    pub name: String,
    #[serde(default)]
    pub product_owner_id: Option<String>,
    #[serde(default)]
    pub project_manager_id: Option<String>,
}

/// Request body for updating a team.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeamRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub product_owner_id: Option<String>,
    #[serde(default)]
    pub project_manager_id: Option<String>,
}
