//! Opportunity (bid solicitation) model. The frontend calls this an
//! "editor document": a rich-text solicitation with an open/closed lifecycle.

use serde::{Deserialize, Serialize};

/// Whether an opportunity still accepts bids.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpportunityStatus {
    Open,
    Closed,
}

impl OpportunityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpportunityStatus::Open => "OPEN",
            OpportunityStatus::Closed => "CLOSED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "OPEN" => Some(OpportunityStatus::Open),
            "CLOSED" => Some(OpportunityStatus::Closed),
            _ => None,
        }
    }
}

/// A bid solicitation document attached to a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: String,
    pub title: String,
    /// Rich-text body as produced by the document editor.
    pub content: String,
    pub project_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    pub status: OpportunityStatus,
    /// Contractor assigned when a bid is approved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contractor_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for creating an opportunity (document editor save).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOpportunityRequest {
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub project_id: String,
    #[serde(default)]
    pub deadline: Option<String>,
}

/// Request body for updating an opportunity.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOpportunityRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub status: Option<OpportunityStatus>,
}
