//! Bid model: a contractor's priced, timed submission against an opportunity.

use serde::{Deserialize, Serialize};

use super::Attachment;

/// Review status of a bid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BidStatus {
    Pending,
    Approved,
    Rejected,
}

impl BidStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BidStatus::Pending => "PENDING",
            BidStatus::Approved => "APPROVED",
            BidStatus::Rejected => "REJECTED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(BidStatus::Pending),
            "APPROVED" => Some(BidStatus::Approved),
            "REJECTED" => Some(BidStatus::Rejected),
            _ => None,
        }
    }
}

/// A contractor's submission for a project opportunity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub id: String,
    pub project_id: String,
    /// External-auth id of the submitting contractor.
    pub contractor_id: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub status: BidStatus,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Opportunity this bid answers, when submitted against one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opportunity_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A bid enriched with the submitting contractor's display name.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BidView {
    #[serde(flatten)]
    pub bid: Bid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contractor_name: Option<String>,
}

/// Request body for submitting a bid.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBidRequest {
    pub project_id: String,
    pub contractor_id: String,
    pub price: f64,
    #[serde(default)]
    pub timeline: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub opportunity_id: Option<String>,
}

/// Request body for the approve/reject/revert action.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBidStatusRequest {
    pub status: BidStatus,
    /// Linked opportunity to cascade the status change to.
    #[serde(default)]
    pub opportunity_id: Option<String>,
}
