//! Task comment model.

use serde::{Deserialize, Serialize};

/// A comment left on a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub task_id: String,
    pub author_id: String,
    pub text: String,
    pub created_at: String,
}

/// Request body for posting a comment on a task.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub author_id: String,
    pub text: String,
}
