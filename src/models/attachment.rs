//! File attachment subdocument shared by projects, tasks and bids.

use serde::{Deserialize, Serialize};

/// Metadata for an uploaded file. The file itself lives on the external
/// asset host; only the URL is tracked here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub file_name: String,
    pub file_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_by: Option<String>,
}

/// Request body for attaching a file to a parent resource.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddAttachmentRequest {
    pub file_name: String,
    pub file_url: String,
    #[serde(default)]
    pub uploaded_by: Option<String>,
}

/// Request body for detaching a file, keyed by its URL.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveAttachmentRequest {
    pub file_url: String,
}
