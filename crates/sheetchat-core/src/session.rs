//! Session API payloads.
//!
//! The backend owns session persistence; the client only holds a local
//! mirror built from these DTOs.

use crate::datasource::FileMetadata;
use crate::transcript::Role;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body for creating a new session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateSessionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_metadata: Option<Vec<FileMetadata>>,
}

/// One session as returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub title: Option<String>,
    #[serde(default)]
    pub file_ids: Option<Vec<String>>,
    pub created_at: String,
    pub updated_at: String,
}

/// One persisted message inside a session detail response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMessage {
    pub id: i64,
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub chart_config: Option<Value>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Full session detail, including ordered message history.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SessionDetail {
    pub id: String,
    pub title: Option<String>,
    #[serde(default)]
    pub file_ids: Option<Vec<String>>,
    #[serde(default)]
    pub file_metadata: Vec<FileMetadata>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub messages: Vec<SessionMessage>,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub has_more: bool,
}

/// Request body for starting one streaming turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnRequest {
    pub session_id: String,
    pub message: String,
    /// Data source tokens (`fileId` or `fileId:sheetName`).
    pub file_ids: Vec<String>,
}
