//! Saved-chart listing payloads.

use serde::Deserialize;
use serde_json::Value;

/// One saved chart as returned by the chart listing endpoint. The id is
/// the backend message id the chart was generated for.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SavedChart {
    pub id: i64,
    pub session_id: String,
    #[serde(default)]
    pub session_title: Option<String>,
    pub chart_config: Value,
    pub created_at: String,
}
