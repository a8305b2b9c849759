//! Local session state.
//!
//! Holds the client-side mirror of one session: its file metadata and the
//! data source token set derived from it. Sheet-selection changes always
//! recompute the full token set from scratch (never an incremental patch)
//! and then fire a best-effort persistence call to the backend; a
//! persistence failure is logged and never rolls back the local update.

use crate::api::ApiClient;
use sheetchat_core::datasource::{FileMetadata, build_token_set};
use sheetchat_core::session::SessionDetail;
use std::sync::Arc;

/// Client-side mirror of one session's identity and data sources.
#[derive(Debug, Clone)]
pub struct SessionState {
    api: Arc<ApiClient>,
    id: String,
    title: Option<String>,
    files: Vec<FileMetadata>,
    tokens: Vec<String>,
}

impl SessionState {
    /// Builds local state from a session detail response.
    pub fn from_detail(api: Arc<ApiClient>, detail: &SessionDetail) -> Self {
        let mut state = Self {
            api,
            id: detail.id.clone(),
            title: detail.title.clone(),
            files: detail.file_metadata.clone(),
            tokens: Vec::new(),
        };
        if state.files.is_empty() {
            // Old sessions may predate file metadata; fall back to the
            // stored token list.
            state.tokens = detail.file_ids.clone().unwrap_or_default();
        } else {
            state.tokens = build_token_set(&state.files);
        }
        state
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// File metadata in upload order.
    pub fn files(&self) -> &[FileMetadata] {
        &self.files
    }

    /// Current data source token set, one token per selectable unit.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Adds a newly uploaded file and persists the metadata change.
    pub fn add_file(&mut self, metadata: FileMetadata) {
        self.files.push(metadata);
        self.apply_selection_change();
    }

    /// Removes a file and persists the metadata change. Unknown ids are a
    /// no-op.
    pub fn remove_file(&mut self, file_id: &str) {
        let before = self.files.len();
        self.files.retain(|f| f.file_id != file_id);
        if self.files.len() != before {
            self.apply_selection_change();
        }
    }

    /// Replaces one file's selected sheet subset and persists the change.
    /// Returns false when the file is unknown to this session.
    pub fn set_selected_sheets(&mut self, file_id: &str, sheets: Vec<String>) -> bool {
        let Some(file) = self.files.iter_mut().find(|f| f.file_id == file_id) else {
            return false;
        };
        file.selected_sheets = sheets;
        self.apply_selection_change();
        true
    }

    /// Recomputes the token set from scratch and fires the best-effort
    /// persistence call.
    fn apply_selection_change(&mut self) {
        self.tokens = build_token_set(&self.files);

        let api = self.api.clone();
        let session_id = self.id.clone();
        let files = self.files.clone();
        tokio::spawn(async move {
            if let Err(error) = api.update_file_metadata(&session_id, &files).await {
                tracing::warn!(%session_id, %error, "failed to persist file metadata");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use sheetchat_core::identity::ClientIdentity;

    fn test_api() -> Arc<ApiClient> {
        let config = ClientConfig {
            base_url: "http://127.0.0.1:1".into(),
            ..ClientConfig::default()
        };
        Arc::new(ApiClient::new(&config, &ClientIdentity::generate()).unwrap())
    }

    fn detail_with_metadata() -> SessionDetail {
        serde_json::from_value(serde_json::json!({
            "id": "s1",
            "title": "t",
            "file_ids": ["f1"],
            "file_metadata": [
                {"file_id": "f1", "filename": "a.csv",
                 "sheet_names": null, "selected_sheets": []},
                {"file_id": "f2", "filename": "b.xlsx",
                 "sheet_names": ["A", "B"], "selected_sheets": ["A"]}
            ],
            "created_at": "t",
            "updated_at": "t",
            "messages": []
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_tokens_derived_from_metadata() {
        let state = SessionState::from_detail(test_api(), &detail_with_metadata());
        assert_eq!(state.tokens(), ["f1", "f2:A"]);
    }

    #[tokio::test]
    async fn test_selection_change_recomputes_full_set() {
        let mut state = SessionState::from_detail(test_api(), &detail_with_metadata());
        assert!(state.set_selected_sheets("f2", vec!["A".into(), "B".into()]));
        assert_eq!(state.tokens(), ["f1", "f2:A", "f2:B"]);

        // Persistence is fire-and-forget against an unreachable backend;
        // the local update above must survive regardless.
        assert!(!state.set_selected_sheets("missing", vec!["A".into()]));
        assert_eq!(state.tokens(), ["f1", "f2:A", "f2:B"]);
    }

    #[tokio::test]
    async fn test_remove_file_drops_its_tokens() {
        let mut state = SessionState::from_detail(test_api(), &detail_with_metadata());
        state.remove_file("f2");
        assert_eq!(state.tokens(), ["f1"]);
        state.remove_file("f2");
        assert_eq!(state.tokens(), ["f1"]);
    }

    #[tokio::test]
    async fn test_fallback_to_stored_token_list() {
        let detail: SessionDetail = serde_json::from_value(serde_json::json!({
            "id": "s2", "title": null,
            "file_ids": ["f9:Sheet3"],
            "created_at": "t", "updated_at": "t"
        }))
        .unwrap();
        let state = SessionState::from_detail(test_api(), &detail);
        assert_eq!(state.tokens(), ["f9:Sheet3"]);
    }
}
