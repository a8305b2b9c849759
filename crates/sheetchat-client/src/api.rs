//! HTTP client for the analysis backend.
//!
//! Thin typed wrapper over the backend's session, file and chart surfaces.
//! Every request carries the stable client identity in the `X-Client-ID`
//! header; non-success statuses are mapped to [`SheetchatError::Api`] with
//! the backend's `detail` message extracted when present.

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use sheetchat_core::charts::SavedChart;
use sheetchat_core::datasource::FileMetadata;
use sheetchat_core::error::{Result, SheetchatError};
use sheetchat_core::files::{SelectSheetsResponse, SheetPreview, UploadResponse};
use sheetchat_core::identity::{CLIENT_ID_HEADER, ClientIdentity};
use sheetchat_core::session::{
    CreateSessionRequest, Page, SessionDetail, SessionSummary, TurnRequest,
};
use std::time::Duration;

use crate::config::ClientConfig;

/// Client for the backend API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ErrorDetail {
    detail: String,
}

#[derive(Deserialize)]
struct DeletedCount {
    deleted_count: u64,
}

impl ApiClient {
    /// Builds a client from configuration and the per-installation
    /// identity.
    pub fn new(config: &ClientConfig, identity: &ClientIdentity) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(identity.as_str())
            .map_err(|e| SheetchatError::config(format!("invalid client identity: {e}")))?;
        headers.insert(CLIENT_ID_HEADER, value);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| SheetchatError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.normalized_base_url().to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    // ==================== streaming turn ====================

    /// Starts one streaming turn and returns the checked response. The
    /// caller owns consumption of the body byte stream.
    pub async fn start_turn(&self, request: &TurnRequest) -> Result<Response> {
        let response = self
            .client
            .post(self.url("/api/chat/stream"))
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;
        check_status(response).await
    }

    // ==================== session surface ====================

    /// Creates a new session.
    pub async fn create_session(&self, request: &CreateSessionRequest) -> Result<SessionDetail> {
        let response = self
            .client
            .post(self.url("/api/sessions"))
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;
        parse_json(response).await
    }

    /// Fetches session detail, including ordered message history.
    pub async fn get_session(&self, session_id: &str) -> Result<SessionDetail> {
        let response = self
            .client
            .get(self.url(&format!("/api/sessions/{session_id}")))
            .send()
            .await
            .map_err(transport_error)?;
        parse_json(response).await
    }

    /// Lists sessions with pagination and optional title search.
    pub async fn list_sessions(
        &self,
        page: u32,
        limit: u32,
        search: Option<&str>,
    ) -> Result<Page<SessionSummary>> {
        let mut query: Vec<(&str, String)> =
            vec![("page", page.to_string()), ("limit", limit.to_string())];
        if let Some(term) = search {
            query.push(("search", term.to_string()));
        }

        let response = self
            .client
            .get(self.url("/api/sessions"))
            .query(&query)
            .send()
            .await
            .map_err(transport_error)?;
        parse_json(response).await
    }

    /// Deletes one session.
    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/api/sessions/{session_id}")))
            .send()
            .await
            .map_err(transport_error)?;
        check_status(response).await?;
        Ok(())
    }

    /// Deletes every session, returning how many were removed.
    pub async fn delete_all_sessions(&self) -> Result<u64> {
        let response = self
            .client
            .delete(self.url("/api/sessions"))
            .send()
            .await
            .map_err(transport_error)?;
        let body: DeletedCount = parse_json(response).await?;
        Ok(body.deleted_count)
    }

    /// Replaces a session's file metadata (sheet selections included).
    pub async fn update_file_metadata(
        &self,
        session_id: &str,
        file_metadata: &[FileMetadata],
    ) -> Result<()> {
        let response = self
            .client
            .put(self.url(&format!("/api/sessions/{session_id}/file-metadata")))
            .json(&serde_json::json!({ "file_metadata": file_metadata }))
            .send()
            .await
            .map_err(transport_error)?;
        check_status(response).await?;
        Ok(())
    }

    // ==================== file surface ====================

    /// Uploads one tabular file, optionally preselecting a sheet.
    pub async fn upload_file(
        &self,
        filename: &str,
        content: Vec<u8>,
        sheet_name: Option<&str>,
    ) -> Result<UploadResponse> {
        let part = reqwest::multipart::Part::bytes(content).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let mut request = self.client.post(self.url("/api/upload")).multipart(form);
        if let Some(sheet) = sheet_name {
            request = request.query(&[("sheet_name", sheet)]);
        }

        let response = request.send().await.map_err(transport_error)?;
        parse_json(response).await
    }

    /// Fetches file info and a data preview, optionally for one sheet.
    pub async fn get_file_info(
        &self,
        file_id: &str,
        sheet_name: Option<&str>,
    ) -> Result<SheetPreview> {
        let mut request = self.client.get(self.url(&format!("/api/files/{file_id}")));
        if let Some(sheet) = sheet_name {
            request = request.query(&[("sheet_name", sheet)]);
        }
        let response = request.send().await.map_err(transport_error)?;
        parse_json(response).await
    }

    /// Switches a spreadsheet file's active sheet.
    pub async fn switch_sheet(&self, file_id: &str, sheet_name: &str) -> Result<SheetPreview> {
        let response = self
            .client
            .post(self.url(&format!("/api/files/{file_id}/switch-sheet")))
            .query(&[("sheet_name", sheet_name)])
            .send()
            .await
            .map_err(transport_error)?;
        parse_json(response).await
    }

    /// Selects multiple sheets of one file; each selected sheet comes back
    /// with its own data source id.
    pub async fn select_sheets(
        &self,
        file_id: &str,
        sheet_names: &[String],
    ) -> Result<SelectSheetsResponse> {
        let response = self
            .client
            .post(self.url(&format!("/api/files/{file_id}/select-sheets")))
            .json(&serde_json::json!({ "sheet_names": sheet_names }))
            .send()
            .await
            .map_err(transport_error)?;
        parse_json(response).await
    }

    // ==================== chart surface ====================

    /// Lists saved charts with pagination.
    pub async fn list_charts(&self, page: u32, limit: u32) -> Result<Page<SavedChart>> {
        let response = self
            .client
            .get(self.url("/api/charts"))
            .query(&[("page", page.to_string()), ("limit", limit.to_string())])
            .send()
            .await
            .map_err(transport_error)?;
        parse_json(response).await
    }

    /// Deletes one saved chart by its message id.
    pub async fn delete_chart(&self, message_id: i64) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/api/charts/{message_id}")))
            .send()
            .await
            .map_err(transport_error)?;
        check_status(response).await?;
        Ok(())
    }
}

fn transport_error(err: reqwest::Error) -> SheetchatError {
    SheetchatError::transport(err.to_string())
}

/// Maps a non-success status to an Api error, extracting the backend's
/// `detail` field when the body carries one.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "failed to read error body".to_string());
    Err(map_http_error(status, body))
}

fn map_http_error(status: StatusCode, body: String) -> SheetchatError {
    let message = serde_json::from_str::<ErrorDetail>(&body)
        .map(|wrapper| wrapper.detail)
        .unwrap_or(body);
    SheetchatError::api(status.as_u16(), message)
}

async fn parse_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    let response = check_status(response).await?;
    response
        .json()
        .await
        .map_err(|e| SheetchatError::transport(format!("failed to parse response body: {e}")))
}
