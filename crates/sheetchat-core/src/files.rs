//! File upload and sheet-selection API payloads.

use serde::Deserialize;
use serde_json::Value;

/// Response from the multipart upload endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadResponse {
    pub file_id: String,
    pub filename: String,
    pub columns: Vec<String>,
    pub rows: u64,
    /// First few data rows, shape defined by the uploaded table.
    #[serde(default)]
    pub preview: Vec<Value>,
    /// All sheet names for spreadsheet files; empty for CSV.
    #[serde(default)]
    pub sheet_names: Vec<String>,
    /// Sheet the backend parsed, when the file has sheets.
    #[serde(default)]
    pub selected_sheet: Option<String>,
}

/// Preview of one file (or one sheet of it), as returned by the file-info
/// and switch-sheet endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SheetPreview {
    pub file_id: String,
    pub filename: Option<String>,
    pub columns: Vec<String>,
    pub rows: u64,
    #[serde(default)]
    pub preview: Vec<Value>,
    #[serde(default)]
    pub sheet_names: Vec<String>,
    #[serde(default)]
    pub selected_sheet: Option<String>,
}

/// One selected sheet within a multi-sheet selection response. Each carries
/// its own data source id (`fileId:sheetName`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SelectedSheet {
    pub data_source_id: String,
    pub file_id: String,
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: u64,
    #[serde(default)]
    pub preview: Vec<Value>,
}

/// Response from the select-sheets endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SelectSheetsResponse {
    pub file_id: String,
    pub filename: String,
    pub sheet_names: Vec<String>,
    pub selected_sheets: Vec<SelectedSheet>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_upload_response_for_csv() {
        let raw = json!({
            "file_id": "f1",
            "filename": "data.csv",
            "columns": ["month", "total"],
            "rows": 12,
            "preview": [{"month": "Jan", "total": 10}],
            "sheet_names": [],
            "selected_sheet": null
        });
        let response: UploadResponse = serde_json::from_value(raw).unwrap();
        assert!(response.sheet_names.is_empty());
        assert!(response.selected_sheet.is_none());
    }

    #[test]
    fn test_select_sheets_response_carries_data_source_ids() {
        let raw = json!({
            "file_id": "f2",
            "filename": "book.xlsx",
            "sheet_names": ["A", "B"],
            "selected_sheets": [{
                "data_source_id": "f2:A",
                "file_id": "f2",
                "sheet_name": "A",
                "columns": ["x"],
                "rows": 3,
                "preview": []
            }]
        });
        let response: SelectSheetsResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(response.selected_sheets[0].data_source_id, "f2:A");
    }
}
