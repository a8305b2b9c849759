//! Data source token codec.
//!
//! A data source token selects one unit of tabular data for analysis:
//! either a whole file (`fileId`) or one sheet of a multi-sheet file
//! (`fileId:sheetName`). The backend string-matches this exact format, so
//! the encoding is fixed by the wire contract.

use serde::{Deserialize, Serialize};

/// Separator between the file id and the sheet name in a token.
pub const SHEET_SEPARATOR: char = ':';

/// Metadata for one uploaded file held by a session, including which
/// sheets (if any) are currently selected as analysis inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Backend-assigned file identifier (UUID format).
    pub file_id: String,
    /// Original filename as uploaded.
    pub filename: String,
    /// Full sheet-name list for spreadsheet files; `None` for CSV.
    #[serde(default)]
    pub sheet_names: Option<Vec<String>>,
    /// Currently selected sheet subset, in selection order.
    #[serde(default)]
    pub selected_sheets: Vec<String>,
}

impl FileMetadata {
    /// Creates metadata for a file with no sheet structure (e.g. CSV).
    pub fn plain_file(file_id: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            filename: filename.into(),
            sheet_names: None,
            selected_sheets: Vec::new(),
        }
    }
}

/// Encodes a (file, optional sheet) pair into a single token.
pub fn encode_token(file_id: &str, sheet_name: Option<&str>) -> String {
    match sheet_name {
        Some(sheet) => format!("{file_id}{SHEET_SEPARATOR}{sheet}"),
        None => file_id.to_string(),
    }
}

/// Splits a token into `(file_id, sheet_name)`, bounded to the first `:`.
///
/// Sheet names are not guaranteed to be free of `:`, so everything after
/// the first separator belongs to the sheet name. A sheet literally named
/// `"a:b"` is indistinguishable from sheet `"b"` of file `"a"` once
/// encoded; this ambiguity is part of the observed wire format.
pub fn split_token(token: &str) -> (&str, Option<&str>) {
    match token.split_once(SHEET_SEPARATOR) {
        Some((file_id, sheet)) => (file_id, Some(sheet)),
        None => (token, None),
    }
}

/// Builds the full token set for a list of files.
///
/// A file with one or more selected sheets contributes one token per sheet
/// in selection order; a file with no selection contributes exactly one
/// bare-file token. Per-file token lists are concatenated in file order.
pub fn build_token_set(files: &[FileMetadata]) -> Vec<String> {
    let mut tokens = Vec::new();
    for file in files {
        if file.selected_sheets.is_empty() {
            tokens.push(encode_token(&file.file_id, None));
        } else {
            for sheet in &file.selected_sheets {
                tokens.push(encode_token(&file.file_id, Some(sheet)));
            }
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_with_sheets(file_id: &str, selected: &[&str]) -> FileMetadata {
        FileMetadata {
            file_id: file_id.to_string(),
            filename: format!("{file_id}.xlsx"),
            sheet_names: Some(vec!["A".into(), "B".into(), "C".into()]),
            selected_sheets: selected.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_encode_bare_file() {
        assert_eq!(encode_token("f1", None), "f1");
    }

    #[test]
    fn test_encode_with_sheet() {
        assert_eq!(encode_token("f1", Some("Sheet1")), "f1:Sheet1");
    }

    #[test]
    fn test_split_is_bounded_to_first_separator() {
        assert_eq!(split_token("f1:a:b"), ("f1", Some("a:b")));
        assert_eq!(split_token("f1"), ("f1", None));
    }

    #[test]
    fn test_token_set_for_unselected_file() {
        let files = vec![FileMetadata::plain_file("f1", "data.csv")];
        assert_eq!(build_token_set(&files), vec!["f1"]);
    }

    #[test]
    fn test_token_set_preserves_selection_order() {
        let files = vec![file_with_sheets("f1", &["A", "B"])];
        assert_eq!(build_token_set(&files), vec!["f1:A", "f1:B"]);
    }

    #[test]
    fn test_token_set_concatenates_in_file_order() {
        let files = vec![
            FileMetadata::plain_file("f1", "one.csv"),
            file_with_sheets("f2", &["A"]),
            file_with_sheets("f3", &["B", "C"]),
        ];
        assert_eq!(
            build_token_set(&files),
            vec!["f1", "f2:A", "f3:B", "f3:C"]
        );
    }
}
