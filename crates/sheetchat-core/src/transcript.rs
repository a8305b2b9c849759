//! Session transcript store.
//!
//! The transcript is an ordered, append-only list of conversation entries.
//! The only in-place mutation allowed is on the tail entry while it is
//! pending: streamed content is appended there, and the terminal event
//! attaches the chart config (or a failure message) and clears the pending
//! flag. Once a later entry exists an entry is immutable.
//!
//! Invariant: at most one entry has `is_pending == true` at any time, and
//! it is always the last entry.

use crate::error::{Result, SheetchatError};
use crate::session::SessionMessage;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Prefix applied to the assistant entry of a failed turn.
pub const FAILED_PREFIX: &str = "failed: ";

/// Represents the role of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Entry authored by the user.
    User,
    /// Entry generated by the analysis backend.
    Assistant,
}

/// One turn's worth of displayed content: a user message or an assistant
/// reply, plus an optional chart description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Local entry identifier (UUID for locally created entries, the
    /// backend message id for hydrated history).
    pub id: String,
    /// Who authored this entry.
    pub role: Role,
    /// Message text. Grows incrementally while the entry is pending.
    pub content: String,
    /// Structured chart description attached on turn completion.
    pub chart_config: Option<Value>,
    /// True while an in-progress stream is still filling this entry.
    pub is_pending: bool,
}

/// Ordered, append-only store of conversation entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscriptStore {
    entries: Vec<TranscriptEntry>,
}

impl TranscriptStore {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hydrates a transcript from persisted session messages.
    ///
    /// Hydrated entries are never pending: they are settled history.
    pub fn from_messages(messages: &[SessionMessage]) -> Self {
        let entries = messages
            .iter()
            .map(|m| TranscriptEntry {
                id: m.id.to_string(),
                role: m.role,
                content: m.content.clone(),
                chart_config: m.chart_config.clone(),
                is_pending: false,
            })
            .collect();
        Self { entries }
    }

    /// Returns all entries in insertion order.
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Returns the last entry, if any.
    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    /// Number of entries in the transcript.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the transcript has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true when a pending entry exists.
    pub fn has_pending(&self) -> bool {
        self.pending_entry().is_some()
    }

    /// Returns the pending entry, if any. By invariant it is the last one.
    pub fn pending_entry(&self) -> Option<&TranscriptEntry> {
        self.entries.last().filter(|e| e.is_pending)
    }

    /// Appends a settled user entry.
    ///
    /// # Errors
    ///
    /// Rejected while a pending entry exists, since that would leave the
    /// pending entry in a non-tail position.
    pub fn push_user(&mut self, content: impl Into<String>) -> Result<&TranscriptEntry> {
        if self.has_pending() {
            return Err(SheetchatError::internal(
                "cannot append a user entry while another entry is pending",
            ));
        }
        self.entries.push(TranscriptEntry {
            id: Uuid::new_v4().to_string(),
            role: Role::User,
            content: content.into(),
            chart_config: None,
            is_pending: false,
        });
        self.entries
            .last()
            .ok_or_else(|| SheetchatError::internal("transcript push lost its entry"))
    }

    /// Appends an empty pending assistant entry and returns its id.
    ///
    /// # Errors
    ///
    /// Rejected while another entry is still pending.
    pub fn push_pending_assistant(&mut self) -> Result<String> {
        if self.has_pending() {
            return Err(SheetchatError::internal(
                "a pending assistant entry already exists",
            ));
        }
        let id = Uuid::new_v4().to_string();
        self.entries.push(TranscriptEntry {
            id: id.clone(),
            role: Role::Assistant,
            content: String::new(),
            chart_config: None,
            is_pending: true,
        });
        Ok(id)
    }

    /// Appends streamed text to the pending entry's content.
    ///
    /// This is the only path that grows an entry's content after creation.
    pub fn append_to_pending(&mut self, text: &str) -> Result<()> {
        let entry = self.pending_entry_mut()?;
        entry.content.push_str(text);
        Ok(())
    }

    /// Settles the pending entry, attaching the optional chart config.
    pub fn complete_pending(&mut self, chart_config: Option<Value>) -> Result<()> {
        let entry = self.pending_entry_mut()?;
        entry.chart_config = chart_config;
        entry.is_pending = false;
        Ok(())
    }

    /// Settles the pending entry as failed, replacing its content with a
    /// formatted failure message.
    pub fn fail_pending(&mut self, message: &str) -> Result<()> {
        let entry = self.pending_entry_mut()?;
        entry.content = format!("{FAILED_PREFIX}{message}");
        entry.chart_config = None;
        entry.is_pending = false;
        Ok(())
    }

    fn pending_entry_mut(&mut self) -> Result<&mut TranscriptEntry> {
        self.entries
            .last_mut()
            .filter(|e| e.is_pending)
            .ok_or_else(|| SheetchatError::internal("no pending transcript entry"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_push_user_settles_immediately() {
        let mut store = TranscriptStore::new();
        let entry = store.push_user("plot totals").unwrap();
        assert_eq!(entry.role, Role::User);
        assert!(!entry.is_pending);
    }

    #[test]
    fn test_pending_entry_is_last() {
        let mut store = TranscriptStore::new();
        store.push_user("hi").unwrap();
        let id = store.push_pending_assistant().unwrap();
        let pending = store.pending_entry().unwrap();
        assert_eq!(pending.id, id);
        assert_eq!(store.last().unwrap().id, id);
    }

    #[test]
    fn test_single_pending_invariant() {
        let mut store = TranscriptStore::new();
        store.push_pending_assistant().unwrap();
        assert!(store.push_pending_assistant().is_err());
        assert!(store.push_user("nope").is_err());
    }

    #[test]
    fn test_append_then_complete() {
        let mut store = TranscriptStore::new();
        store.push_user("plot totals").unwrap();
        store.push_pending_assistant().unwrap();
        store.append_to_pending("Here").unwrap();
        store.append_to_pending(" it is").unwrap();
        store
            .complete_pending(Some(json!({"title": {"text": "Totals"}})))
            .unwrap();

        let last = store.last().unwrap();
        assert_eq!(last.content, "Here it is");
        assert_eq!(last.chart_config.as_ref().unwrap()["title"]["text"], "Totals");
        assert!(!last.is_pending);
        assert!(!store.has_pending());
    }

    #[test]
    fn test_fail_replaces_content() {
        let mut store = TranscriptStore::new();
        store.push_pending_assistant().unwrap();
        store.append_to_pending("partial out").unwrap();
        store.fail_pending("model unavailable").unwrap();

        let last = store.last().unwrap();
        assert_eq!(last.content, "failed: model unavailable");
        assert!(last.chart_config.is_none());
        assert!(!store.has_pending());
    }

    #[test]
    fn test_mutation_without_pending_is_rejected() {
        let mut store = TranscriptStore::new();
        store.push_user("hi").unwrap();
        assert!(store.append_to_pending("x").is_err());
        assert!(store.complete_pending(None).is_err());
        assert!(store.fail_pending("x").is_err());
        assert_eq!(store.last().unwrap().content, "hi");
    }

    #[test]
    fn test_hydration_from_messages() {
        let messages = vec![
            SessionMessage {
                id: 1,
                role: Role::User,
                content: "show revenue".into(),
                chart_config: None,
                created_at: None,
            },
            SessionMessage {
                id: 2,
                role: Role::Assistant,
                content: "here".into(),
                chart_config: Some(json!({"series": []})),
                created_at: None,
            },
        ];
        let store = TranscriptStore::from_messages(&messages);
        assert_eq!(store.len(), 2);
        assert!(!store.has_pending());
        assert_eq!(store.entries()[1].id, "2");
        assert!(store.entries()[1].chart_config.is_some());
    }
}
