//! Streaming turn events.

use serde_json::Value;

/// One decoded event from the backend's streaming turn response.
///
/// Events are produced in wire order by the frame decoder and consumed
/// exactly once by the turn orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Incremental assistant text.
    Chunk(String),
    /// Terminal event: generation finished, optionally with a chart config.
    Done(Option<Value>),
    /// Terminal event: the backend reported a failure.
    Error(String),
}

impl StreamEvent {
    /// Returns true for `Done` and `Error`, the events that settle a turn.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_) | Self::Error(_))
    }
}
