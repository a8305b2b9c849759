//! Stream frame decoder.
//!
//! Converts the raw byte chunks of a streaming turn response into ordered
//! [`StreamEvent`]s, tolerating chunk boundaries that split a logical
//! frame. A frame is one line of the form `data: <json>`; anything else
//! (blank keep-alive lines, malformed payloads) is expected protocol noise
//! and dropped without surfacing.
//!
//! The decoder buffers at most one incomplete line: bytes are accumulated
//! until a newline, complete lines are decoded in order, and the trailing
//! piece is retained. Splitting on the byte level keeps multi-byte UTF-8
//! sequences intact even when a chunk boundary lands inside one. Bytes
//! left in the buffer at end-of-stream are discarded; there is no
//! partial-frame flush.

use serde::Deserialize;
use serde_json::Value;
use sheetchat_core::stream::StreamEvent;

/// Line prefix that marks a frame.
pub const FRAME_PREFIX: &str = "data: ";

const DEFAULT_ERROR_MESSAGE: &str = "unknown error";

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Frame {
    Chunk {
        #[serde(default)]
        content: String,
    },
    Done {
        #[serde(default)]
        chart_config: Option<Value>,
    },
    Error {
        #[serde(default)]
        message: Option<String>,
    },
}

/// Incremental decoder over a chunked byte source.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one byte chunk, returning every event completed by it, in
    /// wire order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(newline_index) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let mut line = self.buffer.drain(..=newline_index).collect::<Vec<_>>();
            if matches!(line.last(), Some(b'\n')) {
                line.pop();
            }
            if matches!(line.last(), Some(b'\r')) {
                line.pop();
            }

            if let Some(event) = decode_line(&line) {
                events.push(event);
            }
        }
        events
    }

    /// Number of buffered bytes belonging to an incomplete line.
    pub fn pending_bytes(&self) -> usize {
        self.buffer.len()
    }
}

fn decode_line(line: &[u8]) -> Option<StreamEvent> {
    let text = std::str::from_utf8(line).ok()?;
    let payload = text.strip_prefix(FRAME_PREFIX)?;

    let frame = match serde_json::from_str::<Frame>(payload) {
        Ok(frame) => frame,
        Err(error) => {
            tracing::debug!(%error, "dropping unparseable stream frame");
            return None;
        }
    };

    match frame {
        Frame::Chunk { content } if content.is_empty() => None,
        Frame::Chunk { content } => Some(StreamEvent::Chunk(content)),
        Frame::Done { chart_config } => Some(StreamEvent::Done(chart_config)),
        Frame::Error { message } => Some(StreamEvent::Error(
            message.unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string()),
        )),
    }
}
