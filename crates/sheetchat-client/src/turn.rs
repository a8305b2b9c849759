//! Turn orchestrator.
//!
//! Drives one request/stream cycle end to end: appends the user entry and
//! a pending assistant entry, issues the streaming request, feeds response
//! bytes through the frame decoder, and applies decoded events to the
//! transcript in order. Exactly one turn may be in flight per session
//! view; a second start is rejected synchronously with no side effects.
//!
//! State machine: `Idle → Sending → Streaming → (settled) → Idle`. Every
//! outcome, including transport failures and cancellation, returns the
//! orchestrator to `Idle` so the input surface can re-enable.

use crate::api::ApiClient;
use crate::decoder::FrameDecoder;
use futures::StreamExt;
use serde_json::Value;
use sheetchat_core::error::{Result, SheetchatError};
use sheetchat_core::session::TurnRequest;
use sheetchat_core::stream::StreamEvent;
use sheetchat_core::transcript::TranscriptStore;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Lifecycle phase of the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// No turn in flight; a new one may start.
    Idle,
    /// Request issued, response not yet received.
    Sending,
    /// Response body is being consumed.
    Streaming,
}

/// How a turn settled.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// The backend finished generation, optionally with a chart config.
    Completed { chart_config: Option<Value> },
    /// Transport or application failure; the message is already reflected
    /// in the transcript's failed assistant entry.
    Failed { message: String },
    /// The view was torn down while the stream was live.
    Cancelled,
}

/// Drives streaming turns against one session's transcript.
pub struct TurnOrchestrator {
    api: Arc<ApiClient>,
    transcript: Arc<RwLock<TranscriptStore>>,
    state: Arc<RwLock<TurnState>>,
    cancel: CancellationToken,
}

impl TurnOrchestrator {
    pub fn new(api: Arc<ApiClient>, transcript: Arc<RwLock<TranscriptStore>>) -> Self {
        Self {
            api,
            transcript,
            state: Arc::new(RwLock::new(TurnState::Idle)),
            cancel: CancellationToken::new(),
        }
    }

    /// Shared transcript this orchestrator mutates.
    pub fn transcript(&self) -> Arc<RwLock<TranscriptStore>> {
        self.transcript.clone()
    }

    /// Current lifecycle phase.
    pub async fn state(&self) -> TurnState {
        *self.state.read().await
    }

    /// True for the whole Sending+Streaming span; the input surface must
    /// stay disabled while this holds.
    pub async fn is_busy(&self) -> bool {
        self.state().await != TurnState::Idle
    }

    /// Cancels the active stream, if any. Used by view teardown; the
    /// orchestrator applies no further transcript mutations beyond
    /// settling the pending entry.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Runs one turn to completion.
    ///
    /// # Errors
    ///
    /// Returns [`SheetchatError::TurnInFlight`] when called while a turn
    /// is active; that rejection has no side effects. All other failures
    /// settle into the transcript and come back as
    /// [`TurnOutcome::Failed`].
    pub async fn send_turn(
        &self,
        session_id: &str,
        message: &str,
        file_ids: Vec<String>,
    ) -> Result<TurnOutcome> {
        {
            let mut state = self.state.write().await;
            if *state != TurnState::Idle {
                return Err(SheetchatError::TurnInFlight);
            }
            *state = TurnState::Sending;
        }

        let request = TurnRequest {
            session_id: session_id.to_string(),
            message: message.to_string(),
            file_ids,
        };

        if let Err(error) = self.begin_entries(message).await {
            *self.state.write().await = TurnState::Idle;
            return Err(error);
        }

        let outcome = self.run_stream(&request).await;
        *self.state.write().await = TurnState::Idle;
        Ok(outcome)
    }

    /// Appends the user entry and the empty pending assistant entry.
    async fn begin_entries(&self, message: &str) -> Result<()> {
        let mut transcript = self.transcript.write().await;
        transcript.push_user(message)?;
        transcript.push_pending_assistant()?;
        Ok(())
    }

    async fn run_stream(&self, request: &TurnRequest) -> TurnOutcome {
        let response = match self.api.start_turn(request).await {
            Ok(response) => response,
            Err(error) => return self.fail(error.to_string()).await,
        };

        *self.state.write().await = TurnState::Streaming;

        let mut decoder = FrameDecoder::new();
        let mut bytes = response.bytes_stream();

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    return self.settle_cancelled().await;
                }
                chunk = bytes.next() => {
                    let chunk = match chunk {
                        Some(Ok(chunk)) => chunk,
                        Some(Err(error)) => {
                            return self.fail(format!("stream read failed: {error}")).await;
                        }
                        // EOF with no terminal frame: the backend never
                        // settled the turn.
                        None => return self.fail("stream ended unexpectedly".to_string()).await,
                    };

                    for event in decoder.push(&chunk) {
                        if let Some(outcome) = self.apply_event(event).await {
                            return outcome;
                        }
                    }
                }
            }
        }
    }

    /// Applies one decoded event to the transcript, returning the outcome
    /// when the event is terminal.
    async fn apply_event(&self, event: StreamEvent) -> Option<TurnOutcome> {
        match event {
            StreamEvent::Chunk(text) => {
                let mut transcript = self.transcript.write().await;
                if let Err(error) = transcript.append_to_pending(&text) {
                    drop(transcript);
                    return Some(self.fail(error.to_string()).await);
                }
                None
            }
            StreamEvent::Done(chart_config) => {
                let mut transcript = self.transcript.write().await;
                match transcript.complete_pending(chart_config.clone()) {
                    Ok(()) => Some(TurnOutcome::Completed { chart_config }),
                    Err(error) => {
                        drop(transcript);
                        Some(self.fail(error.to_string()).await)
                    }
                }
            }
            StreamEvent::Error(message) => Some(self.fail(message).await),
        }
    }

    /// Settles the pending entry with a failure message.
    async fn fail(&self, message: String) -> TurnOutcome {
        let mut transcript = self.transcript.write().await;
        if let Err(error) = transcript.fail_pending(&message) {
            tracing::warn!(%error, "failed turn had no pending entry to settle");
        }
        TurnOutcome::Failed { message }
    }

    /// Settles the pending entry on cancellation, keeping whatever content
    /// already streamed in, so the zero-pending invariant holds after
    /// teardown.
    async fn settle_cancelled(&self) -> TurnOutcome {
        let mut transcript = self.transcript.write().await;
        if let Err(error) = transcript.complete_pending(None) {
            tracing::debug!(%error, "cancelled turn was already settled");
        }
        TurnOutcome::Cancelled
    }
}
