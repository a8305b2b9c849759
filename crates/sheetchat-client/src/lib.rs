//! Network side of the sheetchat streaming session engine.
//!
//! Provides the typed backend API client, the stream frame decoder, the
//! single-in-flight turn orchestrator, local session state with data
//! source token recomputation, and file-backed client identity storage.

pub mod api;
pub mod config;
pub mod decoder;
pub mod identity_store;
pub mod session;
pub mod turn;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use decoder::FrameDecoder;
pub use identity_store::FileIdentityStore;
pub use session::SessionState;
pub use turn::{TurnOrchestrator, TurnOutcome, TurnState};
