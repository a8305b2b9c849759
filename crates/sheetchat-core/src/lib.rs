//! Domain model for the sheetchat streaming session engine.
//!
//! This crate carries the pure pieces of the client: the shared error
//! type, client identity, the data source token codec, API payloads, the
//! conversation transcript store, and the streaming event type. Network
//! and rendering concerns live in `sheetchat-client` and
//! `sheetchat-charts`.

pub mod charts;
pub mod datasource;
pub mod error;
pub mod files;
pub mod identity;
pub mod session;
pub mod stream;
pub mod transcript;

// Re-export common error type
pub use error::{Result, SheetchatError};
