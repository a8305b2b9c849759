//! Client identity handling.
//!
//! Every outbound request carries a stable, per-installation identifier in
//! the `X-Client-ID` header. The identifier is a random v4 UUID, generated
//! once and persisted through a pluggable [`IdentityStore`]; it is only
//! regenerated when the store has no value.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Header name used to transmit the client identity.
pub const CLIENT_ID_HEADER: &str = "X-Client-ID";

/// A stable, opaque identifier for one client installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientIdentity(String);

impl ClientIdentity {
    /// Generates a fresh identity (random v4 UUID).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps an identity previously read back from storage.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identity as a string slice, suitable for a header value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persistent key-value storage for the client identity.
///
/// Implementations decide where the value lives (a file under the user
/// config dir, an in-memory map in tests, browser-local storage behind a
/// bridge). The engine only ever reads one value and writes it back once.
#[async_trait::async_trait]
pub trait IdentityStore: Send + Sync {
    /// Loads the stored identity, if any.
    async fn load(&self) -> Result<Option<ClientIdentity>>;

    /// Persists the identity, replacing any previous value.
    async fn save(&self, identity: &ClientIdentity) -> Result<()>;
}

/// Loads the identity from the store, generating and persisting a new one
/// when the store is empty.
pub async fn load_or_create(store: &dyn IdentityStore) -> Result<ClientIdentity> {
    if let Some(identity) = store.load().await? {
        return Ok(identity);
    }

    let identity = ClientIdentity::generate();
    store.save(&identity).await?;
    Ok(identity)
}
