//! File-backed client identity storage.
//!
//! Persists the client identity as a single line under the user config
//! dir, mirroring where the client configuration lives.

use async_trait::async_trait;
use sheetchat_core::error::{Result, SheetchatError};
use sheetchat_core::identity::{ClientIdentity, IdentityStore};
use std::path::PathBuf;

const IDENTITY_FILE: &str = "client_id";

/// Stores the identity at `~/.config/sheetchat/client_id`.
#[derive(Debug, Clone)]
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    /// Creates a store at the default location.
    pub fn new() -> Result<Self> {
        let dir = dirs::config_dir()
            .ok_or_else(|| SheetchatError::config("no user config directory available"))?;
        Ok(Self {
            path: dir.join("sheetchat").join(IDENTITY_FILE),
        })
    }

    /// Creates a store at an explicit path.
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl IdentityStore for FileIdentityStore {
    async fn load(&self) -> Result<Option<ClientIdentity>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => {
                let value = raw.trim();
                if value.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(ClientIdentity::from_stored(value)))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, identity: &ClientIdentity) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, identity.as_str()).await?;
        Ok(())
    }
}
