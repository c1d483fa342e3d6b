//! Durable key-value storage for the bearer credential.
//!
//! The store is a small JSON object on disk. Only the `cloud_token` key is
//! used by the client, but unknown keys are preserved across writes.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Key holding the bearer credential.
pub const CREDENTIAL_KEY: &str = "cloud_token";

/// File name of the store inside the state directory.
pub const CREDENTIALS_FILE: &str = "credentials.json";

/// Upper bound for the store file; anything bigger is treated as corrupt.
pub const MAX_CREDENTIALS_BYTES: u64 = 64 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("metadata read failed: {0}")]
    Metadata(#[source] io::Error),

    #[error("file too large: {size} bytes (max {max})")]
    TooLarge { size: u64, max: u64 },

    #[error("read failed: {0}")]
    Read(#[source] io::Error),

    #[error("parse failed: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("serialize failed: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("tmp write failed: {0}")]
    WriteTmp(#[source] io::Error),

    #[error("rename failed: {0}")]
    Rename(#[source] io::Error),

    #[error("remove failed: {0}")]
    Remove(#[source] io::Error),
}

#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Store rooted in `state_dir`. Nothing is touched on disk until the
    /// first write.
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self {
            path: state_dir.as_ref().join(CREDENTIALS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the stored token, or `None` when the store does not exist or
    /// the key is missing/empty.
    pub fn load(&self) -> Result<Option<String>, CredentialError> {
        let entries = self.read_entries()?;
        Ok(entries
            .get(CREDENTIAL_KEY)
            .filter(|token| !token.is_empty())
            .cloned())
    }

    pub fn save(&self, token: &str) -> Result<(), CredentialError> {
        let mut entries = self.read_entries().unwrap_or_default();
        entries.insert(CREDENTIAL_KEY.to_string(), token.to_string());
        self.write_entries(&entries)
    }

    /// Removes the credential. Clearing an absent credential is not an error.
    pub fn clear(&self) -> Result<(), CredentialError> {
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(CredentialError::Parse(_)) | Err(CredentialError::TooLarge { .. }) => {
                // A corrupt store cannot hold a usable token; drop it entirely.
                return fs::remove_file(&self.path).map_err(CredentialError::Remove);
            }
            Err(e) => return Err(e),
        };

        if entries.remove(CREDENTIAL_KEY).is_none() {
            return Ok(());
        }

        if entries.is_empty() {
            match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(CredentialError::Remove(e)),
            }
        } else {
            self.write_entries(&entries)
        }
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, CredentialError> {
        let meta = match fs::metadata(&self.path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(CredentialError::Metadata(e)),
        };
        if meta.len() > MAX_CREDENTIALS_BYTES {
            return Err(CredentialError::TooLarge {
                size: meta.len(),
                max: MAX_CREDENTIALS_BYTES,
            });
        }

        let data = fs::read_to_string(&self.path).map_err(CredentialError::Read)?;
        serde_json::from_str(&data).map_err(CredentialError::Parse)
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(CredentialError::WriteTmp)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let payload = serde_json::to_string_pretty(entries).map_err(CredentialError::Serialize)?;
        fs::write(&tmp, payload.as_bytes()).map_err(CredentialError::WriteTmp)?;

        // rename replaces an existing target atomically everywhere but Windows.
        if cfg!(windows) && self.path.exists() {
            let _ = fs::remove_file(&self.path);
        }

        fs::rename(&tmp, &self.path).map_err(CredentialError::Rename)?;
        Ok(())
    }
}
