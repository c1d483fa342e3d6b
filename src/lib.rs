//! Client library for the Purple Drive file-storage service.
//!
//! [`StorageClient`] talks to the REST endpoints, [`controller::Drive`] owns
//! the session and view state on top of it, and [`dispatch`] feeds user
//! commands to the controller one at a time for the desktop front end.

use bytes::Bytes;
use reqwest::{multipart, Client, Response, Url};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use tracing::{debug, error, warn};

pub mod config;
pub mod controller;
pub mod credentials;
pub mod dispatch;
pub mod notify;
pub mod render;
pub mod view;

pub use config::DriveConfig;
pub use controller::{Confirmation, Drive, Snapshot, UploadSummary};
pub use credentials::{CredentialError, CredentialStore};

/// What `list_files` does when the service cannot be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListFailurePolicy {
    /// Report the failure to the caller.
    #[default]
    Surface,
    /// Log the failure and hand back [`demo_files`] instead.
    DemoData,
}

// --- ERROR HANDLING ---

#[derive(Debug, thiserror::Error)]
pub enum DriveError {
    /// Non-success HTTP status, already phrased for display.
    #[error("{0}")]
    Status(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Credential store error: {0}")]
    Credentials(#[from] CredentialError),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DriveError>;

// --- STRUCTS ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub size: u64,
    /// Icon tag such as `pdf` or `image`.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub date: String,
}

impl FileRecord {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        size: u64,
        kind: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            size,
            kind: kind.into(),
            date: date.into(),
        }
    }
}

// Ids are opaque; some servers send them as numbers.
fn opaque_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub username: String,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

/// Result of [`StorageClient::authenticate`]. Login never fails with an
/// `Err`; rejections and transport problems are both a `Failure`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Success(User),
    Failure(String),
}

impl AuthOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AuthOutcome::Success(_))
    }
}

#[derive(Deserialize, Debug)]
struct LoginResponse {
    access_token: String,
    #[serde(default)]
    user: Option<User>,
}

/// The fixed records served under [`ListFailurePolicy::DemoData`].
pub fn demo_files() -> Vec<FileRecord> {
    vec![
        FileRecord::new("1", "Document.pdf", 1_024_000, "pdf", "2024-01-15"),
        FileRecord::new("2", "Presentation.pptx", 2_048_000, "presentation", "2024-01-14"),
        FileRecord::new("3", "Spreadsheet.xlsx", 512_000, "spreadsheet", "2024-01-13"),
        FileRecord::new("4", "Image.jpg", 256_000, "image", "2024-01-12"),
        FileRecord::new("5", "Video.mp4", 10_240_000, "video", "2024-01-11"),
    ]
}

// --- THE CLIENT ---

#[derive(Clone)]
pub struct StorageClient {
    client: Client,
    base_url: Url,
    auth_token: Option<String>,
    store: CredentialStore,
    list_policy: ListFailurePolicy,
}

impl StorageClient {
    /// Builds a client and resumes any credential left in the store.
    pub fn new(config: &DriveConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| DriveError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(DriveError::InvalidUrl(config.base_url.clone()));
        }

        let client = Client::builder()
            .pool_idle_timeout(Some(std::time::Duration::from_secs(90)))
            .build()
            .unwrap_or_default();

        let store = CredentialStore::new(&config.state_dir);
        let auth_token = match store.load() {
            Ok(token) => token,
            Err(e) => {
                warn!("Ignoring unreadable credential store {}: {e}", store.path().display());
                None
            }
        };

        Ok(Self {
            client,
            base_url,
            auth_token,
            store,
            list_policy: config.list_policy,
        })
    }

    pub fn token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_token.is_some()
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn bearer(&self) -> Result<&str> {
        self.auth_token.as_deref().ok_or(DriveError::NotAuthenticated)
    }

    fn status_error(action: &str, response: &Response) -> DriveError {
        let status = response.status();
        let reason = status.canonical_reason().unwrap_or(status.as_str());
        DriveError::Status(format!("{action} failed: {reason}"))
    }

    // --- Authentication ---

    pub async fn authenticate(&mut self, username: &str, password: &str) -> AuthOutcome {
        if username.is_empty() || password.is_empty() {
            return AuthOutcome::Failure("Enter username and password".to_string());
        }

        let url = self.endpoint(&["auth", "login"]);
        debug!("POST {url}");
        let body = serde_json::json!({ "username": username, "password": password });

        let response = match self.client.post(url).json(&body).send().await {
            Ok(r) => r,
            Err(e) => {
                error!("Authentication error: {e}");
                return AuthOutcome::Failure("Connection failed".to_string());
            }
        };

        if !response.status().is_success() {
            debug!("Login rejected with status {}", response.status());
            return AuthOutcome::Failure("Invalid credentials".to_string());
        }

        let login: LoginResponse = match response.json().await {
            Ok(l) => l,
            Err(e) => {
                error!("Authentication error: {e}");
                return AuthOutcome::Failure("Connection failed".to_string());
            }
        };

        if let Err(e) = self.store.save(&login.access_token) {
            warn!("Could not persist credential: {e}");
        }
        self.auth_token = Some(login.access_token);

        let user = login.user.unwrap_or_else(|| User::new(username));
        AuthOutcome::Success(user)
    }

    /// Forgets the credential in memory and on disk.
    pub fn sign_out(&mut self) -> Result<()> {
        self.auth_token = None;
        self.store.clear()?;
        Ok(())
    }

    // --- Core Operations ---

    /// Streams a local file to the service as multipart field `file` and
    /// returns whatever metadata the server replies with.
    pub async fn upload_file(&self, local_path: &Path) -> Result<serde_json::Value> {
        let auth = self.bearer()?;

        if !local_path.is_file() {
            return Err(DriveError::FileNotFound(local_path.display().to_string()));
        }

        let filename = local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| DriveError::FileNotFound(local_path.display().to_string()))?;

        // Use streaming to avoid loading entire file into memory
        let file = tokio::fs::File::open(local_path).await?;
        let file_size = file.metadata().await?.len();
        let stream = tokio_util::io::ReaderStream::new(file);
        let body = reqwest::Body::wrap_stream(stream);

        let part = multipart::Part::stream_with_length(body, file_size)
            .file_name(filename)
            .mime_str("application/octet-stream")?;
        let form = multipart::Form::new().part("file", part);

        let url = self.endpoint(&["files", "upload"]);
        debug!("POST {url} ({file_size} bytes)");

        let response = self
            .client
            .post(url)
            .bearer_auth(auth)
            .multipart(form)
            .send()
            .await
            .inspect_err(|e| error!("Upload error: {e}"))?;

        if !response.status().is_success() {
            let err = Self::status_error("Upload", &response);
            error!("Upload error: {err}");
            return Err(err);
        }

        Ok(response.json().await?)
    }

    pub async fn list_files(&self) -> Result<Vec<FileRecord>> {
        let auth = self.bearer()?;

        match self.fetch_list(auth).await {
            Ok(files) => {
                debug!("Listed {} files", files.len());
                Ok(files)
            }
            Err(e) => match self.list_policy {
                ListFailurePolicy::Surface => {
                    error!("List files error: {e}");
                    Err(e)
                }
                ListFailurePolicy::DemoData => {
                    warn!("List files error: {e}; serving demo records");
                    Ok(demo_files())
                }
            },
        }
    }

    async fn fetch_list(&self, auth: &str) -> Result<Vec<FileRecord>> {
        let url = self.endpoint(&["files", "list"]);
        debug!("GET {url}");

        let response = self.client.get(url).bearer_auth(auth).send().await?;
        if !response.status().is_success() {
            return Err(Self::status_error("List files", &response));
        }
        Ok(response.json().await?)
    }

    pub async fn download_file(&self, id: &str) -> Result<Bytes> {
        let auth = self.bearer()?;
        let url = self.endpoint(&["files", "download", id]);
        debug!("GET {url}");

        let response = self
            .client
            .get(url)
            .bearer_auth(auth)
            .send()
            .await
            .inspect_err(|e| error!("Download error: {e}"))?;

        if !response.status().is_success() {
            let err = Self::status_error("Download", &response);
            error!("Download error: {err}");
            return Err(err);
        }

        Ok(response.bytes().await?)
    }

    /// `Ok(false)` means the server declined; only transport failures are
    /// errors.
    pub async fn delete_file(&self, id: &str) -> Result<bool> {
        let auth = self.bearer()?;
        let url = self.endpoint(&["files", "delete", id]);
        debug!("DELETE {url}");

        let response = self
            .client
            .delete(url)
            .bearer_auth(auth)
            .send()
            .await
            .inspect_err(|e| error!("Delete error: {e}"))?;

        Ok(response.status().is_success())
    }
}
