//! Session controller.
//!
//! [`Drive`] is the context object the application root owns: it holds the
//! storage client, the view state, the notification queue and the context
//! menu, and exposes one method per user interaction. Every mutating
//! operation ends with a full list refresh so the view never holds a
//! partially patched snapshot.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::notify::{Notice, Notifications};
use crate::render::{self, ContextMenu, GridView};
use crate::view::{Section, ViewMode, ViewState};
use crate::{AuthOutcome, DriveConfig, FileRecord, Result, StorageClient, User};

/// Shown after a successful login.
pub const WELCOME_MESSAGE: &str = "Welcome to Purple Drive!";

/// Shown when the stored credential survives a sign-out.
pub const SIGN_OUT_CLEANUP_FAILED: &str = "Could not forget stored session";

/// Placeholder user for sessions resumed from a stored credential.
const RESUMED_USERNAME: &str = "user";

/// Answer to a confirmation prompt, collected by the front end before the
/// command reaches the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Accepted,
    Declined,
}

impl From<bool> for Confirmation {
    fn from(accepted: bool) -> Self {
        if accepted {
            Confirmation::Accepted
        } else {
            Confirmation::Declined
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginPrompt {
    pub open: bool,
    /// Inline error from the last rejected attempt.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub uploaded: usize,
    pub failed: usize,
}

/// Everything a front end needs to draw one frame.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub auth: AuthState,
    pub user: Option<User>,
    pub avatar: char,
    pub login: LoginPrompt,
    pub grid: GridView,
    pub section: Section,
    pub search: String,
    pub selected: Option<String>,
    pub notices: Vec<Notice>,
    pub context_menu: Option<ContextMenu>,
}

pub struct Drive {
    client: StorageClient,
    view: ViewState,
    notices: Notifications,
    login: LoginPrompt,
    context_menu: Option<ContextMenu>,
    context_menu_ttl: Duration,
}

impl Drive {
    /// A stored credential resumes the session optimistically, without
    /// asking the server; otherwise the login prompt starts open.
    pub fn new(config: &DriveConfig) -> Result<Self> {
        let client = StorageClient::new(config)?;
        let mut view = ViewState::default();
        let mut login = LoginPrompt::default();

        if client.is_authenticated() {
            info!("Resuming stored session");
            view.sign_in(User::new(RESUMED_USERNAME));
        } else {
            login.open = true;
        }

        Ok(Self {
            client,
            view,
            notices: Notifications::new(config.notice_ttl),
            login,
            context_menu: None,
            context_menu_ttl: config.context_menu_ttl,
        })
    }

    /// Initial refresh for a resumed session.
    pub async fn start(&mut self) {
        if self.view.is_authenticated() {
            let _ = self.load_files().await;
        }
    }

    pub fn auth_state(&self) -> AuthState {
        if self.view.is_authenticated() {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        }
    }

    pub fn client(&self) -> &StorageClient {
        &self.client
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn login_prompt(&self) -> &LoginPrompt {
        &self.login
    }

    pub fn notices(&self) -> &[Notice] {
        self.notices.active()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.take_all()
    }

    pub fn context_menu(&self) -> Option<&ContextMenu> {
        self.context_menu.as_ref()
    }

    // --- Session transitions ---

    pub async fn login(&mut self, username: &str, password: &str) -> AuthOutcome {
        let outcome = self.client.authenticate(username, password).await;
        match &outcome {
            AuthOutcome::Success(user) => {
                info!("Signed in as {}", user.username);
                self.view.sign_in(user.clone());
                self.login = LoginPrompt::default();
                let _ = self.load_files().await;
                self.notices.success(WELCOME_MESSAGE);
            }
            AuthOutcome::Failure(reason) => {
                debug!("Login failed: {reason}");
                self.login.open = true;
                self.login.error = Some(reason.clone());
            }
        }
        outcome
    }

    pub fn show_login(&mut self) {
        self.login.open = true;
    }

    pub fn close_login(&mut self) {
        self.login.open = false;
    }

    /// Returns whether the session was actually ended.
    pub fn sign_out(&mut self, confirmation: Confirmation) -> Result<bool> {
        if !self.view.is_authenticated() || confirmation == Confirmation::Declined {
            return Ok(false);
        }

        self.view.reset();
        self.context_menu = None;
        self.login = LoginPrompt {
            open: true,
            error: None,
        };
        info!("Signed out");
        if let Err(e) = self.client.sign_out() {
            self.notices.error(SIGN_OUT_CLEANUP_FAILED);
            return Err(e);
        }
        Ok(true)
    }

    /// Signed in: ask to sign out. Signed out: open the login prompt.
    pub fn avatar_clicked(&mut self, confirmation: Confirmation) -> Result<bool> {
        if self.view.is_authenticated() {
            self.sign_out(confirmation)
        } else {
            self.show_login();
            Ok(false)
        }
    }

    // --- File operations ---

    /// Replaces the snapshot with a fresh listing. On failure the previous
    /// snapshot stays and an error notice is raised.
    pub async fn load_files(&mut self) -> Result<usize> {
        match self.client.list_files().await {
            Ok(files) => {
                self.view.replace_files(files);
                Ok(self.view.files().len())
            }
            Err(e) => {
                self.notices.error("Failed to load files");
                Err(e)
            }
        }
    }

    /// Uploads one path after another (directories are expanded to the
    /// files below them), then refreshes once.
    pub async fn upload_files(&mut self, paths: &[PathBuf]) -> UploadSummary {
        let mut summary = UploadSummary::default();

        for path in expand_upload_paths(paths) {
            let name = display_name(&path);
            self.notices.info(format!("Uploading {name}..."));
            match self.client.upload_file(&path).await {
                Ok(_) => {
                    summary.uploaded += 1;
                    self.notices.success(format!("✓ {name} uploaded successfully"));
                }
                Err(e) => {
                    summary.failed += 1;
                    warn!("Upload of {} failed: {e}", path.display());
                    self.notices.error(format!("✗ Failed to upload {name}"));
                }
            }
        }

        let _ = self.load_files().await;
        summary
    }

    /// Saves a file's bytes to `destination`. When `destination` is an
    /// existing directory the file's name is appended.
    pub async fn download_file(&mut self, id: &str, destination: &Path) -> Result<PathBuf> {
        let name = self
            .view
            .find(id)
            .map(|file| file.name.clone())
            .unwrap_or_else(|| id.to_string());

        match self.save_download(id, &name, destination).await {
            Ok(path) => {
                self.notices.success(format!("✓ {name} downloaded"));
                Ok(path)
            }
            Err(e) => {
                warn!("Download of {id} failed: {e}");
                self.notices.error(format!("✗ Failed to download {name}"));
                Err(e)
            }
        }
    }

    async fn save_download(&self, id: &str, name: &str, destination: &Path) -> Result<PathBuf> {
        let payload = self.client.download_file(id).await?;

        let target = if destination.is_dir() {
            destination.join(name)
        } else {
            destination.to_path_buf()
        };
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, &payload).await?;
        debug!("Wrote {} bytes to {}", payload.len(), target.display());
        Ok(target)
    }

    /// Returns whether the file is gone. Both a declined confirmation and a
    /// server that refuses the delete yield `Ok(false)`; only transport
    /// failures are errors.
    pub async fn delete_file(&mut self, id: &str, confirmation: Confirmation) -> Result<bool> {
        if confirmation == Confirmation::Declined {
            return Ok(false);
        }
        self.context_menu = None;

        match self.client.delete_file(id).await {
            Ok(true) => {
                self.notices.success("File deleted successfully");
                let _ = self.load_files().await;
                Ok(true)
            }
            Ok(false) => {
                warn!("Server declined deletion of {id}");
                self.notices.error("Failed to delete file");
                Ok(false)
            }
            Err(e) => {
                self.notices.error("Failed to delete file");
                Err(e)
            }
        }
    }

    // --- Local view interactions ---

    pub fn search(&mut self, term: impl Into<String>) {
        self.view.set_search(term);
    }

    pub fn select_section(&mut self, section: Section) {
        self.context_menu = None;
        self.view.set_section(section);
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view.set_view_mode(mode);
    }

    pub fn open_file(&mut self, id: &str) -> Option<&FileRecord> {
        self.view.find(id)?;
        self.view.select(Some(id.to_string()));
        let file = self.view.find(id)?;
        debug!("File clicked: {} ({})", file.name, file.id);
        Some(file)
    }

    pub fn open_context_menu(&mut self, id: &str, position: (f32, f32)) -> bool {
        self.open_context_menu_at(id, position, Instant::now())
    }

    pub fn open_context_menu_at(&mut self, id: &str, position: (f32, f32), now: Instant) -> bool {
        let Some(file) = self.view.find(id) else {
            return false;
        };
        self.context_menu = Some(ContextMenu::new(file, position, now + self.context_menu_ttl));
        true
    }

    pub fn dismiss_context_menu(&mut self) {
        self.context_menu = None;
    }

    // --- Timers ---

    /// Drops expired notices and an expired context menu. Returns whether
    /// anything visible changed.
    pub fn expire(&mut self, now: Instant) -> bool {
        let mut changed = self.notices.expire(now) > 0;
        if self
            .context_menu
            .as_ref()
            .is_some_and(|menu| menu.expires_at <= now)
        {
            self.context_menu = None;
            changed = true;
        }
        changed
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        let menu = self.context_menu.as_ref().map(|menu| menu.expires_at);
        match (self.notices.next_deadline(), menu) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Cancels every pending timer.
    pub fn teardown(&mut self) {
        self.notices.clear();
        self.context_menu = None;
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            auth: self.auth_state(),
            user: self.view.current_user().cloned(),
            avatar: render::avatar_initial(self.view.current_user()),
            login: self.login.clone(),
            grid: render::render_grid(&self.view),
            section: self.view.section(),
            search: self.view.search().to_string(),
            selected: self.view.selected().map(str::to_string),
            notices: self.notices.active().to_vec(),
            context_menu: self.context_menu.clone(),
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Files stay as given; directories become their files, sorted by path.
/// Paths that don't exist are kept so their upload fails visibly.
pub fn expand_upload_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut expanded = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut files: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .collect();
            files.sort();
            expanded.extend(files);
        } else {
            expanded.push(path.clone());
        }
    }
    expanded
}
