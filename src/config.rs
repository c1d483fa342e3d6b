use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::{DriveError, ListFailurePolicy, Result};

/// Default service endpoint.
pub const DEFAULT_BASE_URL: &str = "http://10.69.69.1:80/api";

/// How long a transient notification stays visible.
pub const NOTICE_TTL: Duration = Duration::from_secs(3);

/// How long an untouched context menu stays open.
pub const CONTEXT_MENU_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct DriveConfig {
    pub base_url: String,
    pub state_dir: PathBuf,
    pub list_policy: ListFailurePolicy,
    pub notice_ttl: Duration,
    pub context_menu_ttl: Duration,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            state_dir: default_state_dir(),
            list_policy: ListFailurePolicy::default(),
            notice_ttl: NOTICE_TTL,
            context_menu_ttl: CONTEXT_MENU_TTL,
        }
    }
}

impl DriveConfig {
    /// Reads `PURPLE_DRIVE_URL`, `PURPLE_DRIVE_STATE_DIR` and
    /// `PURPLE_DRIVE_DEMO_FALLBACK`, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = env::var("PURPLE_DRIVE_URL") {
            config.base_url = url;
        }
        if let Some(dir) = env::var_os("PURPLE_DRIVE_STATE_DIR") {
            config.state_dir = PathBuf::from(dir);
        }
        if let Ok(flag) = env::var("PURPLE_DRIVE_DEMO_FALLBACK") {
            let enabled = flag.parse::<bool>().map_err(|err| {
                DriveError::Config(format!("invalid PURPLE_DRIVE_DEMO_FALLBACK: {err}"))
            })?;
            if enabled {
                config.list_policy = ListFailurePolicy::DemoData;
            }
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_state_dir(mut self, state_dir: impl Into<PathBuf>) -> Self {
        self.state_dir = state_dir.into();
        self
    }

    pub fn with_list_policy(mut self, policy: ListFailurePolicy) -> Self {
        self.list_policy = policy;
        self
    }
}

/// Per-user state directory: `$XDG_CONFIG_HOME`, `%APPDATA%` or
/// `~/.config`, with `purple-drive` appended.
pub fn default_state_dir() -> PathBuf {
    let base = env::var_os("XDG_CONFIG_HOME")
        .or_else(|| env::var_os("APPDATA"))
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("purple-drive")
}
