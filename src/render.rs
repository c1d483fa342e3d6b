//! Projection of [`ViewState`] into display-ready cards.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use tokio::time::Instant;

use crate::view::{ViewMode, ViewState};
use crate::{FileRecord, User};

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Glyph for tags missing from the icon table.
pub const DEFAULT_ICON: &str = "📄";

/// Human-readable size with base-1024 scaling and at most two decimals.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    while unit + 1 < SIZE_UNITS.len() && bytes >= 1024u64.pow(unit as u32 + 1) {
        unit += 1;
    }

    let value = bytes as f64 / 1024u64.pow(unit as u32) as f64;
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", SIZE_UNITS[unit])
}

pub fn file_icon(kind: &str) -> &'static str {
    match kind {
        "pdf" => "📄",
        "doc" | "docx" => "📝",
        "presentation" | "pptx" => "📊",
        "spreadsheet" | "xlsx" => "📈",
        "image" | "jpg" | "png" => "🖼️",
        "video" | "mp4" => "🎥",
        "audio" | "mp3" => "🎵",
        "folder" => "📁",
        _ => DEFAULT_ICON,
    }
}

/// Short `M/D/YYYY` date. Accepts RFC 3339, `YYYY-MM-DD` and naive
/// date-times; anything else is returned unchanged.
pub fn format_date(raw: &str) -> String {
    let raw = raw.trim();
    let date = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date()))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()));

    match date {
        Ok(d) => format!("{}/{}/{}", d.month(), d.day(), d.year()),
        Err(_) => raw.to_string(),
    }
}

/// Letter shown on the avatar button.
pub fn avatar_initial(user: Option<&User>) -> char {
    user.and_then(|u| u.username.chars().next())
        .and_then(|c| c.to_uppercase().next())
        .unwrap_or('U')
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCard {
    pub id: String,
    pub name: String,
    pub icon: &'static str,
    pub size: String,
    pub date: String,
}

impl From<&FileRecord> for FileCard {
    fn from(file: &FileRecord) -> Self {
        Self {
            id: file.id.clone(),
            name: file.name.clone(),
            icon: file_icon(&file.kind),
            size: format_file_size(file.size),
            date: format_date(&file.date),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GridView {
    pub cards: Vec<FileCard>,
    pub mode: ViewMode,
    /// No cards to show; the upload drop zone takes their place.
    pub show_upload_zone: bool,
}

pub fn render_grid(view: &ViewState) -> GridView {
    let cards: Vec<FileCard> = view.visible().iter().map(FileCard::from).collect();
    GridView {
        show_upload_zone: cards.is_empty(),
        cards,
        mode: view.view_mode(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Download,
    Delete,
}

impl MenuAction {
    pub fn label(self) -> &'static str {
        match self {
            MenuAction::Download => "Download",
            MenuAction::Delete => "Delete",
        }
    }
}

/// Per-file action menu anchored at the pointer position.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenu {
    pub file_id: String,
    pub file_name: String,
    pub position: (f32, f32),
    pub actions: [MenuAction; 2],
    pub expires_at: Instant,
}

impl ContextMenu {
    pub fn new(file: &FileRecord, position: (f32, f32), expires_at: Instant) -> Self {
        Self {
            file_id: file.id.clone(),
            file_name: file.name.clone(),
            position,
            actions: [MenuAction::Download, MenuAction::Delete],
            expires_at,
        }
    }
}
