//! In-memory view state: the last loaded file snapshot plus the session
//! and filter settings the renderer needs.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::{FileRecord, User};

/// How many records the `Recent` section shows.
pub const RECENT_LIMIT: usize = 5;

/// Sidebar sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Section {
    #[default]
    MyDrive,
    Recent,
    Shared,
    Starred,
    Trash,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::MyDrive,
        Section::Recent,
        Section::Shared,
        Section::Starred,
        Section::Trash,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Section::MyDrive => "My Drive",
            Section::Recent => "Recent",
            Section::Shared => "Shared with me",
            Section::Starred => "Starred",
            Section::Trash => "Trash",
        }
    }

    fn slug(self) -> &'static str {
        match self {
            Section::MyDrive => "my-drive",
            Section::Recent => "recent",
            Section::Shared => "shared",
            Section::Starred => "starred",
            Section::Trash => "trash",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.slug().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let known: Vec<_> = Section::ALL.iter().map(|s| s.slug()).collect();
                format!("unknown section '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    files: Arc<Vec<FileRecord>>,
    authenticated: bool,
    current_user: Option<User>,
    search: String,
    section: Section,
    view_mode: ViewMode,
    selected: Option<String>,
}

impl ViewState {
    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    /// Swaps in a fresh snapshot. Records repeating an earlier id are
    /// dropped; the count of dropped records is returned.
    pub fn replace_files(&mut self, files: Vec<FileRecord>) -> usize {
        let total = files.len();
        let mut seen = HashSet::with_capacity(total);
        let unique: Vec<FileRecord> = files
            .into_iter()
            .filter(|file| seen.insert(file.id.clone()))
            .collect();
        let dropped = total - unique.len();
        if dropped > 0 {
            tracing::warn!("Dropped {dropped} records with duplicate ids");
        }

        if let Some(id) = &self.selected {
            if !unique.iter().any(|file| &file.id == id) {
                self.selected = None;
            }
        }
        self.files = Arc::new(unique);
        dropped
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn sign_in(&mut self, user: User) {
        self.authenticated = true;
        self.current_user = Some(user);
    }

    /// Back to the signed-out state: no user, no files, no filters.
    pub fn reset(&mut self) {
        *self = Self {
            view_mode: self.view_mode,
            ..Self::default()
        };
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn set_section(&mut self, section: Section) {
        self.section = section;
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn select(&mut self, id: Option<String>) {
        self.selected = id;
    }

    pub fn find(&self, id: &str) -> Option<&FileRecord> {
        self.files.iter().find(|file| file.id == id)
    }

    /// Records to display: the active section, then the search term.
    pub fn visible(&self) -> Vec<FileRecord> {
        let in_section: &[FileRecord] = match self.section {
            Section::MyDrive => self.files.as_slice(),
            Section::Recent => &self.files[..self.files.len().min(RECENT_LIMIT)],
            Section::Shared | Section::Starred | Section::Trash => &[],
        };
        filter_by_name(in_section, &self.search)
    }
}

/// Case-insensitive substring match on the file name. An empty term keeps
/// everything.
pub fn filter_by_name(files: &[FileRecord], term: &str) -> Vec<FileRecord> {
    let needle = term.to_lowercase();
    files
        .iter()
        .filter(|file| file.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
