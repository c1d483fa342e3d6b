//! Single input queue in front of [`Drive`].
//!
//! Front ends send [`Command`]s; one task applies them strictly in arrival
//! order and publishes a [`Snapshot`] after each command and each timer
//! expiry. Notice and context-menu deadlines are driven from the same loop,
//! so nothing touches the controller concurrently.

use std::path::PathBuf;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::controller::{Confirmation, Drive, Snapshot};
use crate::view::{Section, ViewMode};

#[derive(Debug, Clone)]
pub enum Command {
    Login { username: String, password: String },
    ShowLogin,
    CloseLogin,
    /// Signed in: sign out if confirmed. Signed out: open the login prompt.
    AvatarClicked(Confirmation),
    Refresh,
    Upload(Vec<PathBuf>),
    Download { id: String, destination: PathBuf },
    Delete { id: String, confirmation: Confirmation },
    Search(String),
    SelectSection(Section),
    SetViewMode(ViewMode),
    OpenFile(String),
    ShowContextMenu { id: String, position: (f32, f32) },
    HideContextMenu,
}

/// Front-end side of the queue.
#[derive(Debug, Clone)]
pub struct DriveHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<Snapshot>,
}

impl DriveHandle {
    /// Queues a command; `false` once the dispatcher has stopped.
    pub fn send(&self, command: Command) -> bool {
        self.commands.send(command).is_ok()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }
}

/// Moves `drive` onto a new task. The task ends, returning the controller,
/// when every [`DriveHandle`] is dropped. Must be called inside a tokio
/// runtime.
pub fn spawn(drive: Drive) -> (DriveHandle, JoinHandle<Drive>) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (snapshot_tx, snapshot_rx) = watch::channel(drive.snapshot());

    let task = tokio::spawn(run(drive, command_rx, snapshot_tx));
    let handle = DriveHandle {
        commands: command_tx,
        snapshots: snapshot_rx,
    };
    (handle, task)
}

/// Gathers the per-file drop events of one drag-and-drop gesture into a
/// single upload batch.
#[derive(Debug, Default)]
pub struct DropBatch {
    paths: Vec<PathBuf>,
    generation: u64,
}

impl DropBatch {
    /// Adds a dropped path and returns the generation to settle with.
    pub fn push(&mut self, path: PathBuf) -> u64 {
        self.paths.push(path);
        self.generation += 1;
        self.generation
    }

    /// Hands out the gathered paths once no drop arrived after `generation`.
    pub fn settle(&mut self, generation: u64) -> Option<Vec<PathBuf>> {
        if generation != self.generation || self.paths.is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.paths))
    }
}

async fn run(
    mut drive: Drive,
    mut commands: mpsc::UnboundedReceiver<Command>,
    snapshots: watch::Sender<Snapshot>,
) -> Drive {
    drive.start().await;
    snapshots.send_replace(drive.snapshot());

    loop {
        let deadline = drive.next_deadline();
        tokio::select! {
            command = commands.recv() => match command {
                Some(command) => apply(&mut drive, command).await,
                None => break,
            },
            () = sleep_until(deadline) => {
                drive.expire(Instant::now());
            }
        }
        snapshots.send_replace(drive.snapshot());
    }

    debug!("Command queue closed; shutting down");
    drive.teardown();
    snapshots.send_replace(drive.snapshot());
    drive
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Runs one command to completion.
pub async fn apply(drive: &mut Drive, command: Command) {
    match command {
        Command::Login { username, password } => {
            drive.login(&username, &password).await;
        }
        Command::ShowLogin => drive.show_login(),
        Command::CloseLogin => drive.close_login(),
        Command::AvatarClicked(confirmation) => {
            if let Err(e) = drive.avatar_clicked(confirmation) {
                warn!("Sign-out cleanup failed: {e}");
            }
        }
        Command::Refresh => {
            let _ = drive.load_files().await;
        }
        Command::Upload(paths) => {
            let summary = drive.upload_files(&paths).await;
            debug!(
                "Upload batch done: {} uploaded, {} failed",
                summary.uploaded, summary.failed
            );
        }
        Command::Download { id, destination } => {
            let _ = drive.download_file(&id, &destination).await;
        }
        Command::Delete { id, confirmation } => {
            let _ = drive.delete_file(&id, confirmation).await;
        }
        Command::Search(term) => drive.search(term),
        Command::SelectSection(section) => drive.select_section(section),
        Command::SetViewMode(mode) => drive.set_view_mode(mode),
        Command::OpenFile(id) => {
            drive.open_file(&id);
        }
        Command::ShowContextMenu { id, position } => {
            drive.open_context_menu(&id, position);
        }
        Command::HideContextMenu => drive.dismiss_context_menu(),
    }
}
