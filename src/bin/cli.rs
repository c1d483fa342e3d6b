//! # Purple Drive CLI
//!
//! Command-line front end for a Purple Drive storage service.
//!
//! ## Usage
//!
//! ```bash
//! # Sign in once; the token is kept until `logout`
//! purple-drive-cli login -u alice -p secret
//!
//! # List, filter and fetch files
//! purple-drive-cli list --search report
//! purple-drive-cli download 42 -o ./downloads
//!
//! # Upload files or whole folders, one file at a time
//! purple-drive-cli upload notes.txt ./photos
//! ```
//!
//! ## Configuration
//!
//! - `--base-url` / `PURPLE_DRIVE_URL`: service endpoint
//! - `--state-dir` / `PURPLE_DRIVE_STATE_DIR`: where the credential is kept
//! - `PURPLE_DRIVE_USERNAME`, `PURPLE_DRIVE_PASSWORD`: login credentials

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use purple_drive::controller::{expand_upload_paths, AuthState};
use purple_drive::notify::{Notice, NoticeLevel};
use purple_drive::render::{format_file_size, render_grid};
use purple_drive::view::Section;
use purple_drive::{AuthOutcome, Confirmation, Drive, DriveConfig, ListFailurePolicy};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit code indicating successful completion.
const EXIT_SUCCESS: u8 = 0;
/// Exit code indicating a general error occurred.
const EXIT_ERROR: u8 = 1;

// =============================================================================
// CLI Definition
// =============================================================================

#[derive(Parser)]
#[command(name = "purple-drive-cli")]
#[command(author, version, about = "Purple Drive CLI - manage files on your personal cloud drive")]
struct Cli {
    /// Enable verbose logging (can also use RUST_LOG env var)
    #[arg(short, long)]
    verbose: bool,

    /// Service base URL
    #[arg(long, env = "PURPLE_DRIVE_URL")]
    base_url: Option<String>,

    /// Directory holding the stored credential
    #[arg(long, env = "PURPLE_DRIVE_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Show demo records instead of an error when listing fails
    #[arg(long)]
    demo_fallback: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and remember the session
    Login {
        /// Account name - can also use PURPLE_DRIVE_USERNAME env var
        #[arg(short, long, env = "PURPLE_DRIVE_USERNAME")]
        username: String,

        /// Account password - can also use PURPLE_DRIVE_PASSWORD env var
        #[arg(short, long, env = "PURPLE_DRIVE_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and forget the stored session
    Logout {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show the current session
    Whoami,

    /// List files
    List {
        /// Only show files whose name contains this text (case-insensitive)
        #[arg(short, long)]
        search: Option<String>,

        /// Sidebar section: my-drive, recent, shared, starred or trash
        #[arg(long, default_value = "my-drive")]
        section: Section,
    },

    /// Upload files or folders, one file at a time
    Upload {
        /// Files or directories to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Download a file by id
    Download {
        /// File id
        id: String,

        /// Destination file or directory
        #[arg(short = 'o', long, default_value = ".")]
        output: PathBuf,

        /// File name to save under inside the destination directory
        #[arg(long)]
        name: Option<String>,
    },

    /// Delete a file by id
    Delete {
        /// File id
        id: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Asks on stderr and reads a yes/no answer from stdin.
fn confirm(prompt: &str, assume_yes: bool) -> anyhow::Result<Confirmation> {
    if assume_yes {
        return Ok(Confirmation::Accepted);
    }
    eprint!("{prompt} [y/N]: ");
    std::io::stderr().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    let answer = input.trim().to_lowercase();
    Ok(Confirmation::from(answer == "y" || answer == "yes"))
}

fn print_notices(notices: Vec<Notice>) {
    for notice in notices {
        match notice.level {
            NoticeLevel::Error => eprintln!("{}", notice.message),
            NoticeLevel::Info | NoticeLevel::Success => println!("{}", notice.message),
        }
    }
}

/// Demo records may only stand in for the listing the user asked to see.
/// Anywhere else their names would be taken for real files.
fn apply_list_policy(config: DriveConfig, demo_fallback: bool, command: &Commands) -> DriveConfig {
    match command {
        Commands::List { .. } if demo_fallback => {
            config.with_list_policy(ListFailurePolicy::DemoData)
        }
        Commands::List { .. } => config,
        _ => config.with_list_policy(ListFailurePolicy::Surface),
    }
}

fn require_session(drive: &Drive) -> anyhow::Result<()> {
    if drive.auth_state() == AuthState::Unauthenticated {
        bail!("Not signed in. Run `purple-drive-cli login` first.");
    }
    Ok(())
}

/// Application entry point.
#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Main application logic.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("purple_drive=debug,purple_drive_cli=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("purple_drive=error,purple_drive_cli=info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let mut config = DriveConfig::from_env()?;
    if let Some(url) = cli.base_url {
        config = config.with_base_url(url);
    }
    if let Some(dir) = cli.state_dir {
        config = config.with_state_dir(dir);
    }
    config = apply_list_policy(config, cli.demo_fallback, &cli.command);

    let mut drive = Drive::new(&config)?;

    match cli.command {
        Commands::Login { username, password } => {
            match drive.login(&username, &password).await {
                AuthOutcome::Success(user) => {
                    print_notices(drive.take_notices());
                    println!("✓ Signed in as {}", user.username);
                }
                AuthOutcome::Failure(reason) => bail!("{reason}"),
            }
        }

        Commands::Logout { yes } => {
            require_session(&drive)?;
            let confirmation = confirm("Do you want to sign out?", yes)?;
            if drive.sign_out(confirmation)? {
                println!("✓ Signed out");
            } else {
                println!("Aborted.");
            }
        }

        Commands::Whoami => match drive.auth_state() {
            AuthState::Authenticated => {
                let store = drive.client().store().path();
                println!("Signed in (credential stored in {})", store.display());
            }
            AuthState::Unauthenticated => println!("Not signed in"),
        },

        Commands::List { search, section } => {
            require_session(&drive)?;
            let loaded = drive.load_files().await;
            print_notices(drive.take_notices());
            loaded.context("Error listing files")?;

            drive.select_section(section);
            if let Some(term) = search {
                drive.search(term);
            }

            let grid = render_grid(drive.view());
            if grid.show_upload_zone {
                println!("No files in {}.", section.label());
                return Ok(());
            }

            println!("\n{}:\n", section.label());
            println!("{:<4} {:<12} {:<40} {:>12} {:>12}", "", "ID", "Name", "Size", "Date");
            println!("{}", "-".repeat(84));
            for card in &grid.cards {
                println!(
                    "{:<4} {:<12} {:<40} {:>12} {:>12}",
                    card.icon, card.id, card.name, card.size, card.date
                );
            }
            let total: u64 = drive.view().visible().iter().map(|f| f.size).sum();
            println!("\n{} files, {}\n", grid.cards.len(), format_file_size(total));
        }

        Commands::Upload { files } => {
            require_session(&drive)?;
            let paths = expand_upload_paths(&files);
            if paths.is_empty() {
                bail!("No files to upload");
            }

            println!("\n📤 Uploading {} files...\n", paths.len());
            let bar = ProgressBar::new_spinner();
            bar.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
            bar.enable_steady_tick(std::time::Duration::from_millis(120));
            bar.set_message("uploading");

            let summary = drive.upload_files(&paths).await;
            bar.finish_and_clear();
            print_notices(drive.take_notices());

            println!(
                "\n✓ Upload complete: {} uploaded, {} failed",
                summary.uploaded, summary.failed
            );
            if summary.failed > 0 {
                bail!("{} file(s) failed to upload", summary.failed);
            }
        }

        Commands::Download { id, output, name } => {
            require_session(&drive)?;
            let output = match name {
                Some(name) => output.join(name),
                None => {
                    // Best effort: the listing supplies the file name for directory targets.
                    let _ = drive.load_files().await;
                    drive.take_notices();
                    output
                }
            };

            let result = drive.download_file(&id, &output).await;
            print_notices(drive.take_notices());
            let saved = result.context("Error downloading")?;
            println!("Saved to {}", saved.display());
        }

        Commands::Delete { id, yes } => {
            require_session(&drive)?;
            let confirmation = confirm("Are you sure you want to delete this file?", yes)?;
            if confirmation == Confirmation::Declined {
                println!("Aborted.");
                return Ok(());
            }

            let result = drive.delete_file(&id, confirmation).await;
            print_notices(drive.take_notices());
            if !result.context("Error deleting")? {
                bail!("The server refused to delete {id}");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_fallback_only_applies_to_list() {
        let list = Commands::List {
            search: None,
            section: Section::MyDrive,
        };
        let config = apply_list_policy(DriveConfig::default(), true, &list);
        assert_eq!(config.list_policy, ListFailurePolicy::DemoData);

        let download = Commands::Download {
            id: "1".into(),
            output: PathBuf::from("."),
            name: None,
        };
        let from_env = DriveConfig::default().with_list_policy(ListFailurePolicy::DemoData);
        let config = apply_list_policy(from_env, true, &download);
        assert_eq!(config.list_policy, ListFailurePolicy::Surface);
    }

    #[test]
    fn cli_parses_download_name() {
        let cli = Cli::try_parse_from([
            "purple-drive-cli",
            "download",
            "42",
            "-o",
            "out",
            "--name",
            "report.pdf",
        ])
        .expect("parse download");
        match cli.command {
            Commands::Download { id, output, name } => {
                assert_eq!(id, "42");
                assert_eq!(output, PathBuf::from("out"));
                assert_eq!(name.as_deref(), Some("report.pdf"));
            }
            _ => panic!("expected download"),
        }
    }
}
