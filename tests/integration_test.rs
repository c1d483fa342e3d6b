//! Integration tests for purple-drive
//!
//! Every test talks to an in-process stub of the storage service bound to
//! an ephemeral port, so no network access or credentials are needed.
//!
//! Run with: cargo test --test integration_test

use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use purple_drive::controller::AuthState;
use purple_drive::dispatch::{self, Command};
use purple_drive::view::Section;
use purple_drive::{
    AuthOutcome, Confirmation, CredentialStore, Drive, DriveConfig, DriveError, ListFailurePolicy,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_test::{assert_err, assert_ok};

const TOKEN: &str = "tok-123";

// ============================================================================
// Stub service
// ============================================================================

#[derive(Clone)]
struct StubFile {
    id: String,
    name: String,
    kind: String,
    date: String,
    content: Vec<u8>,
}

impl StubFile {
    fn new(id: &str, name: &str, kind: &str, date: &str, content: &[u8]) -> Self {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
            kind: kind.to_owned(),
            date: date.to_owned(),
            content: content.to_vec(),
        }
    }

    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "size": self.content.len(),
            "type": self.kind,
            "date": self.date,
        })
    }
}

#[derive(Clone, Default)]
struct Stub {
    files: Arc<Mutex<Vec<StubFile>>>,
    list_hits: Arc<AtomicUsize>,
    upload_hits: Arc<AtomicUsize>,
    download_hits: Arc<AtomicUsize>,
    delete_hits: Arc<AtomicUsize>,
    fail_list: Arc<AtomicBool>,
}

impl Stub {
    fn seeded() -> Self {
        let stub = Self::default();
        stub.files.lock().expect("stub lock").extend([
            StubFile::new("1", "report.pdf", "pdf", "2024-03-01", b"%PDF-1.7 quarterly numbers"),
            StubFile::new("2", "holiday.jpg", "image", "2024-02-10", b"jpeg bytes"),
        ]);
        stub
    }

    fn list_hits(&self) -> usize {
        self.list_hits.load(Ordering::SeqCst)
    }

    fn network_hits(&self) -> usize {
        self.list_hits()
            + self.upload_hits.load(Ordering::SeqCst)
            + self.download_hits.load(Ordering::SeqCst)
            + self.delete_hits.load(Ordering::SeqCst)
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["username"] == "maria" && body["password"] == "secret" {
        Json(json!({ "access_token": TOKEN, "user": { "username": "maria" } })).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "bad credentials" }))).into_response()
    }
}

async fn list(State(stub): State<Stub>, headers: HeaderMap) -> Response {
    stub.list_hits.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if stub.fail_list.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let files: Vec<Value> = stub
        .files
        .lock()
        .expect("stub lock")
        .iter()
        .map(StubFile::to_json)
        .collect();
    Json(files).into_response()
}

async fn upload(
    State(stub): State<Stub>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    stub.upload_hits.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_owned();
        let Ok(content) = field.bytes().await else {
            return StatusCode::BAD_REQUEST.into_response();
        };
        if name.starts_with("reject") {
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }

        let mut files = stub.files.lock().expect("stub lock");
        let id = format!("u{}", files.len() + 1);
        let record = StubFile::new(&id, &name, "txt", "2024-04-01", &content);
        let reply = record.to_json();
        files.push(record);
        return Json(reply).into_response();
    }
    StatusCode::BAD_REQUEST.into_response()
}

async fn download(
    State(stub): State<Stub>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    stub.download_hits.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let files = stub.files.lock().expect("stub lock");
    match files.iter().find(|f| f.id == id) {
        Some(file) => file.content.clone().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn remove(
    State(stub): State<Stub>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    stub.delete_hits.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if id == "locked" {
        return StatusCode::FORBIDDEN.into_response();
    }
    let mut files = stub.files.lock().expect("stub lock");
    let before = files.len();
    files.retain(|f| f.id != id);
    if files.len() == before {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(json!({ "deleted": id })).into_response()
}

async fn start_stub(stub: Stub) -> (String, oneshot::Sender<()>) {
    let router = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/files/list", get(list))
        .route("/api/files/upload", post(upload))
        .route("/api/files/download/{id}", get(download))
        .route("/api/files/delete/{id}", delete(remove))
        .with_state(stub);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral stub socket");
    let address = listener.local_addr().expect("stub local addr");
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let server = axum::serve(listener, router).with_graceful_shutdown(async {
        let _ = shutdown_rx.await;
    });
    tokio::spawn(async move {
        let _ = server.await;
    });

    (format!("http://{address}/api"), shutdown_tx)
}

// ============================================================================
// Helpers
// ============================================================================

fn config_for(base_url: &str, state: &TempDir) -> DriveConfig {
    DriveConfig::default()
        .with_base_url(base_url)
        .with_state_dir(state.path())
}

async fn signed_in_drive(config: &DriveConfig) -> Drive {
    let mut drive = Drive::new(config).expect("build drive");
    let outcome = drive.login("maria", "secret").await;
    assert!(outcome.is_success(), "login failed: {outcome:?}");
    drive
}

/// Waits for the stub's listener to close after a shutdown signal.
async fn wait_until_unreachable(base_url: &str) {
    let address = base_url
        .trim_start_matches("http://")
        .trim_end_matches("/api")
        .to_owned();
    for _ in 0..100 {
        if tokio::net::TcpStream::connect(&address).await.is_err() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("stub at {address} is still accepting connections");
}

fn messages(drive: &Drive) -> Vec<String> {
    drive.notices().iter().map(|n| n.message.clone()).collect()
}

// ============================================================================
// Session tests
// ============================================================================

#[tokio::test]
async fn test_login_stores_token_and_loads_files() {
    let stub = Stub::seeded();
    let (base_url, shutdown) = start_stub(stub.clone()).await;
    let state = TempDir::new().expect("state dir");
    let config = config_for(&base_url, &state);

    let drive = signed_in_drive(&config).await;

    assert_eq!(drive.auth_state(), AuthState::Authenticated);
    assert_eq!(drive.view().current_user().map(|u| u.username.as_str()), Some("maria"));
    assert!(!drive.login_prompt().open);
    assert_eq!(drive.view().files().len(), 2);
    assert_eq!(stub.list_hits(), 1);
    assert_eq!(messages(&drive), vec!["Welcome to Purple Drive!".to_string()]);

    let stored = assert_ok!(CredentialStore::new(state.path()).load());
    assert_eq!(stored.as_deref(), Some(TOKEN));

    let _ = shutdown.send(());
}

#[tokio::test]
async fn test_stored_token_resumes_session() {
    let stub = Stub::seeded();
    let (base_url, shutdown) = start_stub(stub.clone()).await;
    let state = TempDir::new().expect("state dir");
    let config = config_for(&base_url, &state);

    drop(signed_in_drive(&config).await);

    let mut resumed = Drive::new(&config).expect("build drive");
    assert_eq!(resumed.auth_state(), AuthState::Authenticated);
    assert!(!resumed.login_prompt().open);
    assert_eq!(resumed.snapshot().avatar, 'U');

    resumed.start().await;
    assert_eq!(resumed.view().files().len(), 2);
    assert_eq!(stub.list_hits(), 2);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn test_login_failures_keep_prompt_open() {
    let stub = Stub::seeded();
    let (base_url, shutdown) = start_stub(stub.clone()).await;
    let state = TempDir::new().expect("state dir");
    let mut drive = Drive::new(&config_for(&base_url, &state)).expect("build drive");

    let outcome = drive.login("maria", "wrong").await;
    assert_eq!(outcome, AuthOutcome::Failure("Invalid credentials".to_string()));
    assert_eq!(drive.login_prompt().error.as_deref(), Some("Invalid credentials"));

    let outcome = drive.login("", "").await;
    assert_eq!(outcome, AuthOutcome::Failure("Enter username and password".to_string()));

    assert!(drive.login_prompt().open);
    assert_eq!(drive.auth_state(), AuthState::Unauthenticated);
    assert!(drive.client().token().is_none());
    assert_eq!(assert_ok!(drive.client().store().load()), None);
    assert_eq!(stub.list_hits(), 0);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn test_unreachable_service_reports_connection_failure() {
    // Bind and release a port so nothing is listening on it.
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let address = listener.local_addr().expect("local addr");
    drop(listener);

    let state = TempDir::new().expect("state dir");
    let mut drive =
        Drive::new(&config_for(&format!("http://{address}/api"), &state)).expect("build drive");

    let outcome = drive.login("maria", "secret").await;
    assert_eq!(outcome, AuthOutcome::Failure("Connection failed".to_string()));
    assert_eq!(drive.login_prompt().error.as_deref(), Some("Connection failed"));
}

#[tokio::test]
async fn test_sign_out_forgets_everything() {
    let stub = Stub::seeded();
    let (base_url, shutdown) = start_stub(stub.clone()).await;
    let state = TempDir::new().expect("state dir");
    let mut drive = signed_in_drive(&config_for(&base_url, &state)).await;
    drive.search("report");

    assert!(!assert_ok!(drive.sign_out(Confirmation::Declined)));
    assert_eq!(drive.auth_state(), AuthState::Authenticated);

    assert!(assert_ok!(drive.sign_out(Confirmation::Accepted)));
    assert_eq!(drive.auth_state(), AuthState::Unauthenticated);
    assert!(drive.login_prompt().open);
    assert!(drive.view().files().is_empty());
    assert_eq!(drive.view().search(), "");
    assert!(drive.client().token().is_none());
    assert_eq!(assert_ok!(CredentialStore::new(state.path()).load()), None);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn test_unauthenticated_calls_never_reach_the_network() {
    let stub = Stub::seeded();
    let (base_url, shutdown) = start_stub(stub.clone()).await;
    let state = TempDir::new().expect("state dir");
    let drive = Drive::new(&config_for(&base_url, &state)).expect("build drive");
    let client = drive.client();

    let local = state.path().join("notes.txt");
    std::fs::write(&local, "hello").expect("write local file");

    assert!(matches!(client.list_files().await, Err(DriveError::NotAuthenticated)));
    assert!(matches!(client.upload_file(&local).await, Err(DriveError::NotAuthenticated)));
    assert!(matches!(client.download_file("1").await, Err(DriveError::NotAuthenticated)));
    assert!(matches!(client.delete_file("1").await, Err(DriveError::NotAuthenticated)));
    assert_eq!(stub.network_hits(), 0);

    let _ = shutdown.send(());
}

// ============================================================================
// File operation tests
// ============================================================================

#[tokio::test]
async fn test_upload_batch_refreshes_exactly_once() {
    let stub = Stub::seeded();
    let (base_url, shutdown) = start_stub(stub.clone()).await;
    let state = TempDir::new().expect("state dir");
    let mut drive = signed_in_drive(&config_for(&base_url, &state)).await;
    assert_eq!(stub.list_hits(), 1);

    let work = TempDir::new().expect("work dir");
    let good = work.path().join("a.txt");
    let rejected = work.path().join("reject.txt");
    std::fs::write(&good, "alpha").expect("write");
    std::fs::write(&rejected, "nope").expect("write");
    let missing = work.path().join("missing.txt");

    let summary = drive.upload_files(&[good, rejected, missing]).await;

    assert_eq!(summary.uploaded, 1);
    assert_eq!(summary.failed, 2);
    assert_eq!(stub.list_hits(), 2);
    assert!(drive.view().files().iter().any(|f| f.name == "a.txt"));

    let notices = messages(&drive);
    assert!(notices.contains(&"Uploading a.txt...".to_string()));
    assert!(notices.contains(&"✓ a.txt uploaded successfully".to_string()));
    assert!(notices.contains(&"✗ Failed to upload reject.txt".to_string()));
    assert!(notices.contains(&"✗ Failed to upload missing.txt".to_string()));

    let _ = shutdown.send(());
}

#[tokio::test]
async fn test_upload_directory_sends_each_file() {
    let stub = Stub::seeded();
    let (base_url, shutdown) = start_stub(stub.clone()).await;
    let state = TempDir::new().expect("state dir");
    let mut drive = signed_in_drive(&config_for(&base_url, &state)).await;

    let work = TempDir::new().expect("work dir");
    std::fs::create_dir(work.path().join("nested")).expect("mkdir");
    std::fs::write(work.path().join("one.txt"), "1").expect("write");
    std::fs::write(work.path().join("nested/two.txt"), "2").expect("write");

    let summary = drive.upload_files(&[work.path().to_path_buf()]).await;
    assert_eq!(summary.uploaded, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(drive.view().files().len(), 4);
    assert_eq!(stub.list_hits(), 2);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn test_list_failure_keeps_previous_files() {
    let stub = Stub::seeded();
    let (base_url, shutdown) = start_stub(stub.clone()).await;
    let state = TempDir::new().expect("state dir");
    let mut drive = signed_in_drive(&config_for(&base_url, &state)).await;

    stub.fail_list.store(true, Ordering::SeqCst);
    let err = assert_err!(drive.load_files().await);
    assert!(matches!(err, DriveError::Status(_)));
    assert_eq!(drive.view().files().len(), 2);
    assert!(messages(&drive).contains(&"Failed to load files".to_string()));

    let _ = shutdown.send(());
}

#[tokio::test]
async fn test_demo_fallback_serves_sample_records() {
    let stub = Stub::seeded();
    stub.fail_list.store(true, Ordering::SeqCst);
    let (base_url, shutdown) = start_stub(stub.clone()).await;
    let state = TempDir::new().expect("state dir");
    let config = config_for(&base_url, &state).with_list_policy(ListFailurePolicy::DemoData);

    let mut drive = signed_in_drive(&config).await;
    assert_eq!(drive.view().files().len(), 5);
    assert_eq!(assert_ok!(drive.load_files().await), 5);
    assert!(!messages(&drive).contains(&"Failed to load files".to_string()));

    let _ = shutdown.send(());
}

#[tokio::test]
async fn test_unreachable_service_keeps_previous_files() {
    let stub = Stub::seeded();
    let (base_url, shutdown) = start_stub(stub.clone()).await;
    let state = TempDir::new().expect("state dir");
    let mut drive = signed_in_drive(&config_for(&base_url, &state)).await;
    assert_eq!(drive.view().files().len(), 2);

    let _ = shutdown.send(());
    wait_until_unreachable(&base_url).await;

    let err = assert_err!(drive.load_files().await);
    assert!(matches!(err, DriveError::Network(_)), "unexpected error: {err}");
    assert_eq!(drive.view().files().len(), 2);
    assert!(messages(&drive).contains(&"Failed to load files".to_string()));
}

#[tokio::test]
async fn test_unreachable_service_falls_back_to_demo_records() {
    let stub = Stub::seeded();
    let (base_url, shutdown) = start_stub(stub.clone()).await;
    let state = TempDir::new().expect("state dir");
    let config = config_for(&base_url, &state).with_list_policy(ListFailurePolicy::DemoData);
    let mut drive = signed_in_drive(&config).await;
    assert_eq!(drive.view().files().len(), 2);

    let _ = shutdown.send(());
    wait_until_unreachable(&base_url).await;

    assert_eq!(assert_ok!(drive.load_files().await), 5);
    assert_eq!(drive.view().files()[0].name, "Document.pdf");
    assert!(!messages(&drive).contains(&"Failed to load files".to_string()));
}

#[tokio::test]
async fn test_search_and_sections_filter_visible_files() {
    let stub = Stub::seeded();
    let (base_url, shutdown) = start_stub(stub.clone()).await;
    let state = TempDir::new().expect("state dir");
    let mut drive = signed_in_drive(&config_for(&base_url, &state)).await;

    drive.search("REP");
    let snapshot = drive.snapshot();
    assert_eq!(snapshot.grid.cards.len(), 1);
    assert_eq!(snapshot.grid.cards[0].name, "report.pdf");
    assert_eq!(snapshot.grid.cards[0].date, "3/1/2024");

    drive.search("");
    drive.select_section(Section::Shared);
    let snapshot = drive.snapshot();
    assert!(snapshot.grid.cards.is_empty());
    assert!(snapshot.grid.show_upload_zone);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn test_download_writes_into_directory() {
    let stub = Stub::seeded();
    let (base_url, shutdown) = start_stub(stub.clone()).await;
    let state = TempDir::new().expect("state dir");
    let mut drive = signed_in_drive(&config_for(&base_url, &state)).await;
    let out = TempDir::new().expect("output dir");

    let saved = assert_ok!(drive.download_file("1", out.path()).await);
    assert_eq!(saved, out.path().join("report.pdf"));
    assert_eq!(std::fs::read(&saved).expect("read download"), b"%PDF-1.7 quarterly numbers");
    assert!(messages(&drive).contains(&"✓ report.pdf downloaded".to_string()));

    let explicit: PathBuf = out.path().join("copies").join("photo.jpg");
    assert_ok!(drive.download_file("2", &explicit).await);
    assert_eq!(std::fs::read(&explicit).expect("read download"), b"jpeg bytes");

    assert_err!(drive.download_file("99", out.path()).await);
    assert!(messages(&drive).contains(&"✗ Failed to download 99".to_string()));

    let _ = shutdown.send(());
}

#[tokio::test]
async fn test_delete_respects_confirmation_and_server_answer() {
    let stub = Stub::seeded();
    let (base_url, shutdown) = start_stub(stub.clone()).await;
    let state = TempDir::new().expect("state dir");
    let mut drive = signed_in_drive(&config_for(&base_url, &state)).await;

    assert!(!assert_ok!(drive.delete_file("1", Confirmation::Declined).await));
    assert_eq!(stub.delete_hits.load(Ordering::SeqCst), 0);

    assert!(!assert_ok!(drive.delete_file("locked", Confirmation::Accepted).await));
    assert!(messages(&drive).contains(&"Failed to delete file".to_string()));
    assert_eq!(stub.list_hits(), 1);

    assert!(assert_ok!(drive.delete_file("1", Confirmation::Accepted).await));
    assert!(messages(&drive).contains(&"File deleted successfully".to_string()));
    assert_eq!(stub.list_hits(), 2);
    assert!(drive.view().find("1").is_none());
    assert_eq!(drive.view().files().len(), 1);

    let _ = shutdown.send(());
}

// ============================================================================
// Dispatcher tests
// ============================================================================

#[tokio::test]
async fn test_dispatcher_applies_commands_in_order() {
    let stub = Stub::seeded();
    let (base_url, shutdown) = start_stub(stub.clone()).await;
    let state = TempDir::new().expect("state dir");
    let drive = Drive::new(&config_for(&base_url, &state)).expect("build drive");

    let (handle, task) = dispatch::spawn(drive);
    let mut snapshots = handle.subscribe();
    assert!(handle.snapshot().login.open);

    assert!(handle.send(Command::Login {
        username: "maria".into(),
        password: "secret".into(),
    }));
    assert!(handle.send(Command::Search("holiday".into())));

    let snapshot = tokio::time::timeout(
        Duration::from_secs(5),
        snapshots.wait_for(|s| s.auth == AuthState::Authenticated && s.search == "holiday"),
    )
    .await
    .expect("dispatcher published in time")
    .expect("dispatcher alive")
    .clone();

    assert_eq!(snapshot.avatar, 'M');
    assert_eq!(snapshot.grid.cards.len(), 1);
    assert_eq!(snapshot.grid.cards[0].name, "holiday.jpg");
    assert!(snapshot.notices.iter().any(|n| n.message == "Welcome to Purple Drive!"));

    drop(snapshots);
    drop(handle);
    let drive = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("dispatcher stopped in time")
        .expect("dispatcher task");
    assert!(drive.notices().is_empty());
    assert!(drive.context_menu().is_none());

    let _ = shutdown.send(());
}

#[tokio::test]
async fn test_dispatched_upload_batch_refreshes_once() {
    let stub = Stub::seeded();
    let (base_url, shutdown) = start_stub(stub.clone()).await;
    let state = TempDir::new().expect("state dir");
    let drive = signed_in_drive(&config_for(&base_url, &state)).await;
    assert_eq!(stub.list_hits(), 1);

    let work = TempDir::new().expect("work dir");
    let paths: Vec<PathBuf> = ["a.txt", "b.txt", "c.txt"]
        .iter()
        .map(|name| {
            let path = work.path().join(name);
            std::fs::write(&path, name).expect("write");
            path
        })
        .collect();

    let (handle, task) = dispatch::spawn(drive);
    let mut snapshots = handle.subscribe();
    assert!(handle.send(Command::Upload(paths)));

    let snapshot = tokio::time::timeout(
        Duration::from_secs(5),
        snapshots.wait_for(|s| s.grid.cards.len() == 5),
    )
    .await
    .expect("upload published in time")
    .expect("dispatcher alive")
    .clone();
    assert!(snapshot.grid.cards.iter().any(|c| c.name == "c.txt"));
    assert_eq!(stub.upload_hits.load(Ordering::SeqCst), 3);
    assert_eq!(stub.list_hits(), 2);

    drop(snapshots);
    drop(handle);
    assert_ok!(task.await);
    let _ = shutdown.send(());
}

#[tokio::test]
async fn test_dispatched_avatar_click_signs_out_when_confirmed() {
    let stub = Stub::seeded();
    let (base_url, shutdown) = start_stub(stub.clone()).await;
    let state = TempDir::new().expect("state dir");
    let drive = signed_in_drive(&config_for(&base_url, &state)).await;

    let (handle, task) = dispatch::spawn(drive);
    let mut snapshots = handle.subscribe();

    assert!(handle.send(Command::AvatarClicked(Confirmation::Declined)));
    assert!(handle.send(Command::Search("report".into())));
    let snapshot = tokio::time::timeout(
        Duration::from_secs(5),
        snapshots.wait_for(|s| s.search == "report"),
    )
    .await
    .expect("search published in time")
    .expect("dispatcher alive")
    .clone();
    assert_eq!(snapshot.auth, AuthState::Authenticated);

    assert!(handle.send(Command::AvatarClicked(Confirmation::Accepted)));
    let snapshot = tokio::time::timeout(
        Duration::from_secs(5),
        snapshots.wait_for(|s| s.auth == AuthState::Unauthenticated),
    )
    .await
    .expect("sign-out published in time")
    .expect("dispatcher alive")
    .clone();
    assert!(snapshot.login.open);
    assert!(snapshot.grid.cards.is_empty());
    assert_eq!(assert_ok!(CredentialStore::new(state.path()).load()), None);

    // Signed out, the avatar reopens the login prompt.
    assert!(handle.send(Command::CloseLogin));
    assert!(handle.send(Command::AvatarClicked(Confirmation::Declined)));
    drop(snapshots);
    drop(handle);
    let drive = assert_ok!(task.await);
    assert!(drive.login_prompt().open);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn test_dispatcher_expires_notices_on_its_own() {
    let state = TempDir::new().expect("state dir");
    let mut config = DriveConfig::default()
        .with_base_url("http://127.0.0.1:9/api")
        .with_state_dir(state.path());
    config.notice_ttl = Duration::from_millis(50);
    let drive = Drive::new(&config).expect("build drive");

    let (handle, task) = dispatch::spawn(drive);
    let mut snapshots = handle.subscribe();

    // A refresh without a session fails locally and raises a notice.
    assert!(handle.send(Command::Refresh));
    tokio::time::timeout(Duration::from_secs(5), snapshots.wait_for(|s| !s.notices.is_empty()))
        .await
        .expect("notice published in time")
        .expect("dispatcher alive");

    tokio::time::timeout(Duration::from_secs(5), snapshots.wait_for(|s| s.notices.is_empty()))
        .await
        .expect("notice expired in time")
        .expect("dispatcher alive");

    drop(snapshots);
    drop(handle);
    assert_ok!(task.await);
}
