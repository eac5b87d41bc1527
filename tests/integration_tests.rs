//! Integration tests for daemon-CLI IPC communication.
//!
//! A real `IpcServer` serves a `RequestHandler` on a temporary socket and the
//! CLI's `IpcClient` talks to it:
//! - Quick timer and saved workout start
//! - Pause, skip and reset round trips
//! - No-op responses for invalid states
//! - Connection and protocol error handling

use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use hiit::cli::{IpcClient, StartArgs};
use hiit::daemon::{socket_path, IpcServer, RequestHandler, TimerEngine, TimerEvent};
use hiit::storage::WorkoutLibrary;
use hiit::timer::PREP_SECONDS;
use hiit::types::{ExerciseConfig, IpcResponse, Phase, QuickTimerSettings};

// ============================================================================
// Test Helpers
// ============================================================================

struct TestDaemon {
    dir: tempfile::TempDir,
    engine: Arc<Mutex<TimerEngine>>,
    _events: mpsc::UnboundedReceiver<TimerEvent>,
    server: JoinHandle<()>,
}

impl TestDaemon {
    /// Serves IPC requests from a fresh data directory.
    fn spawn() -> Self {
        let dir = tempfile::tempdir().unwrap();
        Self::spawn_in(dir)
    }

    fn spawn_in(dir: tempfile::TempDir) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let engine = Arc::new(Mutex::new(TimerEngine::new(
            QuickTimerSettings::default(),
            tx,
        )));

        let server = IpcServer::new(&socket_path(dir.path())).unwrap();
        let handler = Arc::new(RequestHandler::new(
            engine.clone(),
            dir.path().to_path_buf(),
        ));
        let server = tokio::spawn(async move { server.serve(handler).await });

        Self {
            dir,
            engine,
            _events: rx,
            server,
        }
    }

    fn client(&self) -> IpcClient {
        IpcClient::for_data_dir(self.dir.path())
    }
}

impl Drop for TestDaemon {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn save_workout(dir: &Path, name: &str, exercises: Vec<ExerciseConfig>) {
    let mut library = WorkoutLibrary::open(dir).unwrap();
    library.create(Some(name));
    for exercise in exercises {
        library.upsert_exercise(name, exercise).unwrap();
    }
    library.save().unwrap();
}

fn quick_args(sets: u32, work: u32, rest: u32) -> StartArgs {
    StartArgs {
        workout: None,
        sets: Some(sets),
        work: Some(work),
        rest: Some(rest),
    }
}

// ============================================================================
// Start
// ============================================================================

#[tokio::test]
async fn test_quick_start_via_ipc() {
    let daemon = TestDaemon::spawn();

    let response = daemon.client().start(&StartArgs::default()).await.unwrap();

    assert_eq!(response.message, "クイックタイマーを開始しました");
    let status = response.data.unwrap();
    assert_eq!(status.phase, Phase::Prepare);
    assert_eq!(status.remaining_seconds, PREP_SECONDS);
    assert!(status.is_running);
    // 10 prepare + 4 x 30 work + 3 x 60 rest
    assert_eq!(status.overall_remaining, 310);

    assert!(daemon.engine.lock().await.is_counting());
}

#[tokio::test]
async fn test_quick_overrides_become_ambient_settings() {
    let daemon = TestDaemon::spawn();
    let client = daemon.client();

    client.start(&quick_args(2, 20, 10)).await.unwrap();
    let response = client.reset().await.unwrap();

    let status = response.data.unwrap();
    assert_eq!(status.phase, Phase::Idle);
    // 10 prepare + 2 x 20 work + 1 x 10 rest
    assert_eq!(status.overall_remaining, 60);
    assert_eq!(
        daemon.engine.lock().await.quick_settings(),
        QuickTimerSettings {
            sets: 2,
            work_seconds: 20,
            rest_seconds: 10,
        }
    );
}

#[tokio::test]
async fn test_saved_workout_start_via_ipc() {
    let daemon = TestDaemon::spawn();
    save_workout(
        daemon.dir.path(),
        "Legs",
        vec![
            ExerciseConfig::new("", "Squat", 2, 30, 15),
            ExerciseConfig::new("", "Lunge", 1, 20, 0),
        ],
    );

    let args = StartArgs {
        workout: Some("legs".to_string()),
        ..StartArgs::default()
    };
    let response = daemon.client().start(&args).await.unwrap();

    assert_eq!(response.message, "ワークアウト 'Legs' を開始しました");
    let status = response.data.unwrap();
    assert_eq!(status.phase, Phase::Prepare);
    assert_eq!(status.workout_name.as_deref(), Some("Legs"));
    assert_eq!(status.exercise_name, "Legs");
    assert_eq!(status.total_exercises, 2);
    assert_eq!(status.overall_remaining, 10 + 75 + 20);
}

#[tokio::test]
async fn test_library_edits_apply_without_restart() {
    let daemon = TestDaemon::spawn();
    let client = daemon.client();
    let args = StartArgs {
        workout: Some("Arms".to_string()),
        ..StartArgs::default()
    };

    let error = client.start(&args).await.unwrap_err();
    assert!(error.to_string().contains("'Arms' が見つかりません"));

    save_workout(
        daemon.dir.path(),
        "Arms",
        vec![ExerciseConfig::new("", "Curl", 1, 30, 0)],
    );

    let response = client.start(&args).await.unwrap();
    assert_eq!(response.data.unwrap().workout_name.as_deref(), Some("Arms"));
}

#[tokio::test]
async fn test_empty_workout_is_rejected() {
    let daemon = TestDaemon::spawn();
    save_workout(daemon.dir.path(), "Empty", Vec::new());

    let args = StartArgs {
        workout: Some("Empty".to_string()),
        ..StartArgs::default()
    };
    let error = daemon.client().start(&args).await.unwrap_err();

    assert!(error.to_string().contains("エクササイズがありません"));
    assert_eq!(daemon.engine.lock().await.status().phase, Phase::Idle);
}

// ============================================================================
// Controls
// ============================================================================

#[tokio::test]
async fn test_pause_and_resume_via_ipc() {
    let daemon = TestDaemon::spawn();
    let client = daemon.client();
    client.start(&StartArgs::default()).await.unwrap();

    let paused = client.toggle_pause().await.unwrap();
    assert_eq!(paused.message, "一時停止しました");
    assert!(paused.data.unwrap().is_paused);
    assert!(!daemon.engine.lock().await.is_counting());

    let resumed = client.toggle_pause().await.unwrap();
    assert_eq!(resumed.message, "再開しました");
    assert!(!resumed.data.unwrap().is_paused);
    assert!(daemon.engine.lock().await.is_counting());
}

#[tokio::test]
async fn test_skip_forward_and_back_via_ipc() {
    let daemon = TestDaemon::spawn();
    let client = daemon.client();
    client.start(&StartArgs::default()).await.unwrap();

    let forward = client.skip_forward().await.unwrap();
    let status = forward.data.unwrap();
    assert_eq!(forward.message, "次のステップへ進みました");
    assert_eq!(status.phase, Phase::Work);
    assert_eq!(status.current_set_number, 1);
    assert_eq!(status.remaining_seconds, 30);

    // Right at the start of Work, back returns to Prepare
    let back = client.skip_back().await.unwrap();
    let status = back.data.unwrap();
    assert_eq!(back.message, "ステップを戻しました");
    assert_eq!(status.phase, Phase::Prepare);
    assert_eq!(status.remaining_seconds, PREP_SECONDS);
}

#[tokio::test]
async fn test_skip_past_last_step_completes() {
    let daemon = TestDaemon::spawn();
    let client = daemon.client();
    client.start(&quick_args(1, 30, 30)).await.unwrap();

    client.skip_forward().await.unwrap();
    let response = client.skip_forward().await.unwrap();

    let status = response.data.unwrap();
    assert_eq!(status.phase, Phase::Done);
    assert!(!status.is_running);
}

#[tokio::test]
async fn test_controls_without_run_are_noops() {
    let daemon = TestDaemon::spawn();
    let client = daemon.client();

    for response in [
        client.toggle_pause().await.unwrap(),
        client.skip_forward().await.unwrap(),
        client.skip_back().await.unwrap(),
    ] {
        assert_eq!(
            response.message,
            "実行中のワークアウトがないため、何も変更されませんでした"
        );
        assert_eq!(response.data.unwrap().phase, Phase::Idle);
    }
}

#[tokio::test]
async fn test_status_via_ipc() {
    let daemon = TestDaemon::spawn();
    let client = daemon.client();

    let idle = client.status().await.unwrap().data.unwrap();
    assert_eq!(idle.phase, Phase::Idle);
    assert!(!idle.is_running);

    client.start(&StartArgs::default()).await.unwrap();
    let running = client.status().await.unwrap().data.unwrap();
    assert_eq!(running.phase, Phase::Prepare);
    assert!(running.is_running);
}

// ============================================================================
// Errors
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_no_daemon_is_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let client = IpcClient::for_data_dir(dir.path());

    let error = client.status().await.unwrap_err();

    assert!(format!("{:#}", error).contains("'hiit daemon' を起動してください"));
}

#[tokio::test]
async fn test_malformed_request_gets_error_response() {
    let daemon = TestDaemon::spawn();
    let mut stream = UnixStream::connect(socket_path(daemon.dir.path()))
        .await
        .unwrap();

    stream.write_all(b"{\"command\":\"explode\"}").await.unwrap();
    stream.shutdown().await.unwrap();

    let mut buffer = Vec::new();
    stream.read_to_end(&mut buffer).await.unwrap();
    let response: IpcResponse = serde_json::from_slice(&buffer).unwrap();

    assert!(response.is_error());
    assert!(response.message.contains("リクエストを処理できません"));
}

#[tokio::test]
async fn test_socket_removed_when_server_dropped() {
    let dir = tempfile::tempdir().unwrap();
    let path = socket_path(dir.path());

    let server = IpcServer::new(&path).unwrap();
    assert!(path.exists());

    drop(server);
    assert!(!path.exists());
}
