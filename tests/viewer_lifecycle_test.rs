//! Integration tests for the persistent viewer lifecycle: launch,
//! idempotence, staleness recovery, and interrupt delivery.

mod common;

use aitx::backend::BackendError;
use aitx::viewer::ViewerError;

use common::{test_viewer, FakeBackend, FakeWindows, ScriptedError};

#[tokio::test]
async fn test_ensure_alive_launches_once_and_is_idempotent() {
    // Session appears on the first poll after launch, then keeps existing.
    let backend = FakeBackend::with_exists([true], true);
    let windows = FakeWindows::default();
    let mut viewer = test_viewer();

    viewer
        .ensure_alive(&backend, &windows)
        .await
        .expect("first ensure_alive should succeed");
    assert!(viewer.is_alive());

    viewer
        .ensure_alive(&backend, &windows)
        .await
        .expect("second ensure_alive should succeed");
    assert!(viewer.is_alive());

    // Exactly one window for the live session, no matter how often the
    // caller re-ensures.
    assert_eq!(
        windows.viewer_launches().len(),
        1,
        "a live session must never get a second window"
    );
}

#[tokio::test]
async fn test_viewer_window_runs_the_attach_command() {
    let backend = FakeBackend::with_exists([true], true);
    let windows = FakeWindows::default();
    let mut viewer = test_viewer();

    viewer.ensure_alive(&backend, &windows).await.expect("launch");

    let launches = windows.viewer_launches();
    assert_eq!(launches.len(), 1);
    let (title, command) = &launches[0];
    assert!(title.contains("aitx-viewer"));
    assert_eq!(command, "fake-attach aitx-viewer 1000");
}

#[tokio::test]
async fn test_stale_flag_triggers_exactly_one_relaunch() {
    let backend = FakeBackend::with_exists([true], true);
    let windows = FakeWindows::default();
    let mut viewer = test_viewer();
    viewer.ensure_alive(&backend, &windows).await.expect("launch");

    // The user closed the window: the flag is still true, but the next
    // verification answers false. The poll after relaunch answers true.
    {
        let mut state = backend.state.lock().unwrap();
        state.exists_responses = [false, true].into_iter().collect();
    }

    viewer
        .ensure_alive(&backend, &windows)
        .await
        .expect("relaunch should succeed");
    assert!(viewer.is_alive());
    assert_eq!(
        windows.viewer_launches().len(),
        2,
        "stale flag must trigger exactly one relaunch"
    );
}

#[tokio::test]
async fn test_launch_exhaustion_reports_never_appeared() {
    // The window opens but the session never shows up.
    let backend = FakeBackend::with_exists([], false);
    let windows = FakeWindows::default();
    let mut viewer = test_viewer();

    let err = viewer
        .ensure_alive(&backend, &windows)
        .await
        .expect_err("session never appearing must fail");
    assert!(matches!(err, ViewerError::NeverAppeared(_)));
    assert!(!viewer.is_alive());
    // All four poll attempts were used.
    assert_eq!(backend.exists_queries(), 4);
}

#[tokio::test]
async fn test_spawn_failure_is_distinct_and_skips_polling() {
    let backend = FakeBackend::with_exists([], false);
    let windows = FakeWindows::failing();
    let mut viewer = test_viewer();

    let err = viewer
        .ensure_alive(&backend, &windows)
        .await
        .expect_err("failed spawn must fail");
    assert!(matches!(err, ViewerError::SpawnFailed(_)));
    assert!(!viewer.is_alive());
    assert_eq!(
        backend.exists_queries(),
        0,
        "no point polling when the terminal never started"
    );
}

#[tokio::test]
async fn test_send_failure_clears_flag_without_retry() {
    let backend = FakeBackend::with_exists([true], true);
    let windows = FakeWindows::default();
    let mut viewer = test_viewer();
    viewer.ensure_alive(&backend, &windows).await.expect("launch");

    backend.state.lock().unwrap().send_error = Some(ScriptedError::TargetMissing);

    let err = viewer
        .send_command(&backend, &windows, "ls")
        .await
        .expect_err("send into a gone pane must fail");
    assert!(matches!(
        err,
        ViewerError::Backend(BackendError::TargetMissing(_))
    ));
    assert!(!viewer.is_alive(), "send failure must clear the flag");
    assert_eq!(
        windows.viewer_launches().len(),
        1,
        "no auto-relaunch within the failed dispatch"
    );
}

#[tokio::test]
async fn test_send_delivers_literal_text_to_primary_pane() {
    let backend = FakeBackend::with_exists([true], true);
    let windows = FakeWindows::default();
    let mut viewer = test_viewer();

    let command = "echo 'it'\\''s here'";
    viewer
        .send_command(&backend, &windows, command)
        .await
        .expect("send should succeed");

    let sent = backend.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "aitx-viewer:0.0");
    assert_eq!(
        sent[0].1, command,
        "text delivered to the backend must match the command byte-for-byte"
    );
}

#[tokio::test]
async fn test_interrupt_target_gone_clears_flag() {
    let backend = FakeBackend::with_exists([true], true);
    let windows = FakeWindows::default();
    let mut viewer = test_viewer();
    viewer.ensure_alive(&backend, &windows).await.expect("launch");

    backend.state.lock().unwrap().interrupt_error = Some(ScriptedError::NoServer);

    let err = viewer
        .interrupt(&backend)
        .await
        .expect_err("interrupt to a dead server must fail");
    assert!(err.is_target_gone());
    assert!(!viewer.is_alive());
}

#[tokio::test]
async fn test_interrupt_timeout_keeps_flag() {
    let backend = FakeBackend::with_exists([true], true);
    let windows = FakeWindows::default();
    let mut viewer = test_viewer();
    viewer.ensure_alive(&backend, &windows).await.expect("launch");

    backend.state.lock().unwrap().interrupt_error = Some(ScriptedError::Timeout);

    let err = viewer
        .interrupt(&backend)
        .await
        .expect_err("timed-out interrupt must fail");
    assert!(!err.is_target_gone());
    assert!(
        viewer.is_alive(),
        "a timeout is ambiguous; the session may still be fine"
    );
}
