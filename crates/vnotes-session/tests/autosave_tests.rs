//! Autosave scheduling under a paused clock.

use std::sync::Arc;
use std::time::Duration;
use vnotes_doc::{Delta, Position};
use vnotes_session::{
    AutosaveScheduler, EditState, EditorAdapter, SessionConfig, SessionHandle,
};
use vnotes_test_utils::{sample_document, FlakyBackend, InMemoryBackend};

const INTERVAL: Duration = Duration::from_secs(15);
const TICK: Duration = Duration::from_secs(16);

fn config() -> SessionConfig {
    SessionConfig::new().with_autosave_interval(INTERVAL)
}

fn append_line(adapter: &EditorAdapter, row: u32, text: &str) {
    adapter
        .apply_delta(&Delta::Insert {
            start: Position::new(row, 0),
            lines: vec![text.to_owned(), String::new()],
        })
        .unwrap();
}

/// Let the freshly spawned scheduler subscribe before any events fire.
async fn settle() {
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn dirty_document_is_saved_on_tick() {
    let backend = Arc::new(InMemoryBackend::new());
    let handle = SessionHandle::new(config(), backend.clone());
    let scheduler = AutosaveScheduler::new(&handle).spawn(handle.clone());
    settle().await;

    handle.create(None);
    handle.save(false).await.unwrap();
    assert_eq!(backend.save_calls(), 1);

    let adapter = EditorAdapter::new(handle.clone());
    append_line(&adapter, 0, "note taken");
    assert_eq!(handle.state(), EditState::Dirty);

    tokio::time::sleep(TICK).await;
    assert_eq!(backend.save_calls(), 2);
    assert_eq!(handle.state(), EditState::Clean);

    // Clean tick: nothing to do.
    tokio::time::sleep(TICK).await;
    assert_eq!(backend.save_calls(), 2);

    drop(scheduler);
}

#[tokio::test(start_paused = true)]
async fn scheduler_arms_only_after_document_is_live() {
    let backend = Arc::new(InMemoryBackend::new());
    let handle = SessionHandle::new(config(), backend.clone());
    let _scheduler = AutosaveScheduler::new(&handle).spawn(handle.clone());
    settle().await;

    handle.create(None);
    assert_eq!(handle.state(), EditState::Dirty);

    // Dirty, but never saved or loaded: ticks must not fire.
    tokio::time::sleep(TICK * 3).await;
    assert_eq!(backend.save_calls(), 0);
    assert_eq!(handle.state(), EditState::Dirty);
}

#[tokio::test(start_paused = true)]
async fn repeated_failures_stop_the_scheduler() {
    let backend = Arc::new(FlakyBackend::network_failures(100));
    backend.seed("doc-1", sample_document());
    let handle = SessionHandle::new(config(), backend.clone());
    let scheduler = AutosaveScheduler::new(&handle).spawn(handle.clone());
    settle().await;

    handle.load("doc-1", false).await.unwrap();
    settle().await;
    let adapter = EditorAdapter::new(handle.clone());
    append_line(&adapter, 0, "edited");
    assert_eq!(handle.state(), EditState::Dirty);

    // Five ticks, five failures, then editing is disabled.
    for _ in 0..5 {
        tokio::time::sleep(TICK).await;
    }
    assert_eq!(backend.save_calls(), 5);
    assert_eq!(handle.state(), EditState::ReadOnly);

    // The next tick notices and the scheduler exits; nothing fires after.
    tokio::time::sleep(TICK).await;
    assert!(scheduler.is_finished());
    tokio::time::sleep(TICK * 3).await;
    assert_eq!(backend.save_calls(), 5);
}

#[tokio::test(start_paused = true)]
async fn new_load_stops_the_old_scheduler() {
    let backend = Arc::new(InMemoryBackend::new());
    backend.seed("doc-1", sample_document());
    backend.seed("doc-2", sample_document());
    let handle = SessionHandle::new(config(), backend.clone());
    let scheduler = AutosaveScheduler::new(&handle).spawn(handle.clone());
    settle().await;

    handle.load("doc-1", false).await.unwrap();
    // Let the scheduler arm on the first document before replacing it.
    settle().await;
    let adapter = EditorAdapter::new(handle.clone());
    append_line(&adapter, 0, "edit on the first document");

    // Replace the document before any tick fires.
    handle.load("doc-2", false).await.unwrap();

    tokio::time::sleep(TICK).await;
    assert!(scheduler.is_finished());
    assert_eq!(backend.save_calls(), 0);
}
