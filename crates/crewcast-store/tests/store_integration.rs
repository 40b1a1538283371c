#![allow(clippy::unwrap_used, clippy::expect_used)]

use crewcast_core::{Task, TaskError, TaskKind, TaskOutcome, TaskState};
use crewcast_store::{FileTaskStore, MemoryTaskStore, TaskStore};
use serde_json::json;

fn task(owner: &str, role: &str) -> Task {
    Task::new(
        TaskKind::ContentGeneration,
        owner,
        role,
        json!({"topic": "rust"}),
        Vec::new(),
    )
}

// ---------------------------------------------------------------------------
// Full lifecycle through the file store, surviving a reopen
// ---------------------------------------------------------------------------

#[tokio::test]
async fn file_store_lifecycle_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileTaskStore::new(dir.path().to_path_buf()).await.unwrap();

    let t = task("u1", "content_writer");
    store.insert(&t).await.unwrap();
    store
        .transition(t.id, TaskState::Running, TaskOutcome::None)
        .await
        .unwrap();
    store
        .transition(
            t.id,
            TaskState::Succeeded,
            TaskOutcome::Output(json!({"content": "a post"})),
        )
        .await
        .unwrap();

    // Reopen over the same directory.
    let reopened = FileTaskStore::new(dir.path().to_path_buf()).await.unwrap();
    let loaded = reopened.get(t.id).await.unwrap().unwrap();
    assert_eq!(loaded.state, TaskState::Succeeded);
    assert_eq!(loaded.result.unwrap()["content"], "a post");
    assert!(loaded.started_at.is_some());
    assert!(loaded.finished_at.is_some());
}

// ---------------------------------------------------------------------------
// Result and error are write-once and mutually exclusive
// ---------------------------------------------------------------------------

#[tokio::test]
async fn result_and_error_are_mutually_exclusive() {
    let store = MemoryTaskStore::new();
    let t = task("u1", "content_writer");
    store.insert(&t).await.unwrap();
    store
        .transition(t.id, TaskState::Running, TaskOutcome::None)
        .await
        .unwrap();
    store
        .transition(
            t.id,
            TaskState::Failed,
            TaskOutcome::Failure(TaskError::capability("model refused")),
        )
        .await
        .unwrap();

    // A second terminal write is rejected and the record is unchanged.
    let err = store
        .transition(t.id, TaskState::Succeeded, TaskOutcome::Output(json!(1)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        crewcast_core::CrewcastError::InvalidTransition { .. }
    ));

    let loaded = store.get(t.id).await.unwrap().unwrap();
    assert_eq!(loaded.state, TaskState::Failed);
    assert!(loaded.result.is_none());
    assert_eq!(loaded.error.unwrap().message, "model refused");
}

// ---------------------------------------------------------------------------
// Owner queries behave the same across backends
// ---------------------------------------------------------------------------

#[tokio::test]
async fn owner_queries_match_across_backends() {
    let dir = tempfile::tempdir().unwrap();
    let file_store = FileTaskStore::new(dir.path().to_path_buf()).await.unwrap();
    let memory_store = MemoryTaskStore::new();

    for store in [&file_store as &dyn TaskStore, &memory_store as &dyn TaskStore] {
        let a = task("u1", "content_writer");
        let b = task("u1", "trend_analyst");
        let c = task("u2", "content_writer");
        store.insert(&a).await.unwrap();
        store.insert(&b).await.unwrap();
        store.insert(&c).await.unwrap();
        store
            .transition(b.id, TaskState::Running, TaskOutcome::None)
            .await
            .unwrap();

        let all = store.list_for_owner("u1", None).await.unwrap();
        assert_eq!(all.len(), 2);

        let running = store
            .list_for_owner("u1", Some(TaskState::Running))
            .await
            .unwrap();
        assert_eq!(running.len(), 1);
        assert_eq!(running[0].id, b.id);

        let counts = store.running_by_role().await.unwrap();
        assert_eq!(counts.get("trend_analyst"), Some(&1));
        assert_eq!(counts.get("content_writer"), None);
    }
}
