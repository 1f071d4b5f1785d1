mod common;

use std::sync::Arc;

use hooksmith::{
    AgentResponse, Executor, MsgStatus, NoopSink, OutputSnapshot, RecordingSink, SessionState,
    SessionStatus, SqliteStorage, Storage,
};
use serde_json::json;
use tempfile::TempDir;

use common::{MockLlmProvider, MockVideoDb, Outcome, TEMPLATE_REPLY, hook_args, hook_registry};

#[tokio::test]
async fn test_save_and_load_session() {
    let tmp_dir = TempDir::new().expect("create temp dir");
    let db_path = tmp_dir.path().join("sessions.db");
    let storage = SqliteStorage::new(&db_path).expect("create storage");

    let session = SessionState::new("hook_template", hook_args());
    let session_id = session.id.clone();

    storage.save(&session).await.expect("save should succeed");

    let loaded = storage
        .load(&session_id)
        .await
        .expect("load should succeed")
        .expect("session should exist");

    assert_eq!(loaded.id, session_id);
    assert_eq!(loaded.agent, "hook_template");
    assert_eq!(loaded.arguments, hook_args());
    assert_eq!(loaded.status, SessionStatus::Pending);
}

#[tokio::test]
async fn test_list_sessions() {
    let tmp_dir = TempDir::new().expect("create temp dir");
    let db_path = tmp_dir.path().join("sessions.db");
    let storage = SqliteStorage::new(&db_path).expect("create storage");

    for _ in 0..3 {
        storage
            .save(&SessionState::new("hook_template", json!({})))
            .await
            .expect("save");
    }

    let sessions = storage.list().await.expect("list should succeed");
    assert_eq!(sessions.len(), 3);
}

#[tokio::test]
async fn test_delete_session() {
    let tmp_dir = TempDir::new().expect("create temp dir");
    let db_path = tmp_dir.path().join("sessions.db");
    let storage = SqliteStorage::new(&db_path).expect("create storage");

    let session = SessionState::new("hook_template", json!({}));
    let session_id = session.id.clone();
    storage.save(&session).await.expect("save should succeed");

    storage
        .delete(&session_id)
        .await
        .expect("delete should succeed");

    let loaded = storage
        .load(&session_id)
        .await
        .expect("load should succeed");
    assert!(loaded.is_none());
}

#[tokio::test]
async fn test_finished_session_round_trips() {
    let tmp_dir = TempDir::new().expect("create temp dir");
    let storage = SqliteStorage::new(tmp_dir.path().join("sessions.db")).expect("create storage");

    let mut session = SessionState::new("hook_template", hook_args());
    session.finish(
        AgentResponse::success("done").with_data("template", "Hook Script:\n\"x\"\n"),
        OutputSnapshot {
            session_id: session.id.clone(),
            actions: vec!["Generating hook template...".to_string()],
            content: Vec::new(),
            status: MsgStatus::Success,
        },
    );
    storage.save(&session).await.expect("save");

    let loaded = storage
        .load(&session.id)
        .await
        .expect("load")
        .expect("exists");
    assert_eq!(loaded.status, SessionStatus::Completed);
    assert_eq!(loaded.template(), Some("Hook Script:\n\"x\"\n"));
    assert_eq!(loaded.output.expect("output").actions.len(), 1);
}

#[tokio::test]
async fn test_executor_persists_successful_session() {
    let tmp_dir = TempDir::new().expect("create temp dir");
    let db_path = tmp_dir.path().join("sessions.db");
    let storage = SqliteStorage::new(&db_path).expect("create storage");
    let registry = hook_registry(MockLlmProvider::replying(TEMPLATE_REPLY), MockVideoDb::new());
    let executor = Executor::with_storage(registry, Box::new(storage));
    let sink = Arc::new(RecordingSink::default());

    let session = executor
        .invoke_with_session("hook_template", hook_args(), sink.clone())
        .await
        .expect("session should complete");

    assert_eq!(session.status, SessionStatus::Completed);
    assert_eq!(sink.published().len(), 1);
    assert_eq!(sink.published()[0].session_id, session.id);

    // Verify session was persisted as completed
    let storage2 = SqliteStorage::new(&db_path).expect("reopen storage");
    let loaded = storage2
        .load(&session.id)
        .await
        .expect("load should succeed")
        .expect("session should exist");

    assert_eq!(loaded.status, SessionStatus::Completed);
    assert!(loaded.template().expect("template").starts_with("Hook Script:"));
    assert_eq!(
        loaded.output.expect("output").status,
        MsgStatus::Success
    );
}

#[tokio::test]
async fn test_executor_persists_failed_session() {
    let tmp_dir = TempDir::new().expect("create temp dir");
    let storage = SqliteStorage::new(tmp_dir.path().join("sessions.db")).expect("create storage");
    let db = MockVideoDb::new().transcripts(vec![Outcome::Fail("no transcript")]);
    let registry = hook_registry(MockLlmProvider::replying(TEMPLATE_REPLY), db);
    let executor = Executor::with_storage(registry, Box::new(storage));

    let session = executor
        .invoke_with_session("hook_template", hook_args(), Arc::new(NoopSink))
        .await
        .expect("failure is recorded, not returned");

    assert_eq!(session.status, SessionStatus::Failed);
    assert!(session.error.as_ref().expect("error").contains("no transcript"));
    assert!(session.template().is_none());

    let listed = executor.storage().expect("storage").list().await.expect("list");
    assert_eq!(listed[0].status, SessionStatus::Failed);
}

#[tokio::test]
async fn test_invoke_with_session_requires_storage() {
    let registry = hook_registry(MockLlmProvider::replying(TEMPLATE_REPLY), MockVideoDb::new());
    let executor = Executor::new(registry);

    let result = executor
        .invoke_with_session("hook_template", hook_args(), Arc::new(NoopSink))
        .await;

    assert!(result.is_err());
}
