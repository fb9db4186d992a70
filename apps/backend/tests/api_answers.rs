//! Integration tests for answer submission.

mod common;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::Value;

use common::{fixtures, TestContext};
use skilldrill_core::LedgerKey;

#[tokio::test]
async fn test_correct_answer() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let response = TestContext::submit(&server, "alice", "docker", "ps", "docker ps").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["correct"], true);
}

#[tokio::test]
async fn test_normalized_answer_ignores_case_and_spacing() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let response = TestContext::submit(&server, "alice", "docker", "ps", "  DOCKER    ps ").await;

    let body: Value = response.json();
    assert_eq!(body["correct"], true);
}

#[tokio::test]
async fn test_incorrect_answer() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let response = TestContext::submit(&server, "alice", "docker", "ps", "docker ls").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["correct"], false);
}

#[tokio::test]
async fn test_exact_answer_is_case_sensitive() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let wrong = TestContext::submit(&server, "alice", "docker", "version", "Docker --version").await;
    let right = TestContext::submit(&server, "alice", "docker", "version", "docker --version").await;

    assert_eq!(wrong.json::<Value>()["correct"], false);
    assert_eq!(right.json::<Value>()["correct"], true);
}

#[tokio::test]
async fn test_regex_answer_is_anchored() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let accepted =
        TestContext::submit(&server, "alice", "docker", "inspect", "docker image inspect nginx").await;
    let rejected =
        TestContext::submit(&server, "alice", "docker", "inspect", "echo docker inspect nginx").await;

    assert_eq!(accepted.json::<Value>()["correct"], true);
    assert_eq!(rejected.json::<Value>()["correct"], false);
}

#[tokio::test]
async fn test_defective_rules_grade_incorrect() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let unknown_mode = TestContext::submit(&server, "alice", "broken", "fuzzy", "ls").await;
    let bad_pattern = TestContext::submit(&server, "alice", "broken", "unclosed", "ls -la").await;

    unknown_mode.assert_status_ok();
    bad_pattern.assert_status_ok();
    assert_eq!(unknown_mode.json::<Value>()["correct"], false);
    assert_eq!(bad_pattern.json::<Value>()["correct"], false);

    // Both attempts are recorded as failures.
    let (completed, total) = TestContext::ring(&server, "alice", "broken").await;
    assert_eq!((completed, total), (0, 2));
    let ledger = ctx
        .state
        .db
        .find_ledger(&LedgerKey::new("alice", "broken"))
        .await
        .unwrap()
        .unwrap()
        .to_core_ledger()
        .unwrap();
    assert_eq!(ledger.failed().len(), 2);
}

#[tokio::test]
async fn test_unknown_item_is_rejected_without_writing() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let response = TestContext::submit(&server, "alice", "docker", "rmi", "docker rmi x").await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"], "unknown_topic_or_item");
    assert_eq!(body["retryable"], false);

    let row = ctx
        .state
        .db
        .find_ledger(&LedgerKey::new("alice", "docker"))
        .await
        .unwrap();
    assert!(row.is_none());
}

#[tokio::test]
async fn test_unknown_topic_is_rejected() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let response = TestContext::submit(&server, "alice", "kubernetes", "pods", "kubectl get pods").await;

    response.assert_status(StatusCode::NOT_FOUND);
    let row = ctx
        .state
        .db
        .find_ledger(&LedgerKey::new("alice", "kubernetes"))
        .await
        .unwrap();
    assert!(row.is_none());
}

#[tokio::test]
async fn test_missing_user_header_is_unauthorized() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let response = server
        .post("/api/topics/docker/items/ps/answer")
        .json(&fixtures::answer_request("docker ps"))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_blank_user_header_is_unauthorized() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let (name, value) = TestContext::user("   ");

    let response = server
        .post("/api/topics/docker/items/ps/answer")
        .add_header(name, value)
        .json(&fixtures::answer_request("docker ps"))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_persistence_failure_reports_no_grade() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    ctx.state.db.pool().close().await;

    let response = TestContext::submit(&server, "alice", "docker", "ps", "docker ps").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["error"], "persistence_error");
    assert_eq!(body["retryable"], true);
    assert!(body.get("correct").is_none());
}
