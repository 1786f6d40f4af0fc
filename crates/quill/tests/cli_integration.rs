//! CLI integration tests for the Quill command-line interface.
//!
//! These tests verify:
//! - Help text and argument parsing
//! - Session commands against an isolated config directory
//! - A full login/status/logout round against a mock backend

use assert_cmd::Command;
use predicates::prelude::*;
use quill_session::unsigned_token;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Get a command for the quill binary with its config dir pointed at `dir`.
fn quill(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("quill").unwrap();
    cmd.env("QUILL_CONFIG_DIR", dir.path())
        .env_remove("QUILL_SERVER_URL")
        .env_remove("QUILL_PASSWORD");
    cmd
}

// ─────────────────────────────────────────────────────────────────────────────
// Help and Parsing
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    quill(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("logout"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("posts"))
        .stdout(predicate::str::contains("publish"))
        .stdout(predicate::str::contains("register"));
}

#[test]
fn test_version_displays() {
    let dir = TempDir::new().unwrap();
    quill(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("quill"));
}

#[test]
fn test_post_requires_an_id() {
    let dir = TempDir::new().unwrap();
    quill(&dir)
        .args(["post", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_post_rejects_non_numeric_owner() {
    let dir = TempDir::new().unwrap();
    quill(&dir)
        .args(["post", "martin", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_publish_requires_title_and_file() {
    let dir = TempDir::new().unwrap();
    quill(&dir).args(["publish", "0"]).assert().failure();
}

// ─────────────────────────────────────────────────────────────────────────────
// Offline Session Commands
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_status_when_logged_out() {
    let dir = TempDir::new().unwrap();
    quill(&dir)
        .args(["--json", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"logged_in\": false"));
}

#[test]
fn test_logout_is_idempotent() {
    let dir = TempDir::new().unwrap();
    quill(&dir)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in."));
    quill(&dir).arg("logout").assert().success();
}

#[test]
fn test_publish_requires_login() {
    let dir = TempDir::new().unwrap();
    let body = dir.path().join("post.md");
    std::fs::write(&body, "# Hello").unwrap();

    quill(&dir)
        .args(["publish", "0", "--title", "Hello", "--file"])
        .arg(&body)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Against a Mock Backend
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_login_status_logout_round() {
    let server = MockServer::start().await;
    let token = unsigned_token(&json!({"sub": "0", "exp": 4_000_000_000i64}));
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": &token})))
        .expect(1)
        .mount(&server)
        .await;
    // Looked up once after login and once by status.
    Mock::given(method("GET"))
        .and(path("/api/user/0"))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": {
            "id": 0, "name": "martin", "posts": []
        }})))
        .expect(2)
        .mount(&server)
        .await;

    let uri = server.uri();
    let dir = TempDir::new().unwrap();
    quill(&dir)
        .args(["--server", uri.as_str(), "login", "--name", "martin", "--password", "martin4817"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as martin (user 0)"));

    assert!(dir.path().join("jwt").exists());

    quill(&dir)
        .args(["--server", uri.as_str(), "--json", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"logged_in\": true"))
        .stdout(predicate::str::contains("\"user_id\": 0"))
        .stdout(predicate::str::contains("\"user_name\": \"martin\""));

    quill(&dir)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out."));
    assert!(!dir.path().join("jwt").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_post_reports_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/user/0/post/99"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "not found"})))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let dir = TempDir::new().unwrap();
    quill(&dir)
        .args(["--server", uri.as_str(), "post", "0", "99", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"))
        .stderr(predicate::str::contains("2 of 2 posts"));
}
