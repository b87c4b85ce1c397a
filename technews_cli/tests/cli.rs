use assert_cmd::Command;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn technews(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("technews").unwrap();
    cmd.current_dir(dir.path()).env_remove("TECHNEWS_CONNECTION");
    cmd
}

fn initialized() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("news.db");
    technews(&dir)
        .args(["init", "sqlite", db.to_str().unwrap()])
        .assert()
        .success();
    technews(&dir).arg("migrate").assert().success();
    dir
}

fn json_output(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn init_saves_connection() {
    let dir = initialized();
    assert!(dir.path().join(".technews/connection.json").exists());
}

#[test]
fn init_unknown_backend() {
    let dir = tempfile::tempdir().unwrap();
    let assert = technews(&dir)
        .args(["init", "oracle", "scott@tiger"])
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("Unknown backend oracle"), "{stderr}");
}

#[test]
fn commands_need_init() {
    let dir = tempfile::tempdir().unwrap();
    let assert = technews(&dir).arg("migrate").assert().failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("technews init"), "{stderr}");
}

#[test]
fn add_and_show_user() {
    let dir = initialized();
    let added = json_output(technews(&dir).args(["user", "add", "alice", "alice@example.com", "pw"]));
    assert_eq!(added["username"], "alice");
    let id = added["id"].as_i64().unwrap();

    let shown = json_output(technews(&dir).args(["user", "show", id.to_string().as_str()]));
    assert_eq!(shown["email"], "alice@example.com");
    assert_eq!(shown["posts"], serde_json::json!([]));
    assert_eq!(shown["votes"], serde_json::json!([]));

    let by_email = json_output(technews(&dir).args(["user", "show", "alice@example.com"]));
    assert_eq!(by_email["id"], id);
}

#[test]
fn duplicate_email_fails() {
    let dir = initialized();
    technews(&dir)
        .args(["user", "add", "alice", "alice@example.com", "pw"])
        .assert()
        .success();
    let assert = technews(&dir)
        .args(["user", "add", "other", "alice@example.com", "pw"])
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("user.email"), "{stderr}");

    let users = json_output(technews(&dir).args(["user", "list"]));
    assert_eq!(users.as_array().unwrap().len(), 1);
}

#[test]
fn delete_user_with_content() {
    let dir = initialized();
    json_output(technews(&dir).args(["user", "add", "alice", "alice@example.com", "pw"]));
    json_output(technews(&dir).args(["user", "add", "bob", "bob@example.com", "pw"]));
    let post = json_output(technews(&dir).args([
        "post",
        "add",
        "alice@example.com",
        "Show HN",
        "https://example.com",
    ]));
    let post_id = post["id"].as_i64().unwrap().to_string();
    json_output(technews(&dir).args(["vote", "add", "bob@example.com", post_id.as_str()]));
    json_output(technews(&dir).args(["comment", "add", "bob@example.com", post_id.as_str(), "neat"]));

    technews(&dir)
        .args(["user", "delete", "alice@example.com"])
        .assert()
        .success();

    let bob = json_output(technews(&dir).args(["user", "show", "bob@example.com"]));
    assert_eq!(bob["votes"], serde_json::json!([]));
    assert_eq!(bob["comments"], serde_json::json!([]));
    technews(&dir)
        .args(["user", "show", "alice@example.com"])
        .assert()
        .failure();
}

#[test]
fn connection_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    let conn = format!("sqlite:{}", dir.path().join("env.db").display());
    technews(&dir)
        .env("TECHNEWS_CONNECTION", &conn)
        .arg("migrate")
        .assert()
        .success();
    let users = json_output(
        technews(&dir)
            .env("TECHNEWS_CONNECTION", &conn)
            .args(["user", "list"]),
    );
    assert_eq!(users, serde_json::json!([]));
    assert!(!dir.path().join(".technews").exists());
}

#[test]
fn clear_data_removes_users() {
    let dir = initialized();
    json_output(technews(&dir).args(["user", "add", "alice", "alice@example.com", "pw"]));
    technews(&dir).arg("clear-data").assert().success();
    let users = json_output(technews(&dir).args(["user", "list"]));
    assert_eq!(users, serde_json::json!([]));
}
