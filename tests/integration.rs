use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn wicket_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("wicket");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_content = format!(
        r#"[db]
path = "{}/data/wiki.sqlite"

[content]
root = "{}/content"

[git]
author_name = "wiki-bot"
author_email = "wiki-bot@example.com"
"#,
        root.display(),
        root.display()
    );

    let config_path = root.join("wicket.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_wicket(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = wicket_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run wicket binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_init_creates_database_and_content_root() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_wicket(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data/wiki.sqlite").exists());
    assert!(tmp.path().join("content/.git").exists());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_wicket(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_wicket(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_add_then_view_round_trip() {
    let (tmp, config_path) = setup_test_env();
    run_wicket(&config_path, &["init"]);

    let (stdout, stderr, success) = run_wicket(
        &config_path,
        &[
            "add",
            "--title",
            "Hello, World?",
            "--text",
            "first body",
            "--allowed",
            "eng",
        ],
    );
    assert!(success, "add failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Created 'Hello-World'"));

    let (stdout, _, success) =
        run_wicket(&config_path, &["view", "Hello-World", "--groups", "eng"]);
    assert!(success, "view failed: {}", stdout);
    assert!(stdout.contains("first body"));
    assert!(stdout.contains("slug:   Hello-World"));

    // The content mirror holds the same text, committed.
    let mirrored = fs::read_to_string(tmp.path().join("content/Hello-World")).unwrap();
    assert_eq!(mirrored, "first body");

    let (stdout, _, success) = run_wicket(&config_path, &["history", "Hello-World"]);
    assert!(success);
    assert!(stdout.contains("Change to \"Hello-World\"."));
    assert!(stdout.contains("wiki-bot"));
}

#[test]
fn test_anonymous_sees_nothing() {
    let (_tmp, config_path) = setup_test_env();
    run_wicket(&config_path, &["init"]);
    run_wicket(
        &config_path,
        &["add", "--title", "Secret", "--text", "body", "--allowed", "eng"],
    );

    let (stdout, _, success) = run_wicket(&config_path, &["list"]);
    assert!(success);
    assert!(stdout.contains("No entries visible."));

    let (_, stderr, success) = run_wicket(&config_path, &["view", "Secret"]);
    assert!(!success);
    assert!(stderr.contains("no entry matches"), "stderr: {}", stderr);
}

#[test]
fn test_admin_sees_slug_collisions_others_dedup() {
    let (_tmp, config_path) = setup_test_env();
    run_wicket(&config_path, &["init"]);
    run_wicket(
        &config_path,
        &["add", "--title", "x", "--text", "first", "--allowed", "eng"],
    );
    run_wicket(
        &config_path,
        &["add", "--title", "x", "--text", "second", "--allowed", "eng"],
    );

    let (stdout, _, _) = run_wicket(&config_path, &["list", "--groups", "admin"]);
    assert_eq!(stdout.matches("x  [").count(), 2, "admin list: {}", stdout);

    let (stdout, _, _) = run_wicket(&config_path, &["list", "--groups", "eng"]);
    assert_eq!(stdout.matches("x  [").count(), 1, "eng list: {}", stdout);

    // Exact view of the colliding slug refuses to guess.
    let (_, stderr, success) = run_wicket(&config_path, &["view", "x", "--groups", "eng"]);
    assert!(!success);
    assert!(stderr.contains("more than one entry"), "stderr: {}", stderr);
}

#[test]
fn test_edit_updates_both_stores() {
    let (tmp, config_path) = setup_test_env();
    run_wicket(&config_path, &["init"]);
    run_wicket(
        &config_path,
        &["add", "--title", "Page", "--text", "v1", "--allowed", "eng"],
    );

    let (stdout, stderr, success) = run_wicket(
        &config_path,
        &[
            "edit", "Page", "--text", "v2", "--allowed", "eng", "--groups", "eng",
        ],
    );
    assert!(success, "edit failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Saved edits"));

    let (stdout, _, _) = run_wicket(&config_path, &["view", "Page", "--groups", "eng"]);
    assert!(stdout.contains("v2"));

    let mirrored = fs::read_to_string(tmp.path().join("content/Page")).unwrap();
    assert_eq!(mirrored, "v2");

    let (stdout, _, _) = run_wicket(&config_path, &["history", "Page"]);
    assert_eq!(stdout.matches("Change to").count(), 2, "history: {}", stdout);
}

#[test]
fn test_edit_forbidden_without_shared_group() {
    let (_tmp, config_path) = setup_test_env();
    run_wicket(&config_path, &["init"]);
    run_wicket(
        &config_path,
        &["add", "--title", "Page", "--text", "v1", "--allowed", "eng"],
    );

    let (_, stderr, success) = run_wicket(
        &config_path,
        &[
            "edit", "Page", "--text", "v2", "--allowed", "eng", "--groups", "ops",
        ],
    );
    assert!(!success);
    assert!(stderr.contains("access denied"), "stderr: {}", stderr);
}

#[test]
fn test_archive_removes_live_entry_but_keeps_file() {
    let (tmp, config_path) = setup_test_env();
    run_wicket(&config_path, &["init"]);
    run_wicket(
        &config_path,
        &["add", "--title", "Page", "--text", "body", "--allowed", "eng"],
    );

    let (stdout, stderr, success) =
        run_wicket(&config_path, &["archive", "Page", "--groups", "eng"]);
    assert!(success, "archive failed: {}", stderr);
    assert!(stdout.contains("Archived 1 entry"));

    let (_, stderr, success) = run_wicket(&config_path, &["view", "Page", "--groups", "admin"]);
    assert!(!success);
    assert!(stderr.contains("no entry matches"));

    // Audit trail: the file and its history stay behind.
    assert!(tmp.path().join("content/Page").exists());
    let (stdout, _, success) = run_wicket(&config_path, &["history", "Page"]);
    assert!(success);
    assert!(stdout.contains("Change to \"Page\"."));
}

#[test]
fn test_search_is_substring_match() {
    let (_tmp, config_path) = setup_test_env();
    run_wicket(&config_path, &["init"]);
    run_wicket(
        &config_path,
        &["add", "--title", "note", "--text", "a", "--allowed", "eng"],
    );
    run_wicket(
        &config_path,
        &["add", "--title", "note taking", "--text", "b", "--allowed", "eng"],
    );

    let (stdout, _, success) = run_wicket(&config_path, &["search", "note", "--groups", "eng"]);
    assert!(success);
    assert!(stdout.contains("note "), "search results: {}", stdout);
    assert!(stdout.contains("note-taking"), "search results: {}", stdout);
}

#[test]
fn test_degraded_mirror_does_not_block_writes() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    // Content root nested under a regular file: every mirror write fails.
    fs::write(root.join("blocker"), "not a directory").unwrap();
    let config_content = format!(
        r#"[db]
path = "{}/data/wiki.sqlite"

[content]
root = "{}/blocker/content"
"#,
        root.display(),
        root.display()
    );
    let config_path = root.join("wicket.toml");
    fs::write(&config_path, config_content).unwrap();

    // Init migrates the database before it trips over the content
    // root, so the schema exists even though the command fails.
    let (_, _, init_ok) = run_wicket(&config_path, &["init"]);
    assert!(!init_ok);

    let (stdout, stderr, success) = run_wicket(
        &config_path,
        &["add", "--title", "Page", "--text", "body", "--allowed", "eng"],
    );
    assert!(success, "add failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Created 'Page'"));
    assert!(
        stderr.contains("content mirror is out of date"),
        "stderr: {}",
        stderr
    );

    // The entry is live and readable despite the dead mirror.
    let (stdout, _, success) = run_wicket(&config_path, &["view", "Page", "--groups", "eng"]);
    assert!(success);
    assert!(stdout.contains("body"));
}

#[test]
fn test_json_output_is_parseable() {
    let (_tmp, config_path) = setup_test_env();
    run_wicket(&config_path, &["init"]);
    run_wicket(
        &config_path,
        &["add", "--title", "Page", "--text", "body", "--allowed", "eng"],
    );

    let (stdout, _, success) = run_wicket(
        &config_path,
        &["view", "Page", "--groups", "eng", "--json"],
    );
    assert!(success);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["slug"], "Page");
    assert_eq!(parsed["text"], "body");
    assert!(parsed["allowed_groups"]
        .as_array()
        .unwrap()
        .iter()
        .any(|g| g == "admin"));
}
