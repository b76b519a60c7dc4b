//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs. They run
//! against the dev data directory (THIKR_ENV=dev), never the user's real
//! settings.

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "thikr-cli", "--"])
        .args(args)
        .env("THIKR_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_config_get() {
    let (stdout, _, code) = run_cli(&["config", "get", "reminder.enabled"]);
    assert_eq!(code, 0, "config get failed");
    assert!(stdout.contains("true") || stdout.contains("false"));
}

#[test]
fn test_config_get_unknown_key_fails() {
    let (_, stderr, code) = run_cli(&["config", "get", "reminder.no_such_key"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_config_set_then_get() {
    let (_, _, code) = run_cli(&["config", "set", "surah.interval_days", "4"]);
    assert_eq!(code, 0, "config set failed");
    let (stdout, _, code) = run_cli(&["config", "get", "surah.interval_days"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "4");
}

#[test]
fn test_config_list_is_json() {
    let (stdout, _, code) = run_cli(&["config", "list"]);
    assert_eq!(code, 0, "config list failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("list output is JSON");
    assert!(parsed.get("reminder").is_some());
    assert!(parsed.get("surah").is_some());
}

#[test]
fn test_config_set_rejects_bad_type() {
    let (_, _, code) = run_cli(&["config", "set", "reminder.enabled", "maybe"]);
    assert_ne!(code, 0);
}

#[test]
fn test_stats_show() {
    let (stdout, _, code) = run_cli(&["stats", "show"]);
    assert_eq!(code, 0, "stats show failed");
    assert!(stdout.contains("today:"));
    assert!(stdout.contains("total:"));
}

#[test]
fn test_show_prints_a_reminder() {
    let (stdout, _, code) = run_cli(&["show"]);
    assert_eq!(code, 0, "show failed");
    assert!(stdout.contains("ذِكْر"));
}

#[test]
fn test_show_surah() {
    let (stdout, _, code) = run_cli(&["show", "--surah"]);
    assert_eq!(code, 0, "show --surah failed");
    assert!(stdout.contains("📖"));
}

#[test]
fn test_athkar_add_then_remove() {
    let (stdout, _, code) = run_cli(&["athkar", "add", "ذكر تجريبي", "--virtue", "فضل"]);
    assert_eq!(code, 0, "athkar add failed");
    assert!(stdout.contains("added"));

    let (stdout, _, code) = run_cli(&["athkar", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("ذكر تجريبي"));

    // Remove the last listed item (the one just added).
    let position = stdout.lines().filter(|l| l.contains('.')).count();
    let (stdout, _, code) = run_cli(&["athkar", "remove", &position.to_string()]);
    assert_eq!(code, 0, "athkar remove failed");
    assert!(stdout.contains("removed"));
}

#[test]
fn test_athkar_remove_out_of_range_fails() {
    let (_, stderr, code) = run_cli(&["athkar", "remove", "999"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("no item"));
}

#[test]
fn test_athkar_morning_sequence() {
    let (stdout, _, code) = run_cli(&["athkar", "morning"]);
    assert_eq!(code, 0, "athkar morning failed");
    assert!(stdout.contains("[1/13]"));
    assert!(stdout.contains("[13/13]"));
}

#[test]
fn test_athkar_evening_sequence() {
    let (stdout, _, code) = run_cli(&["athkar", "evening"]);
    assert_eq!(code, 0, "athkar evening failed");
    assert!(stdout.contains("[14/14]"));
}
