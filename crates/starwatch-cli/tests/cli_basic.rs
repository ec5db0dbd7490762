//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs. Each test
//! points STARWATCH_DATA_DIR at its own temporary directory.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return output.
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-q", "-p", "starwatch-cli", "--"])
        .args(args)
        .env("STARWATCH_DATA_DIR", data_dir)
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_tick_single_event() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["tick", "--at", "2026-03-04 10:05"]);
    assert_eq!(code, 0, "tick failed");
    assert_eq!(stdout.trim(), "Svanir Shaman Chief will spawn in 10 minutes!");
}

#[test]
fn test_tick_multiple_events() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["tick", "--at", "2026-03-03 03:20"]);
    assert_eq!(code, 0, "tick failed");
    assert!(stdout.starts_with("Multiple events starting in 10 minutes!"));
    assert!(stdout.contains("...and 2 more events"));
}

#[test]
fn test_tick_nothing_due() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["tick", "--at", "2026-03-04 10:06"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("no events due"));
}

#[test]
fn test_tick_json() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(
        dir.path(),
        &["tick", "--at", "2026-03-04 16:00", "--offset", "0", "--json"],
    );
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let ids: Vec<&str> = parsed
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c["event_id"].as_str())
        .collect();
    assert!(ids.contains(&"tequatl"));
}

#[test]
fn test_notify_set_persists() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["notify", "set", "category:core", "false"]);
    assert_eq!(code, 0, "notify set failed");
    assert!(stdout.contains("event:tequatl false"));

    let (stdout, _, code) = run_cli(dir.path(), &["notify", "get", "event:tequatl"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "false");

    let (stdout, _, _) = run_cli(dir.path(), &["tick", "--at", "2026-03-04 10:05"]);
    assert!(stdout.contains("no events due"));
}

#[test]
fn test_notify_unknown_id_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["notify", "get", "event:nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_offset_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["offset", "get"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "10");

    let (_, _, code) = run_cli(dir.path(), &["offset", "set", "7"]);
    assert_eq!(code, 1, "offset outside choices must fail");

    let (_, _, code) = run_cli(dir.path(), &["offset", "set", "15"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["offset", "get"]);
    assert_eq!(stdout.trim(), "15");
}

#[test]
fn test_festival_ongoing() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["festival", "--at", "2026-10-14 12:00"]);
    assert_eq!(code, 0);
    assert!(stdout.starts_with("Halloween"));
    assert!(stdout.contains("Ending in 20 days and 5 hours"));
}

#[test]
fn test_festival_upcoming() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["festival", "--at", "2026-03-01 00:00"]);
    assert_eq!(code, 0);
    assert!(stdout.starts_with("Next festival: Dragon Bash"));
}

#[test]
fn test_rotation_for_date() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["rotation", "--date", "2026-03-03"]);
    assert_eq!(code, 0);
    let first = stdout.lines().nth(1).unwrap_or_default();
    assert!(first.starts_with("r4"), "unexpected rotation: {stdout}");
}

#[test]
fn test_timetable_single_event() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["timetable", "tequatl"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("00:00 03:00 07:00 11:30 16:00 19:00"));

    let (_, _, code) = run_cli(dir.path(), &["timetable", "nope"]);
    assert_eq!(code, 1);
}

#[test]
fn test_config_get_set() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "scheduler.cooldown_secs"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "60");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "scheduler.cooldown_secs", "30"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "scheduler.cooldown_secs"]);
    assert_eq!(stdout.trim(), "30");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "scheduler.nope", "1"]);
    assert_eq!(code, 1);

    let (_, _, code) = run_cli(dir.path(), &["config", "reset"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "list"]);
    assert!(stdout.contains("scheduler.cooldown_secs = 60"));
}

#[test]
fn test_custom_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = dir.path().join("catalog.toml");
    std::fs::write(
        &catalog,
        r#"
[[categories]]
id = "core"
name = "Core"

[[events]]
id = "claw"
name = "Claw of Jormag"
category = "core"
kind = "world_boss"
map = "Frostgorge Sound"
time = "02:30"
frequency_hours = 3
"#,
    )
    .unwrap();
    let path = catalog.to_string_lossy().to_string();
    let (stdout, _, code) = run_cli(
        dir.path(),
        &["--catalog", &path, "tick", "--at", "2026-03-04 05:20"],
    );
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "Claw of Jormag will spawn in 10 minutes!");
}

#[test]
fn test_notify_list_nests_members() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["notify", "list"]);
    assert_eq!(code, 0);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "category:core on");
    assert_eq!(lines[1], "  subgroup:core/standard on");
    assert_eq!(lines[2], "    event:admiral-taidha on");
}
