//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary with `FOCUSFOREST_HOME` pointed at a
//! temporary directory and verify outputs.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_focusforest"))
        .args(args)
        .env("FOCUSFOREST_HOME", home)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Run a CLI command and expect success.
fn run_cli_success(home: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "CLI command failed with code {code}: {args:?}\n{stderr}");
    stdout
}

fn parse_json(json: &str) -> serde_json::Value {
    serde_json::from_str(json).expect("Failed to parse JSON output")
}

fn event_types(report: &serde_json::Value) -> Vec<String> {
    report["events"]
        .as_array()
        .expect("events array")
        .iter()
        .map(|e| e["type"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[test]
fn test_simulate_full_session_json() {
    let home = tempfile::tempdir().unwrap();
    let out = run_cli_success(
        home.path(),
        &["simulate", "--duration", "5", "--ticks", "5", "--json"],
    );
    let report = parse_json(&out);
    assert_eq!(
        event_types(&report),
        ["SessionStarted", "SessionCompleted", "SessionReset"]
    );
    assert_eq!(report["final"]["status"], "idle");
    assert_eq!(report["final"]["remaining_secs"], 5);
    assert_eq!(report["final"]["forest"].as_array().unwrap().len(), 1);
    assert_eq!(report["final"]["forest"][0]["id"], 1);
}

#[test]
fn test_simulate_hide_withers() {
    let home = tempfile::tempdir().unwrap();
    let out = run_cli_success(
        home.path(),
        &["simulate", "--duration", "60", "--ticks", "20", "--hide-at", "10", "--json"],
    );
    let report = parse_json(&out);
    assert_eq!(
        event_types(&report),
        ["SessionStarted", "SessionInterrupted", "SessionReset"]
    );
    assert_eq!(report["events"][1]["remaining_secs"], 50);
    assert_eq!(report["final"]["remaining_secs"], 60);
    assert!(report["final"]["forest"].as_array().unwrap().is_empty());
}

#[test]
fn test_simulate_confirm_continue() {
    let home = tempfile::tempdir().unwrap();
    let out = run_cli_success(
        home.path(),
        &[
            "simulate", "--duration", "60", "--ticks", "10", "--hide-at", "3", "--policy",
            "confirm", "--answer", "continue", "--json",
        ],
    );
    let report = parse_json(&out);
    assert_eq!(
        event_types(&report),
        ["SessionStarted", "WarningRaised", "WarningDismissed"]
    );
    assert_eq!(report["events"][1]["remaining_secs"], 57);
    assert_eq!(report["final"]["status"], "running");
    assert_eq!(report["final"]["remaining_secs"], 50);
}

#[test]
fn test_simulate_text_output() {
    let home = tempfile::tempdir().unwrap();
    let out = run_cli_success(home.path(), &["simulate", "--duration", "2", "--ticks", "2"]);
    assert!(out.contains("Congratulations!"));
    assert!(out.contains("Your Forest (1 trees)"));
}

#[test]
fn test_simulate_rejects_bad_policy() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["simulate", "--ticks", "1", "--policy", "later"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown visibility policy"));
}

#[test]
fn test_config_set_get_roundtrip() {
    let home = tempfile::tempdir().unwrap();
    assert_eq!(
        run_cli_success(home.path(), &["config", "get", "session.duration_secs"]).trim(),
        "1500"
    );
    assert_eq!(
        run_cli_success(home.path(), &["config", "set", "session.visibility_policy", "confirm"]).trim(),
        "ok"
    );
    assert_eq!(
        run_cli_success(home.path(), &["config", "get", "session.visibility_policy"]).trim(),
        "confirm"
    );
    assert!(home.path().join("config.toml").exists());

    let list = parse_json(&run_cli_success(home.path(), &["config", "list"]));
    assert_eq!(list["session"]["visibility_policy"], "confirm");

    run_cli_success(home.path(), &["config", "reset"]);
    assert_eq!(
        run_cli_success(home.path(), &["config", "get", "session.visibility_policy"]).trim(),
        "immediate"
    );
}

#[test]
fn test_config_rejects_unknown_and_invalid() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "get", "session.nope"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown key"));

    let (_, _, code) = run_cli(home.path(), &["config", "set", "session.duration_secs", "0"]);
    assert_ne!(code, 0);
    assert_eq!(
        run_cli_success(home.path(), &["config", "get", "session.duration_secs"]).trim(),
        "1500"
    );
}

#[test]
fn test_config_rejects_out_of_range_hold() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(
        home.path(),
        &["config", "set", "session.hold_ms", "18446744073709551615"],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("session.hold_ms"), "{stderr}");
    assert_eq!(
        run_cli_success(home.path(), &["config", "get", "session.hold_ms"]).trim(),
        "3000"
    );

    let (_, _, code) = run_cli(home.path(), &["run", "--tick-ms", "3600000"]);
    assert_ne!(code, 0);
}

#[test]
fn test_config_path_honors_home_override() {
    let home = tempfile::tempdir().unwrap();
    let out = run_cli_success(home.path(), &["config", "path"]);
    assert!(out.trim().ends_with("config.toml"));
    assert!(out.contains(&*home.path().to_string_lossy()));
}

#[test]
fn test_run_reads_commands_from_stdin() {
    let home = tempfile::tempdir().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_focusforest"))
        .args(["run", "--duration", "60", "--hold-ms", "0"])
        .env("FOCUSFOREST_HOME", home.path())
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"forest\nplant\nquit\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("Focus Forest"));
    assert!(stdout.contains("1:00"));
    assert!(stdout.contains("Your forest is empty"));
    assert!(stdout.contains("unknown command: plant"));
}
