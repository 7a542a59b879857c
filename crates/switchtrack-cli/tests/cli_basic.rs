//! Basic CLI E2E tests.
//!
//! Tests run the built binary, feed session commands through stdin and
//! verify outputs. Each test points `--config` at a scratch directory.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Run the CLI with `args` and `stdin`, returning (code, stdout, stderr).
fn run_cli(config: &Path, args: &[&str], stdin: &str) -> (i32, String, String) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_switchtrack"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("SWITCHTRACK_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_bytes())
        .expect("Failed to write stdin");

    let output = child.wait_with_output().expect("Failed to wait for CLI");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (output.status.code().unwrap_or(-1), stdout, stderr)
}

fn json_lines(stdout: &str) -> Vec<serde_json::Value> {
    stdout
        .lines()
        .map(|l| serde_json::from_str(l).expect("every line is JSON"))
        .collect()
}

#[test]
fn test_session_json_flow() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let (code, stdout, _) = run_cli(
        &config,
        &["session", "--json"],
        "start writing\nswitch review\nend\nhistory\nquit\n",
    );
    assert_eq!(code, 0);

    let docs = json_lines(&stdout);
    let types: Vec<_> = docs.iter().map(|d| d["type"].as_str().unwrap()).collect();
    assert_eq!(
        types,
        vec![
            "task_name_changed",
            "task_started",
            "task_switched",
            "task_name_changed",
            "task_started",
            "session_ended",
            "history",
            "metrics",
        ]
    );
    let records = docs[6]["records"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["name"], "review");
    assert_eq!(records[1]["name"], "writing");
}

#[test]
fn test_session_metrics_on_eof() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let (code, stdout, _) = run_cli(&config, &["session", "--json"], "start a\n");
    assert_eq!(code, 0);

    let docs = json_lines(&stdout);
    let last = docs.last().unwrap();
    assert_eq!(last["type"], "metrics");
    assert_eq!(last["metrics"]["switch_count"], 1);
    assert_eq!(last["metrics"]["completed_tasks"], 1);
}

#[test]
fn test_session_ignores_guarded_commands() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let (code, stdout, _) = run_cli(&config, &["session"], "start\nswitch\nbogus\nstatus\n");
    assert_eq!(code, 0);
    assert!(stdout.contains("start ignored: enter a task name first"));
    assert!(stdout.contains("switch ignored: no task is being tracked"));
    assert!(stdout.contains("error: unknown command 'bogus'"));
    assert!(stdout.lines().any(|l| l == "idle"));
}

#[test]
fn test_config_set_and_get() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    let (code, stdout, _) = run_cli(&config, &["config", "get", "metrics.refocus_cost_min"], "");
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "23");

    let (code, _, _) = run_cli(&config, &["config", "set", "metrics.refocus_cost_min", "10"], "");
    assert_eq!(code, 0);

    let (_, stdout, _) = run_cli(&config, &["config", "get", "metrics.refocus_cost_min"], "");
    assert_eq!(stdout.trim(), "10");
}

#[test]
fn test_config_rejects_unknown_key() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let (code, _, stderr) = run_cli(&config, &["config", "set", "metrics.nope", "1"], "");
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown config key"));
}

#[test]
fn test_config_drives_session_metrics() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    run_cli(&config, &["config", "set", "metrics.refocus_cost_min", "7"], "");

    let (code, stdout, _) = run_cli(&config, &["session", "--json"], "start a\nend\nmetrics\n");
    assert_eq!(code, 0);
    let docs = json_lines(&stdout);
    let metrics = docs.iter().find(|d| d["type"] == "metrics").unwrap();
    assert_eq!(metrics["metrics"]["estimated_lost_minutes"], 7);
}

#[test]
fn test_zero_tick_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let (code, _, stderr) = run_cli(&config, &["session", "--tick-ms", "0"], "");
    assert_eq!(code, 1);
    assert!(stderr.contains("--tick-ms"));
}

#[test]
fn test_config_rejects_oversized_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    let (code, _, stderr) = run_cli(
        &config,
        &[
            "config",
            "set",
            "metrics.deep_work_threshold_min",
            "18446744073709551615",
        ],
        "",
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("metrics.deep_work_threshold_min"));

    let (code, stdout, _) = run_cli(&config, &["session", "--json"], "start a\nend\n");
    assert_eq!(code, 0);
    assert!(stdout.contains("\"deep_work_threshold_ms\":1500000"));
}
