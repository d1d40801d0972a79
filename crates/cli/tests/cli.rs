//! End-to-end tests running the built `nowexpr` binary.

use std::io::Write;
use std::process::{Command, Output, Stdio};

const ANCHOR: &str = "2024-03-15T14:30:45";

fn nowexpr() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_nowexpr"));
    cmd.args(["--anchor", ANCHOR, "--no-color"])
        .env_remove("NOWEXPR_WEEK_START")
        .env_remove("NOWEXPR_MODE");
    cmd
}

fn run(args: &[&str]) -> Output {
    nowexpr().args(args).output().expect("failed to run nowexpr")
}

fn run_with_stdin(args: &[&str], stdin: &str) -> Output {
    let mut child = nowexpr()
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn nowexpr");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn json_lines(output: &Output) -> Vec<serde_json::Value> {
    stdout(output)
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line is a JSON object"))
        .collect()
}

#[test]
fn test_evaluate_start_and_end() {
    let output = run(&["now-1d/d"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "now-1d/d → 2024-03-14 00:00:00.000\n");

    let output = run(&["--end", "now-1d/d"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "now-1d/d → 2024-03-14 23:59:59.999\n");
}

#[test]
fn test_multiple_inputs_keep_order() {
    let output = run(&["now/y", "now/M"]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "now/y → 2024-01-01 00:00:00.000\nnow/M → 2024-03-01 00:00:00.000\n"
    );
}

#[test]
fn test_failure_sets_exit_code() {
    let output = run(&["now/d", "now*1d"]);
    assert_eq!(output.status.code(), Some(1));
    let text = stdout(&output);
    // Good inputs are still printed
    assert!(text.starts_with("now/d → 2024-03-15 00:00:00.000\n"));
    assert!(text.contains("error: expected one of / + - at index 3 but was *\n  now*1d\n     ^\n"));
}

#[test]
fn test_week_start_flag_and_env() {
    let output = run(&["--week-start", "mon", "now/w"]);
    assert_eq!(stdout(&output), "now/w → 2024-03-11 00:00:00.000\n");

    let output = nowexpr()
        .env("NOWEXPR_WEEK_START", "monday")
        .arg("now/w")
        .output()
        .unwrap();
    assert_eq!(stdout(&output), "now/w → 2024-03-11 00:00:00.000\n");

    // CLI wins over env
    let output = nowexpr()
        .env("NOWEXPR_WEEK_START", "monday")
        .args(["--week-start", "sun", "now/w"])
        .output()
        .unwrap();
    assert_eq!(stdout(&output), "now/w → 2024-03-10 00:00:00.000\n");
}

#[test]
fn test_mode_from_env() {
    let output = nowexpr()
        .env("NOWEXPR_MODE", "end")
        .arg("now/h")
        .output()
        .unwrap();
    assert_eq!(stdout(&output), "now/h → 2024-03-15 14:59:59.999\n");
}

#[test]
fn test_wire_mode() {
    let output = run(&["--wire", "2024-03-05T10:15:00+02:00", "now-1h", "junk"]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "2024-03-05T10:15:00+02:00 → 2024-03-05T10:15:00Z\nnow-1h → now-1h\njunk → junk\n"
    );
}

#[test]
fn test_wire_mode_leaves_rfc2822_alone() {
    let output = run(&["--wire", "Tue, 5 Mar 2024 10:15:00 +0200"]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "Tue, 5 Mar 2024 10:15:00 +0200 → Tue, 5 Mar 2024 10:15:00 +0200\n"
    );
}

#[test]
fn test_check_mode() {
    let output = run(&["--check", "now-1w/w"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "now-1w/w ✓ relative expression\n");

    let output = run(&["--check", "x now"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).starts_with("error: 'now' must be at the start\n"));
}

#[test]
fn test_json_output() {
    let output = run(&["--json", "now-7d/d", "now+"]);
    assert_eq!(output.status.code(), Some(1));

    let values = json_lines(&output);
    assert_eq!(values.len(), 2);
    assert_eq!(values[0]["status"], "evaluated");
    assert_eq!(values[0]["instant"], "2024-03-08 00:00:00.000");
    assert_eq!(values[0]["wire"], "2024-03-08T00:00:00Z");
    assert_eq!(values[1]["status"], "failed");
    assert_eq!(values[1]["error"]["kind"], "incomplete_expression");
    assert_eq!(values[1]["error"]["expected"], "number");
    assert_eq!(values[1]["error"]["index"], 4);
}

#[test]
fn test_tokens_json() {
    let output = run(&["--tokens", "--json", "now/d"]);
    let values = json_lines(&output);
    assert_eq!(
        values[0]["tokens"],
        serde_json::json!([
            {"kind": "operation", "text": "/", "index": 3},
            {"kind": "unit", "text": "d", "index": 4},
        ])
    );
}

#[test]
fn test_stdin_lines() {
    let output = run_with_stdin(&["--json"], "now/d\n\nnow-1M/M\n");
    assert!(output.status.success());

    let values = json_lines(&output);
    assert_eq!(values.len(), 2);
    assert_eq!(values[0]["input"], "now/d");
    assert_eq!(values[1]["instant"], "2024-02-01 00:00:00.000");
}

#[test]
fn test_stdin_failure_sets_exit_code() {
    let output = run_with_stdin(&[], "now+1\n");
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("expected unit at the end but got nothing"));
}

#[test]
fn test_invalid_anchor() {
    let output = Command::new(env!("CARGO_BIN_EXE_nowexpr"))
        .args(["--anchor", "yesterday", "now"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid anchor date: yesterday"));
}

#[test]
fn test_conflicting_actions_are_rejected() {
    let output = run(&["--wire", "--check", "now"]);
    assert!(!output.status.success());
}
