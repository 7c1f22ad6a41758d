//! CLI integration tests for the custodes binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

/// Command pointing at the `custodes` binary, run inside `dir` so the
/// default `.custodes/` database lands in the temp directory.
fn custodes_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_custodes"));
    cmd.current_dir(dir).env_remove("CUSTODES_CONFIG").env_remove("RUST_LOG");
    cmd
}

fn run_json(dir: &Path, args: &[&str]) -> Value {
    let output = custodes_cmd(dir)
        .args(args)
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&output).expect("stdout is JSON")
}

fn record_passes(dir: &Path, ai: &str, score: &str, times: usize) {
    for _ in 0..times {
        custodes_cmd(dir)
            .args(["record", "--ai", ai, "-t", "code_quality", "-C", "advanced"])
            .args(["--score", score, "--passed"])
            .assert()
            .success();
    }
}

#[test]
fn test_threshold_without_history_is_static_minimum() {
    let dir = TempDir::new().unwrap();
    let json = run_json(dir.path(), &["threshold", "-t", "code_quality", "-C", "advanced"]);

    assert_eq!(json["threshold"], 60);
    assert_eq!(json["adjustment"], "static");
    assert_eq!(json["fallback_reason"], "no_history");
}

#[test]
fn test_recorded_scores_move_thresholds() {
    let dir = TempDir::new().unwrap();
    record_passes(dir.path(), "imperium", "90", 5);

    let pooled = run_json(dir.path(), &["threshold", "-t", "code_quality", "-C", "advanced"]);
    assert_eq!(pooled["threshold"], 65);
    assert_eq!(pooled["adjustment"], "harder");

    let personal = run_json(
        dir.path(),
        &["threshold", "-t", "code_quality", "-C", "advanced", "--ai", "imperium"],
    );
    assert_eq!(personal["threshold"], 75);

    let judged = run_json(
        dir.path(),
        &["record", "--ai", "imperium", "-t", "code_quality", "-C", "advanced", "--score", "50"],
    );
    assert_eq!(judged["judged_against"], 75);
    assert_eq!(judged["record"]["passed"], false);

    let agents = run_json(dir.path(), &["agents"]);
    assert_eq!(agents["total"], 1);
    assert_eq!(agents["agents"][0]["ai_identity"], "imperium");
    assert_eq!(agents["agents"][0]["records"], 6);
}

#[test]
fn test_level_command_and_human_output() {
    let dir = TempDir::new().unwrap();
    custodes_cmd(dir.path())
        .args(["level", "--ai", "guardian", "--level", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("guardian is now level 3"));

    custodes_cmd(dir.path())
        .arg("agents")
        .assert()
        .success()
        .stdout(predicate::str::contains("AGENT").and(predicate::str::contains("guardian")));
}

#[test]
fn test_evaluate_reads_stdin() {
    let dir = TempDir::new().unwrap();
    let output = custodes_cmd(dir.path())
        .args(["evaluate", "--ai", "sandbox", "--no-jitter", "--summary", "--json"])
        .write_stdin("Explanation: loop because it is simple.\n\n```python\ndef f():\n    return 1\n```\n")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&output).unwrap();

    assert_eq!(json["evaluations"][0]["source"], "-");
    assert_eq!(json["evaluations"][0]["mode"], "full");
    assert_eq!(json["analytics"]["total_evaluations"], 1);
}

#[test]
fn test_evaluate_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    custodes_cmd(dir.path())
        .args(["evaluate", "missing.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.md"));
}

#[test]
fn test_config_check_and_project_overrides() {
    let dir = TempDir::new().unwrap();
    let check = run_json(dir.path(), &["config", "check"]);
    assert_eq!(check["weight_issues"].as_array().map(Vec::len), Some(0));
    assert_eq!(check["ranges"].as_array().map(Vec::len), Some(40));

    std::fs::create_dir_all(dir.path().join(".custodes")).unwrap();
    std::fs::write(
        dir.path().join(".custodes/config.yaml"),
        "threshold:\n  range_overrides:\n    - test_type: code_quality\n      complexity: advanced\n      minimum: 70\n      maximum: 85\n",
    )
    .unwrap();

    let json = run_json(dir.path(), &["threshold", "-t", "code_quality", "-C", "advanced"]);
    assert_eq!(json["threshold"], 70);
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = TempDir::new().unwrap();
    custodes_cmd(dir.path())
        .env("CUSTODES_LOGGING__LEVEL", "loud")
        .args(["agents"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}
