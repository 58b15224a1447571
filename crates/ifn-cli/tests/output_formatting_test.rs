//! Integration tests for output formatting
//!
//! These tests run the binary against the in-memory backend and verify that
//! JSON output and dry-run mode work correctly.

use std::path::PathBuf;
use std::process::{Command, Output};

fn ifn_bin() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // Remove test binary name
    path.pop(); // Remove 'deps' directory
    path.push("ifn");
    path
}

fn run(args: &[&str]) -> Output {
    let dir = tempfile::tempdir().unwrap();
    Command::new(ifn_bin())
        .current_dir(dir.path())
        .env_remove("IFN_API_URL")
        .env("RUST_LOG", "warn")
        .args(["--backend", "memory"])
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("Output should be valid JSON")
}

#[test]
fn test_json_list_is_valid() {
    let output = run(&["--json", "list"]);
    assert!(output.status.success(), "Command should succeed");

    let parsed = stdout_json(&output);
    assert_eq!(parsed["status"], "success");

    let data = parsed.get("data").expect("Should have data field");
    assert_eq!(data["status_filter"], "all");
    assert_eq!(data["count"], 24);
    assert_eq!(data["units"].as_array().map(Vec::len), Some(24));
}

#[test]
fn test_json_list_filters_by_status() {
    let output = run(&["--json", "list", "--status", "pendiente"]);
    let data = stdout_json(&output)["data"].clone();

    let units = data["units"].as_array().unwrap();
    assert_eq!(units.len(), 12);
    assert!(units.iter().all(|u| u["review"]["status"] == "pending"));
}

#[test]
fn test_dry_run_generate_sends_nothing() {
    let output = run(&["--json", "--dry-run", "generate", "5"]);
    assert!(output.status.success(), "Command should succeed");

    let data = stdout_json(&output)["data"].clone();
    assert_eq!(data["dry_run"], true);
    let actions = data["planned_actions"].as_array().unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0]["action_type"], "generate_units");
    assert_eq!(actions[0]["details"][0], "Subparcelas: 25");
}

#[test]
fn test_generate_count_out_of_range_is_rejected() {
    let output = run(&["--json", "--dry-run", "generate", "101"]);
    assert!(!output.status.success(), "Command should fail");

    let parsed = stdout_json(&output);
    assert_eq!(parsed["status"], "error");
    assert!(parsed["message"].as_str().unwrap().contains("between 1 and 100"));
}

#[test]
fn test_dry_run_export_writes_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.geojson");
    let output = run(&["--dry-run", "export", "--output", path.to_str().unwrap()]);

    assert!(output.status.success(), "Command should succeed");
    assert!(!path.exists(), "Dry-run should not write the export file");
}

#[test]
fn test_approve_pending_unit() {
    let output = run(&["--json", "approve", "CONG-00001", "--region", "25"]);
    assert!(output.status.success(), "Command should succeed");

    let data = stdout_json(&output)["data"].clone();
    assert_eq!(data["outcome"], "Committed");
    assert_eq!(data["consistent"], true);
    assert_eq!(data["unit"]["review"]["status"], "approved");
    assert_eq!(data["unit"]["review"]["region"]["id"], "25");
}

#[test]
fn test_approve_already_reviewed_unit_fails() {
    // The second demo unit is seeded as approved
    let output = run(&["--json", "approve", "CONG-00002", "--region", "25"]);
    assert!(!output.status.success(), "Command should fail");

    let parsed = stdout_json(&output);
    assert_eq!(parsed["status"], "error");
}

#[test]
fn test_reject_requires_reason() {
    let output = run(&["--json", "reject", "CONG-00001", "--reason", "   "]);
    assert!(!output.status.success(), "Command should fail");

    let parsed = stdout_json(&output);
    assert!(parsed["message"].as_str().unwrap().contains("reason"));
}

#[test]
fn test_unknown_code_is_not_found() {
    let output = run(&["--json", "show", "CONG-99999"]);
    assert!(!output.status.success(), "Command should fail");

    let parsed = stdout_json(&output);
    assert!(parsed["message"].as_str().unwrap().contains("not found"));
}
