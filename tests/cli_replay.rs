//! End-to-end tests for the `dcap` binary.

mod common;

use common::{run_dcap, write_file};
use serde_json::Value;

const CONFIG: &str = r#"
[app.analytics.azure]
connectionString = "InstrumentationKey=test-key;IngestionEndpoint=https://example.invalid/"

[log]
level = "warn"
"#;

const SESSION: &str = r#"{"action":"click","subject":"Docs","value":6,"context":{"extension":"HomePage","pluginId":"home","routeRef":"home:root"}}
{"action":"navigate","subject":"/docs","context":{"extension":"App","pluginId":"techdocs","routeRef":"techdocs:index"}}
{"identity":"user:default/jane"}
{"action":"search","subject":"rust"}
"#;

fn envelopes(stdout: &str) -> Vec<Value> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("envelope is json"))
        .collect()
}

#[test]
fn replay_releases_buffered_hits_with_hashed_user() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_file(dir.path(), "dcap.toml", CONFIG);
    let input = write_file(dir.path(), "session.jsonl", SESSION);

    let result = run_dcap(
        &[
            "--config",
            config.to_str().expect("utf8 path"),
            "replay",
            "--input",
            input.to_str().expect("utf8 path"),
        ],
        dir.path(),
    );
    assert!(
        result.output.status.success(),
        "replay failed; stderr: {}",
        result.stderr
    );

    let records = envelopes(&result.stdout);
    assert_eq!(records.len(), 3, "stdout: {}", result.stdout);
    assert_eq!(records[0]["type"], "event");
    assert_eq!(records[0]["name"], "click");
    assert_eq!(records[0]["properties"]["category"], "HomePage");
    assert_eq!(records[1]["type"], "pageView");
    assert_eq!(records[1]["uri"], "/docs");
    assert_eq!(records[2]["name"], "search");
    assert_eq!(records[2]["properties"]["category"], "App");

    let expected_user = deferred_capture::analytics::hash_user_ref("user:default/jane");
    for record in &records {
        assert_eq!(record["iKey"], "test-key");
        assert_eq!(record["user"], Value::String(expected_user.clone()));
    }
    assert!(!result.stdout.contains("jane"), "raw identity leaked");
}

#[test]
fn replay_without_identity_fails_and_sends_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_file(dir.path(), "dcap.toml", CONFIG);
    let input = write_file(
        dir.path(),
        "session.jsonl",
        "{\"action\":\"click\",\"subject\":\"Docs\"}\n",
    );

    let result = run_dcap(
        &[
            "--config",
            config.to_str().expect("utf8 path"),
            "replay",
            "--input",
            input.to_str().expect("utf8 path"),
        ],
        dir.path(),
    );
    assert!(!result.output.status.success());
    assert!(result.stdout.trim().is_empty(), "stdout: {}", result.stdout);
    assert!(
        result.stderr.contains("DCAP-2002"),
        "stderr: {}",
        result.stderr
    );
}

#[test]
fn no_defer_forwards_immediately_to_output_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_file(dir.path(), "dcap.toml", CONFIG);
    let input = write_file(
        dir.path(),
        "session.jsonl",
        "{\"action\":\"click\",\"subject\":\"Docs\"}\n",
    );
    let output = dir.path().join("out.jsonl");

    let result = run_dcap(
        &[
            "--config",
            config.to_str().expect("utf8 path"),
            "replay",
            "--no-defer",
            "--input",
            input.to_str().expect("utf8 path"),
            "--output",
            output.to_str().expect("utf8 path"),
        ],
        dir.path(),
    );
    assert!(
        result.output.status.success(),
        "stderr: {}",
        result.stderr
    );
    let written = std::fs::read_to_string(&output).expect("output file");
    let records = envelopes(&written);
    assert_eq!(records.len(), 1);
    assert!(records[0].get("user").is_none());
}

#[test]
fn replay_without_backend_config_is_silent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_file(dir.path(), "session.jsonl", SESSION);

    let result = run_dcap(
        &["replay", "--input", input.to_str().expect("utf8 path")],
        dir.path(),
    );
    assert!(
        result.output.status.success(),
        "stderr: {}",
        result.stderr
    );
    assert!(result.stdout.trim().is_empty());
}

#[test]
fn check_config_summarizes_and_rejects_invalid() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_file(dir.path(), "dcap.toml", CONFIG);
    let result = run_dcap(
        &["--config", config.to_str().expect("utf8 path"), "check-config"],
        dir.path(),
    );
    assert!(result.output.status.success(), "stderr: {}", result.stderr);
    let summary: Value = serde_json::from_str(&result.stdout).expect("json summary");
    assert_eq!(summary["analytics"], "azure");
    assert_eq!(summary["instrumentationKey"], true);
    assert_eq!(summary["defer"], true);
    assert_eq!(summary["maxBacklog"], Value::Null);

    let bad = write_file(dir.path(), "bad.toml", "[capture]\nmax_backlog = 0\n");
    let result = run_dcap(
        &["--config", bad.to_str().expect("utf8 path"), "check-config"],
        dir.path(),
    );
    assert!(!result.output.status.success());
    assert!(result.stderr.contains("DCAP-1001"), "stderr: {}", result.stderr);
}

#[test]
fn missing_config_file_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = run_dcap(&["--config", "absent.toml", "check-config"], dir.path());
    assert!(!result.output.status.success());
    assert!(result.stderr.contains("DCAP-1002"), "stderr: {}", result.stderr);
}

#[test]
fn replay_with_full_backlog_reports_dropped_hits() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_file(
        dir.path(),
        "dcap.toml",
        r#"
[app.analytics.azure]
connectionString = "InstrumentationKey=test-key"

[capture]
max_backlog = 1

[log]
level = "error"
"#,
    );
    let input = write_file(
        dir.path(),
        "session.jsonl",
        r#"{"action":"first","subject":"x"}
{"action":"second","subject":"x"}
{"action":"third","subject":"x"}
{"identity":"user:default/jane"}
"#,
    );

    let result = run_dcap(
        &[
            "--config",
            config.to_str().expect("utf8 path"),
            "replay",
            "--input",
            input.to_str().expect("utf8 path"),
        ],
        dir.path(),
    );
    assert!(!result.output.status.success(), "stdout: {}", result.stdout);
    assert!(
        result.stderr.contains("DCAP-2102") && result.stderr.contains("2 hits"),
        "stderr: {}",
        result.stderr
    );

    let records = envelopes(&result.stdout);
    assert_eq!(records.len(), 1, "stdout: {}", result.stdout);
    assert_eq!(records[0]["name"], "first");
}
