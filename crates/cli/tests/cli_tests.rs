// End-to-end tests for the `fieldrisk` binary.
//
// Every test runs against an explicit config file in a temp dir and strips
// FIELDRISK_* from the environment, so a developer's own config never leaks in.
//
// Run with: cargo test -p fieldrisk-cli --test cli_tests -- --nocapture

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use httpmock::prelude::*;
use serde_json::json;

const HOOK: &str = "/webhook/field-analysis";

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

struct Env {
    _dir: tempfile::TempDir,
    config: PathBuf,
}

impl Env {
    fn new(config_toml: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.toml");
        std::fs::write(&config, config_toml).unwrap();
        Self { _dir: dir, config }
    }

    fn defaults() -> Self {
        Self::new("")
    }

    fn with_service(server: &MockServer) -> Self {
        Self::new(&format!("analysis_url = \"{}\"\ntimeout_secs = 10\n", server.url(HOOK)))
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_fieldrisk"));
        cmd.current_dir(env!("CARGO_MANIFEST_DIR"))
            .arg("--config")
            .arg(&self.config)
            .env_remove("FIELDRISK_CONFIG")
            .env_remove("FIELDRISK_ANALYSIS_URL")
            .env_remove("FIELDRISK_API_URL")
            .env_remove("FIELDRISK_TIMEOUT_SECS")
            .env_remove("FIELDRISK_LOG");
        cmd
    }

    fn run(&self, args: &[&str], csv: Option<&Path>) -> Output {
        let mut cmd = self.cmd();
        cmd.args(args);
        if let Some(csv) = csv {
            cmd.arg(csv);
        }
        cmd.output().expect("run fieldrisk")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "exit code: {:?}\nstderr: {}",
        output.status,
        stderr(output)
    );
    serde_json::from_str(stdout(output).trim())
        .unwrap_or_else(|e| panic!("stdout must be one JSON value: {}\n{}", e, stdout(output)))
}

// ===========================================================================
// preview
// ===========================================================================

#[test]
fn preview_json_normalizes_headers() {
    let env = Env::defaults();
    let out = env.run(&["preview", "--json"], Some(&fixture("fields.csv")));
    let v = stdout_json(&out);

    let rows = v.as_array().unwrap();
    assert_eq!(rows.len(), 3, "blank line is skipped");
    assert_eq!(rows[0]["field_id"], "F-001");
    assert_eq!(rows[0]["field_name"], "North Lot");
    assert_eq!(rows[1]["soil_moisture"], "92");
    assert_eq!(rows[2]["pest_pressure"], "71");
}

#[test]
fn preview_table_lists_records() {
    let env = Env::defaults();
    let out = env.run(&["preview"], Some(&fixture("fields.csv")));
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("Creek Bottom"));
    assert!(text.contains("3 record(s)"));
}

#[test]
fn preview_ragged_row_exits_with_parse_code() {
    let env = Env::defaults();
    let out = env.run(&["preview"], Some(&fixture("ragged.csv")));
    assert_eq!(out.status.code(), Some(4));
    assert!(stderr(&out).contains("Failed to parse CSV. Please check the file format."));
    assert!(stdout(&out).is_empty());
}

#[test]
fn preview_missing_file_exits_with_parse_code() {
    let env = Env::defaults();
    let out = env.run(&["preview"], Some(&fixture("does-not-exist.csv")));
    assert_eq!(out.status.code(), Some(4));
}

#[test]
fn preview_rejects_non_ascii_delimiter() {
    let env = Env::defaults();
    let out = env.run(&["preview", "--delimiter", "é"], Some(&fixture("fields.csv")));
    assert_eq!(out.status.code(), Some(2));
}

// ===========================================================================
// analyze
// ===========================================================================

#[test]
fn analyze_against_service_selects_first_and_shows_advice() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path(HOOK);
        then.status(200).json_body(json!([
            {"field_id": "F-001", "field_name": "North Lot", "crop": "Corn", "risk_level": "High", "risk_score": 82, "advice": "Irrigate within 48h"},
            {"field_id": "F-002", "field_name": "Creek Bottom", "crop": "Soybean", "risk_level": "Low", "risk_score": 12}
        ]));
    });

    let env = Env::with_service(&server);
    let out = env.run(&["analyze"], Some(&fixture("fields.csv")));

    mock.assert();
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("2 field(s): 1 high, 0 moderate, 1 low"));
    assert!(text.contains("Selected: F-001 (North Lot)"));
    assert!(text.contains("Irrigate within 48h"));
}

#[test]
fn analyze_select_shows_placeholder_when_no_advice() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(HOOK);
        then.status(200).json_body(json!({"fields": [
            {"field_id": "F-001", "risk_level": "High", "advice": "Irrigate"},
            {"field_id": "F-002", "risk_level": "Low"}
        ]}));
    });

    let env = Env::with_service(&server);
    let out = env.run(&["analyze", "--select", "F-002", "--json"], Some(&fixture("fields.csv")));
    let v = stdout_json(&out);

    assert_eq!(v["count"], 2);
    assert_eq!(v["selection"]["field_id"], "F-002");
    assert_eq!(v["selection"]["advice"], "No recommendation text returned from the model.");
    assert!(v["selection"]["advice_source"].is_null());
}

#[test]
fn analyze_url_flag_overrides_config() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/other");
        then.status(200).json_body(json!([]));
    });

    // Config points at a dead port; the flag wins
    let env = Env::new("analysis_url = \"http://127.0.0.1:9/hook\"\n");
    let out = env.run(&["analyze", "--url", &server.url("/other"), "--json"], Some(&fixture("fields.csv")));
    let v = stdout_json(&out);

    mock.assert();
    assert_eq!(v["count"], 0);
    assert!(v.get("selection").is_none());
}

#[test]
fn analyze_server_error_exits_with_remote_code() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(HOOK);
        then.status(500).body("workflow crashed");
    });

    let env = Env::with_service(&server);
    let out = env.run(&["analyze"], Some(&fixture("fields.csv")));

    assert_eq!(out.status.code(), Some(6));
    assert!(stderr(&out).contains("workflow crashed"));
    assert!(stdout(&out).is_empty());
}

#[test]
fn analyze_unexpected_shape_exits_with_shape_code() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(HOOK);
        then.status(200).json_body(json!({"message": "Workflow was started"}));
    });

    let env = Env::with_service(&server);
    let out = env.run(&["analyze"], Some(&fixture("fields.csv")));

    assert_eq!(out.status.code(), Some(7));
    assert!(stderr(&out).contains("Server returned an unexpected response shape."));
}

#[test]
fn analyze_unreachable_service_exits_with_remote_code() {
    let env = Env::new("analysis_url = \"http://127.0.0.1:9/hook\"\ntimeout_secs = 2\n");
    let out = env.run(&["analyze"], Some(&fixture("fields.csv")));
    assert_eq!(out.status.code(), Some(6));
    assert!(stderr(&out).contains("--offline"));
}

#[test]
fn analyze_header_only_file_fails_before_request() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path(HOOK);
        then.status(200).json_body(json!([]));
    });

    let env = Env::with_service(&server);
    let out = env.run(&["analyze"], Some(&fixture("header-only.csv")));

    assert_eq!(out.status.code(), Some(5));
    assert!(stderr(&out).contains("No rows found in the CSV. Please check the file."));
    mock.assert_hits(0);
}

#[test]
fn analyze_offline_scores_locally() {
    let env = Env::defaults();
    let out = env.run(&["analyze", "--offline", "--select", "F-003", "--json"], Some(&fixture("fields.csv")));
    let v = stdout_json(&out);

    assert_eq!(v["tally"]["low"], 2);
    assert_eq!(v["tally"]["moderate"], 1);
    assert_eq!(v["summary"][2]["risk_level"], "Moderate");
    assert_eq!(v["selection"]["found"], true);
}

// ===========================================================================
// score
// ===========================================================================

#[test]
fn score_json_has_no_selection() {
    let env = Env::defaults();
    let v = stdout_json(&env.run(&["score", "--json"], Some(&fixture("fields.csv"))));
    assert_eq!(v["count"], 3);
    assert_eq!(v["file"], "fields.csv");
    assert!(v.get("selection").is_none());
}

// ===========================================================================
// config
// ===========================================================================

#[test]
fn config_show_applies_file_then_env() {
    let env = Env::new("analysis_url = \"http://from-file/hook\"\ntimeout_secs = 15\n");

    let out = env.run(&["config", "show"], None);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("analysis_url = \"http://from-file/hook\""));
    assert!(text.contains("auxiliary_url = \"http://localhost:8000\""));
    assert!(text.contains("timeout_secs = 15"));

    let out = env.cmd().args(["config", "show"]).env("FIELDRISK_API_URL", "http://aux-env").output().unwrap();
    assert!(stdout(&out).contains("auxiliary_url = \"http://aux-env\""));
}

#[test]
fn config_malformed_file_exits_with_config_code() {
    let env = Env::new("timeout_secs = [");
    let out = env.run(&["config", "show"], None);
    assert_eq!(out.status.code(), Some(3));
}

#[test]
fn config_bad_env_timeout_exits_with_config_code() {
    let env = Env::defaults();
    let out = env.cmd().args(["config", "show"]).env("FIELDRISK_TIMEOUT_SECS", "soon").output().unwrap();
    assert_eq!(out.status.code(), Some(3));
    assert!(stderr(&out).contains("FIELDRISK_TIMEOUT_SECS"));
}

#[test]
fn config_path_prints_a_toml_path() {
    let env = Env::defaults();
    let out = env.run(&["config", "path"], None);
    assert!(out.status.success());
    assert!(stdout(&out).trim().ends_with("config.toml"));
}
