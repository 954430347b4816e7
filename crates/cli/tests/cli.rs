//! End-to-end tests for the `agent-host` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// An empty project root, so no config from the working directory leaks in.
fn empty_root() -> TempDir {
    tempfile::tempdir().unwrap()
}

fn agent_host(root: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("agent-host").unwrap();
    cmd.arg("--root").arg(root.path()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_agents_lists_builtin_types() {
    let root = empty_root();
    agent_host(&root)
        .arg("agents")
        .assert()
        .success()
        .stdout(predicate::str::contains("Business Intelligence"))
        .stdout(predicate::str::contains("System Architecture"))
        .stdout(predicate::str::contains("Web Scraping").not());
}

#[test]
fn test_agents_all_includes_catalogue() {
    let root = empty_root();
    agent_host(&root)
        .args(["agents", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(not available)"))
        .stdout(predicate::str::contains("Web Scraping"));
}

#[test]
fn test_exec_prints_response_json() {
    let root = empty_root();
    agent_host(&root)
        .args(["exec", "--agent", "1", "--action", "get_revenue_period"])
        .args(["--param", "period=March"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"success\": true"))
        .stdout(predicate::str::contains("$145,000"));
}

#[test]
fn test_exec_unknown_action_fails() {
    let root = empty_root();
    agent_host(&root)
        .args(["exec", "--agent", "1", "--action", "frobnicate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Unknown action: frobnicate"));
}

#[test]
fn test_exec_rejects_malformed_param() {
    let root = empty_root();
    agent_host(&root)
        .args(["exec", "--agent", "1", "--action", "get_revenue", "--param", "oops"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected key=value"));
}

#[test]
fn test_voice_uses_tenant_config() {
    let root = empty_root();
    let tenant_dir = root.path().join(".agent-host/tenants/acme");
    fs::create_dir_all(&tenant_dir).unwrap();
    fs::write(tenant_dir.join("agent-1.toml"), "currency_symbol = \"£\"\n").unwrap();

    agent_host(&root)
        .args(["voice", "--tenant", "acme", "--agent", "1", "show profit"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Current profit for June is £70,000 with a margin of 41.7%.",
        ));
}

#[test]
fn test_voice_unknown_agent_fails() {
    let root = empty_root();
    agent_host(&root)
        .args(["voice", "--agent", "7", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to initialize agent 7"));
}

#[test]
fn test_invalid_config_is_reported() {
    let root = empty_root();
    let host_dir = root.path().join(".agent-host");
    fs::create_dir_all(&host_dir).unwrap();
    fs::write(host_dir.join("config.toml"), "event_capacity = \"many\"\n").unwrap();

    agent_host(&root).arg("agents").assert().failure();
}

#[test]
fn test_serve_answers_json_lines() {
    let root = empty_root();
    let input = [
        r#"{"type":"initializeAgent","payload":{"tenant_id":"t1","agent_number":31}}"#,
        "not json",
        r#"{"type":"getTenantAgents","payload":{"tenant_id":"t1"}}"#,
        r#"{"type":"shutdown"}"#,
    ]
    .join("\n");

    agent_host(&root)
        .arg("serve")
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""type":"initialized""#))
        .stdout(predicate::str::contains(r#""success":true"#))
        .stdout(predicate::str::contains(r#""type":"error""#))
        .stdout(predicate::str::contains(r#""type":"tenantAgents""#))
        .stdout(predicate::str::contains(r#""type":"shutdownComplete""#));
}

#[test]
fn test_serve_relays_events() {
    let root = empty_root();
    let input = [
        r#"{"type":"executeCommand","payload":{"tenant_id":"t1","agent_number":1,"command":{"action":"get_growth","userId":"t1","requestId":"r-1","timestamp":"2024-06-01T12:00:00Z"}}}"#,
        r#"{"type":"shutdown"}"#,
    ]
    .join("\n");

    agent_host(&root)
        .arg("serve")
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""type":"commandResponse""#))
        .stdout(predicate::str::contains(r#""type":"event""#));
}
