use std::env;
use std::fs;
use std::sync::{Mutex, OnceLock};

use expenso_cli::commands::{check, doctor, migrate};
use serde_json::Value;
use tempfile::TempDir;

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(&[("EXPENSO_DATABASE_URL", "sqlite::memory:")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn migrate_returns_config_failure_with_non_sqlite_url() {
    with_env(&[("EXPENSO_DATABASE_URL", "postgres://nope/expenso")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn doctor_reports_all_checks_passing_with_valid_env() {
    with_env(&[("EXPENSO_DATABASE_URL", "sqlite::memory:")], || {
        let output = doctor::run(true);
        let payload = parse_payload(&output);

        assert_eq!(payload["overall_status"], "pass");
        let checks = payload["checks"].as_array().expect("checks should be an array");
        assert_eq!(checks.len(), 3);
        assert!(checks.iter().all(|check| check["status"] == "pass"));
    });
}

#[test]
fn doctor_skips_downstream_checks_when_config_invalid() {
    with_env(&[("EXPENSO_SEARCH_ENABLED", "true")], || {
        let output = doctor::run(true);
        let payload = parse_payload(&output);

        assert_eq!(payload["overall_status"], "fail");
        let checks = payload["checks"].as_array().expect("checks should be an array");
        assert_eq!(checks[0]["name"], "config_validation");
        assert_eq!(checks[0]["status"], "fail");
        assert_eq!(checks[1]["status"], "skipped");
        assert_eq!(checks[2]["status"], "skipped");
    });
}

#[test]
fn check_passes_for_compliant_expenses() {
    let dir = TempDir::new().expect("temp dir should be created");
    let path = dir.path().join("expenses.json");
    fs::write(
        &path,
        r#"[
            {"amount": 18.5, "category": "meals", "description": "coffee with client", "has_receipt": true},
            {"amount": 210.0, "category": "lodging", "description": "hotel night", "has_receipt": true}
        ]"#,
    )
    .expect("expense fixture should be written");

    let result = check::run(&path);
    assert_eq!(result.exit_code, 0, "expected compliant expenses to pass");

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "check");
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["total_expenses"], 2);
    assert_eq!(payload["invalid_expenses"], 0);
    assert_eq!(payload["summary"]["expense_count"], 2);
}

#[test]
fn check_flags_policy_violations_with_exit_code_one() {
    let dir = TempDir::new().expect("temp dir should be created");
    let path = dir.path().join("expenses.json");
    fs::write(
        &path,
        r#"{"expenses": [
            {"amount": 150.0, "category": "meals", "description": "steakhouse dinner", "has_receipt": true}
        ]}"#,
    )
    .expect("expense fixture should be written");

    let result = check::run(&path);
    assert_eq!(result.exit_code, 1, "expected violation exit code");

    let payload = parse_payload(&result.output);
    assert_eq!(payload["status"], "violations");
    assert_eq!(payload["invalid_expenses"], 1);

    let violations = payload["expenses"][0]["validation"]["violations"]
        .as_array()
        .expect("violations should be an array");
    assert!(!violations.is_empty());
}

#[test]
fn check_fails_with_distinct_codes_for_missing_and_malformed_files() {
    let dir = TempDir::new().expect("temp dir should be created");

    let missing = check::run(&dir.path().join("missing.json"));
    assert_eq!(missing.exit_code, 2);
    let payload = parse_payload(&missing.output);
    assert_eq!(payload["error_class"], "file_read");

    let malformed = dir.path().join("malformed.json");
    fs::write(&malformed, "{not json").expect("fixture should be written");
    let result = check::run(&malformed);
    assert_eq!(result.exit_code, 3);
    let payload = parse_payload(&result.output);
    assert_eq!(payload["error_class"], "invalid_input");
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "EXPENSO_DATABASE_URL",
        "EXPENSO_DATABASE_MAX_CONNECTIONS",
        "EXPENSO_DATABASE_TIMEOUT_SECS",
        "EXPENSO_SEARCH_ENABLED",
        "EXPENSO_SEARCH_BASE_URL",
        "EXPENSO_SEARCH_API_KEY",
        "EXPENSO_SEARCH_TIMEOUT_SECS",
        "EXPENSO_SEARCH_MAX_RESULTS",
        "EXPENSO_LLM_PROVIDER",
        "EXPENSO_LLM_API_KEY",
        "EXPENSO_LLM_BASE_URL",
        "EXPENSO_LLM_MODEL",
        "EXPENSO_LLM_TIMEOUT_SECS",
        "EXPENSO_LLM_MAX_RETRIES",
        "EXPENSO_SERVER_BIND_ADDRESS",
        "EXPENSO_SERVER_PORT",
        "EXPENSO_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "EXPENSO_LOGGING_LEVEL",
        "EXPENSO_LOGGING_FORMAT",
        "EXPENSO_LOG_LEVEL",
        "EXPENSO_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
