//! Tests for the Vigil configuration system.

use std::sync::Mutex;

use vigil_core::config::{CliOverrides, VigilConfig};
use vigil_core::errors::ConfigError;

/// Global mutex to serialize tests that modify environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn tempdir() -> tempfile::TempDir {
    tempfile::TempDir::new().unwrap()
}

/// Clear all VIGIL_ env vars and point HOME at an empty directory so a
/// developer's user config cannot leak into the test.
fn isolate_env(home: &std::path::Path) {
    for key in [
        "VIGIL_MIN_SCORE",
        "VIGIL_DISABLED_RULES",
        "VIGIL_OWNERSHIP_FIELDS",
        "VIGIL_CONTEXT_WINDOW",
        "VIGIL_ATTEMPT_BUDGET",
        "VIGIL_EXCERPT_CHARS",
        "VIGIL_DEADLINE_SECS",
        "VIGIL_REPORT_FORMAT",
        "VIGIL_REPORT_COLOR",
    ] {
        std::env::remove_var(key);
    }
    std::env::set_var("HOME", home);
    std::env::remove_var("USERPROFILE");
}

#[test]
fn test_layered_resolution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempdir();
    isolate_env(home.path());

    let dir = tempdir();
    std::fs::write(
        dir.path().join("vigil.toml"),
        r#"
[validation]
min_score = 40
disabled_rules = ["structured-logging"]

[refinement]
attempt_budget = 4
excerpt_chars = 500
"#,
    )
    .unwrap();

    std::env::set_var("VIGIL_ATTEMPT_BUDGET", "5");

    let cli = CliOverrides {
        min_score: Some(60),
        ..Default::default()
    };
    let config = VigilConfig::load(dir.path(), Some(&cli)).unwrap();

    // CLI beats project
    assert_eq!(config.validation.min_score, Some(60));
    // Env beats project
    assert_eq!(config.refinement.attempt_budget, Some(5));
    // Project beats defaults
    assert_eq!(config.refinement.excerpt_chars, Some(500));
    assert_eq!(config.validation.disabled_rules, vec!["structured-logging"]);

    std::env::remove_var("VIGIL_ATTEMPT_BUDGET");
}

#[test]
fn test_user_config_is_lowest_layer() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempdir();
    isolate_env(home.path());

    std::fs::create_dir_all(home.path().join(".vigil")).unwrap();
    std::fs::write(
        home.path().join(".vigil").join("config.toml"),
        "[refinement]\nattempt_budget = 7\nexcerpt_chars = 100\n",
    )
    .unwrap();

    let dir = tempdir();
    std::fs::write(dir.path().join("vigil.toml"), "[refinement]\nattempt_budget = 2\n").unwrap();

    let config = VigilConfig::load(dir.path(), None).unwrap();
    assert_eq!(config.refinement.attempt_budget, Some(2));
    assert_eq!(config.refinement.excerpt_chars, Some(100));
}

#[test]
fn test_missing_files_fall_back_to_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempdir();
    isolate_env(home.path());

    let dir = tempdir();
    let config = VigilConfig::load(dir.path(), None).unwrap();

    assert_eq!(config.validation.effective_min_score(), 0);
    assert_eq!(config.validation.effective_context_window(), 200);
    assert_eq!(config.refinement.effective_attempt_budget(), 3);
    assert_eq!(config.refinement.effective_excerpt_chars(), 2000);
    assert_eq!(config.report.effective_format(), "console");
    assert!(config.report.effective_color());
    assert!(config
        .validation
        .effective_ownership_fields()
        .contains(&"tenant_id".to_string()));
    assert_eq!(
        config.validation.effective_architecture_triad(),
        vec!["Repository", "Validator", "Logger"]
    );
}

#[test]
fn test_invalid_env_value_is_ignored() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempdir();
    isolate_env(home.path());

    std::env::set_var("VIGIL_MIN_SCORE", "not-a-number");
    let dir = tempdir();
    let config = VigilConfig::load(dir.path(), None).unwrap();
    assert_eq!(config.validation.min_score, None);
    std::env::remove_var("VIGIL_MIN_SCORE");
}

#[test]
fn test_env_list_override() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempdir();
    isolate_env(home.path());

    std::env::set_var("VIGIL_OWNERSHIP_FIELDS", "account_id, workspaceId ,");
    let dir = tempdir();
    let config = VigilConfig::load(dir.path(), None).unwrap();
    assert_eq!(
        config.validation.effective_ownership_fields(),
        vec!["account_id", "workspaceId"]
    );
    std::env::remove_var("VIGIL_OWNERSHIP_FIELDS");
}

#[test]
fn test_invalid_toml_is_parse_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempdir();
    isolate_env(home.path());

    let dir = tempdir();
    std::fs::write(dir.path().join("vigil.toml"), "[validation\nmin_score = ").unwrap();
    let err = VigilConfig::load(dir.path(), None).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn test_validation_rejects_out_of_range_values() {
    let err = VigilConfig::from_toml("[validation]\nmin_score = 101\n").unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { ref field, .. } if field == "validation.min_score"));

    let err = VigilConfig::from_toml("[refinement]\nattempt_budget = 0\n").unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { ref field, .. } if field == "refinement.attempt_budget"));

    let err = VigilConfig::from_toml("[validation]\ncontext_window = 0\n").unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { .. }));

    let err = VigilConfig::from_toml("[report]\nformat = \"xml\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}

#[test]
fn test_unknown_keys_are_ignored() {
    let config = VigilConfig::from_toml(
        r#"
[validation]
min_score = 10
future_option = true

[something_else]
x = 1
"#,
    )
    .unwrap();
    assert_eq!(config.validation.min_score, Some(10));
}

#[test]
fn test_toml_roundtrip_preserves_values() {
    let config = VigilConfig::from_toml(
        "[refinement]\nattempt_budget = 5\nsystem_context = \"You write TypeScript.\"\n",
    )
    .unwrap();
    let rendered = config.to_toml().unwrap();
    let reparsed = VigilConfig::from_toml(&rendered).unwrap();
    assert_eq!(reparsed.refinement.attempt_budget, Some(5));
    assert_eq!(
        reparsed.refinement.system_context.as_deref(),
        Some("You write TypeScript.")
    );
}

#[test]
fn test_cli_format_override_is_validated() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempdir();
    isolate_env(home.path());

    let dir = tempdir();
    let json = CliOverrides {
        format: Some("json".to_string()),
        color: Some(false),
        ..Default::default()
    };
    let config = VigilConfig::load(dir.path(), Some(&json)).unwrap();
    assert_eq!(config.report.effective_format(), "json");
    assert!(!config.report.effective_color());

    let xml = CliOverrides {
        format: Some("xml".to_string()),
        ..Default::default()
    };
    let err = VigilConfig::load(dir.path(), Some(&xml)).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "report.format"));
}
