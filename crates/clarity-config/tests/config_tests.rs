// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Clarity configuration system.

use clarity_config::diagnostic::ConfigError;
use clarity_config::model::ClarityConfig;
use clarity_config::validation::MIN_KDF_ITERATIONS;
use clarity_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};
use miette::Diagnostic;

/// Every known section and field deserializes.
#[test]
fn full_config_deserializes() {
    let toml = r#"
[storage]
database_path = "/var/lib/clarity/data.db"
wal_mode = false

[vault]
kdf_iterations = 250000
min_passphrase_length = 12
legacy_keys = ["tasks", "goals"]

[logging]
level = "debug"
json = true
"#;

    let config = load_config_from_str(toml).expect("full config should parse");
    assert_eq!(config.storage.database_path, "/var/lib/clarity/data.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.vault.kdf_iterations, 250_000);
    assert_eq!(config.vault.min_passphrase_length, 12);
    assert_eq!(config.vault.legacy_keys, vec!["tasks", "goals"]);
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json);
}

/// Defaults match the historical vault parameters.
#[test]
fn defaults_are_sensible() {
    let config = ClarityConfig::default();
    assert!(config.storage.database_path.ends_with("clarity.db"));
    assert!(config.storage.wal_mode);
    assert_eq!(config.vault.kdf_iterations, 100_000);
    assert_eq!(config.vault.min_passphrase_length, 8);
    assert_eq!(
        config.vault.legacy_keys,
        vec!["flowStateData", "epicsData", "weeklyGoals", "dailyTasks"]
    );
    assert_eq!(config.logging.level, "info");
}

/// A partial file keeps defaults for everything it does not mention.
#[test]
fn partial_sections_fill_from_defaults() {
    let config = load_config_from_str("[vault]\nmin_passphrase_length = 10\n").unwrap();
    assert_eq!(config.vault.min_passphrase_length, 10);
    assert_eq!(config.vault.kdf_iterations, 100_000);
    assert!(config.storage.wal_mode);
}

#[test]
fn unknown_top_level_section_is_rejected() {
    let err = load_config_from_str("[telemetry]\nenabled = true\n")
        .expect_err("unknown section should be rejected");
    assert!(err.to_string().contains("telemetry"), "got: {err}");
}

#[test]
fn typo_in_vault_section_suggests_fix() {
    let errors = load_and_validate_str("[vault]\nmin_passphrase_lenght = 10\n").unwrap_err();
    assert_eq!(errors.len(), 1);

    let ConfigError::UnknownKey { key, suggestion, valid_keys, .. } = &errors[0] else {
        panic!("expected UnknownKey, got {:?}", errors[0]);
    };
    assert_eq!(key, "min_passphrase_lenght");
    assert_eq!(suggestion.as_deref(), Some("min_passphrase_length"));
    assert!(valid_keys.contains("legacy_keys"));

    let help = errors[0].help().expect("help text").to_string();
    assert!(help.contains("did you mean `min_passphrase_length`"), "got: {help}");
    assert!(errors[0].code().is_some());
}

#[test]
fn wrong_type_is_reported_with_path() {
    let errors = load_and_validate_str("[storage]\nwal_mode = \"yes\"\n").unwrap_err();
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("wal_mode"))),
        "got: {errors:?}"
    );
}

#[test]
fn weak_kdf_cost_fails_validation() {
    let toml = format!("[vault]\nkdf_iterations = {}\n", MIN_KDF_ITERATIONS - 1);
    let errors = load_and_validate_str(&toml).unwrap_err();
    assert!(matches!(&errors[0], ConfigError::Validation { message } if message.contains("kdf_iterations")));
}

#[test]
fn legacy_keys_may_not_shadow_vault_records() {
    let errors = load_and_validate_str("[vault]\nlegacy_keys = [\"enc_tasks\", \"clarity_salt\"]\n")
        .unwrap_err();
    assert_eq!(errors.len(), 2);
}

#[test]
fn explicit_file_is_loaded_and_validated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clarity.toml");
    std::fs::write(&path, "[storage]\ndatabase_path = \"explicit.db\"\n").unwrap();

    let config = load_and_validate_path(&path).expect("file should load");
    assert_eq!(config.storage.database_path, "explicit.db");
}

#[test]
fn explicit_file_errors_are_collected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clarity.toml");
    std::fs::write(&path, "[logging]\nlevle = \"warn\"\n").unwrap();

    let errors = load_and_validate_path(&path).unwrap_err();
    assert!(matches!(&errors[0], ConfigError::UnknownKey { key, .. } if key == "levle"));
}

/// Reports render through miette's graphical handler.
#[test]
fn config_error_renders_with_miette() {
    let error = ConfigError::UnknownKey {
        key: "kdf_iters".to_string(),
        suggestion: Some("kdf_iterations".to_string()),
        valid_keys: "kdf_iterations, min_passphrase_length, legacy_keys".to_string(),
        span: None,
        src: None,
    };

    let mut rendered = String::new();
    miette::GraphicalReportHandler::new()
        .render_report(&mut rendered, &error)
        .expect("should render");
    assert!(rendered.contains("kdf_iters"));
    assert!(rendered.contains("kdf_iterations"));
}
