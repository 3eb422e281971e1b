// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as non-empty paths, KDF cost floors, and legacy key naming.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::ClarityConfig;

/// Lowest PBKDF2 iteration count accepted from configuration.
pub const MIN_KDF_ITERATIONS: u32 = 10_000;

/// Prefixes owned by the vault itself; legacy keys may not use them.
const RESERVED_PREFIXES: &[&str] = &["enc_", "clarity_"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ClarityConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.vault.kdf_iterations < MIN_KDF_ITERATIONS {
        errors.push(ConfigError::Validation {
            message: format!(
                "vault.kdf_iterations must be at least {MIN_KDF_ITERATIONS}, got {}",
                config.vault.kdf_iterations
            ),
        });
    }

    if config.vault.min_passphrase_length == 0 {
        errors.push(ConfigError::Validation {
            message: "vault.min_passphrase_length must be at least 1".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for key in &config.vault.legacy_keys {
        if key.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "vault.legacy_keys must not contain empty names".to_string(),
            });
            continue;
        }
        if let Some(prefix) = RESERVED_PREFIXES.iter().find(|p| key.starts_with(*p)) {
            errors.push(ConfigError::Validation {
                message: format!(
                    "vault.legacy_keys entry `{key}` uses the reserved prefix `{prefix}`"
                ),
            });
        }
        if !seen.insert(key.as_str()) {
            errors.push(ConfigError::Validation {
                message: format!("vault.legacy_keys contains duplicate entry `{key}`"),
            });
        }
    }

    if config.logging.level.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "logging.level must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
