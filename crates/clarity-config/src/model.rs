// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Clarity encrypted store.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Clarity configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClarityConfig {
    /// Local storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Vault key derivation and migration settings.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Local storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file holding the key-value table.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("clarity").join("clarity.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("clarity.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Vault configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// PBKDF2-HMAC-SHA256 iteration count for newly created vaults
    /// (default: 100000). Existing vaults keep the count they were created with.
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Minimum passphrase length in characters accepted by setup (default: 8).
    #[serde(default = "default_min_passphrase_length")]
    pub min_passphrase_length: usize,

    /// Logical names whose unencrypted values are migrated on setup.
    #[serde(default = "default_legacy_keys")]
    pub legacy_keys: Vec<String>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            kdf_iterations: default_kdf_iterations(),
            min_passphrase_length: default_min_passphrase_length(),
            legacy_keys: default_legacy_keys(),
        }
    }
}

fn default_kdf_iterations() -> u32 {
    100_000
}

fn default_min_passphrase_length() -> usize {
    8
}

fn default_legacy_keys() -> Vec<String> {
    ["flowStateData", "epicsData", "weeklyGoals", "dailyTasks"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Log output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default tracing filter directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
