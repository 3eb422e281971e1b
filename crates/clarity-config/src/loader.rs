// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./clarity.toml` > `~/.config/clarity/clarity.toml` > `/etc/clarity/clarity.toml`
//! with environment variable overrides via `CLARITY_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use tracing::debug;

use crate::model::ClarityConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/clarity/clarity.toml` (system-wide)
/// 3. `~/.config/clarity/clarity.toml` (user XDG config)
/// 4. `./clarity.toml` (local directory)
/// 5. `CLARITY_*` environment variables
pub fn load_config() -> Result<ClarityConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<ClarityConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ClarityConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ClarityConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ClarityConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Config file locations, lowest precedence first.
pub(crate) fn config_file_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from("/etc/clarity/clarity.toml")];
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join("clarity/clarity.toml"));
    }
    candidates.push(PathBuf::from("clarity.toml"));
    candidates
}

/// Build the Figment used internally for config loading.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(ClarityConfig::default()));
    for path in config_file_candidates() {
        if path.is_file() {
            debug!(path = %path.display(), "merging config file");
        }
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so underscore-containing
/// keys survive: `CLARITY_VAULT_KDF_ITERATIONS` maps to `vault.kdf_iterations`.
/// `CLARITY_VAULT_KEY` and `CLARITY_NEW_VAULT_KEY` carry passphrases and are excluded.
///
/// Figment hands `map` the key with its original case, so it is lowercased here.
fn env_provider() -> Env {
    Env::prefixed("CLARITY_")
        .ignore(&["VAULT_KEY", "NEW_VAULT_KEY"])
        .map(|key| {
            let mapped = key
                .as_str()
                .to_ascii_lowercase()
                .replacen("storage_", "storage.", 1)
                .replacen("vault_", "vault.", 1)
                .replacen("logging_", "logging.", 1);
            mapped.into()
        })
}
