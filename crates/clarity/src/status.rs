// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `clarity status` command implementation.
//!
//! Reports vault state from persisted metadata alone. No passphrase is read
//! and nothing is decrypted.

use std::process::ExitCode;

use clarity_config::model::ClarityConfig;
use clarity_core::{ClarityError, KeyValueStore};
use clarity_vault::vault::KDF_KEY;
use clarity_vault::{KdfParams, RECORD_PREFIX, Vault, VaultState};
use serde::Serialize;

use crate::commands::open_vault;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub state: String,
    pub database_path: String,
    /// KDF iteration count of the vault; absent before setup.
    pub kdf_iterations: Option<u32>,
    pub records: usize,
    /// Legacy plaintext keys still waiting for migration.
    pub legacy_pending: Vec<String>,
}

/// Gather status for `vault` without unlocking it.
pub async fn collect_status<S: KeyValueStore>(
    vault: &Vault<S>,
    config: &ClarityConfig,
) -> Result<StatusResponse, ClarityError> {
    let state = vault.state().await?;
    let storage = vault.storage();

    let kdf_iterations = match state {
        VaultState::Uninitialized => None,
        _ => Some(match storage.get_item(KDF_KEY).await? {
            Some(raw) => KdfParams::from_json(&raw)?.iterations,
            None => KdfParams::legacy().iterations,
        }),
    };

    let keys = storage.keys().await?;
    let records = keys.iter().filter(|k| k.starts_with(RECORD_PREFIX)).count();
    let legacy_pending = config
        .vault
        .legacy_keys
        .iter()
        .filter(|k| keys.contains(k))
        .cloned()
        .collect();

    Ok(StatusResponse {
        state: state.to_string(),
        database_path: config.storage.database_path.clone(),
        kdf_iterations,
        records,
        legacy_pending,
    })
}

/// Run the `clarity status` command.
pub async fn run_status(config: &ClarityConfig, json: bool) -> Result<ExitCode, ClarityError> {
    let vault = open_vault(config).await?;
    let status = collect_status(&vault, config).await?;

    if json {
        let rendered = serde_json::to_string_pretty(&status)
            .map_err(|e| ClarityError::Internal(format!("failed to encode status: {e}")))?;
        println!("{rendered}");
    } else {
        print_status(&status);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_status(status: &StatusResponse) {
    println!();
    println!("  clarity status");
    println!("  {}", "-".repeat(35));
    println!("    Vault:    {}", status.state);
    println!("    Database: {}", status.database_path);
    if let Some(iterations) = status.kdf_iterations {
        println!("    KDF:      pbkdf2-sha256, {iterations} iterations");
    }
    println!("    Records:  {}", status.records);
    if !status.legacy_pending.is_empty() {
        println!("    Pending:  {} (run `clarity migrate`)", status.legacy_pending.join(", "));
    }
    if status.state == "uninitialized" {
        println!();
        println!("  Create one with: clarity setup");
    }
    println!();
}
