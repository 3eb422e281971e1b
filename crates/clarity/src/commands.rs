// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault-backed subcommands.

use std::process::ExitCode;
use std::sync::Arc;

use clarity_config::model::ClarityConfig;
use clarity_core::ClarityError;
use clarity_storage::SqliteStorage;
use clarity_vault::{Lookup, MigrationReport, Vault};
use tracing::debug;

/// Open the configured database and wrap it in a locked vault.
pub async fn open_vault(config: &ClarityConfig) -> Result<Vault<SqliteStorage>, ClarityError> {
    let storage = SqliteStorage::open(&config.storage).await?;
    Ok(Vault::new(Arc::new(storage), config.vault.clone()))
}

async fn unlocked(config: &ClarityConfig) -> Result<Vault<SqliteStorage>, ClarityError> {
    let mut vault = open_vault(config).await?;
    if !vault.is_setup().await? {
        return Err(ClarityError::VaultNotFound);
    }
    let passphrase = clarity_vault::get_vault_passphrase()?;
    vault.unlock(&passphrase).await?;
    Ok(vault)
}

pub async fn setup(config: &ClarityConfig, force: bool) -> Result<ExitCode, ClarityError> {
    let mut vault = open_vault(config).await?;
    if vault.is_setup().await? && !force {
        eprintln!("error: a vault already exists at {}", config.storage.database_path);
        eprintln!("  Re-run with --force to replace it. Existing records will become unreadable.");
        return Ok(ExitCode::FAILURE);
    }

    let passphrase = clarity_vault::get_vault_passphrase_with_confirm()?;
    let report = vault.setup(&passphrase).await?;
    println!("Vault created at {}", config.storage.database_path);
    Ok(print_migration(&report))
}

pub async fn get(config: &ClarityConfig, name: &str) -> Result<ExitCode, ClarityError> {
    let vault = unlocked(config).await?;
    match vault.store()?.lookup(name).await? {
        Lookup::Found(value) => {
            println!("{value}");
            Ok(ExitCode::SUCCESS)
        }
        Lookup::NotFound => {
            eprintln!("no record named `{name}`");
            Ok(ExitCode::FAILURE)
        }
        Lookup::Corrupted => {
            eprintln!("record `{name}` failed authentication and cannot be read");
            Ok(ExitCode::FAILURE)
        }
    }
}

pub async fn set(config: &ClarityConfig, name: &str, value: &str) -> Result<ExitCode, ClarityError> {
    let vault = unlocked(config).await?;
    vault.store()?.set(name, value).await?;
    debug!(name, "record stored from cli");
    Ok(ExitCode::SUCCESS)
}

pub async fn remove(config: &ClarityConfig, name: &str) -> Result<ExitCode, ClarityError> {
    let vault = unlocked(config).await?;
    vault.store()?.remove(name).await?;
    Ok(ExitCode::SUCCESS)
}

pub async fn keys(config: &ClarityConfig) -> Result<ExitCode, ClarityError> {
    let vault = unlocked(config).await?;
    for name in vault.store()?.names().await? {
        println!("{name}");
    }
    Ok(ExitCode::SUCCESS)
}

pub async fn migrate(config: &ClarityConfig) -> Result<ExitCode, ClarityError> {
    let vault = unlocked(config).await?;
    let report = vault.migrate().await?;
    Ok(print_migration(&report))
}

pub async fn change_passphrase(config: &ClarityConfig) -> Result<ExitCode, ClarityError> {
    let mut vault = open_vault(config).await?;
    if !vault.is_setup().await? {
        return Err(ClarityError::VaultNotFound);
    }
    let current = clarity_vault::get_vault_passphrase()?;
    vault.unlock(&current).await?;

    let replacement = clarity_vault::get_new_vault_passphrase()?;
    let (reencrypted, skipped) = vault.change_passphrase(&current, &replacement).await?;
    vault.storage().database().checkpoint().await?;

    println!("Passphrase changed; {reencrypted} record(s) re-encrypted.");
    if skipped > 0 {
        eprintln!("warning: {skipped} unreadable record(s) left under the old key");
    }
    Ok(ExitCode::SUCCESS)
}

fn print_migration(report: &MigrationReport) -> ExitCode {
    for name in &report.migrated {
        println!("Migrated {name}");
    }
    for (name, reason) in &report.failed {
        eprintln!("warning: could not migrate {name}: {reason}");
    }
    if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

