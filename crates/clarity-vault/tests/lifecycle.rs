// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end vault lifecycle against an on-disk SQLite store.

use std::sync::Arc;

use clarity_config::model::{StorageConfig, VaultConfig};
use clarity_core::{ClarityError, KeyValueStore};
use clarity_storage::SqliteStorage;
use clarity_vault::{Lookup, Vault, VaultState};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

fn pass(s: &str) -> SecretString {
    SecretString::from(s.to_string())
}

fn fast_vault_config() -> VaultConfig {
    VaultConfig {
        kdf_iterations: 2_000,
        ..VaultConfig::default()
    }
}

async fn open_storage(dir: &TempDir) -> Arc<SqliteStorage> {
    let config = StorageConfig {
        database_path: dir.path().join("clarity.db").to_string_lossy().into_owned(),
        wal_mode: true,
    };
    Arc::new(SqliteStorage::open(&config).await.unwrap())
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Task {
    title: String,
    done: bool,
}

#[tokio::test]
async fn data_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let storage = open_storage(&dir).await;
        storage.set_item("dailyTasks", r#"[{"title":"stretch","done":false}]"#).await.unwrap();

        let mut vault = Vault::new(storage.clone(), fast_vault_config());
        let report = vault.setup(&pass("correct horse battery")).await.unwrap();
        assert_eq!(report.migrated, vec!["dailyTasks"]);

        let tasks = vec![Task {
            title: "write".into(),
            done: true,
        }];
        vault.store().unwrap().set_json("weeklyGoals", &tasks).await.unwrap();
        vault.lock();
    }

    let storage = open_storage(&dir).await;
    let mut vault = Vault::new(storage.clone(), fast_vault_config());
    assert_eq!(vault.state().await.unwrap(), VaultState::Locked);
    assert!(matches!(
        vault.unlock(&pass("incorrect horse")).await,
        Err(ClarityError::WrongPassphrase)
    ));
    vault.unlock(&pass("correct horse battery")).await.unwrap();

    let store = vault.store().unwrap();
    let goals: Option<Vec<Task>> = store.get_json("weeklyGoals").await.unwrap();
    assert_eq!(goals.unwrap()[0].title, "write");
    let migrated: Option<Vec<Task>> = store.get_json("dailyTasks").await.unwrap();
    assert_eq!(
        migrated.unwrap(),
        vec![Task {
            title: "stretch".into(),
            done: false
        }]
    );
    assert_eq!(store.names().await.unwrap(), vec!["dailyTasks", "weeklyGoals"]);

    // Nothing readable is left at rest.
    for key in storage.keys().await.unwrap() {
        let raw = storage.get_item(&key).await.unwrap().unwrap();
        assert!(!raw.contains("stretch"), "{key} leaks plaintext");
    }
}

#[tokio::test]
async fn tampered_record_reads_as_corrupted() {
    let dir = TempDir::new().unwrap();
    let storage = open_storage(&dir).await;
    let mut vault = Vault::new(storage.clone(), fast_vault_config());
    vault.setup(&pass("correct horse battery")).await.unwrap();
    vault.store().unwrap().set("epicsData", "[]").await.unwrap();

    let raw = storage.get_item("enc_epicsData").await.unwrap().unwrap();
    let mut chars: Vec<char> = raw.chars().collect();
    let mid = chars.len() / 2;
    chars[mid] = if chars[mid] == 'A' { 'B' } else { 'A' };
    storage
        .set_item("enc_epicsData", &chars.into_iter().collect::<String>())
        .await
        .unwrap();

    let store = vault.store().unwrap();
    assert_eq!(store.lookup("epicsData").await.unwrap(), Lookup::Corrupted);
    assert_eq!(store.get("epicsData").await.unwrap(), None);
}

#[tokio::test]
async fn rotation_is_durable() {
    let dir = TempDir::new().unwrap();
    let storage = open_storage(&dir).await;
    let mut vault = Vault::new(storage.clone(), fast_vault_config());
    vault.setup(&pass("first passphrase")).await.unwrap();
    vault.store().unwrap().set("flowStateData", "{}").await.unwrap();
    vault
        .change_passphrase(&pass("first passphrase"), &pass("second passphrase"))
        .await
        .unwrap();
    drop(vault);

    let storage = open_storage(&dir).await;
    let mut vault = Vault::new(storage, fast_vault_config());
    vault.unlock(&pass("second passphrase")).await.unwrap();
    assert_eq!(
        vault.store().unwrap().get("flowStateData").await.unwrap().as_deref(),
        Some("{}")
    );
}
