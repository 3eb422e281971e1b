// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the KeyValueStore trait.

use async_trait::async_trait;
use rusqlite::params;
use tracing::debug;

use clarity_config::model::StorageConfig;
use clarity_core::{ClarityError, KeyValueStore};

use crate::database::{map_tr_err, Database};

/// SQLite-backed local storage.
///
/// Every key lives in one row of the `local_storage` table. Batch writes run in
/// a single transaction so related entries land together or not at all.
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    db: Database,
}

impl SqliteStorage {
    /// Wrap an already opened [`Database`].
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open the database described by `config`.
    pub async fn open(config: &StorageConfig) -> Result<Self, ClarityError> {
        let db = Database::open(&config.database_path, config.wal_mode).await?;
        debug!(path = %config.database_path, "SQLite storage initialized");
        Ok(Self { db })
    }

    /// Returns the underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl KeyValueStore for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn get_item(&self, key: &str) -> Result<Option<String>, ClarityError> {
        let key = key.to_string();
        self.db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare("SELECT value FROM local_storage WHERE key = ?1")?;
                match stmt.query_row(params![key], |row| row.get::<_, String>(0)) {
                    Ok(value) => Ok(Some(value)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e),
                }
            })
            .await
            .map_err(map_tr_err)
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), ClarityError> {
        let key = key.to_string();
        let value = value.to_string();
        self.db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO local_storage (key, value) VALUES (?1, ?2)",
                    params![key, value],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn remove_item(&self, key: &str) -> Result<(), ClarityError> {
        let key = key.to_string();
        self.db
            .connection()
            .call(move |conn| {
                conn.execute("DELETE FROM local_storage WHERE key = ?1", params![key])?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn keys(&self) -> Result<Vec<String>, ClarityError> {
        self.db
            .connection()
            .call(|conn| {
                let mut stmt = conn.prepare("SELECT key FROM local_storage ORDER BY key")?;
                let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
                rows.collect::<Result<Vec<_>, _>>()
            })
            .await
            .map_err(map_tr_err)
    }

    async fn set_items(&self, items: &[(&str, &str)]) -> Result<(), ClarityError> {
        let items: Vec<(String, String)> = items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.db
            .connection()
            .call(move |conn| {
                let tx = conn.transaction()?;
                for (key, value) in &items {
                    tx.execute(
                        "INSERT OR REPLACE INTO local_storage (key, value) VALUES (?1, ?2)",
                        params![key, value],
                    )?;
                }
                tx.commit()
            })
            .await
            .map_err(map_tr_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn open_test_storage() -> (SqliteStorage, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let config = StorageConfig {
            database_path: dir.path().join("kv.db").to_str().unwrap().to_string(),
            wal_mode: true,
        };
        (SqliteStorage::open(&config).await.unwrap(), dir)
    }

    #[tokio::test]
    async fn get_missing_key_returns_none() {
        let (storage, _dir) = open_test_storage().await;
        assert_eq!(storage.get_item("nothing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_get_overwrite_remove() {
        let (storage, _dir) = open_test_storage().await;

        storage.set_item("dailyTasks", "[1]").await.unwrap();
        assert_eq!(storage.get_item("dailyTasks").await.unwrap().as_deref(), Some("[1]"));

        storage.set_item("dailyTasks", "[1,2]").await.unwrap();
        assert_eq!(storage.get_item("dailyTasks").await.unwrap().as_deref(), Some("[1,2]"));

        storage.remove_item("dailyTasks").await.unwrap();
        assert_eq!(storage.get_item("dailyTasks").await.unwrap(), None);

        // Removing again is not an error.
        storage.remove_item("dailyTasks").await.unwrap();
    }

    #[tokio::test]
    async fn keys_are_sorted() {
        let (storage, _dir) = open_test_storage().await;
        storage
            .set_items(&[("zeta", "1"), ("alpha", "2"), ("mid", "3")])
            .await
            .unwrap();
        assert_eq!(storage.keys().await.unwrap(), vec!["alpha", "mid", "zeta"]);
    }

    #[tokio::test]
    async fn values_survive_reopen() {
        let dir = tempdir().unwrap();
        let config = StorageConfig {
            database_path: dir.path().join("kv.db").to_str().unwrap().to_string(),
            wal_mode: true,
        };

        let storage = SqliteStorage::open(&config).await.unwrap();
        storage.set_item("weeklyGoals", "{\"goals\":[]}").await.unwrap();
        storage.database().checkpoint().await.unwrap();
        drop(storage);

        let reopened = SqliteStorage::open(&config).await.unwrap();
        assert_eq!(
            reopened.get_item("weeklyGoals").await.unwrap().as_deref(),
            Some("{\"goals\":[]}")
        );
    }

    #[tokio::test]
    async fn in_memory_backend() {
        let storage = SqliteStorage::new(Database::open_in_memory().await.unwrap());
        assert_eq!(storage.name(), "sqlite");
        storage.set_item("k", "v").await.unwrap();
        assert_eq!(storage.get_item("k").await.unwrap().as_deref(), Some("v"));
    }
}
