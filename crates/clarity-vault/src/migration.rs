// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot migration of legacy plaintext values into the encrypted store.
//!
//! Each legacy key is migrated independently: write the encrypted record,
//! then delete the plaintext original. A run interrupted between the two
//! steps leaves both copies; the next run rewrites the record from the
//! plaintext and finishes the delete. The presence of plaintext is the only
//! signal, there is no completion flag.

use clarity_core::{ClarityError, KeyValueStore};
use tracing::{info, warn};

use crate::store::EncryptedStore;
use crate::vault::is_reserved_key;

/// Report of what the migration did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// Logical names moved into the encrypted store.
    pub migrated: Vec<String>,
    /// Logical names whose migration failed, with the reason. Plaintext is
    /// left in place for these so a later run can retry.
    pub failed: Vec<(String, String)>,
}

impl MigrationReport {
    /// True when nothing failed.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Move every non-empty plaintext value under `legacy_keys` into `store`.
///
/// Best effort: a failure on one key is recorded and the loop continues.
pub async fn migrate_legacy<S: KeyValueStore + ?Sized>(
    storage: &S,
    store: &EncryptedStore<'_, S>,
    legacy_keys: &[String],
) -> MigrationReport {
    let mut report = MigrationReport::default();

    for name in legacy_keys {
        if is_reserved_key(name) {
            warn!(name = %name, "legacy key collides with vault metadata -- skipped");
            report
                .failed
                .push((name.clone(), "name is reserved for vault records".to_string()));
            continue;
        }
        match migrate_one(storage, store, name).await {
            Ok(true) => {
                info!(name = %name, "migrated plaintext value into encrypted store");
                report.migrated.push(name.clone());
            }
            Ok(false) => {}
            Err(e) => {
                warn!(name = %name, error = %e, "legacy value migration failed -- will retry next run");
                report.failed.push((name.clone(), e.to_string()));
            }
        }
    }

    if report.migrated.is_empty() && report.failed.is_empty() {
        info!("no legacy plaintext values found -- nothing to migrate");
    }
    report
}

async fn migrate_one<S: KeyValueStore + ?Sized>(
    storage: &S,
    store: &EncryptedStore<'_, S>,
    name: &str,
) -> Result<bool, ClarityError> {
    let plaintext = match storage.get_item(name).await? {
        Some(value) if !value.is_empty() => value,
        _ => return Ok(false),
    };

    store.set(name, &plaintext).await?;
    storage.remove_item(name).await?;
    Ok(true)
}
