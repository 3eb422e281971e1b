// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Clarity encrypted store.
//!
//! This crate provides the error taxonomy shared by every Clarity crate and
//! the [`KeyValueStore`] trait that storage backends implement.

pub mod error;
pub mod traits;

// Re-export key items at crate root for ergonomic imports.
pub use error::ClarityError;
pub use traits::KeyValueStore;

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// Minimal backend relying on the default `set_items`.
    struct MapStore(Mutex<BTreeMap<String, String>>);

    #[async_trait]
    impl KeyValueStore for MapStore {
        fn name(&self) -> &str {
            "map"
        }

        async fn get_item(&self, key: &str) -> Result<Option<String>, ClarityError> {
            Ok(self.0.lock().unwrap().get(key).cloned())
        }

        async fn set_item(&self, key: &str, value: &str) -> Result<(), ClarityError> {
            self.0
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn remove_item(&self, key: &str) -> Result<(), ClarityError> {
            self.0.lock().unwrap().remove(key);
            Ok(())
        }

        async fn keys(&self) -> Result<Vec<String>, ClarityError> {
            Ok(self.0.lock().unwrap().keys().cloned().collect())
        }
    }

    #[tokio::test]
    async fn default_set_items_writes_every_entry() {
        let store = MapStore(Mutex::new(BTreeMap::new()));
        store.set_items(&[("a", "1"), ("b", "2")]).await.unwrap();

        assert_eq!(store.get_item("a").await.unwrap().as_deref(), Some("1"));
        assert_eq!(store.get_item("b").await.unwrap().as_deref(), Some("2"));
        assert_eq!(store.keys().await.unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn error_messages_are_user_facing() {
        assert_eq!(ClarityError::WrongPassphrase.to_string(), "incorrect passphrase");
        assert_eq!(
            ClarityError::WeakPassphrase { min_len: 8 }.to_string(),
            "passphrase too short (minimum 8 characters)"
        );
        assert!(ClarityError::storage("disk full").to_string().contains("disk full"));
    }

    #[test]
    fn recoverable_errors() {
        assert!(ClarityError::WrongPassphrase.is_recoverable());
        assert!(ClarityError::VaultNotFound.is_recoverable());
        assert!(!ClarityError::CryptoUnavailable("rng".into()).is_recoverable());
        assert!(!ClarityError::AuthenticationFailed.is_recoverable());
    }
}
