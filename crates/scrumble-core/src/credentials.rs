// Voter fingerprint and admin key persistence on top of `LocalStorage`.

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::storage::LocalStorage;

pub const FINGERPRINT_KEY: &str = "scrumble-fp";
pub const ADMIN_KEY_STORAGE: &str = "scrumble-admin-key";

// ---------------------------------------------------------------------------
// FingerprintStore
// ---------------------------------------------------------------------------

/// Per-installation voter identifier used as a weak vote-deduplication token.
///
/// Generated once as `fp-<unix millis>-<random fraction>` and returned
/// unchanged for as long as the storage entry lives. Uniqueness is
/// probabilistic only.
#[derive(Clone)]
pub struct FingerprintStore {
    storage: Arc<LocalStorage>,
}

impl FingerprintStore {
    pub fn new(storage: Arc<LocalStorage>) -> Self {
        Self { storage }
    }

    pub fn get_fingerprint(&self) -> Result<String> {
        if let Some(existing) = self.storage.get_item(FINGERPRINT_KEY)? {
            if !existing.is_empty() {
                return Ok(existing);
            }
        }

        let value = generate_fingerprint(
            chrono::Utc::now().timestamp_millis(),
            rand::random::<f64>(),
        );
        self.storage.set_item(FINGERPRINT_KEY, &value)?;
        info!("Generated new voter fingerprint");
        Ok(value)
    }
}

fn generate_fingerprint(millis: i64, fraction: f64) -> String {
    format!("fp-{millis}-{fraction}")
}

// ---------------------------------------------------------------------------
// AdminKeyStore
// ---------------------------------------------------------------------------

/// Operator-supplied shared secret for admin mutations. Never validated
/// locally; a bad key only shows up as a failed admin request.
#[derive(Clone)]
pub struct AdminKeyStore {
    storage: Arc<LocalStorage>,
}

impl AdminKeyStore {
    pub fn new(storage: Arc<LocalStorage>) -> Self {
        Self { storage }
    }

    /// The stored key, or an empty string when unset.
    pub fn get(&self) -> Result<String> {
        Ok(self.storage.get_item(ADMIN_KEY_STORAGE)?.unwrap_or_default())
    }

    /// Persist `value` verbatim; an empty value clears the key.
    pub fn set(&self, value: &str) -> Result<()> {
        if value.is_empty() {
            debug!("Clearing admin key");
            return self.storage.remove_item(ADMIN_KEY_STORAGE);
        }
        debug!("Storing admin key");
        self.storage.set_item(ADMIN_KEY_STORAGE, value)
    }

    pub fn is_set(&self) -> Result<bool> {
        Ok(!self.get()?.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> Arc<LocalStorage> {
        Arc::new(LocalStorage::in_memory().unwrap())
    }

    #[test]
    fn fingerprint_format() {
        assert_eq!(generate_fingerprint(1700000000000, 0.5), "fp-1700000000000-0.5");
    }

    #[test]
    fn fingerprint_is_stable_once_created() {
        let store = FingerprintStore::new(storage());
        let first = store.get_fingerprint().unwrap();
        assert!(first.starts_with("fp-"));
        for _ in 0..5 {
            assert_eq!(store.get_fingerprint().unwrap(), first);
        }
    }

    #[test]
    fn fingerprint_shared_across_store_handles() {
        let shared = storage();
        let a = FingerprintStore::new(shared.clone()).get_fingerprint().unwrap();
        let b = FingerprintStore::new(shared).get_fingerprint().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn existing_fingerprint_is_returned_verbatim() {
        let shared = storage();
        shared.set_item(FINGERPRINT_KEY, "fp-legacy").unwrap();
        let store = FingerprintStore::new(shared);
        assert_eq!(store.get_fingerprint().unwrap(), "fp-legacy");
    }

    #[test]
    fn empty_fingerprint_is_regenerated() {
        let shared = storage();
        shared.set_item(FINGERPRINT_KEY, "").unwrap();
        let store = FingerprintStore::new(shared.clone());
        let value = store.get_fingerprint().unwrap();
        assert!(value.starts_with("fp-"));
        assert_eq!(shared.get_item(FINGERPRINT_KEY).unwrap(), Some(value));
    }

    #[test]
    fn admin_key_defaults_to_empty() {
        let store = AdminKeyStore::new(storage());
        assert_eq!(store.get().unwrap(), "");
        assert!(!store.is_set().unwrap());
    }

    #[test]
    fn admin_key_set_verbatim_and_cleared_by_empty() {
        let shared = storage();
        let store = AdminKeyStore::new(shared.clone());

        store.set(" secret ").unwrap();
        assert_eq!(store.get().unwrap(), " secret ");
        assert!(store.is_set().unwrap());

        store.set("").unwrap();
        assert_eq!(store.get().unwrap(), "");
        assert_eq!(shared.get_item(ADMIN_KEY_STORAGE).unwrap(), None);
    }
}
