//! Demo credential table persisted as one JSON blob in a string key-value
//! medium (`localStorage` in the browser). Passwords are stored in plaintext;
//! this is a local simulation, not an authentication backend.
//!
//! The table is loaded fresh on every call and rewritten whole on every write.
//! Malformed or unreadable content is treated as an empty table so a corrupted
//! store never breaks the page.

use crate::auth::validation::normalize_email;
use crate::errors::StorageError;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

/// String-keyed storage with whole-value reads and writes.
pub trait KeyValueStore {
    /// # Errors
    /// Returns an error if the medium cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    /// Returns an error if the medium rejects the write (quota, privacy mode).
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// # Errors
    /// Returns an error if the medium cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process storage for native hosts and tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<BTreeMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// One registered demo account.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Normalized email -> record.
pub type CredentialTable = BTreeMap<String, UserRecord>;

/// Credential table and logged-in marker on top of a [`KeyValueStore`].
#[derive(Debug)]
pub struct CredentialStore<S> {
    storage: S,
    users_key: String,
    session_key: String,
}

impl<S: KeyValueStore> CredentialStore<S> {
    pub fn new(storage: S, users_key: impl Into<String>, session_key: impl Into<String>) -> Self {
        Self {
            storage,
            users_key: users_key.into(),
            session_key: session_key.into(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Looks up a record by email, ignoring case and surrounding whitespace.
    pub fn get(&self, email: &str) -> Option<UserRecord> {
        let key = normalize_email(email);
        self.load_table().remove(&key)
    }

    /// Inserts or overwrites the record for `email`. Callers validate first.
    ///
    /// # Errors
    /// Returns an error if the table cannot be encoded or written back.
    pub fn put(&self, email: &str, password: &str) -> Result<(), StorageError> {
        let key = normalize_email(email);
        let mut table = self.load_table();
        table.insert(
            key.clone(),
            UserRecord {
                email: key.clone(),
                password: password.to_string(),
            },
        );

        let encoded = serde_json::to_string(&table)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        self.storage.set_item(&self.users_key, &encoded)?;

        debug!(email = %key, users = table.len(), "stored credential record");
        Ok(())
    }

    /// Records which account is currently signed in.
    ///
    /// # Errors
    /// Returns an error if the marker cannot be written.
    pub fn set_logged_in(&self, email: &str) -> Result<(), StorageError> {
        self.storage.set_item(&self.session_key, &normalize_email(email))
    }

    /// The signed-in marker, if any.
    pub fn logged_in(&self) -> Option<String> {
        match self.storage.get_item(&self.session_key) {
            Ok(value) => value.filter(|email| !email.trim().is_empty()),
            Err(err) => {
                warn!("unable to read logged-in marker: {err}");
                None
            }
        }
    }

    /// # Errors
    /// Returns an error if the marker cannot be removed.
    pub fn clear_logged_in(&self) -> Result<(), StorageError> {
        self.storage.remove_item(&self.session_key)
    }

    /// Current table; absent, unreadable, or malformed content yields an empty one.
    pub fn load_table(&self) -> CredentialTable {
        let raw = match self.storage.get_item(&self.users_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return CredentialTable::new(),
            Err(err) => {
                warn!("unable to read credential table: {err}");
                return CredentialTable::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!("ignoring malformed credential table: {err}");
            CredentialTable::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CredentialStore<MemoryStorage> {
        CredentialStore::new(MemoryStorage::new(), "demo_users", "demo_logged_in")
    }

    struct ReadOnlyStorage;

    impl KeyValueStore for ReadOnlyStorage {
        fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set_item(&self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Write {
                key: key.to_string(),
                message: "quota exceeded".to_string(),
            })
        }

        fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }
    }

    #[test]
    fn get_on_empty_storage_returns_none() {
        assert_eq!(store().get("a@b.com"), None);
    }

    #[test]
    fn put_then_get_is_case_insensitive() {
        let store = store();
        store.put("  USER@Example.com ", "secret1").unwrap();

        let record = store.get("user@example.com").unwrap();
        assert_eq!(record.email, "user@example.com");
        assert_eq!(record.password, "secret1");
        assert_eq!(store.get("User@EXAMPLE.com"), Some(record));
    }

    #[test]
    fn put_persists_a_single_json_blob() {
        let store = store();
        store.put("a@b.com", "secret1").unwrap();
        store.put("c@d.com", "secret2").unwrap();

        let raw = store.storage().get_item("demo_users").unwrap().unwrap();
        let table: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(table["a@b.com"]["email"], "a@b.com");
        assert_eq!(table["c@d.com"]["password"], "secret2");
    }

    #[test]
    fn put_overwrites_existing_key() {
        let store = store();
        store.put("a@b.com", "first1").unwrap();
        store.put("A@B.com", "second").unwrap();

        assert_eq!(store.load_table().len(), 1);
        assert_eq!(store.get("a@b.com").unwrap().password, "second");
    }

    #[test]
    fn malformed_table_reads_as_empty() {
        let store = store();
        for raw in ["{not json", "null", "[1,2,3]", r#"{"a@b.com": 5}"#] {
            store.storage().set_item("demo_users", raw).unwrap();
            assert!(store.load_table().is_empty(), "{raw} should read as empty");
            assert_eq!(store.get("a@b.com"), None);
        }
    }

    #[test]
    fn put_over_malformed_table_starts_fresh() {
        let store = store();
        store.storage().set_item("demo_users", "garbage").unwrap();
        store.put("a@b.com", "secret1").unwrap();
        assert_eq!(store.load_table().len(), 1);
    }

    #[test]
    fn reads_tables_written_by_the_page() {
        let store = store();
        store
            .storage()
            .set_item(
                "demo_users",
                r#"{"old@site.com":{"email":"old@site.com","password":"hunter22"}}"#,
            )
            .unwrap();
        assert_eq!(store.get("OLD@site.com").unwrap().password, "hunter22");
    }

    #[test]
    fn write_failure_is_reported() {
        let store = CredentialStore::new(ReadOnlyStorage, "demo_users", "demo_logged_in");
        let err = store.put("a@b.com", "secret1").unwrap_err();
        assert!(matches!(err, StorageError::Write { .. }));
    }

    #[test]
    fn logged_in_marker_round_trip() {
        let store = store();
        assert_eq!(store.logged_in(), None);

        store.set_logged_in("A@B.com").unwrap();
        assert_eq!(store.logged_in(), Some("a@b.com".to_string()));

        store.clear_logged_in().unwrap();
        assert_eq!(store.logged_in(), None);
    }

    #[test]
    fn debug_redacts_password() {
        let record = UserRecord {
            email: "a@b.com".to_string(),
            password: "secret1".to_string(),
        };
        let rendered = format!("{record:?}");
        assert!(rendered.contains("a@b.com"));
        assert!(!rendered.contains("secret1"));
    }
}
