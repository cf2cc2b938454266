//! Credential storage
//!
//! User records come from an external store; the server only needs lookups.
//! The in-memory store is filled from the `users` table of the configuration.

use std::collections::HashMap;

use serde::Deserialize;

/// A user as known to the credential store.
///
/// A record without a password or without accounts does not require that
/// credential.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserRecord {
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub accounts: Vec<String>,
}

impl UserRecord {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: None,
            accounts: Vec::new(),
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_accounts<I, S>(mut self, accounts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accounts = accounts.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    pub fn has_accounts(&self) -> bool {
        !self.accounts.is_empty()
    }

    /// Exact, case-sensitive password comparison.
    pub fn password_matches(&self, candidate: &str) -> bool {
        self.password.as_deref() == Some(candidate)
    }

    /// Exact, case-sensitive account membership.
    pub fn has_account(&self, name: &str) -> bool {
        self.accounts.iter().any(|account| account == name)
    }
}

/// Read-only lookups shared by every session.
pub trait CredentialStore: Send + Sync {
    fn lookup(&self, username: &str) -> Option<UserRecord>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryCredentialStore {
    users: HashMap<String, UserRecord>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: UserRecord) {
        self.users.insert(record.username.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl FromIterator<UserRecord> for MemoryCredentialStore {
    fn from_iter<T: IntoIterator<Item = UserRecord>>(iter: T) -> Self {
        let mut store = Self::new();
        for record in iter {
            store.insert(record);
        }
        store
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn lookup(&self, username: &str) -> Option<UserRecord> {
        self.users.get(username).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_by_exact_name() {
        let store: MemoryCredentialStore = [UserRecord::new("alice").with_password("pw")]
            .into_iter()
            .collect();
        assert!(store.lookup("alice").is_some());
        assert!(store.lookup("Alice").is_none());
    }

    #[test]
    fn account_matching_is_case_sensitive() {
        let record = UserRecord::new("bob").with_accounts(["billing", "ops"]);
        assert!(record.has_accounts());
        assert!(record.has_account("ops"));
        assert!(!record.has_account("OPS"));
    }

    #[test]
    fn records_without_credentials() {
        let record = UserRecord::new("guest");
        assert!(!record.has_password());
        assert!(!record.has_accounts());
        assert!(!record.password_matches(""));
    }
}
