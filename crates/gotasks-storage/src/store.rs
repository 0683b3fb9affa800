//! Key-value store interface

use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageScope {
    /// Lives until the process exits
    Session,
    /// Survives restarts
    Local,
}

impl StorageScope {
    pub(crate) fn table(&self) -> &'static str {
        match self {
            StorageScope::Session => "session_storage",
            StorageScope::Local => "local_storage",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageScope::Session => "session",
            StorageScope::Local => "local",
        }
    }
}

impl std::fmt::Display for StorageScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Opaque string key-value storage split into scopes.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, scope: StorageScope, key: &str) -> Result<Option<String>>;

    fn set(&self, scope: StorageScope, key: &str, value: &str) -> Result<()>;

    fn remove(&self, scope: StorageScope, key: &str) -> Result<()>;

    fn clear(&self, scope: StorageScope) -> Result<()>;

    fn contains(&self, scope: StorageScope, key: &str) -> Result<bool> {
        Ok(self.get(scope, key)?.is_some())
    }
}
