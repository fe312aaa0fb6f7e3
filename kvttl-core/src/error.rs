//! Error types for store operations.

use thiserror::Error;

/// Errors returned by [`Store`](crate::Store) operations.
///
/// Both variants carry the offending key. Neither is fatal: the store never
/// retries or swallows them, callers decide what to do next.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError<K> {
    /// A live entry already occupies the key
    #[error("key '{0}' already exists")]
    AlreadyExists(K),

    /// No live entry exists for the key
    #[error("key '{0}' does not exist")]
    NotFound(K),
}

impl<K> StoreError<K> {
    /// Returns the key the failed operation was called with
    pub fn key(&self) -> &K {
        match self {
            StoreError::AlreadyExists(key) | StoreError::NotFound(key) => key,
        }
    }

    pub fn into_key(self) -> K {
        match self {
            StoreError::AlreadyExists(key) | StoreError::NotFound(key) => key,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, StoreError::AlreadyExists(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_include_key() {
        let err = StoreError::AlreadyExists("user:1".to_string());
        assert_eq!(err.to_string(), "key 'user:1' already exists");

        let err = StoreError::NotFound("user:1".to_string());
        assert_eq!(err.to_string(), "key 'user:1' does not exist");
    }

    #[test]
    fn test_key_accessors() {
        let err = StoreError::NotFound(42u32);
        assert!(err.is_not_found());
        assert!(!err.is_already_exists());
        assert_eq!(*err.key(), 42);
        assert_eq!(err.into_key(), 42);
    }
}
