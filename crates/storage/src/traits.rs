//! Flag store trait definition.

use async_trait::async_trait;

use crate::error::StorageError;

/// Value written for a set flag. Only presence matters.
pub const FLAG_PRESENT: &str = "1";

/// Key-value store holding one marker per already-alerted tier.
///
/// Every operation is independently idempotent per key: deleting a key
/// that does not exist succeeds, putting an existing key overwrites it.
#[async_trait]
pub trait FlagStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    async fn contains(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get(key).await?.is_some())
    }

    /// Short backend label for logs (e.g. "memory", "file").
    fn backend_name(&self) -> &str;
}
