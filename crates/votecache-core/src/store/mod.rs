//! String-keyed persistent storage capability.
//!
//! The cache only needs get/set/remove over strings, so anything from an
//! in-memory map to a directory of files can back it. Both bundled stores
//! accept an optional byte quota to behave like a small browser-style store.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::StorageError;

pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: KvStore + ?Sized> KvStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Fails with `QuotaExceeded` if replacing a value of `replaced` bytes with
/// one of `requested` bytes would push `used` past `quota`.
pub(crate) fn check_quota(
    quota: Option<usize>,
    used: usize,
    replaced: usize,
    requested: usize,
) -> Result<(), StorageError> {
    let Some(quota) = quota else {
        return Ok(());
    };
    let after = used.saturating_sub(replaced) + requested;
    if after > quota {
        return Err(StorageError::QuotaExceeded {
            requested,
            used,
            quota,
        });
    }
    Ok(())
}
