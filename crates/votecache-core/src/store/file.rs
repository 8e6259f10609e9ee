use std::path::{Path, PathBuf};

use tracing::debug;

use super::{check_quota, KvStore};
use crate::error::StorageError;

/// Stores each key as `<dir>/<key>.json`.
///
/// Quota usage counts the sizes of every `.json` file in the directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    quota: Option<usize>,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, quota: None })
    }

    pub fn with_quota(dir: PathBuf, quota: usize) -> Result<Self, StorageError> {
        let mut store = Self::new(dir)?;
        store.quota = Some(quota);
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }

    fn used_bytes(&self) -> Result<usize, StorageError> {
        let mut used = 0;
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                used += std::fs::metadata(&path)?.len() as usize;
            }
        }
        Ok(used)
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        if self.quota.is_some() {
            let replaced = std::fs::metadata(&path).map_or(0, |m| m.len() as usize);
            check_quota(self.quota, self.used_bytes()?, replaced, value.len())?;
        }
        std::fs::write(&path, value)?;
        debug!(key, bytes = value.len(), "Wrote store file");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
