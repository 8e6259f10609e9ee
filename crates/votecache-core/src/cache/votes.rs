//! The vote document: expiry and capacity-bounded eviction.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use super::document::{self, retain_most_recent};
use super::entry::VoteCacheEntry;
use crate::config::CacheConfig;
use crate::error::Result;
use crate::models::VoteId;
use crate::store::KvStore;

pub struct VoteStore {
    store: Arc<dyn KvStore>,
    key: String,
    ttl: Duration,
    capacity: usize,
    write_lock: Mutex<()>,
}

impl VoteStore {
    pub fn new(store: Arc<dyn KvStore>, config: &CacheConfig) -> Self {
        Self {
            store,
            key: config.vote_key.clone(),
            ttl: config.vote_ttl,
            capacity: config.max_votes,
            write_lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<BTreeMap<VoteId, VoteCacheEntry>> {
        Ok(document::load(self.store.as_ref(), &self.key)?.entries)
    }

    fn save(&self, entries: &BTreeMap<VoteId, VoteCacheEntry>) -> Result<usize> {
        document::save(self.store.as_ref(), &self.key, entries)
    }

    /// An entry expires once it is `ttl` old; the boundary itself counts as expired.
    pub fn is_expired(&self, entry: &VoteCacheEntry, now: DateTime<Utc>) -> bool {
        now - entry.fetched_at >= self.ttl
    }

    pub fn entry(&self, id: &VoteId) -> Result<Option<VoteCacheEntry>> {
        Ok(self.load()?.remove(id))
    }

    /// Inserts or replaces `id`. Adding a new id to a full document first
    /// drops the oldest entries down to `capacity - 1`.
    ///
    /// Returns the ids that were evicted to make room.
    pub async fn insert(&self, id: VoteId, entry: VoteCacheEntry) -> Result<Vec<VoteId>> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load()?;

        let mut evicted = Vec::new();
        if !entries.contains_key(&id) && entries.len() >= self.capacity {
            evicted = retain_most_recent(&mut entries, self.capacity.saturating_sub(1));
            debug!(evicted = evicted.len(), "Vote cache full, pruned oldest entries");
        }

        entries.insert(id, entry);
        self.save(&entries)?;
        Ok(evicted)
    }

    /// Removes `id` only if it still holds the entry fetched at `seen`.
    ///
    /// A lookup that found a stale or broken entry uses this, so a newer
    /// entry written in the meantime survives.
    pub async fn remove_if_unchanged(&self, id: &VoteId, seen: DateTime<Utc>) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load()?;
        match entries.get(id) {
            Some(entry) if entry.fetched_at == seen => {}
            _ => return Ok(false),
        }
        entries.remove(id);
        self.save(&entries)?;
        Ok(true)
    }

    /// Drops every expired entry and returns how many went.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load()?;
        let before = entries.len();
        entries.retain(|_, entry| !self.is_expired(entry, now));
        let purged = before - entries.len();
        if purged > 0 {
            self.save(&entries)?;
        }
        Ok(purged)
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.load()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn oldest(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.load()?.values().map(|e| e.fetched_at).min())
    }

    pub fn stored_bytes(&self) -> Result<usize> {
        Ok(document::load::<VoteId, VoteCacheEntry>(self.store.as_ref(), &self.key)?.bytes)
    }

    pub async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.store.remove(&self.key)?;
        Ok(())
    }
}
