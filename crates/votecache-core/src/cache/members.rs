//! Deduplicated member directory shared by every cached vote.
//!
//! A vote references ~700 members whose profiles barely change between
//! votes, so profiles are stored once here and votes keep only ids.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use super::document::{self, retain_most_recent};
use super::entry::MemberCacheEntry;
use crate::blob;
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::models::{Member, MemberId, MemberVote, MetaVote};
use crate::store::KvStore;

pub struct MemberDirectory {
    store: Arc<dyn KvStore>,
    key: String,
    refresh: Duration,
    capacity: usize,
    write_lock: Mutex<()>,
}

impl MemberDirectory {
    pub fn new(store: Arc<dyn KvStore>, config: &CacheConfig) -> Self {
        Self {
            store,
            key: config.member_key.clone(),
            refresh: config.member_refresh,
            capacity: config.max_members,
            write_lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<BTreeMap<MemberId, MemberCacheEntry>> {
        Ok(document::load(self.store.as_ref(), &self.key)?.entries)
    }

    fn needs_refresh(&self, entry: Option<&MemberCacheEntry>, now: DateTime<Utc>) -> bool {
        entry.map_or(true, |e| now - e.fetched_at > self.refresh)
    }

    /// Stores the profiles that are missing or older than the refresh
    /// interval. The document is only rewritten when something changed.
    ///
    /// Returns the number of profiles written.
    pub async fn upsert_all(&self, members: Vec<Member>, now: DateTime<Utc>) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load()?;

        let stale: BTreeMap<MemberId, Member> = members
            .into_iter()
            .filter(|m| self.needs_refresh(entries.get(&m.id), now))
            .map(|m| (m.id, m))
            .collect();
        if stale.is_empty() {
            debug!("Member directory is fresh, skipping write");
            return Ok(0);
        }

        let packed: Vec<(MemberId, String)> = blob::offload(move || {
            stale
                .iter()
                .map(|(id, member)| Ok((*id, blob::pack_json_blocking(member)?)))
                .collect()
        })
        .await?;

        let written = packed.len();
        for (id, member) in packed {
            entries.insert(
                id,
                MemberCacheEntry {
                    fetched_at: now,
                    member,
                },
            );
        }

        let dropped = retain_most_recent(&mut entries, self.capacity);
        if !dropped.is_empty() {
            debug!(dropped = dropped.len(), "Pruned member directory");
        }

        document::save(self.store.as_ref(), &self.key, &entries)?;
        debug!(written, total = entries.len(), "Updated member directory");
        Ok(written)
    }

    /// Attaches a profile to every position.
    ///
    /// Fails with `MissingMember` if any id is unknown; a vote is never
    /// hydrated partially.
    pub async fn resolve(&self, metas: &[MetaVote]) -> Result<Vec<MemberVote>> {
        let entries = self.load()?;

        let mut blobs = Vec::with_capacity(metas.len());
        for meta in metas {
            let entry = entries
                .get(&meta.member_id)
                .ok_or(CacheError::MissingMember(meta.member_id))?;
            blobs.push((meta.position, entry.member.clone()));
        }

        blob::offload(move || {
            blobs
                .into_iter()
                .map(|(position, text)| {
                    let member: Member = blob::unpack_json_blocking(&text)?;
                    Ok(MemberVote { member, position })
                })
                .collect()
        })
        .await
    }

    pub async fn get(&self, id: MemberId) -> Result<Option<Member>> {
        let Some(entry) = self.load()?.remove(&id) else {
            return Ok(None);
        };
        Ok(Some(blob::unpack_json(entry.member).await?))
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.load()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Stored size of the directory document in bytes.
    pub fn stored_bytes(&self) -> Result<usize> {
        Ok(document::load::<MemberId, MemberCacheEntry>(self.store.as_ref(), &self.key)?.bytes)
    }

    pub async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.store.remove(&self.key)?;
        Ok(())
    }
}
