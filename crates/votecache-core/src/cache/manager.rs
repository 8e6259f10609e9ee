//! Cache orchestration over the vote document and the member directory.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::entry::VoteCacheEntry;
use super::members::MemberDirectory;
use super::votes::VoteStore;
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::models::{Vote, VoteId};
use crate::store::KvStore;
use crate::tasks::spawn_detached;

/// Why a lookup did not produce a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissReason {
    /// Never cached, or already evicted.
    Absent,
    /// Older than the vote TTL; the entry has been removed.
    Expired,
    /// The entry or its document could not be decoded.
    Corrupt,
    /// At least one referenced member is missing from the directory.
    Incomplete,
}

impl std::fmt::Display for MissReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissReason::Absent => write!(f, "absent"),
            MissReason::Expired => write!(f, "expired"),
            MissReason::Corrupt => write!(f, "corrupt"),
            MissReason::Incomplete => write!(f, "incomplete"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    Hit(Vote),
    Miss(MissReason),
}

impl CacheLookup {
    pub fn into_vote(self) -> Option<Vote> {
        match self {
            CacheLookup::Hit(vote) => Some(vote),
            CacheLookup::Miss(_) => None,
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, CacheLookup::Hit(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub votes: usize,
    pub members: usize,
    pub vote_bytes: usize,
    pub member_bytes: usize,
    pub oldest_vote: Option<DateTime<Utc>>,
}

impl CacheStats {
    pub fn total_bytes(&self) -> usize {
        self.vote_bytes + self.member_bytes
    }
}

/// Persistent cache of detailed votes.
///
/// Every operation is best effort: reads turn failures into misses, so a
/// caller can always fall back to fetching the vote again.
pub struct VoteCacheManager {
    votes: VoteStore,
    members: MemberDirectory,
}

impl VoteCacheManager {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self::with_config(store, CacheConfig::default())
    }

    pub fn with_config(store: Arc<dyn KvStore>, config: CacheConfig) -> Self {
        Self {
            votes: VoteStore::new(Arc::clone(&store), &config),
            members: MemberDirectory::new(store, &config),
        }
    }

    pub fn members(&self) -> &MemberDirectory {
        &self.members
    }

    pub async fn get(&self, id: &VoteId) -> Option<Vote> {
        self.lookup(id).await.into_vote()
    }

    pub async fn lookup(&self, id: &VoteId) -> CacheLookup {
        self.lookup_at(id, Utc::now()).await
    }

    pub async fn lookup_at(&self, id: &VoteId, now: DateTime<Utc>) -> CacheLookup {
        let entry = match self.votes.entry(id) {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                debug!(vote_id = %id, "Cache miss");
                return CacheLookup::Miss(MissReason::Absent);
            }
            Err(e) => {
                warn!(vote_id = %id, error = %e, "Failed to read vote cache");
                return CacheLookup::Miss(MissReason::Corrupt);
            }
        };

        if self.votes.is_expired(&entry, now) {
            debug!(vote_id = %id, fetched_at = %entry.fetched_at, "Cached vote expired");
            self.evict(id, &entry).await;
            return CacheLookup::Miss(MissReason::Expired);
        }

        let (details, metas) = match entry.decode().await {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(vote_id = %id, error = %e, "Failed to decode cached vote");
                self.evict(id, &entry).await;
                return CacheLookup::Miss(MissReason::Corrupt);
            }
        };

        match self.members.resolve(&metas).await {
            Ok(member_votes) => {
                debug!(vote_id = %id, members = member_votes.len(), "Cache hit");
                CacheLookup::Hit(Vote::assemble(details, member_votes))
            }
            Err(CacheError::MissingMember(member_id)) => {
                debug!(vote_id = %id, %member_id, "Cached vote references an unknown member");
                CacheLookup::Miss(MissReason::Incomplete)
            }
            Err(e) => {
                warn!(vote_id = %id, error = %e, "Failed to hydrate cached vote");
                CacheLookup::Miss(MissReason::Corrupt)
            }
        }
    }

    /// Removes `seen` unless `id` has been rewritten since it was read.
    async fn evict(&self, id: &VoteId, seen: &VoteCacheEntry) {
        if let Err(e) = self.votes.remove_if_unchanged(id, seen.fetched_at).await {
            warn!(vote_id = %id, error = %e, "Failed to evict cached vote");
        }
    }

    pub async fn set(&self, id: &VoteId, vote: Vote) -> Result<()> {
        self.set_at(id, vote, Utc::now()).await
    }

    /// Stores `vote` under `id` and refreshes the member profiles it
    /// references.
    pub async fn set_at(&self, id: &VoteId, vote: Vote, now: DateTime<Utc>) -> Result<()> {
        let (entry, members) = VoteCacheEntry::encode(vote, now).await?;
        let count = entry.count;

        let evicted = self.votes.insert(id.clone(), entry).await?;
        let refreshed = self.members.upsert_all(members, now).await?;

        debug!(
            vote_id = %id,
            positions = count,
            evicted = evicted.len(),
            members_refreshed = refreshed,
            "Cached vote"
        );
        Ok(())
    }

    /// Runs [`set`](Self::set) in the background. Errors are logged, never
    /// returned.
    pub fn set_detached(self: &Arc<Self>, id: VoteId, vote: Vote) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        spawn_detached("cache vote", async move { cache.set(&id, vote).await })
    }

    /// Removes every expired vote entry.
    pub async fn purge_expired(&self) -> Result<usize> {
        self.purge_expired_at(Utc::now()).await
    }

    pub async fn purge_expired_at(&self, now: DateTime<Utc>) -> Result<usize> {
        let purged = self.votes.purge_expired(now).await?;
        debug!(purged, "Purged expired votes");
        Ok(purged)
    }

    /// Removes both documents.
    pub async fn clear(&self) -> Result<()> {
        self.votes.clear().await?;
        self.members.clear().await?;
        debug!("Caches cleared");
        Ok(())
    }

    pub fn stats(&self) -> Result<CacheStats> {
        Ok(CacheStats {
            votes: self.votes.len()?,
            members: self.members.len()?,
            vote_bytes: self.votes.stored_bytes()?,
            member_bytes: self.members.stored_bytes()?,
            oldest_vote: self.votes.oldest()?,
        })
    }
}
