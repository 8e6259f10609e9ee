//! Cache-first access to a remote vote source.

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::cache::{CacheLookup, VoteCacheManager};
use crate::models::{Vote, VoteId};
use crate::tasks::DetachedTasks;

/// Something that can fetch a detailed vote, typically over HTTP.
pub trait VoteSource: Send + Sync {
    fn fetch_vote(&self, id: &VoteId) -> impl Future<Output = Result<Vote>> + Send;
}

/// Where a vote came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Cache,
    Network,
}

/// Serves votes from the cache and falls back to the source on any miss.
///
/// Fetched votes are written back in the background; the write never
/// affects the returned vote.
pub struct CachedVotes<S> {
    source: S,
    cache: Arc<VoteCacheManager>,
    pending: DetachedTasks,
}

impl<S: VoteSource> CachedVotes<S> {
    pub fn new(source: S, cache: Arc<VoteCacheManager>) -> Self {
        Self {
            source,
            cache,
            pending: DetachedTasks::new(),
        }
    }

    pub fn cache(&self) -> &Arc<VoteCacheManager> {
        &self.cache
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn get_vote(&self, id: &VoteId) -> Result<(Vote, Origin)> {
        let reason = match self.cache.lookup(id).await {
            CacheLookup::Hit(vote) => return Ok((vote, Origin::Cache)),
            CacheLookup::Miss(reason) => reason,
        };
        debug!(vote_id = %id, %reason, "Fetching vote from source");

        let vote = self.source.fetch_vote(id).await?;
        self.pending
            .track(self.cache.set_detached(id.clone(), vote.clone()));
        Ok((vote, Origin::Network))
    }

    /// Number of cache writes still running.
    pub fn pending_writes(&self) -> usize {
        self.pending.pending()
    }

    /// Waits for background cache writes to finish.
    pub async fn flush(&self) {
        self.pending.drain().await;
    }
}
