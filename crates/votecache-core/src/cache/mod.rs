//! Two-tier persistent vote cache.
//!
//! This module provides the `VoteCacheManager` for storing and retrieving
//! detailed votes. Two JSON documents live in the key-value store:
//!
//! - the vote document: per vote, compressed metadata and the
//!   codec-packed position list, expiring after 7 days
//! - the member directory: each member profile once, rewritten at most
//!   every 2 hours
//!
//! A vote is only served when every member it references resolves.

pub mod document;
pub mod entry;
pub mod manager;
pub mod members;
pub mod votes;

pub use document::Dated;
pub use entry::{MemberCacheEntry, VoteCacheEntry};
pub use manager::{CacheLookup, CacheStats, MissReason, VoteCacheManager};
pub use members::MemberDirectory;
pub use votes::VoteStore;
