//! Persistent client-side cache for European Parliament roll-call votes.
//!
//! A detailed vote carries ~700 member positions plus the full profile of
//! every member, which is far too much to store verbatim in a small
//! quota-limited store. This crate keeps:
//!
//! - `codec`: a bit-packed, Elias-gamma gap encoding of (member id, position)
//!   lists
//! - `blob`: zlib + base64 packing of JSON payloads
//! - `cache`: the vote document and a deduplicated member directory, with
//!   expiry and recency-based eviction
//! - `store`: the `KvStore` capability with memory and file backends
//! - `source`: cache-first lookups over a remote `VoteSource`

pub mod blob;
pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod models;
pub mod source;
pub mod store;
pub mod tasks;

pub use cache::{CacheLookup, CacheStats, MissReason, VoteCacheManager};
pub use config::CacheConfig;
pub use error::{CacheError, CodecError, StorageError};
pub use models::{Member, MemberId, MemberVote, MetaVote, Position, Vote, VoteDetails, VoteId};
pub use source::{CachedVotes, Origin, VoteSource};
pub use store::{FileStore, KvStore, MemoryStore};
