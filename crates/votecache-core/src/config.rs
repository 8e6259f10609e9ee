//! Cache policy configuration.
//!
//! Defaults size the cache for a browser-sized quota: a vote entry is a few
//! hundred bytes once its roster goes through the position codec, while the
//! ~700 member profiles are stored once and shared by every vote.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Storage key of the vote document.
pub const VOTE_CACHE_KEY: &str = "eu_votes_vote_cache";

/// Storage key of the member directory document.
pub const MEMBER_CACHE_KEY: &str = "eu_votes_mep_cache";

/// Votes older than this are treated as missing and evicted on read.
const VOTE_TTL_DAYS: i64 = 7;

/// A member profile refreshed within this window is not rewritten.
/// Rosters barely change, so rewriting them on every vote write is waste.
const MEMBER_REFRESH_HOURS: i64 = 2;

const MAX_VOTES: usize = 1000;
const MAX_MEMBERS: usize = 1500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Expiry of vote entries, in seconds when serialized.
    #[serde(with = "duration_secs")]
    pub vote_ttl: Duration,
    /// Minimum age before a member profile is rewritten, in seconds when serialized.
    #[serde(with = "duration_secs")]
    pub member_refresh: Duration,
    pub max_votes: usize,
    pub max_members: usize,
    pub vote_key: String,
    pub member_key: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            vote_ttl: Duration::days(VOTE_TTL_DAYS),
            member_refresh: Duration::hours(MEMBER_REFRESH_HOURS),
            max_votes: MAX_VOTES,
            max_members: MAX_MEMBERS,
            vote_key: VOTE_CACHE_KEY.to_string(),
            member_key: MEMBER_CACHE_KEY.to_string(),
        }
    }
}

mod duration_secs {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::seconds(i64::deserialize(deserializer)?))
    }
}
