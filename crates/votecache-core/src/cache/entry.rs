//! Stored entry formats.
//!
//! Field names are single letters to keep documents small inside the quota:
//!
//! ```json
//! {"t": 1717171717171, "m": "<metadata blob>", "v": "<positions blob>", "n": 705}
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::document::Dated;
use crate::blob;
use crate::codec::{decode_positions, encode_positions};
use crate::error::Result;
use crate::models::{Member, MetaVote, Vote, VoteDetails};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCacheEntry {
    #[serde(rename = "t", with = "chrono::serde::ts_milliseconds")]
    pub fetched_at: DateTime<Utc>,
    /// Compressed vote metadata, without member positions.
    #[serde(rename = "m")]
    pub metadata: String,
    /// Position codec output.
    #[serde(rename = "v")]
    pub positions: String,
    /// Number of encoded positions.
    #[serde(rename = "n")]
    pub count: usize,
}

impl VoteCacheEntry {
    /// Packs `vote` into an entry and hands back the member profiles it
    /// referenced, which belong in the member directory.
    pub async fn encode(vote: Vote, fetched_at: DateTime<Utc>) -> Result<(Self, Vec<Member>)> {
        let (details, member_votes) = vote.split();
        let metas: Vec<MetaVote> = member_votes.iter().map(MetaVote::from).collect();
        let position_bytes = encode_positions(&metas)?;

        let metadata = blob::pack_json(details).await?;
        let positions = blob::pack_bytes(position_bytes).await?;

        let entry = Self {
            fetched_at,
            metadata,
            positions,
            count: metas.len(),
        };
        let members = member_votes.into_iter().map(|mv| mv.member).collect();
        Ok((entry, members))
    }

    /// Unpacks metadata and positions. Members still need resolving.
    pub async fn decode(&self) -> Result<(VoteDetails, Vec<MetaVote>)> {
        let details: VoteDetails = blob::unpack_json(self.metadata.clone()).await?;
        let bytes = blob::unpack_bytes(self.positions.clone()).await?;
        let metas = decode_positions(&bytes, self.count)?;
        Ok((details, metas))
    }
}

impl Dated for VoteCacheEntry {
    fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberCacheEntry {
    #[serde(rename = "t", with = "chrono::serde::ts_milliseconds")]
    pub fetched_at: DateTime<Utc>,
    /// Compressed member profile.
    #[serde(rename = "m")]
    pub member: String,
}

impl Dated for MemberCacheEntry {
    fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeoArea, MemberId, MemberVote, PoliticalGroup, Position, VoteId};
    use chrono::TimeZone;

    fn member(id: u32) -> Member {
        Member {
            id: MemberId(id),
            first_name: "Test".to_string(),
            last_name: format!("Member {}", id),
            date_of_birth: None,
            terms: vec![10],
            country: GeoArea {
                code: "FRA".to_string(),
                iso_alpha_2: "FR".to_string(),
                label: "France".to_string(),
            },
            group: PoliticalGroup {
                code: "EPP".to_string(),
                label: "European People's Party".to_string(),
                short_label: "EPP".to_string(),
            },
            photo_url: String::new(),
            thumb_url: String::new(),
            email: None,
            facebook: None,
            twitter: None,
        }
    }

    fn vote() -> Vote {
        let details: VoteDetails = serde_json::from_value(serde_json::json!({
            "id": "166051",
            "timestamp": "2024-04-10T12:00:00",
            "display_title": "Nature Restoration Law",
            "is_featured": true,
            "custom_field": {"kept": true}
        }))
        .unwrap();
        Vote::assemble(
            details,
            vec![
                MemberVote { member: member(30), position: Position::For },
                MemberVote { member: member(2), position: Position::Abstention },
            ],
        )
    }

    #[test]
    fn test_serialized_field_names() {
        let entry = VoteCacheEntry {
            fetched_at: Utc.timestamp_millis_opt(1_700_000_000_123).unwrap(),
            metadata: "m".to_string(),
            positions: "v".to_string(),
            count: 3,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"t": 1_700_000_000_123i64, "m": "m", "v": "v", "n": 3})
        );
    }

    #[tokio::test]
    async fn test_encode_decode() {
        let now = Utc::now();
        let original = vote();
        let (entry, members) = VoteCacheEntry::encode(original.clone(), now).await.unwrap();
        assert_eq!(entry.count, 2);
        assert_eq!(entry.fetched_at, now);
        assert_eq!(members.len(), 2);

        let (details, metas) = entry.decode().await.unwrap();
        assert_eq!(details, original.details);
        assert_eq!(details.id, VoteId::from("166051"));
        assert_eq!(
            metas,
            vec![
                MetaVote::new(2, Position::Abstention),
                MetaVote::new(30, Position::For),
            ]
        );
    }

    #[tokio::test]
    async fn test_decode_with_inflated_count_fails() {
        let (mut entry, _) = VoteCacheEntry::encode(vote(), Utc::now()).await.unwrap();
        entry.count = 50;
        assert!(entry.decode().await.is_err());
    }
}
