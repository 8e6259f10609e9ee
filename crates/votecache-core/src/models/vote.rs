use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use super::{MemberVote, PoliticalGroup, Position};

/// Identifier of a roll-call vote.
///
/// The API sends numeric ids; they are kept as text so cache keys and
/// lookups agree on one form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct VoteId(pub String);

impl<'de> Deserialize<'de> for VoteId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(id) => Self(id),
            Raw::Number(id) => Self(id.to_string()),
        })
    }
}

impl VoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VoteId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for VoteId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for VoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoArea {
    pub code: String,
    pub iso_alpha_2: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EuroVocConcept {
    pub id: serde_json::Value,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Committee {
    pub code: String,
    pub label: String,
    #[serde(default)]
    pub abbreviation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Procedure {
    pub title: String,
    pub reference: String,
}

/// Per-position totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PositionCounts {
    #[serde(rename = "FOR")]
    pub for_: u32,
    pub against: u32,
    pub abstention: u32,
    pub did_not_vote: u32,
}

impl PositionCounts {
    pub fn tally<'a>(positions: impl IntoIterator<Item = &'a Position>) -> Self {
        let mut counts = Self::default();
        for position in positions {
            counts.add(*position);
        }
        counts
    }

    pub fn add(&mut self, position: Position) {
        match position {
            Position::For => self.for_ += 1,
            Position::Against => self.against += 1,
            Position::Abstention => self.abstention += 1,
            Position::DidNotVote => self.did_not_vote += 1,
        }
    }

    pub fn get(&self, position: Position) -> u32 {
        match position {
            Position::For => self.for_,
            Position::Against => self.against,
            Position::Abstention => self.abstention,
            Position::DidNotVote => self.did_not_vote,
        }
    }

    pub fn total(&self) -> u32 {
        self.for_ + self.against + self.abstention + self.did_not_vote
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryStats {
    pub country: GeoArea,
    pub stats: PositionCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStats {
    pub group: PoliticalGroup,
    pub stats: PositionCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteStats {
    pub total: PositionCounts,
    #[serde(default)]
    pub by_country: Vec<CountryStats>,
    #[serde(default)]
    pub by_group: Vec<GroupStats>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessed_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedVote {
    pub id: serde_json::Value,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Everything about a vote except the individual member positions.
///
/// Fields the models do not name are preserved in `extra` so a cached vote
/// hydrates to the same document the API returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteDetails {
    pub id: VoteId,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub geo_areas: Vec<GeoArea>,
    #[serde(default)]
    pub eurovoc_concepts: Vec<EuroVocConcept>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_committee: Option<Committee>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedure: Option<Procedure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facts: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sharepic_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<VoteStats>,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub related: Vec<RelatedVote>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A fully detailed vote: metadata plus every member's position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    #[serde(flatten)]
    pub details: VoteDetails,
    #[serde(default)]
    pub member_votes: Vec<MemberVote>,
}

impl Vote {
    pub fn id(&self) -> &VoteId {
        &self.details.id
    }

    /// Separates metadata from the member positions.
    pub fn split(self) -> (VoteDetails, Vec<MemberVote>) {
        (self.details, self.member_votes)
    }

    pub fn assemble(details: VoteDetails, member_votes: Vec<MemberVote>) -> Self {
        Self {
            details,
            member_votes,
        }
    }

    pub fn title(&self) -> &str {
        self.details
            .display_title
            .as_deref()
            .or(self.details.description.as_deref())
            .unwrap_or(self.details.id.as_str())
    }

    /// Totals computed from the member positions.
    pub fn position_counts(&self) -> PositionCounts {
        PositionCounts::tally(self.member_votes.iter().map(|mv| &mv.position))
    }
}
