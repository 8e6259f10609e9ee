use serde::{Deserialize, Serialize};

use super::{GeoArea, Position};

/// Identifier of a Member of the European Parliament.
///
/// Serialized transparently, so it round-trips as a JSON object key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub u32);

impl MemberId {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for MemberId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoliticalGroup {
    pub code: String,
    pub label: String,
    pub short_label: String,
}

/// Full member profile as returned by the votes API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub terms: Vec<u32>,
    pub country: GeoArea,
    pub group: PoliticalGroup,
    #[serde(default)]
    pub photo_url: String,
    #[serde(default)]
    pub thumb_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A member together with the position they took on one vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberVote {
    pub member: Member,
    pub position: Position,
}

/// The minimal (member id, position) association handled by the position codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetaVote {
    pub member_id: MemberId,
    pub position: Position,
}

impl MetaVote {
    pub fn new(member_id: u32, position: Position) -> Self {
        Self {
            member_id: MemberId(member_id),
            position,
        }
    }
}

impl From<&MemberVote> for MetaVote {
    fn from(mv: &MemberVote) -> Self {
        Self {
            member_id: mv.member.id,
            position: mv.position,
        }
    }
}
