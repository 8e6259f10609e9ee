//! Data models for European Parliament roll-call votes.
//!
//! - `Vote`, `VoteDetails`: a vote and its metadata
//! - `Member`, `MemberVote`: voter profiles and their positions
//! - `MetaVote`: the (member id, position) pair handled by the codec
//! - `Position`: the closed set of recorded stances

pub mod member;
pub mod position;
pub mod vote;

pub use member::{Member, MemberId, MemberVote, MetaVote, PoliticalGroup};
pub use position::Position;
pub use vote::{
    Committee, CountryStats, EuroVocConcept, GeoArea, GroupStats, PositionCounts, Procedure,
    RelatedVote, Source, Vote, VoteDetails, VoteId, VoteStats,
};
