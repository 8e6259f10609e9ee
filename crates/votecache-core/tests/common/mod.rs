// Shared fixtures for the integration tests.
#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use votecache_core::models::{GeoArea, PoliticalGroup, PositionCounts, VoteStats};
use votecache_core::{Member, MemberId, MemberVote, Position, Vote, VoteDetails, VoteId};

const COUNTRIES: [(&str, &str, &str); 3] = [
    ("FRA", "FR", "France"),
    ("DEU", "DE", "Germany"),
    ("POL", "PL", "Poland"),
];

const GROUPS: [(&str, &str, &str); 3] = [
    ("EPP", "European People's Party", "EPP"),
    ("SD", "Progressive Alliance of Socialists and Democrats", "S&D"),
    ("RENEW", "Renew Europe", "Renew"),
];

pub fn member(id: u32) -> Member {
    let (code, iso, label) = COUNTRIES[id as usize % COUNTRIES.len()];
    let (group_code, group_label, short) = GROUPS[id as usize % GROUPS.len()];
    Member {
        id: MemberId(id),
        first_name: format!("First{}", id),
        last_name: format!("Last{}", id),
        date_of_birth: Some("1975-05-17".to_string()),
        terms: vec![9, 10],
        country: GeoArea {
            code: code.to_string(),
            iso_alpha_2: iso.to_string(),
            label: label.to_string(),
        },
        group: PoliticalGroup {
            code: group_code.to_string(),
            label: group_label.to_string(),
            short_label: short.to_string(),
        },
        photo_url: format!("https://www.europarl.europa.eu/mepphoto/{}.jpg", id),
        thumb_url: format!("https://howtheyvote.eu/api/static/mep-photos/{}-104.jpg", id),
        email: (id % 2 == 0).then(|| format!("mep{}@europarl.europa.eu", id)),
        facebook: None,
        twitter: None,
    }
}

pub fn vote_with(id: &str, positions: &[(u32, Position)]) -> Vote {
    let member_votes: Vec<MemberVote> = positions
        .iter()
        .map(|&(member_id, position)| MemberVote {
            member: member(member_id),
            position,
        })
        .collect();
    let total = PositionCounts::tally(member_votes.iter().map(|mv| &mv.position));

    let details: VoteDetails = serde_json::from_value(serde_json::json!({
        "id": id,
        "timestamp": "2024-02-27T12:41:03",
        "display_title": "Nature Restoration Law",
        "reference": "A9-0220/2023",
        "description": "Provisional agreement resulting from interinstitutional negotiations",
        "is_featured": true,
        "geo_areas": [],
        "eurovoc_concepts": [{"id": 5463, "label": "environmental protection"}],
        "responsible_committee": {"code": "ENVI", "label": "Committee on the Environment", "abbreviation": "ENVI"},
        "procedure": {"title": "Nature restoration", "reference": "2022/0195(COD)"},
        "facts": "<ul><li>Adopted</li></ul>",
        "sharepic_url": null,
        "sources": [{"name": "Roll-call votes", "url": "https://www.europarl.europa.eu", "accessed_at": "2024-02-27T14:00:00"}],
        "related": [{"id": 166050, "timestamp": "2024-02-27T12:40:00", "description": "Amendment 1"}]
    }))
    .expect("fixture details parse");

    let mut vote = Vote::assemble(details, member_votes);
    vote.details.stats = Some(VoteStats {
        total,
        by_country: Vec::new(),
        by_group: Vec::new(),
    });
    vote
}

/// A near-complete roster: `size` members with clustered ids.
pub fn roster_vote(id: &str, size: u32) -> Vote {
    let positions: Vec<(u32, Position)> = (0..size)
        .map(|i| {
            let member_id = 96_000 + i * 5 + (i % 3);
            (member_id, Position::CODE_ORDER[(i as usize * 7) % 4])
        })
        .collect();
    vote_with(id, &positions)
}

/// The same vote with member positions in ascending member id order, which
/// is how the cache returns them.
pub fn sorted_by_member(mut vote: Vote) -> Vote {
    vote.member_votes.sort_by_key(|mv| mv.member.id);
    vote
}

pub fn vote_id(id: &str) -> VoteId {
    VoteId::from(id)
}

/// A fixed instant with millisecond precision, matching stored timestamps.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}
