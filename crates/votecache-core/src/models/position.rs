use serde::{Deserialize, Serialize};

/// A member's recorded stance on a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Position {
    For,
    Against,
    Abstention,
    DidNotVote,
}

impl Position {
    /// Code order on the wire. Shared by encoder and decoder, do not reorder.
    pub const CODE_ORDER: [Position; 4] = [
        Position::For,
        Position::Against,
        Position::DidNotVote,
        Position::Abstention,
    ];

    /// Fixed 2-bit code used by the position codec.
    pub fn code(self) -> u8 {
        match self {
            Position::For => 0,
            Position::Against => 1,
            Position::DidNotVote => 2,
            Position::Abstention => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::CODE_ORDER.get(code as usize).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Position::For => "For",
            Position::Against => "Against",
            Position::Abstention => "Abstain",
            Position::DidNotVote => "No Vote",
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Position::For => write!(f, "FOR"),
            Position::Against => write!(f, "AGAINST"),
            Position::Abstention => write!(f, "ABSTENTION"),
            Position::DidNotVote => write!(f, "DID_NOT_VOTE"),
        }
    }
}
