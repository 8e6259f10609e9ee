use thiserror::Error;

use crate::models::MemberId;

/// Failures of the bit-level position codec.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Bit stream exhausted: needed {needed} more bits, {remaining} left")]
    StreamExhausted { needed: u32, remaining: usize },

    #[error("Cannot write {0} bits at once (maximum is 32)")]
    WidthTooLarge(u32),

    #[error("Elias gamma code only represents positive integers")]
    GammaZero,

    #[error("Elias gamma prefix of {0} zero bits does not fit in 32 bits")]
    GammaOverflow(u32),

    #[error("Member id {0} exceeds the 20-bit id field")]
    MemberIdOutOfRange(u32),

    #[error("Member id overflowed while applying a gap of {gap} to {previous}")]
    IdOverflow { previous: u32, gap: u32 },

    #[error("Unknown position code {0}")]
    UnknownPosition(u8),
}

/// Failures of the key-value store capability.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage quota exceeded: writing {requested} bytes would use {used} of {quota} bytes")]
    QuotaExceeded {
        requested: usize,
        used: usize,
        quota: usize,
    },

    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Everything that can go wrong while reading or writing the cache.
///
/// None of these are fatal to callers: reads turn them into misses and
/// detached writes only log them.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid base64 blob: {0}")]
    Transcode(#[from] base64::DecodeError),

    #[error("Compression error: {0}")]
    Compression(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Member {0} is not in the member directory")]
    MissingMember(MemberId),
}

pub type Result<T, E = CacheError> = std::result::Result<T, E>;
