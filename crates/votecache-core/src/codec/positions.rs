//! Compact encoding of (member id, position) lists.
//!
//! Rosters are near-complete and member ids cluster densely, so after sorting
//! the gaps between consecutive ids are mostly tiny. Layout:
//!
//! ```text
//! [20 bits: first member id][2 bits: first position code]
//! repeat (count - 1) times:
//!   [elias gamma(gap + 1)][2 bits: position code]
//! ```
//!
//! The final byte is zero-padded. The decoder needs the entry count, which
//! the cache stores next to the blob.

use super::bits::{BitReader, BitWriter};
use super::gamma::{gamma_len, read_gamma, write_gamma};
use crate::error::CodecError;
use crate::models::{MetaVote, Position};

/// Width of the leading member id field.
pub const FIRST_ID_BITS: u32 = 20;

/// Largest member id the id field can hold.
pub const MAX_MEMBER_ID: u32 = (1 << FIRST_ID_BITS) - 1;

const POSITION_BITS: u32 = 2;

/// Bits taken by the first entry.
const HEADER_BITS: usize = (FIRST_ID_BITS + POSITION_BITS) as usize;

/// Fewest bits any later entry can take: gamma(1) plus a position.
const MIN_ENTRY_BITS: usize = 1 + POSITION_BITS as usize;

/// Encodes `votes` in ascending member id order.
///
/// Ids above [`MAX_MEMBER_ID`] are rejected rather than truncated.
pub fn encode_positions(votes: &[MetaVote]) -> Result<Vec<u8>, CodecError> {
    if let Some(bad) = votes.iter().find(|v| v.member_id.get() > MAX_MEMBER_ID) {
        return Err(CodecError::MemberIdOutOfRange(bad.member_id.get()));
    }

    let mut sorted = votes.to_vec();
    sorted.sort_by_key(|v| v.member_id);

    let Some((first, rest)) = sorted.split_first() else {
        return Ok(Vec::new());
    };

    let (total_bits, _) = rest.iter().fold(
        (HEADER_BITS, first.member_id.get()),
        |(bits, previous), vote| {
            let id = vote.member_id.get();
            (bits + (gamma_len(id - previous + 1) + POSITION_BITS) as usize, id)
        },
    );
    let mut writer = BitWriter::with_capacity(total_bits.div_ceil(8));
    writer.write_bits(first.member_id.get(), FIRST_ID_BITS)?;
    writer.write_bits(first.position.code().into(), POSITION_BITS)?;

    let mut previous = first.member_id.get();
    for vote in rest {
        let id = vote.member_id.get();
        write_gamma(&mut writer, id - previous + 1)?;
        writer.write_bits(vote.position.code().into(), POSITION_BITS)?;
        previous = id;
    }

    debug_assert_eq!(writer.bit_len(), total_bits);
    Ok(writer.finish())
}

/// Decodes `count` entries written by [`encode_positions`].
///
/// `count` comes from storage, so it is checked against what `bytes` can
/// hold before anything is allocated.
pub fn decode_positions(bytes: &[u8], count: usize) -> Result<Vec<MetaVote>, CodecError> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let available = bytes.len().saturating_mul(8);
    if count > max_entries(available) {
        let needed = (count - 1).saturating_mul(MIN_ENTRY_BITS).saturating_add(HEADER_BITS);
        return Err(CodecError::StreamExhausted {
            needed: u32::try_from(needed).unwrap_or(u32::MAX),
            remaining: available,
        });
    }

    let mut result = Vec::with_capacity(count);

    let mut reader = BitReader::new(bytes);
    let mut previous = reader.read_bits(FIRST_ID_BITS)?;
    result.push(MetaVote::new(previous, read_position(&mut reader)?));

    for _ in 1..count {
        let gap = read_gamma(&mut reader)? - 1;
        let id = previous
            .checked_add(gap)
            .ok_or(CodecError::IdOverflow { previous, gap })?;
        result.push(MetaVote::new(id, read_position(&mut reader)?));
        previous = id;
    }

    Ok(result)
}

/// Most entries a stream of `bits` could possibly encode.
fn max_entries(bits: usize) -> usize {
    match bits.checked_sub(HEADER_BITS) {
        Some(rest) => 1 + rest / MIN_ENTRY_BITS,
        None => 0,
    }
}

fn read_position(reader: &mut BitReader<'_>) -> Result<Position, CodecError> {
    let code = reader.read_bits(POSITION_BITS)? as u8;
    Position::from_code(code).ok_or(CodecError::UnknownPosition(code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MemberId;
    use proptest::prelude::*;

    fn position_strategy() -> impl Strategy<Value = Position> {
        prop_oneof![
            Just(Position::For),
            Just(Position::Against),
            Just(Position::Abstention),
            Just(Position::DidNotVote),
        ]
    }

    fn sorted(mut votes: Vec<MetaVote>) -> Vec<MetaVote> {
        votes.sort();
        votes
    }

    #[test]
    fn test_single_entry() {
        let votes = vec![MetaVote::new(123_456, Position::Against)];
        let bytes = encode_positions(&votes).unwrap();
        // 20 + 2 bits
        assert_eq!(bytes.len(), 3);
        assert_eq!(decode_positions(&bytes, 1).unwrap(), votes);
    }

    #[test]
    fn test_known_layout() {
        let votes = vec![
            MetaVote::new(2, Position::DidNotVote),
            MetaVote::new(1, Position::For),
        ];
        let bytes = encode_positions(&votes).unwrap();
        // id 1 in 20 bits, FOR (00), gamma(2) = 010, DID_NOT_VOTE (10)
        // 0000_0000 0000_0000 0001_0001 0100_0000
        assert_eq!(bytes, vec![0x00, 0x00, 0x11, 0x40]);
        assert_eq!(
            decode_positions(&bytes, 2).unwrap(),
            vec![
                MetaVote::new(1, Position::For),
                MetaVote::new(2, Position::DidNotVote),
            ]
        );
    }

    #[test]
    fn test_decode_order_is_ascending() {
        let votes = vec![
            MetaVote::new(900, Position::For),
            MetaVote::new(17, Position::Abstention),
            MetaVote::new(400, Position::Against),
        ];
        let bytes = encode_positions(&votes).unwrap();
        let decoded = decode_positions(&bytes, votes.len()).unwrap();
        let ids: Vec<u32> = decoded.iter().map(|v| v.member_id.get()).collect();
        assert_eq!(ids, vec![17, 400, 900]);
    }

    #[test]
    fn test_duplicate_ids_use_zero_gap() {
        let votes = vec![
            MetaVote::new(10, Position::For),
            MetaVote::new(10, Position::Against),
        ];
        let bytes = encode_positions(&votes).unwrap();
        let decoded = decode_positions(&bytes, 2).unwrap();
        assert_eq!(decoded.len(), 2);
        assert!(decoded.iter().all(|v| v.member_id == MemberId(10)));
    }

    #[test]
    fn test_empty_list() {
        let bytes = encode_positions(&[]).unwrap();
        assert!(bytes.is_empty());
        assert!(decode_positions(&bytes, 0).unwrap().is_empty());
    }

    #[test]
    fn test_id_ceiling() {
        let ok = vec![MetaVote::new(MAX_MEMBER_ID, Position::For)];
        let bytes = encode_positions(&ok).unwrap();
        assert_eq!(decode_positions(&bytes, 1).unwrap(), ok);

        let too_big = vec![
            MetaVote::new(5, Position::For),
            MetaVote::new(MAX_MEMBER_ID + 1, Position::For),
        ];
        assert_eq!(
            encode_positions(&too_big),
            Err(CodecError::MemberIdOutOfRange(MAX_MEMBER_ID + 1))
        );
    }

    #[test]
    fn test_count_larger_than_stream_is_exhausted() {
        let votes: Vec<MetaVote> = (1u32..=3).map(|id| MetaVote::new(id, Position::For)).collect();
        let bytes = encode_positions(&votes).unwrap();
        assert!(matches!(
            decode_positions(&bytes, 10),
            Err(CodecError::StreamExhausted { .. })
        ));
    }

    #[test]
    fn test_huge_count_is_rejected_before_allocating() {
        assert_eq!(
            decode_positions(&[0u8; 3], usize::MAX / 4),
            Err(CodecError::StreamExhausted {
                needed: u32::MAX,
                remaining: 24,
            })
        );
        assert!(decode_positions(&[0u8; 3], usize::MAX).is_err());
    }

    #[test]
    fn test_max_entries_matches_smallest_gaps() {
        // Consecutive ids: 22 bits, then 3 bits each.
        let votes: Vec<MetaVote> = (1u32..=9).map(|id| MetaVote::new(id, Position::For)).collect();
        let bytes = encode_positions(&votes).unwrap();
        assert_eq!(bytes.len(), (22 + 8 * 3 + 7) / 8);
        assert_eq!(max_entries(bytes.len() * 8), 9);
        assert_eq!(decode_positions(&bytes, 9).unwrap(), votes);
        assert!(decode_positions(&bytes, 10).is_err());
    }

    #[test]
    fn test_truncated_header_is_exhausted() {
        assert!(matches!(
            decode_positions(&[0xFF, 0xFF], 1),
            Err(CodecError::StreamExhausted { .. })
        ));
    }

    #[test]
    fn test_dense_roster_is_compact() {
        let votes: Vec<MetaVote> = (0..700u32)
            .map(|i| MetaVote::new(124_800 + i * 3, Position::CODE_ORDER[(i % 4) as usize]))
            .collect();
        let bytes = encode_positions(&votes).unwrap();
        // gap 3 -> gamma(4) is 5 bits, plus 2 position bits
        assert_eq!(bytes.len(), (20 + 2 + 699 * 7 + 7) / 8);
        assert_eq!(decode_positions(&bytes, votes.len()).unwrap(), votes);
    }

    proptest! {
        #[test]
        fn prop_unique_rosters_round_trip(
            roster in prop::collection::btree_map(0u32..=MAX_MEMBER_ID, position_strategy(), 1..3000)
        ) {
            let votes: Vec<MetaVote> = roster
                .iter()
                .rev()
                .map(|(&id, &position)| MetaVote::new(id, position))
                .collect();
            let bytes = encode_positions(&votes).unwrap();
            let decoded = decode_positions(&bytes, votes.len()).unwrap();
            prop_assert_eq!(sorted(decoded), sorted(votes));
        }
    }
}
