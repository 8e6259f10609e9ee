//! Elias gamma coding of positive integers.
//!
//! `n` is written as `bit_length(n) - 1` zero bits followed by `n` in binary,
//! so small values cost few bits: 1 -> `1`, 2 -> `010`, 5 -> `00101`.

use super::bits::{BitReader, BitWriter};
use crate::error::CodecError;

pub fn write_gamma(writer: &mut BitWriter, n: u32) -> Result<(), CodecError> {
    if n == 0 {
        return Err(CodecError::GammaZero);
    }
    let zeros = 31 - n.leading_zeros();
    writer.write_bits(0, zeros)?;
    writer.write_bits(n, zeros + 1)
}

pub fn read_gamma(reader: &mut BitReader<'_>) -> Result<u32, CodecError> {
    let mut zeros = 0u32;
    while !reader.read_bit()? {
        zeros += 1;
        if zeros > 31 {
            return Err(CodecError::GammaOverflow(zeros));
        }
    }
    let tail = reader.read_bits(zeros)?;
    Ok((1u32 << zeros) | tail)
}

/// Number of bits `write_gamma` emits for `n`.
pub fn gamma_len(n: u32) -> u32 {
    debug_assert!(n > 0);
    2 * (31 - n.leading_zeros()) + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn encode(n: u32) -> Vec<u8> {
        let mut writer = BitWriter::new();
        write_gamma(&mut writer, n).unwrap();
        writer.finish()
    }

    #[test]
    fn test_known_codes() {
        assert_eq!(encode(1), vec![0b1000_0000]);
        assert_eq!(encode(2), vec![0b0100_0000]);
        assert_eq!(encode(5), vec![0b0010_1000]);
        assert_eq!(encode(17), vec![0b0000_1000, 0b1000_0000]);
    }

    #[test]
    fn test_zero_is_rejected() {
        let mut writer = BitWriter::new();
        assert_eq!(write_gamma(&mut writer, 0), Err(CodecError::GammaZero));
    }

    #[test]
    fn test_full_width_value() {
        let bytes = encode(u32::MAX);
        let mut reader = BitReader::new(&bytes);
        assert_eq!(read_gamma(&mut reader).unwrap(), u32::MAX);
    }

    #[test]
    fn test_all_zero_stream_overflows() {
        let bytes = [0u8; 8];
        let mut reader = BitReader::new(&bytes);
        assert_eq!(read_gamma(&mut reader), Err(CodecError::GammaOverflow(32)));
    }

    #[test]
    fn test_truncated_code_is_exhausted() {
        // Six zero bits promise six more value bits, only one is left.
        let bytes = [0b0000_0010];
        let mut reader = BitReader::new(&bytes);
        assert!(matches!(
            read_gamma(&mut reader),
            Err(CodecError::StreamExhausted { .. })
        ));
    }

    #[test]
    fn test_every_gap_up_to_twenty_bits() {
        for gap in 0..=(1u32 << 20) {
            let mut writer = BitWriter::new();
            write_gamma(&mut writer, gap + 1).unwrap();
            assert_eq!(writer.bit_len() as u32, gamma_len(gap + 1));
            let bytes = writer.finish();
            let mut reader = BitReader::new(&bytes);
            assert_eq!(read_gamma(&mut reader).unwrap() - 1, gap);
        }
    }

    proptest! {
        #[test]
        fn prop_sequences_round_trip(values in prop::collection::vec(1u32.., 1..64)) {
            let mut writer = BitWriter::new();
            for &v in &values {
                write_gamma(&mut writer, v).unwrap();
            }
            let bytes = writer.finish();
            let mut reader = BitReader::new(&bytes);
            for &v in &values {
                prop_assert_eq!(read_gamma(&mut reader).unwrap(), v);
            }
        }
    }
}
