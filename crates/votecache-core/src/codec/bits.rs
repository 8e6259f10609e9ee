//! MSB-first bit packing over a byte buffer.

use crate::error::CodecError;

/// Appends bit fields to a growable byte buffer, most significant bit first.
#[derive(Debug, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    current: u8,
    // Bits already placed in `current`, 0..=7.
    offset: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
            ..Self::default()
        }
    }

    /// Appends the low `width` bits of `value`.
    pub fn write_bits(&mut self, value: u32, width: u32) -> Result<(), CodecError> {
        if width > 32 {
            return Err(CodecError::WidthTooLarge(width));
        }
        for i in (0..width).rev() {
            self.push_bit((value >> i) & 1 == 1);
        }
        Ok(())
    }

    fn push_bit(&mut self, bit: bool) {
        self.current = (self.current << 1) | u8::from(bit);
        self.offset += 1;
        if self.offset == 8 {
            self.bytes.push(self.current);
            self.current = 0;
            self.offset = 0;
        }
    }

    /// Number of bits written so far.
    pub fn bit_len(&self) -> usize {
        self.bytes.len() * 8 + self.offset as usize
    }

    /// Flushes the partial byte, zero-padding its unused low bits.
    pub fn finish(mut self) -> Vec<u8> {
        if self.offset > 0 {
            self.bytes.push(self.current << (8 - self.offset));
        }
        self.bytes
    }
}

/// Reads bit fields written by [`BitWriter`].
#[derive(Debug)]
pub struct BitReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    offset: u8,
}

impl<'a> BitReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            offset: 0,
        }
    }

    pub fn remaining_bits(&self) -> usize {
        (self.bytes.len() - self.pos) * 8 - self.offset as usize
    }

    pub fn read_bit(&mut self) -> Result<bool, CodecError> {
        let byte = *self.bytes.get(self.pos).ok_or(CodecError::StreamExhausted {
            needed: 1,
            remaining: 0,
        })?;
        let bit = (byte >> (7 - self.offset)) & 1 == 1;
        self.offset += 1;
        if self.offset == 8 {
            self.offset = 0;
            self.pos += 1;
        }
        Ok(bit)
    }

    /// Consumes the next `width` bits. Fails without consuming anything if
    /// fewer than `width` bits remain.
    pub fn read_bits(&mut self, width: u32) -> Result<u32, CodecError> {
        if width > 32 {
            return Err(CodecError::WidthTooLarge(width));
        }
        let remaining = self.remaining_bits();
        if (width as usize) > remaining {
            return Err(CodecError::StreamExhausted {
                needed: width,
                remaining,
            });
        }
        let mut value: u64 = 0;
        for _ in 0..width {
            value = (value << 1) | u64::from(self.read_bit()?);
        }
        Ok(value as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_packs_msb_first() {
        let mut writer = BitWriter::new();
        writer.write_bits(0b101, 3).unwrap();
        writer.write_bits(0b11111, 5).unwrap();
        writer.write_bits(0b1, 1).unwrap();
        assert_eq!(writer.bit_len(), 9);
        assert_eq!(writer.finish(), vec![0b1011_1111, 0b1000_0000]);
    }

    #[test]
    fn test_writer_keeps_only_low_bits() {
        let mut writer = BitWriter::new();
        writer.write_bits(0xFFFF_FF01, 4).unwrap();
        assert_eq!(writer.finish(), vec![0b0001_0000]);
    }

    #[test]
    fn test_empty_writer_finishes_empty() {
        assert!(BitWriter::new().finish().is_empty());
    }

    #[test]
    fn test_round_trip_mixed_widths() {
        let fields: [(u32, u32); 7] = [
            (123_456, 20),
            (3, 2),
            (0, 1),
            (u32::MAX, 32),
            (0x2A, 7),
            (1, 1),
            (0, 0),
        ];
        let mut writer = BitWriter::new();
        for (value, width) in fields {
            writer.write_bits(value, width).unwrap();
        }
        let bytes = writer.finish();

        let mut reader = BitReader::new(&bytes);
        for (value, width) in fields {
            assert_eq!(reader.read_bits(width).unwrap(), value);
        }
        // Only padding remains.
        assert!(reader.remaining_bits() < 8);
    }

    #[test]
    fn test_read_past_end_is_exhausted() {
        let bytes = [0xAB];
        let mut reader = BitReader::new(&bytes);
        assert_eq!(reader.read_bits(6).unwrap(), 0b101010);
        let err = reader.read_bits(3).unwrap_err();
        assert_eq!(
            err,
            CodecError::StreamExhausted {
                needed: 3,
                remaining: 2
            }
        );
        // The failed read did not consume the tail.
        assert_eq!(reader.read_bits(2).unwrap(), 0b11);
        assert!(matches!(
            reader.read_bit(),
            Err(CodecError::StreamExhausted { .. })
        ));
    }

    #[test]
    fn test_rejects_oversized_width() {
        let mut writer = BitWriter::new();
        assert_eq!(writer.write_bits(1, 33), Err(CodecError::WidthTooLarge(33)));
        let mut reader = BitReader::new(&[0; 8]);
        assert_eq!(reader.read_bits(40), Err(CodecError::WidthTooLarge(40)));
    }
}
