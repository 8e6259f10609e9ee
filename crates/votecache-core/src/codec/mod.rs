//! Bit-level codec for member position lists.
//!
//! - `bits`: MSB-first `BitWriter` / `BitReader`
//! - `gamma`: Elias gamma codes for positive integers
//! - `positions`: the gap-encoded (member id, position) layout

pub mod bits;
pub mod gamma;
pub mod positions;

pub use bits::{BitReader, BitWriter};
pub use positions::{decode_positions, encode_positions, MAX_MEMBER_ID};
