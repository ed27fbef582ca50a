//! The VarInt format: 7 data bits per byte, least significant group
//! first, with the high bit of each byte set while more bytes follow.
//!
//! An `i32` never needs more than five bytes. Negative values are the
//! two's-complement bit pattern and therefore always take all five.

/// Longest valid encoding of a 32-bit value.
pub const MAX_SIZE: usize = 5;

const SEGMENT_BITS: u8 = 0b0111_1111;
const CONTINUE_BIT: u8 = 0b1000_0000;

/// Why a byte sequence could not be read as a VarInt.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VarIntError {
    /// The input ended while the continuation bit was still set.
    #[error("VarInt is truncated")]
    Incomplete,
    /// A sixth byte would have been required.
    #[error("VarInt is longer than {MAX_SIZE} bytes")]
    TooLong,
}

/// Appends the encoding of `value` to `buffer`, returning the number of bytes written.
pub fn encode(value: i32, buffer: &mut Vec<u8>) -> usize {
    let mut remaining: u32 = bytemuck::cast(value);
    let mut written = 0;
    loop {
        let mut byte = (remaining as u8) & SEGMENT_BITS;
        remaining >>= 7;
        if remaining != 0 {
            byte |= CONTINUE_BIT;
        }
        buffer.push(byte);
        written += 1;

        if remaining == 0 {
            break written;
        }
    }
}

/// Reads a VarInt from the start of `bytes`, returning the value and
/// the number of bytes it occupied.
pub fn decode(bytes: &[u8]) -> Result<(i32, usize), VarIntError> {
    let mut result: u32 = 0;
    for (position, &byte) in bytes.iter().enumerate() {
        if position == MAX_SIZE {
            return Err(VarIntError::TooLong);
        }
        result |= u32::from(byte & SEGMENT_BITS) << (7 * position);
        if byte & CONTINUE_BIT == 0 {
            return Ok((bytemuck::cast(result), position + 1));
        }
    }

    if bytes.len() >= MAX_SIZE {
        Err(VarIntError::TooLong)
    } else {
        Err(VarIntError::Incomplete)
    }
}

/// Number of bytes `encode` would write for `value`.
pub fn size(value: i32) -> usize {
    let bits = 32 - bytemuck::cast::<i32, u32>(value).leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn encoded(value: i32) -> Vec<u8> {
        let mut buffer = Vec::new();
        encode(value, &mut buffer);
        buffer
    }

    #[test]
    fn known_encodings() {
        assert_eq!(encoded(0), [0x00]);
        assert_eq!(encoded(1), [0x01]);
        assert_eq!(encoded(127), [0x7f]);
        assert_eq!(encoded(128), [0x80, 0x01]);
        assert_eq!(encoded(255), [0xff, 0x01]);
        assert_eq!(encoded(25565), [0xdd, 0xc7, 0x01]);
        assert_eq!(encoded(2097151), [0xff, 0xff, 0x7f]);
        assert_eq!(encoded(i32::MAX), [0xff, 0xff, 0xff, 0xff, 0x07]);
        assert_eq!(encoded(-1), [0xff, 0xff, 0xff, 0xff, 0x0f]);
        assert_eq!(encoded(i32::MIN), [0x80, 0x80, 0x80, 0x80, 0x08]);
    }

    #[test]
    fn decode_reports_consumed_bytes() {
        assert_eq!(decode(&[0xdd, 0xc7, 0x01, 0xaa]), Ok((25565, 3)));
        assert_eq!(decode(&[0x00, 0x01]), Ok((0, 1)));
    }

    #[test]
    fn six_continuation_bytes_are_too_long() {
        assert_eq!(
            decode(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x01]),
            Err(VarIntError::TooLong)
        );
        assert_eq!(
            decode(&[0xff, 0xff, 0xff, 0xff, 0xff]),
            Err(VarIntError::TooLong)
        );
    }

    #[test]
    fn truncated_input_is_incomplete() {
        assert_eq!(decode(&[]), Err(VarIntError::Incomplete));
        assert_eq!(decode(&[0x80]), Err(VarIntError::Incomplete));
        assert_eq!(decode(&[0xff, 0xff, 0xff]), Err(VarIntError::Incomplete));
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(value in any::<i32>()) {
            let bytes = encoded(value);
            prop_assert!(bytes.len() <= MAX_SIZE);
            prop_assert_eq!(bytes.len(), size(value));
            prop_assert_eq!(decode(&bytes), Ok((value, bytes.len())));
        }

        #[test]
        fn overlong_sequences_are_rejected(
            extra in prop::collection::vec(0x80u8..=0xff, 5..16),
            tail in any::<u8>(),
        ) {
            let mut bytes = extra;
            bytes.push(tail);
            prop_assert_eq!(decode(&bytes), Err(VarIntError::TooLong));
        }
    }
}
