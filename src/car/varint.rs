// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Unsigned LEB128 length prefixes, as used by every CAR varint frame.

use integer_encoding::VarInt as _;

/// Maximum width of a `u64` varint.
pub const MAX_VARINT_LEN: usize = 10;

/// Decodes a length prefix from the start of `buf`.
///
/// Returns the decoded value together with the number of bytes the prefix
/// occupies, or [`None`] if `buf` does not start with a complete varint
/// (truncated, or more than [`MAX_VARINT_LEN`] continuation bytes).
/// Non-minimal encodings are accepted.
pub fn decode(buf: &[u8]) -> Option<(u64, usize)> {
    u64::decode_var(buf)
}

/// Encodes `value` as a length prefix.
pub fn encode(value: u64) -> Vec<u8> {
    value.encode_var_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;
    use rstest::rstest;

    #[rstest]
    #[case(&[0x00], Some((0, 1)))]
    #[case(&[0x19, 0xa2], Some((25, 1)))]
    #[case(&[0x80, 0x01], Some((128, 2)))]
    #[case(&[0xff, 0xff, 0x7f], Some((2_097_151, 3)))]
    // non-minimal zero is still a well-formed prefix
    #[case(&[0x80, 0x00], Some((0, 2)))]
    #[case(&[], None)]
    #[case(&[0x80], None)]
    #[case(&[0xff, 0xff, 0xff], None)]
    #[case(&[0xff; MAX_VARINT_LEN], None)]
    fn decode_cases(#[case] input: &[u8], #[case] expected: Option<(u64, usize)>) {
        assert_eq!(decode(input), expected);
    }

    #[test]
    fn decode_ignores_trailing_bytes() {
        assert_eq!(decode(&[0x05, 0xde, 0xad, 0xbe, 0xef]), Some((5, 1)));
    }

    #[quickcheck]
    fn encode_then_decode(value: u64) -> bool {
        let buf = encode(value);
        buf.len() <= MAX_VARINT_LEN && decode(&buf) == Some((value, buf.len()))
    }
}
