// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Fr32 padding: every 254 bits of payload are stored in a 32-byte field
//! element whose two most significant bits are zero.

/// Unpadded bytes per quad (4 × 254 bits).
pub const QUAD_PAYLOAD: usize = 127;
/// Padded bytes per quad (4 × 32 bytes).
pub const QUAD_PADDED: usize = 128;

/// Expands one 127-byte quad into four 32-byte field elements.
///
/// `input` must be exactly [`QUAD_PAYLOAD`] bytes long.
pub fn expand(input: &[u8]) -> [u8; QUAD_PADDED] {
    debug_assert_eq!(input.len(), QUAD_PAYLOAD);
    let mut out = [0; QUAD_PADDED];

    out[..32].copy_from_slice(&input[..32]);
    out[31] &= 0x3f;

    // each following element starts two bits further into the input
    for i in 31..63 {
        out[i + 1] = (input[i + 1] << 2) | (input[i] >> 6);
    }
    out[63] &= 0x3f;

    for i in 63..95 {
        out[i + 1] = (input[i + 1] << 4) | (input[i] >> 4);
    }
    out[95] &= 0x3f;

    for i in 95..126 {
        out[i + 1] = (input[i + 1] << 6) | (input[i] >> 2);
    }
    out[127] = input[126] >> 2;

    out
}
