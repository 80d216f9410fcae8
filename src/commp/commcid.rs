// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use cid::{Cid, multihash::Multihash};

use super::Commitment;

/// Multicodec for unsealed (piece and data) commitments.
pub const FIL_COMMITMENT_UNSEALED: u64 = 0xf101;
/// Multihash code for Sha2 256 trunc254 padded used in data commitments.
pub const SHA2_256_TRUNC254_PADDED: u64 = 0x1012;

/// Converts a raw data commitment to a CID by adding:
/// - codec: `fil-commitment-unsealed`
/// - hash type: `sha2-256-trunc254-padded`
pub fn data_commitment_v1_to_cid(comm_d: &[u8]) -> Result<Cid, &'static str> {
    validate_filecoin_cid_segments(FIL_COMMITMENT_UNSEALED, SHA2_256_TRUNC254_PADDED, comm_d)?;
    let mh = Multihash::wrap(SHA2_256_TRUNC254_PADDED, comm_d)
        .map_err(|_| "couldn't wrap commitment in a multihash")?;
    Ok(Cid::new_v1(FIL_COMMITMENT_UNSEALED, mh))
}

/// Extracts the raw data commitment from a CID, after checking it carries the
/// unsealed commitment codec and hash function.
pub fn cid_to_data_commitment_v1(c: &Cid) -> Result<Commitment, &'static str> {
    validate_filecoin_cid_segments(c.codec(), c.hash().code(), c.hash().digest())?;
    let mut comm_d = Commitment::default();
    comm_d.copy_from_slice(c.hash().digest());
    Ok(comm_d)
}

fn validate_filecoin_cid_segments(mc: u64, mh: u64, comm_x: &[u8]) -> Result<(), &'static str> {
    if mc != FIL_COMMITMENT_UNSEALED {
        return Err("Invalid Codec, expected unsealed commitment codec");
    }
    if mh != SHA2_256_TRUNC254_PADDED {
        return Err("Incorrect hash function for unsealed commitment");
    }
    if comm_x.len() != 32 {
        return Err("commitments must be 32 bytes long");
    }
    Ok(())
}
