// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use cid::Cid;
use multihash_codetable::{Code, MultihashDigest as _};
use serde::Serialize;

use crate::car::{NUL_ROOT_CAR_HEADER, varint};

const DAG_CBOR: u64 = 0x71;
const IPLD_RAW: u64 = 0x55;

#[derive(Serialize)]
struct CarV1Header {
    roots: Vec<Cid>,
    version: u64,
}

/// Wraps `body` in a varint frame.
pub fn frame(body: &[u8]) -> Vec<u8> {
    let mut out = varint::encode(body.len() as u64);
    out.extend_from_slice(body);
    out
}

/// A block frame: CID followed by the data it addresses.
pub fn block_frame(data: &[u8]) -> Vec<u8> {
    let cid = Cid::new_v1(IPLD_RAW, Code::Blake2b256.digest(data));
    frame(&[cid.to_bytes(), data.to_vec()].concat())
}

/// A CARv1 stream with a realistic header followed by the given, already
/// framed, blocks.
pub fn car_bytes<I>(frames: I) -> Vec<u8>
where
    I: IntoIterator,
    I::Item: AsRef<[u8]>,
{
    let root = Cid::new_v1(DAG_CBOR, Code::Sha2_256.digest(b"root"));
    let header = serde_ipld_dagcbor::to_vec(&CarV1Header {
        roots: vec![root],
        version: 1,
    })
    .expect("header serializes");
    let mut out = frame(&header);
    for f in frames {
        out.extend_from_slice(f.as_ref());
    }
    out
}

/// Splits a shard back into its frames (prefix included), checking it starts
/// with the synthesized header.
pub fn shard_frames(shard: &[u8]) -> Vec<Vec<u8>> {
    let mut rest = shard
        .strip_prefix(&NUL_ROOT_CAR_HEADER[..])
        .expect("shard starts with the nul-root header");
    let mut frames = vec![];
    while !rest.is_empty() {
        let (len, width) = varint::decode(rest).expect("valid frame prefix");
        let (f, tail) = rest.split_at(width + len as usize);
        frames.push(f.to_vec());
        rest = tail;
    }
    frames
}
