// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::path::Path;

use assert_cmd::{Command, cargo::cargo_bin_cmd};
use cid::Cid;
use integer_encoding::VarInt as _;
use multihash_codetable::{Code, MultihashDigest as _};
use serde::Serialize;

pub fn carlet() -> Command {
    let mut cmd = cargo_bin_cmd!("carlet");
    cmd.env("RUST_LOG", "warn").arg("--color").arg("never");
    cmd
}

#[derive(Serialize)]
struct CarV1Header {
    roots: Vec<Cid>,
    version: u64,
}

pub fn frame(body: &[u8]) -> Vec<u8> {
    let mut out = (body.len() as u64).encode_var_vec();
    out.extend_from_slice(body);
    out
}

pub fn block_frame(data: &[u8]) -> Vec<u8> {
    let cid = Cid::new_v1(0x55, Code::Blake2b256.digest(data));
    frame(&[cid.to_bytes(), data.to_vec()].concat())
}

/// A CARv1 stream of `blocks` raw blocks of `len` bytes each.
pub fn car_stream(blocks: usize, len: usize) -> Vec<u8> {
    let header = serde_ipld_dagcbor::to_vec(&CarV1Header {
        roots: vec![Cid::new_v1(0x71, Code::Sha2_256.digest(b"root"))],
        version: 1,
    })
    .unwrap();
    let mut out = frame(&header);
    for i in 0..blocks {
        out.extend(block_frame(&vec![i as u8; len]));
    }
    out
}

/// Sorted names of the files in `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    names.sort();
    names
}
