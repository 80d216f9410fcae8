// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Splits CARv1 streams into bounded shards, each a valid CARv1 file with a
//! placeholder root, optionally naming every shard after its Filecoin piece
//! commitment.

pub mod car;
mod cli;
mod cli_shared;
pub mod commp;
pub mod config;
pub mod shard;
#[cfg(test)]
mod test_utils;
mod utils;

pub use cli::main::main as carlet_main;
