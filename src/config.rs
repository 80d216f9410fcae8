// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

use crate::car::peek::DEFAULT_BUFFER_SIZE;
use crate::car::varint::MAX_VARINT_LEN;
use crate::shard::manifest::DEFAULT_METADATA_FILE;

/// Target shard size of `split` when none is given.
pub const DEFAULT_TARGET_SIZE: u64 = 1 << 20;

/// Settings read from the optional `--config` file. Command-line flags take
/// precedence over every key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SmartDefault)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Target shard size in bytes.
    pub target_size: Option<u64>,
    /// Prefix of every shard file name. May include directories.
    pub output: Option<String>,
    #[default(PathBuf::from(DEFAULT_METADATA_FILE))]
    pub metadata: PathBuf,
    /// Input look-ahead buffer capacity in bytes.
    #[default(DEFAULT_BUFFER_SIZE)]
    pub buffer_size: usize,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.target_size == Some(0) {
            anyhow::bail!("target_size must be positive");
        }
        if self.buffer_size < MAX_VARINT_LEN {
            anyhow::bail!(
                "buffer_size must be at least {} bytes, got {}",
                MAX_VARINT_LEN,
                self.buffer_size
            );
        }
        Ok(())
    }
}
