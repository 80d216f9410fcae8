// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod split_cmd;

use std::io::Read;
use std::path::PathBuf;

use clap::Parser;

use self::split_cmd::{SplitAndCommPCommand, SplitCommand};
use crate::config::Config;
use crate::utils::misc::LoggingColor;

/// CLI structure generated when interacting with the carlet binary
#[derive(Parser)]
#[command(name = env!("CARGO_PKG_NAME"), version, about = env!("CARGO_PKG_DESCRIPTION"))]
pub struct Cli {
    /// Enable or disable colored logging in `stderr`
    #[arg(long, default_value = "auto", global = true)]
    pub color: LoggingColor,
    /// A TOML file containing defaults for the subcommand flags
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub cmd: Subcommand,
}

/// carlet sub-commands. Both read a CARv1 stream from `stdin`.
#[derive(clap::Subcommand, Debug)]
pub enum Subcommand {
    /// Split a CAR stream into shards of at least the target size
    Split(SplitCommand),

    /// Split a CAR stream into shards named after their piece CID, and list
    /// them in a metadata CSV
    #[command(visible_alias = "sac")]
    SplitAndCommp(SplitAndCommPCommand),
}

impl Subcommand {
    pub fn run(self, config: &Config, input: impl Read) -> anyhow::Result<()> {
        match self {
            Self::Split(cmd) => cmd.run(config, input),
            Self::SplitAndCommp(cmd) => cmd.run(config, input),
        }
    }
}
