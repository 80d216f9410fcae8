// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::ffi::OsString;

use clap::Parser;

use super::subcommands::Cli;
use crate::cli_shared::logger;
use crate::config::Config;
use crate::utils::io::read_toml_file;

pub fn main<ArgT>(args: impl IntoIterator<Item = ArgT>) -> anyhow::Result<()>
where
    ArgT: Into<OsString> + Clone,
{
    // Capture Cli inputs
    let Cli { color, config, cmd } = Cli::parse_from(args);
    logger::setup_minimal_logger(color);

    let config = match config {
        Some(path) => read_toml_file::<Config>(&path)?,
        None => Config::default(),
    };
    config.validate()?;

    cmd.run(&config, std::io::stdin().lock())
}
