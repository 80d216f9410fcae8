// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context as _;
use human_repr::HumanCount as _;
use tracing::info;

use crate::car::PeekReader;
use crate::config::{Config, DEFAULT_TARGET_SIZE};
use crate::shard::manifest::write_metadata_file;
use crate::shard::{split_and_commp, split_car};

#[derive(Debug, clap::Args)]
pub struct SplitCommand {
    /// Target size in bytes to chunk CARs to [default: 1 MiB]
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    size: Option<u64>,
    /// Optional output name prefix, may include a directory
    #[arg(short, long)]
    output: Option<String>,
}

impl SplitCommand {
    pub fn run(self, config: &Config, input: impl Read) -> anyhow::Result<()> {
        let target_size = self
            .size
            .or(config.target_size)
            .unwrap_or(DEFAULT_TARGET_SIZE);
        let prefix = self
            .output
            .or_else(|| config.output.clone())
            .unwrap_or_default();

        info!(target_size = %target_size.human_count_bytes(), %prefix, "splitting CAR stream");
        let shards = split_car(
            PeekReader::with_capacity(config.buffer_size, input),
            target_size,
            &prefix,
        )
        .context("failed to split CAR stream")?;
        info!(shards = shards.len(), "done");
        Ok(())
    }
}

#[derive(Debug, clap::Args)]
pub struct SplitAndCommPCommand {
    /// Target size in bytes to chunk CARs to
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    size: Option<u64>,
    /// Output name prefix, may include a directory
    #[arg(short, long)]
    output: Option<String>,
    /// Metadata CSV file listing the shards [default: __metadata.csv]
    #[arg(short, long)]
    metadata: Option<PathBuf>,
}

impl SplitAndCommPCommand {
    pub fn run(self, config: &Config, input: impl Read) -> anyhow::Result<()> {
        let target_size = self.size.or(config.target_size).context(
            "a target size is required, pass --size or set `target_size` in the config file",
        )?;
        let prefix = self.output.or_else(|| config.output.clone()).context(
            "an output prefix is required, pass --output or set `output` in the config file",
        )?;
        let metadata = self.metadata.unwrap_or_else(|| config.metadata.clone());

        info!(target_size = %target_size.human_count_bytes(), %prefix, "splitting CAR stream");
        let car_files = split_and_commp(
            PeekReader::with_capacity(config.buffer_size, input),
            target_size,
            &prefix,
        )
        .context("failed to split CAR stream")?;
        write_metadata_file(&metadata, &prefix, &car_files)?;
        info!(
            shards = car_files.len(),
            metadata = %metadata.display(),
            "done"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{block_frame, car_bytes};
    use std::fs;

    fn input() -> Vec<u8> {
        car_bytes((0..6).map(|i| block_frame(&[i; 400])))
    }

    fn shard_names(dir: &std::path::Path) -> Vec<String> {
        let mut names = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        names.sort();
        names
    }

    #[test]
    fn split_defaults_come_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            target_size: Some(800),
            output: Some(format!("{}/s-", dir.path().display())),
            ..Default::default()
        };
        SplitCommand {
            size: None,
            output: None,
        }
        .run(&config, input().as_slice())
        .unwrap();
        assert_eq!(shard_names(dir.path()), ["s-0.car", "s-1.car", "s-2.car"]);
    }

    #[test]
    fn flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            target_size: Some(1),
            output: Some("ignored-".into()),
            ..Default::default()
        };
        SplitCommand {
            size: Some(u64::MAX),
            output: Some(format!("{}/s-", dir.path().display())),
        }
        .run(&config, input().as_slice())
        .unwrap();
        assert_eq!(shard_names(dir.path()), ["s-0.car"]);
    }

    #[test]
    fn split_and_commp_writes_the_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let metadata = dir.path().join("meta.csv");
        SplitAndCommPCommand {
            size: Some(1200),
            output: Some(format!("{}/p-", dir.path().display())),
            metadata: Some(metadata.clone()),
        }
        .run(&Config::default(), input().as_slice())
        .unwrap();

        let csv = fs::read_to_string(&metadata).unwrap();
        let rows = csv.lines().skip(1).collect::<Vec<_>>();
        assert_eq!(rows.len(), 2);
        for row in rows {
            let fields = row.split(',').collect::<Vec<_>>();
            assert!(fields[3].starts_with("baga6ea4sea"), "{row}");
            assert!(fs::metadata(fields[2]).unwrap().is_file());
        }
    }

    #[test]
    fn split_and_commp_requires_size_and_prefix() {
        let no_size = SplitAndCommPCommand {
            size: None,
            output: Some("x-".into()),
            metadata: None,
        };
        assert!(no_size.run(&Config::default(), input().as_slice()).is_err());

        let no_prefix = SplitAndCommPCommand {
            size: Some(10),
            output: None,
            metadata: None,
        };
        assert!(no_prefix.run(&Config::default(), input().as_slice()).is_err());
    }
}
