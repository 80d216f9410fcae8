// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! CSV manifest listing the shards produced by a commitment run.

use std::fmt::Display;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::Context as _;
use chrono::{DateTime, Local, SecondsFormat, TimeZone};

use super::CarFile;

pub const DEFAULT_METADATA_FILE: &str = "__metadata.csv";

const COLUMNS: [&str; 5] = [
    "timestamp",
    "filename prefix",
    "car file",
    "piece cid",
    "padded piece size",
];

/// Writes one row per shard, all stamped with `timestamp`.
pub fn write_metadata<Tz>(
    writer: impl Write,
    timestamp: &DateTime<Tz>,
    prefix: &str,
    car_files: &[CarFile],
) -> anyhow::Result<()>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let timestamp = timestamp.to_rfc3339_opts(SecondsFormat::Secs, false);
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(COLUMNS)?;
    for car in car_files {
        csv.write_record([
            timestamp.clone(),
            prefix.to_owned(),
            car.name.display().to_string(),
            car.piece_cid.to_string(),
            car.padded_size.to_string(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

/// Creates (or truncates) `path` and writes the manifest to it, stamped with
/// the current local time.
pub fn write_metadata_file(
    path: &Path,
    prefix: &str,
    car_files: &[CarFile],
) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create metadata file {}", path.display()))?;
    write_metadata(file, &Local::now(), prefix, car_files)
        .with_context(|| format!("failed to write metadata file {}", path.display()))
}
