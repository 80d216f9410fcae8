// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::path::Path;

use anyhow::Context as _;

/// Converts a TOML file represented as a string to `S`
pub fn read_toml<S>(toml_string: &str) -> anyhow::Result<S>
where
    for<'de> S: serde::de::Deserialize<'de>,
{
    let new_struct: S = toml::from_str(toml_string)?;
    Ok(new_struct)
}

/// Reads and parses the TOML file at `path`.
pub fn read_toml_file<S>(path: &Path) -> anyhow::Result<S>
where
    for<'de> S: serde::de::Deserialize<'de>,
{
    let toml_string = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    read_toml(&toml_string).with_context(|| format!("failed to parse {}", path.display()))
}
