// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use tracing_subscriber::{EnvFilter, prelude::*};

use crate::utils::misc::LoggingColor;

/// Logs to stderr, keeping stdout free for command output.
pub fn setup_minimal_logger(color: LoggingColor) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::Layer::new()
                .with_ansi(color.coloring_enabled())
                .with_writer(std::io::stderr)
                .with_filter(get_env_filter(default_tool_filter())),
        )
        .init();
}

/// Returns an [`EnvFilter`] according to the `RUST_LOG` environment variable, or a default
/// - see [`default_tool_filter`]
///
/// Note that [`tracing_subscriber::filter::Builder`] only allows a single default directive,
/// whereas we want to provide multiple.
fn get_env_filter(def: EnvFilter) -> EnvFilter {
    use std::env::{
        self,
        VarError::{NotPresent, NotUnicode},
    };
    match env::var(tracing_subscriber::EnvFilter::DEFAULT_ENV) {
        Ok(s) => EnvFilter::new(s),
        Err(NotPresent) => def,
        Err(NotUnicode(_)) => EnvFilter::default(),
    }
}

fn default_tool_filter() -> EnvFilter {
    let default_directives = ["info"];
    EnvFilter::new(default_directives.join(","))
}

#[test]
fn test_default_tool_filter() {
    let _did_not_panic = default_tool_filter();
}
