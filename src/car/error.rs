// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::commp;

/// Fatal conditions that abort a split run. Every variant records the
/// absolute input offset at which it was detected.
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed CAR header at offset {offset}: {reason}")]
    MalformedHeader { offset: u64, reason: String },
    #[error("aborting car stream parse: undecodeable varint at offset {offset}")]
    UndecodableVarint { offset: u64 },
    #[error(
        "aborting car stream parse: unexpectedly large frame length of {len} bytes at offset {offset}"
    )]
    FrameTooLarge { len: u64, offset: u64 },
    #[error("I/O error at offset {offset}: {source}")]
    Io {
        offset: u64,
        #[source]
        source: io::Error,
    },
    #[error("couldn't compute piece commitment at offset {offset}: {source}")]
    Digest {
        offset: u64,
        #[source]
        source: commp::Error,
    },
    #[error("couldn't encode piece commitment at offset {offset}: {reason}")]
    IdentifierEncoding { offset: u64, reason: &'static str },
    #[error("couldn't rename {} to {} at offset {offset}: {source}", .from.display(), .to.display())]
    Rename {
        offset: u64,
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Absolute input offset at which the error was detected.
    pub fn offset(&self) -> u64 {
        match self {
            Error::MalformedHeader { offset, .. }
            | Error::UndecodableVarint { offset }
            | Error::FrameTooLarge { offset, .. }
            | Error::Io { offset, .. }
            | Error::Digest { offset, .. }
            | Error::IdentifierEncoding { offset, .. }
            | Error::Rename { offset, .. } => *offset,
        }
    }

    /// Format errors mean the byte alignment of the input can no longer be
    /// trusted.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Error::MalformedHeader { .. }
                | Error::UndecodableVarint { .. }
                | Error::FrameTooLarge { .. }
        )
    }
}

/// Failure while closing out a shard, before the splitter attaches the
/// stream offset.
#[derive(Debug, Error)]
pub enum FinalizeError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Digest(#[from] commp::Error),
    #[error("{0}")]
    IdentifierEncoding(&'static str),
    #[error("couldn't rename {} to {}: {source}", .from.display(), .to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FinalizeError {
    pub fn at(self, offset: u64) -> Error {
        match self {
            FinalizeError::Io(source) => Error::Io { offset, source },
            FinalizeError::Digest(source) => Error::Digest { offset, source },
            FinalizeError::IdentifierEncoding(reason) => {
                Error::IdentifierEncoding { offset, reason }
            }
            FinalizeError::Rename { from, to, source } => Error::Rename {
                offset,
                from,
                to,
                source,
            },
        }
    }
}
