// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::io::{self, Write};

use tracing::{debug, warn};

use super::header::strip_header;
use super::peek::PeekRead;
use super::varint::{self, MAX_VARINT_LEN};
use super::{Error, FinalizeError, MAX_FRAME_SIZE};

/// Destination for the shards cut by a [`CarSplitter`].
pub trait ShardStore {
    /// Sink receiving the frames of a single shard.
    type Writer: Write;
    /// Record produced for every completed shard.
    type Shard;

    /// Opens shard `index` with [`NUL_ROOT_CAR_HEADER`](super::NUL_ROOT_CAR_HEADER)
    /// already written to it.
    fn create(&mut self, index: usize) -> io::Result<Self::Writer>;

    /// Closes out shard `index`. Any file behind `writer` must be closed by
    /// the time this returns, on success and failure alike.
    fn finalize(
        &mut self,
        index: usize,
        writer: Self::Writer,
    ) -> Result<Self::Shard, FinalizeError>;
}

/// Re-partitions a CARv1 stream into shards of at least `target_size` bytes of
/// frames each (the last shard may be smaller).
///
/// The target is a soft threshold checked between frames: a shard keeps
/// taking whole frames until it reaches the target, so it can overshoot by at
/// most one frame. Frames are never split.
///
/// Iterating yields one [`ShardStore::Shard`] per shard in stream order, and
/// stops after the first error.
pub struct CarSplitter<R, S> {
    reader: R,
    store: S,
    target_size: u64,
    offset: u64,
    next_index: usize,
    exhausted: bool,
}

impl<R: PeekRead, S: ShardStore> CarSplitter<R, S> {
    /// Discards the header of `reader`, leaving it positioned at the first
    /// block frame.
    pub fn new(mut reader: R, target_size: u64, store: S) -> Result<Self, Error> {
        let offset = strip_header(&mut reader)?;
        Ok(Self {
            reader,
            store,
            target_size,
            offset,
            next_index: 0,
            exhausted: false,
        })
    }

    /// Absolute offset into the input of the next unread byte.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Writes and finalizes the next shard. Returns [`None`] once the input
    /// is exhausted.
    pub fn next_shard(&mut self) -> Result<Option<S::Shard>, Error> {
        if self.exhausted {
            return Ok(None);
        }
        let Some(mut frame_len) = self.next_frame_len()? else {
            self.exhausted = true;
            return Ok(None);
        };

        let index = self.next_index;
        let mut writer = self.store.create(index).map_err(|source| Error::Io {
            offset: self.offset,
            source,
        })?;

        let mut shard_len = 0;
        loop {
            let copied = self.copy_frame(&mut writer, frame_len)?;
            shard_len += copied;
            if copied < frame_len {
                // only tolerated at the very end of the input
                warn!(
                    offset = self.offset,
                    expected = frame_len,
                    copied,
                    "input ended mid-frame"
                );
                self.exhausted = true;
                break;
            }
            if shard_len >= self.target_size {
                break;
            }
            match self.next_frame_len()? {
                Some(len) => frame_len = len,
                None => {
                    self.exhausted = true;
                    break;
                }
            }
        }

        let shard = self
            .store
            .finalize(index, writer)
            .map_err(|e| e.at(self.offset))?;
        debug!(index, shard_len, offset = self.offset, "shard complete");
        self.next_index += 1;
        Ok(Some(shard))
    }

    /// Peeks the length prefix of the next frame, returning the full frame
    /// length (prefix included), or [`None`] at a clean end of input.
    fn next_frame_len(&mut self) -> Result<Option<u64>, Error> {
        let offset = self.offset;
        let peeked = self
            .reader
            .peek(MAX_VARINT_LEN)
            .map_err(|source| Error::Io { offset, source })?;
        if peeked.is_empty() {
            return Ok(None);
        }
        // trailing garbage behind the last frame ends up here
        let (body_len, varint_len) =
            varint::decode(peeked).ok_or(Error::UndecodableVarint { offset })?;
        if body_len > MAX_FRAME_SIZE {
            return Err(Error::FrameTooLarge {
                len: body_len,
                offset,
            });
        }
        Ok(Some(varint_len as u64 + body_len))
    }

    /// Copies up to `frame_len` bytes to `writer`, stopping early only at end
    /// of input. Returns the number of bytes copied.
    fn copy_frame(&mut self, writer: &mut impl Write, frame_len: u64) -> Result<u64, Error> {
        let start = self.offset;
        let mut copied = 0;
        while copied < frame_len {
            let buf = self.reader.fill_buf().map_err(|source| Error::Io {
                offset: start,
                source,
            })?;
            if buf.is_empty() {
                break;
            }
            let n = buf
                .len()
                .min(usize::try_from(frame_len - copied).unwrap_or(usize::MAX));
            writer.write_all(&buf[..n]).map_err(|source| Error::Io {
                offset: start,
                source,
            })?;
            self.reader.consume(n);
            copied += n as u64;
            self.offset += n as u64;
        }
        Ok(copied)
    }
}

impl<R: PeekRead, S: ShardStore> Iterator for CarSplitter<R, S> {
    type Item = Result<S::Shard, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.next_shard();
        if next.is_err() {
            self.exhausted = true;
        }
        next.transpose()
    }
}
