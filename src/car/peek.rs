// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::io::{self, BufRead, ErrorKind::Interrupted, Read};

/// Look-ahead buffer capacity used for CAR input: the largest multiple of 127
/// bytes below 4 MiB, so piece-commitment quads line up with buffer refills.
pub const DEFAULT_BUFFER_SIZE: usize = (4 << 20) / 128 * 127;

/// A [`BufRead`] that can look ahead a bounded number of bytes without
/// consuming them.
pub trait PeekRead: BufRead {
    /// Returns up to `n` buffered bytes, reading from the underlying source
    /// until `n` bytes are available or it is exhausted.
    ///
    /// A result shorter than `n` means end-of-stream, and an empty result
    /// means there is nothing left to read. `n` is clamped to the buffer
    /// capacity.
    fn peek(&mut self, n: usize) -> io::Result<&[u8]>;
}

/// Buffered reader implementing [`PeekRead`] on top of any [`Read`].
pub struct PeekReader<R> {
    inner: R,
    buf: Box<[u8]>,
    pos: usize,
    filled: usize,
}

impl<R: Read> PeekReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE, inner)
    }

    pub fn with_capacity(capacity: usize, inner: R) -> Self {
        Self {
            inner,
            buf: vec![0; capacity.max(1)].into_boxed_slice(),
            pos: 0,
            filled: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn buffered(&self) -> usize {
        self.filled - self.pos
    }

    /// Reads once into the free tail of the buffer, retrying on interrupts.
    /// Returns the number of bytes read, `0` at end-of-stream.
    fn read_more(&mut self) -> io::Result<usize> {
        loop {
            match self.inner.read(&mut self.buf[self.filled..]) {
                Ok(read) => {
                    self.filled += read;
                    return Ok(read);
                }
                Err(e) if e.kind() == Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

impl<R: Read> PeekRead for PeekReader<R> {
    fn peek(&mut self, n: usize) -> io::Result<&[u8]> {
        let n = n.min(self.capacity());
        if self.buffered() < n {
            // make room at the tail
            self.buf.copy_within(self.pos..self.filled, 0);
            self.filled -= self.pos;
            self.pos = 0;
            while self.filled < n {
                if self.read_more()? == 0 {
                    break;
                }
            }
        }
        let end = self.filled.min(self.pos + n);
        Ok(&self.buf[self.pos..end])
    }
}

impl<R: Read> BufRead for PeekReader<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.pos == self.filled {
            self.pos = 0;
            self.filled = 0;
            self.read_more()?;
        }
        Ok(&self.buf[self.pos..self.filled])
    }

    fn consume(&mut self, amt: usize) {
        self.pos = (self.pos + amt).min(self.filled);
    }
}

impl<R: Read> Read for PeekReader<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        // skip our buffer entirely for large reads
        if self.pos == self.filled && out.len() >= self.capacity() {
            return self.inner.read(out);
        }
        let available = self.fill_buf()?;
        let n = available.len().min(out.len());
        out[..n].copy_from_slice(&available[..n]);
        self.consume(n);
        Ok(n)
    }
}
