// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Streaming piece commitment (`CommP`) computation.
//!
//! Payload bytes are [Fr32](fr32) padded, split into 32-byte leaves and
//! folded into a binary Merkle tree whose nodes are SHA-256 digests truncated
//! to 254 bits. The tree is padded to a power-of-two number of leaves with
//! zero pieces. Only one pending node per tree layer is kept, so memory use is
//! bounded by the tree height rather than by the payload size.

pub mod commcid;
pub mod fr32;

use std::io::{self, Write};
use std::sync::LazyLock;

use sha2::{Digest as _, Sha256};
use thiserror::Error;

use fr32::{QUAD_PADDED, QUAD_PAYLOAD};

/// A raw 32-byte piece commitment.
pub type Commitment = [u8; 32];

type Node = [u8; NODE_SIZE];

const NODE_SIZE: usize = 32;

/// Height of the tree for the largest supported piece.
pub const MAX_LAYERS: usize = 31;
/// Largest supported padded piece, 64 GiB.
pub const MAX_PIECE_SIZE: u64 = 1 << (MAX_LAYERS + 5);
pub const MAX_PIECE_PAYLOAD: u64 = MAX_PIECE_SIZE / 128 * 127;
/// Commitments are not defined for shorter payloads.
pub const MIN_PIECE_PAYLOAD: u64 = 65;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(
        "insufficient state accumulated: commP is not defined for inputs shorter than {min} bytes, but only {0} processed so far",
        min = MIN_PIECE_PAYLOAD
    )]
    InsufficientData(u64),
    #[error(
        "writing {write} bytes after {processed} would exceed the maximum piece payload of {max} bytes",
        max = MAX_PIECE_PAYLOAD
    )]
    TooLarge { processed: u64, write: u64 },
    #[error("commP has already been finalized, reset it first")]
    AlreadyFinalized,
}

impl From<Error> for io::Error {
    fn from(e: Error) -> Self {
        io::Error::new(io::ErrorKind::InvalidInput, e)
    }
}

/// A streaming piece-commitment accumulator.
///
/// Bytes are fed through [`Write`]. The cycle `write* → digest → reset` may be
/// repeated indefinitely on the same value.
pub trait PieceAccumulator: Write {
    /// Finalizes the commitment over everything written since the last reset,
    /// returning it with the padded piece size.
    fn digest(&mut self) -> Result<(Commitment, u64), Error>;

    /// Discards all state, as if freshly constructed.
    fn reset(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing written since construction or the last reset.
    #[default]
    Idle,
    Accumulating,
    /// Digested, only [`PieceAccumulator::reset`] is accepted.
    Finalized,
}

/// The Filecoin unsealed piece commitment calculator.
#[derive(Debug, Clone, Default)]
pub struct CommPCalc {
    phase: Phase,
    /// Tail of the payload not yet forming a full quad.
    buffer: Vec<u8>,
    quads: u64,
    tree: Tree,
}

impl CommPCalc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Payload bytes written since the last reset.
    pub fn processed(&self) -> u64 {
        self.quads * QUAD_PAYLOAD as u64 + self.buffer.len() as u64
    }

    fn push_quad(tree: &mut Tree, quads: &mut u64, quad: &[u8]) {
        let padded = fr32::expand(quad);
        for leaf in padded.chunks_exact(NODE_SIZE) {
            let mut node = Node::default();
            node.copy_from_slice(leaf);
            tree.push(node);
        }
        *quads += 1;
    }
}

impl Write for CommPCalc {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.phase == Phase::Finalized {
            return Err(Error::AlreadyFinalized.into());
        }
        let processed = self.processed();
        if processed + buf.len() as u64 > MAX_PIECE_PAYLOAD {
            return Err(Error::TooLarge {
                processed,
                write: buf.len() as u64,
            }
            .into());
        }
        if buf.is_empty() {
            return Ok(0);
        }
        self.phase = Phase::Accumulating;

        let mut input = buf;
        if !self.buffer.is_empty() {
            let take = (QUAD_PAYLOAD - self.buffer.len()).min(input.len());
            self.buffer.extend_from_slice(&input[..take]);
            input = &input[take..];
            if self.buffer.len() < QUAD_PAYLOAD {
                return Ok(buf.len());
            }
            Self::push_quad(&mut self.tree, &mut self.quads, &self.buffer);
            self.buffer.clear();
        }

        let mut quads = input.chunks_exact(QUAD_PAYLOAD);
        for quad in &mut quads {
            Self::push_quad(&mut self.tree, &mut self.quads, quad);
        }
        self.buffer.extend_from_slice(quads.remainder());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl PieceAccumulator for CommPCalc {
    fn digest(&mut self) -> Result<(Commitment, u64), Error> {
        if self.phase == Phase::Finalized {
            return Err(Error::AlreadyFinalized);
        }
        let processed = self.processed();
        if processed < MIN_PIECE_PAYLOAD {
            return Err(Error::InsufficientData(processed));
        }

        // zero-fill the trailing partial quad
        if !self.buffer.is_empty() {
            self.buffer.resize(QUAD_PAYLOAD, 0);
            Self::push_quad(&mut self.tree, &mut self.quads, &self.buffer);
            self.buffer.clear();
        }

        let padded_size = (self.quads * QUAD_PADDED as u64).next_power_of_two();
        let height = (padded_size / NODE_SIZE as u64).trailing_zeros() as usize;
        let root = self.tree.root(height);
        self.phase = Phase::Finalized;
        Ok((root, padded_size))
    }

    fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.buffer.clear();
        self.quads = 0;
        self.tree = Tree::default();
    }
}

/// Commitments of all-zero subtrees, indexed by layer (leaves are layer 0).
static ZERO_COMMITMENTS: LazyLock<Vec<Node>> = LazyLock::new(|| {
    let mut comms = Vec::with_capacity(MAX_LAYERS + 1);
    let mut node = Node::default();
    for _ in 0..=MAX_LAYERS {
        comms.push(node);
        node = hash_pair(&node, &node);
    }
    comms
});

fn hash_pair(left: &Node, right: &Node) -> Node {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    let mut out = Node::default();
    out.copy_from_slice(&hasher.finalize());
    // truncate to 254 bits
    out[NODE_SIZE - 1] &= 0x3f;
    out
}

/// Left-to-right Merkle accumulator holding at most one unpaired node per
/// layer.
#[derive(Debug, Clone, Default)]
struct Tree {
    pending: Vec<Option<Node>>,
}

impl Tree {
    fn push(&mut self, mut node: Node) {
        for slot in self.pending.iter_mut() {
            match slot.take() {
                Some(left) => node = hash_pair(&left, &node),
                None => {
                    *slot = Some(node);
                    return;
                }
            }
        }
        self.pending.push(Some(node));
    }

    /// Root of a tree of the given height, with every leaf past the pushed
    /// ones set to zero.
    fn root(&self, height: usize) -> Node {
        let zero = &*ZERO_COMMITMENTS;
        let mut carry: Option<Node> = None;
        for layer in 0..height {
            let pending = self.pending.get(layer).copied().flatten();
            carry = match (pending, carry) {
                (Some(left), Some(right)) => Some(hash_pair(&left, &right)),
                (Some(left), None) | (None, Some(left)) => Some(hash_pair(&left, &zero[layer])),
                (None, None) => None,
            };
        }
        carry
            .or_else(|| self.pending.get(height).copied().flatten())
            .unwrap_or(zero[height])
    }
}
