// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! # Varint frames
//!
//! A CARv1 stream is a concatenation of _varint frames_: a varint body length
//! followed by the body itself. The first frame is the header, every
//! following frame holds one block (a CID and its data).
//!
//! ```text
//!        varint frame
//! │◄───────────────────────►│
//! ├───────────┬─────────────┤
//! │varint:    │             │
//! │body length│frame body   │
//! └───────────┴─────────────┘
//! ```
//!
//! Splitting only ever cuts between frames. Frame bodies are copied verbatim
//! and never decoded.

mod error;
pub mod header;
pub mod peek;
pub mod splitter;
pub mod varint;

pub use error::{Error, FinalizeError};
pub use header::{NUL_ROOT_CAR_HEADER, strip_header};
pub use peek::{PeekRead, PeekReader};
pub use splitter::{CarSplitter, ShardStore};

/// Frames declaring a body larger than this are treated as stream corruption.
pub const MAX_FRAME_SIZE: u64 = 2 << 20;
