// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! On-disk shard stores.
//!
//! Shards are first written as `<prefix><index>.car`. In commitment mode each
//! one is renamed to `<prefix><piece cid>.car` once its commitment is known,
//! so a file still carrying an index name was never finalized.

pub mod manifest;

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use cid::Cid;
use human_repr::HumanCount as _;
use tracing::info;

use crate::car::{CarSplitter, Error, FinalizeError, NUL_ROOT_CAR_HEADER, PeekRead, ShardStore};
use crate::commp::{CommPCalc, PieceAccumulator, commcid::data_commitment_v1_to_cid};

/// A finalized shard in commitment mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarFile {
    pub name: PathBuf,
    pub piece_cid: Cid,
    pub padded_size: u64,
}

/// Broadcasts every write to both inner writers.
#[derive(Debug)]
pub struct MultiWriter<A, B> {
    first: A,
    second: B,
}

impl<A: Write, B: Write> MultiWriter<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    pub fn into_inner(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A: Write, B: Write> Write for MultiWriter<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.first.write_all(buf)?;
        self.second.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.first.flush()?;
        self.second.flush()
    }
}

fn provisional_path(prefix: &str, index: usize) -> PathBuf {
    PathBuf::from(format!("{prefix}{index}.car"))
}

fn create_shard_file(prefix: &str, index: usize) -> io::Result<BufWriter<File>> {
    let path = provisional_path(prefix, index);
    info!(path = %path.display(), "writing shard");
    let mut file = BufWriter::new(File::create(&path)?);
    file.write_all(&NUL_ROOT_CAR_HEADER)?;
    Ok(file)
}

/// Flushes and closes the shard file.
fn close(file: BufWriter<File>) -> io::Result<()> {
    let file = file.into_inner().map_err(io::IntoInnerError::into_error)?;
    drop(file);
    Ok(())
}

/// Plain shard files, named by index.
#[derive(Debug, Clone)]
pub struct CarShards {
    prefix: String,
}

impl CarShards {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl ShardStore for CarShards {
    type Writer = BufWriter<File>;
    type Shard = PathBuf;

    fn create(&mut self, index: usize) -> io::Result<Self::Writer> {
        create_shard_file(&self.prefix, index)
    }

    fn finalize(&mut self, index: usize, writer: Self::Writer) -> Result<PathBuf, FinalizeError> {
        close(writer)?;
        Ok(provisional_path(&self.prefix, index))
    }
}

/// Shard files whose bytes are also folded into a piece accumulator, renamed
/// after their piece CID when complete.
///
/// Between shards the accumulator holds exactly [`NUL_ROOT_CAR_HEADER`], the
/// bytes every new shard file starts with.
#[derive(Debug)]
pub struct CommPShards<A = CommPCalc> {
    prefix: String,
    /// Taken while a shard is open.
    accumulator: Option<A>,
}

impl<A: PieceAccumulator> CommPShards<A> {
    pub fn new(prefix: impl Into<String>, mut accumulator: A) -> io::Result<Self> {
        reseed(&mut accumulator)?;
        Ok(Self {
            prefix: prefix.into(),
            accumulator: Some(accumulator),
        })
    }

    /// The accumulator, unless a shard is currently open.
    pub fn accumulator(&self) -> Option<&A> {
        self.accumulator.as_ref()
    }

    fn commit(
        &self,
        index: usize,
        file: BufWriter<File>,
        accumulator: &mut A,
    ) -> Result<CarFile, FinalizeError> {
        close(file)?;
        let (comm_p, padded_size) = accumulator.digest()?;
        let piece_cid =
            data_commitment_v1_to_cid(&comm_p).map_err(FinalizeError::IdentifierEncoding)?;

        let from = provisional_path(&self.prefix, index);
        let to = PathBuf::from(format!("{}{piece_cid}.car", self.prefix));
        if let Err(source) = fs::rename(&from, &to) {
            return Err(FinalizeError::Rename { from, to, source });
        }
        info!(
            name = %to.display(),
            %piece_cid,
            padded_size = %padded_size.human_count_bytes(),
            "shard finalized"
        );
        Ok(CarFile {
            name: to,
            piece_cid,
            padded_size,
        })
    }
}

impl<A: PieceAccumulator> ShardStore for CommPShards<A> {
    type Writer = MultiWriter<BufWriter<File>, A>;
    type Shard = CarFile;

    fn create(&mut self, index: usize) -> io::Result<Self::Writer> {
        let accumulator = self.accumulator.take().ok_or_else(|| {
            io::Error::other("piece accumulator is still attached to an open shard")
        })?;
        match create_shard_file(&self.prefix, index) {
            Ok(file) => Ok(MultiWriter::new(file, accumulator)),
            Err(e) => {
                self.accumulator = Some(accumulator);
                Err(e)
            }
        }
    }

    fn finalize(&mut self, index: usize, writer: Self::Writer) -> Result<CarFile, FinalizeError> {
        let (file, mut accumulator) = writer.into_inner();
        let committed = self.commit(index, file, &mut accumulator);
        let reseeded = reseed(&mut accumulator);
        self.accumulator = Some(accumulator);
        let car_file = committed?;
        reseeded?;
        Ok(car_file)
    }
}

/// Resets `accumulator` to the state matching a freshly created shard file.
fn reseed(accumulator: &mut impl PieceAccumulator) -> io::Result<()> {
    accumulator.reset();
    accumulator.write_all(&NUL_ROOT_CAR_HEADER)
}

/// Splits `reader` into plain shard files `<prefix><index>.car`.
pub fn split_car(
    reader: impl PeekRead,
    target_size: u64,
    prefix: &str,
) -> Result<Vec<PathBuf>, Error> {
    CarSplitter::new(reader, target_size, CarShards::new(prefix))?.collect()
}

/// Splits `reader` into shard files named after their piece CIDs.
pub fn split_and_commp(
    reader: impl PeekRead,
    target_size: u64,
    prefix: &str,
) -> Result<Vec<CarFile>, Error> {
    let store = CommPShards::new(prefix, CommPCalc::new())
        .map_err(|source| Error::Io { offset: 0, source })?;
    CarSplitter::new(reader, target_size, store)?.collect()
}
