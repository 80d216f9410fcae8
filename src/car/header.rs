// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use tracing::debug;

use super::peek::PeekRead;
use super::varint::{self, MAX_VARINT_LEN};
use super::Error;

/// Length of the DAG-CBOR body of [`NUL_ROOT_CAR_HEADER`].
pub const NUL_ROOT_CAR_HEADER_BODY_LEN: usize = 25;

/// The varint frame every shard starts with: a CARv1 header whose single
/// root is the empty identity CID. The root is a placeholder, shards carry no
/// meaningful root.
///
/// See <https://github.com/ipld/go-car/issues/26#issuecomment-604299576> for
/// why the root is the nul-identity CID.
#[rustfmt::skip]
pub const NUL_ROOT_CAR_HEADER: [u8; 1 + NUL_ROOT_CAR_HEADER_BODY_LEN] = [
    // varint frame length
    0x19,
    // map with 2 keys
    0xa2,
    // text key "roots"
    0x65, b'r', b'o', b'o', b't', b's',
    // array with 1 element
    0x81,
    // tag 42 (CID link)
    0xd8, 0x2a,
    // 5 bytes: multibase identity prefix, CIDv1, raw, identity multihash, empty digest
    0x45, 0x00, 0x01, 0x55, 0x00, 0x00,
    // text key "version"
    0x67, b'v', b'e', b'r', b's', b'i', b'o', b'n',
    // 1
    0x01,
];

/// Discards the header frame at the start of a CAR stream without
/// interpreting it, returning the number of bytes consumed.
pub fn strip_header(reader: &mut impl PeekRead) -> Result<u64, Error> {
    let malformed = |reason: String| Error::MalformedHeader { offset: 0, reason };

    let peeked = reader
        .peek(MAX_VARINT_LEN)
        .map_err(|source| Error::Io { offset: 0, source })?;
    if peeked.is_empty() {
        return Err(malformed("empty input".into()));
    }
    let (header_len, varint_len) = varint::decode(peeked)
        .ok_or_else(|| malformed("undecodeable header length".into()))?;
    if header_len == 0 {
        return Err(malformed("zero-length header".into()));
    }
    reader.consume(varint_len);

    let mut remaining = header_len;
    while remaining > 0 {
        let offset = varint_len as u64 + (header_len - remaining);
        let available = reader
            .fill_buf()
            .map_err(|source| Error::Io { offset, source })?
            .len();
        if available == 0 {
            return Err(Error::MalformedHeader {
                offset,
                reason: format!("header truncated, expected {header_len} bytes"),
            });
        }
        let n = available.min(usize::try_from(remaining).unwrap_or(usize::MAX));
        reader.consume(n);
        remaining -= n as u64;
    }

    debug!(header_len, "discarded CAR header");
    Ok(varint_len as u64 + header_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::car::peek::PeekReader;
    use cid::{Cid, multihash::Multihash};
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct CarV1Header {
        roots: Vec<Cid>,
        version: u64,
    }

    #[test]
    fn nul_root_header_is_valid_dag_cbor() {
        let (body_len, varint_len) = varint::decode(&NUL_ROOT_CAR_HEADER).unwrap();
        assert_eq!(varint_len, 1);
        assert_eq!(body_len as usize, NUL_ROOT_CAR_HEADER_BODY_LEN);

        let header: CarV1Header =
            serde_ipld_dagcbor::from_slice(&NUL_ROOT_CAR_HEADER[1..]).unwrap();
        let nul_identity = Cid::new_v1(0x55, Multihash::wrap(0x00, &[]).unwrap());
        assert_eq!(
            header,
            CarV1Header {
                roots: vec![nul_identity],
                version: 1,
            }
        );
    }

    #[test]
    fn strip_header_consumes_exactly_the_header() {
        let mut input = NUL_ROOT_CAR_HEADER.to_vec();
        input.extend([0x03, 0xaa, 0xbb, 0xcc]);
        let mut reader = PeekReader::new(input.as_slice());
        assert_eq!(strip_header(&mut reader).unwrap(), 26);
        assert_eq!(reader.peek(4).unwrap(), &[0x03, 0xaa, 0xbb, 0xcc]);
    }

    #[test]
    fn strip_header_of_header_only_stream() {
        let mut reader = PeekReader::new(&NUL_ROOT_CAR_HEADER[..]);
        assert_eq!(strip_header(&mut reader).unwrap(), 26);
        assert!(reader.peek(1).unwrap().is_empty());
    }

    #[test]
    fn strip_header_rejects_bad_prefixes() {
        for input in [&[][..], &[0x00, 0x01][..], &[0xff, 0xff][..]] {
            let err = strip_header(&mut PeekReader::new(input)).unwrap_err();
            assert!(matches!(err, Error::MalformedHeader { offset: 0, .. }), "{err}");
        }
    }

    #[test]
    fn strip_header_rejects_truncated_header() {
        let err = strip_header(&mut PeekReader::new(&NUL_ROOT_CAR_HEADER[..20])).unwrap_err();
        assert!(
            matches!(err, Error::MalformedHeader { offset: 20, .. }),
            "{err}"
        );
    }
}
