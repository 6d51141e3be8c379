//! Snapshot byte layout.
//!
//! # Header
//!
//! ```text
//! +----------+----------------------------------------------+
//! | 0-7      | magic "AVLTSNAP"                             |
//! | 8-11     | format_version (u32)                         |
//! | 12       | traversal order (1 = pre-order, 2 = level)   |
//! | 13-20    | record_count (u64)                           |
//! | 21-24    | CRC32 of bytes 0-20                          |
//! +----------+----------------------------------------------+
//! ```
//!
//! # Record
//!
//! ```text
//! +----------+----------------------------------------------+
//! | 0-3      | key_length (u32)                             |
//! | 4-K      | key bytes                                    |
//! | K-K+3    | value_length (u32)                           |
//! | ...      | value bytes                                  |
//! | N-N+3    | CRC32 of the record bytes before it          |
//! +----------+----------------------------------------------+
//! ```
//!
//! All integers are little endian. Records follow the header in the export
//! order and are replayed through the tree's insertion path on load.

use crate::snapshot::SnapshotError;
use crate::snapshot::codec::SnapshotCodec;
use crate::tree::{AvlTree, TraversalOrder};

/// Magic number identifying a snapshot: "AVLTSNAP"
pub const MAGIC: [u8; 8] = *b"AVLTSNAP";

/// Current format version.
pub const FORMAT_VERSION: u32 = 1;

/// Header size before its checksum.
/// magic (8) + version (4) + order (1) + count (8) = 21 bytes
const HEADER_BODY_SIZE: usize = 21;

/// CRC32 checksum size.
const CHECKSUM_SIZE: usize = 4;

/// Smallest possible record: two empty length-prefixed fields and a checksum.
const MIN_RECORD_SIZE: usize = 4 + 4 + CHECKSUM_SIZE;

const ORDER_PRE: u8 = 1;
const ORDER_LEVEL: u8 = 2;

const fn order_tag(order: TraversalOrder) -> Result<u8, SnapshotError> {
    match order {
        TraversalOrder::PreOrder => Ok(ORDER_PRE),
        TraversalOrder::LevelOrder => Ok(ORDER_LEVEL),
        TraversalOrder::InOrder | TraversalOrder::ReverseInOrder => {
            Err(SnapshotError::UnsupportedOrder(order))
        }
    }
}

const fn order_from_tag(tag: u8) -> Result<TraversalOrder, SnapshotError> {
    match tag {
        ORDER_PRE => Ok(TraversalOrder::PreOrder),
        ORDER_LEVEL => Ok(TraversalOrder::LevelOrder),
        _ => Err(SnapshotError::UnknownOrder(tag)),
    }
}

/// Append a length-prefixed field, failing if it does not fit a u32 length.
fn put_field(out: &mut Vec<u8>, field: &[u8], index: usize) -> Result<(), SnapshotError> {
    let len = u32::try_from(field.len()).map_err(|_| SnapshotError::RecordTooLarge { index })?;
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(field);
    Ok(())
}

/// Serialize a tree, visiting records in `order`.
///
/// Only parent-before-children orders are accepted.
pub fn encode_snapshot<K, V>(
    tree: &AvlTree<K, V>,
    order: TraversalOrder,
) -> Result<Vec<u8>, SnapshotError>
where
    K: SnapshotCodec,
    V: SnapshotCodec,
{
    let tag = order_tag(order)?;

    let mut bytes =
        Vec::with_capacity(HEADER_BODY_SIZE + CHECKSUM_SIZE + tree.len() * MIN_RECORD_SIZE);
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.push(tag);
    bytes.extend_from_slice(&(tree.len() as u64).to_le_bytes());
    let checksum = crc32fast::hash(&bytes);
    bytes.extend_from_slice(&checksum.to_le_bytes());

    let mut scratch = Vec::new();
    for (index, (key, value)) in tree.traverse(order).enumerate() {
        let start = bytes.len();

        scratch.clear();
        key.encode(&mut scratch);
        put_field(&mut bytes, &scratch, index)?;

        scratch.clear();
        value.encode(&mut scratch);
        put_field(&mut bytes, &scratch, index)?;

        let checksum = crc32fast::hash(&bytes[start..]);
        bytes.extend_from_slice(&checksum.to_le_bytes());
    }

    tracing::debug!(records = tree.len(), bytes = bytes.len(), ?order, "encoded snapshot");
    Ok(bytes)
}

/// Forward-only reader over snapshot bytes.
struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    const fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.offset.checked_add(len)?;
        let slice = self.bytes.get(self.offset..end)?;
        self.offset = end;
        Some(slice)
    }

    fn u32(&mut self) -> Option<u32> {
        self.take(4)
            .and_then(|b| <[u8; 4]>::try_from(b).ok())
            .map(u32::from_le_bytes)
    }

    fn u64(&mut self) -> Option<u64> {
        self.take(8)
            .and_then(|b| <[u8; 8]>::try_from(b).ok())
            .map(u64::from_le_bytes)
    }
}

/// Parse and validate the header, returning the export order and record count.
fn decode_header(reader: &mut Reader<'_>) -> Result<(TraversalOrder, u64), SnapshotError> {
    let body = reader
        .take(HEADER_BODY_SIZE)
        .ok_or(SnapshotError::TruncatedHeader)?;
    let stored = reader.u32().ok_or(SnapshotError::TruncatedHeader)?;

    if body[..8] != MAGIC {
        return Err(SnapshotError::BadMagic);
    }
    let computed = crc32fast::hash(body);
    if stored != computed {
        return Err(SnapshotError::HeaderChecksum {
            expected: stored,
            actual: computed,
        });
    }

    let mut fields = Reader::new(&body[8..]);
    let version = fields.u32().ok_or(SnapshotError::TruncatedHeader)?;
    if version != FORMAT_VERSION {
        return Err(SnapshotError::UnsupportedVersion(version));
    }
    let tag = fields.take(1).ok_or(SnapshotError::TruncatedHeader)?[0];
    let order = order_from_tag(tag)?;
    let count = fields.u64().ok_or(SnapshotError::TruncatedHeader)?;

    Ok((order, count))
}

/// Parse one checksummed record.
fn decode_record<K, V>(reader: &mut Reader<'_>, index: usize) -> Result<(K, V), SnapshotError>
where
    K: SnapshotCodec,
    V: SnapshotCodec,
{
    let truncated = || SnapshotError::TruncatedRecord { index };
    let start = reader.offset;

    let key_len = reader.u32().ok_or_else(truncated)? as usize;
    let key_bytes = reader.take(key_len).ok_or_else(truncated)?;
    let value_len = reader.u32().ok_or_else(truncated)? as usize;
    let value_bytes = reader.take(value_len).ok_or_else(truncated)?;
    let end = reader.offset;
    let stored = reader.u32().ok_or_else(truncated)?;

    let computed = crc32fast::hash(&reader.bytes[start..end]);
    if stored != computed {
        return Err(SnapshotError::RecordChecksum {
            index,
            expected: stored,
            actual: computed,
        });
    }

    let key = K::decode(key_bytes).map_err(|source| SnapshotError::Codec { index, source })?;
    let value = V::decode(value_bytes).map_err(|source| SnapshotError::Codec { index, source })?;
    Ok((key, value))
}

/// Rebuild a tree from snapshot bytes.
///
/// Decoding is all-or-nothing: any malformed byte, checksum mismatch or
/// duplicate key rejects the whole snapshot.
pub fn decode_snapshot<K, V>(bytes: &[u8]) -> Result<AvlTree<K, V>, SnapshotError>
where
    K: SnapshotCodec + Ord,
    V: SnapshotCodec,
{
    let mut reader = Reader::new(bytes);
    let (order, count) = decode_header(&mut reader)?;

    let plausible = reader.remaining() / MIN_RECORD_SIZE;
    let count = usize::try_from(count)
        .ok()
        .filter(|&count| count <= plausible)
        .ok_or(SnapshotError::TruncatedRecord { index: plausible })?;

    let mut entries = Vec::with_capacity(count);
    for index in 0..count {
        entries.push(decode_record(&mut reader, index)?);
    }

    let extra = reader.remaining();
    if extra != 0 {
        return Err(SnapshotError::TrailingBytes { extra });
    }

    let tree = AvlTree::build(entries)?;
    tracing::debug!(records = tree.len(), ?order, "decoded snapshot");
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeError;

    fn sample() -> AvlTree<String, u64> {
        let mut tree = AvlTree::new();
        for (i, key) in ["qwe", "asd", "zxc", "rty", "fgh", "vbn", "uio"].iter().enumerate() {
            tree.insert((*key).to_string(), i as u64);
        }
        tree
    }

    fn in_order(tree: &AvlTree<String, u64>) -> Vec<(String, u64)> {
        tree.iter().map(|(k, v)| (k.clone(), *v)).collect()
    }

    #[test]
    fn test_round_trip_both_orders() {
        let tree = sample();
        for order in [TraversalOrder::PreOrder, TraversalOrder::LevelOrder] {
            let bytes = encode_snapshot(&tree, order).expect("encode");
            let restored: AvlTree<String, u64> = decode_snapshot(&bytes).expect("decode");
            assert_eq!(in_order(&restored), in_order(&tree));
            restored.check_invariants().expect("invariants");
        }
    }

    #[test]
    fn test_empty_tree_round_trip() {
        let tree: AvlTree<String, u64> = AvlTree::new();
        let bytes = encode_snapshot(&tree, TraversalOrder::LevelOrder).expect("encode");
        assert_eq!(bytes.len(), HEADER_BODY_SIZE + CHECKSUM_SIZE);
        let restored: AvlTree<String, u64> = decode_snapshot(&bytes).expect("decode");
        assert!(restored.is_empty());
    }

    #[test]
    fn test_sorted_orders_are_rejected() {
        let tree = sample();
        assert!(matches!(
            encode_snapshot(&tree, TraversalOrder::InOrder),
            Err(SnapshotError::UnsupportedOrder(TraversalOrder::InOrder))
        ));
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = encode_snapshot(&sample(), TraversalOrder::PreOrder).expect("encode");
        bytes[0] = b'X';
        assert!(matches!(
            decode_snapshot::<String, u64>(&bytes),
            Err(SnapshotError::BadMagic)
        ));
    }

    #[test]
    fn test_header_corruption_is_detected() {
        let mut bytes = encode_snapshot(&sample(), TraversalOrder::PreOrder).expect("encode");
        bytes[13] ^= 0x01; // record count
        assert!(matches!(
            decode_snapshot::<String, u64>(&bytes),
            Err(SnapshotError::HeaderChecksum { .. })
        ));
    }

    /// An empty snapshot header with a valid checksum over arbitrary fields.
    fn header(version: u32, tag: u8) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&version.to_le_bytes());
        bytes.push(tag);
        bytes.extend_from_slice(&0u64.to_le_bytes());
        let checksum = crc32fast::hash(&bytes);
        bytes.extend_from_slice(&checksum.to_le_bytes());
        bytes
    }

    #[test]
    fn test_hand_built_header_decodes() {
        let restored: AvlTree<String, u64> =
            decode_snapshot(&header(FORMAT_VERSION, ORDER_LEVEL)).expect("decode");
        assert!(restored.is_empty());
    }

    #[test]
    fn test_future_version_is_rejected() {
        assert!(matches!(
            decode_snapshot::<String, u64>(&header(2, ORDER_PRE)),
            Err(SnapshotError::UnsupportedVersion(2))
        ));
    }

    #[test]
    fn test_unknown_order_tag_is_rejected() {
        assert!(matches!(
            decode_snapshot::<String, u64>(&header(FORMAT_VERSION, 9)),
            Err(SnapshotError::UnknownOrder(9))
        ));
    }

    #[test]
    fn test_record_corruption_is_detected() {
        let mut bytes = encode_snapshot(&sample(), TraversalOrder::PreOrder).expect("encode");
        let last = bytes.len() - CHECKSUM_SIZE - 1;
        bytes[last] ^= 0xff;
        assert!(matches!(
            decode_snapshot::<String, u64>(&bytes),
            Err(SnapshotError::RecordChecksum { index: 6, .. })
        ));
    }

    #[test]
    fn test_truncated_snapshot() {
        let bytes = encode_snapshot(&sample(), TraversalOrder::PreOrder).expect("encode");
        assert!(matches!(
            decode_snapshot::<String, u64>(&bytes[..10]),
            Err(SnapshotError::TruncatedHeader)
        ));
        assert!(matches!(
            decode_snapshot::<String, u64>(&bytes[..bytes.len() - 2]),
            Err(SnapshotError::TruncatedRecord { index: 6 })
        ));
    }

    #[test]
    fn test_trailing_bytes() {
        let mut bytes = encode_snapshot(&sample(), TraversalOrder::PreOrder).expect("encode");
        bytes.extend_from_slice(&[0, 0]);
        assert!(matches!(
            decode_snapshot::<String, u64>(&bytes),
            Err(SnapshotError::TrailingBytes { extra: 2 })
        ));
    }

    #[test]
    fn test_wrong_key_type_is_a_codec_error() {
        let bytes = encode_snapshot(&sample(), TraversalOrder::PreOrder).expect("encode");
        assert!(matches!(
            decode_snapshot::<u64, u64>(&bytes),
            Err(SnapshotError::Codec { index: 0, .. })
        ));
    }

    #[test]
    fn test_duplicate_keys_are_corrupt_input() {
        // Hand-build a snapshot that repeats a key.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.push(ORDER_PRE);
        bytes.extend_from_slice(&2u64.to_le_bytes());
        let checksum = crc32fast::hash(&bytes);
        bytes.extend_from_slice(&checksum.to_le_bytes());
        for value in [1u64, 2] {
            let start = bytes.len();
            put_field(&mut bytes, b"dup", 0).expect("field");
            put_field(&mut bytes, &value.to_le_bytes(), 0).expect("field");
            let checksum = crc32fast::hash(&bytes[start..]);
            bytes.extend_from_slice(&checksum.to_le_bytes());
        }

        assert!(matches!(
            decode_snapshot::<String, u64>(&bytes),
            Err(SnapshotError::Tree(TreeError::CorruptInput { index: 1, .. }))
        ));
    }
}
