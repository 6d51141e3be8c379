//! Durable snapshots of a tree.
//!
//! A snapshot stores the tree's logical export sequence (parent before
//! children) with a checksummed header and per-record CRC32 trailers. Loading
//! replays the sequence through [`AvlTree::build`](crate::tree::AvlTree::build),
//! so a snapshot is accepted whole or not at all.
//!
//! # Usage
//!
//! ```
//! use avltree::snapshot::{decode_snapshot, encode_snapshot};
//! use avltree::tree::{AvlTree, TraversalOrder};
//!
//! let mut tree = AvlTree::new();
//! tree.insert("abc".to_string(), "q1w2".to_string());
//! tree.insert("xyz".to_string(), "e3r4".to_string());
//!
//! let bytes = encode_snapshot(&tree, TraversalOrder::LevelOrder).unwrap();
//! let restored: AvlTree<String, String> = decode_snapshot(&bytes).unwrap();
//! assert_eq!(restored.find("xyz"), Ok(&"e3r4".to_string()));
//! ```

mod codec;
mod file;
mod format;

pub use codec::{CodecError, SnapshotCodec};
pub use file::{load_from_path, save_to_path};
pub use format::{FORMAT_VERSION, MAGIC, decode_snapshot, encode_snapshot};

use crate::tree::{TraversalOrder, TreeError};

/// Errors that can occur while writing or reading a snapshot.
#[derive(Debug)]
pub enum SnapshotError {
    /// File I/O error.
    Io(std::io::Error),
    /// The file does not start with the snapshot magic number.
    BadMagic,
    /// The snapshot was written by an unknown format version.
    UnsupportedVersion(u32),
    /// The header names an unknown export order.
    UnknownOrder(u8),
    /// Snapshots must list parents before children.
    UnsupportedOrder(TraversalOrder),
    /// Header checksum mismatch.
    HeaderChecksum { expected: u32, actual: u32 },
    /// Record checksum mismatch.
    RecordChecksum {
        index: usize,
        expected: u32,
        actual: u32,
    },
    /// The input ends inside the header.
    TruncatedHeader,
    /// The input ends inside a record.
    TruncatedRecord { index: usize },
    /// Bytes remain after the last record.
    TrailingBytes { extra: usize },
    /// A key or value field exceeds the u32 length prefix.
    RecordTooLarge { index: usize },
    /// A key or value could not be decoded.
    Codec { index: usize, source: CodecError },
    /// The records do not form a valid tree.
    Tree(TreeError),
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::BadMagic => write!(f, "not a tree snapshot"),
            Self::UnsupportedVersion(v) => write!(f, "unsupported snapshot version {v}"),
            Self::UnknownOrder(tag) => write!(f, "unknown export order tag {tag}"),
            Self::UnsupportedOrder(order) => {
                write!(f, "{order:?} does not list parents before children")
            }
            Self::HeaderChecksum { expected, actual } => write!(
                f,
                "header checksum mismatch: expected {expected:#010x}, got {actual:#010x}"
            ),
            Self::RecordChecksum {
                index,
                expected,
                actual,
            } => write!(
                f,
                "record {index} checksum mismatch: expected {expected:#010x}, got {actual:#010x}"
            ),
            Self::TruncatedHeader => write!(f, "snapshot header is truncated"),
            Self::TruncatedRecord { index } => write!(f, "record {index} is truncated"),
            Self::TrailingBytes { extra } => {
                write!(f, "{extra} unexpected bytes after the last record")
            }
            Self::RecordTooLarge { index } => write!(f, "record {index} is too large"),
            Self::Codec { index, source } => write!(f, "record {index}: {source}"),
            Self::Tree(e) => write!(f, "tree error: {e}"),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Codec { source, .. } => Some(source),
            Self::Tree(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TreeError> for SnapshotError {
    fn from(e: TreeError) -> Self {
        Self::Tree(e)
    }
}
