//! Typed outcomes for tree operations.

/// Errors returned by [`AvlTree`](super::AvlTree) operations.
///
/// A failed operation never leaves the tree partially modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The requested key is not stored in the tree.
    NotFound,
    /// The target key of a rekey is already taken by another record.
    KeyExists,
    /// A reconstruction sequence was rejected.
    CorruptInput {
        /// Position of the offending entry in the input sequence.
        index: usize,
        /// What was wrong with it.
        reason: &'static str,
    },
}

impl std::fmt::Display for TreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::KeyExists => write!(f, "key already exists"),
            Self::CorruptInput { index, reason } => {
                write!(f, "corrupt input at entry {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for TreeError {}
