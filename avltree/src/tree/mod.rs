//! In-memory AVL tree.
//!
//! This module is the balancing engine: an arena-backed node store, the
//! insertion and deletion engines with their shared rotation pass, ordered
//! traversals, and reconstruction from an exported sequence.
//!
//! # Structure
//!
//! - `node`: arena of key/value records addressed by [`NodeId`]
//! - `balance`: rotations and the bottom-up rebalancing pass
//! - `avl`: search, insert, delete, update, rekey, save/load
//! - `traverse`: in-order, reverse, pre-order and level-order iterators
//! - `invariants`: structural checker used by tests and simulation
//!
//! # Usage
//!
//! ```
//! use avltree::tree::{AvlTree, TraversalOrder};
//!
//! let mut tree = AvlTree::new();
//! for key in [10, 20, 30] {
//!     tree.insert(key, key.to_string());
//! }
//!
//! // Ascending inserts trigger a single left rotation.
//! assert_eq!(tree.root(), Some((&20, &"20".to_string())));
//! assert_eq!(tree.height(), Some(1));
//!
//! let keys: Vec<_> = tree.traverse(TraversalOrder::InOrder).map(|(k, _)| *k).collect();
//! assert_eq!(keys, vec![10, 20, 30]);
//!
//! let restored = AvlTree::load(tree.save()).unwrap();
//! assert_eq!(restored.len(), 3);
//! ```

mod avl;
mod balance;
mod error;
mod invariants;
mod node;
mod traverse;

pub use avl::AvlTree;
pub use error::TreeError;
pub use invariants::InvariantViolation;
pub use node::NodeId;
pub use traverse::{Entries, NodeView, Traversal, TraversalOrder};
