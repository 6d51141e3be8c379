//! Structural invariant checking.
//!
//! Verifies everything an [`AvlTree`] promises after a public operation:
//! search order, stored heights, the ±1 balance bound, single ownership of
//! every node, and the record count.

use std::collections::HashSet;

use crate::tree::avl::AvlTree;
use crate::tree::node::NodeId;

/// A broken structural invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// The key at this in-order position is not greater than its predecessor.
    OutOfOrder { position: usize },
    /// A node's stored height disagrees with its children.
    HeightMismatch {
        node: NodeId,
        stored: u32,
        expected: u32,
    },
    /// A node's subtree heights differ by more than one.
    Unbalanced { node: NodeId, balance_factor: i64 },
    /// A node is reachable from more than one parent.
    SharedNode { node: NodeId },
    /// A link points at a slot that holds no node.
    DanglingLink { node: NodeId },
    /// The number of reachable nodes differs from the recorded length.
    CountMismatch { reachable: usize, recorded: usize },
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfOrder { position } => {
                write!(f, "key at in-order position {position} is out of order")
            }
            Self::HeightMismatch {
                node,
                stored,
                expected,
            } => write!(f, "node {node} stores height {stored}, expected {expected}"),
            Self::Unbalanced {
                node,
                balance_factor,
            } => write!(f, "node {node} has balance factor {balance_factor}"),
            Self::SharedNode { node } => write!(f, "node {node} has more than one parent"),
            Self::DanglingLink { node } => write!(f, "link to released node {node}"),
            Self::CountMismatch {
                reachable,
                recorded,
            } => write!(f, "{reachable} nodes reachable but {recorded} recorded"),
        }
    }
}

impl std::error::Error for InvariantViolation {}

impl<K: Ord, V> AvlTree<K, V> {
    /// Check every structural invariant, reporting the first violation found.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut seen = HashSet::with_capacity(self.len());
        let mut reachable = Vec::with_capacity(self.len());
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();

        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                return Err(InvariantViolation::SharedNode { node: id });
            }
            let Some(node) = self.nodes.get(id) else {
                return Err(InvariantViolation::DanglingLink { node: id });
            };
            reachable.push(id);
            stack.extend(node.left);
            stack.extend(node.right);
        }

        if reachable.len() != self.len() {
            return Err(InvariantViolation::CountMismatch {
                reachable: reachable.len(),
                recorded: self.len(),
            });
        }

        for &id in &reachable {
            let node = &self.nodes[id];
            let expected = node
                .left
                .map(|l| self.nodes[l].height)
                .max(node.right.map(|r| self.nodes[r].height))
                .map_or(0, |h| h + 1);
            if node.height != expected {
                return Err(InvariantViolation::HeightMismatch {
                    node: id,
                    stored: node.height,
                    expected,
                });
            }

            let balance_factor = self.nodes.balance_factor(id);
            if balance_factor.abs() > 1 {
                return Err(InvariantViolation::Unbalanced {
                    node: id,
                    balance_factor,
                });
            }
        }

        let mut previous: Option<&K> = None;
        for (position, (key, _)) in self.iter().enumerate() {
            if previous.is_some_and(|p| p >= key) {
                return Err(InvariantViolation::OutOfOrder { position });
            }
            previous = Some(key);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AvlTree<i32, ()> {
        let mut tree = AvlTree::new();
        for k in [50, 30, 70, 20, 40, 60, 80] {
            tree.insert(k, ());
        }
        tree
    }

    fn root_id(tree: &AvlTree<i32, ()>) -> NodeId {
        tree.root.expect("non-empty tree")
    }

    #[test]
    fn test_valid_trees_pass() {
        assert_eq!(AvlTree::<i32, ()>::new().check_invariants(), Ok(()));
        assert_eq!(sample().check_invariants(), Ok(()));
    }

    #[test]
    fn test_detects_wrong_height() {
        let mut tree = sample();
        let root = root_id(&tree);
        tree.nodes[root].height = 5;

        assert_eq!(
            tree.check_invariants(),
            Err(InvariantViolation::HeightMismatch {
                node: root,
                stored: 5,
                expected: 2
            })
        );
    }

    #[test]
    fn test_detects_out_of_order_keys() {
        let mut tree = sample();
        let root = root_id(&tree);
        let left = tree.nodes[root].left.expect("left child");
        tree.nodes[left].key = 55;

        assert_eq!(
            tree.check_invariants(),
            Err(InvariantViolation::OutOfOrder { position: 2 })
        );
    }

    #[test]
    fn test_detects_imbalance() {
        let mut tree = AvlTree::new();
        let a = tree.nodes.alloc(1, ());
        let b = tree.nodes.alloc(2, ());
        let c = tree.nodes.alloc(3, ());
        tree.nodes[b].right = Some(c);
        tree.nodes.update_height(b);
        tree.nodes[a].right = Some(b);
        tree.nodes.update_height(a);
        tree.root = Some(a);

        assert_eq!(
            tree.check_invariants(),
            Err(InvariantViolation::Unbalanced {
                node: a,
                balance_factor: -2
            })
        );
    }

    #[test]
    fn test_detects_shared_node() {
        let mut tree = sample();
        let root = root_id(&tree);
        let left = tree.nodes[root].left.expect("left child");
        let right = tree.nodes[root].right.expect("right child");
        let stolen = tree.nodes[left].left;
        tree.nodes[right].left = stolen;

        assert!(matches!(
            tree.check_invariants(),
            Err(InvariantViolation::SharedNode { .. })
        ));
    }

    #[test]
    fn test_detects_count_mismatch() {
        let mut tree = sample();
        let root = root_id(&tree);
        let right = tree.nodes[root].right.expect("right child");
        tree.nodes[right].right = None;

        assert_eq!(
            tree.check_invariants(),
            Err(InvariantViolation::CountMismatch {
                reachable: 6,
                recorded: 7
            })
        );
    }

    #[test]
    fn test_violation_display() {
        let violation = InvariantViolation::Unbalanced {
            node: root_id(&sample()),
            balance_factor: 2,
        };
        assert!(violation.to_string().ends_with("has balance factor 2"));
    }
}
