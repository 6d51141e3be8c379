//! Rotations and the rebalancing pass shared by insertion and deletion.

use crate::tree::node::{NodeArena, NodeId, Side};

/// Descent path recorded by a mutation: each entry is an ancestor and the
/// side the descent took out of it, ordered root first.
pub type Path = Vec<(NodeId, Side)>;

/// The four imbalance shapes and the rotation that repairs each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// Right-heavy, right child not left-heavy.
    Left,
    /// Left-heavy, left child not right-heavy.
    Right,
    /// Left-heavy, left child right-heavy.
    LeftRight,
    /// Right-heavy, right child left-heavy.
    RightLeft,
}

impl<K, V> NodeArena<K, V> {
    /// Promote the right child of `id` into its place.
    ///
    /// Returns the new subtree root. A node without a right child is left
    /// untouched.
    pub fn rotate_left(&mut self, id: NodeId) -> NodeId {
        let Some(pivot) = self[id].right else {
            return id;
        };
        self[id].right = self[pivot].left;
        self[pivot].left = Some(id);
        self.update_height(id);
        self.update_height(pivot);
        pivot
    }

    /// Promote the left child of `id` into its place.
    ///
    /// Returns the new subtree root. A node without a left child is left
    /// untouched.
    pub fn rotate_right(&mut self, id: NodeId) -> NodeId {
        let Some(pivot) = self[id].left else {
            return id;
        };
        self[id].left = self[pivot].right;
        self[pivot].right = Some(id);
        self.update_height(id);
        self.update_height(pivot);
        pivot
    }

    /// Classify the imbalance at `id`, if its balance factor is out of bounds.
    ///
    /// Child heights must already be correct.
    #[must_use]
    pub fn imbalance(&self, id: NodeId) -> Option<Rotation> {
        let node = &self[id];
        match self.balance_factor(id) {
            bf if bf > 1 => {
                let left_right_heavy = node.left.is_some_and(|l| self.balance_factor(l) < 0);
                Some(if left_right_heavy {
                    Rotation::LeftRight
                } else {
                    Rotation::Right
                })
            }
            bf if bf < -1 => {
                let right_left_heavy = node.right.is_some_and(|r| self.balance_factor(r) > 0);
                Some(if right_left_heavy {
                    Rotation::RightLeft
                } else {
                    Rotation::Left
                })
            }
            _ => None,
        }
    }

    /// Refresh the height of `id` and restore its balance bound.
    ///
    /// Returns the root of the subtree that now occupies the position of `id`.
    pub fn rebalance(&mut self, id: NodeId) -> NodeId {
        self.update_height(id);

        let Some(rotation) = self.imbalance(id) else {
            return id;
        };
        tracing::trace!(node = %id, ?rotation, "rebalancing");

        match rotation {
            Rotation::Left => self.rotate_left(id),
            Rotation::Right => self.rotate_right(id),
            Rotation::LeftRight => {
                if let Some(left) = self[id].left {
                    let promoted = self.rotate_left(left);
                    self[id].left = Some(promoted);
                }
                self.rotate_right(id)
            }
            Rotation::RightLeft => {
                if let Some(right) = self[id].right {
                    let promoted = self.rotate_right(right);
                    self[id].right = Some(promoted);
                }
                self.rotate_left(id)
            }
        }
    }

    /// Unwind a mutation path back to the root.
    ///
    /// Every ancestor on the path is rebalanced bottom-up and its replacement
    /// is linked into its parent, or into `root` for the topmost entry.
    pub fn retrace(&mut self, root: &mut Option<NodeId>, mut path: Path) {
        while let Some((id, _)) = path.pop() {
            let subtree = self.rebalance(id);
            match path.last() {
                Some(&(parent, side)) => self[parent].set_child(side, Some(subtree)),
                None => *root = Some(subtree),
            }
        }
    }
}
