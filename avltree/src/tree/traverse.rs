//! Ordered traversals over a tree.
//!
//! Depth-first orders keep an explicit stack and level order keeps a queue,
//! so no traversal recurses. Traversals borrow the tree and hold all of their
//! cursor state themselves; starting a new one never disturbs another.

use std::collections::VecDeque;
use std::iter::FusedIterator;

use crate::tree::node::{NodeArena, NodeId, Side};

/// Order in which a traversal visits records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalOrder {
    /// Ascending key order.
    InOrder,
    /// Descending key order.
    ReverseInOrder,
    /// Node, then left subtree, then right subtree.
    PreOrder,
    /// Breadth-first, left to right within a level.
    LevelOrder,
}

/// One visited node, with its position in the tree's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeView<'a, K, V> {
    pub key: &'a K,
    pub value: &'a V,
    /// Height of the subtree rooted at this node (leaf = 0).
    pub height: u32,
    /// Distance from the root (root = 0).
    pub depth: u32,
}

/// Iterator over the nodes of a tree in a given [`TraversalOrder`].
#[derive(Debug)]
pub struct Traversal<'a, K, V> {
    nodes: &'a NodeArena<K, V>,
    order: TraversalOrder,
    /// Stack for depth-first orders, queue for level order.
    pending: VecDeque<(NodeId, u32)>,
    /// Subtree still to be descended by the in-order variants.
    cursor: Option<(NodeId, u32)>,
}

impl<'a, K, V> Traversal<'a, K, V> {
    pub(crate) fn new(
        nodes: &'a NodeArena<K, V>,
        root: Option<NodeId>,
        order: TraversalOrder,
    ) -> Self {
        let start = root.map(|id| (id, 0));
        let (pending, cursor) = match order {
            TraversalOrder::InOrder | TraversalOrder::ReverseInOrder => (VecDeque::new(), start),
            TraversalOrder::PreOrder | TraversalOrder::LevelOrder => {
                (start.into_iter().collect(), None)
            }
        };
        Self {
            nodes,
            order,
            pending,
            cursor,
        }
    }

    /// The order this traversal follows.
    #[must_use]
    pub const fn order(&self) -> TraversalOrder {
        self.order
    }

    fn view(&self, id: NodeId, depth: u32) -> NodeView<'a, K, V> {
        let nodes = self.nodes;
        let node = &nodes[id];
        NodeView {
            key: &node.key,
            value: &node.value,
            height: node.height,
            depth,
        }
    }

    fn child(&self, id: NodeId, depth: u32, side: Side) -> Option<(NodeId, u32)> {
        self.nodes[id].child(side).map(|child| (child, depth + 1))
    }

    fn next_sorted(&mut self, first: Side, then: Side) -> Option<(NodeId, u32)> {
        while let Some((id, depth)) = self.cursor {
            self.pending.push_back((id, depth));
            self.cursor = self.child(id, depth, first);
        }
        let (id, depth) = self.pending.pop_back()?;
        self.cursor = self.child(id, depth, then);
        Some((id, depth))
    }

    fn next_pre_order(&mut self) -> Option<(NodeId, u32)> {
        let (id, depth) = self.pending.pop_back()?;
        let (left, right) = (self.child(id, depth, Side::Left), self.child(id, depth, Side::Right));
        self.pending.extend(right);
        self.pending.extend(left);
        Some((id, depth))
    }

    fn next_level_order(&mut self) -> Option<(NodeId, u32)> {
        let (id, depth) = self.pending.pop_front()?;
        let (left, right) = (self.child(id, depth, Side::Left), self.child(id, depth, Side::Right));
        self.pending.extend(left);
        self.pending.extend(right);
        Some((id, depth))
    }
}

impl<'a, K, V> Iterator for Traversal<'a, K, V> {
    type Item = NodeView<'a, K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = match self.order {
            TraversalOrder::InOrder => self.next_sorted(Side::Left, Side::Right),
            TraversalOrder::ReverseInOrder => self.next_sorted(Side::Right, Side::Left),
            TraversalOrder::PreOrder => self.next_pre_order(),
            TraversalOrder::LevelOrder => self.next_level_order(),
        }?;
        Some(self.view(id, depth))
    }
}

impl<K, V> FusedIterator for Traversal<'_, K, V> {}

/// Iterator over `(key, value)` pairs in a given [`TraversalOrder`].
#[derive(Debug)]
pub struct Entries<'a, K, V> {
    inner: Traversal<'a, K, V>,
}

impl<'a, K, V> Entries<'a, K, V> {
    pub(crate) const fn new(inner: Traversal<'a, K, V>) -> Self {
        Self { inner }
    }
}

impl<'a, K, V> Iterator for Entries<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|view| (view.key, view.value))
    }
}

impl<K, V> FusedIterator for Entries<'_, K, V> {}
