//! Arena-backed node store.
//!
//! Every node of a tree lives in a single [`NodeArena`] and refers to its
//! children by [`NodeId`] instead of by pointer. A node is reachable from at
//! most one parent slot, so the arena holds no cycles and dropping the arena
//! tears the whole tree down at once.
//!
//! # Height convention
//!
//! A leaf has height 0. An absent child counts as height -1, which is only
//! ever observed through the signed helpers [`NodeArena::height_of`] and
//! [`NodeArena::balance_factor`].

use std::ops::{Index, IndexMut};

/// Stable index of a node inside a [`NodeArena`].
///
/// Ids of released nodes are recycled by later allocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which child link of a node a descent followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// A single key/value record with its child links and subtree height.
#[derive(Debug)]
pub struct Node<K, V> {
    pub key: K,
    pub value: V,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    /// Height of the subtree rooted here (leaf = 0).
    pub height: u32,
}

impl<K, V> Node<K, V> {
    const fn leaf(key: K, value: V) -> Self {
        Self {
            key,
            value,
            left: None,
            right: None,
            height: 0,
        }
    }

    /// The child on the given side.
    #[must_use]
    pub const fn child(&self, side: Side) -> Option<NodeId> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    /// Replace the child on the given side.
    pub const fn set_child(&mut self, side: Side, child: Option<NodeId>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }
}

/// Slot storage for tree nodes.
#[derive(Debug)]
pub struct NodeArena<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    /// Vacant slots available for reuse.
    free: Vec<NodeId>,
    live: usize,
}

impl<K, V> Default for NodeArena<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> NodeArena<K, V> {
    /// Create an empty arena.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Number of live nodes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.live
    }

    /// Whether the arena holds no live nodes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Allocate a new leaf node and return its id.
    ///
    /// # Panics
    ///
    /// Panics if the arena would need more than `u32::MAX` slots.
    pub fn alloc(&mut self, key: K, value: V) -> NodeId {
        let node = Node::leaf(key, value);
        self.live += 1;

        if let Some(id) = self.free.pop() {
            self.slots[id.index()] = Some(node);
            return id;
        }

        let Ok(raw) = u32::try_from(self.slots.len()) else {
            panic!("node arena exceeded {} slots", u32::MAX);
        };
        self.slots.push(Some(node));
        NodeId(raw)
    }

    /// Remove a node from the arena, handing its contents back.
    ///
    /// The caller must already have unlinked the node from its parent.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not refer to a live node.
    pub fn release(&mut self, id: NodeId) -> Node<K, V> {
        let Some(node) = self.slots[id.index()].take() else {
            panic!("node {id} released twice");
        };
        self.live -= 1;
        self.free.push(id);
        node
    }

    /// Look up a node without panicking.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node<K, V>> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    /// Drop every node.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.live = 0;
    }

    /// Height of an optional subtree, -1 when absent.
    #[must_use]
    pub fn height_of(&self, id: Option<NodeId>) -> i64 {
        id.map_or(-1, |id| i64::from(self[id].height))
    }

    /// Recompute a node's height from its children.
    pub fn update_height(&mut self, id: NodeId) {
        let node = &self[id];
        let tallest = node
            .left
            .map(|l| self[l].height)
            .max(node.right.map(|r| self[r].height));
        self[id].height = tallest.map_or(0, |h| h + 1);
    }

    /// Left height minus right height; positive means left-heavy.
    #[must_use]
    pub fn balance_factor(&self, id: NodeId) -> i64 {
        let node = &self[id];
        self.height_of(node.left) - self.height_of(node.right)
    }
}

impl<K, V> Index<NodeId> for NodeArena<K, V> {
    type Output = Node<K, V>;

    fn index(&self, id: NodeId) -> &Self::Output {
        match self.slots.get(id.index()) {
            Some(Some(node)) => node,
            _ => panic!("node {id} is not live"),
        }
    }
}

impl<K, V> IndexMut<NodeId> for NodeArena<K, V> {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        match self.slots.get_mut(id.index()) {
            Some(Some(node)) => node,
            _ => panic!("node {id} is not live"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_creates_leaf() {
        let mut arena = NodeArena::new();
        let id = arena.alloc(7, "seven");

        let node = &arena[id];
        assert_eq!(node.key, 7);
        assert_eq!(node.value, "seven");
        assert_eq!((node.left, node.right), (None, None));
        assert_eq!(node.height, 0);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_release_recycles_slot() {
        let mut arena = NodeArena::new();
        let a = arena.alloc(1, ());
        let _b = arena.alloc(2, ());

        let released = arena.release(a);
        assert_eq!(released.key, 1);
        assert_eq!(arena.len(), 1);
        assert!(arena.get(a).is_none());

        let c = arena.alloc(3, ());
        assert_eq!(c, a, "freed slot should be reused");
        assert_eq!(arena[c].key, 3);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    #[should_panic(expected = "released twice")]
    fn test_double_release_panics() {
        let mut arena = NodeArena::new();
        let a = arena.alloc(1, ());
        arena.release(a);
        arena.release(a);
    }

    #[test]
    fn test_heights_and_balance_factor() {
        let mut arena = NodeArena::new();
        let root = arena.alloc(2, ());
        let left = arena.alloc(1, ());
        let left_left = arena.alloc(0, ());

        arena[left].set_child(Side::Left, Some(left_left));
        arena.update_height(left);
        arena[root].set_child(Side::Left, Some(left));
        arena.update_height(root);

        assert_eq!(arena.height_of(None), -1);
        assert_eq!(arena[left].height, 1);
        assert_eq!(arena[root].height, 2);
        assert_eq!(arena.balance_factor(root), 2);
        assert_eq!(arena.balance_factor(left), 1);
        assert_eq!(arena.balance_factor(left_left), 0);
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut arena = NodeArena::new();
        let a = arena.alloc("a", 1);
        arena.alloc("b", 2);
        arena.clear();

        assert!(arena.is_empty());
        assert!(arena.get(a).is_none());
    }
}
