//! Height-balanced binary search tree.
//!
//! [`AvlTree`] maps unique, totally ordered keys to values. After every
//! public operation returns:
//! - keys are in binary search order,
//! - every node's stored height is `1 + max(height(left), height(right))`,
//! - the two subtree heights of every node differ by at most one.
//!
//! Search, insertion and deletion are iterative; mutations record their
//! descent path on an explicit stack and hand it to the shared rebalancing
//! pass in [`balance`](super::balance).

use std::borrow::Borrow;
use std::cmp::Ordering;

use crate::tree::balance::Path;
use crate::tree::error::TreeError;
use crate::tree::node::{NodeArena, NodeId, Side};
use crate::tree::traverse::{Entries, Traversal, TraversalOrder};

/// An AVL tree owning its nodes through an arena.
#[derive(Debug)]
pub struct AvlTree<K, V> {
    pub(crate) nodes: NodeArena<K, V>,
    pub(crate) root: Option<NodeId>,
}

impl<K, V> Default for AvlTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> AvlTree<K, V> {
    /// Create an empty tree.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: NodeArena::new(),
            root: None,
        }
    }

    /// Number of stored records.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds no records.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Height of the tree, `None` when empty. A single node has height 0.
    #[must_use]
    pub fn height(&self) -> Option<u32> {
        self.root.map(|root| self.nodes[root].height)
    }

    /// Key and value stored at the root.
    #[must_use]
    pub fn root(&self) -> Option<(&K, &V)> {
        self.root.map(|root| {
            let node = &self.nodes[root];
            (&node.key, &node.value)
        })
    }

    /// Remove every record.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Entry with the smallest key.
    #[must_use]
    pub fn first(&self) -> Option<(&K, &V)> {
        self.extreme(Side::Left)
    }

    /// Entry with the largest key.
    #[must_use]
    pub fn last(&self) -> Option<(&K, &V)> {
        self.extreme(Side::Right)
    }

    fn extreme(&self, side: Side) -> Option<(&K, &V)> {
        let mut current = self.root?;
        while let Some(next) = self.nodes[current].child(side) {
            current = next;
        }
        let node = &self.nodes[current];
        Some((&node.key, &node.value))
    }

    /// Iterate the records in the given order.
    ///
    /// Each call starts an independent traversal.
    #[must_use]
    pub fn traverse(&self, order: TraversalOrder) -> Entries<'_, K, V> {
        Entries::new(self.walk(order))
    }

    /// Iterate the records in the given order along with their height and
    /// depth, for consumers that need the tree's shape.
    #[must_use]
    pub fn walk(&self, order: TraversalOrder) -> Traversal<'_, K, V> {
        Traversal::new(&self.nodes, self.root, order)
    }

    /// Iterate the records in ascending key order.
    #[must_use]
    pub fn iter(&self) -> Entries<'_, K, V> {
        self.traverse(TraversalOrder::InOrder)
    }

    /// Export the tree as a parent-before-children sequence suitable for
    /// [`AvlTree::load`].
    #[must_use]
    pub fn save(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.traverse(TraversalOrder::LevelOrder)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl<K: Ord, V> AvlTree<K, V> {
    /// Rebuild a tree by replaying `entries` through [`AvlTree::insert`].
    ///
    /// Replaying keeps every invariant regardless of the input order, so
    /// hand-edited or reordered exports are still accepted. A repeated key is
    /// rejected with [`TreeError::CorruptInput`] and no tree is produced.
    pub fn build<I>(entries: I) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut tree = Self::new();
        for (index, (key, value)) in entries.into_iter().enumerate() {
            if tree.insert(key, value).is_some() {
                return Err(TreeError::CorruptInput {
                    index,
                    reason: "duplicate key",
                });
            }
        }
        tracing::debug!(records = tree.len(), height = ?tree.height(), "rebuilt tree");
        Ok(tree)
    }

    /// Reconstruct a tree from a [`AvlTree::save`] export.
    pub fn load<I>(entries: I) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Self::build(entries)
    }

    /// Locate the node holding `key`.
    fn locate<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cursor = self.root;
        while let Some(id) = cursor {
            let node = &self.nodes[id];
            cursor = match key.cmp(node.key.borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(id),
            };
        }
        None
    }

    /// Look up the value stored under `key`.
    pub fn find<Q>(&self, key: &Q) -> Result<&V, TreeError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).ok_or(TreeError::NotFound)
    }

    /// Look up the value stored under `key`, `None` when absent.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.locate(key).map(|id| &self.nodes[id].value)
    }

    /// Mutable access to the value stored under `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.locate(key).map(|id| &mut self.nodes[id].value)
    }

    /// Whether `key` is stored.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.locate(key).is_some()
    }

    /// Left height minus right height of the node holding `key`.
    pub fn balance_factor<Q>(&self, key: &Q) -> Result<i64, TreeError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.locate(key)
            .map(|id| self.nodes.balance_factor(id))
            .ok_or(TreeError::NotFound)
    }

    /// Insert a record, or overwrite the value of an existing key in place.
    ///
    /// Returns the previous value when the key was already present; the
    /// structure is untouched in that case.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let mut path: Path = Vec::new();
        let mut cursor = self.root;

        while let Some(id) = cursor {
            let node = &mut self.nodes[id];
            let side = match key.cmp(&node.key) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return Some(std::mem::replace(&mut node.value, value)),
            };
            cursor = node.child(side);
            path.push((id, side));
        }

        let leaf = self.nodes.alloc(key, value);
        match path.last() {
            Some(&(parent, side)) => self.nodes[parent].set_child(side, Some(leaf)),
            None => self.root = Some(leaf),
        }
        self.nodes.retrace(&mut self.root, path);
        None
    }

    /// Overwrite the value of an existing key, returning the old value.
    ///
    /// Unlike [`AvlTree::insert`], an absent key is an error.
    pub fn update<Q>(&mut self, key: &Q, value: V) -> Result<V, TreeError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_mut(key)
            .map(|slot| std::mem::replace(slot, value))
            .ok_or(TreeError::NotFound)
    }

    /// Remove the record stored under `key` and return its value.
    pub fn delete<Q>(&mut self, key: &Q) -> Result<V, TreeError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove_entry(key)
            .map(|(_, value)| value)
            .ok_or(TreeError::NotFound)
    }

    /// Remove the record stored under `key`, returning both key and value.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut path: Path = Vec::new();
        let mut cursor = self.root;

        let target = loop {
            let id = cursor?;
            let node = &self.nodes[id];
            let side = match key.cmp(node.key.borrow()) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => break id,
            };
            cursor = node.child(side);
            path.push((id, side));
        };

        let removed = match (self.nodes[target].left, self.nodes[target].right) {
            (Some(_), Some(right)) => {
                // Two children: pull the in-order successor out of the right
                // subtree and move its record into the target's slot.
                path.push((target, Side::Right));
                let mut successor = right;
                while let Some(next) = self.nodes[successor].left {
                    path.push((successor, Side::Left));
                    successor = next;
                }
                let replacement = self.nodes[successor].right;
                self.link(&path, replacement);

                let moved = self.nodes.release(successor);
                let slot = &mut self.nodes[target];
                let key = std::mem::replace(&mut slot.key, moved.key);
                let value = std::mem::replace(&mut slot.value, moved.value);
                (key, value)
            }
            (left, right) => {
                self.link(&path, left.or(right));
                let node = self.nodes.release(target);
                (node.key, node.value)
            }
        };

        self.nodes.retrace(&mut self.root, path);
        Some(removed)
    }

    /// Point the last link on `path` (or the root) at `child`.
    fn link(&mut self, path: &[(NodeId, Side)], child: Option<NodeId>) {
        match path.last() {
            Some(&(parent, side)) => self.nodes[parent].set_child(side, child),
            None => self.root = child,
        }
    }

    /// Move the record stored under `from` to the key `to`.
    ///
    /// Fails with [`TreeError::NotFound`] when `from` is absent and with
    /// [`TreeError::KeyExists`] when `to` already holds a different record;
    /// the tree is unchanged on failure.
    pub fn rekey<Q>(&mut self, from: &Q, to: K) -> Result<(), TreeError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if !self.contains_key(from) {
            return Err(TreeError::NotFound);
        }
        let target: &Q = to.borrow();
        if target == from {
            return Ok(());
        }
        if self.contains_key(target) {
            return Err(TreeError::KeyExists);
        }

        let (_, value) = self.remove_entry(from).ok_or(TreeError::NotFound)?;
        self.insert(to, value);
        Ok(())
    }
}

impl<'a, K, V> IntoIterator for &'a AvlTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Entries<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.traverse(TraversalOrder::InOrder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys<K: Clone, V>(tree: &AvlTree<K, V>, order: TraversalOrder) -> Vec<K> {
        tree.traverse(order).map(|(k, _)| k.clone()).collect()
    }

    fn tree_of(keys: &[i32]) -> AvlTree<i32, i32> {
        let mut tree = AvlTree::new();
        for &k in keys {
            tree.insert(k, k * 10);
        }
        tree
    }

    #[test]
    fn test_empty_tree() {
        let tree: AvlTree<i32, i32> = AvlTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.height(), None);
        assert_eq!(tree.root(), None);
        assert_eq!(tree.first(), None);
        assert_eq!(tree.find(&1), Err(TreeError::NotFound));
    }

    #[test]
    fn test_ascending_inserts_rotate_left() {
        let tree = tree_of(&[10, 20, 30]);

        assert_eq!(tree.root(), Some((&20, &200)));
        assert_eq!(keys(&tree, TraversalOrder::PreOrder), vec![20, 10, 30]);
        assert_eq!(tree.height(), Some(1));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_delete_root_promotes_successor() {
        let mut tree = tree_of(&[10, 20, 30]);

        assert_eq!(tree.delete(&20), Ok(200));
        assert_eq!(tree.root(), Some((&30, &300)));
        assert_eq!(keys(&tree, TraversalOrder::PreOrder), vec![30, 10]);
        assert_eq!(tree.height(), Some(1));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_insert_existing_key_updates_in_place() {
        let mut tree = tree_of(&[1, 2, 3]);
        let before = keys(&tree, TraversalOrder::LevelOrder);

        assert_eq!(tree.insert(2, 99), Some(20));
        assert_eq!(tree.find(&2), Ok(&99));
        assert_eq!(tree.len(), 3);
        assert_eq!(keys(&tree, TraversalOrder::LevelOrder), before);
    }

    #[test]
    fn test_find_and_contains() {
        let tree = tree_of(&[5, 3, 8, 1, 4]);
        assert_eq!(tree.find(&4), Ok(&40));
        assert_eq!(tree.get(&8), Some(&80));
        assert!(tree.contains_key(&1));
        assert!(!tree.contains_key(&2));
        assert_eq!(tree.find(&2), Err(TreeError::NotFound));
    }

    #[test]
    fn test_borrowed_lookup() {
        let mut tree = AvlTree::new();
        tree.insert("abc".to_string(), 1);
        tree.insert("xyz".to_string(), 2);

        assert_eq!(tree.find("xyz"), Ok(&2));
        assert_eq!(tree.delete("abc"), Ok(1));
        assert!(!tree.contains_key("abc"));
    }

    #[test]
    fn test_delete_missing_key_leaves_tree_unchanged() {
        let mut tree = tree_of(&[4, 2, 6, 1, 3, 5, 7]);
        let before: Vec<_> = tree
            .walk(TraversalOrder::LevelOrder)
            .map(|n| (*n.key, n.height))
            .collect();

        assert_eq!(tree.delete(&42), Err(TreeError::NotFound));

        let after: Vec<_> = tree
            .walk(TraversalOrder::LevelOrder)
            .map(|n| (*n.key, n.height))
            .collect();
        assert_eq!(before, after);
        assert_eq!(tree.len(), 7);
    }

    #[test]
    fn test_delete_leaf_and_single_child() {
        let mut tree = tree_of(&[20, 10, 30, 25]);

        // 30 has only a left child, which is spliced into its place.
        assert_eq!(tree.delete(&30), Ok(300));
        assert_eq!(keys(&tree, TraversalOrder::PreOrder), vec![20, 10, 25]);
        tree.check_invariants().expect("invariants after single-child delete");

        // 10 is a leaf.
        assert_eq!(tree.delete(&10), Ok(100));
        assert_eq!(keys(&tree, TraversalOrder::PreOrder), vec![20, 25]);
        tree.check_invariants().expect("invariants after leaf delete");
    }

    #[test]
    fn test_delete_rebalances_ancestors() {
        // Deleting from the short side forces a rotation at the root.
        let mut tree = tree_of(&[20, 10, 30, 40]);
        assert_eq!(tree.delete(&10), Ok(100));

        assert_eq!(tree.root(), Some((&30, &300)));
        assert_eq!(keys(&tree, TraversalOrder::PreOrder), vec![30, 20, 40]);
        tree.check_invariants().expect("invariants");
    }

    #[test]
    fn test_delete_everything() {
        let mut tree = tree_of(&(0..64).collect::<Vec<_>>());
        for k in (0..64).rev().step_by(3) {
            assert_eq!(tree.delete(&k), Ok(k * 10));
            tree.check_invariants().expect("invariants");
        }
        let rest: Vec<i32> = keys(&tree, TraversalOrder::InOrder);
        for k in rest {
            assert!(tree.delete(&k).is_ok());
        }
        assert!(tree.is_empty());
        assert_eq!(tree.height(), None);
    }

    #[test]
    fn test_height_is_logarithmic() {
        let tree = tree_of(&(0..1023).collect::<Vec<_>>());
        // Sequential inserts into an AVL tree yield a perfect tree here.
        assert_eq!(tree.height(), Some(9));
        tree.check_invariants().expect("invariants");
    }

    #[test]
    fn test_first_and_last() {
        let tree = tree_of(&[50, 20, 80, 10, 90]);
        assert_eq!(tree.first(), Some((&10, &100)));
        assert_eq!(tree.last(), Some((&90, &900)));
    }

    #[test]
    fn test_update_requires_existing_key() {
        let mut tree = tree_of(&[1, 2]);
        assert_eq!(tree.update(&1, 7), Ok(10));
        assert_eq!(tree.find(&1), Ok(&7));
        assert_eq!(tree.update(&3, 7), Err(TreeError::NotFound));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_rekey_moves_value() {
        let mut tree = tree_of(&[1, 2, 3]);
        assert_eq!(tree.rekey(&2, 10), Ok(()));
        assert!(!tree.contains_key(&2));
        assert_eq!(tree.find(&10), Ok(&20));
        assert_eq!(keys(&tree, TraversalOrder::InOrder), vec![1, 3, 10]);
        tree.check_invariants().expect("invariants");
    }

    #[test]
    fn test_rekey_failures_leave_tree_unchanged() {
        let mut tree = tree_of(&[1, 2, 3]);
        assert_eq!(tree.rekey(&9, 10), Err(TreeError::NotFound));
        assert_eq!(tree.rekey(&1, 3), Err(TreeError::KeyExists));
        assert_eq!(tree.rekey(&1, 1), Ok(()));
        assert_eq!(keys(&tree, TraversalOrder::InOrder), vec![1, 2, 3]);
        assert_eq!(tree.find(&1), Ok(&10));
    }

    #[test]
    fn test_balance_factor_by_key() {
        let mut tree = tree_of(&[2, 1, 3]);
        tree.insert(0, 0);
        assert_eq!(tree.balance_factor(&2), Ok(1));
        assert_eq!(tree.balance_factor(&1), Ok(1));
        assert_eq!(tree.balance_factor(&3), Ok(0));
        assert_eq!(tree.balance_factor(&7), Err(TreeError::NotFound));
    }

    #[test]
    fn test_save_load_round_trip() {
        let tree = tree_of(&[8, 3, 10, 1, 6, 14, 4, 7, 13]);
        let exported = tree.save();

        let restored = AvlTree::load(exported).expect("load");
        assert_eq!(
            keys(&restored, TraversalOrder::InOrder),
            keys(&tree, TraversalOrder::InOrder)
        );
        assert_eq!(restored.find(&13), Ok(&130));
        restored.check_invariants().expect("invariants");
    }

    #[test]
    fn test_level_order_export_reproduces_shape() {
        let tree = tree_of(&(1..=31).collect::<Vec<_>>());
        let restored = AvlTree::load(tree.save()).expect("load");
        assert_eq!(
            keys(&restored, TraversalOrder::PreOrder),
            keys(&tree, TraversalOrder::PreOrder)
        );
    }

    #[test]
    fn test_build_balances_sorted_input() {
        let sorted: Vec<(u32, ())> = (0..100).map(|k| (k, ())).collect();
        let tree = AvlTree::build(sorted).expect("build");
        tree.check_invariants().expect("invariants");
        assert!(tree.height() <= Some(7));
    }

    #[test]
    fn test_build_rejects_duplicate_keys() {
        let entries = vec![(1, "a"), (2, "b"), (1, "c")];
        assert_eq!(
            AvlTree::build(entries).map(|t| t.len()),
            Err(TreeError::CorruptInput {
                index: 2,
                reason: "duplicate key"
            })
        );
    }

    #[test]
    fn test_into_iterator_is_sorted() {
        let tree = tree_of(&[9, 4, 7, 1]);
        let collected: Vec<i32> = (&tree).into_iter().map(|(k, _)| *k).collect();
        assert_eq!(collected, vec![1, 4, 7, 9]);
    }

    #[test]
    fn test_clear() {
        let mut tree = tree_of(&[1, 2, 3]);
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.find(&1), Err(TreeError::NotFound));
        tree.insert(5, 50);
        assert_eq!(tree.root(), Some((&5, &50)));
    }
}
