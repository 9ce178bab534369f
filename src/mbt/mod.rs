//! Merkle Binary Tree: an authenticated ordered map whose leaves are the
//! sorted `(key, value)` pairs and whose root hash fingerprints the whole
//! map.
//!
//! Mutations rebuild the level store from the leaves (total rebuild, cost
//! `O(n)`); bulk loads rebuild once at the end. Equality is root-hash
//! equality. [`MerkleBinaryTree::get_changeset`] computes the minimal
//! change-set against another tree by walking both level stores and
//! pruning hash-equal subtrees.
//!
//! ```
//! use merklemap::MerkleBinaryTree;
//!
//! let mut a = MerkleBinaryTree::new();
//! a.add_iter([2u64, 7, 12], [1u64, 2, 3]);
//! let mut b = MerkleBinaryTree::new();
//! b.add_iter([2u64, 7, 12], [1u64, 2, 9]);
//! assert_eq!(a.get_changeset(&b).len(), 1);
//! ```

mod build;
mod diff;
mod node;

use crate::addr::NodeAddr;
use crate::changeset::Change;
use crate::error::{Result, StructError};
use crate::hash::Hasher;
use crate::leaves::{Leaf, SortedLeaves};
use crate::map::AuthenticatedMap;
use crate::types::{Key, Value};

use node::TreeNode;

/// Authenticated ordered map backed by a binary Merkle tree over sorted
/// leaves.
#[derive(Clone, Debug)]
pub struct MerkleBinaryTree<K, V> {
    hasher: Hasher,
    leaves: SortedLeaves<K, V>,
    /// Root-first level store; empty for an empty map.
    levels: Vec<Vec<TreeNode<K>>>,
}

impl<K: Key, V: Value> Default for MerkleBinaryTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key, V: Value> MerkleBinaryTree<K, V> {
    /// Empty tree hashing with SHA-256.
    pub fn new() -> Self {
        Self::with_hasher(Hasher::default())
    }

    /// Empty tree hashing with a named algorithm from the selector set.
    pub fn with_hash_name(name: &str) -> Result<Self> {
        Ok(Self::with_hasher(Hasher::by_name(name)?))
    }

    /// Empty tree hashing with the given adapter.
    pub fn with_hasher(hasher: Hasher) -> Self {
        Self {
            hasher,
            leaves: SortedLeaves::new(),
            levels: Vec::new(),
        }
    }

    /// The hash adapter in use.
    pub fn hasher(&self) -> &Hasher {
        &self.hasher
    }

    /// Number of leaves.
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Synonym for [`len`](Self::len).
    pub fn size(&self) -> usize {
        self.len()
    }

    /// Root digest; empty bytes for an empty tree.
    pub fn root_hash(&self) -> &[u8] {
        self.levels
            .first()
            .and_then(|level| level.first())
            .map(|node| node.hash.as_slice())
            .unwrap_or(&[])
    }

    /// Remove every leaf and level.
    pub fn clear(&mut self) {
        self.leaves.clear();
        self.levels.clear();
    }

    /// Insert or overwrite, then rebuild.
    pub fn set(&mut self, key: K, value: V) {
        self.leaves.set(key, value);
        self.rebuild();
    }

    /// Value for `key`, or `KeyNotFound`.
    pub fn get(&self, key: &K) -> Result<&V> {
        self.leaves
            .get(key)
            .ok_or_else(|| StructError::KeyNotFound(key.to_string()))
    }

    /// Remove `key`, or fail with `KeyNotFound`; rebuilds on success.
    pub fn delete(&mut self, key: &K) -> Result<()> {
        match self.leaves.remove(key) {
            Some(_) => {
                self.rebuild();
                Ok(())
            }
            None => Err(StructError::KeyNotFound(key.to_string())),
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.leaves.contains(key)
    }

    /// Bulk load zipped keys and values; one rebuild at the end.
    pub fn add_iter<I, J>(&mut self, keys: I, values: J)
    where
        I: IntoIterator<Item = K>,
        J: IntoIterator<Item = V>,
    {
        for (key, value) in keys.into_iter().zip(values) {
            self.leaves.set(key, value);
        }
        self.rebuild();
    }

    /// Bulk load `(key, value)` pairs; iteration order is irrelevant.
    pub fn add_dict<I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in pairs {
            self.leaves.set(key, value);
        }
        self.rebuild();
    }

    /// The pair at sorted position `order`.
    pub fn get_by_order(&self, order: usize) -> Option<(&K, &V)> {
        self.leaves.get_index(order).map(|l| (&l.key, &l.value))
    }

    /// Iterate pairs in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.leaves.iter().map(|l| (&l.key, &l.value))
    }

    /// Exchange the entire state of two trees (hasher included).
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }

    /// Minimal change-set that turns `self` into `destination`.
    ///
    /// No two records concern the same key. The order is deterministic
    /// but not sorted.
    pub fn get_changeset(&self, destination: &Self) -> Vec<Change<K, V>> {
        diff::diff(self, destination)
    }

    /// Apply a change-set as instructions: `Create` inserts, `Delete`
    /// removes, `Update` overwrites. Rebuilds once. A `Delete` for an
    /// absent key stops ingestion and surfaces `KeyNotFound`; leaves
    /// already ingested remain applied and consistent.
    pub fn apply_changeset<I>(&mut self, changes: I) -> Result<()>
    where
        I: IntoIterator<Item = Change<K, V>>,
    {
        let mut failed = None;
        for change in changes {
            match change {
                Change::Create { key, value } => {
                    self.leaves.set(key, value);
                }
                Change::Update {
                    key,
                    destination_value,
                    ..
                } => {
                    self.leaves.set(key, destination_value);
                }
                Change::Delete { key, .. } => {
                    if self.leaves.remove(&key).is_none() {
                        failed = Some(StructError::KeyNotFound(key.to_string()));
                        break;
                    }
                }
            }
        }
        self.rebuild();
        match failed {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /* ------------------------------ Internals ------------------------------- */

    fn rebuild(&mut self) {
        self.levels = build::build_levels(&self.hasher, &self.leaves);
    }

    pub(crate) fn node_at(&self, addr: NodeAddr) -> Option<&TreeNode<K>> {
        self.levels.get(addr.level)?.get(addr.item)
    }

    pub(crate) fn leaf_at(&self, item: usize) -> Option<&Leaf<K, V>> {
        self.leaves.get_index(item)
    }

    /// Whether `addr` sits on the leaf-hash level.
    pub(crate) fn is_leaf_level(&self, addr: NodeAddr) -> bool {
        addr.level + 1 == self.levels.len()
    }
}

/// Equality is root-hash equality; two empty trees are equal.
impl<K: Key, V: Value> PartialEq for MerkleBinaryTree<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.root_hash() == other.root_hash()
    }
}

impl<K: Key, V: Value> Eq for MerkleBinaryTree<K, V> {}

impl<'a, K: Key, V: Value> IntoIterator for &'a MerkleBinaryTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Box<dyn Iterator<Item = (&'a K, &'a V)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl<K: Key, V: Value> AuthenticatedMap<K, V> for MerkleBinaryTree<K, V> {
    fn len(&self) -> usize {
        self.len()
    }

    fn root_hash(&self) -> &[u8] {
        self.root_hash()
    }

    fn clear(&mut self) {
        self.clear();
    }

    fn set(&mut self, key: K, value: V) {
        self.set(key, value);
    }

    fn get(&self, key: &K) -> Result<&V> {
        self.get(key)
    }

    fn delete(&mut self, key: &K) -> Result<()> {
        self.delete(key)
    }

    fn contains(&self, key: &K) -> bool {
        self.contains(key)
    }

    fn get_by_order(&self, order: usize) -> Option<(&K, &V)> {
        self.get_by_order(order)
    }

    fn swap(&mut self, other: &mut Self) {
        self.swap(other);
    }

    fn get_changeset(&self, destination: &Self) -> Vec<Change<K, V>> {
        self.get_changeset(destination)
    }

    fn apply_changeset(&mut self, changes: Vec<Change<K, V>>) -> Result<()> {
        self.apply_changeset(changes)
    }
}

/* ---------------------------------- Tests ----------------------------------- */
