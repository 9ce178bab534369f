//! Merkle Hash Grid: an authenticated ordered map whose sorted leaves are
//! arranged row-major in a square grid. One Merkle tree summarizes the
//! rows and one the columns; the master hash commits to both roots, and a
//! divergence localizes to the intersection of the two trees'
//! inconsistency sets.
//!
//! The grid side is `⌈√n⌉`. Single-key mutations recompute only the
//! affected row/column digests when the side is unchanged; bulk loads
//! rebuild once at the end.

pub(crate) mod build;
mod diff;

use crate::changeset::Change;
use crate::error::{Result, StructError};
use crate::hash::{Digest, Hasher};
use crate::leaves::{Leaf, SetOutcome, SortedLeaves};
use crate::map::AuthenticatedMap;
use crate::types::{Key, Value};

/// Authenticated ordered map backed by row and column Merkle trees over a
/// square grid of sorted leaves.
#[derive(Clone, Debug)]
pub struct MerkleHashGrid<K, V> {
    hasher: Hasher,
    leaves: SortedLeaves<K, V>,
    /// One value digest per leaf, index-aligned with `leaves`.
    leaf_hashes: Vec<Digest>,
    /// Cached per-row digests (leaf level of `row_tree`).
    row_digests: Vec<Digest>,
    /// Cached per-column digests (leaf level of `column_tree`).
    col_digests: Vec<Digest>,
    /// Root-first folded row tree.
    row_tree: Vec<Vec<Digest>>,
    /// Root-first folded column tree.
    column_tree: Vec<Vec<Digest>>,
    grid_side: usize,
    /// `H(row_root || column_root)`; empty bytes for an empty grid.
    master_hash: Digest,
}

impl<K: Key, V: Value> Default for MerkleHashGrid<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key, V: Value> MerkleHashGrid<K, V> {
    /// Empty grid hashing with SHA-256.
    pub fn new() -> Self {
        Self::with_hasher(Hasher::default())
    }

    /// Empty grid hashing with a named algorithm from the selector set.
    pub fn with_hash_name(name: &str) -> Result<Self> {
        Ok(Self::with_hasher(Hasher::by_name(name)?))
    }

    /// Empty grid hashing with the given adapter.
    pub fn with_hasher(hasher: Hasher) -> Self {
        Self {
            hasher,
            leaves: SortedLeaves::new(),
            leaf_hashes: Vec::new(),
            row_digests: Vec::new(),
            col_digests: Vec::new(),
            row_tree: Vec::new(),
            column_tree: Vec::new(),
            grid_side: 0,
            master_hash: Digest::new(),
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

    /// Current grid side, `⌈√n⌉`.
    pub fn grid_side(&self) -> usize {
        self.grid_side
    }

    /// Master digest; empty bytes for an empty grid.
    pub fn root_hash(&self) -> &[u8] {
        &self.master_hash
    }

    /// Remove every leaf and both trees.
    pub fn clear(&mut self) {
        self.leaves.clear();
        self.leaf_hashes.clear();
        self.row_digests.clear();
        self.col_digests.clear();
        self.row_tree.clear();
        self.column_tree.clear();
        self.grid_side = 0;
        self.master_hash.clear();
    }

    /// Insert or overwrite, then refresh the affected digests.
    pub fn set(&mut self, key: K, value: V) {
        let index = self.ingest(key, value);
        build::rebuild(self, Some(&[index]));
    }

    /// Value for `key`, or `KeyNotFound`.
    pub fn get(&self, key: &K) -> Result<&V> {
        self.leaves
            .get(key)
            .ok_or_else(|| StructError::KeyNotFound(key.to_string()))
    }

    /// Remove `key`, or fail with `KeyNotFound`.
    pub fn delete(&mut self, key: &K) -> Result<()> {
        match self.leaves.remove(key) {
            Some((index, _)) => {
                self.leaf_hashes.remove(index);
                build::rebuild(self, Some(&[index]));
                Ok(())
            }
            None => Err(StructError::KeyNotFound(key.to_string())),
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.leaves.contains(key)
    }

    /// Bulk load zipped keys and values; one full rebuild at the end.
    pub fn add_iter<I, J>(&mut self, keys: I, values: J)
    where
        I: IntoIterator<Item = K>,
        J: IntoIterator<Item = V>,
    {
        for (key, value) in keys.into_iter().zip(values) {
            self.ingest(key, value);
        }
        build::rebuild(self, None);
    }

    /// Bulk load `(key, value)` pairs; iteration order is irrelevant.
    pub fn add_dict<I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in pairs {
            self.ingest(key, value);
        }
        build::rebuild(self, None);
    }

    /// The pair at sorted position `order`.
    pub fn get_by_order(&self, order: usize) -> Option<(&K, &V)> {
        self.leaves.get_index(order).map(|l| (&l.key, &l.value))
    }

    /// Iterate pairs in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.leaves.iter().map(|l| (&l.key, &l.value))
    }

    /// Exchange the entire state of two grids (hasher included).
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }

    /// Minimal change-set that turns `self` into `destination`.
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
                    self.ingest(key, value);
                }
                Change::Update {
                    key,
                    destination_value,
                    ..
                } => {
                    self.ingest(key, destination_value);
                }
                Change::Delete { key, .. } => match self.leaves.remove(&key) {
                    Some((index, _)) => {
                        self.leaf_hashes.remove(index);
                    }
                    None => {
                        failed = Some(StructError::KeyNotFound(key.to_string()));
                        break;
                    }
                },
            }
        }
        build::rebuild(self, None);
        match failed {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /* ------------------------------ Internals ------------------------------- */

    /// Insert/overwrite a leaf and its cached value digest. Returns the
    /// leaf index.
    fn ingest(&mut self, key: K, value: V) -> usize {
        let digest = self.hasher.digest(&value.encode());
        match self.leaves.set(key, value) {
            SetOutcome::Inserted(index) => {
                self.leaf_hashes.insert(index, digest);
                index
            }
            SetOutcome::Replaced(index) => {
                self.leaf_hashes[index] = digest;
                index
            }
        }
    }

    /// Leaf and cached digest at grid index `i`, when in range.
    pub(crate) fn entry(&self, i: usize) -> Option<(&Leaf<K, V>, &Digest)> {
        let leaf = self.leaves.get_index(i)?;
        Some((leaf, &self.leaf_hashes[i]))
    }
}

/// Equality is master-hash equality; two empty grids are equal.
impl<K: Key, V: Value> PartialEq for MerkleHashGrid<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.master_hash == other.master_hash
    }
}

impl<K: Key, V: Value> Eq for MerkleHashGrid<K, V> {}

impl<'a, K: Key, V: Value> IntoIterator for &'a MerkleHashGrid<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Box<dyn Iterator<Item = (&'a K, &'a V)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl<K: Key, V: Value> AuthenticatedMap<K, V> for MerkleHashGrid<K, V> {
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
