//! Bottom-up MBT construction.
//!
//! `build_levels` is total: it recomputes every level from the current
//! leaves. The leaf level digests each leaf's encoded value; upper levels
//! fold pairs until one node remains. For an odd-width level the trailing
//! node is **promoted unchanged** one level up: same hash, same metadata,
//! never a duplicated digest.
//!
//! Levels are returned root-first: `levels[0]` is the root level,
//! `levels[len - 1]` the leaf-hash level.

use crate::hash::{Digest, Hasher};
use crate::leaves::SortedLeaves;
use crate::types::{Key, Value};

use super::node::TreeNode;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Hash the current leaves into the leaf-hash level.
fn leaf_level<K: Key, V: Value>(
    hasher: &Hasher,
    leaves: &SortedLeaves<K, V>,
) -> Vec<TreeNode<K>> {
    // Encode serially (values stay untouched), digest the plain byte
    // buffers, in parallel when the feature is on.
    let encoded: Vec<Vec<u8>> = leaves.iter().map(|leaf| leaf.value.encode()).collect();

    #[cfg(feature = "rayon")]
    let digests: Vec<Digest> = encoded.par_iter().map(|bytes| hasher.digest(bytes)).collect();

    #[cfg(not(feature = "rayon"))]
    let digests: Vec<Digest> = encoded.iter().map(|bytes| hasher.digest(bytes)).collect();

    leaves
        .iter()
        .zip(digests)
        .map(|(leaf, hash)| TreeNode {
            hash,
            size: 1,
            min_key: leaf.key.clone(),
            max_key: leaf.key.clone(),
            max_left_child: leaf.key.clone(),
            avg: leaf.key.clone(),
        })
        .collect()
}

/// Fold one level into the next. Odd tail is promoted unchanged.
fn next_level<K: Key>(hasher: &Hasher, curr: &[TreeNode<K>]) -> Vec<TreeNode<K>> {
    let mut out = Vec::with_capacity((curr.len() + 1) / 2);
    let mut i = 0usize;
    while i + 1 < curr.len() {
        let l = &curr[i];
        let r = &curr[i + 1];
        out.push(TreeNode {
            hash: hasher.digest_many([l.hash.as_slice(), r.hash.as_slice()]),
            size: l.size + r.size,
            min_key: l.min_key.clone(),
            max_key: r.max_key.clone(),
            max_left_child: l.max_key.clone(),
            avg: l.avg.midpoint(&r.avg),
        });
        i += 2;
    }
    if i < curr.len() {
        out.push(curr[i].clone());
    }
    out
}

/// Build all levels from the leaves, root-first. Empty input yields no
/// levels (the empty container has an empty-bytes root hash).
pub(crate) fn build_levels<K: Key, V: Value>(
    hasher: &Hasher,
    leaves: &SortedLeaves<K, V>,
) -> Vec<Vec<TreeNode<K>>> {
    if leaves.is_empty() {
        return Vec::new();
    }
    let mut levels = vec![leaf_level(hasher, leaves)];
    while levels.last().expect("at least the leaf level").len() > 1 {
        let next = next_level(hasher, levels.last().expect("at least the leaf level"));
        levels.push(next);
    }
    levels.reverse();
    levels
}

/* ---------------------------------- Tests ----------------------------------- */
