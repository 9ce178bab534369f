//! Per-node metadata carried across MBT levels.

use crate::hash::Digest;

/// A single internal or leaf-level node.
///
/// Fold rules (parent of `l`, `r`):
/// `hash = H(l.hash || r.hash)`, `size = l.size + r.size`,
/// `min_key = l.min_key`, `max_key = r.max_key`,
/// `max_left_child = l.max_key`, `avg = midpoint(l.avg, r.avg)`.
/// A node promoted past an odd tail keeps every field unchanged.
#[derive(Clone, Debug)]
pub(crate) struct TreeNode<K> {
    pub hash: Digest,
    pub size: usize,
    pub min_key: K,
    pub max_key: K,
    pub max_left_child: K,
    pub avg: K,
}
