//! The MHG change-set walk.
//!
//! Divergent leaf indexes are located by intersecting the row-tree and
//! column-tree inconsistency sets, then classified by pairing leaves at
//! each index across the two grids. A leaf whose counterpart sits at a
//! different index (everything after an insertion shifts) waits in a
//! pending map keyed by its key until the opposite side produces the same
//! key; unpaired leftovers become `Delete` (source) or `Create`
//! (destination).
//!
//! When the two grids disagree on `grid_side`, the row/column layouts are
//! incomparable and the differ classifies every index instead: a correct
//! superset scan through the same pipeline.

use std::collections::{BTreeMap, BTreeSet};

use crate::addr::NodeAddr;
use crate::changeset::Change;
use crate::hash::Digest;
use crate::leaves::Leaf;
use crate::types::{Key, Value};

use super::MerkleHashGrid;

pub(crate) fn diff<K: Key, V: Value>(
    source: &MerkleHashGrid<K, V>,
    destination: &MerkleHashGrid<K, V>,
) -> Vec<Change<K, V>> {
    if source.master_hash == destination.master_hash {
        return Vec::new();
    }

    let indexes: Vec<usize> = if source.grid_side == destination.grid_side {
        let rows = inconsistencies(&source.row_tree, &destination.row_tree);
        let cols = inconsistencies(&source.column_tree, &destination.column_tree);
        let side = source.grid_side;
        let mut set = BTreeSet::new();
        for &r in &rows {
            for &c in &cols {
                set.insert(r * side + c);
            }
        }
        set.into_iter().collect()
    } else {
        (0..source.len().max(destination.len())).collect()
    };

    classify(source, destination, &indexes)
}

/// Leaf indexes whose digests differ between two folded trees.
///
/// Equal hashes prune; at leaf level the emitted index is the larger of
/// the two item indexes; when one tree is shallower it is held unchanged
/// while the deeper tree descends.
fn inconsistencies(a: &[Vec<Digest>], b: &[Vec<Digest>]) -> BTreeSet<usize> {
    let mut out = BTreeSet::new();
    let mut stack: Vec<(NodeAddr, NodeAddr)> = vec![(NodeAddr::ROOT, NodeAddr::ROOT)];

    while let Some((aa, ba)) = stack.pop() {
        let an = a.get(aa.level).and_then(|level| level.get(aa.item));
        let bn = b.get(ba.level).and_then(|level| level.get(ba.item));
        let (an, bn) = match (an, bn) {
            (Some(x), Some(y)) => (x, y),
            _ => continue,
        };
        if an == bn {
            continue;
        }

        let a_last = aa.level + 1 == a.len();
        let b_last = ba.level + 1 == b.len();
        if a_last && b_last {
            out.insert(aa.item.max(ba.item));
        } else if a_last {
            stack.push((aa, ba.right_child()));
            stack.push((aa, ba.left_child()));
        } else if b_last {
            stack.push((aa.right_child(), ba));
            stack.push((aa.left_child(), ba));
        } else {
            stack.push((aa.right_child(), ba.right_child()));
            stack.push((aa.left_child(), ba.left_child()));
        }
    }
    out
}

type Pending<'a, K, V> = BTreeMap<&'a K, (&'a Leaf<K, V>, &'a Digest)>;

fn classify<K: Key, V: Value>(
    source: &MerkleHashGrid<K, V>,
    destination: &MerkleHashGrid<K, V>,
    indexes: &[usize],
) -> Vec<Change<K, V>> {
    let mut out = Vec::new();
    let mut source_pending: Pending<'_, K, V> = BTreeMap::new();
    let mut destination_pending: Pending<'_, K, V> = BTreeMap::new();

    for &i in indexes {
        let s = source.entry(i);
        let d = destination.entry(i);

        if let (Some((sl, sh)), Some((dl, dh))) = (s, d) {
            if sl.key == dl.key {
                if sh != dh {
                    out.push(Change::Update {
                        key: sl.key.clone(),
                        source_value: sl.value.clone(),
                        destination_value: dl.value.clone(),
                    });
                }
                continue;
            }
        }

        if let Some((dl, dh)) = d {
            match source_pending.remove(&dl.key) {
                Some((sl, sh)) => {
                    if sh != dh {
                        out.push(Change::Update {
                            key: sl.key.clone(),
                            source_value: sl.value.clone(),
                            destination_value: dl.value.clone(),
                        });
                    }
                }
                None => {
                    destination_pending.insert(&dl.key, (dl, dh));
                }
            }
        }

        if let Some((sl, sh)) = s {
            match destination_pending.remove(&sl.key) {
                Some((dl, dh)) => {
                    if sh != dh {
                        out.push(Change::Update {
                            key: sl.key.clone(),
                            source_value: sl.value.clone(),
                            destination_value: dl.value.clone(),
                        });
                    }
                }
                None => {
                    source_pending.insert(&sl.key, (sl, sh));
                }
            }
        }
    }

    for (_, (leaf, _)) in source_pending {
        out.push(Change::Delete {
            key: leaf.key.clone(),
            value: leaf.value.clone(),
        });
    }
    for (_, (leaf, _)) in destination_pending {
        out.push(Change::Create {
            key: leaf.key.clone(),
            value: leaf.value.clone(),
        });
    }
    out
}

/* ---------------------------------- Tests ----------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::Hasher;
    use crate::mhg::build::fold;

    fn digests(h: &Hasher, bytes: &[u8]) -> Vec<Digest> {
        bytes.iter().map(|b| h.digest(&[*b])).collect()
    }

    #[test]
    fn inconsistencies_prune_equal_trees() {
        let h = Hasher::default();
        let tree = fold(&h, &digests(&h, &[1, 2, 3, 4]));
        assert!(inconsistencies(&tree, &tree).is_empty());
    }

    #[test]
    fn inconsistencies_locate_single_divergence() {
        let h = Hasher::default();
        let a = fold(&h, &digests(&h, &[1, 2, 3, 4]));
        let b = fold(&h, &digests(&h, &[1, 2, 9, 4]));
        let idx = inconsistencies(&a, &b);
        assert_eq!(idx.into_iter().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn inconsistencies_with_depth_mismatch() {
        let h = Hasher::default();
        // 5 leaves folds deeper than 2.
        let a = fold(&h, &digests(&h, &[1, 2, 3, 4, 5]));
        let b = fold(&h, &digests(&h, &[1, 2]));
        let idx = inconsistencies(&a, &b);
        assert!(!idx.is_empty());
        assert!(idx.iter().all(|&i| i < 5));
    }
}
