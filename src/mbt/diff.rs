//! The MBT change-set walk.
//!
//! Two aligned trees are walked from their roots. Subtrees with equal
//! hashes are pruned; divergent regions are classified using the stored
//! node metadata:
//!
//! - `size` orders the two sides for the disjoint-range checks and picks
//!   the side to descend when nothing else decides,
//! - `min_key` / `max_key` detect subtrees wholly outside the other side,
//! - `max_left_child` routes a single leaf into the child whose key range
//!   contains it,
//! - `avg` is a tie-break hint marking two subtrees as aligned for
//!   pairwise descent.
//!
//! The walk uses an explicit LIFO stack (right frame pushed first so the
//! left child's records come out first), bounding held state to tree
//! height. Within a leaf mismatch `Delete` precedes `Create`. A final
//! pairing pass fuses same-key `Delete`/`Create` records into a single
//! `Update` (or nothing when the values match), so no two records in the
//! result share a key. The overall record order is deterministic but not
//! key-sorted.

use std::collections::BTreeMap;

use crate::addr::NodeAddr;
use crate::changeset::Change;
use crate::types::{Key, Value};

use super::MerkleBinaryTree;

/// One pending comparison. `None` on a side means "no corresponding
/// subtree": everything under the other side is created or deleted.
type Frame = (Option<NodeAddr>, Option<NodeAddr>);

pub(crate) fn diff<K: Key, V: Value>(
    source: &MerkleBinaryTree<K, V>,
    destination: &MerkleBinaryTree<K, V>,
) -> Vec<Change<K, V>> {
    let mut raw = Vec::new();
    let mut stack: Vec<Frame> = vec![(Some(NodeAddr::ROOT), Some(NodeAddr::ROOT))];

    while let Some(frame) = stack.pop() {
        match frame {
            (None, None) => {}
            (None, Some(d)) => emit_subtree(destination, d, &mut stack, &mut raw, false),
            (Some(s), None) => emit_subtree(source, s, &mut stack, &mut raw, true),
            (Some(s), Some(d)) => compare(source, destination, s, d, &mut stack, &mut raw),
        }
    }
    normalize(raw)
}

/// Emit every leaf under `addr` as `Delete` (source side) or `Create`
/// (destination side). Non-leaf nodes expand into child frames with the
/// opposite side kept absent.
fn emit_subtree<K: Key, V: Value>(
    tree: &MerkleBinaryTree<K, V>,
    addr: NodeAddr,
    stack: &mut Vec<Frame>,
    out: &mut Vec<Change<K, V>>,
    deleting: bool,
) {
    if tree.node_at(addr).is_none() {
        return;
    }
    if tree.is_leaf_level(addr) {
        if let Some(leaf) = tree.leaf_at(addr.item) {
            out.push(if deleting {
                Change::Delete {
                    key: leaf.key.clone(),
                    value: leaf.value.clone(),
                }
            } else {
                Change::Create {
                    key: leaf.key.clone(),
                    value: leaf.value.clone(),
                }
            });
        }
        return;
    }
    if deleting {
        stack.push((Some(addr.right_child()), None));
        stack.push((Some(addr.left_child()), None));
    } else {
        stack.push((None, Some(addr.right_child())));
        stack.push((None, Some(addr.left_child())));
    }
}

fn compare<K: Key, V: Value>(
    source: &MerkleBinaryTree<K, V>,
    destination: &MerkleBinaryTree<K, V>,
    s: NodeAddr,
    d: NodeAddr,
    stack: &mut Vec<Frame>,
    out: &mut Vec<Change<K, V>>,
) {
    let (sn, dn) = match (source.node_at(s), destination.node_at(d)) {
        (None, None) => return,
        (Some(_), None) => {
            stack.push((Some(s), None));
            return;
        }
        (None, Some(_)) => {
            stack.push((None, Some(d)));
            return;
        }
        (Some(sn), Some(dn)) => (sn, dn),
    };

    // Equal hashes: the whole region is identical.
    if sn.hash == dn.hash {
        return;
    }

    let source_leaf = source
        .is_leaf_level(s)
        .then(|| source.leaf_at(s.item))
        .flatten();
    let destination_leaf = destination
        .is_leaf_level(d)
        .then(|| destination.leaf_at(d.item))
        .flatten();

    // Leaf vs. leaf.
    if let (Some(sl), Some(dl)) = (source_leaf, destination_leaf) {
        if sl.key == dl.key {
            out.push(Change::Update {
                key: sl.key.clone(),
                source_value: sl.value.clone(),
                destination_value: dl.value.clone(),
            });
        } else {
            out.push(Change::Delete {
                key: sl.key.clone(),
                value: sl.value.clone(),
            });
            out.push(Change::Create {
                key: dl.key.clone(),
                value: dl.value.clone(),
            });
        }
        return;
    }

    // A lone source leaf routes into the destination child whose key
    // range contains it.
    if let Some(sl) = source_leaf {
        if sl.key <= dn.max_left_child {
            stack.push((Some(s), Some(d.left_child())));
        } else {
            stack.push((Some(s), Some(d.right_child())));
        }
        return;
    }

    if let Some(dl) = destination_leaf {
        if dl.key <= sn.max_left_child {
            stack.push((Some(s.left_child()), Some(d)));
        } else {
            stack.push((Some(s.right_child()), Some(d)));
        }
        return;
    }

    // Subtree vs. subtree: disjoint-range pruning ordered by size.
    if sn.size < dn.size {
        if dn.max_left_child < sn.min_key {
            stack.push((Some(s), Some(d.right_child())));
            stack.push((None, Some(d.left_child())));
            return;
        }
        if dn.max_left_child >= sn.max_key {
            stack.push((None, Some(d.right_child())));
            stack.push((Some(s), Some(d.left_child())));
            return;
        }
    } else if sn.size > dn.size {
        if sn.max_left_child < dn.min_key {
            stack.push((Some(s.right_child()), Some(d)));
            stack.push((Some(s.left_child()), None));
            return;
        }
        if sn.max_left_child >= dn.max_key {
            stack.push((Some(s.right_child()), None));
            stack.push((Some(s.left_child()), Some(d)));
            return;
        }
    }

    // Matching shape hint: descend both sides pairwise.
    if sn.avg == dn.avg {
        stack.push((Some(s.right_child()), Some(d.right_child())));
        stack.push((Some(s.left_child()), Some(d.left_child())));
        return;
    }

    // Fallback: descend the larger side, pairing each of its children
    // against the smaller side's whole node. Equal sizes descend the
    // destination.
    if sn.size > dn.size {
        stack.push((Some(s.right_child()), Some(d)));
        stack.push((Some(s.left_child()), Some(d)));
    } else {
        stack.push((Some(s), Some(d.right_child())));
        stack.push((Some(s), Some(d.left_child())));
    }
}

/// Fuse same-key `Delete`/`Create` pairs into an `Update` (or nothing
/// when the values match). The merged record lands at the earlier
/// record's position; everything else keeps its emission order.
fn normalize<K: Key, V: Value>(raw: Vec<Change<K, V>>) -> Vec<Change<K, V>> {
    let mut slots: Vec<Option<Change<K, V>>> = Vec::with_capacity(raw.len());
    let mut deletes: BTreeMap<K, usize> = BTreeMap::new();
    let mut creates: BTreeMap<K, usize> = BTreeMap::new();

    for change in raw {
        match change {
            Change::Delete { key, value } => {
                if let Some(slot) = creates.remove(&key) {
                    let created = slots[slot].take();
                    if let Some(Change::Create {
                        value: destination_value,
                        ..
                    }) = created
                    {
                        if destination_value != value {
                            slots[slot] = Some(Change::Update {
                                key,
                                source_value: value,
                                destination_value,
                            });
                        }
                    }
                } else {
                    deletes.insert(key.clone(), slots.len());
                    slots.push(Some(Change::Delete { key, value }));
                }
            }
            Change::Create { key, value } => {
                if let Some(slot) = deletes.remove(&key) {
                    let deleted = slots[slot].take();
                    if let Some(Change::Delete {
                        value: source_value,
                        ..
                    }) = deleted
                    {
                        if source_value != value {
                            slots[slot] = Some(Change::Update {
                                key,
                                source_value,
                                destination_value: value,
                            });
                        }
                    }
                } else {
                    creates.insert(key.clone(), slots.len());
                    slots.push(Some(Change::Create { key, value }));
                }
            }
            update => slots.push(Some(update)),
        }
    }
    slots.into_iter().flatten().collect()
}

/* ---------------------------------- Tests ----------------------------------- */
