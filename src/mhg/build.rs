//! MHG rebuild rules: row/column digests, pair folding, master hash.
//!
//! The grid caches one digest per row and per column. A mutation selects
//! which cached digests must be recomputed:
//!
//! 1. the grid side changed — recompute every row and column digest;
//! 2. every affected position sits in the last row — recompute the
//!    trailing row digest(s) and the column suffix from the smallest
//!    affected column (an insertion shifts the rest of the row);
//! 3. otherwise — recompute every column digest and the row digests from
//!    the earliest affected row downward.
//!
//! Both trees are then re-folded from their digest caches with the same
//! odd-tail promotion as the MBT, and
//! `master_hash = H(row_root || column_root)` is refreshed.

use crate::hash::{Digest, Hasher};
use crate::types::{Key, Value};

use super::MerkleHashGrid;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Smallest `s` with `s * s >= n`.
pub(super) fn ceil_sqrt(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    let mut s = (n as f64).sqrt() as usize;
    while s * s < n {
        s += 1;
    }
    while s > 0 && (s - 1) * (s - 1) >= n {
        s -= 1;
    }
    s
}

/// Digest of row `row`: its leaf digests concatenated, then hashed.
fn row_digest(hasher: &Hasher, leaf_hashes: &[Digest], side: usize, row: usize) -> Digest {
    let start = row * side;
    let end = ((row + 1) * side).min(leaf_hashes.len());
    hasher.digest_many(leaf_hashes[start..end].iter().map(|h| h.as_slice()))
}

/// Digest of column `col`: that column's leaf digests across rows. An
/// empty column hashes the empty concatenation.
fn column_digest(hasher: &Hasher, leaf_hashes: &[Digest], side: usize, col: usize) -> Digest {
    hasher.digest_many(
        (col..leaf_hashes.len())
            .step_by(side)
            .map(|i| leaf_hashes[i].as_slice()),
    )
}

/// Fold a digest level into a root-first tree. Odd tail promoted
/// unchanged.
pub(super) fn fold(hasher: &Hasher, leaf_level: &[Digest]) -> Vec<Vec<Digest>> {
    if leaf_level.is_empty() {
        return Vec::new();
    }
    let mut levels = vec![leaf_level.to_vec()];
    while levels.last().expect("at least the leaf level").len() > 1 {
        let curr = levels.last().expect("at least the leaf level");
        let mut next = Vec::with_capacity((curr.len() + 1) / 2);
        let mut i = 0usize;
        while i + 1 < curr.len() {
            next.push(hasher.digest_many([curr[i].as_slice(), curr[i + 1].as_slice()]));
            i += 2;
        }
        if i < curr.len() {
            next.push(curr[i].clone());
        }
        levels.push(next);
    }
    levels.reverse();
    levels
}

/// Refresh digest caches, trees, and master hash after a mutation.
///
/// `positions` lists the affected leaf indexes; `None` forces a full
/// recomputation (bulk loads, `apply_changeset`).
pub(super) fn rebuild<K: Key, V: Value>(
    grid: &mut MerkleHashGrid<K, V>,
    positions: Option<&[usize]>,
) {
    let n = grid.leaves.len();
    if n == 0 {
        grid.grid_side = 0;
        grid.row_digests.clear();
        grid.col_digests.clear();
        grid.row_tree.clear();
        grid.column_tree.clear();
        grid.master_hash.clear();
        return;
    }

    let side = ceil_sqrt(n);
    let rows = (n + side - 1) / side;
    let last_row_start = side * side - side;

    // Which cached digests need recomputing.
    let (first_row, first_col) = match positions {
        Some(ps) if side == grid.grid_side && !ps.is_empty() => {
            if ps.iter().all(|&p| p >= last_row_start) {
                let row = ps.iter().map(|&p| p / side).min().unwrap_or(0);
                let col = ps.iter().map(|&p| p % side).min().unwrap_or(0);
                (row, col)
            } else {
                let row = ps.iter().map(|&p| p / side).min().unwrap_or(0);
                (row, 0)
            }
        }
        // Side changed, or a bulk load: recompute everything.
        _ => (0, 0),
    };

    grid.grid_side = side;

    let fresh_rows = compute_row_digests(grid, side, first_row, rows);
    splice_from(&mut grid.row_digests, first_row, fresh_rows);

    let fresh_cols = compute_col_digests(grid, side, first_col);
    splice_from(&mut grid.col_digests, first_col, fresh_cols);

    grid.row_tree = fold(&grid.hasher, &grid.row_digests);
    grid.column_tree = fold(&grid.hasher, &grid.col_digests);
    grid.master_hash = grid.hasher.digest_many([
        grid.row_tree[0][0].as_slice(),
        grid.column_tree[0][0].as_slice(),
    ]);
}

fn compute_row_digests<K: Key, V: Value>(
    grid: &MerkleHashGrid<K, V>,
    side: usize,
    from: usize,
    rows: usize,
) -> Vec<Digest> {
    #[cfg(feature = "rayon")]
    {
        (from..rows)
            .into_par_iter()
            .map(|r| row_digest(&grid.hasher, &grid.leaf_hashes, side, r))
            .collect()
    }
    #[cfg(not(feature = "rayon"))]
    {
        (from..rows)
            .map(|r| row_digest(&grid.hasher, &grid.leaf_hashes, side, r))
            .collect()
    }
}

fn compute_col_digests<K: Key, V: Value>(
    grid: &MerkleHashGrid<K, V>,
    side: usize,
    from: usize,
) -> Vec<Digest> {
    #[cfg(feature = "rayon")]
    {
        (from..side)
            .into_par_iter()
            .map(|c| column_digest(&grid.hasher, &grid.leaf_hashes, side, c))
            .collect()
    }
    #[cfg(not(feature = "rayon"))]
    {
        (from..side)
            .map(|c| column_digest(&grid.hasher, &grid.leaf_hashes, side, c))
            .collect()
    }
}

/// Replace `dst[from..]` with `fresh`, growing `dst` as needed.
fn splice_from(dst: &mut Vec<Digest>, from: usize, fresh: Vec<Digest>) {
    dst.truncate(from);
    dst.extend(fresh);
}

/* ---------------------------------- Tests ----------------------------------- */
