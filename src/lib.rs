//! merklemap — authenticated ordered key–value containers for change-set
//! computation between replicas.
//!
//! Two containers share one map surface and one cross-container
//! operation:
//!
//! - [`MerkleBinaryTree`] — sorted leaves under a binary Merkle tree whose
//!   nodes carry subtree metadata (size, key range, left-child maximum),
//!   letting the differ prune hash-equal regions and classify divergence
//!   as create, delete, or update.
//! - [`MerkleHashGrid`] — sorted leaves arranged row-major in a square
//!   grid, summarized by one Merkle tree per row set and one per column
//!   set; divergence localizes to the intersection of the two trees'
//!   inconsistency sets.
//!
//! Both expose point `set`/`get`/`delete`, bulk loads, ordered iteration,
//! root-hash equality, constant-work `swap`, and
//! `get_changeset(destination)` returning the minimal reconciliation
//! script ([`Change`] records). Hashing goes through an injectable
//! [`Hasher`] covering SHA-1/SHA-2/SHA-3/BLAKE2/BLAKE3 or a
//! caller-supplied digest function.
//!
//! ```
//! use merklemap::MerkleBinaryTree;
//!
//! let mut source = MerkleBinaryTree::new();
//! source.add_iter([2u64, 7, 12], [1u64, 2, 3]);
//!
//! let mut destination = MerkleBinaryTree::new();
//! destination.add_iter([2u64, 7, 12], [1u64, 2, 9]);
//!
//! let changes = source.get_changeset(&destination);
//! source.apply_changeset(changes).unwrap();
//! assert_eq!(source, destination);
//! ```
//!
//! ### Features
//! - `serde` (default): change records serialize with their interop field
//!   names (`"Operation type"`, `"Key"`, …).
//! - `rayon`: parallel leaf and row/column digest computation.
//!
//! ### Concurrency
//! Containers are single-writer: mutation takes `&mut self` and there is
//! no interior synchronization. Read-only access is freely shareable.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms, unused_must_use)]

pub mod changeset;
pub mod error;
pub mod hash;
pub mod map;
pub mod types;

mod addr;
mod leaves;
mod mbt;
mod mhg;

pub use changeset::Change;
pub use error::{Result, StructError};
pub use hash::{Digest, HashAlg, Hasher};
pub use map::AuthenticatedMap;
pub use mbt::MerkleBinaryTree;
pub use mhg::MerkleHashGrid;
pub use types::{Key, Value};
