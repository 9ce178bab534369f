//! Merkle Binary Tree surface tests: the universal container properties
//! plus the literal seed scenarios.

mod common;

use common::{random_pairs, rng_from_env, shuffle};
use merklemap::{AuthenticatedMap, MerkleBinaryTree, StructError};

fn tree(pairs: &[(u64, u64)]) -> MerkleBinaryTree<u64, u64> {
    let mut t = MerkleBinaryTree::new();
    t.add_iter(pairs.iter().map(|p| p.0), pairs.iter().map(|p| p.1));
    t
}

#[test]
fn empty_container() {
    let t: MerkleBinaryTree<u64, u64> = MerkleBinaryTree::new();
    assert_eq!(t.len(), 0);
    assert!(t.is_empty());
    assert_eq!(t.iter().count(), 0);
    assert!(t.root_hash().is_empty());
    assert_eq!(t.get_by_order(0), None);
}

#[test]
fn insert_order_invariance_seed_scenario() {
    let keys = [2u64, 7, 12, 15, 16, 17, 25];
    let values = [1u64, 2, 3, 4, 5, 6, 7];

    let reference = {
        let mut t = MerkleBinaryTree::with_hash_name("sha256").unwrap();
        t.add_iter(keys, values);
        t.root_hash().to_vec()
    };

    // Bulk load in several permutations.
    let mut rng = rng_from_env();
    let mut pairs: Vec<(u64, u64)> = keys.into_iter().zip(values).collect();
    for _ in 0..10 {
        shuffle(&mut rng, &mut pairs);
        let t = tree(&pairs);
        assert_eq!(t.root_hash(), reference.as_slice());
    }

    // Point inserts, one rebuild each.
    shuffle(&mut rng, &mut pairs);
    let mut t = MerkleBinaryTree::new();
    for &(k, v) in &pairs {
        t.set(k, v);
    }
    assert_eq!(t.root_hash(), reference.as_slice());
}

#[test]
fn get_after_set_holds_for_every_pair() {
    let mut rng = rng_from_env();
    let pairs = random_pairs(&mut rng, 100, 10_000);
    let mut t = MerkleBinaryTree::new();
    for &(k, v) in &pairs {
        t.set(k, v);
    }
    for &(k, v) in &pairs {
        assert_eq!(t.get(&k), Ok(&v));
        assert!(t.contains(&k));
    }
    assert_eq!(t.len(), pairs.len());
}

#[test]
fn idempotent_and_overwriting_set() {
    let mut t = tree(&[(1, 10), (2, 20), (3, 30)]);
    let root = t.root_hash().to_vec();

    // Same pair again: length and root unchanged.
    t.set(2, 20);
    assert_eq!(t.len(), 3);
    assert_eq!(t.root_hash(), root.as_slice());

    // New value: same length, new root, new value visible.
    t.set(2, 99);
    assert_eq!(t.len(), 3);
    assert_ne!(t.root_hash(), root.as_slice());
    assert_eq!(t.get(&2), Ok(&99));
}

#[test]
fn delete_inverts_set() {
    let empty: MerkleBinaryTree<u64, u64> = MerkleBinaryTree::new();
    let mut t = MerkleBinaryTree::new();
    t.set(5, 50);
    t.delete(&5).unwrap();
    assert_eq!(t.len(), 0);
    assert_eq!(t.root_hash(), empty.root_hash());
    assert_eq!(t, empty);
}

#[test]
fn delete_missing_key_fails() {
    let mut t = tree(&[(1, 1)]);
    assert_eq!(
        t.delete(&9),
        Err(StructError::KeyNotFound("9".to_string()))
    );
    assert_eq!(t.len(), 1);
}

#[test]
fn root_hash_discriminates() {
    let mut rng = rng_from_env();
    let pairs = random_pairs(&mut rng, 40, 1_000);

    let a = tree(&pairs);
    let b = tree(&pairs);
    assert_eq!(a, b);

    // One changed value.
    let mut altered = pairs.clone();
    altered[7].1 ^= 1;
    assert_ne!(a, tree(&altered));

    // One extra key.
    let mut extended = pairs.clone();
    extended.push((1_000_001, 0));
    assert_ne!(a, tree(&extended));

    // One missing key.
    let shortened = &pairs[..pairs.len() - 1];
    assert_ne!(a, tree(shortened));
}

#[test]
fn add_dict_equals_add_iter() {
    let pairs = [(3u64, 30u64), (1, 10), (2, 20)];
    let via_iter = tree(&pairs);

    let mut via_dict = MerkleBinaryTree::new();
    via_dict.add_dict(std::collections::HashMap::from(pairs));
    assert_eq!(via_iter, via_dict);
}

#[test]
fn equality_ignores_load_order() {
    let mut a = MerkleBinaryTree::new();
    a.add_iter([1u64, 2, 3], [10u64, 20, 30]);
    let mut b = MerkleBinaryTree::new();
    b.add_iter([3u64, 2, 1], [30u64, 20, 10]);
    assert!(a == b);
}

#[test]
fn iteration_is_sorted() {
    let mut rng = rng_from_env();
    let pairs = random_pairs(&mut rng, 64, 5_000);
    let t = tree(&pairs);

    let keys: Vec<u64> = t.iter().map(|(k, _)| *k).collect();
    let mut sorted = keys.clone();
    sorted.sort_unstable();
    assert_eq!(keys, sorted);

    // get_by_order agrees with iteration.
    for (i, (k, v)) in t.iter().enumerate() {
        assert_eq!(t.get_by_order(i), Some((k, v)));
    }
    assert_eq!(t.get_by_order(t.len()), None);
}

#[test]
fn swap_involution_restores_both() {
    let mut a = tree(&[(1, 10), (2, 20)]);
    let mut b = tree(&[(7, 70), (8, 80), (9, 90)]);
    let (ra, rb) = (a.root_hash().to_vec(), b.root_hash().to_vec());

    a.swap(&mut b);
    assert_eq!(a.root_hash(), rb.as_slice());
    assert_eq!(b.root_hash(), ra.as_slice());
    assert_eq!(a.len(), 3);

    a.swap(&mut b);
    assert_eq!(a.root_hash(), ra.as_slice());
    assert_eq!(b.root_hash(), rb.as_slice());
    assert_eq!(a.get(&1), Ok(&10));
}

#[test]
fn clear_restores_the_empty_fingerprint() {
    let mut t = tree(&[(1, 1), (2, 2)]);
    t.clear();
    assert_eq!(t.len(), 0);
    assert!(t.root_hash().is_empty());
    assert_eq!(t, MerkleBinaryTree::new());
}

#[test]
fn string_keys_and_values_work() {
    let mut t: MerkleBinaryTree<String, String> = MerkleBinaryTree::new();
    t.set("pear".to_string(), "green".to_string());
    t.set("apple".to_string(), "red".to_string());
    t.set("quince".to_string(), "yellow".to_string());

    let keys: Vec<&str> = t.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, ["apple", "pear", "quince"]);
    assert_eq!(t.get(&"apple".to_string()), Ok(&"red".to_string()));

    let missing = t.get(&"plum".to_string()).unwrap_err();
    assert_eq!(missing, StructError::KeyNotFound("plum".to_string()));
}

#[test]
fn trait_object_free_generic_surface() {
    // The shared trait drives both the tree-specific and the generic call
    // sites the same way.
    fn exercise<M: AuthenticatedMap<u64, u64>>(map: &mut M) {
        map.set(1, 10);
        map.set(2, 20);
        assert_eq!(map.len(), 2);
        assert_eq!(map.size(), 2);
        assert_eq!(map.get(&1), Ok(&10));
        map.delete(&1).unwrap();
        assert!(!map.contains(&1));
    }
    let mut t: MerkleBinaryTree<u64, u64> = MerkleBinaryTree::new();
    exercise(&mut t);
}
