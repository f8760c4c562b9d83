//! Integration tests for the B-tree core.
//!
//! These drive whole insert/delete/search workloads through the public
//! API and check the outcomes a user can observe: traversal order, search
//! results, heights, and the structural audit.

use pagetree::{BTree, Error, MemoryStore, PageStore};

fn tree_with(t: usize, keys: &[u32]) -> BTree<u32, MemoryStore<u32>> {
    let mut tree = BTree::create(t, MemoryStore::new()).unwrap();
    for &k in keys {
        tree.insert(k).unwrap();
    }
    tree
}

#[test]
fn test_mixed_insert_order_traverses_sorted() {
    let tree = tree_with(2, &[10, 20, 5, 6, 12, 30, 7, 17]);

    assert_eq!(tree.in_order().unwrap(), vec![5, 6, 7, 10, 12, 17, 20, 30]);
    assert_eq!(tree.verify().unwrap().key_count, 8);

    // The root of a t=2 tree holding 8 keys has between 1 and 3 keys.
    let root_keys = tree_root_key_count(&tree);
    assert!((1..=3).contains(&root_keys), "root holds {root_keys} keys");
}

fn tree_root_key_count(tree: &BTree<u32, MemoryStore<u32>>) -> usize {
    tree.store()
        .read_page(tree.root_id())
        .map(|n| n.key_count())
        .unwrap()
}

#[test]
fn test_leaf_delete_keeps_order() {
    let mut tree = tree_with(2, &[10, 20, 5, 6, 12, 30, 7, 17]);

    tree.delete(&6).unwrap();

    assert_eq!(tree.in_order().unwrap(), vec![5, 7, 10, 12, 17, 20, 30]);
    tree.verify().unwrap();
}

#[test]
fn test_consecutive_leaf_deletes_rebalance() {
    let mut tree = tree_with(2, &[10, 20, 5, 6, 12, 30, 7, 17]);
    let height_before = tree.height().unwrap();

    tree.delete(&6).unwrap();
    tree.delete(&7).unwrap();

    assert_eq!(tree.in_order().unwrap(), vec![5, 10, 12, 17, 20, 30]);
    let height_after = tree.height().unwrap();
    assert!(height_after <= height_before);
    tree.verify().unwrap();
}

#[test]
fn test_internal_delete_preserves_sortedness() {
    let mut tree = tree_with(2, &[10, 20, 5, 6, 12, 30, 7, 17]);
    tree.delete(&6).unwrap();
    tree.delete(&7).unwrap();

    // 10 sits in the root at this point; deleting it exercises the
    // predecessor/successor replacement.
    assert!(tree_root_holds(&tree, 10));
    tree.delete(&10).unwrap();

    assert_eq!(tree.in_order().unwrap(), vec![5, 12, 17, 20, 30]);
    tree.verify().unwrap();
}

fn tree_root_holds(tree: &BTree<u32, MemoryStore<u32>>, key: u32) -> bool {
    tree.store()
        .read_page(tree.root_id())
        .map(|n| n.keys().contains(&key))
        .unwrap()
}

#[test]
fn test_drain_ascending_leaves_empty_root() {
    let keys: Vec<u32> = (1..=50).collect();
    let mut tree = tree_with(3, &keys);

    for k in 1..=50u32 {
        tree.delete(&k).unwrap();
        // Every intermediate state must satisfy the full invariant set.
        let summary = tree.verify().unwrap();
        assert_eq!(summary.key_count, (50 - k) as usize);
    }

    assert!(tree.is_empty().unwrap());
    assert_eq!(tree.height().unwrap(), 0);
    let summary = tree.verify().unwrap();
    assert_eq!(summary.node_count, 1);
}

#[test]
fn test_drain_descending_leaves_empty_root() {
    let keys: Vec<u32> = (1..=50).collect();
    let mut tree = tree_with(2, &keys);

    for k in (1..=50u32).rev() {
        tree.delete(&k).unwrap();
        tree.verify().unwrap();
    }

    assert!(tree.is_empty().unwrap());
}

#[test]
fn test_empty_tree_behavior() {
    let mut tree: BTree<u32, _> = BTree::create(2, MemoryStore::new()).unwrap();

    for k in [0u32, 1, 42, u32::MAX] {
        assert_eq!(tree.search(&k).unwrap(), None);
    }
    assert_eq!(tree.delete(&42), Err(Error::KeyNotFound));
}

#[test]
fn test_round_trip_insert_search_delete() {
    let mut tree: BTree<u32, _> = BTree::create(2, MemoryStore::new()).unwrap();

    tree.insert(99).unwrap();
    assert!(tree.search(&99).unwrap().is_some());

    tree.delete(&99).unwrap();
    assert_eq!(tree.search(&99).unwrap(), None);
}

#[test]
fn test_search_is_idempotent() {
    let tree = tree_with(2, &[3, 1, 4, 5, 9, 2, 6]);

    let first = tree.search(&4).unwrap();
    let second = tree.search(&4).unwrap();
    assert_eq!(first, second);

    let miss_first = tree.search(&8).unwrap();
    let miss_second = tree.search(&8).unwrap();
    assert_eq!(miss_first, miss_second);
}

#[test]
fn test_height_stays_within_bound() {
    // height <= log_t((n+1)/2) for every B-tree of minimum degree t.
    for t in [2usize, 3, 5] {
        let n = 500u32;
        let keys: Vec<u32> = (0..n).map(|i| (i * 7919) % n).collect();
        let tree = tree_with(t, &keys);

        let height = tree.height().unwrap() as f64;
        let bound = (f64::from(n + 1) / 2.0).log(t as f64);
        assert!(
            height <= bound,
            "t={t}: height {height} exceeds bound {bound:.2}"
        );
    }
}

#[test]
fn test_large_churn_stays_consistent() {
    let mut tree: BTree<u32, _> = BTree::create(3, MemoryStore::new()).unwrap();

    // Insert 0..300, remove every third key, re-insert a band on top.
    for k in 0..300u32 {
        tree.insert(k).unwrap();
    }
    for k in (0..300u32).step_by(3) {
        tree.delete(&k).unwrap();
    }
    for k in (0..300u32).step_by(3) {
        tree.insert(k).unwrap();
    }

    assert_eq!(tree.in_order().unwrap(), (0..300).collect::<Vec<_>>());
    let summary = tree.verify().unwrap();
    assert_eq!(summary.key_count, 300);
}

#[test]
fn test_page_accesses_stay_logarithmic() {
    let keys: Vec<u32> = (0..1000).map(|i| (i * 7919) % 1000).collect();
    let tree = tree_with(16, &keys);

    tree.stats().reset();
    tree.search(&500).unwrap();

    // A t=16 tree of 1000 keys is at most 3 levels deep.
    assert!(tree.stats().snapshot().pages_read <= 3);
}
