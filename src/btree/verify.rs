//! Structural invariant checking.
//!
//! [`BTree::verify`] audits the whole tree against the properties every
//! public operation must restore before returning:
//! - every node holds at most `2t-1` keys, every non-root node at least
//!   `t-1`,
//! - keys inside a node are ordered, and every subtree stays inside the
//!   key range its parent separators carve out,
//! - an internal node has exactly one more child than keys,
//! - all leaves sit at the same depth.
//!
//! A violation is an implementation bug, not a user-facing condition, so
//! the checker panics with a description rather than returning an error.
//! Backend failures (unreadable pages) still surface as `Err`.

use std::fmt;

use crate::btree::{BTree, DuplicatePolicy, Node};
use crate::common::config::{max_keys, min_keys};
use crate::common::{PageId, Result};
use crate::storage::PageStore;

/// What [`BTree::verify`] measured while auditing the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeSummary {
    /// Total keys stored.
    pub key_count: usize,
    /// Total live node pages.
    pub node_count: usize,
    /// Edge distance from root to leaves.
    pub height: usize,
}

impl fmt::Display for TreeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tree {{ keys: {}, nodes: {}, height: {} }}",
            self.key_count, self.node_count, self.height
        )
    }
}

impl<K, S> BTree<K, S>
where
    K: Ord + Clone + fmt::Debug,
    S: PageStore<K>,
{
    /// Walk the whole tree off the backend and check every structural
    /// invariant.
    ///
    /// # Panics
    /// Panics with a description of the violated invariant and the page
    /// it was found on.
    ///
    /// # Errors
    /// Propagates backend failures (`Error::PageNotFound`).
    pub fn verify(&self) -> Result<TreeSummary> {
        let mut summary = TreeSummary::default();
        let mut leaf_depth = None;
        self.verify_node(
            self.root_id(),
            true,
            0,
            None,
            None,
            &mut leaf_depth,
            &mut summary,
        )?;
        summary.height = leaf_depth.unwrap_or(0);
        Ok(summary)
    }

    #[allow(clippy::too_many_arguments)]
    fn verify_node(
        &self,
        page_id: PageId,
        is_root: bool,
        depth: usize,
        lower: Option<&K>,
        upper: Option<&K>,
        leaf_depth: &mut Option<usize>,
        summary: &mut TreeSummary,
    ) -> Result<()> {
        let node = self.read(page_id)?;
        summary.node_count += 1;
        summary.key_count += node.key_count();

        self.check_key_bounds(&node, page_id, is_root);
        self.check_key_order(&node, page_id);
        self.check_key_range(&node, page_id, lower, upper);

        if node.is_leaf() {
            assert_eq!(
                node.child_count(),
                0,
                "{page_id}: leaf node holds {} children",
                node.child_count()
            );
            match *leaf_depth {
                None => *leaf_depth = Some(depth),
                Some(expected) => assert_eq!(
                    depth, expected,
                    "{page_id}: leaf at depth {depth}, expected {expected}"
                ),
            }
            return Ok(());
        }

        assert_eq!(
            node.child_count(),
            node.key_count() + 1,
            "{page_id}: internal node with {} keys holds {} children",
            node.key_count(),
            node.child_count()
        );

        for i in 0..node.child_count() {
            let child_lower = if i == 0 { lower } else { Some(node.key(i - 1)?) };
            let child_upper = if i == node.key_count() {
                upper
            } else {
                Some(node.key(i)?)
            };
            self.verify_node(
                node.child(i)?,
                false,
                depth + 1,
                child_lower,
                child_upper,
                leaf_depth,
                summary,
            )?;
        }
        Ok(())
    }

    fn check_key_bounds(&self, node: &Node<K>, page_id: PageId, is_root: bool) {
        let t = self.min_degree();
        let n = node.key_count();
        assert!(
            n <= max_keys(t),
            "{page_id}: node holds {n} keys, max is {}",
            max_keys(t)
        );
        if is_root {
            // An internal root must keep at least one key; only the empty
            // tree's leaf root may hold zero.
            if !node.is_leaf() {
                assert!(n >= 1, "{page_id}: internal root with no keys");
            }
        } else {
            assert!(
                n >= min_keys(t),
                "{page_id}: node holds {n} keys, min is {}",
                min_keys(t)
            );
        }
    }

    fn check_key_order(&self, node: &Node<K>, page_id: PageId) {
        for pair in node.keys().windows(2) {
            match self.policy() {
                DuplicatePolicy::Reject => assert!(
                    pair[0] < pair[1],
                    "{page_id}: keys out of order: {:?} !< {:?}",
                    pair[0],
                    pair[1]
                ),
                DuplicatePolicy::Allow => assert!(
                    pair[0] <= pair[1],
                    "{page_id}: keys out of order: {:?} !<= {:?}",
                    pair[0],
                    pair[1]
                ),
            }
        }
    }

    /// Every key must lie inside the range carved out by the separators
    /// above. With duplicates rejected the range is open on both sides;
    /// with duplicates allowed a split may promote one copy of an equal
    /// run into the parent, leaving equal copies on either side, so the
    /// range closes at both separators.
    fn check_key_range(
        &self,
        node: &Node<K>,
        page_id: PageId,
        lower: Option<&K>,
        upper: Option<&K>,
    ) {
        for key in node.keys() {
            if let Some(lo) = lower {
                match self.policy() {
                    DuplicatePolicy::Reject => assert!(
                        lo < key,
                        "{page_id}: key {key:?} at or below separator {lo:?}"
                    ),
                    DuplicatePolicy::Allow => {
                        assert!(lo <= key, "{page_id}: key {key:?} below separator {lo:?}")
                    }
                }
            }
            if let Some(hi) = upper {
                match self.policy() {
                    DuplicatePolicy::Reject => assert!(
                        key < hi,
                        "{page_id}: key {key:?} at or above separator {hi:?}"
                    ),
                    DuplicatePolicy::Allow => {
                        assert!(key <= hi, "{page_id}: key {key:?} above separator {hi:?}")
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_summary_counts() {
        let mut tree: BTree<u32, _> = BTree::create(2, MemoryStore::new()).unwrap();
        for k in 1..=7 {
            tree.insert(k).unwrap();
        }

        let summary = tree.verify().unwrap();
        assert_eq!(summary.key_count, 7);
        assert_eq!(summary.height, tree.height().unwrap());
        assert!(summary.node_count >= 3);
    }

    #[test]
    fn test_empty_tree_verifies() {
        let tree: BTree<u32, _> = BTree::create(3, MemoryStore::new()).unwrap();
        let summary = tree.verify().unwrap();
        assert_eq!(
            summary,
            TreeSummary {
                key_count: 0,
                node_count: 1,
                height: 0
            }
        );
    }

    #[test]
    fn test_summary_display() {
        let summary = TreeSummary {
            key_count: 10,
            node_count: 4,
            height: 1,
        };
        assert_eq!(format!("{summary}"), "Tree { keys: 10, nodes: 4, height: 1 }");
    }
}
