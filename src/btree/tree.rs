//! The B-tree proper: search, proactive-split insert, full delete.

use crate::btree::{Node, TreeStats};
use crate::common::config::{self, MIN_DEGREE_FLOOR};
use crate::common::{Error, PageId, Result};
use crate::storage::PageStore;

/// What `insert` does when the key is already present.
///
/// The classical B-tree definition keys are a set, so [`Reject`] is the
/// default. [`Allow`] turns the tree into a multiset with stable order:
/// an equal key always lands to the right of the copies already stored,
/// and `delete` removes the first copy on the search path.
///
/// [`Reject`]: DuplicatePolicy::Reject
/// [`Allow`]: DuplicatePolicy::Allow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// `insert` fails with [`Error::DuplicateKey`] for a present key.
    #[default]
    Reject,
    /// Equal keys are stored side by side in insertion order.
    Allow,
}

/// A disk-oriented B-tree index.
///
/// # Architecture
/// ```text
/// ┌───────────────────────────────────────────────────────────┐
/// │                      BTree<K, S>                          │
/// │   root: PageId      t: min degree      stats: TreeStats   │
/// │                          │                                │
/// │            search / insert / delete walk down,            │
/// │         restructuring each node BEFORE descending         │
/// │                          ▼                                │
/// │  ┌─────────────────────────────────────────────────────┐  │
/// │  │              S: PageStore<K>  [Swappable]           │  │
/// │  │    allocate_page | read_page | write_page           │  │
/// │  └─────────────────────────────────────────────────────┘  │
/// └───────────────────────────────────────────────────────────┘
/// ```
///
/// Every node occupies one page of the backend `S` and holds between
/// `t-1` and `2t-1` keys (the root is exempt from the lower bound). The
/// tree holds no parent pointers and never backtracks: insertion splits
/// any full node before entering it, deletion tops up any minimal node
/// (borrow or merge) before entering it, so each recursive step finds a
/// node that can absorb the change.
///
/// # Usage
/// ```
/// use pagetree::{BTree, MemoryStore};
///
/// let mut tree: BTree<u32, _> = BTree::create(2, MemoryStore::new()).unwrap();
/// tree.insert(7).unwrap();
/// assert!(tree.search(&7).unwrap().is_some());
/// tree.delete(&7).unwrap();
/// assert!(tree.search(&7).unwrap().is_none());
/// ```
pub struct BTree<K, S> {
    /// Handles all page I/O.
    store: S,

    /// Page holding the current root node (moves on height changes).
    root: PageId,

    /// Minimum degree, fixed at construction.
    t: usize,

    /// Duplicate-key policy, fixed at construction.
    policy: DuplicatePolicy,

    /// Operation counters.
    stats: TreeStats,

    /// Marker tying the key type `K` to this tree without storing keys inline.
    _marker: std::marker::PhantomData<K>,
}

impl<K: Ord + Clone, S: PageStore<K>> BTree<K, S> {
    /// Create an empty tree: a single leaf root with no keys.
    ///
    /// # Errors
    /// Returns `Error::InvalidDegree` if `t < 2`.
    pub fn create(t: usize, store: S) -> Result<Self> {
        Self::create_with_policy(t, store, DuplicatePolicy::default())
    }

    /// Create an empty tree with an explicit duplicate-key policy.
    ///
    /// # Errors
    /// Returns `Error::InvalidDegree` if `t < 2`.
    pub fn create_with_policy(t: usize, mut store: S, policy: DuplicatePolicy) -> Result<Self> {
        if t < MIN_DEGREE_FLOOR {
            return Err(Error::InvalidDegree(t));
        }

        let root = store.allocate_page()?;
        store.write_page(root, &Node::leaf())?;

        let stats = TreeStats::new();
        TreeStats::bump(&stats.pages_allocated);
        TreeStats::bump(&stats.pages_written);

        Ok(Self {
            store,
            root,
            t,
            policy,
            stats,
            _marker: std::marker::PhantomData,
        })
    }

    // ========================================================================
    // Public API: Queries
    // ========================================================================

    /// Look up `key`, returning the page and key index holding it.
    ///
    /// Walks from the root; in each node, finds the smallest index `i`
    /// with `key <= keys[i]` and either reports the hit or descends into
    /// `children[i]`. Costs `O(log_t n)` page fetches.
    pub fn search(&self, key: &K) -> Result<Option<(PageId, usize)>> {
        let mut page_id = self.root;
        loop {
            let node = self.read(page_id)?;
            let (found, i) = node.search_keys(key);
            if found {
                return Ok(Some((page_id, i)));
            }
            if node.is_leaf() {
                return Ok(None);
            }
            page_id = node.child(i)?;
        }
    }

    /// All keys in ascending order.
    pub fn in_order(&self) -> Result<Vec<K>> {
        let mut out = Vec::new();
        self.collect_in_order(self.root, &mut out)?;
        Ok(out)
    }

    /// Number of keys stored. Walks the whole tree.
    pub fn len(&self) -> Result<usize> {
        self.count_keys(self.root)
    }

    /// True iff the tree holds no keys.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read(self.root)?.key_count() == 0)
    }

    /// Smallest key, or `None` for an empty tree.
    pub fn min(&self) -> Result<Option<K>> {
        if self.is_empty()? {
            return Ok(None);
        }
        self.subtree_min(self.root).map(Some)
    }

    /// Largest key, or `None` for an empty tree.
    pub fn max(&self) -> Result<Option<K>> {
        if self.is_empty()? {
            return Ok(None);
        }
        self.subtree_max(self.root).map(Some)
    }

    /// Edge distance from the root to the leaves (0 for a leaf root).
    ///
    /// All leaves sit at the same depth, so following the leftmost spine
    /// measures the whole tree.
    pub fn height(&self) -> Result<usize> {
        let mut height = 0;
        let mut page_id = self.root;
        loop {
            let node = self.read(page_id)?;
            if node.is_leaf() {
                return Ok(height);
            }
            page_id = node.child(0)?;
            height += 1;
        }
    }

    // ========================================================================
    // Public API: Mutation
    // ========================================================================

    /// Insert `key`.
    ///
    /// Proactive top-down splitting: a full root grows the tree by one
    /// level first, and every full node on the path is split before the
    /// descent enters it, so the insert always terminates at a leaf with
    /// room. At most one split (one page allocation) per level.
    ///
    /// # Errors
    /// Returns `Error::DuplicateKey` if the key is present and the tree
    /// was created with [`DuplicatePolicy::Reject`]. The failed call does
    /// not modify the tree.
    pub fn insert(&mut self, key: K) -> Result<()> {
        if self.policy == DuplicatePolicy::Reject && self.search(&key)?.is_some() {
            return Err(Error::DuplicateKey);
        }

        let root_id = self.root;
        let root = self.read(root_id)?;
        if root.key_count() == self.max_keys() {
            // Grow: the old root becomes the sole child of a fresh root,
            // then splits. This is the only way the tree gains height.
            let new_root_id = self.allocate()?;
            let mut new_root = Node::internal();
            new_root.push_child(root_id);
            self.split_child(new_root_id, &mut new_root, 0)?;
            self.root = new_root_id;
            self.insert_non_full(new_root_id, new_root, key)
        } else {
            self.insert_non_full(root_id, root, key)
        }
    }

    /// Delete `key`.
    ///
    /// One-level lookahead, inverted from insertion: every minimal
    /// (`t-1`-key) node on the path is topped up (by borrowing through
    /// the parent or merging with a sibling) before the descent enters
    /// it, so the removal itself always lands in a node that can afford
    /// to lose a key. A merge that empties the root shrinks the tree by
    /// one level.
    ///
    /// # Errors
    /// Returns `Error::KeyNotFound` if the key is absent. The failed call
    /// does not modify the tree.
    pub fn delete(&mut self, key: &K) -> Result<()> {
        // Read-only membership probe up front: the destructive descent
        // below restructures nodes as it goes, and a miss must leave the
        // tree untouched.
        if self.search(key)?.is_none() {
            return Err(Error::KeyNotFound);
        }

        let root = self.read(self.root)?;
        self.remove_from(self.root, root, key)?;

        // Shrink: a merge may have drained the root down to zero keys, in
        // which case its lone child is the new root.
        let root = self.read(self.root)?;
        if root.key_count() == 0 && !root.is_leaf() {
            self.root = root.child(0)?;
        }
        Ok(())
    }

    // ========================================================================
    // Public API: Introspection
    // ========================================================================

    /// Operation counters.
    pub fn stats(&self) -> &TreeStats {
        &self.stats
    }

    /// Page currently holding the root node.
    pub fn root_id(&self) -> PageId {
        self.root
    }

    /// The minimum degree fixed at construction.
    pub fn min_degree(&self) -> usize {
        self.t
    }

    /// The duplicate-key policy fixed at construction.
    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// The storage backend.
    pub fn store(&self) -> &S {
        &self.store
    }

    // ========================================================================
    // Internal: Backend access with stats
    // ========================================================================

    pub(crate) fn read(&self, page_id: PageId) -> Result<Node<K>> {
        let node = self.store.read_page(page_id)?;
        TreeStats::bump(&self.stats.pages_read);
        Ok(node)
    }

    fn write(&mut self, page_id: PageId, node: &Node<K>) -> Result<()> {
        self.store.write_page(page_id, node)?;
        TreeStats::bump(&self.stats.pages_written);
        Ok(())
    }

    fn allocate(&mut self) -> Result<PageId> {
        let page_id = self.store.allocate_page()?;
        TreeStats::bump(&self.stats.pages_allocated);
        Ok(page_id)
    }

    #[inline]
    fn max_keys(&self) -> usize {
        config::max_keys(self.t)
    }

    // ========================================================================
    // Internal: Insertion
    // ========================================================================

    /// Split the full child at `parent.children[i]`.
    ///
    /// The child's top `t-1` keys (and top `t` children, if internal) move
    /// to a freshly allocated right sibling; the median key moves up into
    /// the parent between the two halves. Writes back all three nodes.
    fn split_child(&mut self, parent_id: PageId, parent: &mut Node<K>, i: usize) -> Result<()> {
        let left_id = parent.child(i)?;
        let mut left = self.read(left_id)?;
        debug_assert_eq!(left.key_count(), self.max_keys(), "split needs a full child");

        let right_id = self.allocate()?;
        let mut right = if left.is_leaf() {
            Node::leaf()
        } else {
            Node::internal()
        };

        // Keys t..2t-1 go right, key t-1 (the median) goes up.
        right.extend_keys(left.split_off_keys(self.t)?);
        let median = left.remove_key(self.t - 1)?;
        if !left.is_leaf() {
            right.extend_children(left.split_off_children(self.t)?);
        }

        parent.insert_key(i, median)?;
        parent.insert_child(i + 1, right_id)?;

        self.write(left_id, &left)?;
        self.write(right_id, &right)?;
        self.write(parent_id, parent)?;
        TreeStats::bump(&self.stats.splits);
        Ok(())
    }

    /// Recursive insert step. `node` is never full when this is called.
    fn insert_non_full(&mut self, page_id: PageId, mut node: Node<K>, key: K) -> Result<()> {
        let mut i = node.upper_bound(&key);
        if node.is_leaf() {
            node.insert_key(i, key)?;
            return self.write(page_id, &node);
        }

        let child_id = node.child(i)?;
        let child = self.read(child_id)?;
        let (child_id, child) = if child.key_count() == self.max_keys() {
            self.split_child(page_id, &mut node, i)?;
            // The promoted median now sits at index i; an equal or larger
            // key belongs in the new right half.
            if *node.key(i)? <= key {
                i += 1;
            }
            let child_id = node.child(i)?;
            (child_id, self.read(child_id)?)
        } else {
            (child_id, child)
        };
        self.insert_non_full(child_id, child, key)
    }

    // ========================================================================
    // Internal: Deletion
    // ========================================================================

    /// Recursive delete step. `node` always has at least `t` keys when
    /// this is called, except at the root.
    fn remove_from(&mut self, page_id: PageId, node: Node<K>, key: &K) -> Result<()> {
        let (found, i) = node.search_keys(key);
        if found {
            if node.is_leaf() {
                self.remove_from_leaf(page_id, node, i)
            } else {
                self.remove_from_internal(page_id, node, i, key)
            }
        } else if node.is_leaf() {
            // Membership is probed before the descent starts, so a miss
            // here means the probe and the descent disagreed.
            Err(Error::KeyNotFound)
        } else {
            self.descend_and_remove(page_id, node, i, key)
        }
    }

    /// The key sits at `node.keys[i]` and `node` is a leaf: remove it
    /// directly. The descent discipline guarantees the node can afford
    /// the loss (or is the root, which has no lower bound).
    fn remove_from_leaf(&mut self, page_id: PageId, mut node: Node<K>, i: usize) -> Result<()> {
        node.remove_key(i)?;
        self.write(page_id, &node)
    }

    /// The key sits at `node.keys[i]` and `node` is internal.
    ///
    /// Replace it with its predecessor (if the left child has a spare
    /// key) or successor (if the right child does), then delete that
    /// stand-in from the corresponding subtree. When both neighbors are
    /// minimal, merge them around the key and retry inside the merged
    /// node, which then has `2t-1` keys.
    fn remove_from_internal(
        &mut self,
        page_id: PageId,
        mut node: Node<K>,
        i: usize,
        key: &K,
    ) -> Result<()> {
        let left_id = node.child(i)?;
        let left = self.read(left_id)?;
        if left.key_count() >= self.t {
            let pred = self.subtree_max(left_id)?;
            node.replace_key(i, pred.clone())?;
            self.write(page_id, &node)?;
            return self.remove_from(left_id, left, &pred);
        }

        let right_id = node.child(i + 1)?;
        let right = self.read(right_id)?;
        if right.key_count() >= self.t {
            let succ = self.subtree_min(right_id)?;
            node.replace_key(i, succ.clone())?;
            self.write(page_id, &node)?;
            return self.remove_from(right_id, right, &succ);
        }

        let merged = self.merge_children(page_id, &mut node, i, left, right)?;
        self.remove_from(left_id, merged, key)
    }

    /// The key lives somewhere below `node.children[i]`: top the child up
    /// if it is minimal, then descend.
    fn descend_and_remove(
        &mut self,
        page_id: PageId,
        mut node: Node<K>,
        i: usize,
        key: &K,
    ) -> Result<()> {
        let child_id = node.child(i)?;
        let child = self.read(child_id)?;
        if child.key_count() >= self.t {
            return self.remove_from(child_id, child, key);
        }

        let (next_id, next) = self.fill_child(page_id, &mut node, i, child_id, child)?;
        self.remove_from(next_id, next, key)
    }

    /// Bring the minimal child at `parent.children[i]` up to at least `t`
    /// keys, returning the node the descent should now enter.
    ///
    /// Order of preference: borrow from the left sibling, borrow from the
    /// right sibling, merge with the right sibling, merge with the left
    /// sibling (only when `i` is the last child).
    fn fill_child(
        &mut self,
        parent_id: PageId,
        parent: &mut Node<K>,
        i: usize,
        child_id: PageId,
        child: Node<K>,
    ) -> Result<(PageId, Node<K>)> {
        let left = if i > 0 {
            let left_id = parent.child(i - 1)?;
            let left = self.read(left_id)?;
            if left.key_count() >= self.t {
                return self.borrow_from_left(parent_id, parent, i, child_id, child, left_id, left);
            }
            Some((left_id, left))
        } else {
            None
        };

        if i + 1 < parent.child_count() {
            let right_id = parent.child(i + 1)?;
            let right = self.read(right_id)?;
            if right.key_count() >= self.t {
                return self.borrow_from_right(
                    parent_id, parent, i, child_id, child, right_id, right,
                );
            }
            let merged = self.merge_children(parent_id, parent, i, child, right)?;
            return Ok((child_id, merged));
        }

        // `i` is the last child and its left sibling is minimal.
        match left {
            Some((left_id, left)) => {
                let merged = self.merge_children(parent_id, parent, i - 1, left, child)?;
                Ok((left_id, merged))
            }
            None => unreachable!("internal node with a single child"),
        }
    }

    /// Rotate right through the parent: the left sibling's last key moves
    /// up to replace the separator, which moves down into `child`.
    #[allow(clippy::too_many_arguments)]
    fn borrow_from_left(
        &mut self,
        parent_id: PageId,
        parent: &mut Node<K>,
        i: usize,
        child_id: PageId,
        mut child: Node<K>,
        left_id: PageId,
        mut left: Node<K>,
    ) -> Result<(PageId, Node<K>)> {
        let moved_up = left.remove_key(left.key_count() - 1)?;
        let separator = parent.replace_key(i - 1, moved_up)?;
        child.insert_key(0, separator)?;
        if !left.is_leaf() {
            let moved_child = left.remove_child(left.child_count() - 1)?;
            child.insert_child(0, moved_child)?;
        }

        self.write(left_id, &left)?;
        self.write(child_id, &child)?;
        self.write(parent_id, parent)?;
        TreeStats::bump(&self.stats.borrows);
        Ok((child_id, child))
    }

    /// Rotate left through the parent: the right sibling's first key
    /// moves up to replace the separator, which moves down into `child`.
    #[allow(clippy::too_many_arguments)]
    fn borrow_from_right(
        &mut self,
        parent_id: PageId,
        parent: &mut Node<K>,
        i: usize,
        child_id: PageId,
        mut child: Node<K>,
        right_id: PageId,
        mut right: Node<K>,
    ) -> Result<(PageId, Node<K>)> {
        let moved_up = right.remove_key(0)?;
        let separator = parent.replace_key(i, moved_up)?;
        child.push_key(separator);
        if !right.is_leaf() {
            child.push_child(right.remove_child(0)?);
        }

        self.write(right_id, &right)?;
        self.write(child_id, &child)?;
        self.write(parent_id, parent)?;
        TreeStats::bump(&self.stats.borrows);
        Ok((child_id, child))
    }

    /// Fold `parent.keys[i]` and the right node into the left node,
    /// producing one node of `2t-1` keys. The right node's page becomes
    /// unreferenced; reclaiming it is the backend's concern.
    fn merge_children(
        &mut self,
        parent_id: PageId,
        parent: &mut Node<K>,
        i: usize,
        mut left: Node<K>,
        right: Node<K>,
    ) -> Result<Node<K>> {
        let left_id = parent.child(i)?;
        let separator = parent.remove_key(i)?;
        parent.remove_child(i + 1)?;

        left.push_key(separator);
        let (_, right_keys, right_children) = right.into_parts();
        left.extend_keys(right_keys);
        if !left.is_leaf() {
            left.extend_children(right_children);
        }

        self.write(left_id, &left)?;
        self.write(parent_id, parent)?;
        TreeStats::bump(&self.stats.merges);
        Ok(left)
    }

    // ========================================================================
    // Internal: Traversal helpers
    // ========================================================================

    /// Largest key in the subtree rooted at `page_id` (the last key of
    /// its rightmost leaf).
    fn subtree_max(&self, mut page_id: PageId) -> Result<K> {
        loop {
            let node = self.read(page_id)?;
            if node.is_leaf() {
                return node
                    .keys()
                    .last()
                    .cloned()
                    .ok_or(Error::IndexOutOfRange { index: 0, len: 0 });
            }
            page_id = node.child(node.key_count())?;
        }
    }

    /// Smallest key in the subtree rooted at `page_id` (the first key of
    /// its leftmost leaf).
    fn subtree_min(&self, mut page_id: PageId) -> Result<K> {
        loop {
            let node = self.read(page_id)?;
            if node.is_leaf() {
                return node
                    .keys()
                    .first()
                    .cloned()
                    .ok_or(Error::IndexOutOfRange { index: 0, len: 0 });
            }
            page_id = node.child(0)?;
        }
    }

    fn collect_in_order(&self, page_id: PageId, out: &mut Vec<K>) -> Result<()> {
        let node = self.read(page_id)?;
        if node.is_leaf() {
            out.extend_from_slice(node.keys());
            return Ok(());
        }
        for i in 0..node.key_count() {
            self.collect_in_order(node.child(i)?, out)?;
            out.push(node.key(i)?.clone());
        }
        self.collect_in_order(node.child(node.key_count())?, out)
    }

    fn count_keys(&self, page_id: PageId) -> Result<usize> {
        let node = self.read(page_id)?;
        let mut count = node.key_count();
        if !node.is_leaf() {
            for i in 0..node.child_count() {
                count += self.count_keys(node.child(i)?)?;
            }
        }
        Ok(count)
    }
}
