//! Shared backend adapter.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::btree::Node;
use crate::common::{PageId, Result};
use crate::storage::PageStore;

/// A cloneable [`PageStore`] handle that serializes access to one backend.
///
/// Several trees (say, a table's secondary indexes) can each hold a
/// `SharedStore` clone and allocate pages out of the same underlying
/// store. Every backend call takes the mutex for its duration, so the
/// single-writer contract of the inner store is preserved.
///
/// # Usage
/// ```
/// use pagetree::{BTree, MemoryStore, SharedStore};
///
/// let store = SharedStore::new(MemoryStore::new());
/// let mut by_id: BTree<u64, _> = BTree::create(2, store.clone()).unwrap();
/// let mut by_age: BTree<u64, _> = BTree::create(2, store).unwrap();
///
/// by_id.insert(1).unwrap();
/// by_age.insert(34).unwrap();
/// ```
#[derive(Debug, Default)]
pub struct SharedStore<S> {
    inner: Arc<Mutex<S>>,
}

impl<S> SharedStore<S> {
    /// Wrap a backend for shared use.
    pub fn new(store: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Run `f` against the inner store.
    ///
    /// Lets callers reach backend-specific methods (e.g.
    /// [`MemoryStore::page_count`](crate::storage::MemoryStore::page_count))
    /// without unwrapping the handle.
    pub fn with<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.inner.lock())
    }
}

impl<S> Clone for SharedStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, S: PageStore<K>> PageStore<K> for SharedStore<S> {
    fn allocate_page(&mut self) -> Result<PageId> {
        self.inner.lock().allocate_page()
    }

    fn read_page(&self, page_id: PageId) -> Result<Node<K>> {
        self.inner.lock().read_page(page_id)
    }

    fn write_page(&mut self, page_id: PageId, node: &Node<K>) -> Result<()> {
        self.inner.lock().write_page(page_id, node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_clones_share_one_arena() {
        let mut a: SharedStore<MemoryStore<u32>> = SharedStore::new(MemoryStore::new());
        let mut b = a.clone();

        let p0 = a.allocate_page().unwrap();
        let p1 = b.allocate_page().unwrap();

        // Ids come from the same sequence, not two independent arenas.
        assert_eq!(p0, PageId::new(0));
        assert_eq!(p1, PageId::new(1));
        assert_eq!(a.with(|s| s.page_count()), 2);
    }

    #[test]
    fn test_write_visible_through_other_handle() {
        let mut a: SharedStore<MemoryStore<u32>> = SharedStore::new(MemoryStore::new());
        let b = a.clone();

        let pid = a.allocate_page().unwrap();
        let mut node = Node::leaf();
        node.insert_key(0, 9).unwrap();
        a.write_page(pid, &node).unwrap();

        assert_eq!(b.read_page(pid).unwrap(), node);
    }
}
