//! The page backend contract.

use crate::btree::Node;
use crate::common::{PageId, Result};

/// Storage backend for B-tree node pages.
///
/// The tree addresses nodes exclusively through opaque [`PageId`]s handed
/// out by `allocate_page`; it never assumes anything about how a backend
/// lays pages out. This keeps the tree core testable against
/// [`MemoryStore`](crate::storage::MemoryStore) and swappable for a real
/// pager without touching tree logic.
///
/// # Contract
/// - `allocate_page` never fails under normal operation (storage is assumed
///   unbounded at this layer).
/// - `read_page` fails with [`Error::PageNotFound`](crate::Error) for an id
///   the backend never allocated.
/// - A page reads back exactly the node most recently written to it.
/// - Pages that the tree stops referencing (after a merge or a root shrink)
///   are the backend's to reclaim; the tree never frees them itself.
pub trait PageStore<K> {
    /// Allocate a fresh page and return its id.
    fn allocate_page(&mut self) -> Result<PageId>;

    /// Fetch the node stored at `page_id`.
    ///
    /// # Errors
    /// Returns `Error::PageNotFound` if the page was never allocated or
    /// never written.
    fn read_page(&self, page_id: PageId) -> Result<Node<K>>;

    /// Store `node` at `page_id`, replacing any previous content.
    ///
    /// # Errors
    /// Returns `Error::PageNotFound` if the page was never allocated.
    fn write_page(&mut self, page_id: PageId, node: &Node<K>) -> Result<()>;
}
