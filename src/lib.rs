//! pagetree - A disk-oriented B-tree index with swappable storage backends.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                           pagetree                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                 Tree Core (btree/)                       │   │
//! │  │   BTree: search │ proactive-split insert │ full delete   │   │
//! │  │   Node accessors + TreeStats + invariant verifier        │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │        Storage Seam (storage/)  [Swappable]             │   │
//! │  │   PageStore trait: allocate_page | read_page | write     │   │
//! │  │   ┌──────────────┐   ┌────────────────────────────┐     │   │
//! │  │   │ MemoryStore  │   │ SharedStore<S> (Mutex)     │     │   │
//! │  │   └──────────────┘   └────────────────────────────┘     │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │            (a real pager/buffer pool plugs in here)             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every tree node occupies one backend page, addressed by an opaque
//! [`PageId`]. The tree restructures on the way down: it splits full
//! nodes before inserts descend into them and tops up minimal nodes
//! before deletes do, so no operation ever backtracks and no node
//! stores a parent pointer.
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, Error, config)
//! - [`storage`] - The page backend trait and the shipped backends
//! - [`btree`] - The tree core
//!
//! # Quick Start
//! ```
//! use pagetree::{BTree, MemoryStore};
//!
//! let mut tree: BTree<u64, _> = BTree::create(2, MemoryStore::new()).unwrap();
//!
//! tree.insert(10).unwrap();
//! tree.insert(20).unwrap();
//! tree.insert(5).unwrap();
//!
//! assert_eq!(tree.in_order().unwrap(), vec![5, 10, 20]);
//! assert!(tree.search(&10).unwrap().is_some());
//!
//! tree.delete(&10).unwrap();
//! assert!(tree.search(&10).unwrap().is_none());
//! ```

pub mod btree;
pub mod common;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::{DEFAULT_MIN_DEGREE, MIN_DEGREE_FLOOR};
pub use common::{Error, PageId, Result};

pub use btree::{BTree, DuplicatePolicy, Node, StatsSnapshot, TreeStats, TreeSummary};
pub use storage::{MemoryStore, PageStore, SharedStore};
