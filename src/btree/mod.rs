//! B-tree index structure.
//!
//! # Components
//! - [`BTree`] - The tree: search, insert, delete over a page backend
//! - [`Node`] - One node page: keys, child ids, positional accessors
//! - [`DuplicatePolicy`] - What `insert` does with an equal key
//! - [`TreeStats`] - Page-traffic and restructure counters
//! - [`TreeSummary`] - Result of a full structural audit ([`BTree::verify`])

mod node;
mod stats;
mod tree;
mod verify;

pub use node::Node;
pub use stats::{StatsSnapshot, TreeStats};
pub use tree::{BTree, DuplicatePolicy};
pub use verify::TreeSummary;
