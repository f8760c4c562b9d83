//! Storage layer - the page backend seam.
//!
//! The tree never touches a disk directly. Every node fetch, write-back,
//! and allocation goes through the [`PageStore`] trait:
//! - [`PageStore`] - The backend contract
//! - [`MemoryStore`] - In-memory arena backend
//! - [`SharedStore`] - Mutex adapter so several trees share one backend

mod memory;
mod shared;
mod store;

pub use memory::MemoryStore;
pub use shared::SharedStore;
pub use store::PageStore;
