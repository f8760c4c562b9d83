//! Error types for pagetree.

use thiserror::Error;

use crate::common::config::MIN_DEGREE_FLOOR;
use crate::common::PageId;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write
/// `Result<T>`. This is a common Rust pattern (see `std::io::Result`).
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in pagetree.
///
/// By having a single error type, error handling stays consistent across
/// the tree core and the storage backends. The taxonomy splits into:
/// - construction-time (`InvalidDegree`),
/// - caller-reported lookup failures (`KeyNotFound`, `DuplicateKey`),
/// - backend inconsistency (`PageNotFound`), which indicates corrupted
///   storage and is not recoverable at the tree layer,
/// - programming errors (`IndexOutOfRange`), never reachable through the
///   public API.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Minimum degree below the structural floor.
    ///
    /// A B-tree needs `t >= 2` so that every split produces two nodes with
    /// at least one key each.
    #[error("invalid minimum degree {0}, must be at least {MIN_DEGREE_FLOOR}")]
    InvalidDegree(usize),

    /// `delete` was asked for a key the tree does not hold.
    ///
    /// The tree is left unmodified.
    #[error("key not found")]
    KeyNotFound,

    /// `insert` was asked to add a key the tree already holds while the
    /// tree's duplicate policy rejects duplicates.
    #[error("duplicate key")]
    DuplicateKey,

    /// Requested page does not exist in the storage backend.
    #[error("page {0} not found")]
    PageNotFound(PageId),

    /// Positional node accessor called with an out-of-bounds index.
    ///
    /// This indicates a bug in the tree logic, not a user error.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}
