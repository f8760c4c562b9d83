//! Configuration constants for pagetree.

/// Smallest legal minimum degree.
///
/// A minimum degree of 2 gives the 2-3-4 tree: every node holds 1..=3 keys
/// and internal nodes fan out to 2..=4 children. Below that the structure
/// degenerates (a node could hold zero keys), so construction rejects it.
pub const MIN_DEGREE_FLOOR: usize = 2;

/// Default minimum degree when the caller has no opinion.
///
/// Chosen so that a node of `u64` keys plus child ids fills most of a 4KB
/// storage page:
/// - 2×32-1 = 63 keys × 8 bytes ≈ 504 bytes of keys
/// - 2×32 = 64 children × 4 bytes = 256 bytes of child ids
///
/// Real deployments should size this from their own key width and page
/// size; the tree itself only requires `t >= 2`.
pub const DEFAULT_MIN_DEGREE: usize = 32;

/// Maximum keys a node may hold for minimum degree `t` (2t-1).
#[inline]
pub const fn max_keys(t: usize) -> usize {
    2 * t - 1
}

/// Minimum keys a non-root node must hold for minimum degree `t` (t-1).
#[inline]
pub const fn min_keys(t: usize) -> usize {
    t - 1
}

/// Maximum children an internal node may hold for minimum degree `t` (2t).
#[inline]
pub const fn max_children(t: usize) -> usize {
    2 * t
}
