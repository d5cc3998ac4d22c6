//! Constants for the in-memory R-Tree.

/// Default fan-out cap. Small values keep the quadratic and exhaustive
/// splits cheap; 4-8 is a good range for in-memory use.
pub const DEFAULT_MAX_ENTRIES: usize = 4;

/// Largest fan-out accepted by the exhaustive split, whose search visits up
/// to `2^max_entries` assignments per split.
pub const EXHAUSTIVE_SPLIT_LIMIT: usize = 16;
