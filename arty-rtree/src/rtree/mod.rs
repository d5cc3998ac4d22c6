//! In-memory R-Tree with pluggable geometry and node splitting.
//!
//! The tree is a height-indexed hierarchy of nodes:
//! - Leaves (height 0) hold (box, value) entries
//! - Internal nodes hold (box, child) entries, each box the exact union of
//!   the child's entries
//! - Every node except the root holds `min_entries..=max_entries` entries
//!
//! Insertion descends by least enlargement and splits overflowing nodes on
//! the way back up. Deletion removes the exact matched entry, dissolves
//! underflowing nodes and reinserts what they held.

pub mod rtree_constants;
pub mod rtree_types;
mod query;
mod rtree_impl;

pub use query::{Found, MatchType, Matches};
pub use rtree_constants::{DEFAULT_MAX_ENTRIES, EXHAUSTIVE_SPLIT_LIMIT};
pub use rtree_impl::RTree;
pub use rtree_types::{DumpLine, Entry, Node, Orphan, RTreeError, RTreeResult, RTreeStats};
