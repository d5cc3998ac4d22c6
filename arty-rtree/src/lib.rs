//! # Arty R-Tree - In-Memory Spatial Index
//!
//! A 2D R-Tree mapping bounding boxes to values, with a pluggable coordinate
//! system and a pluggable node splitting algorithm.
//!
//! ## Features
//!
//! - **Rich Matching**: Equal, Contained, Contains and Intersects queries
//! - **Duplicates**: The same (box, value) pair may be stored many times
//! - **Lazy Queries**: Results are produced while walking the tree
//! - **Pluggable Geometry**: Planar coordinates or longitude / latitude with
//!   antimeridian-safe normalization
//! - **Pluggable Splits**: Linear, quadratic or exhaustive node splitting
//! - **Self-Checking**: Structural consistency check for tests and debugging
//! - **Shared Access**: Lock-guarded handle for use across threads
//!
//! ## Quick Start
//!
//! ```rust
//! use arty_rtree::{MatchType, Point, RTree};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut tree = RTree::new();
//! tree.add("wharf", &[Point::new(0.0, 0.0), Point::new(10.0, 10.0)])?;
//! tree.add("jetty", &[Point::new(20.0, 20.0)])?;
//!
//! let hits: Vec<_> = tree
//!     .get(&[Point::new(5.0, 5.0), Point::new(25.0, 25.0)], None, MatchType::Intersects)?
//!     .filter_map(|found| found.value().copied())
//!     .collect();
//! assert_eq!(hits.len(), 2);
//!
//! let removed = tree.delete(&[Point::new(20.0, 20.0)], None, MatchType::Equal)?;
//! assert_eq!(removed, 1);
//! tree.check_consistency()?;
//! # Ok(())
//! # }
//! ```

pub mod bounding_box;
pub mod config;
pub mod geometry;
pub mod rtree;
pub mod shared;
pub mod split;

pub use bounding_box::BoundingBox;
pub use config::{RTreeBuilder, RTreeConfig};
pub use geometry::{Cartesian, Geometry, LatLon, Point};
pub use rtree::{
    DumpLine, Found, MatchType, Matches, RTree, RTreeError, RTreeResult, RTreeStats,
};
pub use shared::{Collected, SharedRTree};
pub use split::{ExhaustiveSplit, LinearSplit, QuadraticSplit, SplitStrategy};

// The six concrete combinations of geometry and split strategy
pub type CartesianLinearRTree<V> = RTree<V, Cartesian, LinearSplit>;
pub type CartesianQuadraticRTree<V> = RTree<V, Cartesian, QuadraticSplit>;
pub type CartesianExhaustiveRTree<V> = RTree<V, Cartesian, ExhaustiveSplit>;
pub type LatLonLinearRTree<V> = RTree<V, LatLon, LinearSplit>;
pub type LatLonQuadraticRTree<V> = RTree<V, LatLon, QuadraticSplit>;
pub type LatLonExhaustiveRTree<V> = RTree<V, LatLon, ExhaustiveSplit>;
