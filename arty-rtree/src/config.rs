//! Construction parameters for an R-Tree.

use crate::geometry::{Cartesian, Geometry};
use crate::rtree::rtree_constants::DEFAULT_MAX_ENTRIES;
use crate::rtree::{RTree, RTreeError, RTreeResult};
use crate::split::{QuadraticSplit, SplitStrategy};

/// Fan-out bounds for every node of a tree.
///
/// Fixed for the lifetime of the tree. Every node except the root holds
/// between `min_entries` and `max_entries` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RTreeConfig {
    max_entries: usize,
    min_entries: usize,
}

impl Default for RTreeConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            min_entries: DEFAULT_MAX_ENTRIES / 2,
        }
    }
}

impl RTreeConfig {
    /// Validated bounds. `min_entries` defaults to `max_entries / 2`.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if `min_entries` is above `max_entries / 2`
    /// or below 1.
    pub fn new(max_entries: usize, min_entries: Option<usize>) -> RTreeResult<Self> {
        let config = Self {
            max_entries,
            min_entries: min_entries.unwrap_or(max_entries / 2),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn min_entries(&self) -> usize {
        self.min_entries
    }

    pub fn validate(&self) -> RTreeResult<()> {
        if self.min_entries > self.max_entries / 2 {
            log::error!(
                "Min number of entries in a node is too high ({} > {} / 2)",
                self.min_entries,
                self.max_entries
            );
            return Err(RTreeError::InvalidConfiguration(format!(
                "min entries {} is more than half of max entries {}",
                self.min_entries, self.max_entries
            )));
        }
        if self.min_entries < 1 {
            log::error!("Min number of entries in a node is too low ({})", self.min_entries);
            return Err(RTreeError::InvalidConfiguration(format!(
                "min entries must be at least 1 (got {})",
                self.min_entries
            )));
        }
        Ok(())
    }
}

/// Builder for creating and configuring an [`RTree`].
///
/// # Examples
///
/// ```rust
/// use arty_rtree::{LatLon, LinearSplit, Point, RTreeBuilder};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut tree = RTreeBuilder::new()
///     .max_entries(8)
///     .min_entries(3)
///     .geometry(LatLon::new())
///     .split(LinearSplit)
///     .build()?;
///
/// tree.add("ferry", &[Point::new(174.8, -36.8), Point::new(-179.5, -36.9)])?;
/// assert_eq!(tree.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RTreeBuilder<G = Cartesian, S = QuadraticSplit> {
    max_entries: usize,
    min_entries: Option<usize>,
    geometry: G,
    split: S,
}

impl Default for RTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RTreeBuilder {
    /// A builder for a Cartesian tree with quadratic splits and the default
    /// fan-out.
    pub fn new() -> Self {
        RTreeBuilder {
            max_entries: DEFAULT_MAX_ENTRIES,
            min_entries: None,
            geometry: Cartesian,
            split: QuadraticSplit,
        }
    }
}

impl<G: Geometry, S: SplitStrategy> RTreeBuilder<G, S> {
    /// Maximum number of entries per node.
    pub fn max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Minimum number of entries per non-root node. Defaults to half of
    /// `max_entries`.
    pub fn min_entries(mut self, min_entries: usize) -> Self {
        self.min_entries = Some(min_entries);
        self
    }

    /// Coordinate system of the tree.
    pub fn geometry<H: Geometry>(self, geometry: H) -> RTreeBuilder<H, S> {
        RTreeBuilder {
            max_entries: self.max_entries,
            min_entries: self.min_entries,
            geometry,
            split: self.split,
        }
    }

    /// Node splitting algorithm of the tree.
    pub fn split<T: SplitStrategy>(self, split: T) -> RTreeBuilder<G, T> {
        RTreeBuilder {
            max_entries: self.max_entries,
            min_entries: self.min_entries,
            geometry: self.geometry,
            split,
        }
    }

    /// Validates the parameters and creates an empty tree.
    pub fn build<V>(self) -> RTreeResult<RTree<V, G, S>> {
        let config = RTreeConfig::new(self.max_entries, self.min_entries)?;
        RTree::with_config(config, self.geometry, self.split)
    }
}
