//! Thread-safe handle to an R-Tree.
//!
//! [`RTree`] itself has no interior locking. [`SharedRTree`] wraps one in a
//! reader-writer lock: mutations take the write lock, while any number of
//! readers may walk the tree at once through [`SharedRTree::read`].

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use crate::geometry::{Cartesian, Geometry, Point};
use crate::rtree::{Found, MatchType, RTree, RTreeResult, RTreeStats};
use crate::split::{QuadraticSplit, SplitStrategy};

/// A query result detached from the tree it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Collected<V> {
    Value(V),
    Key(Point, Point),
}

impl<V: Clone> From<Found<'_, V>> for Collected<V> {
    fn from(found: Found<'_, V>) -> Self {
        match found {
            Found::Value(value) => Collected::Value(value.clone()),
            Found::Key(lo, hi) => Collected::Key(lo, hi),
        }
    }
}

/// Cloneable, lock-guarded handle to an [`RTree`].
///
/// Clones share the same tree.
pub struct SharedRTree<V, G = Cartesian, S = QuadraticSplit> {
    inner: Arc<RwLock<RTree<V, G, S>>>,
}

impl<V, G, S> Clone for SharedRTree<V, G, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V, G, S> From<RTree<V, G, S>> for SharedRTree<V, G, S> {
    fn from(tree: RTree<V, G, S>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(tree)),
        }
    }
}

impl<V, G, S> Default for SharedRTree<V, G, S>
where
    G: Geometry + Default,
    S: SplitStrategy + Default,
{
    fn default() -> Self {
        Self::from(RTree::default())
    }
}

impl<V, G: Geometry, S: SplitStrategy> SharedRTree<V, G, S> {
    pub fn new(tree: RTree<V, G, S>) -> Self {
        Self::from(tree)
    }

    pub fn add(&self, value: V, points: &[Point]) -> RTreeResult<()> {
        self.inner.write().add(value, points)
    }

    pub fn delete(
        &self,
        points: &[Point],
        value: Option<&V>,
        match_type: MatchType,
    ) -> RTreeResult<usize>
    where
        V: PartialEq,
    {
        self.inner.write().delete(points, value, match_type)
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn stats(&self) -> RTreeStats {
        self.inner.read().stats()
    }

    /// Shared access to the tree. Writers block until the guard is dropped,
    /// so lazy queries run against the guard cannot observe a mutation.
    pub fn read(&self) -> RwLockReadGuard<'_, RTree<V, G, S>> {
        self.inner.read()
    }

    /// Run a query to completion under the read lock.
    pub fn get_collected(
        &self,
        points: &[Point],
        value: Option<&V>,
        match_type: MatchType,
    ) -> RTreeResult<Vec<Collected<V>>>
    where
        V: Clone + PartialEq,
    {
        let tree = self.inner.read();
        let collected: Vec<Collected<V>> = tree
            .get(points, value, match_type)?
            .map(Collected::from)
            .collect();
        Ok(collected)
    }
}
