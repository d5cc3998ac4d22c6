//! Core types and data structures for the R-Tree.
//!
//! This module defines the fundamental types used throughout the tree:
//! - Error types and result types
//! - Entry and node types (leaf and internal)
//! - Orphans displaced by deletion
//! - Statistics structures

use thiserror::Error;

use crate::bounding_box::BoundingBox;
use crate::geometry::Geometry;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur in R-Tree operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RTreeError {
    /// Rejected construction parameters.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A call that cannot be honoured with the given arguments.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// The structure does not satisfy its own invariants.
    #[error("Inconsistent tree: {0}")]
    Inconsistent(String),
}

/// Result type for R-Tree operations
pub type RTreeResult<T> = Result<T, RTreeError>;

// ============================================================================
// Statistics
// ============================================================================

/// Snapshot of the shape of a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RTreeStats {
    /// Number of stored (box, value) pairs
    pub entries: usize,
    /// Height of the root, `None` for an empty tree
    pub height: Option<usize>,
    /// Total number of nodes
    pub nodes: usize,
    /// Number of leaf nodes
    pub leaf_nodes: usize,
}

/// One line of [`RTree::dump`](crate::RTree::dump).
///
/// Boxes are in the tree's normalized plane. `value` is set for leaf entries
/// only.
#[derive(Debug, Clone, PartialEq)]
pub struct DumpLine<'a, V> {
    pub height: usize,
    pub bbox: BoundingBox,
    pub value: Option<&'a V>,
}

// ============================================================================
// Node Types
// ============================================================================

/// A box paired with its payload: a stored value in a leaf, a child node in
/// an internal node.
#[derive(Debug, Clone)]
pub struct Entry<T> {
    pub bbox: BoundingBox,
    pub item: T,
}

impl<T> Entry<T> {
    pub fn new(bbox: BoundingBox, item: T) -> Self {
        Self { bbox, item }
    }
}

/// Node types in the R-Tree
#[derive(Debug, Clone)]
pub enum Node<V> {
    /// Leaf node (height 0) containing stored values
    Leaf(Vec<Entry<V>>),
    /// Internal node containing child nodes exactly one level lower
    Internal {
        height: usize,
        children: Vec<Entry<Node<V>>>,
    },
}

impl<V> Node<V> {
    /// Distance to the leaves; leaves are 0.
    pub fn height(&self) -> usize {
        match self {
            Node::Leaf(_) => 0,
            Node::Internal { height, .. } => *height,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Node::Leaf(entries) => entries.len(),
            Node::Internal { children, .. } => children.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Union of the entry boxes, `None` for an empty node.
    pub fn compute_bbox<G: Geometry>(&self, geometry: &G) -> Option<BoundingBox> {
        match self {
            Node::Leaf(entries) => geometry.box_of_boxes(entries.iter().map(|e| &e.bbox)),
            Node::Internal { children, .. } => {
                geometry.box_of_boxes(children.iter().map(|c| &c.bbox))
            }
        }
    }

    /// Consume the node, returning every leaf entry beneath it.
    pub fn into_leaves(self) -> Vec<Entry<V>> {
        let mut leaves = Vec::new();
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            match node {
                Node::Leaf(entries) => leaves.extend(entries),
                Node::Internal { children, .. } => {
                    pending.extend(children.into_iter().map(|c| c.item))
                }
            }
        }
        leaves
    }
}

/// Entries displaced from an underflowing node, awaiting reinsertion.
#[derive(Debug)]
pub enum Orphan<V> {
    /// A single stored value, reinserted at height 0
    Value(Entry<V>),
    /// A whole subtree, reinserted one level above its own height
    Subtree(Entry<Node<V>>),
}

impl<V> Orphan<V> {
    /// Height of the node this orphan has to be inserted into.
    pub fn target_height(&self) -> usize {
        match self {
            Orphan::Value(_) => 0,
            Orphan::Subtree(entry) => entry.item.height() + 1,
        }
    }

    pub fn bbox(&self) -> &BoundingBox {
        match self {
            Orphan::Value(entry) => &entry.bbox,
            Orphan::Subtree(entry) => &entry.bbox,
        }
    }
}
