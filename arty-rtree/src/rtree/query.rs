//! Lazy traversal of the tree: filtered queries and full leaf scans.

use crate::bounding_box::BoundingBox;
use crate::geometry::{Geometry, Point};

use super::rtree_types::{Entry, Node};

/// How a query box is compared against stored boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MatchType {
    /// Stored box identical to the query box
    #[default]
    Equal,
    /// Query box contained in the stored box
    Contained,
    /// Query box contains the stored box
    Contains,
    /// Query box and stored box overlap (touching counts)
    Intersects,
}

/// One result of [`RTree::get`](crate::RTree::get).
///
/// A plain query yields the stored values. A query filtered on a value
/// yields the stored boxes instead, as the value is already known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Found<'a, V> {
    Value(&'a V),
    Key(Point, Point),
}

impl<'a, V> Found<'a, V> {
    pub fn value(&self) -> Option<&'a V> {
        match self {
            Found::Value(value) => Some(value),
            Found::Key(..) => None,
        }
    }

    pub fn key(&self) -> Option<(Point, Point)> {
        match self {
            Found::Value(_) => None,
            Found::Key(lo, hi) => Some((*lo, *hi)),
        }
    }
}

/// Lazy sequence of the entries matching a query.
///
/// Holds a shared borrow of the tree, so the tree cannot be modified while
/// the sequence is alive.
pub struct Matches<'a, V, G> {
    geometry: &'a G,
    query: BoundingBox,
    value: Option<&'a V>,
    match_type: MatchType,
    /// Nodes being walked, with the index of the next entry to look at
    stack: Vec<(&'a Node<V>, usize)>,
}

impl<'a, V: PartialEq, G: Geometry> Matches<'a, V, G> {
    pub(crate) fn new(
        root: Option<&'a Node<V>>,
        geometry: &'a G,
        query: BoundingBox,
        value: Option<&'a V>,
        match_type: MatchType,
    ) -> Self {
        Self {
            geometry,
            query,
            value,
            match_type,
            stack: root.map(|node| (node, 0)).into_iter().collect(),
        }
    }

    /// Whether any match can live beneath an internal entry.
    fn descend(&self, bbox: &BoundingBox) -> bool {
        match self.match_type {
            MatchType::Equal | MatchType::Contained => self.geometry.contains(bbox, &self.query),
            MatchType::Contains | MatchType::Intersects => {
                self.geometry.intersects(bbox, &self.query)
            }
        }
    }

    fn accept(&self, entry: &Entry<V>) -> bool {
        if let Some(value) = self.value {
            if *value != entry.item {
                return false;
            }
        }
        match self.match_type {
            MatchType::Equal => entry.bbox == self.query,
            MatchType::Contained => self.geometry.contains(&entry.bbox, &self.query),
            MatchType::Contains => self.geometry.contains(&self.query, &entry.bbox),
            MatchType::Intersects => self.geometry.intersects(&self.query, &entry.bbox),
        }
    }

    /// Next matching leaf entry, with its box still in normalized space.
    pub(crate) fn next_entry(&mut self) -> Option<&'a Entry<V>> {
        loop {
            let (node, index) = self.stack.last_mut()?;
            let node: &'a Node<V> = node;
            let i = *index;
            *index += 1;

            match node {
                Node::Leaf(entries) => match entries.get(i) {
                    Some(entry) => {
                        if self.accept(entry) {
                            return Some(entry);
                        }
                    }
                    None => {
                        self.stack.pop();
                    }
                },
                Node::Internal { children, .. } => match children.get(i) {
                    Some(child) => {
                        if self.descend(&child.bbox) {
                            self.stack.push((&child.item, 0));
                        }
                    }
                    None => {
                        self.stack.pop();
                    }
                },
            }
        }
    }
}

impl<'a, V: PartialEq, G: Geometry> Iterator for Matches<'a, V, G> {
    type Item = Found<'a, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.next_entry()?;
        if self.value.is_some() {
            let (lo, hi) = self.geometry.to_corners(&entry.bbox);
            Some(Found::Key(lo, hi))
        } else {
            Some(Found::Value(&entry.item))
        }
    }
}

/// Every leaf entry beneath a node, in storage order.
pub(crate) struct Leaves<'a, V> {
    pending: Vec<&'a Node<V>>,
    current: std::slice::Iter<'a, Entry<V>>,
}

impl<'a, V> Leaves<'a, V> {
    pub(crate) fn new(root: Option<&'a Node<V>>) -> Self {
        Self {
            pending: root.into_iter().collect(),
            current: [].iter(),
        }
    }
}

impl<'a, V> Iterator for Leaves<'a, V> {
    type Item = &'a Entry<V>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.current.next() {
                return Some(entry);
            }
            match self.pending.pop()? {
                Node::Leaf(entries) => self.current = entries.iter(),
                Node::Internal { children, .. } => self
                    .pending
                    .extend(children.iter().rev().map(|child| &child.item)),
            }
        }
    }
}
