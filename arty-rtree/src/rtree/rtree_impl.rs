//! In-memory R-Tree implementation.

use std::collections::BTreeSet;
use std::fmt::Debug;

use crate::bounding_box::BoundingBox;
use crate::config::RTreeConfig;
use crate::geometry::{Cartesian, Geometry, Point};
use crate::split::{best_fit, QuadraticSplit, SplitContext, SplitStrategy};

use super::query::{Leaves, MatchType, Matches};
use super::rtree_types::{
    DumpLine, Entry, Node, Orphan, RTreeError, RTreeResult, RTreeStats,
};

/// The two halves of a node that overflowed, to be folded into its parent.
type Overflow<V> = Option<(Entry<Node<V>>, Entry<Node<V>>)>;

/// An in-memory R-Tree mapping bounding boxes to values.
///
/// Every value is stored under the box of the points it was added with.
/// The same (box, value) pair may be stored any number of times. Box
/// arithmetic is delegated to the [`Geometry`] `G` and overflowing nodes are
/// divided by the [`SplitStrategy`] `S`; both are fixed when the tree is
/// created.
#[derive(Debug, Clone)]
pub struct RTree<V, G = Cartesian, S = QuadraticSplit> {
    config: RTreeConfig,
    geometry: G,
    split: S,
    root: Option<Node<V>>,
    /// Number of stored values
    size: usize,
}

impl<V> RTree<V> {
    /// An empty Cartesian tree with quadratic splits and the default fan-out.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<V, G, S> Default for RTree<V, G, S>
where
    G: Geometry + Default,
    S: SplitStrategy + Default,
{
    fn default() -> Self {
        Self {
            config: RTreeConfig::default(),
            geometry: G::default(),
            split: S::default(),
            root: None,
            size: 0,
        }
    }
}

impl<V, G: Geometry, S: SplitStrategy> RTree<V, G, S> {
    /// Create an empty tree with explicit parameters.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if the fan-out bounds are invalid or the split
    /// strategy cannot handle `max_entries`.
    pub fn with_config(config: RTreeConfig, geometry: G, split: S) -> RTreeResult<Self> {
        config.validate()?;
        split.validate(config.max_entries())?;
        log::debug!(
            "Created R-Tree with {}..={} entries per node",
            config.min_entries(),
            config.max_entries()
        );

        Ok(Self {
            config,
            geometry,
            split,
            root: None,
            size: 0,
        })
    }

    pub fn config(&self) -> &RTreeConfig {
        &self.config
    }

    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Height of the root, `None` for an empty tree.
    pub fn height(&self) -> Option<usize> {
        self.root.as_ref().map(Node::height)
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Lazily find the entries whose box relates to the box of `points` as
    /// `match_type` requires.
    ///
    /// Without a value filter the stored values are yielded. With one, only
    /// entries holding an equal value match, and their boxes are yielded.
    pub fn get<'a>(
        &'a self,
        points: &[Point],
        value: Option<&'a V>,
        match_type: MatchType,
    ) -> RTreeResult<Matches<'a, V, G>>
    where
        V: PartialEq,
    {
        let query = self.box_of(points)?;
        log::trace!("Query {:?} {}", match_type, query);
        Ok(Matches::new(
            self.root.as_ref(),
            &self.geometry,
            query,
            value,
            match_type,
        ))
    }

    /// Whether some entry is stored under exactly the box of `points`.
    pub fn contains_key(&self, points: &[Point]) -> RTreeResult<bool>
    where
        V: PartialEq,
    {
        Ok(self.get(points, None, MatchType::Equal)?.next().is_some())
    }

    /// Every stored (box, value) pair, boxes as denormalized corners.
    pub fn items(&self) -> impl Iterator<Item = ((Point, Point), &V)> + '_ {
        Leaves::new(self.root.as_ref())
            .map(move |entry| (self.geometry.to_corners(&entry.bbox), &entry.item))
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        Leaves::new(self.root.as_ref()).map(|entry| &entry.item)
    }

    /// The distinct stored boxes, as denormalized corners.
    pub fn keys(&self) -> Vec<(Point, Point)> {
        let distinct: BTreeSet<&BoundingBox> =
            Leaves::new(self.root.as_ref()).map(|entry| &entry.bbox).collect();
        distinct
            .into_iter()
            .map(|bbox| self.geometry.to_corners(bbox))
            .collect()
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Store `value` under the box of `points`.
    pub fn add(&mut self, value: V, points: &[Point]) -> RTreeResult<()> {
        let bbox = self.box_of(points)?;
        log::trace!("Add {}", bbox);
        self.insert_orphan(Orphan::Value(Entry::new(bbox, value)))?;
        self.size += 1;
        Ok(())
    }

    /// Remove every entry [`get`](RTree::get) would find with the same
    /// arguments, returning how many were removed.
    pub fn delete(
        &mut self,
        points: &[Point],
        value: Option<&V>,
        match_type: MatchType,
    ) -> RTreeResult<usize>
    where
        V: PartialEq,
    {
        let query = self.box_of(points)?;
        let targets: Vec<BoundingBox> = {
            let mut matches = Matches::new(
                self.root.as_ref(),
                &self.geometry,
                query.clone(),
                value,
                match_type,
            );
            let mut targets = Vec::new();
            while let Some(entry) = matches.next_entry() {
                targets.push(entry.bbox.clone());
            }
            targets
        };

        log::trace!("Delete {:?} {}: {} matches", match_type, query, targets.len());
        for target in &targets {
            self.remove_entry(target, value)?;
        }
        Ok(targets.len())
    }

    /// Drop every entry. The geometry keeps any state it has built up.
    pub fn clear(&mut self) {
        log::debug!("Clearing R-Tree with {} entries", self.size);
        self.root = None;
        self.size = 0;
    }

    // ------------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------------

    /// Pre-order listing of the structure.
    ///
    /// The first line is the box of the whole tree at `root height + 1`,
    /// followed by one line per entry of every node.
    pub fn dump(&self) -> Vec<DumpLine<'_, V>> {
        let mut lines = Vec::new();
        if let Some(root) = &self.root {
            if let Some(bbox) = root.compute_bbox(&self.geometry) {
                lines.push(DumpLine {
                    height: root.height() + 1,
                    bbox,
                    value: None,
                });
            }
            dump_node(root, &mut lines);
        }
        lines
    }

    /// Write [`dump`](RTree::dump) to the debug log.
    pub fn log_structure(&self)
    where
        V: Debug,
    {
        for line in self.dump() {
            let indent = " ".repeat(10usize.saturating_sub(line.height));
            match line.value {
                Some(value) => {
                    log::debug!("{:2} {}{} {:?}", line.height, indent, line.bbox, value)
                }
                None => log::debug!("{:2} {}{}", line.height, indent, line.bbox),
            }
        }
    }

    pub fn stats(&self) -> RTreeStats {
        let mut stats = RTreeStats {
            entries: self.size,
            height: self.height(),
            ..RTreeStats::default()
        };

        let mut pending: Vec<&Node<V>> = self.root.iter().collect();
        while let Some(node) = pending.pop() {
            stats.nodes += 1;
            match node {
                Node::Leaf(_) => stats.leaf_nodes += 1,
                Node::Internal { children, .. } => {
                    pending.extend(children.iter().map(|child| &child.item))
                }
            }
        }
        stats
    }

    /// Verify the structural invariants of the whole tree.
    ///
    /// Checks the fan-out bounds of every node, that every internal box is
    /// the exact union of its child's boxes, that heights drop by one per
    /// level, that no stored box is inverted, and that the size counter
    /// matches the stored values.
    pub fn check_consistency(&self) -> RTreeResult<()> {
        let Some(root) = &self.root else {
            if self.size != 0 {
                return Err(inconsistent(format!(
                    "empty root with size {}",
                    self.size
                )));
            }
            return Ok(());
        };

        let leaves = self.check_node(root, true)?;
        if leaves != self.size {
            return Err(inconsistent(format!(
                "unexpected number of leaves ({} != {})",
                leaves, self.size
            )));
        }
        Ok(())
    }

    fn check_node(&self, node: &Node<V>, is_root: bool) -> RTreeResult<usize> {
        let height = node.height();
        if node.is_empty() {
            return Err(inconsistent(format!("empty node at height {}", height)));
        }
        if !is_root && node.len() < self.config.min_entries() {
            return Err(inconsistent(format!(
                "too few children at height {} ({} < {})",
                height,
                node.len(),
                self.config.min_entries()
            )));
        }
        if node.len() > self.config.max_entries() {
            return Err(inconsistent(format!(
                "too many children at height {} ({} > {})",
                height,
                node.len(),
                self.config.max_entries()
            )));
        }

        match node {
            Node::Leaf(entries) => {
                if let Some(entry) = entries.iter().find(|entry| !entry.bbox.is_valid()) {
                    return Err(inconsistent(format!("inverted box {} in a leaf", entry.bbox)));
                }
                Ok(entries.len())
            }
            Node::Internal { children, .. } => {
                let mut leaves = 0;
                for child in children {
                    if child.item.height() + 1 != height {
                        return Err(inconsistent(format!(
                            "child at height {} below node at height {}",
                            child.item.height(),
                            height
                        )));
                    }
                    let exact = child.item.compute_bbox(&self.geometry);
                    if exact.as_ref() != Some(&child.bbox) {
                        return Err(inconsistent(format!(
                            "stale box {} at height {} (expected {:?})",
                            child.bbox, height, exact
                        )));
                    }
                    leaves += self.check_node(&child.item, false)?;
                }
                Ok(leaves)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn box_of(&self, points: &[Point]) -> RTreeResult<BoundingBox> {
        let normalized: Vec<Point> = points
            .iter()
            .map(|point| self.geometry.normalize(*point))
            .collect();
        self.geometry.box_of_points(&normalized).ok_or_else(|| {
            log::error!("Cannot build a bounding box without points");
            RTreeError::InvalidOperation("at least one point is required".into())
        })
    }

    /// Insert a value at the leaves or a subtree at the height above its own.
    fn insert_orphan(&mut self, orphan: Orphan<V>) -> RTreeResult<()> {
        let target = orphan.target_height();

        let root = match self.root.as_mut() {
            Some(root) => root,
            None => {
                return match orphan {
                    Orphan::Value(entry) => {
                        self.root = Some(Node::Leaf(vec![entry]));
                        Ok(())
                    }
                    Orphan::Subtree(_) => Err(invalid_operation(format!(
                        "cannot insert at height {} into an empty tree",
                        target
                    ))),
                };
            }
        };

        if target > root.height() {
            return Err(invalid_operation(format!(
                "cannot insert at height {} into a tree of height {}",
                target,
                root.height()
            )));
        }

        let ops = NodeOps {
            config: &self.config,
            geometry: &self.geometry,
            split: &self.split,
        };
        let extent = match root.compute_bbox(ops.geometry) {
            Some(bbox) => ops.geometry.union(&bbox, orphan.bbox()),
            None => orphan.bbox().clone(),
        };

        if let Some((a, b)) = ops.insert(root, target, orphan, &extent)? {
            let height = a.item.height() + 1;
            log::debug!("Root split, tree height is now {}", height);
            *root = Node::Internal {
                height,
                children: vec![a, b],
            };
        }
        Ok(())
    }

    /// Structurally remove one leaf entry and repair the tree around it.
    fn remove_entry(&mut self, bbox: &BoundingBox, value: Option<&V>) -> RTreeResult<()>
    where
        V: PartialEq,
    {
        let removal = {
            let ops = NodeOps {
                config: &self.config,
                geometry: &self.geometry,
                split: &self.split,
            };
            match self.root.as_mut() {
                Some(root) => ops.remove(root, bbox, value, true),
                None => None,
            }
        };

        let Some(removal) = removal else {
            return Err(inconsistent(format!(
                "matched entry at {} could not be located",
                bbox
            )));
        };

        self.size -= 1;
        self.shrink_root();
        self.reinsert(removal.orphans)
    }

    /// Drop an empty root and collapse single-child internal roots.
    fn shrink_root(&mut self) {
        loop {
            match self.root.take() {
                Some(node) if node.is_empty() => {
                    log::debug!("Last entry removed, tree is empty");
                    return;
                }
                Some(Node::Internal { children, .. }) if children.len() == 1 => {
                    self.root = children.into_iter().next().map(|child| child.item);
                    log::debug!("Root collapsed, tree height is now {:?}", self.height());
                }
                root => {
                    self.root = root;
                    return;
                }
            }
        }
    }

    fn reinsert(&mut self, orphans: Vec<Orphan<V>>) -> RTreeResult<()> {
        if orphans.is_empty() {
            return Ok(());
        }
        log::debug!("Reinserting {} orphans", orphans.len());

        for orphan in orphans {
            let height = self.height().unwrap_or(0);
            match orphan {
                // too tall for what is left of the tree
                Orphan::Subtree(entry) if entry.item.height() >= height => {
                    let leaves = entry.item.into_leaves();
                    log::debug!(
                        "Flattening orphaned subtree into {} entries",
                        leaves.len()
                    );
                    for leaf in leaves {
                        self.insert_orphan(Orphan::Value(leaf))?;
                    }
                }
                orphan => self.insert_orphan(orphan)?,
            }
        }
        Ok(())
    }
}

fn dump_node<'a, V>(node: &'a Node<V>, lines: &mut Vec<DumpLine<'a, V>>) {
    match node {
        Node::Leaf(entries) => {
            for entry in entries {
                lines.push(DumpLine {
                    height: 0,
                    bbox: entry.bbox.clone(),
                    value: Some(&entry.item),
                });
            }
        }
        Node::Internal { height, children } => {
            for child in children {
                lines.push(DumpLine {
                    height: *height,
                    bbox: child.bbox.clone(),
                    value: None,
                });
                dump_node(&child.item, lines);
            }
        }
    }
}

fn inconsistent(message: String) -> RTreeError {
    log::error!("Inconsistent R-Tree: {}", message);
    RTreeError::Inconsistent(message)
}

fn invalid_operation(message: String) -> RTreeError {
    log::error!("Invalid R-Tree operation: {}", message);
    RTreeError::InvalidOperation(message)
}

// ============================================================================
// Node Operations
// ============================================================================

/// Outcome of a structural removal beneath some node.
struct Removal<V> {
    /// The node the removal ran on fell below `min_entries` and was emptied
    underflow: bool,
    orphans: Vec<Orphan<V>>,
}

/// The recursive halves of insertion and removal, borrowing only the parts
/// of the tree they need so the root can be borrowed mutably alongside.
struct NodeOps<'t, G, S> {
    config: &'t RTreeConfig,
    geometry: &'t G,
    split: &'t S,
}

impl<G: Geometry, S: SplitStrategy> NodeOps<'_, G, S> {
    /// Insert `orphan` into the node at `target` height beneath `node`.
    ///
    /// Returns the two halves of `node` when it overflowed; `node` is left
    /// empty and the caller replaces it.
    fn insert<V>(
        &self,
        node: &mut Node<V>,
        target: usize,
        orphan: Orphan<V>,
        extent: &BoundingBox,
    ) -> RTreeResult<Overflow<V>> {
        match node {
            Node::Leaf(entries) => match orphan {
                Orphan::Value(entry) => {
                    entries.push(entry);
                    Ok(self.split_if_full(0, entries, extent, Node::Leaf))
                }
                Orphan::Subtree(_) => Err(inconsistent("subtree orphan reached a leaf".into())),
            },
            Node::Internal { height, children } => {
                let height = *height;
                if height == target {
                    let Orphan::Subtree(entry) = orphan else {
                        return Err(inconsistent(format!(
                            "value orphan aimed at height {}",
                            height
                        )));
                    };
                    children.push(entry);
                    return Ok(self.split_if_full(height, children, extent, |entries| {
                        Node::Internal {
                            height,
                            children: entries,
                        }
                    }));
                }

                let bbox = orphan.bbox().clone();
                let candidates = children
                    .iter()
                    .map(|child| (&child.bbox, child.item.len()));
                let Some((index, merged)) = best_fit(self.geometry, candidates, &bbox, height)
                else {
                    return Err(inconsistent(format!(
                        "internal node at height {} has no children",
                        height
                    )));
                };
                children[index].bbox = merged;

                let Some((a, b)) = self.insert(&mut children[index].item, target, orphan, extent)?
                else {
                    return Ok(None);
                };
                children.remove(index);
                children.push(a);
                children.push(b);
                Ok(self.split_if_full(height, children, extent, |entries| {
                    Node::Internal {
                        height,
                        children: entries,
                    }
                }))
            }
        }
    }

    fn split_if_full<T, V, F>(
        &self,
        height: usize,
        entries: &mut Vec<Entry<T>>,
        extent: &BoundingBox,
        wrap: F,
    ) -> Overflow<V>
    where
        F: Fn(Vec<Entry<T>>) -> Node<V>,
    {
        if entries.len() <= self.config.max_entries() {
            return None;
        }

        let ctx = SplitContext {
            geometry: self.geometry,
            min_entries: self.config.min_entries(),
            height,
            extent,
        };
        let (a, b) = self.split.split(&ctx, std::mem::take(entries));
        log::debug!(
            "Split node at height {} into {} + {} entries",
            height,
            a.len(),
            b.len()
        );
        Some((Entry::new(a.bbox, wrap(a.entries)), Entry::new(b.bbox, wrap(b.entries))))
    }

    /// Remove the first leaf entry under `node` stored at exactly `bbox`
    /// (and holding `value`, when given). `None` if there is none.
    ///
    /// A non-root node left below `min_entries` is emptied into orphans and
    /// reported as underflowed so its parent drops it.
    fn remove<V: PartialEq>(
        &self,
        node: &mut Node<V>,
        bbox: &BoundingBox,
        value: Option<&V>,
        is_root: bool,
    ) -> Option<Removal<V>> {
        let min = self.config.min_entries();

        match node {
            Node::Leaf(entries) => {
                let index = entries.iter().position(|entry| {
                    entry.bbox == *bbox && value.map_or(true, |v| *v == entry.item)
                })?;
                entries.remove(index);

                if !is_root && entries.len() < min {
                    log::debug!("Leaf underflowed, orphaning {} entries", entries.len());
                    return Some(Removal {
                        underflow: true,
                        orphans: entries.drain(..).map(Orphan::Value).collect(),
                    });
                }
                Some(Removal {
                    underflow: false,
                    orphans: Vec::new(),
                })
            }
            Node::Internal { height, children } => {
                for i in 0..children.len() {
                    if !self.geometry.contains(&children[i].bbox, bbox) {
                        continue;
                    }
                    let Some(mut removal) = self.remove(&mut children[i].item, bbox, value, false)
                    else {
                        continue;
                    };

                    if removal.underflow {
                        children.remove(i);
                        if !is_root && children.len() < min {
                            log::debug!(
                                "Node at height {} underflowed, orphaning {} subtrees",
                                height,
                                children.len()
                            );
                            removal
                                .orphans
                                .extend(children.drain(..).map(Orphan::Subtree));
                            return Some(removal);
                        }
                    } else if let Some(exact) = children[i].item.compute_bbox(self.geometry) {
                        children[i].bbox = exact;
                    }

                    removal.underflow = false;
                    return Some(removal);
                }
                None
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
