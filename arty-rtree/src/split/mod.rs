//! Node splitting algorithms.
//!
//! When an insertion leaves a node with `max_entries + 1` entries the tree
//! hands those entries to a [`SplitStrategy`], which divides them into two
//! groups that each hold at least `min_entries`. Three strategies trade
//! construction cost against how tight the resulting boxes are:
//!
//! - [`LinearSplit`]: linear seed pick, no cost comparison between entries.
//! - [`QuadraticSplit`]: Guttman's quadratic seeds and next-entry choice.
//! - [`ExhaustiveSplit`]: tries every valid two-colouring, exact but
//!   exponential in fan-out.

mod exhaustive;
mod linear;
mod quadratic;

pub use exhaustive::ExhaustiveSplit;
pub use linear::LinearSplit;
pub use quadratic::QuadraticSplit;

use crate::bounding_box::BoundingBox;
use crate::geometry::Geometry;
use crate::rtree::{Entry, RTreeResult};

/// Everything a split needs to know about the tree it runs in.
pub struct SplitContext<'a, G> {
    pub geometry: &'a G,
    pub min_entries: usize,
    /// Height of the node being split
    pub height: usize,
    /// Box of the whole tree, including the entry that caused the overflow
    pub extent: &'a BoundingBox,
}

/// One side of a split: its entries and their exact union.
#[derive(Debug, Clone)]
pub struct Group<T> {
    pub bbox: BoundingBox,
    pub entries: Vec<Entry<T>>,
}

impl<T> Group<T> {
    /// A group started from a single seed entry.
    pub fn seed(entry: Entry<T>) -> Self {
        Self {
            bbox: entry.bbox.clone(),
            entries: vec![entry],
        }
    }

    /// Adds entries, widening the group's box to cover them.
    pub fn absorb<G, I>(&mut self, geometry: &G, entries: I)
    where
        G: Geometry,
        I: IntoIterator<Item = Entry<T>>,
    {
        for entry in entries {
            self.bbox = geometry.union(&self.bbox, &entry.bbox);
            self.entries.push(entry);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Divides an overflowing node's entries into two groups.
pub trait SplitStrategy {
    /// Partition `entries` (there are `max_entries + 1` of them) into two
    /// groups, each holding at least `ctx.min_entries`. Every input entry
    /// ends up in exactly one group.
    fn split<G: Geometry, T>(
        &self,
        ctx: &SplitContext<'_, G>,
        entries: Vec<Entry<T>>,
    ) -> (Group<T>, Group<T>);

    /// Rejects fan-outs this strategy cannot handle.
    fn validate(&self, _max_entries: usize) -> RTreeResult<()> {
        Ok(())
    }
}

/// Picks the candidate whose box grows least when `bbox` is added.
///
/// Ties go to the smaller resulting area and then, above the leaves only,
/// to the candidate holding fewer entries. Remaining ties keep the first
/// candidate. Returns the winning index and its enlarged box.
pub(crate) fn best_fit<'a, G, I>(
    geometry: &G,
    candidates: I,
    bbox: &BoundingBox,
    height: usize,
) -> Option<(usize, BoundingBox)>
where
    G: Geometry,
    I: IntoIterator<Item = (&'a BoundingBox, usize)>,
{
    let mut best: Option<(usize, BoundingBox, f64, f64, usize)> = None;

    for (i, (candidate, len)) in candidates.into_iter().enumerate() {
        let merged = geometry.union(candidate, bbox);
        let area = geometry.area(&merged);
        let delta = area - geometry.area(candidate);

        let better = match &best {
            None => true,
            Some((_, _, best_area, best_delta, best_len)) => {
                delta < *best_delta
                    || (delta == *best_delta && area < *best_area)
                    || (delta == *best_delta
                        && area == *best_area
                        && height > 0
                        && len < *best_len)
            }
        };

        if better {
            best = Some((i, merged, area, delta, len));
        }
    }

    best.map(|(i, merged, ..)| (i, merged))
}

/// Seed selection and next-entry choice for the seed-then-distribute splits.
pub(crate) trait SeedPicker {
    /// Indices of the two entries that start the groups. Must differ.
    fn pick_seeds<G: Geometry, T>(
        &self,
        ctx: &SplitContext<'_, G>,
        entries: &[Entry<T>],
    ) -> (usize, usize);

    /// Removes and returns the next entry to place.
    fn pick_next<G: Geometry, T>(
        &self,
        ctx: &SplitContext<'_, G>,
        groups: &[Group<T>; 2],
        remaining: &mut Vec<Entry<T>>,
    ) -> Option<Entry<T>>;
}

/// Shared skeleton: seed two groups, then place the rest one at a time.
///
/// Once a group can only reach `min_entries` by taking everything left, the
/// whole pool goes to it.
pub(crate) fn seeded_split<P, G, T>(
    picker: &P,
    ctx: &SplitContext<'_, G>,
    mut entries: Vec<Entry<T>>,
) -> (Group<T>, Group<T>)
where
    P: SeedPicker,
    G: Geometry,
{
    let (i, j) = picker.pick_seeds(ctx, &entries);
    let (lo, hi) = if i < j { (i, j) } else { (j, i) };
    let second = entries.remove(hi);
    let first = entries.remove(lo);
    let mut groups = [Group::seed(first), Group::seed(second)];

    while !entries.is_empty() {
        if let Some(needy) = groups
            .iter()
            .position(|g| g.len() + entries.len() <= ctx.min_entries)
        {
            groups[needy].absorb(ctx.geometry, entries.drain(..));
            break;
        }

        let Some(entry) = picker.pick_next(ctx, &groups, &mut entries) else {
            break;
        };

        let candidates = groups.iter().map(|g| (&g.bbox, g.len()));
        let (index, merged) = best_fit(ctx.geometry, candidates, &entry.bbox, ctx.height)
            .unwrap_or_else(|| (0, ctx.geometry.union(&groups[0].bbox, &entry.bbox)));
        groups[index].bbox = merged;
        groups[index].entries.push(entry);
    }

    let [a, b] = groups;
    (a, b)
}
