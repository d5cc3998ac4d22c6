use crate::geometry::Geometry;
use crate::rtree::Entry;

use super::{seeded_split, Group, SeedPicker, SplitContext, SplitStrategy};

/// Cheapest split: linear-time seeds, remaining entries taken from the end of
/// the pool with no cost comparison between them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearSplit;

/// Per axis: the entry with the highest low side and the entry with the
/// lowest high side, and those two coordinates.
struct Extremes {
    high_low: [(usize, f64); 2],
    low_high: [(usize, f64); 2],
}

fn extremes<T>(entries: &[Entry<T>]) -> Option<Extremes> {
    let first = entries.first()?;
    let mut ext = Extremes {
        high_low: [(0, first.bbox.min_x), (0, first.bbox.min_y)],
        low_high: [(0, first.bbox.max_x), (0, first.bbox.max_y)],
    };

    for (i, entry) in entries.iter().enumerate().skip(1) {
        let lows = [entry.bbox.min_x, entry.bbox.min_y];
        let highs = [entry.bbox.max_x, entry.bbox.max_y];
        for axis in 0..2 {
            if lows[axis] > ext.high_low[axis].1 {
                ext.high_low[axis] = (i, lows[axis]);
            }
            if highs[axis] < ext.low_high[axis].1 {
                ext.low_high[axis] = (i, highs[axis]);
            }
        }
    }
    Some(ext)
}

impl SeedPicker for LinearSplit {
    /// The pair most widely separated along either axis, with each axis
    /// scaled by the tree's extent so the axes compare fairly.
    fn pick_seeds<G: Geometry, T>(
        &self,
        ctx: &SplitContext<'_, G>,
        entries: &[Entry<T>],
    ) -> (usize, usize) {
        let Some(ext) = extremes(entries) else {
            return (0, 1);
        };

        let extent = [ctx.extent.width(), ctx.extent.height()];
        let mut spread = [0.0f64; 2];
        for axis in 0..2 {
            if extent[axis] > 0.0 {
                spread[axis] = (ext.high_low[axis].1 - ext.low_high[axis].1) / extent[axis];
            }
        }

        let x_seeds = (ext.high_low[0].0, ext.low_high[0].0);
        let y_seeds = (ext.high_low[1].0, ext.low_high[1].0);
        if spread[0] > spread[1] && x_seeds.0 != x_seeds.1 {
            x_seeds
        } else if spread[0] < spread[1] && y_seeds.0 != y_seeds.1 {
            y_seeds
        } else {
            (0, 1)
        }
    }

    fn pick_next<G: Geometry, T>(
        &self,
        _ctx: &SplitContext<'_, G>,
        _groups: &[Group<T>; 2],
        remaining: &mut Vec<Entry<T>>,
    ) -> Option<Entry<T>> {
        remaining.pop()
    }
}

impl SplitStrategy for LinearSplit {
    fn split<G: Geometry, T>(
        &self,
        ctx: &SplitContext<'_, G>,
        entries: Vec<Entry<T>>,
    ) -> (Group<T>, Group<T>) {
        seeded_split(self, ctx, entries)
    }
}
