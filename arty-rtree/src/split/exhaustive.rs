use crate::bounding_box::BoundingBox;
use crate::geometry::Geometry;
use crate::rtree::rtree_constants::EXHAUSTIVE_SPLIT_LIMIT;
use crate::rtree::{Entry, RTreeError, RTreeResult};

use super::{Group, SplitContext, SplitStrategy};

/// Considers every valid assignment of entries to the two groups and keeps
/// the one with the smallest combined area, counting any overlap once.
///
/// Exact, but the search is exponential in fan-out, so trees using it are
/// limited to `max_entries <= EXHAUSTIVE_SPLIT_LIMIT`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExhaustiveSplit;

/// A partial assignment: entries `0..depth` are placed, bit `i` of `mask`
/// set means entry `i` went to the second group.
struct Frame {
    depth: usize,
    mask: u64,
    ones: usize,
    bbox0: Option<BoundingBox>,
    bbox1: Option<BoundingBox>,
}

fn widen<G: Geometry>(geometry: &G, bbox: &Option<BoundingBox>, with: &BoundingBox) -> BoundingBox {
    match bbox {
        Some(bbox) => geometry.union(bbox, with),
        None => with.clone(),
    }
}

/// Area covered by both boxes, with their overlap counted once.
fn covered_area<G: Geometry>(
    geometry: &G,
    bbox0: &Option<BoundingBox>,
    bbox1: &Option<BoundingBox>,
) -> f64 {
    match (bbox0, bbox1) {
        (None, None) => 0.0,
        (Some(a), None) | (None, Some(a)) => geometry.area(a),
        (Some(a), Some(b)) => {
            let overlap = geometry
                .intersection(a, b)
                .map_or(0.0, |i| geometry.area(&i));
            geometry.area(a) + geometry.area(b) - overlap
        }
    }
}

impl ExhaustiveSplit {
    /// Depth-first search over assignments with an explicit stack.
    ///
    /// Entry 0 is pinned to the first group: swapping the groups never
    /// changes the cost, so the mirrored half of the space is skipped.
    fn best_mask<G: Geometry, T>(&self, ctx: &SplitContext<'_, G>, entries: &[Entry<T>]) -> u64 {
        let Some(first) = entries.first() else {
            return 0;
        };
        let n = entries.len();
        let geometry = ctx.geometry;
        let mut best: Option<(f64, u64)> = None;

        let mut stack = vec![Frame {
            depth: 1,
            mask: 0,
            ones: 0,
            bbox0: Some(first.bbox.clone()),
            bbox1: None,
        }];

        while let Some(frame) = stack.pop() {
            let remain = n - frame.depth;
            let zeros = frame.depth - frame.ones;
            if zeros + remain < ctx.min_entries || frame.ones + remain < ctx.min_entries {
                continue;
            }

            if frame.depth == n {
                let area = covered_area(geometry, &frame.bbox0, &frame.bbox1);
                if best.map_or(true, |(a, _)| area < a) {
                    best = Some((area, frame.mask));
                }
                continue;
            }

            let bbox = &entries[frame.depth].bbox;
            // pushed second so the first group is explored first
            stack.push(Frame {
                depth: frame.depth + 1,
                mask: frame.mask | (1 << frame.depth),
                ones: frame.ones + 1,
                bbox0: frame.bbox0.clone(),
                bbox1: Some(widen(geometry, &frame.bbox1, bbox)),
            });
            stack.push(Frame {
                depth: frame.depth + 1,
                mask: frame.mask,
                ones: frame.ones,
                bbox0: Some(widen(geometry, &frame.bbox0, bbox)),
                bbox1: frame.bbox1,
            });
        }

        best.map_or(0, |(_, mask)| mask)
    }
}

impl SplitStrategy for ExhaustiveSplit {
    fn split<G: Geometry, T>(
        &self,
        ctx: &SplitContext<'_, G>,
        entries: Vec<Entry<T>>,
    ) -> (Group<T>, Group<T>) {
        let mask = self.best_mask(ctx, &entries);

        let mut sides: [Vec<Entry<T>>; 2] = [Vec::new(), Vec::new()];
        for (i, entry) in entries.into_iter().enumerate() {
            let side = ((mask >> i) & 1) as usize;
            sides[side].push(entry);
        }

        let [left, right] = sides;
        (into_group(ctx.geometry, left), into_group(ctx.geometry, right))
    }

    fn validate(&self, max_entries: usize) -> RTreeResult<()> {
        if max_entries > EXHAUSTIVE_SPLIT_LIMIT {
            log::error!(
                "Exhaustive split supports at most {} entries per node, got {}",
                EXHAUSTIVE_SPLIT_LIMIT,
                max_entries
            );
            return Err(RTreeError::InvalidConfiguration(format!(
                "exhaustive split supports at most {} entries per node (got {})",
                EXHAUSTIVE_SPLIT_LIMIT, max_entries
            )));
        }
        Ok(())
    }
}

fn into_group<G: Geometry, T>(geometry: &G, entries: Vec<Entry<T>>) -> Group<T> {
    let bbox = geometry
        .box_of_boxes(entries.iter().map(|e| &e.bbox))
        .unwrap_or_default();
    Group { bbox, entries }
}
