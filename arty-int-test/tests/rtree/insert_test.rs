//! Insertion, splitting and construction checks.

use arty_int_test::test_util::{
    assert_invariants, for_each_combination, random_boxes, run_test, seeded_rng, TreeScenario,
};
use arty_rtree::{
    Geometry, LatLon, MatchType, Point, RTree, RTreeBuilder, RTreeError, RTreeResult,
    SplitStrategy,
};

struct FifthInsertSplits;

impl TreeScenario for FifthInsertSplits {
    fn run<G: Geometry, S: SplitStrategy>(
        &self,
        name: &str,
        mut tree: RTree<usize, G, S>,
    ) -> RTreeResult<()> {
        let corners = [(0.0, 0.0), (10.0, 0.0), (0.0, 10.0), (10.0, 10.0)];
        for (i, &(x, y)) in corners.iter().enumerate() {
            tree.add(i, &[Point::new(x, y)])?;
        }
        assert_eq!(tree.height(), Some(0), "{}", name);
        assert_eq!(tree.stats().nodes, 1, "{}", name);

        tree.add(4, &[Point::new(5.0, 5.0)])?;
        let stats = tree.stats();
        assert_eq!(tree.height(), Some(1), "{}", name);
        assert_eq!(stats.nodes, 3, "{}", name);
        assert_eq!(stats.leaf_nodes, 2, "{}", name);
        assert_invariants(name, &tree)
    }
}

#[test]
fn test_fifth_insert_splits_root() {
    run_test(
        || Ok(FifthInsertSplits),
        |scenario| for_each_combination(4, 2, &scenario),
    )
}

struct GrowRandomly {
    boxes: Vec<[Point; 2]>,
}

impl TreeScenario for GrowRandomly {
    fn run<G: Geometry, S: SplitStrategy>(
        &self,
        name: &str,
        mut tree: RTree<usize, G, S>,
    ) -> RTreeResult<()> {
        for (i, corners) in self.boxes.iter().enumerate() {
            tree.add(i, corners)?;
            if i % 25 == 0 {
                assert_invariants(name, &tree)?;
            }
        }
        assert_eq!(tree.len(), self.boxes.len(), "{}", name);
        assert_invariants(name, &tree)?;

        let stats = tree.stats();
        assert_eq!(stats.entries, self.boxes.len(), "{}", name);
        assert!(stats.leaf_nodes >= self.boxes.len() / tree.config().max_entries());
        Ok(())
    }
}

#[test]
fn test_invariants_hold_while_growing() {
    for (max_entries, min_entries) in [(4, 2), (5, 1), (6, 3), (8, 2)] {
        run_test(
            || {
                let mut rng = seeded_rng(max_entries as u64 * 31 + min_entries as u64);
                Ok(GrowRandomly {
                    boxes: random_boxes(&mut rng, 300, 60),
                })
            },
            |scenario| for_each_combination(max_entries, min_entries, &scenario),
        )
    }
}

struct Duplicates;

impl TreeScenario for Duplicates {
    fn run<G: Geometry, S: SplitStrategy>(
        &self,
        name: &str,
        mut tree: RTree<usize, G, S>,
    ) -> RTreeResult<()> {
        let key = [Point::new(1.0, 1.0), Point::new(2.0, 3.0)];
        for _ in 0..10 {
            tree.add(42, &key)?;
        }
        tree.add(7, &key)?;
        assert_invariants(name, &tree)?;

        assert_eq!(tree.len(), 11, "{}", name);
        assert_eq!(tree.get(&key, None, MatchType::Equal)?.count(), 11, "{}", name);
        assert_eq!(tree.get(&key, Some(&42), MatchType::Equal)?.count(), 10, "{}", name);
        assert_eq!(tree.keys().len(), 1, "{}", name);
        Ok(())
    }
}

#[test]
fn test_duplicates_are_stored() {
    run_test(|| Ok(Duplicates), |scenario| for_each_combination(4, 2, &scenario))
}

#[test]
fn test_invalid_configuration() {
    let too_high = RTreeBuilder::new().max_entries(4).min_entries(3).build::<usize>();
    assert!(matches!(too_high, Err(RTreeError::InvalidConfiguration(_))));

    let too_low = RTreeBuilder::new().max_entries(4).min_entries(0).build::<usize>();
    assert!(matches!(too_low, Err(RTreeError::InvalidConfiguration(_))));

    let too_wide = RTreeBuilder::new()
        .max_entries(32)
        .geometry(LatLon::new())
        .split(arty_rtree::ExhaustiveSplit)
        .build::<usize>();
    assert!(matches!(too_wide, Err(RTreeError::InvalidConfiguration(_))));
}

#[test]
fn test_empty_points_rejected() {
    let mut tree: RTree<usize> = RTree::new();
    assert!(matches!(
        tree.add(1, &[]),
        Err(RTreeError::InvalidOperation(_))
    ));
    assert!(tree.is_empty());
}
