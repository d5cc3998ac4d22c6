//! Deletion, underflow handling and reinsertion.

use arty_int_test::test_util::{
    assert_invariants, for_each_combination, random_boxes, run_test, seeded_rng, sorted_values,
    TreeScenario,
};
use arty_rtree::{Geometry, MatchType, Point, RTree, RTreeResult, RTreeStats, SplitStrategy};
use rand::seq::SliceRandom;

/// Twenty entries deleted one at a time, in a shuffled order.
struct DrainByUnderflow {
    order: Vec<usize>,
}

fn grid_box(i: usize) -> [Point; 2] {
    let x = (i % 5) as f64 * 3.0;
    let y = (i / 5) as f64 * 3.0;
    [Point::new(x, y), Point::new(x + 1.0, y + 1.0)]
}

impl TreeScenario for DrainByUnderflow {
    fn run<G: Geometry, S: SplitStrategy>(
        &self,
        name: &str,
        mut tree: RTree<usize, G, S>,
    ) -> RTreeResult<()> {
        for i in 0..20 {
            tree.add(i, &grid_box(i))?;
        }
        assert!(tree.height().unwrap_or(0) >= 2, "{}", name);
        assert_invariants(name, &tree)?;

        for (done, &i) in self.order.iter().enumerate() {
            let removed = tree.delete(&grid_box(i), Some(&i), MatchType::Equal)?;
            assert_eq!(removed, 1, "{}: deleting {}", name, i);
            assert_eq!(tree.len(), 19 - done, "{}", name);
            assert_invariants(name, &tree)?;

            for &j in &self.order[done + 1..] {
                let found = sorted_values(tree.get(&grid_box(j), None, MatchType::Equal)?);
                assert_eq!(found, vec![j], "{}: {} lost after deleting {}", name, j, i);
            }
        }

        assert!(tree.is_empty(), "{}", name);
        assert_eq!(tree.height(), None, "{}", name);
        Ok(())
    }
}

#[test]
fn test_underflow_during_deletes() {
    for seed in 0..4 {
        run_test(
            || {
                let mut order: Vec<usize> = (0..20).collect();
                order.shuffle(&mut seeded_rng(seed));
                Ok(DrainByUnderflow { order })
            },
            |scenario| for_each_combination(4, 2, &scenario),
        )
    }
}

struct DeleteMatchesQuery {
    boxes: Vec<[Point; 2]>,
    queries: Vec<[Point; 2]>,
}

impl TreeScenario for DeleteMatchesQuery {
    fn run<G: Geometry, S: SplitStrategy>(
        &self,
        name: &str,
        mut tree: RTree<usize, G, S>,
    ) -> RTreeResult<()> {
        for (i, corners) in self.boxes.iter().enumerate() {
            tree.add(i, corners)?;
        }

        let match_types = [
            MatchType::Intersects,
            MatchType::Contains,
            MatchType::Contained,
            MatchType::Equal,
        ];
        for (n, query) in self.queries.iter().enumerate() {
            let match_type = match_types[n % match_types.len()];
            let before = tree.len();
            let expected = tree.get(query, None, match_type)?.count();

            let removed = tree.delete(query, None, match_type)?;
            assert_eq!(removed, expected, "{}: {:?}", name, match_type);
            assert_eq!(tree.len(), before - removed, "{}", name);
            assert_eq!(tree.get(query, None, match_type)?.count(), 0, "{}", name);
            assert_invariants(name, &tree)?;
        }
        Ok(())
    }
}

#[test]
fn test_delete_count_matches_query() {
    run_test(
        || {
            let mut rng = seeded_rng(23);
            let boxes = random_boxes(&mut rng, 250, 40);
            let mut queries = random_boxes(&mut rng, 40, 40);
            // a few queries aimed exactly at stored boxes
            queries.extend(boxes.iter().step_by(25).copied());
            Ok(DeleteMatchesQuery { boxes, queries })
        },
        |scenario| for_each_combination(4, 2, &scenario),
    )
}

struct DeleteEverything {
    boxes: Vec<[Point; 2]>,
}

impl TreeScenario for DeleteEverything {
    fn run<G: Geometry, S: SplitStrategy>(
        &self,
        name: &str,
        mut tree: RTree<usize, G, S>,
    ) -> RTreeResult<()> {
        for (i, corners) in self.boxes.iter().enumerate() {
            tree.add(i, corners)?;
        }

        let everything = [Point::new(-80.0, -80.0), Point::new(80.0, 80.0)];
        let removed = tree.delete(&everything, None, MatchType::Contains)?;
        assert_eq!(removed, self.boxes.len(), "{}", name);

        assert!(tree.is_empty(), "{}", name);
        assert_eq!(tree.height(), None, "{}", name);
        assert_eq!(tree.stats(), RTreeStats::default(), "{}", name);
        assert!(tree.dump().is_empty(), "{}", name);
        assert_invariants(name, &tree)?;

        // still usable afterwards
        tree.add(1, &self.boxes[0])?;
        assert_eq!(tree.len(), 1, "{}", name);
        assert_invariants(name, &tree)
    }
}

#[test]
fn test_delete_all_returns_to_empty() {
    run_test(
        || {
            let mut rng = seeded_rng(3);
            Ok(DeleteEverything {
                boxes: random_boxes(&mut rng, 120, 50),
            })
        },
        |scenario| for_each_combination(4, 2, &scenario),
    )
}

struct DeleteByValue;

impl TreeScenario for DeleteByValue {
    fn run<G: Geometry, S: SplitStrategy>(
        &self,
        name: &str,
        mut tree: RTree<usize, G, S>,
    ) -> RTreeResult<()> {
        let shared = grid_box(7);
        for i in 0..12 {
            tree.add(100 + i, &grid_box(i))?;
        }
        tree.add(1, &shared)?;
        tree.add(2, &shared)?;

        let removed = tree.delete(&shared, Some(&1), MatchType::Equal)?;
        assert_eq!(removed, 1, "{}", name);
        assert_eq!(
            sorted_values(tree.get(&shared, None, MatchType::Equal)?),
            vec![2, 107],
            "{}",
            name
        );

        // a value that is not stored under that box removes nothing
        assert_eq!(tree.delete(&shared, Some(&1), MatchType::Equal)?, 0, "{}", name);
        assert_eq!(tree.delete(&shared, Some(&100), MatchType::Equal)?, 0, "{}", name);
        assert_eq!(tree.len(), 13, "{}", name);
        assert_invariants(name, &tree)
    }
}

#[test]
fn test_delete_with_value_filter() {
    run_test(|| Ok(DeleteByValue), |scenario| for_each_combination(4, 2, &scenario))
}
