//! Query semantics across every match type.

use arty_int_test::test_util::{
    for_each_combination, random_boxes, run_test, seeded_rng, sorted_values, TreeScenario,
};
use arty_rtree::{Found, Geometry, MatchType, Point, RTree, RTreeResult, SplitStrategy};

struct RoundTrip {
    boxes: Vec<[Point; 2]>,
}

impl TreeScenario for RoundTrip {
    fn run<G: Geometry, S: SplitStrategy>(
        &self,
        name: &str,
        mut tree: RTree<usize, G, S>,
    ) -> RTreeResult<()> {
        for (i, corners) in self.boxes.iter().enumerate() {
            tree.add(i, corners)?;
        }

        for (i, corners) in self.boxes.iter().enumerate() {
            let found = sorted_values(tree.get(corners, None, MatchType::Equal)?);
            assert!(found.contains(&i), "{}: {} not found under its own box", name, i);

            // corners given in the other order describe the same box
            let reversed = [corners[1], corners[0]];
            assert!(tree.contains_key(&reversed)?, "{}", name);

            let keys: Vec<Found<'_, usize>> =
                tree.get(corners, Some(&i), MatchType::Equal)?.collect();
            assert_eq!(keys, vec![Found::Key(corners[0], corners[1])], "{}", name);
        }
        Ok(())
    }
}

#[test]
fn test_insert_then_query_round_trip() {
    run_test(
        || {
            let mut rng = seeded_rng(11);
            Ok(RoundTrip {
                boxes: random_boxes(&mut rng, 150, 50),
            })
        },
        |scenario| for_each_combination(4, 2, &scenario),
    )
}

/// Four boxes with known relations to the query box (10, 10)-(20, 20).
struct KnownLayout;

impl TreeScenario for KnownLayout {
    fn run<G: Geometry, S: SplitStrategy>(
        &self,
        name: &str,
        mut tree: RTree<usize, G, S>,
    ) -> RTreeResult<()> {
        let p = Point::new;
        // equal to the query
        tree.add(0, &[p(10.0, 10.0), p(20.0, 20.0)])?;
        // inside the query
        tree.add(1, &[p(12.0, 12.0), p(14.0, 18.0)])?;
        // around the query
        tree.add(2, &[p(0.0, 0.0), p(30.0, 30.0)])?;
        // touching the query's corner
        tree.add(3, &[p(20.0, 20.0), p(25.0, 25.0)])?;
        // well away
        tree.add(4, &[p(40.0, 40.0), p(45.0, 41.0)])?;
        tree.add(5, &[p(-30.0, 12.0)])?;

        let query = [p(10.0, 10.0), p(20.0, 20.0)];
        let get = |match_type| -> RTreeResult<Vec<usize>> {
            Ok(sorted_values(tree.get(&query, None, match_type)?))
        };

        assert_eq!(get(MatchType::Equal)?, vec![0], "{}", name);
        assert_eq!(get(MatchType::Contains)?, vec![0, 1], "{}", name);
        assert_eq!(get(MatchType::Contained)?, vec![0, 2], "{}", name);
        assert_eq!(get(MatchType::Intersects)?, vec![0, 1, 2, 3], "{}", name);
        Ok(())
    }
}

#[test]
fn test_match_types() {
    run_test(|| Ok(KnownLayout), |scenario| for_each_combination(4, 2, &scenario))
}

struct Inspection {
    boxes: Vec<[Point; 2]>,
}

impl TreeScenario for Inspection {
    fn run<G: Geometry, S: SplitStrategy>(
        &self,
        name: &str,
        mut tree: RTree<usize, G, S>,
    ) -> RTreeResult<()> {
        for (i, corners) in self.boxes.iter().enumerate() {
            tree.add(i, corners)?;
            // every box twice, under different values
            tree.add(i + self.boxes.len(), corners)?;
        }

        let mut values: Vec<usize> = tree.values().copied().collect();
        values.sort();
        assert_eq!(values, (0..self.boxes.len() * 2).collect::<Vec<_>>(), "{}", name);

        for ((lo, hi), value) in tree.items() {
            let original = self.boxes[*value % self.boxes.len()];
            assert_eq!((lo, hi), (original[0], original[1]), "{}", name);
        }

        let mut distinct: Vec<(Point, Point)> = self.boxes.iter().map(|b| (b[0], b[1])).collect();
        distinct.dedup();
        assert!(tree.keys().len() <= self.boxes.len(), "{}", name);
        for key in tree.keys() {
            assert!(distinct.contains(&key), "{}", name);
        }

        let lines = tree.dump();
        assert_eq!(lines[0].height, tree.height().unwrap_or(0) + 1, "{}", name);
        assert_eq!(
            lines.iter().filter(|line| line.value.is_some()).count(),
            tree.len(),
            "{}",
            name
        );
        tree.log_structure();
        Ok(())
    }
}

#[test]
fn test_inspection() {
    run_test(
        || {
            let mut rng = seeded_rng(5);
            Ok(Inspection {
                boxes: random_boxes(&mut rng, 40, 30),
            })
        },
        |scenario| for_each_combination(5, 2, &scenario),
    )
}

#[test]
fn test_query_on_empty_tree() {
    let tree: RTree<usize> = RTree::new();
    let query = [Point::new(-1000.0, -1000.0), Point::new(1000.0, 1000.0)];
    assert_eq!(tree.get(&query, None, MatchType::Intersects).unwrap().count(), 0);
    assert!(!tree.contains_key(&query).unwrap());
    assert!(tree.keys().is_empty());
}
