use arty_rtree::{
    Cartesian, ExhaustiveSplit, Found, Geometry, LatLon, LinearSplit, Point, QuadraticSplit,
    RTree, RTreeBuilder, RTreeError, RTreeResult, SplitStrategy,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

/// Runs a test body against a freshly prepared context, panicking with the
/// error if either step fails.
pub fn run_test<C, B, T>(before: B, test: T)
where
    B: Fn() -> RTreeResult<C>,
    T: Fn(C) -> RTreeResult<()>,
{
    let start_time = Instant::now();
    let result = before().and_then(test);
    let elapsed = start_time.elapsed();

    if let Err(e) = result {
        eprintln!("\n==================== TEST FAILED ====================");
        eprintln!("Error after {:?}: {}", elapsed, e);
        eprintln!("=====================================================\n");
        panic!("Test failed: {:?}", e);
    }
}

/// A test body that runs against every geometry and split combination.
pub trait TreeScenario {
    fn run<G: Geometry, S: SplitStrategy>(
        &self,
        name: &str,
        tree: RTree<usize, G, S>,
    ) -> RTreeResult<()>;
}

/// Builds an empty tree of each of the six concrete kinds and hands it to
/// `scenario`.
pub fn for_each_combination<T: TreeScenario>(
    max_entries: usize,
    min_entries: usize,
    scenario: &T,
) -> RTreeResult<()> {
    scenario.run(
        "cartesian/linear",
        build_tree::<Cartesian, LinearSplit>(max_entries, min_entries)?,
    )?;
    scenario.run(
        "cartesian/quadratic",
        build_tree::<Cartesian, QuadraticSplit>(max_entries, min_entries)?,
    )?;
    scenario.run(
        "cartesian/exhaustive",
        build_tree::<Cartesian, ExhaustiveSplit>(max_entries, min_entries)?,
    )?;
    scenario.run(
        "latlon/linear",
        build_tree::<LatLon, LinearSplit>(max_entries, min_entries)?,
    )?;
    scenario.run(
        "latlon/quadratic",
        build_tree::<LatLon, QuadraticSplit>(max_entries, min_entries)?,
    )?;
    scenario.run(
        "latlon/exhaustive",
        build_tree::<LatLon, ExhaustiveSplit>(max_entries, min_entries)?,
    )
}

pub fn build_tree<G, S>(max_entries: usize, min_entries: usize) -> RTreeResult<RTree<usize, G, S>>
where
    G: Geometry + Default,
    S: SplitStrategy + Default,
{
    RTreeBuilder::new()
        .max_entries(max_entries)
        .min_entries(min_entries)
        .geometry(G::default())
        .split(S::default())
        .build()
}

/// Seeded generator, so failures reproduce.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Random boxes with corners on a quarter-unit grid inside `[-span, span]`.
///
/// Grid coordinates survive longitude normalization exactly, so the same
/// boxes can be used with both geometries while `span` stays below 90.
pub fn random_boxes(rng: &mut StdRng, count: usize, span: i32) -> Vec<[Point; 2]> {
    (0..count)
        .map(|_| {
            let x = rng.gen_range(-span * 4..span * 4) as f64 / 4.0;
            let y = rng.gen_range(-span * 4..span * 4) as f64 / 4.0;
            let w = rng.gen_range(0..16) as f64 / 4.0;
            let h = rng.gen_range(0..16) as f64 / 4.0;
            [Point::new(x, y), Point::new(x + w, y + h)]
        })
        .collect()
}

/// Values of a plain query, sorted.
pub fn sorted_values<'a, I>(found: I) -> Vec<usize>
where
    I: IntoIterator<Item = Found<'a, usize>>,
{
    let mut values: Vec<usize> = found
        .into_iter()
        .filter_map(|f| f.value().copied())
        .collect();
    values.sort();
    values
}

/// Structural check plus agreement between the size counter and a full scan.
pub fn assert_invariants<G: Geometry, S: SplitStrategy>(
    name: &str,
    tree: &RTree<usize, G, S>,
) -> RTreeResult<()> {
    tree.check_consistency()?;
    let scanned = tree.values().count();
    if scanned != tree.len() {
        return Err(RTreeError::Inconsistent(format!(
            "{}: size {} but {} values reachable",
            name,
            tree.len(),
            scanned
        )));
    }
    Ok(())
}
