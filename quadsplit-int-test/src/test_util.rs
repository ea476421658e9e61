use quadsplit::{BoundingBox, CollectingSink, Coordinate, Geometry, ScanKey};
use quadsplit::quadtree::predicates::refine;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Deterministic generator so failures can be replayed.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Random boxes inside `[0, extent]²` with sides up to `max_side`.
pub fn random_boxes(rng: &mut StdRng, n: usize, extent: f64, max_side: f64) -> Vec<BoundingBox> {
    (0..n)
        .map(|_| {
            let x = rng.random_range(0.0..extent);
            let y = rng.random_range(0.0..extent);
            let w = rng.random_range(0.0..=max_side);
            let h = rng.random_range(0.0..=max_side);
            BoundingBox::new(x, y, x + w, y + h)
        })
        .collect()
}

/// Random points inside `[0, extent]²`, as degenerate boxes.
pub fn random_points(rng: &mut StdRng, n: usize, extent: f64) -> Vec<BoundingBox> {
    random_boxes(rng, n, extent, 0.0)
}

/// Indices of the boxes that satisfy every key, by a linear scan.
pub fn brute_force(boxes: &[BoundingBox], keys: &[ScanKey]) -> Vec<usize> {
    (0..boxes.len())
        .filter(|&i| keys.iter().all(|key| refine(&boxes[i], key.strategy, &key.argument)))
        .collect()
}

/// Sorts references returned by a search into owned ids.
pub fn sorted_ids(ids: Vec<&usize>) -> Vec<usize> {
    let mut ids: Vec<usize> = ids.into_iter().copied().collect();
    ids.sort_unstable();
    ids
}

/// A regular polygon approximating a circle, for lossy queries.
pub fn polygon_around(cx: f64, cy: f64, radius: f64, sides: usize) -> Geometry {
    let coordinates = (0..sides)
        .map(|i| {
            let angle = std::f64::consts::TAU * i as f64 / sides as f64;
            Coordinate::new(cx + radius * angle.cos(), cy + radius * angle.sin())
        })
        .collect();
    Geometry::polygon(coordinates)
}

/// Sink shared between the code under test and the assertions.
pub fn collecting_sink() -> Arc<CollectingSink> {
    Arc::new(CollectingSink::new())
}
