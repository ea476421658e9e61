use quadsplit::{
    BoundingBox, Geometry, MemoryQuadtree, QuadtreeConfig, ScanKey, SpatialResult, Strategy,
};
use quadsplit_int_test::test_util::{
    brute_force, polygon_around, random_boxes, random_points, seeded_rng, sorted_ids,
};

fn build(boxes: &[BoundingBox], config: QuadtreeConfig) -> SpatialResult<MemoryQuadtree<usize>> {
    let mut tree = MemoryQuadtree::new(config)?;
    for (i, bbox) in boxes.iter().enumerate() {
        tree.insert(*bbox, i)?;
    }
    Ok(tree)
}

#[test]
fn test_every_strategy_matches_linear_scan() -> SpatialResult<()> {
    let mut rng = seeded_rng(2024);
    let boxes = random_boxes(&mut rng, 2000, 1000.0, 50.0);
    let tree = build(&boxes, QuadtreeConfig::new().leaf_capacity(16))?;
    assert_eq!(tree.len(), boxes.len());

    let queries = [
        BoundingBox::new(200.0, 200.0, 450.0, 380.0),
        BoundingBox::new(0.0, 600.0, 1000.0, 610.0),
        BoundingBox::new(730.0, 10.0, 731.0, 11.0),
        BoundingBox::new(-100.0, -100.0, 1100.0, 1100.0),
    ];
    for query in queries {
        for strategy in Strategy::ALL {
            let keys = [ScanKey::with_box(strategy, query)];
            assert_eq!(
                sorted_ids(tree.search(&keys)?),
                brute_force(&boxes, &keys),
                "{} {}",
                strategy,
                query
            );
        }
    }
    Ok(())
}

#[test]
fn test_point_cloud_search() -> SpatialResult<()> {
    let mut rng = seeded_rng(11);
    let points = random_points(&mut rng, 3000, 500.0);
    let tree = build(&points, QuadtreeConfig::new().leaf_capacity(8).max_tree_depth(24))?;

    for query in [
        BoundingBox::new(100.0, 100.0, 140.0, 160.0),
        BoundingBox::new(250.0, 0.0, 250.5, 500.0),
    ] {
        for strategy in [Strategy::Overlap, Strategy::ContainedBy, Strategy::Below, Strategy::OverRight] {
            let keys = [ScanKey::with_box(strategy, query)];
            assert_eq!(sorted_ids(tree.search(&keys)?), brute_force(&points, &keys));
        }
    }
    Ok(())
}

#[test]
fn test_polygon_and_circle_queries_are_refined() -> SpatialResult<()> {
    let mut rng = seeded_rng(5);
    let boxes = random_boxes(&mut rng, 1500, 1000.0, 30.0);
    let tree = build(&boxes, QuadtreeConfig::default())?;

    let shapes = [
        polygon_around(500.0, 500.0, 180.0, 7),
        Geometry::circle(250.0, 700.0, 120.0),
    ];
    for shape in shapes {
        for strategy in [Strategy::Overlap, Strategy::ContainedBy, Strategy::Contains, Strategy::Left] {
            let keys = [ScanKey::new(strategy, shape.clone())];
            assert_eq!(
                sorted_ids(tree.search(&keys)?),
                brute_force(&boxes, &keys),
                "{} {}",
                strategy,
                shape
            );
        }
    }
    Ok(())
}

#[test]
fn test_combined_keys_intersect() -> SpatialResult<()> {
    let mut rng = seeded_rng(99);
    let boxes = random_boxes(&mut rng, 1000, 1000.0, 40.0);
    let tree = build(&boxes, QuadtreeConfig::new().leaf_capacity(12))?;

    let keys = [
        ScanKey::with_box(Strategy::Overlap, BoundingBox::new(100.0, 100.0, 700.0, 700.0)),
        ScanKey::with_box(Strategy::Left, BoundingBox::new(400.0, 0.0, 410.0, 1.0)),
        ScanKey::with_box(Strategy::OverAbove, BoundingBox::new(0.0, 300.0, 1.0, 320.0)),
    ];
    let found = sorted_ids(tree.search(&keys)?);
    assert!(!found.is_empty());
    assert_eq!(found, brute_force(&boxes, &keys));
    Ok(())
}

#[test]
fn test_stats_account_for_every_entry() -> SpatialResult<()> {
    let mut rng = seeded_rng(3);
    let boxes = random_boxes(&mut rng, 800, 200.0, 5.0);
    let tree = build(&boxes, QuadtreeConfig::new().leaf_capacity(4))?;

    let stats = tree.stats();
    assert_eq!(stats.entries, 800);
    assert!(stats.inner_nodes > 0);
    assert!(stats.leaf_nodes > 0);
    assert_eq!(stats.height, tree.height());
    Ok(())
}

#[test]
fn test_malformed_query_is_an_error() -> SpatialResult<()> {
    let tree = build(&[BoundingBox::new(0.0, 0.0, 1.0, 1.0)], QuadtreeConfig::default())?;
    let keys = [ScanKey::new(Strategy::Overlap, Geometry::circle(0.0, 0.0, -1.0))];
    assert!(tree.search(&keys).is_err());
    Ok(())
}
