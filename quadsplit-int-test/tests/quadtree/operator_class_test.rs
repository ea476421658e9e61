use quadsplit::{
    classify, BoundingBox, Geometry, LooseQuadtree, QuadtreeConfig, ScanKey, SpatialError,
    SpatialResult, Strategy,
};
use quadsplit::quadtree::predicates::refine;
use quadsplit_int_test::test_util::{collecting_sink, random_boxes, seeded_rng};
use rand::Rng;

fn shifted(bbox: &BoundingBox, dx: f64, dy: f64) -> BoundingBox {
    BoundingBox::new(bbox.min_x + dx, bbox.min_y + dy, bbox.max_x + dx, bbox.max_y + dy)
}

#[test]
fn test_choose_path_is_translation_invariant() -> SpatialResult<()> {
    let tree = LooseQuadtree::default();
    let cell = BoundingBox::new(0.0, 0.0, 16.0, 16.0);
    let mut rng = seeded_rng(17);

    for _ in 0..200 {
        // Quarter-unit coordinates keep the shifted arithmetic exact.
        let x = rng.random_range(0..60) as f64 / 4.0;
        let y = rng.random_range(0..60) as f64 / 4.0;
        let side = rng.random_range(0..12) as f64 / 4.0;
        let object = BoundingBox::new(x, y, x + side, y + side);
        let here = tree.choose(&cell, 0, &object)?;
        let there = tree.choose(&shifted(&cell, 1024.0, -512.0), 0, &shifted(&object, 1024.0, -512.0))?;
        assert_eq!(here.levels_to_descend, there.levels_to_descend);
        assert_eq!(here.path, there.path);
    }
    Ok(())
}

#[test]
fn test_descent_along_chosen_path_is_never_pruned() -> SpatialResult<()> {
    let sink = collecting_sink();
    let tree = LooseQuadtree::with_sink(QuadtreeConfig::default(), sink.clone())?;
    let cell = BoundingBox::new(0.0, 0.0, 64.0, 64.0);
    let mut rng = seeded_rng(23);

    for object in random_boxes(&mut rng, 100, 64.0, 2.0) {
        let choice = tree.choose(&cell, 0, &object)?;
        assert_eq!(choice.path.len(), choice.levels_to_descend as usize + 1);
        assert_eq!(choice.sub_centroids.len(), choice.levels_to_descend as usize);

        let keys = [ScanKey::with_box(Strategy::Overlap, object)];
        let centroids = std::iter::once(cell).chain(choice.sub_centroids.iter().copied());
        let mut traversal = None;
        for (centroid, quadrant) in centroids.zip(choice.path.iter().copied()) {
            let admitted = tree.inner_consistent(traversal.as_ref(), &centroid, false, &keys)?;
            let child = admitted
                .into_iter()
                .find(|c| c.quadrant == quadrant)
                .expect("chosen quadrant must stay reachable");
            assert!(child.traversal.admits_box(&object));
            traversal = Some(child.traversal);
        }

        let found = tree.leaf_consistent(&object, &keys)?;
        assert!(found.matches);
        assert!(!found.recheck);
    }
    assert!(!sink.events().is_empty());
    Ok(())
}

#[test]
fn test_leaf_split_agrees_with_classifier() -> SpatialResult<()> {
    let tree = LooseQuadtree::default();
    let mut rng = seeded_rng(31);
    let boxes = random_boxes(&mut rng, 100, 100.0, 10.0);

    let split = tree.pick_split(&boxes)?;
    let mut seen = vec![false; boxes.len()];
    for (quadrant, members) in split.groups.iter() {
        for &i in members {
            assert!(!seen[i]);
            seen[i] = true;
            assert_eq!(classify(&split.centroid, &boxes[i]), quadrant);
        }
    }
    assert!(seen.into_iter().all(|s| s));
    assert!(!split.is_all_the_same());
    Ok(())
}

#[test]
fn test_strategy_numbers() {
    let argument = Geometry::envelope(0.0, 0.0, 1.0, 1.0);
    for number in 1..=12u16 {
        let key = ScanKey::from_number(number, argument.clone()).unwrap();
        assert_eq!(key.strategy.number(), number);
    }
    for number in [0u16, 13, 99] {
        assert!(matches!(
            ScanKey::from_number(number, argument.clone()),
            Err(SpatialError::UnrecognizedStrategy(n)) if n == number
        ));
    }
}

#[test]
fn test_lossy_argument_requests_recheck_for_every_strategy() -> SpatialResult<()> {
    let tree = LooseQuadtree::default();
    let stored = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
    let circle = Geometry::circle(1.5, 1.5, 1.0);

    let overlap = tree.leaf_consistent(&stored, &[ScanKey::new(Strategy::Overlap, circle.clone())])?;
    assert!(overlap.matches);
    assert!(overlap.recheck);

    let left = tree.leaf_consistent(&stored, &[ScanKey::new(Strategy::OverLeft, circle.clone())])?;
    assert!(left.matches);
    assert!(left.recheck);
    assert!(refine(&stored, Strategy::OverLeft, &circle));

    let envelope = Geometry::envelope(1.5, 0.0, 2.0, 1.0);
    let right = tree.leaf_consistent(&stored, &[ScanKey::new(Strategy::Left, envelope)])?;
    assert!(right.matches);
    assert!(!right.recheck);
    Ok(())
}
