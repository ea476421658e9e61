use quadsplit::{
    BoundingBox, BoxSplitSupport, Diagnostic, IndexEntry, Interval, MultiColumnSplitter,
    PageSplit, Quadrant, RangeSplitSupport, SplitConfig, SpatialResult,
};
use quadsplit_int_test::test_util::{collecting_sink, seeded_rng};
use rand::rngs::StdRng;
use rand::Rng;

/// Quarter-unit boxes; `null_ratio` of the keys are null.
fn random_page(rng: &mut StdRng, n: usize, columns: usize, null_ratio: f64) -> Vec<Vec<Option<BoundingBox>>> {
    (0..n)
        .map(|_| {
            (0..columns)
                .map(|_| {
                    if rng.random_bool(null_ratio) {
                        return None;
                    }
                    let x = rng.random_range(0..400) as f64 / 4.0;
                    let y = rng.random_range(0..400) as f64 / 4.0;
                    let w = rng.random_range(0..20) as f64 / 4.0;
                    let h = rng.random_range(0..20) as f64 / 4.0;
                    Some(BoundingBox::new(x, y, x + w, y + h))
                })
                .collect()
        })
        .collect()
}

fn assert_complete_and_summarized(split: &PageSplit<BoundingBox>, tuples: &[Vec<Option<BoundingBox>>]) {
    let assignment = split.assignment();
    assert_eq!(assignment.len(), tuples.len());
    assert!(assignment.iter().all(Option::is_some));

    for (_, group) in split.groups.iter() {
        for (column, summary) in group.summaries.iter().enumerate() {
            let expected = BoundingBox::hull(
                group.entries.iter().filter_map(|&offset| tuples[offset - 1][column].as_ref()),
            );
            assert_eq!(*summary, expected);
        }
    }
}

#[test]
fn test_random_pages_with_nulls_are_complete() -> SpatialResult<()> {
    let mut rng = seeded_rng(41);
    let splitter = MultiColumnSplitter::new(BoxSplitSupport::new(3));
    for n in 2..64 {
        let tuples = random_page(&mut rng, n, 3, 0.1);
        let split = splitter.split_page(&tuples)?;
        assert_complete_and_summarized(&split, &tuples);
    }
    Ok(())
}

#[test]
fn test_pages_without_nulls_fill_every_quadrant() -> SpatialResult<()> {
    let mut rng = seeded_rng(43);
    for columns in 1..=3 {
        let splitter = MultiColumnSplitter::new(BoxSplitSupport::new(columns));
        for n in 4..80 {
            let tuples = random_page(&mut rng, n, columns, 0.0);
            let split = splitter.split_page(&tuples)?;
            assert_complete_and_summarized(&split, &tuples);
            assert!(split.group_sizes().iter().all(|&size| size > 0), "{} columns, n = {}", columns, n);
        }
    }
    Ok(())
}

#[test]
fn test_split_is_translation_invariant() -> SpatialResult<()> {
    let mut rng = seeded_rng(47);
    let splitter = MultiColumnSplitter::new(BoxSplitSupport::new(2));
    for n in [5, 17, 40] {
        let tuples = random_page(&mut rng, n, 2, 0.0);
        let moved: Vec<Vec<Option<BoundingBox>>> = tuples
            .iter()
            .map(|row| {
                row.iter()
                    .map(|key| {
                        key.map(|b| BoundingBox::new(b.min_x + 1024.0, b.min_y - 512.0, b.max_x + 1024.0, b.max_y - 512.0))
                    })
                    .collect()
            })
            .collect();

        let here = splitter.split_page(&tuples)?;
        let there = splitter.split_page(&moved)?;
        assert_eq!(here.assignment(), there.assignment());
    }
    Ok(())
}

#[test]
fn test_tied_page_warns_and_splits_by_position() -> SpatialResult<()> {
    let sink = collecting_sink();
    let splitter = MultiColumnSplitter::new(RangeSplitSupport::default()).with_sink(sink.clone());
    let tuples: Vec<Vec<Option<Interval>>> = (0..8).map(|_| vec![Some(Interval::new(1.0, 2.0))]).collect();

    let split = splitter.split_page(&tuples)?;
    assert_eq!(split.group(Quadrant::NorthWest).entries, vec![1, 2]);
    assert_eq!(split.group(Quadrant::NorthEast).entries, vec![3, 4]);
    assert_eq!(split.group(Quadrant::SouthWest).entries, vec![5, 6]);
    assert_eq!(split.group(Quadrant::SouthEast).entries, vec![7, 8]);
    assert!(sink
        .warnings()
        .iter()
        .any(|d| matches!(d, Diagnostic::DegenerateSplit { column: 0, .. })));
    Ok(())
}

#[test]
fn test_index_entries_map_back_to_ids() -> SpatialResult<()> {
    let splitter = MultiColumnSplitter::with_config(
        RangeSplitSupport::new(2),
        SplitConfig::default().reconcile_secondary_splits(false),
    );
    let entries: Vec<IndexEntry<Interval>> = (0..12u64)
        .map(|id| {
            let v = id as f64;
            IndexEntry::new(1000 + id, vec![Some(Interval::new(v, v + 0.5)), Some(Interval::new(-v, -v))])
        })
        .collect();

    let split = splitter.split_page(&entries)?;
    let mut ids: Vec<u64> = split
        .groups
        .values()
        .flat_map(|g| g.entries.iter().map(|&offset| entries[offset - 1].id))
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, (1000..1012).collect::<Vec<_>>());
    assert_eq!(split.group_sizes(), [3, 3, 3, 3]);
    Ok(())
}
