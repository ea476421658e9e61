//! Multi-column page splitting: null handling, column fallthrough and
//! redistribution of entries that fit more than one quadrant.

use std::sync::Arc;

use crate::config::SplitConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink, LogSink};
use crate::errors::{SpatialError, SpatialResult};
use crate::gist_split::split_types::{PageSplit, SplitGroup, SplitTuple, FIRST_OFFSET};
use crate::gist_split::support::SplitSupport;
use crate::gist_split::union_split::{quartiles, user_split, ColumnSplit};
use crate::quadrant::{Quadrant, Quadrants};

/// Group membership (0-based positions) and per-column summaries of one
/// recursion level.
struct Partition<K> {
    groups: Quadrants<Vec<usize>>,
    summaries: Quadrants<Vec<Option<K>>>,
}

impl<K: Clone> Partition<K> {
    fn unsummarized(groups: Quadrants<Vec<usize>>, columns: usize) -> Self {
        Self {
            groups,
            summaries: Quadrants::from_fn(|_| vec![None; columns]),
        }
    }

    fn from_column(split: ColumnSplit<K>, column: usize, columns: usize) -> Self {
        let summaries = split.summaries.map(|summary| {
            let mut row = vec![None; columns];
            row[column] = summary;
            row
        });
        Self {
            groups: split.groups,
            summaries,
        }
    }
}

/// Splits an overflowing page of multi-column entries into four groups.
///
/// Columns are split in order. The first column decides unless its split is
/// degenerate; entries whose placement the first column does not care about
/// are re-decided by the columns after it.
///
/// ```rust
/// use quadsplit::{Interval, MultiColumnSplitter, RangeSplitSupport};
///
/// let splitter = MultiColumnSplitter::new(RangeSplitSupport::default());
/// let tuples: Vec<Vec<Option<Interval>>> =
///     (1..=8).map(|v| vec![Some(Interval::new(v as f64, v as f64))]).collect();
/// let split = splitter.split_page(&tuples).unwrap();
/// assert_eq!(split.group_sizes(), [2, 2, 2, 2]);
/// ```
pub struct MultiColumnSplitter<S: SplitSupport> {
    support: S,
    config: SplitConfig,
    sink: Arc<dyn DiagnosticSink>,
}

impl<S: SplitSupport> MultiColumnSplitter<S> {
    pub fn new(support: S) -> Self {
        Self::with_config(support, SplitConfig::default())
    }

    pub fn with_config(support: S, config: SplitConfig) -> Self {
        Self {
            support,
            config,
            sink: Arc::new(LogSink),
        }
    }

    /// Reports split decisions to `sink` instead of the `log` facade.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn support(&self) -> &S {
        &self.support
    }

    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// Distributes `tuples` over four groups and summarizes every column of
    /// every group.
    ///
    /// Every tuple lands in exactly one group. With at least four tuples and
    /// no null keys, every group is non-empty.
    ///
    /// # Errors
    ///
    /// - `InvalidOperation` for fewer than two tuples or an index without
    ///   columns
    /// - whatever [`SplitSupport::validate`] reports for a key
    pub fn split_page<T: SplitTuple<S::Key>>(&self, tuples: &[T]) -> SpatialResult<PageSplit<S::Key>> {
        let columns = self.support.column_count();
        if columns == 0 {
            return Err(SpatialError::InvalidOperation(
                "a page split needs at least one key column".to_string(),
            ));
        }
        if tuples.len() < 2 {
            return Err(SpatialError::InvalidOperation(format!(
                "a page split needs at least 2 entries, got {}",
                tuples.len()
            )));
        }
        for tuple in tuples {
            for column in 0..columns {
                if let Some(key) = tuple.attribute(column) {
                    self.support.validate(column, key)?;
                }
            }
        }

        let refs: Vec<&T> = tuples.iter().collect();
        let mut partition = self.split_by_key(&refs, 0, &Quadrants::default());
        if columns > 1 {
            partition.summaries = self.summarize(&refs, &partition.groups);
        }

        let groups = partition.groups.zip(partition.summaries).map(|(mut members, summaries)| {
            members.sort_unstable();
            SplitGroup {
                entries: members.into_iter().map(|i| i + FIRST_OFFSET).collect(),
                summaries,
            }
        });
        Ok(PageSplit { groups })
    }

    fn split_by_key<T: SplitTuple<S::Key>>(
        &self,
        tuples: &[&T],
        column: usize,
        prior: &Quadrants<Option<S::Key>>,
    ) -> Partition<S::Key> {
        let columns = self.support.column_count();
        let keys: Vec<Option<&S::Key>> = tuples.iter().map(|t| t.attribute(column)).collect();
        let non_null = keys.iter().filter(|k| k.is_some()).count();

        if non_null == 0 {
            if column + 1 < columns {
                self.sink.emit(Diagnostic::ColumnSkipped {
                    column,
                    reason: "every key is null",
                });
                return self.split_by_key(tuples, column + 1, &Quadrants::default());
            }
            return Partition::unsummarized(quartiles(tuples.len()), columns);
        }

        if non_null < tuples.len() {
            return self.split_nulls(tuples, &keys, column);
        }

        let keys: Vec<&S::Key> = keys.into_iter().flatten().collect();
        let split = user_split(&self.support, &self.config, self.sink.as_ref(), column, &keys, prior);
        let partition = Partition::from_column(split, column, columns);
        if column + 1 >= columns || !self.config.redistributes_dont_cares() {
            return partition;
        }
        self.redistribute(tuples, column, &keys, partition)
    }

    /// Nulls go north-west; the rest are dealt round-robin over the other
    /// three quadrants by position.
    fn split_nulls<T: SplitTuple<S::Key>>(
        &self,
        tuples: &[&T],
        keys: &[Option<&S::Key>],
        column: usize,
    ) -> Partition<S::Key> {
        let columns = self.support.column_count();
        let mut groups: Quadrants<Vec<usize>> = Quadrants::default();
        for (i, key) in keys.iter().enumerate() {
            let quadrant = match (key, (i + FIRST_OFFSET) % 3) {
                (None, _) => Quadrant::NorthWest,
                (Some(_), 0) => Quadrant::NorthEast,
                (Some(_), 1) => Quadrant::SouthWest,
                (Some(_), _) => Quadrant::SouthEast,
            };
            groups[quadrant].push(i);
        }

        let mut partition = Partition::unsummarized(groups, columns);
        if column == 0 && columns == 1 {
            partition.summaries = self.summarize(tuples, &partition.groups);
        }
        partition
    }

    /// Hands entries the split of `column` is indifferent about to the next
    /// column.
    fn redistribute<T: SplitTuple<S::Key>>(
        &self,
        tuples: &[&T],
        column: usize,
        keys: &[&S::Key],
        partition: Partition<S::Key>,
    ) -> Partition<S::Key> {
        let summaries: Quadrants<Option<&S::Key>> =
            partition.summaries.as_ref().map(|row| row[column].as_ref());

        if let [Some(first), Some(b), Some(c), Some(d)] = summaries.clone().into_inner() {
            if [b, c, d].iter().all(|other| self.support.same(column, first, other)) {
                self.sink.emit(Diagnostic::ColumnSkipped {
                    column,
                    reason: "all quadrant summaries are equal",
                });
                return self.split_by_key(tuples, column + 1, &Quadrants::default());
            }
        }

        let mut dont_cares = Vec::new();
        for (quadrant, members) in partition.groups.iter() {
            let own = match summaries[quadrant] {
                Some(own) => own,
                None => continue,
            };
            for &i in members {
                let own_penalty = self.support.penalty(column, own, keys[i]);
                let indifferent = summaries.iter().any(|(other, summary)| match summary {
                    Some(summary) if other != quadrant => {
                        self.support.penalty(column, summary, keys[i]) == own_penalty
                    }
                    _ => false,
                });
                if indifferent {
                    dont_cares.push(i);
                }
            }
        }
        if dont_cares.is_empty() {
            return partition;
        }
        dont_cares.sort_unstable();

        let mut is_dont_care = vec![false; tuples.len()];
        for &i in &dont_cares {
            is_dont_care[i] = true;
        }
        let mut groups = partition
            .groups
            .map(|members| members.into_iter().filter(|&i| !is_dont_care[i]).collect::<Vec<_>>());
        if groups.values().any(Vec::is_empty) {
            self.sink.emit(Diagnostic::ColumnSkipped {
                column,
                reason: "moving don't-care entries would leave a quadrant empty",
            });
            return self.split_by_key(tuples, column + 1, &Quadrants::default());
        }

        self.sink.emit(Diagnostic::DontCaresFound {
            column,
            count: dont_cares.len(),
        });
        let remaining = self.summarize(tuples, &groups);

        if let [only] = dont_cares.as_slice() {
            let quadrant = self.place_one(tuples[*only], &remaining, column + 1);
            groups[quadrant].push(*only);
        } else {
            let subset: Vec<&T> = dont_cares.iter().map(|&i| tuples[i]).collect();
            let prior = remaining.as_ref().map(|row| row[column + 1].clone());
            let inner = self.split_by_key(&subset, column + 1, &prior);
            for (quadrant, members) in inner.groups {
                groups[quadrant].extend(members.into_iter().map(|j| dont_cares[j]));
            }
        }

        for (_, members) in groups.iter_mut() {
            members.sort_unstable();
        }
        let summaries = self.summarize(tuples, &groups);
        Partition { groups, summaries }
    }

    /// Quadrant for a single don't-care entry: the first column from
    /// `from_column` on with a unique cheapest quadrant decides, remaining
    /// ties go to the first quadrant in code order.
    fn place_one<T: SplitTuple<S::Key>>(
        &self,
        tuple: &T,
        summaries: &Quadrants<Vec<Option<S::Key>>>,
        from_column: usize,
    ) -> Quadrant {
        let mut candidates: Vec<Quadrant> = Quadrant::ALL.to_vec();
        for column in from_column..self.support.column_count() {
            let key = tuple.attribute(column);
            let penalties: Vec<(Quadrant, f64)> = candidates
                .iter()
                .map(|&q| (q, self.penalty_or_null(column, summaries[q][column].as_ref(), key)))
                .collect();
            let best = penalties.iter().map(|&(_, p)| p).fold(f64::INFINITY, f64::min);
            let cheapest: Vec<Quadrant> = penalties
                .into_iter()
                .filter(|&(_, p)| p == best)
                .map(|(q, _)| q)
                .collect();
            if !cheapest.is_empty() {
                candidates = cheapest;
            }
            if candidates.len() == 1 {
                break;
            }
        }
        candidates.first().copied().unwrap_or(Quadrant::NorthWest)
    }

    /// Penalty with nulls: a null fits a null summary for free and never
    /// fits a non-null one.
    fn penalty_or_null(&self, column: usize, summary: Option<&S::Key>, key: Option<&S::Key>) -> f64 {
        match (summary, key) {
            (Some(summary), Some(key)) => self.support.penalty(column, summary, key),
            (None, None) => 0.0,
            _ => f64::INFINITY,
        }
    }

    fn summarize<T: SplitTuple<S::Key>>(
        &self,
        tuples: &[&T],
        groups: &Quadrants<Vec<usize>>,
    ) -> Quadrants<Vec<Option<S::Key>>> {
        let columns = self.support.column_count();
        groups.as_ref().map(|members| {
            (0..columns)
                .map(|column| {
                    let keys: Vec<&S::Key> =
                        members.iter().filter_map(|&i| tuples[i].attribute(column)).collect();
                    self.support.union(column, &keys)
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounding_box::BoundingBox;
    use crate::diagnostics::CollectingSink;
    use crate::gist_split::support::{BoxSplitSupport, RangeSplitSupport};
    use crate::quadtree::quadtree_types::Interval;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn range(low: f64, high: f64) -> Option<Interval> {
        Some(Interval::new(low, high))
    }

    fn at(v: f64) -> Option<Interval> {
        range(v, v)
    }

    fn splitter(columns: usize) -> (MultiColumnSplitter<RangeSplitSupport>, Arc<CollectingSink>) {
        let sink = Arc::new(CollectingSink::new());
        let splitter = MultiColumnSplitter::new(RangeSplitSupport::new(columns)).with_sink(sink.clone());
        (splitter, sink)
    }

    fn entries(split: &PageSplit<Interval>) -> [Vec<usize>; 4] {
        split.groups.as_ref().map(|g| g.entries.clone()).into_inner()
    }

    #[test]
    fn test_tied_keys_split_into_positional_quartiles() {
        let (splitter, sink) = splitter(1);
        let tuples: Vec<Vec<Option<Interval>>> =
            (1..=8).map(|i| vec![range(4.0 - i as f64, 4.0 + i as f64)]).collect();
        let split = splitter.split_page(&tuples).unwrap();

        assert_eq!(entries(&split), [vec![1, 2], vec![3, 4], vec![5, 6], vec![7, 8]]);
        assert_eq!(split.group(Quadrant::NorthWest).summaries, vec![range(2.0, 6.0)]);
        assert_eq!(split.group(Quadrant::SouthEast).summaries, vec![range(-4.0, 12.0)]);
        assert_eq!(
            sink.warnings(),
            vec![Diagnostic::DegenerateSplit { column: 0, group_sizes: [8, 0, 0, 0] }]
        );
    }

    #[test]
    fn test_random_boxes_are_placed_once_and_summarized_exactly() {
        let mut rng = StdRng::seed_from_u64(7);
        let splitter = MultiColumnSplitter::new(BoxSplitSupport::new(2));
        for n in 2..40 {
            let tuples: Vec<Vec<Option<BoundingBox>>> = (0..n)
                .map(|_| {
                    (0..2)
                        .map(|_| {
                            let x = rng.gen_range(0.0..100.0);
                            let y = rng.gen_range(0.0..100.0);
                            Some(BoundingBox::new(x, y, x + rng.gen_range(0.0..5.0), y + rng.gen_range(0.0..5.0)))
                        })
                        .collect()
                })
                .collect();
            let split = splitter.split_page(&tuples).unwrap();

            assert_eq!(split.len(), n);
            assert!(split.assignment().iter().all(Option::is_some));
            if n >= 4 {
                assert!(split.group_sizes().iter().all(|&size| size > 0), "n = {}", n);
            }
            for (_, group) in split.groups.iter() {
                for column in 0..2 {
                    let expected = BoundingBox::hull(
                        group.entries.iter().filter_map(|&offset| tuples[offset - 1][column].as_ref()),
                    );
                    assert_eq!(group.summaries[column], expected);
                }
            }
        }
    }

    #[test]
    fn test_mixed_nulls_are_routed_by_position() {
        let (splitter, _) = splitter(1);
        let tuples = vec![
            vec![None],
            vec![at(1.0)],
            vec![at(2.0)],
            vec![None],
            vec![at(3.0)],
            vec![at(4.0)],
        ];
        let split = splitter.split_page(&tuples).unwrap();

        assert_eq!(entries(&split), [vec![1, 4], vec![3, 6], vec![], vec![2, 5]]);
        assert_eq!(split.group(Quadrant::NorthWest).summaries, vec![None]);
        assert_eq!(split.group(Quadrant::NorthEast).summaries, vec![range(2.0, 4.0)]);
        assert_eq!(split.group(Quadrant::SouthEast).summaries, vec![range(1.0, 3.0)]);
    }

    #[test]
    fn test_all_null_column_defers_to_next() {
        let (splitter, sink) = splitter(2);
        let tuples: Vec<Vec<Option<Interval>>> = (1..=8).map(|v| vec![None, at(v as f64)]).collect();
        let split = splitter.split_page(&tuples).unwrap();

        assert_eq!(entries(&split), [vec![1, 2], vec![3, 4], vec![5, 6], vec![7, 8]]);
        assert_eq!(split.group(Quadrant::NorthEast).summaries, vec![None, range(3.0, 4.0)]);
        assert!(sink
            .events()
            .iter()
            .any(|e| matches!(e, Diagnostic::ColumnSkipped { column: 0, .. })));
    }

    #[test]
    fn test_all_null_everywhere_uses_quartiles() {
        let (splitter, _) = splitter(1);
        let tuples: Vec<Vec<Option<Interval>>> = (0..5).map(|_| vec![None]).collect();
        let split = splitter.split_page(&tuples).unwrap();

        assert_eq!(entries(&split), [vec![1], vec![2], vec![3], vec![4, 5]]);
        assert!(split.groups.values().all(|g| g.summaries == vec![None]));
    }

    #[test]
    fn test_rejects_unsplittable_input() {
        let (splitter, _) = splitter(1);
        let one = vec![vec![at(1.0)]];
        assert!(matches!(splitter.split_page(&one), Err(SpatialError::InvalidOperation(_))));

        let none = MultiColumnSplitter::new(RangeSplitSupport::new(0));
        let two = vec![vec![at(1.0)], vec![at(2.0)]];
        assert!(matches!(none.split_page(&two), Err(SpatialError::InvalidOperation(_))));
    }

    #[test]
    fn test_malformed_key_is_rejected() {
        let splitter = MultiColumnSplitter::new(BoxSplitSupport::default());
        let tuples = vec![
            vec![Some(BoundingBox::new(0.0, 0.0, 1.0, 1.0))],
            vec![Some(BoundingBox::new(3.0, 0.0, 2.0, 1.0))],
        ];
        assert!(matches!(splitter.split_page(&tuples), Err(SpatialError::MalformedGeometry(_))));
    }

    #[test]
    fn test_equal_summaries_hand_over_to_next_column() {
        let (splitter, sink) = splitter(2);
        let tuples: Vec<Vec<Option<Interval>>> =
            (1..=8).map(|v| vec![range(0.0, 10.0), at(9.0 - v as f64)]).collect();
        let split = splitter.split_page(&tuples).unwrap();

        assert_eq!(entries(&split), [vec![7, 8], vec![5, 6], vec![3, 4], vec![1, 2]]);
        assert_eq!(split.group(Quadrant::SouthEast).summaries, vec![range(0.0, 10.0), range(7.0, 8.0)]);
        assert!(sink.events().contains(&Diagnostic::ColumnSkipped {
            column: 0,
            reason: "all quadrant summaries are equal",
        }));
    }

    /// Column 0 splits into quartiles where south-east's summary swallows
    /// entry 6, which column 1 places next to its neighbours.
    fn single_dont_care_page() -> Vec<Vec<Option<Interval>>> {
        let first = [at(0.0), at(1.0), at(2.0), at(3.0), at(4.0), at(5.0), range(4.5, 10.0), at(8.0)];
        first
            .into_iter()
            .enumerate()
            .map(|(i, key)| {
                let second = if i == 5 { at(35.0) } else { at((i + 1) as f64 * 10.0) };
                vec![key, second]
            })
            .collect()
    }

    #[test]
    fn test_single_dont_care_follows_next_column() {
        let (splitter, sink) = splitter(2);
        let split = splitter.split_page(&single_dont_care_page()).unwrap();

        assert_eq!(entries(&split), [vec![1, 2], vec![3, 4, 6], vec![5], vec![7, 8]]);
        assert_eq!(split.group(Quadrant::NorthEast).summaries, vec![range(2.0, 5.0), range(30.0, 40.0)]);
        assert!(sink.events().contains(&Diagnostic::DontCaresFound { column: 0, count: 1 }));
    }

    #[test]
    fn test_redistribution_can_be_disabled() {
        let sink = Arc::new(CollectingSink::new());
        let config = SplitConfig::default().redistribute_dont_cares(false);
        let splitter = MultiColumnSplitter::with_config(RangeSplitSupport::new(2), config).with_sink(sink.clone());
        let split = splitter.split_page(&single_dont_care_page()).unwrap();

        assert_eq!(entries(&split), [vec![1, 2], vec![3, 4], vec![5, 6], vec![7, 8]]);
        assert!(!sink
            .events()
            .iter()
            .any(|e| matches!(e, Diagnostic::DontCaresFound { .. })));
    }

    #[test]
    fn test_several_dont_cares_are_resplit_on_next_column() {
        let (splitter, sink) = splitter(2);
        let first = [
            at(0.0),
            range(-2.0, 4.5),
            at(2.0),
            at(3.0),
            at(4.0),
            at(5.0),
            at(6.0),
            at(7.0),
            at(8.0),
            at(9.0),
            at(10.0),
            at(11.0),
        ];
        let second = [0.0, 1.0, 2.0, 151.0, 1.0, 50.0, 100.0, 101.0, 102.0, 150.0, 151.0, 152.0];
        let tuples: Vec<Vec<Option<Interval>>> =
            first.into_iter().zip(second).map(|(a, b)| vec![a, at(b)]).collect();
        let split = splitter.split_page(&tuples).unwrap();

        // Entries 4 and 5 fit north-west on column 0 as well as north-east.
        assert_eq!(
            entries(&split),
            [vec![1, 2, 3, 5], vec![6], vec![7, 8, 9], vec![4, 10, 11, 12]]
        );
        assert_eq!(split.group(Quadrant::NorthWest).summaries, vec![range(-2.0, 4.5), range(0.0, 2.0)]);
        assert_eq!(split.group(Quadrant::SouthEast).summaries, vec![range(3.0, 11.0), range(150.0, 152.0)]);

        let events = sink.events();
        assert!(events.contains(&Diagnostic::DontCaresFound { column: 0, count: 2 }));
        assert!(events.contains(&Diagnostic::DegenerateSplit { column: 1, group_sizes: [0, 1, 1, 0] }));
        assert!(events.contains(&Diagnostic::SecondarySplitReconciled { column: 1, reassigned: true }));
    }

    #[test]
    fn test_place_one_narrows_column_by_column() {
        let (splitter, _) = splitter(3);
        let summaries = Quadrants::new([
            vec![None, None, at(0.0)],
            vec![None, range(0.0, 10.0), range(0.0, 1.0)],
            vec![None, range(20.0, 30.0), at(0.0)],
            vec![None, range(0.0, 10.0), range(0.0, 9.0)],
        ]);

        // North-east and south-east tie on column 1; column 2 decides.
        let tuple = vec![None, at(5.0), at(8.0)];
        assert_eq!(splitter.place_one(&tuple, &summaries, 1), Quadrant::SouthEast);

        // Still tied after the last column: first in code order.
        let tuple = vec![None, at(5.0), at(0.5)];
        assert_eq!(splitter.place_one(&tuple, &summaries, 1), Quadrant::NorthEast);

        // A null key only fits a null summary.
        let tuple = vec![None, None, at(0.0)];
        assert_eq!(splitter.place_one(&tuple, &summaries, 1), Quadrant::NorthWest);
    }
}
