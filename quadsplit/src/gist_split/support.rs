//! Per-column key operations used by the page splitter, and two reference
//! operator classes: boxes and one-dimensional ranges.

use crate::bounding_box::BoundingBox;
use crate::errors::{SpatialError, SpatialResult};
use crate::gist_split::split_types::{OffsetNumber, PickSplitOut, SplitEntry};
use crate::quadrant::{Quadrant, Quadrants};
use crate::quadtree::quadtree_types::Interval;

/// Key operations of an index with one or more columns sharing a key type.
pub trait SplitSupport {
    type Key: Clone;

    /// Number of key columns of the index.
    fn column_count(&self) -> usize;

    /// Smallest key covering all `keys`, or `None` when `keys` is empty.
    fn union(&self, column: usize, keys: &[&Self::Key]) -> Option<Self::Key>;

    /// Non-negative cost of adding `candidate` under `summary`.
    fn penalty(&self, column: usize, summary: &Self::Key, candidate: &Self::Key) -> f64;

    /// Splits the keys of one column into up to four groups.
    ///
    /// `prior` holds the summaries an earlier split already assigned to each
    /// quadrant for this column; a strategy that folds them into its own
    /// summaries reports so through [`PickSplitOut::prior_merged`].
    fn pick_split(
        &self,
        column: usize,
        entries: &[SplitEntry<'_, Self::Key>],
        prior: &Quadrants<Option<Self::Key>>,
    ) -> PickSplitOut<Self::Key>;

    /// Whether two summaries cover the same keys.
    fn same(&self, column: usize, a: &Self::Key, b: &Self::Key) -> bool {
        self.penalty(column, a, b) == 0.0 && self.penalty(column, b, a) == 0.0
    }

    /// Rejects keys the other operations cannot handle.
    fn validate(&self, _column: usize, _key: &Self::Key) -> SpatialResult<()> {
        Ok(())
    }
}

/// Summaries of `groups`, computed with `union`.
pub(crate) fn group_summaries<S: SplitSupport + ?Sized>(
    support: &S,
    column: usize,
    groups: &Quadrants<Vec<OffsetNumber>>,
    entries: &[SplitEntry<'_, S::Key>],
) -> Quadrants<Option<S::Key>> {
    Quadrants::from_fn(|q| {
        let keys: Vec<&S::Key> = groups[q]
            .iter()
            .filter_map(|&offset| entries.get(offset.wrapping_sub(1)).map(|e| e.key))
            .collect();
        support.union(column, &keys)
    })
}

// ============================================================================
// Boxes
// ============================================================================

/// Box keys: union is the hull, penalty is area enlargement, and the split
/// cuts at the median centers like a quadtree leaf split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxSplitSupport {
    columns: usize,
}

impl BoxSplitSupport {
    pub fn new(columns: usize) -> Self {
        Self { columns }
    }
}

impl Default for BoxSplitSupport {
    fn default() -> Self {
        Self::new(1)
    }
}

impl SplitSupport for BoxSplitSupport {
    type Key = BoundingBox;

    fn column_count(&self) -> usize {
        self.columns
    }

    fn union(&self, _column: usize, keys: &[&BoundingBox]) -> Option<BoundingBox> {
        BoundingBox::hull(keys.iter().copied())
    }

    fn penalty(&self, _column: usize, summary: &BoundingBox, candidate: &BoundingBox) -> f64 {
        summary.enlargement(candidate).max(0.0)
    }

    fn pick_split(
        &self,
        column: usize,
        entries: &[SplitEntry<'_, BoundingBox>],
        _prior: &Quadrants<Option<BoundingBox>>,
    ) -> PickSplitOut<BoundingBox> {
        let mut xs: Vec<f64> = entries.iter().map(|e| e.key.center().0).collect();
        let mut ys: Vec<f64> = entries.iter().map(|e| e.key.center().1).collect();
        xs.sort_by(f64::total_cmp);
        ys.sort_by(f64::total_cmp);
        let median = entries.len() / 2;
        let (mx, my) = match (xs.get(median), ys.get(median)) {
            (Some(&x), Some(&y)) => (x, y),
            _ => return PickSplitOut::new(Quadrants::default(), Quadrants::default()),
        };

        let mut groups: Quadrants<Vec<OffsetNumber>> = Quadrants::default();
        for entry in entries {
            let (x, y) = entry.key.center();
            groups[Quadrant::from_halves(x >= mx, y < my)].push(entry.offset);
        }
        let summaries = group_summaries(self, column, &groups, entries);
        PickSplitOut::new(groups, summaries)
    }

    fn same(&self, _column: usize, a: &BoundingBox, b: &BoundingBox) -> bool {
        a == b
    }

    fn validate(&self, _column: usize, key: &BoundingBox) -> SpatialResult<()> {
        key.validate()
    }
}

// ============================================================================
// Ranges
// ============================================================================

/// Range keys: union is the covering range, penalty is growth in length,
/// and the split orders by midpoint and cuts into quartiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSplitSupport {
    columns: usize,
}

impl RangeSplitSupport {
    pub fn new(columns: usize) -> Self {
        Self { columns }
    }
}

impl Default for RangeSplitSupport {
    fn default() -> Self {
        Self::new(1)
    }
}

impl SplitSupport for RangeSplitSupport {
    type Key = Interval;

    fn column_count(&self) -> usize {
        self.columns
    }

    fn union(&self, _column: usize, keys: &[&Interval]) -> Option<Interval> {
        keys.iter().copied().copied().reduce(|acc, k| {
            Interval::new(acc.low.min(k.low), acc.high.max(k.high))
        })
    }

    fn penalty(&self, _column: usize, summary: &Interval, candidate: &Interval) -> f64 {
        let grown = Interval::new(summary.low.min(candidate.low), summary.high.max(candidate.high));
        ((grown.high - grown.low) - (summary.high - summary.low)).max(0.0)
    }

    fn pick_split(
        &self,
        column: usize,
        entries: &[SplitEntry<'_, Interval>],
        _prior: &Quadrants<Option<Interval>>,
    ) -> PickSplitOut<Interval> {
        let mid = |k: &Interval| k.low + (k.high - k.low) / 2.0;
        let mut order: Vec<&SplitEntry<'_, Interval>> = entries.iter().collect();
        order.sort_by(|a, b| mid(a.key).total_cmp(&mid(b.key)));

        // Equal midpoints stay in one group, so a run of ties can leave a
        // quadrant empty.
        let n = order.len();
        let mut groups: Quadrants<Vec<OffsetNumber>> = Quadrants::default();
        let mut quadrant = 0;
        for (i, entry) in order.iter().enumerate() {
            let boundary = (quadrant + 1) * n / 4;
            let tied = i > 0 && mid(order[i - 1].key) == mid(entry.key);
            if i >= boundary && quadrant < 3 && !tied {
                quadrant += 1;
            }
            groups[Quadrant::ALL[quadrant]].push(entry.offset);
        }
        for group in groups.iter_mut().map(|(_, g)| g) {
            group.sort_unstable();
        }
        let summaries = group_summaries(self, column, &groups, entries);
        PickSplitOut::new(groups, summaries)
    }

    fn same(&self, _column: usize, a: &Interval, b: &Interval) -> bool {
        a == b
    }

    fn validate(&self, _column: usize, key: &Interval) -> SpatialResult<()> {
        if key.is_valid() {
            Ok(())
        } else {
            Err(SpatialError::MalformedGeometry(format!(
                "range [{}, {}] has low > high or a NaN bound",
                key.low, key.high
            )))
        }
    }
}
