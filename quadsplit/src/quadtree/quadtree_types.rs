//! Core types used by the loose quadtree:
//! - Intervals and their 2D/4D compositions (range boxes, rect boxes)
//! - Query strategies and scan keys
//! - Results of choose, pick-split and the consistent functions

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::bounding_box::BoundingBox;
use crate::errors::{SpatialError, SpatialResult};
use crate::geometry::Geometry;
use crate::quadrant::{Quadrant, Quadrants};
use crate::quadtree::quadtree_constants::*;

// ============================================================================
// Intervals
// ============================================================================

/// A closed range `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub low: f64,
    pub high: f64,
}

impl Interval {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// `(-inf, +inf)`
    pub fn unbounded() -> Self {
        Self::new(f64::NEG_INFINITY, f64::INFINITY)
    }

    pub fn is_valid(&self) -> bool {
        self.low <= self.high
    }

    /// True if `self` lies inside `outer`.
    pub fn is_within(&self, outer: &Interval) -> bool {
        self.low >= outer.low && self.high <= outer.high
    }
}

/// Two intervals. For a box these are its x- and y-projections; inside a
/// [`RectBox`] they are the admissible ranges of one axis' low and high
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeBox {
    pub left: Interval,
    pub right: Interval,
}

impl RangeBox {
    pub fn new(left: Interval, right: Interval) -> Self {
        Self { left, right }
    }

    pub fn unbounded() -> Self {
        Self::new(Interval::unbounded(), Interval::unbounded())
    }

    pub fn is_within(&self, outer: &RangeBox) -> bool {
        self.left.is_within(&outer.left) && self.right.is_within(&outer.right)
    }
}

/// Bounds of every box that can live under a tree node, seen as a point in
/// 4D space `(min_x, max_x, min_y, max_y)`.
///
/// `range_box_x.left` bounds `min_x`, `range_box_x.right` bounds `max_x`,
/// and likewise for y. The root starts unbounded; each descent narrows it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectBox {
    pub range_box_x: RangeBox,
    pub range_box_y: RangeBox,
}

impl Default for RectBox {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl RectBox {
    /// The traversal value of the root: no restriction at all.
    pub fn unbounded() -> Self {
        Self {
            range_box_x: RangeBox::unbounded(),
            range_box_y: RangeBox::unbounded(),
        }
    }

    /// Traversal value of the child in `quadrant` of a node whose centroid
    /// has center `(cx, cy)`.
    ///
    /// Each quadrant bit narrows exactly one bound. A box whose center is
    /// east of `cx` must reach `cx` with its max_x; a box whose center is
    /// west of `cx` must start before `cx` with its min_x. The y axis works
    /// the same way with north and south swapped. Bounds only ever shrink.
    pub fn next(&self, center: (f64, f64), quadrant: Quadrant) -> RectBox {
        let (cx, cy) = center;
        let mut next = *self;

        if quadrant.is_east() {
            next.range_box_x.right.low = next.range_box_x.right.low.max(cx);
        } else {
            next.range_box_x.left.high = next.range_box_x.left.high.min(cx);
        }

        if quadrant.is_south() {
            next.range_box_y.left.high = next.range_box_y.left.high.min(cy);
        } else {
            next.range_box_y.right.low = next.range_box_y.right.low.max(cy);
        }

        next
    }

    /// True if every bound of `self` lies inside the matching bound of `outer`.
    pub fn is_within(&self, outer: &RectBox) -> bool {
        self.range_box_x.is_within(&outer.range_box_x)
            && self.range_box_y.is_within(&outer.range_box_y)
    }

    /// Rejects traversal values with an inverted or NaN bound.
    ///
    /// # Errors
    ///
    /// Returns `MalformedGeometry` naming the first bad bound.
    pub fn validate(&self) -> SpatialResult<()> {
        let bounds = [
            ("min_x", &self.range_box_x.left),
            ("max_x", &self.range_box_x.right),
            ("min_y", &self.range_box_y.left),
            ("max_y", &self.range_box_y.right),
        ];
        match bounds.iter().find(|(_, interval)| !interval.is_valid()) {
            Some((name, interval)) => Err(SpatialError::MalformedGeometry(format!(
                "traversal bound for {} is [{}, {}]",
                name, interval.low, interval.high
            ))),
            None => Ok(()),
        }
    }

    /// True if `bbox`, seen as a 4D point, lies inside these bounds.
    pub fn admits_box(&self, bbox: &BoundingBox) -> bool {
        let in_range = |v: f64, r: &Interval| v >= r.low && v <= r.high;
        in_range(bbox.min_x, &self.range_box_x.left)
            && in_range(bbox.max_x, &self.range_box_x.right)
            && in_range(bbox.min_y, &self.range_box_y.left)
            && in_range(bbox.max_y, &self.range_box_y.right)
    }
}

// ============================================================================
// Strategies and scan keys
// ============================================================================

/// A query predicate between an indexed box and the query argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Indexed box is strictly left of the query.
    Left,
    /// Indexed box does not extend to the right of the query.
    OverLeft,
    /// Indexed box and query share at least one point.
    Overlap,
    /// Indexed box does not extend to the left of the query.
    OverRight,
    /// Indexed box is strictly right of the query.
    Right,
    /// Indexed box equals the query.
    Same,
    /// Indexed box contains the query.
    Contains,
    /// Indexed box is contained by the query.
    ContainedBy,
    /// Indexed box does not extend above the query.
    OverBelow,
    /// Indexed box is strictly below the query.
    Below,
    /// Indexed box is strictly above the query.
    Above,
    /// Indexed box does not extend below the query.
    OverAbove,
}

impl Strategy {
    /// Every strategy in strategy-number order.
    pub const ALL: [Strategy; 12] = [
        Strategy::Left,
        Strategy::OverLeft,
        Strategy::Overlap,
        Strategy::OverRight,
        Strategy::Right,
        Strategy::Same,
        Strategy::Contains,
        Strategy::ContainedBy,
        Strategy::OverBelow,
        Strategy::Below,
        Strategy::Above,
        Strategy::OverAbove,
    ];

    /// The R-tree strategy number of this predicate.
    pub fn number(self) -> u16 {
        match self {
            Strategy::Left => LEFT_STRATEGY,
            Strategy::OverLeft => OVER_LEFT_STRATEGY,
            Strategy::Overlap => OVERLAP_STRATEGY,
            Strategy::OverRight => OVER_RIGHT_STRATEGY,
            Strategy::Right => RIGHT_STRATEGY,
            Strategy::Same => SAME_STRATEGY,
            Strategy::Contains => CONTAINS_STRATEGY,
            Strategy::ContainedBy => CONTAINED_BY_STRATEGY,
            Strategy::OverBelow => OVER_BELOW_STRATEGY,
            Strategy::Below => BELOW_STRATEGY,
            Strategy::Above => ABOVE_STRATEGY,
            Strategy::OverAbove => OVER_ABOVE_STRATEGY,
        }
    }

    /// Whether testing a lossy shape through its bounding box gives the
    /// exact answer. Directional predicates only look at the extremes of
    /// the shape, which its bounding box preserves.
    pub fn is_bounding_box_test_exact(self) -> bool {
        matches!(
            self,
            Strategy::Left
                | Strategy::OverLeft
                | Strategy::OverRight
                | Strategy::Right
                | Strategy::OverBelow
                | Strategy::Below
                | Strategy::Above
                | Strategy::OverAbove
        )
    }
}

impl TryFrom<u16> for Strategy {
    type Error = SpatialError;

    fn try_from(number: u16) -> SpatialResult<Self> {
        Strategy::ALL
            .into_iter()
            .find(|s| s.number() == number)
            .ok_or(SpatialError::UnrecognizedStrategy(number))
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            Strategy::Left => "<<",
            Strategy::OverLeft => "&<",
            Strategy::Overlap => "&&",
            Strategy::OverRight => "&>",
            Strategy::Right => ">>",
            Strategy::Same => "~=",
            Strategy::Contains => "@>",
            Strategy::ContainedBy => "<@",
            Strategy::OverBelow => "&<|",
            Strategy::Below => "<<|",
            Strategy::Above => "|>>",
            Strategy::OverAbove => "|&>",
        };
        write!(f, "{}", op)
    }
}

/// One query predicate: a strategy and its argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanKey {
    pub strategy: Strategy,
    pub argument: Geometry,
}

impl ScanKey {
    pub fn new(strategy: Strategy, argument: Geometry) -> Self {
        Self { strategy, argument }
    }

    /// Shorthand for a key whose argument is a box.
    pub fn with_box(strategy: Strategy, bbox: BoundingBox) -> Self {
        Self::new(strategy, Geometry::Envelope(bbox))
    }

    /// Builds a key from a raw strategy number.
    ///
    /// # Errors
    ///
    /// Returns `UnrecognizedStrategy` for numbers outside 1..=12.
    pub fn from_number(number: u16, argument: Geometry) -> SpatialResult<Self> {
        Ok(Self::new(Strategy::try_from(number)?, argument))
    }

    /// Bounding box of the argument, validated, and whether a match on it
    /// must be rechecked against the argument itself. Every strategy is
    /// flagged when the argument is a circle or polygon.
    pub(crate) fn query_box(&self) -> SpatialResult<(BoundingBox, bool)> {
        let bbox = self.argument.bounding_box()?;
        bbox.validate()?;
        Ok((bbox, !self.argument.is_bounding_box_exact()))
    }
}

impl Display for ScanKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.strategy, self.argument)
    }
}

// ============================================================================
// Operation results
// ============================================================================

/// Where to put a new object below an inner node.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertionChoice {
    /// Extra subdivision levels to create below the current node.
    pub levels_to_descend: u32,
    /// `path[0]` is the child of the current node; `path[i]` is the child
    /// of the i-th new intermediate level. Always `levels_to_descend + 1`
    /// long.
    pub path: Vec<Quadrant>,
    /// Reference boxes of the new intermediate levels, in descent order.
    pub sub_centroids: Vec<BoundingBox>,
}

impl InsertionChoice {
    /// The quadrant at the deepest new level.
    pub fn target(&self) -> Quadrant {
        self.path.last().copied().unwrap_or(Quadrant::NorthWest)
    }

    /// The child of the current node to descend into.
    pub fn first(&self) -> Quadrant {
        self.path.first().copied().unwrap_or(Quadrant::NorthWest)
    }
}

/// Result of splitting an overflowing leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafSplit {
    pub centroid: BoundingBox,
    /// 0-based positions of the input boxes, per quadrant. Groups may be empty.
    pub groups: Quadrants<Vec<usize>>,
}

impl LeafSplit {
    pub fn group_sizes(&self) -> [usize; 4] {
        self.groups.as_ref().map(|g| g.len()).into_inner()
    }

    /// True if every entry landed in the same quadrant.
    pub fn is_all_the_same(&self) -> bool {
        self.groups.values().filter(|g| !g.is_empty()).count() <= 1
    }
}

/// A child the query walk should visit, with its traversal value.
#[derive(Debug, Clone, PartialEq)]
pub struct AdmittedChild {
    pub quadrant: Quadrant,
    pub traversal: RectBox,
}

/// Outcome of testing one leaf box against the scan keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeafMatch {
    pub matches: bool,
    /// The caller must re-verify against the real query shape.
    pub recheck: bool,
}
