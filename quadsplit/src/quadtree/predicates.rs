//! Box predicates used by the consistent functions.
//!
//! Two families:
//! - 4D predicates answer "could any box under this node satisfy the
//!   strategy?" given the node's [`RectBox`]. They must never return false
//!   for a node that holds a match.
//! - Exact predicates compare one stored box with the query box.

use crate::bounding_box::BoundingBox;
use crate::geometry::Geometry;
use crate::quadtree::quadtree_types::{Interval, RangeBox, RectBox, Strategy};

// ============================================================================
// 4D predicates on one axis
// ============================================================================
//
// `bounds.left` is the range of the low coordinate, `bounds.right` the range
// of the high coordinate; `q` is the query's projection on the same axis.

fn overlap_axis(bounds: &RangeBox, q: &Interval) -> bool {
    bounds.right.high >= q.low && bounds.left.low <= q.high
}

fn contain_axis(bounds: &RangeBox, q: &Interval) -> bool {
    bounds.right.high >= q.high && bounds.left.low <= q.low
}

fn intersects(a: &Interval, b: &Interval) -> bool {
    a.low <= b.high && a.high >= b.low
}

fn contained_axis(bounds: &RangeBox, q: &Interval) -> bool {
    intersects(&bounds.left, q) && intersects(&bounds.right, q)
}

fn lower_axis(bounds: &RangeBox, q: &Interval) -> bool {
    bounds.left.low < q.low && bounds.right.low < q.low
}

fn over_lower_axis(bounds: &RangeBox, q: &Interval) -> bool {
    bounds.left.low <= q.high && bounds.right.low <= q.high
}

fn higher_axis(bounds: &RangeBox, q: &Interval) -> bool {
    bounds.left.high > q.high && bounds.right.high > q.high
}

fn over_higher_axis(bounds: &RangeBox, q: &Interval) -> bool {
    bounds.left.high >= q.low && bounds.right.high >= q.low
}

/// Whether a node with traversal value `rect` may hold a box satisfying
/// `strategy` against `query`.
pub fn admits(rect: &RectBox, strategy: Strategy, query: &BoundingBox) -> bool {
    let q = query.to_range_box();
    let (qx, qy) = (&q.left, &q.right);
    let (bx, by) = (&rect.range_box_x, &rect.range_box_y);

    match strategy {
        Strategy::Overlap => overlap_axis(bx, qx) && overlap_axis(by, qy),
        Strategy::Contains => contain_axis(bx, qx) && contain_axis(by, qy),
        Strategy::ContainedBy | Strategy::Same => {
            contained_axis(bx, qx) && contained_axis(by, qy)
        }
        Strategy::Left => lower_axis(bx, qx),
        Strategy::OverLeft => over_lower_axis(bx, qx),
        Strategy::Right => higher_axis(bx, qx),
        Strategy::OverRight => over_higher_axis(bx, qx),
        Strategy::Below => lower_axis(by, qy),
        Strategy::OverBelow => over_lower_axis(by, qy),
        Strategy::Above => higher_axis(by, qy),
        Strategy::OverAbove => over_higher_axis(by, qy),
    }
}

// ============================================================================
// Exact predicates
// ============================================================================

/// Evaluates `stored <strategy> query` on the boxes themselves.
pub fn matches_exact(stored: &BoundingBox, strategy: Strategy, query: &BoundingBox) -> bool {
    let (a, b) = (stored, query);
    match strategy {
        Strategy::Left => a.max_x < b.min_x,
        Strategy::OverLeft => a.max_x <= b.max_x,
        Strategy::Overlap => a.intersects(b),
        Strategy::OverRight => a.min_x >= b.min_x,
        Strategy::Right => a.min_x > b.max_x,
        Strategy::Same => a == b,
        Strategy::Contains => a.contains(b),
        Strategy::ContainedBy => b.contains(a),
        Strategy::OverBelow => a.max_y <= b.max_y,
        Strategy::Below => a.max_y < b.min_y,
        Strategy::Above => a.min_y > b.max_y,
        Strategy::OverAbove => a.min_y >= b.min_y,
    }
}

/// Re-evaluates a box-level match against the real query shape.
///
/// Used after a leaf reported `recheck`. Directional strategies only look at
/// the extremes of the shape, so they are settled by the box test.
pub fn refine(stored: &BoundingBox, strategy: Strategy, argument: &Geometry) -> bool {
    if strategy.is_bounding_box_test_exact() {
        return match argument.bounding_box() {
            Ok(query) => matches_exact(stored, strategy, &query),
            Err(_) => false,
        };
    }
    match strategy {
        Strategy::Overlap => argument.intersects_box(stored),
        Strategy::Contains => argument.is_within_box(stored),
        Strategy::ContainedBy => argument.contains_box(stored),
        _ => argument.contains_box(stored) && argument.is_within_box(stored),
    }
}
