use std::hash::Hash;

use crate::errors::{SpatialError, SpatialResult};
use crate::quadrant::Quadrant;
use crate::quadtree::quadtree_types::{Interval, RangeBox};

/// A 2D bounding box represented by minimum and maximum coordinates.
///
/// `BoundingBox` defines a rectangular area in 2D space using the minimum
/// (min_x, min_y) and maximum (max_x, max_y) corners. It is the leaf datum
/// of the loose quadtree, the centroid of every inner node and the key type
/// of the box operator class used by the page splitter.
///
/// # Examples
///
/// ```rust
/// use quadsplit::BoundingBox;
///
/// let bbox = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
/// assert!(bbox.contains_point(50.0, 50.0));
/// assert_eq!(bbox.center(), (50.0, 50.0));
/// ```
#[derive(Clone, Copy, PartialEq, Default, Debug, serde::Deserialize, serde::Serialize)]
pub struct BoundingBox {
    /// Minimum X coordinate
    pub min_x: f64,
    /// Minimum Y coordinate
    pub min_y: f64,
    /// Maximum X coordinate
    pub max_x: f64,
    /// Maximum Y coordinate
    pub max_y: f64,
}

impl Eq for BoundingBox {}

impl PartialOrd for BoundingBox {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BoundingBox {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.min_x
            .total_cmp(&other.min_x)
            .then(self.min_y.total_cmp(&other.min_y))
            .then(self.max_x.total_cmp(&other.max_x))
            .then(self.max_y.total_cmp(&other.max_y))
    }
}

impl Hash for BoundingBox {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.min_x.to_bits().hash(state);
        self.min_y.to_bits().hash(state);
        self.max_x.to_bits().hash(state);
        self.max_y.to_bits().hash(state);
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BoundingBox({}, {}, {}, {})", self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

impl BoundingBox {
    /// Creates a new bounding box with the specified coordinates.
    ///
    /// No validation happens here; entry points that depend on `min <= max`
    /// call [`BoundingBox::validate`].
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> BoundingBox {
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Creates the smallest box covering all `boxes`, or `None` if empty.
    pub fn hull<'a>(boxes: impl IntoIterator<Item = &'a BoundingBox>) -> Option<BoundingBox> {
        boxes.into_iter().copied().reduce(|acc, b| acc.union(&b))
    }

    /// Returns the width of the bounding box.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounding box.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Returns the area of the bounding box.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Returns the larger of width and height.
    pub fn extent(&self) -> f64 {
        self.width().max(self.height())
    }

    /// Returns the center point of the bounding box.
    pub fn center(&self) -> (f64, f64) {
        (
            self.min_x + self.width() / 2.0,
            self.min_y + self.height() / 2.0,
        )
    }

    /// Checks if this bounding box contains a point.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Checks if this bounding box contains another bounding box.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.min_x >= self.min_x && other.max_x <= self.max_x
            && other.min_y >= self.min_y && other.max_y <= self.max_y
    }

    /// Checks if this bounding box intersects another bounding box.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x && self.max_x >= other.min_x
            && self.min_y <= other.max_y && self.max_y >= other.min_y
    }

    /// Returns the union of this bounding box with another.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    /// Area growth needed for this box to also cover `other`.
    pub fn enlargement(&self, other: &BoundingBox) -> f64 {
        self.union(other).area() - self.area()
    }

    /// Returns the sub-rectangle of `quadrant` after cutting this box at its
    /// midpoint on both axes.
    pub fn quadrant_box(&self, quadrant: Quadrant) -> BoundingBox {
        let (mid_x, mid_y) = self.center();
        let mut sub = *self;
        if quadrant.is_east() {
            sub.min_x = mid_x;
        } else {
            sub.max_x = mid_x;
        }
        if quadrant.is_south() {
            sub.max_y = mid_y;
        } else {
            sub.min_y = mid_y;
        }
        sub
    }

    /// Checks if this bounding box is a point (zero area).
    pub fn is_point(&self) -> bool {
        self.min_x == self.max_x && self.min_y == self.max_y
    }

    /// Checks if this bounding box is valid (min <= max, no NaN).
    pub fn is_valid(&self) -> bool {
        self.min_x <= self.max_x && self.min_y <= self.max_y
    }

    /// Fails with `MalformedGeometry` unless [`BoundingBox::is_valid`].
    ///
    /// # Errors
    ///
    /// Returns `MalformedGeometry` naming the box when either axis has
    /// `min > max` or a NaN coordinate.
    pub fn validate(&self) -> SpatialResult<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(SpatialError::MalformedGeometry(format!(
                "{} has min > max or a NaN coordinate",
                self
            )))
        }
    }

    /// Splits the box into its x- and y-projections.
    pub fn to_range_box(&self) -> RangeBox {
        RangeBox::new(
            Interval::new(self.min_x, self.max_x),
            Interval::new(self.min_y, self.max_y),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_new() {
        let bbox = BoundingBox::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(bbox.min_x, 1.0);
        assert_eq!(bbox.min_y, 2.0);
        assert_eq!(bbox.max_x, 3.0);
        assert_eq!(bbox.max_y, 4.0);
    }

    #[test]
    fn test_ordering() {
        let bbox1 = BoundingBox::new(1.0, 2.0, 3.0, 4.0);
        let bbox2 = BoundingBox::new(2.0, 2.0, 3.0, 4.0);
        let bbox3 = BoundingBox::new(1.0, 3.0, 3.0, 4.0);

        assert!(bbox1 < bbox2);
        assert!(bbox1 < bbox3);
        assert!(bbox2 > bbox1);
    }

    #[test]
    fn test_hash() {
        let bbox1 = BoundingBox::new(1.0, 2.0, 3.0, 4.0);
        let bbox2 = BoundingBox::new(1.0, 2.0, 3.0, 4.0);
        let bbox3 = BoundingBox::new(5.0, 6.0, 7.0, 8.0);

        let mut set = HashSet::new();
        set.insert(bbox1);

        assert!(set.contains(&bbox2));
        assert!(!set.contains(&bbox3));
    }

    #[test]
    fn test_width_height_extent() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 5.0);
        assert_eq!(bbox.width(), 10.0);
        assert_eq!(bbox.height(), 5.0);
        assert_eq!(bbox.area(), 50.0);
        assert_eq!(bbox.extent(), 10.0);
    }

    #[test]
    fn test_center() {
        let bbox = BoundingBox::new(-10.0, -5.0, 10.0, 5.0);
        assert_eq!(bbox.center(), (0.0, 0.0));
    }

    #[test]
    fn test_contains_and_intersects() {
        let outer = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let inner = BoundingBox::new(2.0, 2.0, 8.0, 8.0);
        let touching = BoundingBox::new(10.0, 10.0, 20.0, 20.0);
        let outside = BoundingBox::new(20.5, 20.5, 30.0, 30.0);

        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(outer.intersects(&touching));
        assert!(!outer.intersects(&outside));
    }

    #[test]
    fn test_union_and_hull() {
        let a = BoundingBox::new(0.0, 0.0, 5.0, 5.0);
        let b = BoundingBox::new(3.0, 3.0, 10.0, 10.0);
        let c = BoundingBox::new(-1.0, 4.0, 0.0, 12.0);

        assert_eq!(a.union(&b), BoundingBox::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(
            BoundingBox::hull([a, b, c].iter()),
            Some(BoundingBox::new(-1.0, 0.0, 10.0, 12.0))
        );
        assert_eq!(BoundingBox::hull(std::iter::empty()), None);
    }

    #[test]
    fn test_enlargement() {
        let a = BoundingBox::new(0.0, 0.0, 2.0, 2.0);
        assert_eq!(a.enlargement(&BoundingBox::new(1.0, 1.0, 2.0, 2.0)), 0.0);
        assert_eq!(a.enlargement(&BoundingBox::new(0.0, 0.0, 4.0, 2.0)), 4.0);
    }

    #[test]
    fn test_quadrant_box() {
        let cell = BoundingBox::new(0.0, 0.0, 16.0, 16.0);
        assert_eq!(cell.quadrant_box(Quadrant::NorthWest), BoundingBox::new(0.0, 8.0, 8.0, 16.0));
        assert_eq!(cell.quadrant_box(Quadrant::NorthEast), BoundingBox::new(8.0, 8.0, 16.0, 16.0));
        assert_eq!(cell.quadrant_box(Quadrant::SouthWest), BoundingBox::new(0.0, 0.0, 8.0, 8.0));
        assert_eq!(cell.quadrant_box(Quadrant::SouthEast), BoundingBox::new(8.0, 0.0, 16.0, 8.0));
    }

    #[test]
    fn test_is_valid_and_validate() {
        let valid = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let inverted = BoundingBox::new(10.0, 0.0, 0.0, 10.0);
        let nan = BoundingBox::new(f64::NAN, 0.0, 1.0, 1.0);
        let point = BoundingBox::new(5.0, 5.0, 5.0, 5.0);

        assert!(valid.validate().is_ok());
        assert!(point.is_point());
        assert!(point.validate().is_ok());
        assert!(matches!(inverted.validate(), Err(SpatialError::MalformedGeometry(_))));
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_to_range_box() {
        let rb = BoundingBox::new(1.0, 2.0, 3.0, 4.0).to_range_box();
        assert_eq!(rb.left, Interval::new(1.0, 3.0));
        assert_eq!(rb.right, Interval::new(2.0, 4.0));
    }

    #[test]
    fn test_serialization() {
        let bbox = BoundingBox::new(1.5, 2.5, 3.5, 4.5);
        let json = serde_json::to_string(&bbox).unwrap();
        let deserialized: BoundingBox = serde_json::from_str(&json).unwrap();
        assert_eq!(bbox, deserialized);
    }

    #[test]
    fn test_display() {
        let bbox = BoundingBox::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(format!("{}", bbox), "BoundingBox(1, 2, 3, 4)");
    }
}
