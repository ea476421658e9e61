//! Query argument shapes.
//!
//! The quadtree only ever compares boxes. Points and envelopes are boxes
//! already; circles and polygons are reduced to their bounding box, which
//! is why a match on one of them must be rechecked against
//! the real shape (see [`Geometry::is_bounding_box_exact`]). The refine
//! helpers here perform that recheck for the shapes this crate knows.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::bounding_box::BoundingBox;
use crate::errors::{SpatialError, SpatialResult};

/// A 2D coordinate (x, y).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    /// Creates a new coordinate.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculates the Euclidean distance to another coordinate.
    pub fn distance(&self, other: &Coordinate) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A 2D point geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    coordinate: Coordinate,
}

impl Point {
    /// Creates a new point at the given coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            coordinate: Coordinate::new(x, y),
        }
    }

    /// Gets the x coordinate.
    pub fn x(&self) -> f64 {
        self.coordinate.x
    }

    /// Gets the y coordinate.
    pub fn y(&self) -> f64 {
        self.coordinate.y
    }

    /// Gets the coordinate.
    pub fn coordinate(&self) -> &Coordinate {
        &self.coordinate
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "POINT({} {})", self.coordinate.x, self.coordinate.y)
    }
}

/// A query argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// A single point.
    Point(Point),
    /// A circle defined by center and radius.
    Circle { center: Point, radius: f64 },
    /// A polygon defined by its exterior ring coordinates.
    Polygon(Vec<Coordinate>),
    /// A bounding box (rectangle).
    Envelope(BoundingBox),
}

impl Geometry {
    /// Creates a point geometry.
    pub fn point(x: f64, y: f64) -> Self {
        Geometry::Point(Point::new(x, y))
    }

    /// Creates a circle geometry.
    pub fn circle(center_x: f64, center_y: f64, radius: f64) -> Self {
        Geometry::Circle {
            center: Point::new(center_x, center_y),
            radius,
        }
    }

    /// Creates a polygon from coordinates.
    pub fn polygon(coords: Vec<Coordinate>) -> Self {
        Geometry::Polygon(coords)
    }

    /// Creates an envelope (bounding box) geometry.
    pub fn envelope(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Geometry::Envelope(BoundingBox::new(min_x, min_y, max_x, max_y))
    }

    /// Gets the bounding box of this geometry.
    ///
    /// # Errors
    ///
    /// Returns `MalformedGeometry` for an empty polygon, a non-finite
    /// coordinate, or a negative or NaN radius.
    pub fn bounding_box(&self) -> SpatialResult<BoundingBox> {
        match self {
            Geometry::Point(p) => Ok(BoundingBox::new(p.x(), p.y(), p.x(), p.y())),
            Geometry::Circle { center, radius } => {
                if !(*radius >= 0.0) {
                    return Err(SpatialError::MalformedGeometry(format!(
                        "circle radius {} is negative or NaN",
                        radius
                    )));
                }
                Ok(BoundingBox::new(
                    center.x() - radius,
                    center.y() - radius,
                    center.x() + radius,
                    center.y() + radius,
                ))
            }
            Geometry::Polygon(coords) => {
                if coords.is_empty() {
                    return Err(SpatialError::MalformedGeometry(
                        "polygon has no coordinates".into(),
                    ));
                }
                if let Some(bad) = coords.iter().find(|c| !c.is_finite()) {
                    return Err(SpatialError::MalformedGeometry(format!(
                        "polygon coordinate {} is not finite",
                        bad
                    )));
                }
                let mut min_x = f64::MAX;
                let mut min_y = f64::MAX;
                let mut max_x = f64::MIN;
                let mut max_y = f64::MIN;
                for c in coords {
                    min_x = min_x.min(c.x);
                    min_y = min_y.min(c.y);
                    max_x = max_x.max(c.x);
                    max_y = max_y.max(c.y);
                }
                Ok(BoundingBox::new(min_x, min_y, max_x, max_y))
            }
            Geometry::Envelope(bbox) => Ok(*bbox),
        }
    }

    /// True if the bounding box carries the whole shape.
    pub fn is_bounding_box_exact(&self) -> bool {
        matches!(self, Geometry::Point(_) | Geometry::Envelope(_))
    }

    /// Checks whether the shape shares at least one point with `bbox`.
    pub fn intersects_box(&self, bbox: &BoundingBox) -> bool {
        match self {
            Geometry::Point(p) => bbox.contains_point(p.x(), p.y()),
            Geometry::Envelope(env) => env.intersects(bbox),
            Geometry::Circle { center, radius } => {
                let closest_x = center.x().clamp(bbox.min_x, bbox.max_x);
                let closest_y = center.y().clamp(bbox.min_y, bbox.max_y);
                center.coordinate().distance(&Coordinate::new(closest_x, closest_y)) <= *radius
            }
            Geometry::Polygon(coords) => polygon_intersects_box(coords, bbox),
        }
    }

    /// Checks whether the shape lies entirely inside `bbox`.
    ///
    /// A box is convex, so a polygon is inside it exactly when all of its
    /// vertices are.
    pub fn is_within_box(&self, bbox: &BoundingBox) -> bool {
        match self.bounding_box() {
            Ok(own) => bbox.contains(&own),
            Err(_) => false,
        }
    }

    /// Checks whether `bbox` lies entirely inside the shape.
    pub fn contains_box(&self, bbox: &BoundingBox) -> bool {
        let corners = [
            Coordinate::new(bbox.min_x, bbox.min_y),
            Coordinate::new(bbox.max_x, bbox.min_y),
            Coordinate::new(bbox.max_x, bbox.max_y),
            Coordinate::new(bbox.min_x, bbox.max_y),
        ];
        match self {
            Geometry::Point(p) => bbox.is_point() && bbox.contains_point(p.x(), p.y()),
            Geometry::Envelope(env) => env.contains(bbox),
            // The farthest point of a box from any center is one of its corners.
            Geometry::Circle { center, radius } => corners
                .iter()
                .all(|c| center.coordinate().distance(c) <= *radius),
            Geometry::Polygon(coords) => {
                corners.iter().all(|c| point_in_polygon(c, coords))
                    && !edges(coords).any(|(a, b)| segment_crosses_box_interior(a, b, bbox))
            }
        }
    }
}

impl Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Geometry::Point(p) => write!(f, "{}", p),
            Geometry::Circle { center, radius } => {
                write!(f, "CIRCLE({} {}, {})", center.x(), center.y(), radius)
            }
            Geometry::Polygon(coords) => {
                write!(f, "POLYGON((")?;
                for (i, c) in coords.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} {}", c.x, c.y)?;
                }
                write!(f, "))")
            }
            Geometry::Envelope(bbox) => {
                write!(f, "ENVELOPE({}, {}, {}, {})", bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y)
            }
        }
    }
}

fn edges(polygon: &[Coordinate]) -> impl Iterator<Item = (&Coordinate, &Coordinate)> {
    let n = polygon.len();
    (0..n).map(move |i| (&polygon[i], &polygon[(i + 1) % n]))
}

/// Ray casting algorithm to determine if a point is inside a polygon.
/// Points on the boundary count as inside.
fn point_in_polygon(point: &Coordinate, polygon: &[Coordinate]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    if edges(polygon).any(|(a, b)| point_on_segment(point, a, b)) {
        return true;
    }

    let mut inside = false;
    let n = polygon.len();
    let mut j = n - 1;

    for i in 0..n {
        let xi = polygon[i].x;
        let yi = polygon[i].y;
        let xj = polygon[j].x;
        let yj = polygon[j].y;

        if ((yi > point.y) != (yj > point.y))
            && (point.x < (xj - xi) * (point.y - yi) / (yj - yi) + xi)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

fn point_on_segment(point: &Coordinate, a: &Coordinate, b: &Coordinate) -> bool {
    let cross = (b.x - a.x) * (point.y - a.y) - (b.y - a.y) * (point.x - a.x);
    cross == 0.0
        && point.x >= a.x.min(b.x)
        && point.x <= a.x.max(b.x)
        && point.y >= a.y.min(b.y)
        && point.y <= a.y.max(b.y)
}

fn polygon_intersects_box(polygon: &[Coordinate], bbox: &BoundingBox) -> bool {
    if polygon.iter().any(|c| bbox.contains_point(c.x, c.y)) {
        return true;
    }
    let corner = Coordinate::new(bbox.min_x, bbox.min_y);
    if point_in_polygon(&corner, polygon) {
        return true;
    }
    edges(polygon).any(|(a, b)| segment_intersects_box(a, b, bbox))
}

/// Liang-Barsky clipping of segment `a`-`b` against a closed box.
/// Returns the clipped parameter range, if any.
fn clip_segment(a: &Coordinate, b: &Coordinate, bbox: &BoundingBox) -> Option<(f64, f64)> {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    let checks = [
        (-dx, a.x - bbox.min_x),
        (dx, bbox.max_x - a.x),
        (-dy, a.y - bbox.min_y),
        (dy, bbox.max_y - a.y),
    ];
    for (p, q) in checks {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
            if t0 > t1 {
                return None;
            }
        }
    }
    Some((t0, t1))
}

fn segment_intersects_box(a: &Coordinate, b: &Coordinate, bbox: &BoundingBox) -> bool {
    clip_segment(a, b, bbox).is_some()
}

fn segment_crosses_box_interior(a: &Coordinate, b: &Coordinate, bbox: &BoundingBox) -> bool {
    let Some((t0, t1)) = clip_segment(a, b, bbox) else {
        return false;
    };
    let mid_t = (t0 + t1) / 2.0;
    let mid = Coordinate::new(a.x + (b.x - a.x) * mid_t, a.y + (b.y - a.y) * mid_t);
    mid.x > bbox.min_x && mid.x < bbox.max_x && mid.y > bbox.min_y && mid.y < bbox.max_y
}
