use crate::bounding_box::BoundingBox;
use crate::quadrant::Quadrant;

/// Classifies `bbox` into a quadrant of `centroid` by comparing centers.
///
/// A center on the dividing line goes to the east or north half.
pub fn classify(centroid: &BoundingBox, bbox: &BoundingBox) -> Quadrant {
    let (cx, cy) = centroid.center();
    let (x, y) = bbox.center();
    Quadrant::from_halves(x >= cx, y < cy)
}
