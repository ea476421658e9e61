//! Leaf split around a median centroid.

use crate::bounding_box::BoundingBox;
use crate::diagnostics::Diagnostic;
use crate::errors::{SpatialError, SpatialResult};
use crate::quadrant::Quadrants;
use crate::quadtree::classifier::classify;
use crate::quadtree::loose_quadtree::LooseQuadtree;
use crate::quadtree::quadtree_types::LeafSplit;

impl LooseQuadtree {
    /// Splits an overflowing leaf into four quadrants.
    ///
    /// The centroid is a square spanning from the smaller of the median
    /// low-x and low-y to the larger of the median high-x and high-y, which
    /// keeps it well formed even when the inputs are skewed. Every box is
    /// then classified against it; groups may come out empty.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` for an empty input and `MalformedGeometry`
    /// if any box is malformed.
    pub fn pick_split(&self, boxes: &[BoundingBox]) -> SpatialResult<LeafSplit> {
        if boxes.is_empty() {
            return Err(SpatialError::InvalidOperation(
                "cannot split an empty leaf".into(),
            ));
        }
        for bbox in boxes {
            bbox.validate()?;
        }

        let centroid = median_centroid(boxes);

        let mut groups: Quadrants<Vec<usize>> = Quadrants::default();
        for (i, bbox) in boxes.iter().enumerate() {
            groups[classify(&centroid, bbox)].push(i);
        }

        let split = LeafSplit { centroid, groups };
        self.emit(Diagnostic::LeafSplit {
            entries: boxes.len(),
            group_sizes: split.group_sizes(),
        });
        Ok(split)
    }
}

fn sorted(boxes: &[BoundingBox], coordinate: impl Fn(&BoundingBox) -> f64) -> Vec<f64> {
    let mut values: Vec<f64> = boxes.iter().map(coordinate).collect();
    values.sort_by(f64::total_cmp);
    values
}

fn median_centroid(boxes: &[BoundingBox]) -> BoundingBox {
    let median = boxes.len() / 2;

    let low_x = sorted(boxes, |b| b.min_x);
    let low_y = sorted(boxes, |b| b.min_y);
    let high_x = sorted(boxes, |b| b.max_x);
    let high_y = sorted(boxes, |b| b.max_y);

    let low = low_x[median].min(low_y[median]);
    let high = high_x[median].max(high_y[median]);
    BoundingBox::new(low, low, high, high)
}
