//! Insertion level and quadrant path for a new object.

use crate::bounding_box::BoundingBox;
use crate::diagnostics::Diagnostic;
use crate::errors::SpatialResult;
use crate::quadtree::classifier::classify;
use crate::quadtree::loose_quadtree::LooseQuadtree;
use crate::quadtree::quadtree_constants::RADIUS_FACTOR;
use crate::quadtree::quadtree_types::InsertionChoice;

impl LooseQuadtree {
    /// Decides how far below the node with `centroid` (at `level`) the
    /// object belongs, and which quadrant to take at each new level.
    ///
    /// The object's natural level is the one whose cells are about four
    /// times its radius: `max(0, floor(log2(extent / radius)) - 1)`. Small
    /// objects sink deeper; points would sink forever, hence the cap from
    /// [`QuadtreeConfig::max_insert_levels`](crate::QuadtreeConfig::max_insert_levels).
    ///
    /// # Errors
    ///
    /// Returns `MalformedGeometry` if either box is malformed.
    pub fn choose(
        &self,
        centroid: &BoundingBox,
        level: u32,
        object: &BoundingBox,
    ) -> SpatialResult<InsertionChoice> {
        centroid.validate()?;
        object.validate()?;

        let candidate_level = candidate_level(centroid, object);
        let levels_to_descend = candidate_level
            .saturating_sub(level)
            .min(self.config.get_max_insert_levels());
        self.emit(Diagnostic::InsertionLevel {
            level,
            candidate_level,
            levels_to_descend,
        });

        let mut path = Vec::with_capacity(levels_to_descend as usize + 1);
        let mut sub_centroids = Vec::with_capacity(levels_to_descend as usize);

        let mut reference = *centroid;
        let mut quadrant = classify(&reference, object);
        path.push(quadrant);
        self.emit(Diagnostic::QuadrantChosen { depth: 0, quadrant });

        for depth in 1..=levels_to_descend {
            reference = reference.quadrant_box(quadrant);
            sub_centroids.push(reference);
            quadrant = classify(&reference, object);
            path.push(quadrant);
            self.emit(Diagnostic::QuadrantChosen { depth, quadrant });
        }

        Ok(InsertionChoice {
            levels_to_descend,
            path,
            sub_centroids,
        })
    }
}

fn candidate_level(centroid: &BoundingBox, object: &BoundingBox) -> u32 {
    let extent = centroid.extent();
    let radius = object.extent() * RADIUS_FACTOR;
    if extent <= 0.0 {
        return 0;
    }
    let ratio = extent / radius;
    if ratio.is_nan() {
        return 0;
    }
    // `as` saturates: an infinite ratio (zero radius) maps to u32::MAX.
    (ratio.log2().floor() - 1.0).max(0.0) as u32
}
