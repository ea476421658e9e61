//! Query-time pruning of inner nodes and matching of leaf boxes.

use crate::bounding_box::BoundingBox;
use crate::errors::SpatialResult;
use crate::quadrant::Quadrant;
use crate::quadtree::loose_quadtree::LooseQuadtree;
use crate::quadtree::predicates::{admits, matches_exact};
use crate::quadtree::quadtree_types::{AdmittedChild, LeafMatch, RectBox, ScanKey};

impl LooseQuadtree {
    /// Selects the children of an inner node that may hold matches.
    ///
    /// `traversal` is the value the walk reached this node with (`None` at
    /// the root). Each admitted child carries its own narrowed value, which
    /// the walk must pass back in when it visits that child.
    ///
    /// # Errors
    ///
    /// Returns `MalformedGeometry` if the traversal value, the centroid or a
    /// query argument is malformed.
    pub fn inner_consistent(
        &self,
        traversal: Option<&RectBox>,
        centroid: &BoundingBox,
        all_the_same: bool,
        keys: &[ScanKey],
    ) -> SpatialResult<Vec<AdmittedChild>> {
        centroid.validate()?;
        let queries = keys
            .iter()
            .map(|key| Ok((key.strategy, key.query_box()?.0)))
            .collect::<SpatialResult<Vec<_>>>()?;

        let parent = traversal.copied().unwrap_or_else(RectBox::unbounded);
        parent.validate()?;

        // Children of an all-the-same node were spread arbitrarily, so none
        // of them can be pruned.
        if all_the_same {
            return Ok(Quadrant::ALL
                .into_iter()
                .map(|quadrant| AdmittedChild { quadrant, traversal: parent })
                .collect());
        }

        let center = centroid.center();
        let mut admitted = Vec::with_capacity(4);
        for quadrant in Quadrant::ALL {
            let next = parent.next(center, quadrant);
            if queries.iter().all(|(strategy, query)| admits(&next, *strategy, query)) {
                admitted.push(AdmittedChild { quadrant, traversal: next });
            }
        }
        Ok(admitted)
    }

    /// Tests one stored box against every scan key.
    ///
    /// # Errors
    ///
    /// Returns `MalformedGeometry` if any query argument is malformed.
    pub fn leaf_consistent(&self, leaf: &BoundingBox, keys: &[ScanKey]) -> SpatialResult<LeafMatch> {
        let mut matches = true;
        let mut recheck = false;
        for key in keys {
            let (query, lossy) = key.query_box()?;
            recheck |= lossy;
            matches &= matches_exact(leaf, key.strategy, &query);
        }
        Ok(LeafMatch { matches, recheck })
    }
}
