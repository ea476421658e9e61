//! # Quadsplit - Quaternary Spatial Index Splitting
//!
//! Building blocks for a space-partitioning spatial index that divides the
//! plane into four quadrants:
//!
//! - **Multi-column page split**: splits an overflowing page of multi-column
//!   entries into four groups, recovering from degenerate column strategies
//!   and re-deciding entries the first column does not care about
//! - **Loose quadtree**: size-adaptive insertion depth, median leaf splits,
//!   and 4D traversal bounds that prune subtrees during search
//! - **Exact leaf checks**: box predicates for every search strategy, with a
//!   recheck flag for polygon and circle arguments
//! - **In-memory tree**: [`MemoryQuadtree`] wires the operator class together
//!
//! Decisions and quality warnings go to an injected [`DiagnosticSink`];
//! [`LogSink`] forwards them to the `log` facade.
//!
//! ## Page split
//!
//! ```rust
//! use quadsplit::{BoundingBox, BoxSplitSupport, MultiColumnSplitter, Quadrant};
//!
//! # fn main() -> Result<(), quadsplit::SpatialError> {
//! let splitter = MultiColumnSplitter::new(BoxSplitSupport::default());
//! let tuples: Vec<Vec<Option<BoundingBox>>> = [(0.0, 0.0), (10.0, 0.0), (0.0, 10.0), (10.0, 10.0)]
//!     .iter()
//!     .map(|&(x, y)| vec![Some(BoundingBox::new(x, y, x + 1.0, y + 1.0))])
//!     .collect();
//!
//! let split = splitter.split_page(&tuples)?;
//! assert_eq!(split.group(Quadrant::NorthEast).entries, vec![4]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Quadtree
//!
//! ```rust
//! use quadsplit::{BoundingBox, MemoryQuadtree, QuadtreeConfig, ScanKey, Strategy};
//!
//! # fn main() -> Result<(), quadsplit::SpatialError> {
//! let mut tree = MemoryQuadtree::new(QuadtreeConfig::default())?;
//! tree.insert(BoundingBox::new(1.0, 1.0, 2.0, 2.0), "a")?;
//! tree.insert(BoundingBox::new(8.0, 8.0, 9.0, 9.0), "b")?;
//!
//! let key = ScanKey::with_box(Strategy::Overlap, BoundingBox::new(0.0, 0.0, 3.0, 3.0));
//! assert_eq!(tree.search(&[key])?, vec![&"a"]);
//! # Ok(())
//! # }
//! ```

pub mod bounding_box;
pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod geometry;
pub mod gist_split;
pub mod quadrant;
pub mod quadtree;

// Re-export core types
pub use bounding_box::BoundingBox;
pub use config::{QuadtreeConfig, SplitConfig};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, LogSink};
pub use errors::{SpatialError, SpatialResult};
pub use geometry::{Coordinate, Geometry, Point};
pub use quadrant::{Quadrant, Quadrants};

// Re-export page split types
pub use gist_split::{
    BoxSplitSupport, IndexEntry, MultiColumnSplitter, PageSplit, PickSplitOut, RangeSplitSupport,
    SplitEntry, SplitGroup, SplitSupport, SplitTuple,
};

// Re-export quadtree types
pub use quadtree::{
    classify, AdmittedChild, InsertionChoice, Interval, LeafEntry, LeafMatch, LeafSplit,
    LooseQuadtree, MemoryQuadtree, QuadtreeStats, RangeBox, RectBox, ScanKey, Strategy,
};
