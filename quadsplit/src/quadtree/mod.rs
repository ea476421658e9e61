//! Loose quadtree operator class.
//!
//! A loose quadtree stores every object at a depth that matches its size
//! and routes it by the quadrant its center falls in, so objects never
//! straddle children. At query time each child receives a 4D
//! [`RectBox`] bounding the low and high coordinates of everything below
//! it; children whose bounds cannot satisfy the query are pruned.
//!
//! - [`LooseQuadtree::choose`] picks the insertion depth and quadrant path
//! - [`LooseQuadtree::pick_split`] splits an overflowing leaf
//! - [`LooseQuadtree::inner_consistent`] and [`LooseQuadtree::leaf_consistent`]
//!   drive queries
//! - [`MemoryQuadtree`] ties them together in memory

pub mod classifier;
pub mod predicates;
pub mod quadtree_constants;
pub mod quadtree_types;
mod choose;
mod consistent;
mod loose_quadtree;
mod memory_tree;
mod picksplit;

pub use classifier::classify;
pub use loose_quadtree::LooseQuadtree;
pub use memory_tree::{LeafEntry, MemoryQuadtree, QuadtreeStats};
pub use quadtree_types::{
    AdmittedChild, InsertionChoice, Interval, LeafMatch, LeafSplit, RangeBox, RectBox, ScanKey,
    Strategy,
};
