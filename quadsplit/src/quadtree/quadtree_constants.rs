//! Constants for the loose quadtree.

/// Default number of entries per leaf before it is split
pub const DEFAULT_LEAF_CAPACITY: usize = 64;

/// Default cap on extra levels one insertion may create. A point has zero
/// radius, so without a cap it would ask for infinitely many levels.
pub const DEFAULT_MAX_INSERT_LEVELS: u32 = 32;

/// Default depth below which leaves are allowed to overflow
pub const DEFAULT_MAX_TREE_DEPTH: u32 = 64;

/// Fraction of an object's larger side used as its radius when choosing
/// the insertion level
pub const RADIUS_FACTOR: f64 = 0.5;

// Strategy numbers shared with R-tree style operator classes.
pub const LEFT_STRATEGY: u16 = 1;
pub const OVER_LEFT_STRATEGY: u16 = 2;
pub const OVERLAP_STRATEGY: u16 = 3;
pub const OVER_RIGHT_STRATEGY: u16 = 4;
pub const RIGHT_STRATEGY: u16 = 5;
pub const SAME_STRATEGY: u16 = 6;
pub const CONTAINS_STRATEGY: u16 = 7;
pub const CONTAINED_BY_STRATEGY: u16 = 8;
pub const OVER_BELOW_STRATEGY: u16 = 9;
pub const BELOW_STRATEGY: u16 = 10;
pub const ABOVE_STRATEGY: u16 = 11;
pub const OVER_ABOVE_STRATEGY: u16 = 12;
