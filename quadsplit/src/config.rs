//! Tuning knobs for the page splitter and the loose quadtree.
//!
//! Both configs are plain data with defaults, fluent setters and serde
//! support, so a host can embed them in its own configuration file.
//!
//! ```rust
//! use quadsplit::{QuadtreeConfig, SplitConfig};
//!
//! let tree = QuadtreeConfig::default().leaf_capacity(16).max_insert_levels(12);
//! assert!(tree.validate().is_ok());
//!
//! let split = SplitConfig::default().redistribute_dont_cares(false);
//! assert!(!split.redistributes_dont_cares());
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{SpatialError, SpatialResult};
use crate::quadtree::quadtree_constants::{
    DEFAULT_LEAF_CAPACITY, DEFAULT_MAX_INSERT_LEVELS, DEFAULT_MAX_TREE_DEPTH,
};

/// Configuration of the multi-column page splitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    redistribute_dont_cares: bool,
    reconcile_secondary_splits: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            redistribute_dont_cares: true,
            reconcile_secondary_splits: true,
        }
    }
}

impl SplitConfig {
    /// Creates a configuration with every refinement enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables re-splitting of don't-care entries by later columns.
    pub fn redistribute_dont_cares(mut self, enabled: bool) -> Self {
        self.redistribute_dont_cares = enabled;
        self
    }

    /// Enables or disables merging prior summaries into secondary splits.
    pub fn reconcile_secondary_splits(mut self, enabled: bool) -> Self {
        self.reconcile_secondary_splits = enabled;
        self
    }

    /// Whether don't-care entries are re-decided by later columns.
    pub fn redistributes_dont_cares(&self) -> bool {
        self.redistribute_dont_cares
    }

    /// Whether secondary splits are reconciled with prior summaries.
    pub fn reconciles_secondary_splits(&self) -> bool {
        self.reconcile_secondary_splits
    }
}

/// Configuration of the loose quadtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadtreeConfig {
    leaf_capacity: usize,
    max_insert_levels: u32,
    max_tree_depth: u32,
}

impl Default for QuadtreeConfig {
    fn default() -> Self {
        Self {
            leaf_capacity: DEFAULT_LEAF_CAPACITY,
            max_insert_levels: DEFAULT_MAX_INSERT_LEVELS,
            max_tree_depth: DEFAULT_MAX_TREE_DEPTH,
        }
    }
}

impl QuadtreeConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how many entries a leaf holds before it is split.
    pub fn leaf_capacity(mut self, capacity: usize) -> Self {
        self.leaf_capacity = capacity;
        self
    }

    /// Caps the extra subdivision levels a single insertion may create.
    pub fn max_insert_levels(mut self, levels: u32) -> Self {
        self.max_insert_levels = levels;
        self
    }

    /// Sets the depth below which leaves are no longer split.
    pub fn max_tree_depth(mut self, depth: u32) -> Self {
        self.max_tree_depth = depth;
        self
    }

    /// Returns the leaf capacity.
    pub fn get_leaf_capacity(&self) -> usize {
        self.leaf_capacity
    }

    /// Returns the insertion level cap.
    pub fn get_max_insert_levels(&self) -> u32 {
        self.max_insert_levels
    }

    /// Returns the maximum tree depth.
    pub fn get_max_tree_depth(&self) -> u32 {
        self.max_tree_depth
    }

    /// Checks that the values can drive a tree.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` when the leaf capacity is below 1 or the
    /// maximum depth is 0.
    pub fn validate(&self) -> SpatialResult<()> {
        if self.leaf_capacity == 0 {
            return Err(SpatialError::InvalidOperation(
                "leaf capacity must be at least 1".into(),
            ));
        }
        if self.max_tree_depth == 0 {
            return Err(SpatialError::InvalidOperation(
                "maximum tree depth must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
