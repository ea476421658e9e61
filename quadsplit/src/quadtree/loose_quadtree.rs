use std::fmt;
use std::sync::Arc;

use crate::config::QuadtreeConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink, LogSink};
use crate::errors::SpatialResult;

/// Operator class of the loose quadtree.
///
/// Holds no tree state: every operation works on the values the storage
/// layer hands in (centroids, levels, traversal values, leaf boxes) and
/// returns its decision. [`MemoryQuadtree`](super::MemoryQuadtree) is one
/// such storage layer.
///
/// ```rust
/// use quadsplit::{BoundingBox, LooseQuadtree};
///
/// let tree = LooseQuadtree::default();
/// let cell = BoundingBox::new(0.0, 0.0, 16.0, 16.0);
/// let choice = tree.choose(&cell, 0, &BoundingBox::new(1.0, 1.0, 2.0, 2.0)).unwrap();
/// assert_eq!(choice.levels_to_descend, 4);
/// ```
#[derive(Clone)]
pub struct LooseQuadtree {
    pub(crate) config: QuadtreeConfig,
    sink: Arc<dyn DiagnosticSink>,
}

impl LooseQuadtree {
    /// Creates an operator class that logs through the `log` facade.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if `config` does not validate.
    pub fn new(config: QuadtreeConfig) -> SpatialResult<Self> {
        Self::with_sink(config, Arc::new(LogSink))
    }

    /// Creates an operator class reporting to `sink`.
    pub fn with_sink(config: QuadtreeConfig, sink: Arc<dyn DiagnosticSink>) -> SpatialResult<Self> {
        config.validate()?;
        Ok(Self { config, sink })
    }

    pub fn config(&self) -> &QuadtreeConfig {
        &self.config
    }

    pub(crate) fn emit(&self, diagnostic: Diagnostic) {
        self.sink.emit(diagnostic);
    }
}

impl Default for LooseQuadtree {
    fn default() -> Self {
        Self {
            config: QuadtreeConfig::default(),
            sink: Arc::new(LogSink),
        }
    }
}

impl fmt::Debug for LooseQuadtree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LooseQuadtree").field("config", &self.config).finish()
    }
}
