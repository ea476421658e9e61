//! Diagnostic sink for split and insertion decisions.
//!
//! The split and choose algorithms report what they decided (and where a
//! pluggable strategy misbehaved) through an injected [`DiagnosticSink`]
//! rather than a process-wide logger. [`LogSink`] forwards everything to
//! the `log` facade; [`CollectingSink`] keeps the events in memory so
//! callers and tests can inspect them.

use parking_lot::Mutex;
use std::fmt::{self, Display};

use crate::quadrant::Quadrant;

/// A single reported decision or quality warning.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A column strategy left at least one quadrant empty; the positional
    /// quartile split was used instead. The index stays correct but is
    /// less selective.
    DegenerateSplit { column: usize, group_sizes: [usize; 4] },
    /// A column strategy returned offsets that do not partition its input.
    MalformedPickSplit { column: usize, reason: String },
    /// A column split was discarded in favour of the next column.
    ColumnSkipped { column: usize, reason: &'static str },
    /// Don't-care entries were found and will be re-decided by later columns.
    DontCaresFound { column: usize, count: usize },
    /// A secondary split was reconciled with the prior column's summaries.
    SecondarySplitReconciled { column: usize, reassigned: bool },
    /// The insertion depth chosen for an object.
    InsertionLevel { level: u32, candidate_level: u32, levels_to_descend: u32 },
    /// The quadrant chosen while simulating a descent.
    QuadrantChosen { depth: u32, quadrant: Quadrant },
    /// A quadtree leaf was split around a new centroid.
    LeafSplit { entries: usize, group_sizes: [usize; 4] },
}

impl Diagnostic {
    /// Log level this diagnostic is emitted at by [`LogSink`].
    pub fn level(&self) -> log::Level {
        match self {
            Diagnostic::DegenerateSplit { .. } | Diagnostic::MalformedPickSplit { .. } => {
                log::Level::Warn
            }
            Diagnostic::QuadrantChosen { .. } => log::Level::Trace,
            _ => log::Level::Debug,
        }
    }

    /// True for index-quality warnings.
    pub fn is_warning(&self) -> bool {
        self.level() == log::Level::Warn
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DegenerateSplit { column, group_sizes } => write!(
                f,
                "picksplit method for column {} failed (group sizes {:?}); \
                 the index is not optimal, try using the column as a later one",
                column + 1,
                group_sizes
            ),
            Diagnostic::MalformedPickSplit { column, reason } => {
                write!(f, "picksplit method for column {} returned a bad split: {}", column + 1, reason)
            }
            Diagnostic::ColumnSkipped { column, reason } => {
                write!(f, "split on column {} discarded: {}", column + 1, reason)
            }
            Diagnostic::DontCaresFound { column, count } => {
                write!(f, "{} don't-care entries after splitting column {}", count, column + 1)
            }
            Diagnostic::SecondarySplitReconciled { column, reassigned } => write!(
                f,
                "secondary split on column {} reconciled with prior summaries (reassigned: {})",
                column + 1,
                reassigned
            ),
            Diagnostic::InsertionLevel { level, candidate_level, levels_to_descend } => write!(
                f,
                "current level is {}, inserting at level {} with level diff of {}",
                level, candidate_level, levels_to_descend
            ),
            Diagnostic::QuadrantChosen { depth, quadrant } => {
                write!(f, "quadrant {} chosen at depth {}", quadrant, depth)
            }
            Diagnostic::LeafSplit { entries, group_sizes } => {
                write!(f, "leaf of {} entries split into {:?}", entries, group_sizes)
            }
        }
    }
}

/// Receiver for [`Diagnostic`]s.
pub trait DiagnosticSink: Send + Sync {
    /// Records one diagnostic.
    fn emit(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&self, diagnostic: Diagnostic) {
        log::log!(target: "quadsplit", diagnostic.level(), "{}", diagnostic);
    }
}

/// Keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded diagnostics.
    pub fn events(&self) -> Vec<Diagnostic> {
        self.events.lock().clone()
    }

    /// Returns only the quality warnings.
    pub fn warnings(&self) -> Vec<Diagnostic> {
        self.events.lock().iter().filter(|d| d.is_warning()).cloned().collect()
    }

    /// Drops everything recorded so far.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl DiagnosticSink for CollectingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        self.events.lock().push(diagnostic);
    }
}
