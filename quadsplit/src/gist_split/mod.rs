//! Multi-column quaternary page split.
//!
//! An overflowing index page is split column by column. Each column's keys
//! go through its [`SplitSupport`] strategy; a strategy result that leaves a
//! quadrant empty falls back to a positional quartile split. Entries the
//! first column is indifferent about are handed to the next column, and the
//! final groups carry a summary for every column.

pub mod split_types;
pub mod support;
mod split_driver;
mod union_split;

pub use split_driver::MultiColumnSplitter;
pub use split_types::{
    IndexEntry, OffsetNumber, PageSplit, PickSplitOut, SplitEntry, SplitGroup, SplitTuple,
    FIRST_OFFSET, INVALID_OFFSET,
};
pub use support::{BoxSplitSupport, RangeSplitSupport, SplitSupport};
