//! Inputs and outputs of the multi-column page split.

use serde::{Deserialize, Serialize};

use crate::quadrant::{Quadrant, Quadrants};

/// 1-based position of an entry in the slice it was handed in.
pub type OffsetNumber = usize;

/// Legacy "up to the end" marker a pick-split strategy may leave as the last
/// member of a group. Resolved to the last input offset.
pub const INVALID_OFFSET: OffsetNumber = 0;

/// First valid offset.
pub const FIRST_OFFSET: OffsetNumber = 1;

/// A record that exposes one (possibly null) key per column.
pub trait SplitTuple<K> {
    /// Key of `column`, or `None` if it is null.
    fn attribute(&self, column: usize) -> Option<&K>;
}

impl<K> SplitTuple<K> for Vec<Option<K>> {
    fn attribute(&self, column: usize) -> Option<&K> {
        self.get(column).and_then(Option::as_ref)
    }
}

impl<K> SplitTuple<K> for [Option<K>] {
    fn attribute(&self, column: usize) -> Option<&K> {
        self.get(column).and_then(Option::as_ref)
    }
}

/// A ready-made tuple: an identifier and its column keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry<K> {
    pub id: u64,
    pub keys: Vec<Option<K>>,
}

impl<K> IndexEntry<K> {
    pub fn new(id: u64, keys: Vec<Option<K>>) -> Self {
        Self { id, keys }
    }
}

impl<K> SplitTuple<K> for IndexEntry<K> {
    fn attribute(&self, column: usize) -> Option<&K> {
        self.keys.attribute(column)
    }
}

/// One key handed to a pick-split strategy. `offset` is the key's 1-based
/// position in the slice the strategy received.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitEntry<'a, K> {
    pub offset: OffsetNumber,
    pub key: &'a K,
}

/// What a pick-split strategy returns.
///
/// Groups hold offsets into the slice the strategy received. A strategy may
/// leave groups empty or summaries unset; the caller repairs both.
#[derive(Debug, Clone, PartialEq)]
pub struct PickSplitOut<K> {
    pub groups: Quadrants<Vec<OffsetNumber>>,
    pub summaries: Quadrants<Option<K>>,
    /// Set when the strategy already folded the prior summaries it was given
    /// into `summaries`.
    pub prior_merged: bool,
}

impl<K> PickSplitOut<K> {
    pub fn new(groups: Quadrants<Vec<OffsetNumber>>, summaries: Quadrants<Option<K>>) -> Self {
        Self {
            groups,
            summaries,
            prior_merged: false,
        }
    }
}

/// One quadrant of a finished page split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitGroup<K> {
    /// 1-based offsets into the input, ascending.
    pub entries: Vec<OffsetNumber>,
    /// Union of the group's keys, one per column. `None` when every member
    /// is null in that column.
    pub summaries: Vec<Option<K>>,
}

impl<K> SplitGroup<K> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of [`MultiColumnSplitter::split_page`](super::MultiColumnSplitter::split_page).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSplit<K> {
    pub groups: Quadrants<SplitGroup<K>>,
}

impl<K> PageSplit<K> {
    pub fn group(&self, quadrant: Quadrant) -> &SplitGroup<K> {
        &self.groups[quadrant]
    }

    pub fn group_sizes(&self) -> [usize; 4] {
        self.groups.as_ref().map(|g| g.len()).into_inner()
    }

    /// Total number of entries over all groups.
    pub fn len(&self) -> usize {
        self.groups.values().map(|g| g.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Quadrant of every input offset, indexed by `offset - 1`.
    pub fn assignment(&self) -> Vec<Option<Quadrant>> {
        let mut assignment = vec![None; self.len()];
        for (quadrant, group) in self.groups.iter() {
            for &offset in &group.entries {
                if let Some(slot) = offset.checked_sub(FIRST_OFFSET).and_then(|i| assignment.get_mut(i)) {
                    *slot = Some(quadrant);
                }
            }
        }
        assignment
    }
}
