//! Single-column quaternary split with validation and positional fallback.

use itertools::Itertools;

use crate::config::SplitConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::gist_split::split_types::{OffsetNumber, PickSplitOut, SplitEntry, FIRST_OFFSET, INVALID_OFFSET};
use crate::gist_split::support::{group_summaries, SplitSupport};
use crate::quadrant::{Quadrant, Quadrants};

/// A split of one column: 0-based positions into the keys that were split,
/// and one summary per quadrant.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ColumnSplit<K> {
    pub groups: Quadrants<Vec<usize>>,
    pub summaries: Quadrants<Option<K>>,
}

/// Cuts `0..n` into four contiguous runs; run `q` covers 1-based positions
/// `(q*n/4, (q+1)*n/4]`. Every run is non-empty once `n >= 4`.
pub(crate) fn quartiles(n: usize) -> Quadrants<Vec<usize>> {
    Quadrants::from_fn(|q| {
        let start = q.index() * n / 4;
        let end = (q.index() + 1) * n / 4;
        (start..end).collect()
    })
}

/// Splits `keys` (all non-null, `keys.len() >= 2`) of `column`.
///
/// The column's strategy decides first. Output that is not a partition of
/// the input, or that leaves a quadrant empty, is reported and replaced by
/// the positional quartile split. Prior summaries the strategy did not
/// merge are reconciled afterwards.
pub(crate) fn user_split<S: SplitSupport + ?Sized>(
    support: &S,
    config: &SplitConfig,
    sink: &dyn DiagnosticSink,
    column: usize,
    keys: &[&S::Key],
    prior: &Quadrants<Option<S::Key>>,
) -> ColumnSplit<S::Key> {
    let entries: Vec<SplitEntry<'_, S::Key>> = keys
        .iter()
        .enumerate()
        .map(|(i, key)| SplitEntry { offset: i + FIRST_OFFSET, key: *key })
        .collect();

    let out = support.pick_split(column, &entries, prior);
    let mut split = match validate_pick_split(out, entries.len()) {
        Ok(split) if split.groups.values().all(|g| !g.is_empty()) => split,
        Ok(split) => {
            sink.emit(Diagnostic::DegenerateSplit {
                column,
                group_sizes: split.groups.as_ref().map(|g| g.len()).into_inner(),
            });
            fallback(support, column, &entries)
        }
        Err(reason) => {
            sink.emit(Diagnostic::MalformedPickSplit { column, reason });
            fallback(support, column, &entries)
        }
    };

    // Fill in what the strategy left unset.
    let computed = group_summaries(support, column, &split.groups, &entries);
    for ((_, summary), (_, union)) in split.summaries.iter_mut().zip(computed) {
        if summary.is_none() {
            *summary = union;
        }
    }

    let has_prior = prior.values().any(Option::is_some);
    if has_prior && !split.prior_merged && config.reconciles_secondary_splits() {
        split = reconcile(support, sink, column, split, prior);
    }

    ColumnSplit {
        groups: split.groups.map(|g| g.into_iter().map(|offset| offset - FIRST_OFFSET).collect()),
        summaries: split.summaries,
    }
}

/// Resolves the open-ended marker and checks that the groups partition
/// `1..=n`.
fn validate_pick_split<K>(mut out: PickSplitOut<K>, n: usize) -> Result<PickSplitOut<K>, String> {
    for (_, group) in out.groups.iter_mut() {
        if group.last() == Some(&INVALID_OFFSET) {
            if let Some(last) = group.last_mut() {
                *last = n;
            }
        }
    }

    let mut seen = vec![false; n + 1];
    for (quadrant, group) in out.groups.iter() {
        for &offset in group {
            if offset < FIRST_OFFSET || offset > n {
                return Err(format!("offset {} in {} is outside 1..={}", offset, quadrant, n));
            }
            if seen[offset] {
                return Err(format!("offset {} assigned twice", offset));
            }
            seen[offset] = true;
        }
    }
    if let Some(missing) = (FIRST_OFFSET..=n).find(|&offset| !seen[offset]) {
        return Err(format!("offset {} not assigned", missing));
    }
    Ok(out)
}

fn fallback<S: SplitSupport + ?Sized>(
    support: &S,
    column: usize,
    entries: &[SplitEntry<'_, S::Key>],
) -> PickSplitOut<S::Key> {
    let groups: Quadrants<Vec<OffsetNumber>> =
        quartiles(entries.len()).map(|g| g.into_iter().map(|i| i + FIRST_OFFSET).collect());
    let summaries = group_summaries(support, column, &groups, entries);
    PickSplitOut::new(groups, summaries)
}

/// Matches the new groups to the quadrants whose prior summaries they fit
/// best, then merges each prior summary into its quadrant.
fn reconcile<S: SplitSupport + ?Sized>(
    support: &S,
    sink: &dyn DiagnosticSink,
    column: usize,
    split: PickSplitOut<S::Key>,
    prior: &Quadrants<Option<S::Key>>,
) -> PickSplitOut<S::Key> {
    let cost = |perm: &[Quadrant]| -> f64 {
        Quadrant::ALL
            .iter()
            .zip(perm)
            .filter_map(|(&q, &from)| match (&prior[q], &split.summaries[from]) {
                (Some(p), Some(s)) => Some(support.penalty(column, p, s)),
                _ => None,
            })
            .sum()
    };

    // Permutations come in lexicographic order, identity first, so a strict
    // comparison keeps the identity on ties.
    let mut best: Vec<Quadrant> = Quadrant::ALL.to_vec();
    let mut best_cost = cost(&best);
    for perm in Quadrant::ALL.iter().copied().permutations(4) {
        let c = cost(&perm);
        if c < best_cost {
            best_cost = c;
            best = perm;
        }
    }
    let reassigned = best != Quadrant::ALL;
    sink.emit(Diagnostic::SecondarySplitReconciled { column, reassigned });

    let PickSplitOut { groups, summaries, prior_merged } = split;
    let mut groups = groups.map(Some);
    let mut summaries = summaries.map(Some);
    let groups = Quadrants::from_fn(|q| groups[best[q.index()]].take().unwrap_or_default());
    let summaries = Quadrants::from_fn(|q| {
        let new = summaries[best[q.index()]].take().flatten();
        match (&prior[q], new) {
            (Some(p), Some(s)) => support.union(column, &[p, &s]),
            (Some(p), None) => Some(p.clone()),
            (None, s) => s,
        }
    });

    PickSplitOut { groups, summaries, prior_merged }
}
