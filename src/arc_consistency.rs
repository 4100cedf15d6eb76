//! This module contains the consistency engine: node consistency for the unary length constraint,
//! and an implementation of the AC-3 algorithm for the binary crossing constraints. For our
//! purposes, a grid is arc-consistent when every option for every slot has at least one option in
//! each crossing slot that agrees on the shared letter.
//!
//! Distinctness is not enforced here; it's checked by the search as words are chosen.

use log::{debug, trace};
use std::collections::{HashSet, VecDeque};

use crate::domains::Domains;
use crate::grid_config::GridConfig;
use crate::types::{SlotId, SlotPair};
use crate::util::build_letter_counts;
use crate::word_list::WordList;
use crate::CHECK_INVARIANTS;

/// Result from a successful call to `ac3`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArcConsistencySuccess {
    /// How many calls to `revise` removed at least one option.
    pub revisions: usize,

    /// How many options were removed in total.
    pub eliminations: usize,
}

/// Result from a failed call to `ac3`, identifying the slot whose domain was wiped out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcConsistencyFailure {
    pub slot_id: SlotId,
}

/// Result from a call to `ac3`.
pub type ArcConsistencyResult = Result<ArcConsistencySuccess, ArcConsistencyFailure>;

/// Remove every option whose length differs from its slot's length, returning the number of
/// options removed. Running this again on the same store removes nothing.
pub fn enforce_node_consistency(
    config: &GridConfig,
    word_list: &WordList,
    domains: &mut Domains,
) -> usize {
    let removed: usize = config
        .slots
        .iter()
        .enumerate()
        .map(|(slot_id, slot)| {
            domains.retain(slot_id, |word_id| word_list.words[word_id].len() == slot.length)
        })
        .sum();

    debug!(
        "node consistency removed {removed} options, {} remain",
        domains.total_options()
    );

    if CHECK_INVARIANTS {
        assert!(
            is_node_consistent(config, word_list, domains),
            "Domains not node-consistent after enforcing node consistency"
        );
    }

    removed
}

/// Make `x` arc-consistent with `y`: remove each option of `x` that has no option in `y` agreeing
/// on their shared cell. Returns whether anything was removed. Slots that don't cross are left
/// alone.
pub fn revise(
    config: &GridConfig,
    word_list: &WordList,
    domains: &mut Domains,
    x: SlotId,
    y: SlotId,
) -> bool {
    let Some((x_cell, y_cell)) = config.overlap(x, y) else {
        return false;
    };

    // Snapshot which letters `y` can supply before touching `x`.
    let available = build_letter_counts(word_list, domains.options(y), y_cell);

    let removed = domains.retain(x, |word_id| {
        word_list.words[word_id]
            .chars
            .get(x_cell)
            .is_some_and(|letter| available.contains_key(letter))
    });

    if removed > 0 {
        trace!(
            "revised {} against {}: removed {removed}, {} remain",
            config.slots[x],
            config.slots[y],
            domains.len(x)
        );
    }

    removed > 0
}

/// Propagate crossing constraints until every queued arc is consistent. With `arcs` set to `None`
/// the queue starts with every `(slot, neighbor)` pair in the grid; otherwise it starts with the
/// given arcs. Fails as soon as any slot runs out of options.
pub fn ac3(
    config: &GridConfig,
    word_list: &WordList,
    domains: &mut Domains,
    arcs: Option<Vec<SlotPair>>,
) -> ArcConsistencyResult {
    let initial_arcs = arcs.unwrap_or_else(|| config.all_arcs());

    let mut queued: HashSet<SlotPair> = HashSet::with_capacity(initial_arcs.len());
    let mut queue: VecDeque<SlotPair> = initial_arcs
        .into_iter()
        .filter(|&arc| queued.insert(arc))
        .collect();

    let mut success = ArcConsistencySuccess::default();

    while let Some((x, y)) = queue.pop_front() {
        queued.remove(&(x, y));

        let before = domains.len(x);
        if !revise(config, word_list, domains, x, y) {
            continue;
        }

        success.revisions += 1;
        success.eliminations += before - domains.len(x);

        if domains.is_empty(x) {
            debug!("arc consistency wiped out {}", config.slots[x]);
            return Err(ArcConsistencyFailure { slot_id: x });
        }

        // Shrinking `x` may have stranded options in its other crossings.
        for &z in config.neighbors(x) {
            if z != y && queued.insert((z, x)) {
                queue.push_back((z, x));
            }
        }
    }

    if CHECK_INVARIANTS {
        assert!(
            is_arc_consistent(config, word_list, domains),
            "Domains not arc-consistent after AC-3 succeeded"
        );
    }

    Ok(success)
}

/// Does every option in the store have the same length as its slot?
#[must_use]
pub fn is_node_consistent(config: &GridConfig, word_list: &WordList, domains: &Domains) -> bool {
    config.slots.iter().enumerate().all(|(slot_id, slot)| {
        domains
            .options(slot_id)
            .iter()
            .all(|&word_id| word_list.words[word_id].len() == slot.length)
    })
}

/// Does every option for every slot have a compatible option in each crossing slot?
#[must_use]
pub fn is_arc_consistent(config: &GridConfig, word_list: &WordList, domains: &Domains) -> bool {
    config.all_arcs().into_iter().all(|(x, y)| {
        let Some((x_cell, y_cell)) = config.overlap(x, y) else {
            return true;
        };
        let available = build_letter_counts(word_list, domains.options(y), y_cell);
        domains.options(x).iter().all(|&word_id| {
            word_list.words[word_id]
                .chars
                .get(x_cell)
                .is_some_and(|letter| available.contains_key(letter))
        })
    })
}
