//! This module implements grid-filling using a recursive backtracking search. Before searching we
//! establish node and arc consistency; then we pick slots by minimum remaining values (breaking
//! ties by degree, then by slot id), try words in least-constraining-value order, and undo each
//! choice when its subtree fails. Optionally, each choice is followed by a round of AC-3 on a
//! private copy of the domains so that dead ends are found earlier.

use log::{debug, trace};
use std::cmp::Reverse;
use std::collections::HashSet;
use std::fmt;
use std::time::{Duration, Instant};

use crate::arc_consistency::{ac3, enforce_node_consistency};
use crate::domains::Domains;
use crate::grid_config::{Assignment, GridConfig, Slot};
use crate::types::{SlotId, SlotPair, WordId};
use crate::util::build_letter_counts;
use crate::word_list::WordList;
use crate::CHECK_INVARIANTS;

/// How many states should we visit between checks of the deadline?
pub const INTERRUPT_FREQUENCY: usize = 10;

/// A struct tracking stats about the filling process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub states: usize,
    pub backtracks: usize,
    pub total_time: Duration,
    pub initial_arc_consistency_time: Duration,
    pub inference_time: Duration,
}

/// Knobs for a fill operation.
#[derive(Debug, Clone, Default)]
pub struct FillOptions {
    /// Run AC-3 from each newly-chosen slot before recursing.
    pub inference: bool,

    /// Give up once this much time has passed.
    pub timeout: Option<Duration>,
}

/// A struct representing the results of a fill operation.
#[derive(Debug)]
pub struct FillSuccess {
    pub statistics: Statistics,
    pub assignment: Assignment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillFailure {
    /// No word in the vocabulary has this slot's length.
    NodeConsistency(Slot),

    /// Establishing arc consistency emptied this slot's domain.
    ArcConsistency(Slot),

    /// Every branch of the search failed.
    Exhausted,

    Timeout,
}

impl fmt::Display for FillFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillFailure::NodeConsistency(slot) => write!(f, "No words fit slot {slot}"),
            FillFailure::ArcConsistency(slot) => write!(f, "No consistent words for slot {slot}"),
            FillFailure::Exhausted => write!(f, "No solution"),
            FillFailure::Timeout => write!(f, "Timed out"),
        }
    }
}

impl std::error::Error for FillFailure {}

/// A struct recording a slot assignment made during a fill process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub slot_id: SlotId,
    pub word_id: WordId,
}

/// The assignment being built by the search, indexed by slot id. Choices are undone in the reverse
/// order they were made, so a failed branch leaves nothing behind for its siblings to see.
#[derive(Debug, Clone)]
pub struct PartialAssignment {
    word_ids: Vec<Option<WordId>>,
    choices: Vec<Choice>,
}

impl PartialAssignment {
    #[must_use]
    pub fn new(slot_count: usize) -> PartialAssignment {
        PartialAssignment {
            word_ids: vec![None; slot_count],
            choices: Vec::with_capacity(slot_count),
        }
    }

    #[must_use]
    pub fn get(&self, slot_id: SlotId) -> Option<WordId> {
        self.word_ids[slot_id]
    }

    #[must_use]
    pub fn is_assigned(&self, slot_id: SlotId) -> bool {
        self.word_ids[slot_id].is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.choices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.choices.len() == self.word_ids.len()
    }

    #[must_use]
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    /// Record a choice for an unassigned slot.
    pub fn push(&mut self, choice: Choice) {
        if CHECK_INVARIANTS && self.word_ids[choice.slot_id].is_some() {
            panic!("Choosing a word for a slot that already has one?");
        }
        self.word_ids[choice.slot_id] = Some(choice.word_id);
        self.choices.push(choice);
    }

    /// Undo the most recent choice.
    pub fn pop(&mut self) -> Option<Choice> {
        let choice = self.choices.pop()?;
        self.word_ids[choice.slot_id] = None;
        Some(choice)
    }

    /// Convert to the public slot-to-string form.
    #[must_use]
    pub fn to_assignment(&self, config: &GridConfig, word_list: &WordList) -> Assignment {
        let mut assignment = Assignment::new();
        for &Choice { slot_id, word_id } in &self.choices {
            assignment.insert(config.slots[slot_id], word_list.words[word_id].string.clone());
        }
        assignment
    }
}

/// Choose the unassigned slot with the fewest remaining options. Ties go to the slot with the most
/// neighbors, then to the lowest slot id. Returns `None` once every slot is assigned.
#[must_use]
pub fn select_unassigned_variable(
    config: &GridConfig,
    domains: &Domains,
    assignment: &PartialAssignment,
) -> Option<SlotId> {
    (0..config.slots.len())
        .filter(|&slot_id| !assignment.is_assigned(slot_id))
        .min_by_key(|&slot_id| {
            (
                domains.len(slot_id),
                Reverse(config.neighbors(slot_id).len()),
                slot_id,
            )
        })
}

/// Return the options for `slot_id`, ordered by how many options each would rule out among the
/// unassigned neighbors (fewest first). Ties keep domain order.
#[must_use]
pub fn order_domain_values(
    config: &GridConfig,
    word_list: &WordList,
    domains: &Domains,
    slot_id: SlotId,
    assignment: &PartialAssignment,
) -> Vec<WordId> {
    // For each unassigned neighbor: our cell index, its option count, and its letter counts at the
    // shared cell.
    let crossings: Vec<_> = config
        .neighbors(slot_id)
        .iter()
        .filter(|&&neighbor_id| !assignment.is_assigned(neighbor_id))
        .filter_map(|&neighbor_id| {
            let (cell_idx, neighbor_cell_idx) = config.overlap(slot_id, neighbor_id)?;
            Some((
                cell_idx,
                domains.len(neighbor_id),
                build_letter_counts(word_list, domains.options(neighbor_id), neighbor_cell_idx),
            ))
        })
        .collect();

    let mut options = domains.options(slot_id).to_vec();

    options.sort_by_cached_key(|&word_id| {
        let word = &word_list.words[word_id];
        crossings
            .iter()
            .map(|(cell_idx, option_count, letter_counts)| {
                let compatible = word
                    .chars
                    .get(*cell_idx)
                    .and_then(|letter| letter_counts.get(letter))
                    .copied()
                    .unwrap_or(0);
                option_count - compatible
            })
            .sum::<usize>()
    });

    options
}

/// Is this assignment free of conflicts? Words must be distinct, fit their slots, and agree with
/// every crossing slot that is also assigned. Slots not in the grid are treated as having no
/// crossings.
#[must_use]
pub fn consistent(config: &GridConfig, assignment: &Assignment) -> bool {
    let mut seen: HashSet<&str> = HashSet::with_capacity(assignment.len());
    if !assignment.iter().all(|(_, word)| seen.insert(word)) {
        return false;
    }

    if !assignment
        .iter()
        .all(|(slot, word)| word.chars().count() == slot.length)
    {
        return false;
    }

    assignment.iter().all(|(slot, word)| {
        let Some(slot_id) = config.slot_id(slot) else {
            return true;
        };
        config.neighbors(slot_id).iter().all(|&neighbor_id| {
            let Some(neighbor_word) = assignment.get(&config.slots[neighbor_id]) else {
                return true;
            };
            let Some((cell_idx, neighbor_cell_idx)) = config.overlap(slot_id, neighbor_id) else {
                return true;
            };
            word.chars().nth(cell_idx) == neighbor_word.chars().nth(neighbor_cell_idx)
        })
    })
}

/// Would adding `choice` keep an already-consistent assignment consistent? This only examines the
/// new word, which is equivalent to running `consistent` on the extended assignment.
fn is_consistent_choice(
    config: &GridConfig,
    word_list: &WordList,
    assignment: &PartialAssignment,
    choice: &Choice,
) -> bool {
    let word = &word_list.words[choice.word_id];

    if word.len() != config.slots[choice.slot_id].length {
        return false;
    }

    if assignment
        .choices()
        .iter()
        .any(|existing| existing.word_id == choice.word_id)
    {
        return false;
    }

    config.neighbors(choice.slot_id).iter().all(|&neighbor_id| {
        let (Some(neighbor_word_id), Some((cell_idx, neighbor_cell_idx))) = (
            assignment.get(neighbor_id),
            config.overlap(choice.slot_id, neighbor_id),
        ) else {
            return true;
        };
        word.chars[cell_idx] == word_list.words[neighbor_word_id].chars[neighbor_cell_idx]
    })
}

/// The state shared by every level of one recursive search.
struct Search<'a> {
    config: &'a GridConfig,
    word_list: &'a WordList,
    options: &'a FillOptions,
    deadline: Option<Instant>,
    statistics: Statistics,
}

impl Search<'_> {
    /// Extend `assignment` to a complete, consistent one. `Ok(false)` means this subtree has no
    /// solution and `assignment` is back to how it was on entry.
    fn backtrack(
        &mut self,
        domains: &Domains,
        assignment: &mut PartialAssignment,
    ) -> Result<bool, FillFailure> {
        self.statistics.states += 1;

        if self.statistics.states % INTERRUPT_FREQUENCY == 0 {
            if let Some(deadline) = self.deadline {
                if Instant::now() > deadline {
                    return Err(FillFailure::Timeout);
                }
            }
        }

        let Some(slot_id) = select_unassigned_variable(self.config, domains, assignment) else {
            return Ok(true);
        };

        for word_id in order_domain_values(self.config, self.word_list, domains, slot_id, assignment)
        {
            let choice = Choice { slot_id, word_id };
            if !is_consistent_choice(self.config, self.word_list, assignment, &choice) {
                continue;
            }

            trace!(
                "trying {} = {} at depth {}",
                self.config.slots[slot_id],
                self.word_list.words[word_id].string,
                assignment.len()
            );

            assignment.push(choice);

            let found = if self.options.inference {
                match self.infer(domains, slot_id, word_id) {
                    Some(narrowed) => self.backtrack(&narrowed, assignment)?,
                    None => false,
                }
            } else {
                self.backtrack(domains, assignment)?
            };

            if found {
                return Ok(true);
            }

            assignment.pop();
            self.statistics.backtracks += 1;
        }

        Ok(false)
    }

    /// Pin `slot_id` to `word_id` in a copy of the domains and propagate the consequences to its
    /// neighbors. Returns `None` if that wipes out some slot.
    fn infer(&mut self, domains: &Domains, slot_id: SlotId, word_id: WordId) -> Option<Domains> {
        let start = Instant::now();

        if CHECK_INVARIANTS {
            assert!(
                domains.contains(slot_id, word_id),
                "Choosing a word that isn't in the slot's domain?"
            );
        }

        let mut narrowed = domains.clone();
        if !narrowed.restrict_to(slot_id, word_id) {
            self.statistics.inference_time += start.elapsed();
            return None;
        }
        let arcs: Vec<SlotPair> = self
            .config
            .neighbors(slot_id)
            .iter()
            .map(|&neighbor_id| (neighbor_id, slot_id))
            .collect();
        let result = ac3(self.config, self.word_list, &mut narrowed, Some(arcs));

        self.statistics.inference_time += start.elapsed();

        result.ok().map(|_| narrowed)
    }
}

/// Search for a valid fill for the given grid: establish node consistency, then arc consistency,
/// then run the backtracking search. If either consistency step leaves a slot with no options we
/// fail without searching.
pub fn find_fill(
    config: &GridConfig,
    word_list: &WordList,
    options: &FillOptions,
) -> Result<FillSuccess, FillFailure> {
    let start = Instant::now();
    let deadline = options.timeout.map(|timeout| start + timeout);

    let mut domains = Domains::new(config, word_list);

    enforce_node_consistency(config, word_list, &mut domains);
    if let Some(slot_id) = domains.first_empty_slot() {
        debug!("no words fit {}", config.slots[slot_id]);
        return Err(FillFailure::NodeConsistency(config.slots[slot_id]));
    }

    let ac_start = Instant::now();
    let ac_success = ac3(config, word_list, &mut domains, None)
        .map_err(|failure| FillFailure::ArcConsistency(config.slots[failure.slot_id]))?;
    let initial_arc_consistency_time = ac_start.elapsed();
    debug!(
        "initial arc consistency removed {} options in {:?}",
        ac_success.eliminations, initial_arc_consistency_time
    );

    let mut search = Search {
        config,
        word_list,
        options,
        deadline,
        statistics: Statistics {
            initial_arc_consistency_time,
            ..Statistics::default()
        },
    };
    let mut assignment = PartialAssignment::new(config.slots.len());

    let found = search.backtrack(&domains, &mut assignment)?;

    let mut statistics = search.statistics;
    statistics.total_time = start.elapsed();
    debug!("{statistics:?}");

    if !found {
        return Err(FillFailure::Exhausted);
    }

    let assignment = assignment.to_assignment(config, word_list);

    if CHECK_INVARIANTS {
        assert!(
            assignment.is_complete(config) && consistent(config, &assignment),
            "Search returned an incomplete or inconsistent assignment"
        );
    }

    Ok(FillSuccess {
        statistics,
        assignment,
    })
}

/// Fill the grid with default options, returning `None` if there's no solution.
#[must_use]
pub fn solve(config: &GridConfig, word_list: &WordList) -> Option<Assignment> {
    find_fill(config, word_list, &FillOptions::default())
        .ok()
        .map(|success| success.assignment)
}
