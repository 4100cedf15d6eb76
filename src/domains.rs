//! The domain store: for each slot, the words still considered possible. Domains only ever
//! shrink; the search reads them (or private clones of them) but never widens one.

use crate::grid_config::GridConfig;
use crate::types::{SlotId, WordId};
use crate::word_list::WordList;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domains {
    /// Candidate word ids for each slot, kept in word list order.
    options: Vec<Vec<WordId>>,
}

impl Domains {
    /// Seed every slot in the grid with the entire vocabulary.
    #[must_use]
    pub fn new(config: &GridConfig, word_list: &WordList) -> Domains {
        let all_words: Vec<WordId> = (0..word_list.len()).collect();
        Domains {
            options: vec![all_words; config.slots.len()],
        }
    }

    /// Build a store from explicit per-slot options.
    #[must_use]
    pub fn from_options(options: Vec<Vec<WordId>>) -> Domains {
        Domains { options }
    }

    #[must_use]
    pub fn options(&self, slot_id: SlotId) -> &[WordId] {
        &self.options[slot_id]
    }

    #[must_use]
    pub fn len(&self, slot_id: SlotId) -> usize {
        self.options[slot_id].len()
    }

    #[must_use]
    pub fn is_empty(&self, slot_id: SlotId) -> bool {
        self.options[slot_id].is_empty()
    }

    #[must_use]
    pub fn contains(&self, slot_id: SlotId, word_id: WordId) -> bool {
        self.options[slot_id].contains(&word_id)
    }

    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.options.len()
    }

    /// Keep only the options matching `keep`, returning how many were removed.
    pub fn retain<F>(&mut self, slot_id: SlotId, mut keep: F) -> usize
    where
        F: FnMut(WordId) -> bool,
    {
        let options = &mut self.options[slot_id];
        let before = options.len();
        options.retain(|&word_id| keep(word_id));
        before - options.len()
    }

    /// Reduce a slot to the single given word. Returns false (leaving the domain empty) if the word
    /// wasn't a candidate.
    pub fn restrict_to(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        self.retain(slot_id, |option| option == word_id);
        !self.is_empty(slot_id)
    }

    /// The lowest id of a slot with no candidates left, if any.
    #[must_use]
    pub fn first_empty_slot(&self) -> Option<SlotId> {
        self.options.iter().position(Vec::is_empty)
    }

    /// The total number of candidates across all slots.
    #[must_use]
    pub fn total_options(&self) -> usize {
        self.options.iter().map(Vec::len).sum()
    }

    /// The candidate strings for a slot, for display and debugging.
    #[must_use]
    pub fn words<'a>(&self, word_list: &'a WordList, slot_id: SlotId) -> Vec<&'a str> {
        self.options[slot_id]
            .iter()
            .map(|&word_id| word_list.words[word_id].string.as_str())
            .collect()
    }
}
