use std::collections::HashMap;

use crate::types::WordId;
use crate::word_list::WordList;

/// Number of occurrences of each letter at one cell position across a set of options.
pub type LetterCounts = HashMap<char, usize>;

/// Count how many of the given options carry each letter at `cell_idx`. Options too short to
/// reach the cell don't contribute anything.
#[must_use]
pub fn build_letter_counts(word_list: &WordList, options: &[WordId], cell_idx: usize) -> LetterCounts {
    let mut result = LetterCounts::new();

    for &word_id in options {
        if let Some(&letter) = word_list.words[word_id].chars.get(cell_idx) {
            *result.entry(letter).or_insert(0) += 1;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use crate::util::build_letter_counts;
    use crate::word_list::WordList;

    #[test]
    fn test_build_letter_counts() {
        let word_list = WordList::from_words(["CAT", "CAR", "ART", "A"]);

        let counts = build_letter_counts(&word_list, &[0, 1, 2, 3], 1);
        assert_eq!(counts.get(&'A'), Some(&2));
        assert_eq!(counts.get(&'R'), Some(&1));
        assert_eq!(counts.values().sum::<usize>(), 3);

        let counts = build_letter_counts(&word_list, &[0, 1], 2);
        assert_eq!(counts.len(), 2);
    }
}
