//! This module holds the vocabulary used to fill a grid. Words are normalized once on the way in
//! (trimmed, uppercased, NFC-composed) and deduplicated, so everything downstream can treat them as
//! opaque strings and compare them exactly.

use smallvec::SmallVec;
use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use unicode_normalization::UnicodeNormalization;

use crate::types::WordId;
use crate::MAX_SLOT_LENGTH;

/// A struct representing a word in the word list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    /// The word as it would appear in a grid.
    pub string: String,

    /// The characters making up `string`, one per grid cell.
    pub chars: SmallVec<[char; MAX_SLOT_LENGTH]>,
}

impl Word {
    /// The number of cells this word occupies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

/// Given a raw line from a word list, turn it into the normalized form we'll use in the actual
/// fill engine. Interior spaces are kept; each one occupies a cell like any other character.
#[must_use]
pub fn normalize_word(raw: &str) -> String {
    raw.trim()
        .to_uppercase()
        .nfc() // Normalize Unicode combining forms
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordListError {
    InvalidPath(String),
}

impl fmt::Display for WordListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WordListError::InvalidPath(path) => write!(f, "Can’t read file: “{path}”"),
        }
    }
}

impl std::error::Error for WordListError {}

/// Configuration describing a source of word list entries.
pub enum WordListSourceConfig {
    Memory { words: Vec<String> },
    File { path: OsString },
    FileContents { contents: String },
}

/// A struct representing the loaded vocabulary. Word ids are indices into `words`, which keeps the
/// order in which words first appeared in the source.
#[derive(Debug, Clone, Default)]
pub struct WordList {
    /// All distinct normalized words.
    pub words: Vec<Word>,

    /// The inverse of `words`: a map from a normalized string to the id of the Word representing
    /// it.
    pub word_id_by_string: HashMap<String, WordId>,
}

impl WordList {
    /// Construct a `WordList` from the given source.
    pub fn new(source: WordListSourceConfig) -> Result<WordList, WordListError> {
        let mut instance = WordList::default();

        match source {
            WordListSourceConfig::Memory { words } => {
                for raw in &words {
                    instance.add_word(raw);
                }
            }
            WordListSourceConfig::File { path } => {
                let contents = fs::read_to_string(&path)
                    .map_err(|_| WordListError::InvalidPath(path.to_string_lossy().into()))?;
                instance.add_file_contents(&contents);
            }
            WordListSourceConfig::FileContents { contents } => {
                instance.add_file_contents(&contents);
            }
        }

        Ok(instance)
    }

    /// Build a `WordList` directly from an iterator of words.
    pub fn from_words<I, S>(words: I) -> WordList
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut instance = WordList::default();
        for raw in words {
            instance.add_word(raw.as_ref());
        }
        instance
    }

    fn add_file_contents(&mut self, contents: &str) {
        for line in contents.lines() {
            self.add_word(line);
        }
    }

    /// Normalize and record a word, returning its id. Blank entries are skipped and duplicates
    /// collapse onto the id of their first occurrence.
    pub fn add_word(&mut self, raw: &str) -> Option<WordId> {
        let normalized = normalize_word(raw);
        if normalized.is_empty() {
            return None;
        }

        if let Some(&word_id) = self.word_id_by_string.get(&normalized) {
            return Some(word_id);
        }

        let word_id = self.words.len();
        self.words.push(Word {
            chars: normalized.chars().collect(),
            string: normalized.clone(),
        });
        self.word_id_by_string.insert(normalized, word_id);

        Some(word_id)
    }

    /// Look up the id of an already-normalized word.
    #[must_use]
    pub fn word_id(&self, normalized: &str) -> Option<WordId> {
        self.word_id_by_string.get(normalized).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
pub mod tests {
    use crate::word_list::{normalize_word, WordList, WordListError, WordListSourceConfig};
    use std::path;
    use std::path::PathBuf;

    #[must_use]
    pub fn resource_path(name: &str) -> PathBuf {
        let mut path = path::PathBuf::from(file!());
        path.pop();
        path.pop();
        path.push("resources");
        path.push(name);
        path
    }

    #[test]
    fn test_normalize_word() {
        assert_eq!(normalize_word("cat"), "CAT");
        assert_eq!(normalize_word("  ice cream\t"), "ICE CREAM");
        assert_eq!(normalize_word("cafe\u{301}"), "CAF\u{c9}");
    }

    #[test]
    fn test_duplicates_collapse() {
        let word_list = WordList::from_words(["cat", "CAT", " Cat ", "dog", "", "   "]);

        assert_eq!(word_list.len(), 2);
        assert_eq!(word_list.word_id("CAT"), Some(0));
        assert_eq!(word_list.word_id("DOG"), Some(1));
        assert_eq!(word_list.words[1].len(), 3);
    }

    #[test]
    fn test_loads_words_from_file() {
        let word_list = WordList::new(WordListSourceConfig::File {
            path: resource_path("words0.txt").into(),
        })
        .expect("Failed to load word list");

        assert_eq!(word_list.len(), 10);
        assert!(word_list.word_id("SEVEN").is_some());
        assert!(word_list.words.iter().all(|word| word.string == word.string.to_uppercase()));
    }

    #[test]
    fn test_file_contents_source() {
        let word_list = WordList::new(WordListSourceConfig::FileContents {
            contents: "one\ntwo\n\nthree\r\ntwo\n".into(),
        })
        .unwrap();

        let strings: Vec<&str> = word_list.words.iter().map(|w| w.string.as_str()).collect();
        assert_eq!(strings, vec!["ONE", "TWO", "THREE"]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = WordList::new(WordListSourceConfig::File {
            path: resource_path("no-such-file.txt").into(),
        });

        assert!(matches!(result, Err(WordListError::InvalidPath(_))));
    }

    #[test]
    fn test_interior_spaces_count_as_cells() {
        let word_list = WordList::from_words(["ice cream", "icecream"]);

        assert_eq!(word_list.len(), 2);
        assert_eq!(word_list.words[0].string, "ICE CREAM");
        assert_eq!(word_list.words[0].len(), 9);
        assert_eq!(word_list.words[1].len(), 8);
    }

    #[test]
    fn test_word_length_counts_chars_not_bytes() {
        let word_list = WordList::from_words(["über"]);
        assert_eq!(word_list.words[0].len(), 4);
        assert_eq!(word_list.words[0].string, "ÜBER");
    }
}
