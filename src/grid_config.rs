//! This module describes the shape of a puzzle: which cells are fillable, which slots they form,
//! and where those slots cross. Everything here is computed once from the structure and never
//! mutated during a fill.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;

#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::{GridCoord, SlotId};

/// The character marking a fillable cell in a structure file. Anything else is a block.
pub const FILLABLE_CELL: char = '_';

/// The character used for blocks when rendering a grid.
pub const BLOCK_CHAR: char = '█';

/// The direction that a slot is facing.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    Across,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Across => write!(f, "across"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// A fillable run of cells. The four fields together are the slot's identity, and the derived
/// ordering (row, then column, then direction, then length) is what fixes `SlotId`s.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Slot {
    pub row: usize,
    pub col: usize,
    pub direction: Direction,
    pub length: usize,
}

impl Slot {
    #[must_use]
    pub fn new(row: usize, col: usize, direction: Direction, length: usize) -> Slot {
        Slot {
            row,
            col,
            direction,
            length,
        }
    }

    /// The coords of the cell at the given index within this slot.
    #[must_use]
    pub fn cell(&self, cell_idx: usize) -> GridCoord {
        match self.direction {
            Direction::Across => (self.row, self.col + cell_idx),
            Direction::Down => (self.row + cell_idx, self.col),
        }
    }

    /// Generate the coords for each cell of this slot.
    #[must_use]
    pub fn cells(&self) -> Vec<GridCoord> {
        (0..self.length).map(|cell_idx| self.cell(cell_idx)).collect()
    }

    /// Parse a string like "1,2,down,5" into a `Slot`.
    pub fn from_key(key: &str) -> Result<Slot, String> {
        let key_parts: Vec<&str> = key.split(',').collect();
        if key_parts.len() != 4 {
            return Err(format!("invalid slot key: {key}"));
        }

        let row: Result<usize, _> = key_parts[0].trim().parse();
        let col: Result<usize, _> = key_parts[1].trim().parse();
        let direction: Option<Direction> = match key_parts[2].trim() {
            "across" => Some(Direction::Across),
            "down" => Some(Direction::Down),
            _ => None,
        };
        let length: Result<usize, _> = key_parts[3].trim().parse();

        if let (Ok(row), Ok(col), Some(direction), Ok(length)) = (row, col, direction, length) {
            Ok(Slot::new(row, col, direction, length))
        } else {
            Err(format!("invalid slot key: {key:?}"))
        }
    }

    /// Represent this slot as a string like "1,2,down,5".
    #[must_use]
    pub fn to_key(&self) -> String {
        format!(
            "{},{},{},{}",
            self.row, self.col, self.direction, self.length
        )
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) {} : {}",
            self.row, self.col, self.direction, self.length
        )
    }
}

/// Serialize a `Slot` into a string key.
#[cfg(feature = "serde")]
impl Serialize for Slot {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_key())
    }
}

/// Deserialize a `Slot` from a string key.
#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Slot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw_string = String::deserialize(deserializer)?;
        Slot::from_key(&raw_string).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    InvalidPath(String),
    Empty,
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::InvalidPath(path) => write!(f, "Couldn't read file '{path}'"),
            GridError::Empty => write!(f, "Grid must have at least one row"),
        }
    }
}

impl std::error::Error for GridError {}

/// A struct holding everything static about a grid: its occupancy, its slots, and the crossings
/// between them.
#[derive(Debug, Clone)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,

    /// Occupancy matrix indexed by `[row][col]`; `true` means the cell is fillable.
    pub structure: Vec<Vec<bool>>,

    /// All slots in the grid, sorted by identity. A `SlotId` is an index into this list.
    pub slots: Vec<Slot>,

    /// For each ordered pair of slots, the index of their shared cell within each of them, if
    /// they cross. `overlaps[a][b] == Some((i, j))` iff `overlaps[b][a] == Some((j, i))`.
    pub overlaps: Vec<Vec<Option<(usize, usize)>>>,

    /// For each slot, the ids of the slots crossing it, in ascending order.
    pub neighbors: Vec<Vec<SlotId>>,

    /// The inverse of `slots`.
    pub slot_id_by_slot: HashMap<Slot, SlotId>,
}

impl GridConfig {
    /// Build a config from an occupancy matrix. Rows don't need to be the same length; missing
    /// cells count as blocks.
    #[must_use]
    pub fn new(structure: Vec<Vec<bool>>) -> GridConfig {
        let height = structure.len();
        let width = structure.iter().map(Vec::len).max().unwrap_or(0);
        let structure: Vec<Vec<bool>> = structure
            .into_iter()
            .map(|mut row| {
                row.resize(width, false);
                row
            })
            .collect();

        let slots = generate_slots(&structure);
        let overlaps = generate_overlaps(&slots);
        let neighbors = overlaps
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter(|(_, overlap)| overlap.is_some())
                    .map(|(other_slot_id, _)| other_slot_id)
                    .collect()
            })
            .collect();
        let slot_id_by_slot = slots
            .iter()
            .enumerate()
            .map(|(slot_id, &slot)| (slot, slot_id))
            .collect();

        GridConfig {
            width,
            height,
            structure,
            slots,
            overlaps,
            neighbors,
            slot_id_by_slot,
        }
    }

    /// Parse a structure where `_` marks a fillable cell and any other character is a block.
    pub fn from_template_string(template: &str) -> Result<GridConfig, GridError> {
        let structure: Vec<Vec<bool>> = template
            .lines()
            .map(|line| line.chars().map(|c| c == FILLABLE_CELL).collect())
            .collect();

        if structure.is_empty() {
            return Err(GridError::Empty);
        }

        Ok(GridConfig::new(structure))
    }

    /// Read and parse a structure file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<GridConfig, GridError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|_| GridError::InvalidPath(path.to_string_lossy().into()))?;
        GridConfig::from_template_string(&contents)
    }

    #[must_use]
    pub fn is_fillable(&self, (row, col): GridCoord) -> bool {
        self.structure
            .get(row)
            .and_then(|cells| cells.get(col))
            .copied()
            .unwrap_or(false)
    }

    #[must_use]
    pub fn slot_id(&self, slot: &Slot) -> Option<SlotId> {
        self.slot_id_by_slot.get(slot).copied()
    }

    /// Where do these two slots cross, as an index into each of them?
    #[must_use]
    pub fn overlap(&self, a: SlotId, b: SlotId) -> Option<(usize, usize)> {
        self.overlaps[a][b]
    }

    /// Like `overlap`, but looked up by slot identity. Unknown slots never overlap anything.
    #[must_use]
    pub fn overlap_between(&self, a: &Slot, b: &Slot) -> Option<(usize, usize)> {
        self.overlap(self.slot_id(a)?, self.slot_id(b)?)
    }

    #[must_use]
    pub fn neighbors(&self, slot_id: SlotId) -> &[SlotId] {
        &self.neighbors[slot_id]
    }

    /// Every ordered `(slot, neighbor)` pair in the grid.
    #[must_use]
    pub fn all_arcs(&self) -> Vec<(SlotId, SlotId)> {
        (0..self.slots.len())
            .flat_map(|slot_id| {
                self.neighbors[slot_id]
                    .iter()
                    .map(move |&neighbor_id| (slot_id, neighbor_id))
            })
            .collect()
    }
}

/// Scan the rows and columns of a structure for maximal runs of fillable cells at least two cells
/// long, returning them sorted by identity.
#[must_use]
pub fn generate_slots(structure: &[Vec<bool>]) -> Vec<Slot> {
    fn build_runs(lines: &[Vec<bool>]) -> Vec<(usize, usize, usize)> {
        let mut result: Vec<(usize, usize, usize)> = vec![];

        for (line_idx, line) in lines.iter().enumerate() {
            let mut run_start: Option<usize> = None;

            for (cell_idx, &fillable) in line.iter().chain(std::iter::once(&false)).enumerate() {
                match (fillable, run_start) {
                    (true, None) => run_start = Some(cell_idx),
                    (false, Some(start)) => {
                        if cell_idx - start > 1 {
                            result.push((line_idx, start, cell_idx - start));
                        }
                        run_start = None;
                    }
                    _ => {}
                }
            }
        }

        result
    }

    let width = structure.iter().map(Vec::len).max().unwrap_or(0);

    let mut slots: Vec<Slot> = build_runs(structure)
        .into_iter()
        .map(|(row, col, length)| Slot::new(row, col, Direction::Across, length))
        .collect();

    let transposed: Vec<Vec<bool>> = (0..width)
        .map(|col| {
            structure
                .iter()
                .map(|row| row.get(col).copied().unwrap_or(false))
                .collect()
        })
        .collect();

    slots.extend(
        build_runs(&transposed)
            .into_iter()
            .map(|(col, row, length)| Slot::new(row, col, Direction::Down, length)),
    );

    slots.sort();
    slots
}

/// Build the overlap table for a list of slots. Two straight slots in a plane share at most one
/// cell, so each cell maps to at most one across and one down entry.
#[must_use]
pub fn generate_overlaps(slots: &[Slot]) -> Vec<Vec<Option<(usize, usize)>>> {
    // (slot id, cell index within slot) for every slot passing through each cell.
    let mut entries_by_loc: HashMap<GridCoord, Vec<(SlotId, usize)>> = HashMap::new();

    for (slot_id, slot) in slots.iter().enumerate() {
        for (cell_idx, loc) in slot.cells().into_iter().enumerate() {
            entries_by_loc
                .entry(loc)
                .or_default()
                .push((slot_id, cell_idx));
        }
    }

    let mut overlaps = vec![vec![None; slots.len()]; slots.len()];

    for entries in entries_by_loc.values() {
        for &(slot_a, cell_a) in entries {
            for &(slot_b, cell_b) in entries {
                if slot_a != slot_b {
                    overlaps[slot_a][slot_b] = Some((cell_a, cell_b));
                }
            }
        }
    }

    overlaps
}

/// A mapping from slots to the words chosen for them. Iteration follows slot order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Assignment {
    words: BTreeMap<Slot, String>,
}

impl Assignment {
    #[must_use]
    pub fn new() -> Assignment {
        Assignment::default()
    }

    /// Record a word for a slot, returning the word it replaced, if any.
    pub fn insert(&mut self, slot: Slot, word: impl Into<String>) -> Option<String> {
        self.words.insert(slot, word.into())
    }

    #[must_use]
    pub fn get(&self, slot: &Slot) -> Option<&str> {
        self.words.get(slot).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, slot: &Slot) -> bool {
        self.words.contains_key(slot)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Slot, &str)> {
        self.words.iter().map(|(slot, word)| (slot, word.as_str()))
    }

    /// Does this assignment give a word to every slot in the grid?
    #[must_use]
    pub fn is_complete(&self, config: &GridConfig) -> bool {
        config.slots.iter().all(|slot| self.contains(slot))
    }
}

/// Lay the assignment's words out on a `[row][col]` grid of letters. Cells not covered by any
/// assigned word are `None`.
#[must_use]
pub fn letter_grid(config: &GridConfig, assignment: &Assignment) -> Vec<Vec<Option<char>>> {
    let mut letters = vec![vec![None; config.width]; config.height];

    for (slot, word) in assignment.iter() {
        for (cell_idx, letter) in word.chars().enumerate().take(slot.length) {
            let (row, col) = slot.cell(cell_idx);
            if let Some(cell) = letters.get_mut(row).and_then(|cells| cells.get_mut(col)) {
                *cell = Some(letter);
            }
        }
    }

    letters
}

/// Turn the given grid config and assignment into a rendered string, drawing blocks as `█` and
/// unfilled cells as spaces.
#[must_use]
pub fn render_grid(config: &GridConfig, assignment: &Assignment) -> String {
    let letters = letter_grid(config, assignment);

    letters
        .iter()
        .enumerate()
        .map(|(row, line)| {
            line.iter()
                .enumerate()
                .map(|(col, cell)| {
                    if config.structure[row][col] {
                        cell.unwrap_or(' ')
                    } else {
                        BLOCK_CHAR
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use crate::grid_config::{
        render_grid, Assignment, Direction, GridConfig, GridError, Slot,
    };
    use crate::word_list::tests::resource_path;

    #[test]
    fn test_generates_slots_from_template() {
        let config = GridConfig::from_file(resource_path("structure0.txt")).unwrap();

        assert_eq!(config.height, 5);
        assert_eq!(config.width, 5);
        assert_eq!(
            config.slots,
            vec![
                Slot::new(0, 1, Direction::Across, 3),
                Slot::new(0, 1, Direction::Down, 5),
                Slot::new(1, 4, Direction::Down, 4),
                Slot::new(4, 1, Direction::Across, 4),
            ]
        );
    }

    #[test]
    fn test_single_cells_are_not_slots() {
        let config = GridConfig::from_template_string("_#_\n#_#\n_#_").unwrap();
        assert!(config.slots.is_empty());
    }

    #[test]
    fn test_short_rows_are_padded_with_blocks() {
        let config = GridConfig::from_template_string("___\n_\n_").unwrap();

        assert_eq!(config.width, 3);
        assert!(!config.is_fillable((1, 2)));
        assert_eq!(
            config.slots,
            vec![
                Slot::new(0, 0, Direction::Across, 3),
                Slot::new(0, 0, Direction::Down, 3),
            ]
        );
    }

    #[test]
    fn test_empty_template_is_an_error() {
        assert_eq!(
            GridConfig::from_template_string("").unwrap_err(),
            GridError::Empty
        );
    }

    #[test]
    fn test_overlaps_are_symmetric() {
        let config = GridConfig::from_file(resource_path("structure0.txt")).unwrap();

        for a in 0..config.slots.len() {
            assert_eq!(config.overlap(a, a), None);
            for b in 0..config.slots.len() {
                let swapped = config.overlap(b, a).map(|(j, i)| (i, j));
                assert_eq!(config.overlap(a, b), swapped);
            }
        }

        let across = Slot::new(4, 1, Direction::Across, 4);
        let long_down = Slot::new(0, 1, Direction::Down, 5);
        let short_down = Slot::new(1, 4, Direction::Down, 4);
        assert_eq!(config.overlap_between(&long_down, &across), Some((4, 0)));
        assert_eq!(config.overlap_between(&across, &short_down), Some((3, 3)));
        assert_eq!(config.overlap_between(&long_down, &short_down), None);
    }

    #[test]
    fn test_neighbors_and_arcs() {
        let config = GridConfig::from_file(resource_path("structure0.txt")).unwrap();

        assert_eq!(config.neighbors(0), &[1]);
        assert_eq!(config.neighbors(1), &[0, 3]);
        assert_eq!(config.neighbors(2), &[3]);
        assert_eq!(config.neighbors(3), &[1, 2]);
        assert_eq!(config.all_arcs().len(), 6);
    }

    #[test]
    fn test_slot_keys() {
        let slot = Slot::new(1, 2, Direction::Down, 5);
        assert_eq!(slot.to_key(), "1,2,down,5");
        assert_eq!(Slot::from_key("1,2,down,5"), Ok(slot));
        assert!(Slot::from_key("1,2,sideways,5").is_err());
        assert!(Slot::from_key("1,2,down").is_err());
        assert_eq!(slot.to_string(), "(1, 2) down : 5");
    }

    #[test]
    fn test_render_grid() {
        let config = GridConfig::from_template_string("___\n_##").unwrap();
        let mut assignment = Assignment::new();
        assignment.insert(Slot::new(0, 0, Direction::Across, 3), "CAT");

        assert_eq!(render_grid(&config, &assignment), "CAT\n ██");

        assignment.insert(Slot::new(0, 0, Direction::Down, 2), "CO");
        assert_eq!(render_grid(&config, &assignment), "CAT\nO██");
        assert!(assignment.is_complete(&config));
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use crate::grid_config::{Assignment, Direction, Slot};

    #[test]
    fn test_slot_serialization() {
        let slot = Slot::new(1, 2, Direction::Across, 5);

        let slot_key = serde_json::to_string(&slot).unwrap();

        assert_eq!(slot_key, "\"1,2,across,5\"");
    }

    #[test]
    fn test_slot_deserialization() {
        let slot: Slot = serde_json::from_str("\"3,4,down,12\"").unwrap();

        assert_eq!(slot, Slot::new(3, 4, Direction::Down, 12));
    }

    #[test]
    fn test_assignment_serializes_as_map() {
        let mut assignment = Assignment::new();
        assignment.insert(Slot::new(0, 0, Direction::Down, 3), "TEA");
        assignment.insert(Slot::new(0, 0, Direction::Across, 3), "TAR");

        let json = serde_json::to_string(&assignment).unwrap();
        assert_eq!(json, r#"{"0,0,across,3":"TAR","0,0,down,3":"TEA"}"#);

        let round_tripped: Assignment = serde_json::from_str(&json).unwrap();
        assert_eq!(round_tripped, assignment);
    }
}
