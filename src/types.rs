/// An identifier for a given slot, based on its index in the `GridConfig`'s `slots` field. Slots
/// are kept sorted by their identity, so ids are stable for a given structure.
pub type SlotId = usize;

/// An identifier for a given word, based on its index in the `WordList`'s `words` field.
pub type WordId = usize;

/// Zero-indexed (row, column) coords for a cell in the grid, where row 0 is the top row.
pub type GridCoord = (usize, usize);

/// An ordered pair of slots whose consistency is being checked, as `(x, y)`: every option for `x`
/// needs a compatible option in `y`.
pub type SlotPair = (SlotId, SlotId);
