pub mod arc_consistency;
pub mod backtracking_search;
pub mod domains;
pub mod grid_config;
pub mod types;
pub mod util;
pub mod word_list;

pub const CHECK_INVARIANTS: bool = cfg!(feature = "check_invariants");

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;

pub use backtracking_search::{find_fill, solve, FillFailure, FillOptions, FillSuccess};
pub use grid_config::{Assignment, Direction, GridConfig, Slot};
pub use word_list::WordList;
