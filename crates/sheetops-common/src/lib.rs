//! Shared data model for grid extraction: A1 coordinates, transient cells,
//! and the ragged string grid the scanners walk over.

pub mod cell;
pub mod coord;
pub mod grid;

pub use cell::Cell;
pub use coord::{A1ParseError, column_to_letters, letters_to_column, parse_a1, to_a1};
pub use grid::{Grid, GridError};
