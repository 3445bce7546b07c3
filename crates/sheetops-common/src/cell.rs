use std::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::coord::{A1ParseError, parse_a1, to_a1};

/// A value read from a grid together with where it was found.
///
/// Cells are produced on demand by scans; `position` is always the A1 form of
/// `(row, column)`, so the fields are private and only set through [`Cell::new`].
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Cell {
    row: usize,
    column: usize,
    position: String,
    value: String,
}

impl Cell {
    pub fn new(row: usize, column: usize, value: impl Into<String>) -> Self {
        Self {
            row,
            column,
            position: to_a1(row, column),
            value: value.into(),
        }
    }

    /// Build a cell from an A1 position.
    pub fn at(position: &str, value: impl Into<String>) -> Result<Self, A1ParseError> {
        let (row, column) = parse_a1(position)?;
        Ok(Self::new(row, column, value))
    }

    #[inline]
    pub fn row(&self) -> usize {
        self.row
    }

    #[inline]
    pub fn column(&self) -> usize {
        self.column
    }

    pub fn position(&self) -> &str {
        &self.position
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn into_value(self) -> String {
        self.value
    }

    /// True for the zero-value cell (`A1`, empty value) that a failed scan yields.
    pub fn is_zero(&self) -> bool {
        self.row == 0 && self.column == 0 && self.value.is_empty()
    }

    /// Same row, `delta` columns to the right. The value is not carried over.
    pub fn shifted_right(&self, delta: usize) -> Self {
        Self::new(self.row, self.column + delta, String::new())
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::new(0, 0, String::new())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:?}", self.position, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_tracks_coordinates() {
        let cell = Cell::new(4, 2, "root");
        assert_eq!(cell.position(), "C5");
        assert_eq!(cell.value(), "root");

        let parsed = Cell::at(cell.position(), "root").unwrap();
        assert_eq!(parsed, cell);
    }

    #[test]
    fn default_is_zero_value() {
        let zero = Cell::default();
        assert!(zero.is_zero());
        assert_eq!(zero.position(), "A1");
        assert!(!Cell::new(0, 0, "x").is_zero());
    }

    #[test]
    fn shifted_right_drops_value() {
        let shifted = Cell::new(3, 0, "Logins").shifted_right(1);
        assert_eq!((shifted.row(), shifted.column()), (3, 1));
        assert_eq!(shifted.position(), "B4");
        assert_eq!(shifted.value(), "");
    }
}
