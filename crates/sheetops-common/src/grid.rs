#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coord::to_a1;

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum GridError {
    /// The row does not exist, or is shorter than the requested column.
    #[error("cell {position} (row {row}, column {column}) is outside the grid")]
    OutOfBounds {
        row: usize,
        column: usize,
        position: String,
    },
    /// A neighbour lookup was attempted left of column `A`.
    #[error("row {row} has no cell to the left of column A")]
    NoLeftNeighbor { row: usize },
}

impl GridError {
    pub fn out_of_bounds(row: usize, column: usize) -> Self {
        GridError::OutOfBounds {
            row,
            column,
            position: to_a1(row, column),
        }
    }
}

/// Materialised sheet contents: rows of string values, 0-based, possibly ragged.
///
/// Reads past the end of a row are errors, never implicit empty strings.
/// Sources that want rectangular semantics call [`Grid::pad_to_rectangle`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<String>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Convenience constructor over anything string-like.
    pub fn from_rows<I, R, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Length of the longest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_len(&self, row: usize) -> Option<usize> {
        self.rows.get(row).map(Vec::len)
    }

    /// Bounds-checked read.
    pub fn cell(&self, row: usize, column: usize) -> Result<&str, GridError> {
        self.get(row, column)
            .ok_or_else(|| GridError::out_of_bounds(row, column))
    }

    pub fn get(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
    }

    /// Value immediately left of `(row, column)`.
    pub fn left_of(&self, row: usize, column: usize) -> Result<&str, GridError> {
        let left = column
            .checked_sub(1)
            .ok_or(GridError::NoLeftNeighbor { row })?;
        self.cell(row, left)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[String]> + '_ {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Extend every row with empty strings up to the grid width.
    pub fn pad_to_rectangle(&mut self) {
        let width = self.width();
        for row in &mut self.rows {
            row.resize(width, String::new());
        }
    }

    pub fn padded(mut self) -> Self {
        self.pad_to_rectangle();
        self
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }
}

impl From<Vec<Vec<String>>> for Grid {
    fn from(rows: Vec<Vec<String>>) -> Self {
        Self::new(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ragged() -> Grid {
        Grid::from_rows(vec![vec!["a", "b", "c"], vec!["d"], vec![]])
    }

    #[test]
    fn reads_are_bounds_checked() {
        let grid = ragged();
        assert_eq!(grid.cell(0, 2), Ok("c"));
        assert_eq!(grid.cell(1, 0), Ok("d"));
        assert_eq!(grid.cell(1, 1), Err(GridError::out_of_bounds(1, 1)));
        assert_eq!(grid.cell(2, 0), Err(GridError::out_of_bounds(2, 0)));
        assert_eq!(grid.cell(3, 0), Err(GridError::out_of_bounds(3, 0)));
        assert_eq!(
            grid.cell(1, 1).unwrap_err().to_string(),
            "cell B2 (row 1, column 1) is outside the grid"
        );
    }

    #[test]
    fn left_neighbour() {
        let grid = ragged();
        assert_eq!(grid.left_of(0, 1), Ok("a"));
        assert_eq!(grid.left_of(0, 0), Err(GridError::NoLeftNeighbor { row: 0 }));
    }

    #[test]
    fn padding_makes_rectangle() {
        let grid = ragged().padded();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 3);
        for row in grid.rows() {
            assert_eq!(row.len(), 3);
        }
        assert_eq!(grid.cell(2, 2), Ok(""));
    }
}
