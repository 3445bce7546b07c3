use sheetops_common::{Cell, Grid, GridError};
use tracing::trace;

use crate::predicate::{CellPredicate, Candidate};

/// Outcome of a column scan.
///
/// A scan that runs off the bottom of the grid still yields a cell: the
/// zero-value [`Cell::default`], exactly what an unmatched scan has always
/// returned. `Miss` keeps that cell available through [`Scan::into_cell`]
/// while letting callers tell it apart from a real hit on an empty `A1`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Scan {
    Hit(Cell),
    Miss(Cell),
}

impl Scan {
    fn miss() -> Self {
        Scan::Miss(Cell::default())
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, Scan::Hit(_))
    }

    pub fn cell(&self) -> &Cell {
        match self {
            Scan::Hit(cell) | Scan::Miss(cell) => cell,
        }
    }

    /// The returned cell, hit or not.
    pub fn into_cell(self) -> Cell {
        match self {
            Scan::Hit(cell) | Scan::Miss(cell) => cell,
        }
    }

    pub fn hit(self) -> Option<Cell> {
        match self {
            Scan::Hit(cell) => Some(cell),
            Scan::Miss(_) => None,
        }
    }
}

/// Stateless scanning primitives over a borrowed grid.
#[derive(Clone, Copy, Debug)]
pub struct GridIndex<'g> {
    grid: &'g Grid,
}

impl<'g> GridIndex<'g> {
    pub fn new(grid: &'g Grid) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &'g Grid {
        self.grid
    }

    /// First cell, in row-major order, whose value equals `target` byte for byte.
    pub fn locate_exact(&self, target: &str) -> Option<Cell> {
        self.grid.rows().enumerate().find_map(|(row, values)| {
            values
                .iter()
                .position(|value| value == target)
                .map(|column| Cell::new(row, column, target))
        })
    }

    /// Walk down `column` from `start_row` and return the first matching cell.
    pub fn scan_column_from<P: CellPredicate>(
        &self,
        start_row: usize,
        column: usize,
        predicate: P,
    ) -> Result<Scan, GridError> {
        for row in start_row..self.grid.height() {
            let value = self.grid.cell(row, column)?;
            let candidate = Candidate {
                grid: self.grid,
                value,
                row,
                column,
            };
            if predicate.test(&candidate)? {
                trace!(row, column, value, "scan hit");
                return Ok(Scan::Hit(Cell::new(row, column, value)));
            }
        }
        trace!(start_row, column, "scan ran off the grid");
        Ok(Scan::miss())
    }

    /// [`scan_column_from`](Self::scan_column_from) starting `offset` rows further down.
    pub fn scan_column_from_offset<P: CellPredicate>(
        &self,
        start_row: usize,
        column: usize,
        offset: usize,
        predicate: P,
    ) -> Result<Scan, GridError> {
        match start_row.checked_add(offset) {
            Some(row) => self.scan_column_from(row, column, predicate),
            None => Ok(Scan::miss()),
        }
    }

    /// Number of consecutive rows from `start_row` in `column` that satisfy `predicate`.
    pub fn count_run<P: CellPredicate>(
        &self,
        start_row: usize,
        column: usize,
        predicate: P,
    ) -> Result<usize, GridError> {
        let mut count = 0;
        for row in start_row..self.grid.height() {
            let value = self.grid.cell(row, column)?;
            let candidate = Candidate {
                grid: self.grid,
                value,
                row,
                column,
            };
            if !predicate.test(&candidate)? {
                break;
            }
            count += 1;
        }
        Ok(count)
    }
}
