use sheetops_common::{Grid, GridError};

/// The cell a predicate is asked about.
#[derive(Clone, Copy, Debug)]
pub struct Candidate<'g> {
    pub grid: &'g Grid,
    pub value: &'g str,
    pub row: usize,
    pub column: usize,
}

/// Strategy deciding whether a scanned cell matches.
///
/// Implemented by [`Predicate`] and by any `Fn(&Candidate) -> bool`, so ad-hoc
/// tests can be passed by value alongside the canonical strategies.
pub trait CellPredicate {
    fn test(&self, candidate: &Candidate<'_>) -> Result<bool, GridError>;
}

/// Canonical predicates used by the binder.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Predicate {
    /// Value has at least one byte.
    NonEmpty,
    /// First row of a label/value group, or a continuation row of it.
    ///
    /// Matches a non-empty value when the candidate is on `first_row`, or when the
    /// cell one column to the left is blank. A populated left neighbour means
    /// the next group has started.
    GroupBoundary { first_row: usize },
}

impl CellPredicate for Predicate {
    fn test(&self, candidate: &Candidate<'_>) -> Result<bool, GridError> {
        if candidate.value.is_empty() {
            return Ok(false);
        }
        match *self {
            Predicate::NonEmpty => Ok(true),
            Predicate::GroupBoundary { first_row } => {
                if candidate.row == first_row {
                    return Ok(true);
                }
                Ok(candidate.grid.left_of(candidate.row, candidate.column)?.is_empty())
            }
        }
    }
}

impl<F> CellPredicate for F
where
    F: Fn(&Candidate<'_>) -> bool,
{
    fn test(&self, candidate: &Candidate<'_>) -> Result<bool, GridError> {
        Ok(self(candidate))
    }
}
