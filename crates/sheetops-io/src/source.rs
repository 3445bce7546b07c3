use std::collections::BTreeMap;

use sheetops_common::Grid;

use crate::error::RetrievalError;

/// A workbook-like store of named sheets.
pub trait GridSource {
    fn sheet_names(&self) -> Vec<String>;

    /// Materialise `sheet`. Any failure here aborts extraction.
    fn rows(&self, sheet: &str) -> Result<Grid, RetrievalError>;
}

/// Named grids held in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    sheets: BTreeMap<String, Grid>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, name: impl Into<String>, grid: Grid) -> Self {
        self.insert(name, grid);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, grid: Grid) {
        self.sheets.insert(name.into(), grid);
    }
}

impl GridSource for MemorySource {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.keys().cloned().collect()
    }

    fn rows(&self, sheet: &str) -> Result<Grid, RetrievalError> {
        self.sheets
            .get(sheet)
            .cloned()
            .ok_or_else(|| RetrievalError::unknown_sheet(sheet, &self.sheet_names()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_lookup() {
        let source = MemorySource::new()
            .with_sheet("Hosts", Grid::from_rows(vec![vec!["a"]]))
            .with_sheet("Archive", Grid::default());
        assert_eq!(source.sheet_names(), vec!["Archive", "Hosts"]);
        assert_eq!(source.rows("Hosts").unwrap().cell(0, 0), Ok("a"));

        let err = source.rows("Nope").unwrap_err();
        assert_eq!(
            err.to_string(),
            "sheet `Nope` not found (available: Archive, Hosts)"
        );
    }
}
