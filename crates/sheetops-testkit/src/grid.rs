use std::io::Write;

use sheetops_common::{Grid, parse_a1};
use tempfile::NamedTempFile;

/// Builds a rectangular [`Grid`] from A1-addressed cells; everything unset is empty.
#[derive(Clone, Debug, Default)]
pub struct GridBuilder {
    rows: Vec<Vec<String>>,
}

impl GridBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Panics on a malformed reference; fixtures are written by hand.
    pub fn set(mut self, a1: &str, value: impl Into<String>) -> Self {
        let (row, col) = parse_a1(a1).unwrap_or_else(|e| panic!("bad fixture ref {a1}: {e}"));
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize(col + 1, String::new());
        }
        cells[col] = value.into();
        self
    }

    /// Fill a column downwards starting at `a1`.
    pub fn column(mut self, a1: &str, values: &[&str]) -> Self {
        let (row, col) = parse_a1(a1).unwrap_or_else(|e| panic!("bad fixture ref {a1}: {e}"));
        for (i, value) in values.iter().enumerate() {
            self = self.set(&sheetops_common::to_a1(row + i, col), *value);
        }
        self
    }

    pub fn build(self) -> Grid {
        Grid::new(self.rows).padded()
    }
}

/// The host block as operators lay it out: an anchor, the address under it,
/// then labelled login and password groups with values one column right.
///
/// ```text
///   | A         | B     |
/// 1 | Inventory |       |
/// 2 | Main info |       |
/// 3 | 10.0.0.1  |       |
/// 4 | Logins    | root  |
/// 5 |           | admin |
/// 6 | Passwords | toor  |
/// 7 |           | nimda |
/// ```
pub fn host_sheet() -> Grid {
    GridBuilder::new()
        .column(
            "A1",
            &["Inventory", "Main info", "10.0.0.1", "Logins", "", "Passwords", ""],
        )
        .column("B4", &["root", "admin", "toor", "nimda"])
        .build()
}

/// A temporary file holding `contents`, removed when dropped.
pub fn csv_fixture(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .unwrap_or_else(|e| panic!("cannot create fixture file: {e}"));
    file.write_all(contents.as_bytes())
        .unwrap_or_else(|e| panic!("cannot write fixture file: {e}"));
    file
}
