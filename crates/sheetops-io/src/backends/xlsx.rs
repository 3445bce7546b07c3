use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{Data, Range, Reader, Xlsx, open_workbook};
use sheetops_common::Grid;
use tracing::debug;

use crate::error::RetrievalError;
use crate::source::GridSource;

/// Worksheets of an `.xlsx` file, every cell rendered as its display string.
#[derive(Clone, Debug)]
pub struct XlsxSource {
    path: PathBuf,
    sheets: Vec<String>,
    pad_rows: bool,
}

impl XlsxSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RetrievalError> {
        let path = path.as_ref().to_path_buf();
        let workbook = Self::workbook(&path)?;
        Ok(Self {
            sheets: workbook.sheet_names(),
            path,
            pad_rows: true,
        })
    }

    pub fn with_pad_rows(mut self, pad_rows: bool) -> Self {
        self.pad_rows = pad_rows;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn workbook(path: &Path) -> Result<Xlsx<BufReader<File>>, RetrievalError> {
        if let Err(e) = std::fs::metadata(path) {
            return Err(RetrievalError::io(path, e));
        }
        open_workbook(path).map_err(|e| RetrievalError::format("xlsx", path, e))
    }
}

/// Used ranges start wherever the first populated cell is; re-anchor at `A1`
/// so grid coordinates match the sheet's.
fn range_to_grid(range: &Range<Data>) -> Grid {
    let (top, left) = range.start().unwrap_or_default();
    let mut rows: Vec<Vec<String>> = vec![Vec::new(); top as usize];
    for row in range.rows() {
        let mut cells = vec![String::new(); left as usize];
        cells.extend(row.iter().map(|cell| cell.to_string()));
        rows.push(cells);
    }
    Grid::new(rows)
}

impl GridSource for XlsxSource {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.clone()
    }

    fn rows(&self, sheet: &str) -> Result<Grid, RetrievalError> {
        if !self.sheets.iter().any(|s| s == sheet) {
            return Err(RetrievalError::unknown_sheet(sheet, &self.sheets));
        }
        let mut workbook = Self::workbook(&self.path)?;
        let range = workbook
            .worksheet_range(sheet)
            .map_err(|e| RetrievalError::format("xlsx", &self.path, e))?;
        let grid = range_to_grid(&range);
        debug!(sheet, rows = grid.height(), columns = grid.width(), "loaded xlsx sheet");
        Ok(if self.pad_rows { grid.padded() } else { grid })
    }
}
