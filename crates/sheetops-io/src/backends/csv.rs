use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use sheetops_common::Grid;
use tracing::debug;

use crate::error::RetrievalError;
use crate::source::GridSource;

#[derive(Clone, Debug)]
pub struct CsvOptions {
    /// Field delimiter as a single byte. Use `b'\t'` for TSV.
    pub delimiter: u8,
    /// Pad short rows with empty cells so every row is as wide as the widest.
    pub pad_rows: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            pad_rows: true,
        }
    }
}

/// A CSV file seen as a workbook with a single sheet.
///
/// Every field is kept verbatim as text; there is no header row.
#[derive(Clone, Debug)]
pub struct CsvSource {
    path: PathBuf,
    grid: Grid,
}

impl CsvSource {
    pub const SHEET: &'static str = "Sheet1";

    pub fn open(path: impl AsRef<Path>) -> Result<Self, RetrievalError> {
        Self::open_with_options(path, CsvOptions::default())
    }

    pub fn open_with_options(
        path: impl AsRef<Path>,
        options: CsvOptions,
    ) -> Result<Self, RetrievalError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| RetrievalError::io(path, e))?;
        let grid = read_grid(BufReader::new(file), &options, path)?;
        debug!(
            path = %path.display(),
            rows = grid.height(),
            columns = grid.width(),
            "loaded csv sheet"
        );
        Ok(Self {
            path: path.to_path_buf(),
            grid,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GridSource for CsvSource {
    fn sheet_names(&self) -> Vec<String> {
        vec![Self::SHEET.to_string()]
    }

    fn rows(&self, sheet: &str) -> Result<Grid, RetrievalError> {
        if sheet != Self::SHEET {
            return Err(RetrievalError::unknown_sheet(sheet, &self.sheet_names()));
        }
        Ok(self.grid.clone())
    }
}

fn read_grid<R: Read>(
    reader: R,
    options: &CsvOptions,
    path: &Path,
) -> Result<Grid, RetrievalError> {
    let mut rdr = ::csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(false)
        // Ragged rows are kept as-is; padding is a separate step.
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| RetrievalError::format("csv", path, e))?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }
    let grid = Grid::new(rows);
    Ok(if options.pad_rows { grid.padded() } else { grid })
}

/// Write `grid` to `path` as comma-separated text, one record per row.
pub fn export_csv(grid: &Grid, path: impl AsRef<Path>) -> Result<(), RetrievalError> {
    let path = path.as_ref();
    let mut wtr = ::csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| RetrievalError::format("csv", path, e))?;
    for row in grid.rows() {
        wtr.write_record(row)
            .map_err(|e| RetrievalError::format("csv", path, e))?;
    }
    wtr.flush().map_err(|e| RetrievalError::io(path, e))?;
    debug!(path = %path.display(), rows = grid.height(), "wrote csv snapshot");
    Ok(())
}
