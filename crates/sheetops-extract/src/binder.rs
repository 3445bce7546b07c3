use sheetops_common::{Cell, Grid, GridError};
use thiserror::Error;
use tracing::debug;

use crate::index::{GridIndex, Scan};
use crate::predicate::Predicate;
use crate::schema::{ExtractionRecord, RecordSchema, SchemaMismatch};

/// Cause of a failed extraction step.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Schema(#[from] SchemaMismatch),
}

/// A failed [`RecordBinder::bind`], carrying whatever was bound before the failure.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("record extraction stopped: {source}")]
pub struct BindError {
    #[source]
    pub source: ExtractError,
    pub partial: Box<ExtractionRecord>,
}

/// Populates an [`ExtractionRecord`] from the block that follows an anchor label.
///
/// Layout expected below the anchor, in the anchor's column:
///
/// ```text
///   | A                   | B      |
/// 1 | Main info           |        |   <- anchor
/// 2 | 10.0.0.1            |        |   <- first (scalar) field
/// 3 | Logins              | root   |   <- label; group starts here
/// 4 |                     | admin  |   <- blank label: same group
/// 5 | Passwords           | toor   |   <- next label: next group
/// ```
///
/// Fields after the first are bound in schema order, one label/value group
/// each. The number of values in a group is the run of populated cells in the
/// value column, cut where the label column becomes populated again.
#[derive(Clone, Debug)]
pub struct RecordBinder {
    schema: RecordSchema,
}

impl RecordBinder {
    pub fn new(schema: RecordSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    /// Bind every schema field from the block under `anchor`.
    ///
    /// An absent anchor or an exhausted column is not an error: the affected
    /// fields keep their zero values. Grid and schema errors abort with the
    /// partially bound record attached.
    pub fn bind(&self, grid: &Grid, anchor: &str) -> Result<ExtractionRecord, BindError> {
        let mut record = ExtractionRecord::empty(self.schema.clone());
        match self.fill(grid, anchor, &mut record) {
            Ok(()) => Ok(record),
            Err(source) => Err(BindError {
                source,
                partial: Box::new(record),
            }),
        }
    }

    fn fill(
        &self,
        grid: &Grid,
        anchor: &str,
        record: &mut ExtractionRecord,
    ) -> Result<(), ExtractError> {
        let index = GridIndex::new(grid);
        let Some(anchor_cell) = index.locate_exact(anchor) else {
            debug!(anchor, "anchor not found; record left empty");
            return Ok(());
        };
        debug!(anchor, position = anchor_cell.position(), "anchor located");

        let mut fields = self.schema.fields().iter();
        let Some(first) = fields.next() else {
            return Ok(());
        };
        let mut label = match index.scan_column_from_offset(
            anchor_cell.row(),
            anchor_cell.column(),
            1,
            Predicate::NonEmpty,
        )? {
            Scan::Hit(cell) => cell,
            Scan::Miss(_) => {
                debug!(anchor, "nothing populated below anchor");
                return Ok(());
            }
        };
        record.assign(&first.name, label.value())?;
        debug!(field = %first.name, position = label.position(), "bound first field");

        for field in fields {
            match self.bind_field(grid, &label, &field.name, record)? {
                Scan::Hit(next) => label = next,
                Scan::Miss(_) => {
                    debug!(field = %field.name, "no further labels; remaining fields stay empty");
                    break;
                }
            }
        }
        Ok(())
    }

    /// Bind one field from the group whose label follows `previous`.
    ///
    /// Returns the scan for the group's label cell; a hit is the `previous`
    /// to pass for the next field. Values already in `record` are kept when
    /// this fails.
    pub fn bind_field(
        &self,
        grid: &Grid,
        previous: &Cell,
        name: &str,
        record: &mut ExtractionRecord,
    ) -> Result<Scan, ExtractError> {
        if self.schema.field(name).is_none() {
            return Err(SchemaMismatch::UnknownField(name.to_string()).into());
        }
        let index = GridIndex::new(grid);
        let scan =
            index.scan_column_from_offset(previous.row(), previous.column(), 1, Predicate::NonEmpty)?;
        let Scan::Hit(label) = &scan else {
            return Ok(scan);
        };

        let reference = label.shifted_right(1);
        let boundary = Predicate::GroupBoundary {
            first_row: label.row(),
        };
        let count = index.count_run(reference.row(), reference.column(), boundary)?;
        debug!(
            field = name,
            label = label.value(),
            position = reference.position(),
            count,
            "binding group"
        );

        let mut row = reference.row();
        for _ in 0..count {
            match index.scan_column_from(row, reference.column(), boundary)? {
                Scan::Hit(cell) => record.assign(name, cell.into_value())?,
                Scan::Miss(_) => break,
            }
            row += 1;
        }
        Ok(scan)
    }
}
