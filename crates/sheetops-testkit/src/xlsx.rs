use sheetops_common::Grid;
use tempfile::NamedTempFile;

/// An `.xlsx` workbook holding each `(name, grid)` as a worksheet, removed
/// when dropped.
///
/// Cells are written as strings and empty ones are left blank. The default
/// `Sheet1` is reused when named and stays in the workbook otherwise.
pub fn xlsx_fixture(sheets: &[(&str, &Grid)]) -> NamedTempFile {
    let mut book = umya_spreadsheet::new_file();
    for (name, grid) in sheets {
        if book.get_sheet_by_name(name).is_none() {
            book.new_sheet(*name)
                .unwrap_or_else(|e| panic!("cannot add sheet {name}: {e}"));
        }
        let sheet = book
            .get_sheet_by_name_mut(name)
            .unwrap_or_else(|| panic!("sheet {name} missing after creation"));
        for (row, cells) in grid.rows().enumerate() {
            for (col, value) in cells.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                sheet
                    .get_cell_mut((col as u32 + 1, row as u32 + 1))
                    .set_value_string(value.as_str());
            }
        }
    }

    let file = tempfile::Builder::new()
        .suffix(".xlsx")
        .tempfile()
        .unwrap_or_else(|e| panic!("cannot create fixture file: {e}"));
    umya_spreadsheet::writer::xlsx::write(&book, file.path())
        .unwrap_or_else(|e| panic!("cannot write fixture workbook: {e}"));
    file
}
