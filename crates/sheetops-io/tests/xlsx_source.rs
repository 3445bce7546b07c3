use sheetops_io::{GridSource, RetrievalError, XlsxSource};
use sheetops_testkit::{GridBuilder, host_sheet, xlsx_fixture};

#[test]
fn worksheet_reads_back_as_display_strings() {
    let grid = host_sheet();
    let file = xlsx_fixture(&[("Sheet1", &grid)]);

    let source = XlsxSource::open(file.path()).unwrap();
    assert_eq!(source.sheet_names(), vec!["Sheet1".to_string()]);
    assert_eq!(source.rows("Sheet1").unwrap(), grid);
}

#[test]
fn used_range_is_reanchored_at_a1() {
    let grid = GridBuilder::new()
        .set("C3", "Main info")
        .set("C4", "10.0.0.1")
        .build();
    let file = xlsx_fixture(&[("Hosts", &grid)]);

    let rows = XlsxSource::open(file.path())
        .unwrap()
        .rows("Hosts")
        .unwrap();
    assert_eq!(rows.height(), 4);
    assert_eq!(rows.cell(2, 2), Ok("Main info"));
    assert_eq!(rows.cell(3, 2), Ok("10.0.0.1"));
    assert_eq!(rows.cell(0, 0), Ok(""));
}

#[test]
fn unknown_sheet_lists_the_workbook() {
    let file = xlsx_fixture(&[("Hosts", &host_sheet())]);
    let source = XlsxSource::open(file.path()).unwrap();

    match source.rows("Servers") {
        Err(RetrievalError::UnknownSheet { sheet, available }) => {
            assert_eq!(sheet, "Servers");
            assert!(available.contains(&"Hosts".to_string()));
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn missing_workbook_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = XlsxSource::open(dir.path().join("absent.xlsx")).unwrap_err();
    assert!(matches!(err, RetrievalError::Io { .. }));
}
