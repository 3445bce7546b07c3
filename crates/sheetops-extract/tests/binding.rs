use sheetops_extract::{
    BindError, ExtractError, FieldSpec, FieldValue, Grid, GridError, GridIndex, HostRecord,
    Predicate, RecordBinder, RecordSchema, Scan,
};
use sheetops_testkit::{GridBuilder, host_sheet};

#[test]
fn locate_exact_prefers_first_row_major_match() {
    let grid = GridBuilder::new()
        .set("C1", "dup")
        .set("A2", "dup")
        .set("B2", "dup")
        .build();
    let index = GridIndex::new(&grid);
    let cell = index.locate_exact("dup").unwrap();
    assert_eq!((cell.row(), cell.column()), (0, 2));
    assert_eq!(cell.position(), "C1");
    assert!(index.locate_exact("Dup").is_none());
}

#[test]
fn count_run_ignores_rows_after_the_run() {
    let base = GridBuilder::new().column("A1", &["x", "y"]).build();
    let extended = GridBuilder::new().column("A1", &["x", "y", "", "z"]).build();
    let before = GridIndex::new(&base)
        .count_run(0, 0, Predicate::NonEmpty)
        .unwrap();
    let after = GridIndex::new(&extended)
        .count_run(0, 0, Predicate::NonEmpty)
        .unwrap();
    assert_eq!(before, 2);
    assert_eq!(after, before);
}

#[test]
fn scalar_then_list_of_three() {
    let schema =
        RecordSchema::new(vec![FieldSpec::scalar("address"), FieldSpec::list("logins")]).unwrap();
    let grid = GridBuilder::new()
        .column("B2", &["Main info", "10.0.0.7", "Logins", "", ""])
        .column("C4", &["root", "admin", "deploy"])
        .build();

    let record = RecordBinder::new(schema).bind(&grid, "Main info").unwrap();

    let names: Vec<&str> = record.iter().map(|(spec, _)| spec.name.as_str()).collect();
    assert_eq!(names, vec!["address", "logins"]);
    assert_eq!(record.scalar("address"), Ok("10.0.0.7"));
    assert_eq!(
        record.list("logins").unwrap(),
        &["root".to_string(), "admin".to_string(), "deploy".to_string()]
    );
}

#[test]
fn host_block_binds_into_host_record() {
    let record = RecordBinder::new(HostRecord::schema())
        .bind(&host_sheet(), "Main info")
        .unwrap();
    let host = HostRecord::try_from(&record).unwrap();
    assert_eq!(host.address, "10.0.0.1");
    assert_eq!(host.logins, vec!["root", "admin"]);
    assert_eq!(host.passwords, vec!["toor", "nimda"]);
    assert_eq!(host.credentials().len(), 2);

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "address": "10.0.0.1",
            "logins": ["root", "admin"],
            "passwords": ["toor", "nimda"],
        })
    );
}

#[test]
fn anchor_with_nothing_below_yields_zero_values() {
    let grid = GridBuilder::new()
        .set("A1", "Main info")
        .set("B1", "unrelated")
        .set("A4", "")
        .build();
    let record = RecordBinder::new(HostRecord::schema())
        .bind(&grid, "Main info")
        .unwrap();
    assert!(record.is_zero());
    assert_eq!(record.get("address"), Some(&FieldValue::Scalar(String::new())));
    assert_eq!(record.get("passwords"), Some(&FieldValue::List(Vec::new())));
}

#[test]
fn missing_anchor_is_not_an_error() {
    let record = RecordBinder::new(HostRecord::schema())
        .bind(&host_sheet(), "Nowhere")
        .unwrap();
    assert!(record.is_zero());
}

#[test]
fn fields_after_the_last_label_stay_empty() {
    let grid = GridBuilder::new()
        .column("A1", &["Main info", "10.0.0.1", "Logins"])
        .set("B3", "root")
        .build();
    let record = RecordBinder::new(HostRecord::schema())
        .bind(&grid, "Main info")
        .unwrap();
    assert_eq!(record.list("logins").unwrap(), &["root".to_string()]);
    assert!(record.list("passwords").unwrap().is_empty());
}

#[test]
fn scan_miss_returns_zero_cell() {
    let grid = GridBuilder::new().column("A1", &["x", "", ""]).build();
    let scan = GridIndex::new(&grid)
        .scan_column_from_offset(0, 0, 1, Predicate::NonEmpty)
        .unwrap();
    assert!(matches!(scan, Scan::Miss(_)));
    let cell = scan.into_cell();
    assert!(cell.is_zero());
    assert_eq!(cell.position(), "A1");
}

#[test]
fn ragged_grid_reports_partial_record() {
    let grid = Grid::from_rows(vec![
        vec!["Main info", ""],
        vec!["10.0.0.1", ""],
        vec!["Logins", "root"],
        vec![""],
    ]);
    let BindError { source, partial } = RecordBinder::new(HostRecord::schema())
        .bind(&grid, "Main info")
        .unwrap_err();
    assert_eq!(source, ExtractError::Grid(GridError::out_of_bounds(3, 1)));
    assert_eq!(partial.scalar("address"), Ok("10.0.0.1"));
}
