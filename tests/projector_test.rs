mod common;

use common::{ids, sales_fixture};
use datacards_lib::{
    project, CellValue, ColumnInfo, ColumnMeta, ColumnType, DisplayZone, ProjectionMemo,
    ProjectionWarning, RowProjector, SourceData,
};
use regex::Regex;

#[test]
fn test_one_record_per_row_of_first_column() {
    let (data, info) = sales_fixture();
    let selected = ids(&["c1", "c2", "c3"]);
    let projection = project(Some(&data), Some(&info), Some(&selected));

    assert_eq!(projection.len(), 3);
    assert_eq!(projection.headers, vec!["Name", "Revenue", "Created"]);
    assert!(projection.rows.iter().all(|row| row.len() == 3));
}

#[test]
fn test_missing_inputs_give_empty_projection() {
    let (data, info) = sales_fixture();
    let selected = ids(&["c1"]);

    assert!(project(None, Some(&info), Some(&selected)).is_empty());
    assert!(project(Some(&data), None, Some(&selected)).is_empty());
    assert!(project(Some(&data), Some(&info), None).is_empty());
    assert!(project(Some(&data), Some(&info), Some(&[])).is_empty());
    assert!(project(Some(&data), Some(&info), Some(&ids(&["nope"]))).is_empty());
}

#[test]
fn test_revenue_is_formatted() {
    let (data, info) = sales_fixture();
    let projection = project(Some(&data), Some(&info), Some(&ids(&["c1", "c2"])));

    let revenue: Vec<_> = projection
        .rows
        .iter()
        .map(|row| row.get("Revenue").cloned())
        .collect();
    assert_eq!(
        revenue,
        vec![
            Some(CellValue::Text("1,234.50".into())),
            Some(CellValue::Text("0.00".into())),
            Some(CellValue::Text("-9,876,543.22".into())),
        ]
    );
    assert!(projection.warnings.is_empty());
}

#[test]
fn test_created_is_wall_clock_text() {
    let (data, info) = sales_fixture();
    let projection = project(Some(&data), Some(&info), Some(&ids(&["c1", "c3"])));
    let pattern = Regex::new(r"^[A-Z][a-z]{2} \d{1,2}, \d{1,2}:\d{2} (AM|PM)$").unwrap();

    for row in &projection.rows[..2] {
        let Some(CellValue::Text(text)) = row.get("Created") else {
            panic!("Created should be text, got {:?}", row.get("Created"));
        };
        assert!(pattern.is_match(text), "unexpected timestamp text {text}");
    }
    // Seconds and milliseconds are the same instant
    assert_eq!(projection.rows[0].get("Created"), projection.rows[1].get("Created"));
    assert_eq!(
        projection.rows[2].get("Created"),
        Some(&CellValue::Text(String::new()))
    );
}

#[test]
fn test_fixed_zone_projection() {
    let (data, info) = sales_fixture();
    let projector = RowProjector::new().with_zone(DisplayZone::parse("+02:00").unwrap());
    let projection = projector.project(Some(&data), Some(&info), Some(&ids(&["c3"])));
    assert_eq!(
        projection.rows[0].get("Created"),
        Some(&CellValue::Text("Nov 15, 12:13 AM".into()))
    );
}

#[test]
fn test_invalid_format_keeps_raw_value() {
    let mut data = SourceData::new();
    data.insert("n".to_string(), vec![CellValue::Number(42.0)]);
    let mut info = ColumnInfo::new();
    info.insert(
        "n".to_string(),
        ColumnMeta::new("Count", ColumnType::Number).with_format("!!!"),
    );

    let projection = project(Some(&data), Some(&info), Some(&ids(&["n"])));
    assert_eq!(projection.rows[0].get("Count"), Some(&CellValue::Number(42.0)));
    assert_eq!(projection.warnings.len(), 1);
    assert!(matches!(
        &projection.warnings[0],
        ProjectionWarning::InvalidNumberFormat { column, spec, .. } if column == "n" && spec == "!!!"
    ));
}

#[test]
fn test_duplicate_display_names_last_write_wins() {
    let mut data = SourceData::new();
    data.insert("a".to_string(), vec![CellValue::Number(1.0)]);
    data.insert("b".to_string(), vec![CellValue::Number(2.0)]);
    let mut info = ColumnInfo::new();
    info.insert("a".to_string(), ColumnMeta::new("Value", ColumnType::Number));
    info.insert("b".to_string(), ColumnMeta::new("Value", ColumnType::Number));

    let projection = project(Some(&data), Some(&info), Some(&ids(&["a", "b"])));
    assert_eq!(projection.headers, vec!["Value"]);
    assert_eq!(projection.rows[0].len(), 1);
    assert_eq!(projection.rows[0].get("Value"), Some(&CellValue::Number(2.0)));
}

#[test]
fn test_columns_without_metadata_are_skipped() {
    let (data, mut info) = sales_fixture();
    info.remove("c2");

    let projection = project(Some(&data), Some(&info), Some(&ids(&["c1", "c2"])));
    assert_eq!(projection.headers, vec!["Name"]);
    assert!(projection.rows.iter().all(|row| !row.contains("Revenue")));
}

#[test]
fn test_memo_recomputes_only_on_change() {
    let (mut data, info) = sales_fixture();
    let selected = ids(&["c1", "c2"]);
    let mut memo = ProjectionMemo::new(RowProjector::new());

    assert_eq!(memo.get(Some(&data), Some(&info), Some(&selected)).len(), 3);
    assert_eq!(memo.get(Some(&data), Some(&info), Some(&selected)).len(), 3);
    assert_eq!(memo.computations(), 1);

    data.insert("c1".to_string(), vec![CellValue::Text("Dan".into())]);
    assert_eq!(memo.get(Some(&data), Some(&info), Some(&selected)).len(), 1);
    assert_eq!(memo.computations(), 2);
}
