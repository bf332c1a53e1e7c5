use datacards_lib::{CellValue, ColumnId, ColumnInfo, ColumnMeta, ColumnType, SourceData};

pub fn ids(names: &[&str]) -> Vec<ColumnId> {
    names.iter().map(|s| s.to_string()).collect()
}

#[allow(dead_code)]
/// Three sales rows: name, revenue (",.2f"), created (epoch seconds).
pub fn sales_fixture() -> (SourceData, ColumnInfo) {
    let mut data = SourceData::new();
    data.insert(
        "c1".to_string(),
        vec![
            CellValue::Text("Alice".into()),
            CellValue::Text("Bob".into()),
            CellValue::Text("Carol".into()),
        ],
    );
    data.insert(
        "c2".to_string(),
        vec![
            CellValue::Number(1234.5),
            CellValue::Number(0.0),
            CellValue::Number(-9876543.219),
        ],
    );
    data.insert(
        "c3".to_string(),
        vec![
            CellValue::Number(1_700_000_000.0),
            CellValue::Number(1_700_000_000_000.0),
            CellValue::Null,
        ],
    );

    let mut info = ColumnInfo::new();
    info.insert("c1".to_string(), ColumnMeta::new("Name", ColumnType::Other));
    info.insert(
        "c2".to_string(),
        ColumnMeta::new("Revenue", ColumnType::Number).with_format(",.2f"),
    );
    info.insert(
        "c3".to_string(),
        ColumnMeta::new("Created", ColumnType::Datetime),
    );
    (data, info)
}
