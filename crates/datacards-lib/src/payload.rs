//! Typed view of the JSON the host hands over.
//!
//! ```json
//! {
//!   "sourceData": { "c1": ["Bob", "Joe"], "c2": [40, 30] },
//!   "columnInfo": { "c1": { "name": "Name", "columnType": "text" },
//!                   "c2": { "name": "Amount", "columnType": "number", "format": { "format": ",.2f" } } },
//!   "columns": ["c1", "c2"],
//!   "config": { "Title": "People", "config": "{\"title\": \"Card Display\"}" }
//! }
//! ```
//!
//! Conversion is lenient below the top level: malformed entries are dropped
//! (logged at debug) so the projector sees them as absent.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde_json::{Map, Value};
use tracing::debug;

use crate::projector::{Projection, RowProjector};
use crate::settings::{CardSettings, PluginSettings};
use crate::value::{CellValue, ColumnFormat, ColumnId, ColumnInfo, ColumnMeta, ColumnType, SourceData};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HostPayload {
    pub source_data: Option<SourceData>,
    pub column_info: Option<ColumnInfo>,
    pub columns: Option<Vec<ColumnId>>,
    /// Host editor-panel configuration, if supplied
    pub host_config: Option<Value>,
}

impl HostPayload {
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| eyre!("Failed to parse host payload: {}", e))?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| eyre!("Host payload must be a JSON object"))?;

        Ok(Self {
            source_data: obj
                .get("sourceData")
                .and_then(Value::as_object)
                .map(source_data_from),
            column_info: obj
                .get("columnInfo")
                .and_then(Value::as_object)
                .map(column_info_from),
            columns: obj
                .get("columns")
                .and_then(Value::as_array)
                .map(|ids| ids.iter().filter_map(column_id_from).collect()),
            host_config: obj.get("config").filter(|c| c.is_object()).cloned(),
        })
    }

    pub fn project(&self, projector: &RowProjector) -> Projection {
        projector.project(
            self.source_data.as_ref(),
            self.column_info.as_ref(),
            self.columns.as_deref(),
        )
    }

    /// Card settings from the host config, defaults when absent.
    pub fn card_settings(&self) -> CardSettings {
        self.host_config
            .as_ref()
            .map(CardSettings::from_host_config)
            .unwrap_or_default()
    }

    /// Plugin settings from the persisted `config` string, defaults when absent.
    pub fn plugin_settings(&self) -> PluginSettings {
        self.host_config
            .as_ref()
            .and_then(|c| c.get("config"))
            .and_then(Value::as_str)
            .map(PluginSettings::from_json)
            .unwrap_or_default()
    }
}

/// Numeric ids keep their place in the selection as their decimal text.
fn column_id_from(id: &Value) -> Option<ColumnId> {
    match id {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        other => {
            debug!(id = %other, "dropping selected column id: not a string or number");
            None
        }
    }
}

fn source_data_from(obj: &Map<String, Value>) -> SourceData {
    obj.iter()
        .filter_map(|(id, values)| match values {
            Value::Array(cells) => Some((
                id.clone(),
                cells.iter().cloned().map(CellValue::from).collect(),
            )),
            _ => {
                debug!(column = %id, "dropping column data: not an array");
                None
            }
        })
        .collect()
}

fn column_info_from(obj: &Map<String, Value>) -> ColumnInfo {
    obj.iter()
        .filter_map(|(id, meta)| {
            let Some(name) = meta.get("name").and_then(Value::as_str) else {
                debug!(column = %id, "dropping column metadata without a name");
                return None;
            };
            let column_type = meta
                .get("columnType")
                .and_then(Value::as_str)
                .map(ColumnType::parse)
                .unwrap_or_default();
            let format = meta
                .get("format")
                .filter(|f| f.is_object())
                .map(|f| ColumnFormat {
                    format: f.get("format").and_then(Value::as_str).map(str::to_string),
                });
            Some((
                id.clone(),
                ColumnMeta {
                    name: name.to_string(),
                    column_type,
                    format,
                },
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_conversion() {
        let payload = HostPayload::from_json(
            r#"{
                "sourceData": {"a": [1, "x", null, true], "b": "oops"},
                "columnInfo": {"a": {"name": "A", "columnType": "number"}, "b": {"columnType": "text"}},
                "columns": ["a", 3, null, "b"]
            }"#,
        )
        .unwrap();
        let data = payload.source_data.as_ref().unwrap();
        assert_eq!(
            data["a"],
            vec![
                CellValue::Number(1.0),
                CellValue::Text("x".into()),
                CellValue::Null,
                CellValue::Text("true".into())
            ]
        );
        assert!(!data.contains_key("b"));
        assert!(!payload.column_info.as_ref().unwrap().contains_key("b"));
        assert_eq!(
            payload.columns,
            Some(vec!["a".to_string(), "3".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_numeric_first_column_keeps_row_count_source() {
        let payload = HostPayload::from_json(
            r#"{
                "sourceData": {"3": [1, 2, 3], "a": ["x"]},
                "columnInfo": {"3": {"name": "Three", "columnType": "number"},
                               "a": {"name": "A", "columnType": "text"}},
                "columns": [3, "a"]
            }"#,
        )
        .unwrap();
        let projection = payload.project(&RowProjector::new());
        assert_eq!(projection.len(), 3);
        assert_eq!(projection.headers, vec!["Three", "A"]);
    }

    #[test]
    fn test_missing_sections_are_absent() {
        let payload = HostPayload::from_json("{}").unwrap();
        assert_eq!(payload, HostPayload::default());
        assert!(payload.project(&RowProjector::new()).is_empty());
    }

    #[test]
    fn test_top_level_errors() {
        assert!(HostPayload::from_json("not json").is_err());
        assert!(HostPayload::from_json("[1, 2]").is_err());
    }

    #[test]
    fn test_format_and_settings() {
        let payload = HostPayload::from_json(
            r#"{
                "columnInfo": {"r": {"name": "Revenue", "columnType": "number", "format": {"format": ",.2f"}}},
                "config": {"Title": "Sales", "config": "{\"title\": \"Board\"}"}
            }"#,
        )
        .unwrap();
        let info = payload.column_info.as_ref().unwrap();
        assert_eq!(info["r"].format_spec(), Some(",.2f"));
        assert_eq!(payload.card_settings().title, "Sales");
        assert_eq!(payload.plugin_settings().title, "Board");
    }
}
