//! Host-facing data model: cell values, column metadata and display rows.

use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Opaque host-assigned column identifier.
pub type ColumnId = String;

/// Column-oriented source data: one value sequence per column id.
pub type SourceData = HashMap<ColumnId, Vec<CellValue>>;

/// Column metadata keyed by column id.
pub type ColumnInfo = HashMap<ColumnId, ColumnMeta>;

/// A single cell as supplied by the host.
///
/// JSON input only ever produces `Null`, `Number` and `Text`. `Instant` is for
/// hosts embedding the library that already hold a parsed point in time.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Number(f64),
    Text(String),
    Instant(DateTime<Utc>),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// String form used when a value has to be shown as-is (`String(value)`).
    pub fn to_display_string(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Number(n) => crate::format::js_number_string(*n),
            CellValue::Text(s) => s.clone(),
            CellValue::Instant(dt) => dt.to_rfc3339(),
        }
    }
}

impl From<serde_json::Value> for CellValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => CellValue::Null,
            Value::Number(n) => n.as_f64().map(CellValue::Number).unwrap_or(CellValue::Null),
            Value::String(s) => CellValue::Text(s),
            Value::Bool(b) => CellValue::Text(b.to_string()),
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(CellValue::from)
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Null => serializer.serialize_unit(),
            CellValue::Number(n) => {
                // Keep integral values integral in JSON output (42, not 42.0)
                if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::Instant(dt) => serializer.serialize_str(&dt.to_rfc3339()),
        }
    }
}

/// Declared column type. Formatting dispatches on this tag, never on the shape of a value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColumnType {
    Number,
    Date,
    Datetime,
    #[default]
    Other,
}

impl ColumnType {
    pub fn parse(s: &str) -> Self {
        match s {
            "number" => ColumnType::Number,
            "date" => ColumnType::Date,
            "datetime" => ColumnType::Datetime,
            _ => ColumnType::Other,
        }
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, ColumnType::Date | ColumnType::Datetime)
    }
}

/// Optional numeric format attached to a column (`{ "format": ",.2f" }`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ColumnFormat {
    #[serde(default)]
    pub format: Option<String>,
}

/// Host-supplied description of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMeta {
    /// Display name; used as the key in produced rows
    pub name: String,
    pub column_type: ColumnType,
    pub format: Option<ColumnFormat>,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            format: None,
        }
    }

    pub fn with_format(mut self, spec: impl Into<String>) -> Self {
        self.format = Some(ColumnFormat {
            format: Some(spec.into()),
        });
        self
    }

    /// The numeric format spec string, when one is present.
    pub fn format_spec(&self) -> Option<&str> {
        self.format.as_ref().and_then(|f| f.format.as_deref())
    }
}

/// One flattened, formatted record keyed by display name.
///
/// Keys are kept sorted; consumers must not rely on key order for display.
/// Use [`crate::projector::Projection::headers`] for the selected-column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplayRow {
    fields: BTreeMap<String, CellValue>,
}

impl DisplayRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field; an existing field with the same display name is overwritten.
    pub fn insert(&mut self, name: impl Into<String>, value: CellValue) {
        self.fields.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Serialize for DisplayRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
