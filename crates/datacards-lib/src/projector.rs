//! Column-oriented host data to row-oriented display records.

use std::fmt;

use tracing::{debug, warn};

use crate::format::{format_temporal, DisplayZone, NumberFormat, NumberLocale, TemporalOutcome};
use crate::value::{CellValue, ColumnId, ColumnInfo, ColumnMeta, ColumnType, DisplayRow, SourceData};

/// Non-fatal problem met while projecting. The affected value is kept, unformatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectionWarning {
    /// The column's number format spec could not be parsed; raw numbers are shown
    InvalidNumberFormat {
        column: ColumnId,
        spec: String,
        message: String,
    },
    /// A number in a date/datetime column had no recognizable timestamp magnitude
    InvalidTimestamp {
        column: ColumnId,
        row: usize,
        value: String,
    },
}

impl fmt::Display for ProjectionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionWarning::InvalidNumberFormat {
                column,
                spec,
                message,
            } => write!(
                f,
                "column {}: number format '{}' ignored: {}",
                column, spec, message
            ),
            ProjectionWarning::InvalidTimestamp { column, row, value } => write!(
                f,
                "column {} row {}: {} is not a timestamp in seconds or milliseconds",
                column, row, value
            ),
        }
    }
}

/// Output of one projection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Projection {
    pub rows: Vec<DisplayRow>,
    /// Display names in selected-column order, each listed once
    pub headers: Vec<String>,
    pub warnings: Vec<ProjectionWarning>,
}

impl Projection {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// How one selected column is turned into display values.
enum ColumnPlan {
    Temporal,
    Number(NumberFormat),
    PassThrough,
}

/// Converts host data into display rows with type-driven value formatting.
#[derive(Debug, Clone, Default)]
pub struct RowProjector {
    zone: DisplayZone,
    locale: NumberLocale,
}

impl RowProjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render date/datetime cells in `zone` instead of the local zone.
    pub fn with_zone(mut self, zone: DisplayZone) -> Self {
        self.zone = zone;
        self
    }

    pub fn with_locale(mut self, locale: NumberLocale) -> Self {
        self.locale = locale;
        self
    }

    pub fn zone(&self) -> &DisplayZone {
        &self.zone
    }

    /// Project `source_data` into one record per row of the first selected column.
    ///
    /// Never fails: missing inputs give an empty projection, missing columns are
    /// omitted from rows, and formatting problems are reported as warnings.
    pub fn project(
        &self,
        source_data: Option<&SourceData>,
        column_info: Option<&ColumnInfo>,
        selected: Option<&[ColumnId]>,
    ) -> Projection {
        let (Some(source_data), Some(column_info), Some(selected)) =
            (source_data, column_info, selected)
        else {
            return Projection::default();
        };
        let Some(first) = selected.first() else {
            return Projection::default();
        };
        let Some(first_values) = source_data.get(first) else {
            debug!(column = %first, "first selected column has no data");
            return Projection::default();
        };
        let row_count = first_values.len();

        let mut projection = Projection::default();
        let mut plans: Vec<(&ColumnId, &ColumnMeta, &[CellValue], ColumnPlan)> = Vec::new();
        for id in selected {
            let meta = column_info.get(id);
            let values = source_data.get(id);
            let Some(plan) = self.plan_column(id, meta, values, row_count, &mut projection.warnings)
            else {
                continue;
            };
            let (Some(meta), Some(values)) = (meta, values) else {
                continue;
            };
            if !projection.headers.contains(&meta.name) {
                projection.headers.push(meta.name.clone());
            }
            plans.push((id, meta, values.as_slice(), plan));
        }

        for row in 0..row_count {
            let mut record = DisplayRow::new();
            for (id, meta, values, plan) in &plans {
                // Shorter columns yield an absent value, like an out-of-range read
                let value = values.get(row).cloned().unwrap_or(CellValue::Null);
                let display = match plan {
                    ColumnPlan::PassThrough => value,
                    ColumnPlan::Number(format) => match value {
                        CellValue::Number(n) => CellValue::Text(format.format(n)),
                        other => other,
                    },
                    ColumnPlan::Temporal => match format_temporal(&value, &self.zone) {
                        TemporalOutcome::Formatted(text) => CellValue::Text(text),
                        TemporalOutcome::InvalidTimestamp(text) => {
                            warn!(column = %id, row, value = %text, "invalid timestamp");
                            projection
                                .warnings
                                .push(ProjectionWarning::InvalidTimestamp {
                                    column: (*id).clone(),
                                    row,
                                    value: text.clone(),
                                });
                            CellValue::Text(text)
                        }
                    },
                };
                record.insert(meta.name.clone(), display);
            }
            projection.rows.push(record);
        }

        projection
    }

    /// Decide how a selected column is rendered; `None` leaves it out of every row.
    fn plan_column(
        &self,
        id: &ColumnId,
        meta: Option<&ColumnMeta>,
        values: Option<&Vec<CellValue>>,
        row_count: usize,
        warnings: &mut Vec<ProjectionWarning>,
    ) -> Option<ColumnPlan> {
        let Some(meta) = meta else {
            debug!(column = %id, "selected column has no metadata");
            return None;
        };
        if values.is_none() {
            debug!(column = %id, "selected column has no data");
            return None;
        }

        let plan = match meta.column_type {
            ColumnType::Date | ColumnType::Datetime => ColumnPlan::Temporal,
            ColumnType::Number => match meta.format_spec() {
                Some(spec) => match NumberFormat::parse_with_locale(spec, &self.locale) {
                    Ok(format) => ColumnPlan::Number(format),
                    Err(e) => {
                        if row_count > 0 {
                            warn!(column = %id, spec, "number format ignored: {}", e);
                            warnings.push(ProjectionWarning::InvalidNumberFormat {
                                column: id.clone(),
                                spec: spec.to_string(),
                                message: e.to_string(),
                            });
                        }
                        ColumnPlan::PassThrough
                    }
                },
                None => ColumnPlan::PassThrough,
            },
            ColumnType::Other => ColumnPlan::PassThrough,
        };
        Some(plan)
    }
}

/// Project with the default projector (local zone, en-US numbers).
pub fn project(
    source_data: Option<&SourceData>,
    column_info: Option<&ColumnInfo>,
    selected: Option<&[ColumnId]>,
) -> Projection {
    RowProjector::new().project(source_data, column_info, selected)
}

#[derive(Debug, Clone, PartialEq)]
struct MemoKey {
    source_data: Option<SourceData>,
    column_info: Option<ColumnInfo>,
    selected: Option<Vec<ColumnId>>,
}

/// Caches the last projection and recomputes only when an input changes.
#[derive(Debug, Clone, Default)]
pub struct ProjectionMemo {
    projector: RowProjector,
    key: Option<MemoKey>,
    cached: Projection,
    computations: usize,
}

impl ProjectionMemo {
    pub fn new(projector: RowProjector) -> Self {
        Self {
            projector,
            ..Self::default()
        }
    }

    pub fn get(
        &mut self,
        source_data: Option<&SourceData>,
        column_info: Option<&ColumnInfo>,
        selected: Option<&[ColumnId]>,
    ) -> &Projection {
        let key = MemoKey {
            source_data: source_data.cloned(),
            column_info: column_info.cloned(),
            selected: selected.map(<[ColumnId]>::to_vec),
        };
        if self.key.as_ref() != Some(&key) {
            self.cached = self.projector.project(source_data, column_info, selected);
            self.computations += 1;
            self.key = Some(key);
        }
        &self.cached
    }

    /// Number of times the projection was actually computed.
    pub fn computations(&self) -> usize {
        self.computations
    }
}
