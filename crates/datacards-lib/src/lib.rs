//! Row projection, value formatting and theming for data cards.
//!
//! The [`projector`] turns column-oriented host data into display rows with
//! type-aware formatting. The [`color`] and [`theme`] modules handle the
//! persisted HSL theme representation and applying it to a style scope.

pub mod cards;
pub mod color;
pub mod config;
pub mod format;
pub mod logging;
pub mod payload;
pub mod projector;
pub mod settings;
pub mod theme;
pub mod value;

pub use cards::{JsonPresenter, RowPresenter, TextCardPresenter};
pub use color::{hex_to_hsl_triple, hsl_triple_to_hex, Hsl, Rgb};
pub use config::{AppConfig, ConfigManager};
pub use format::{DisplayZone, NumberFormat, NumberLocale};
pub use payload::HostPayload;
pub use projector::{project, Projection, ProjectionMemo, ProjectionWarning, RowProjector};
pub use settings::{CardSettings, HostConfigUpdate, PluginSettings, SettingsEditor};
pub use theme::{
    resolve_theme_colors, CssStyleSink, MemoryStyleSink, StyleSink, ThemeApplier, ThemeColorMap,
    ThemeMode, ThemeSelection,
};
pub use value::{CellValue, ColumnId, ColumnInfo, ColumnMeta, ColumnType, DisplayRow, SourceData};

/// Application name, used for the config directory
pub const APP_NAME: &str = "datacards";
