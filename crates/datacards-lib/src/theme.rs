//! Theme presets, theme selection and applying a color map to a style scope.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use color_eyre::eyre::eyre;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// CSS custom property name (`--primary`) to HSL triple (`"240 9% 10%"`).
pub type ThemeColorMap = BTreeMap<String, String>;

pub const LIGHT_PRESET: &[(&str, &str)] = &[
    ("--background", "0 0% 100%"),
    ("--foreground", "240 10% 3.9%"),
    ("--card", "0 0% 100%"),
    ("--card-foreground", "240 10% 3.9%"),
    ("--popover", "0 0% 100%"),
    ("--popover-foreground", "240 10% 3.9%"),
    ("--primary", "240 9% 10%"),
    ("--primary-foreground", "0 0% 98%"),
    ("--secondary", "240 4.8% 95.9%"),
    ("--secondary-foreground", "240 5.9% 10%"),
    ("--muted", "240 4.8% 95.9%"),
    ("--muted-foreground", "240 3.8% 46.1%"),
    ("--accent", "240 4.8% 95.9%"),
    ("--accent-foreground", "240 5.9% 10%"),
    ("--destructive", "0 84.2% 60.2%"),
    ("--destructive-foreground", "0 0% 98%"),
    ("--border", "240 5.9% 90%"),
    ("--input", "240 5.9% 90%"),
    ("--ring", "240 5.9% 10%"),
];

pub const DARK_PRESET: &[(&str, &str)] = &[
    ("--background", "240 10% 3.9%"),
    ("--foreground", "0 0% 98%"),
    ("--card", "240 10% 3.9%"),
    ("--card-foreground", "0 0% 98%"),
    ("--popover", "240 10% 3.9%"),
    ("--popover-foreground", "0 0% 98%"),
    ("--primary", "0 0% 98%"),
    ("--primary-foreground", "240 5.9% 10%"),
    ("--secondary", "240 3.7% 15.9%"),
    ("--secondary-foreground", "0 0% 98%"),
    ("--muted", "240 3.7% 15.9%"),
    ("--muted-foreground", "240 5% 64.9%"),
    ("--accent", "240 3.7% 15.9%"),
    ("--accent-foreground", "0 0% 98%"),
    ("--destructive", "0 62.8% 30.6%"),
    ("--destructive-foreground", "0 0% 98%"),
    ("--border", "240 3.7% 15.9%"),
    ("--input", "240 3.7% 15.9%"),
    ("--ring", "240 4.9% 83.9%"),
];

fn preset_map(preset: &[(&str, &str)]) -> ThemeColorMap {
    preset
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn light_preset() -> ThemeColorMap {
    preset_map(LIGHT_PRESET)
}

pub fn dark_preset() -> ThemeColorMap {
    preset_map(DARK_PRESET)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
    Custom,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::Custom => "custom",
        }
    }

    /// Like `parse`, but an unrecognized name means light.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| {
            warn!("Unknown theme mode '{}'; using light", s);
            ThemeMode::Light
        })
    }

    /// The fixed color set for light and dark; custom has none.
    pub fn preset(&self) -> Option<ThemeColorMap> {
        match self {
            ThemeMode::Light => Some(light_preset()),
            ThemeMode::Dark => Some(dark_preset()),
            ThemeMode::Custom => None,
        }
    }
}

impl FromStr for ThemeMode {
    type Err = color_eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            "custom" => Ok(ThemeMode::Custom),
            _ => Err(eyre!(
                "Unknown theme mode '{}'. Expected light, dark or custom",
                s
            )),
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user's theme choice, persisted as the `styling` object of the plugin settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeSelection {
    #[serde(rename = "theme")]
    pub mode: ThemeMode,
    #[serde(rename = "customColors", skip_serializing_if = "Option::is_none")]
    pub custom_colors: Option<ThemeColorMap>,
    #[serde(rename = "enableDynamicTheming")]
    pub dynamic_preview_enabled: bool,
}

impl Default for ThemeSelection {
    fn default() -> Self {
        Self {
            mode: ThemeMode::Light,
            custom_colors: Some(light_preset()),
            dynamic_preview_enabled: true,
        }
    }
}

impl ThemeSelection {
    pub fn new(mode: ThemeMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_custom_colors(mut self, colors: ThemeColorMap) -> Self {
        self.custom_colors = Some(colors);
        self
    }

    /// Read a persisted selection field by field, keeping the default for any
    /// field that is missing or has the wrong type.
    ///
    /// Accepts `theme` or `mode` for the mode, and `enableDynamicTheming` or
    /// `dynamicPreviewEnabled` for the preview flag.
    pub fn from_value(value: &Value) -> Self {
        let mut selection = Self::default();
        let Some(obj) = value.as_object() else {
            if !value.is_null() {
                warn!("Ignoring styling settings: expected an object");
            }
            return selection;
        };

        match obj.get("theme").or_else(|| obj.get("mode")) {
            Some(Value::String(s)) => selection.mode = ThemeMode::parse_lenient(s),
            Some(Value::Null) | None => {}
            Some(other) => warn!("Ignoring theme mode {}: expected a string", other),
        }

        match obj.get("customColors") {
            Some(Value::Object(colors)) => {
                let mut map = ThemeColorMap::new();
                for (key, value) in colors {
                    match value.as_str() {
                        Some(v) => {
                            map.insert(key.clone(), v.to_string());
                        }
                        None => warn!("Ignoring custom color {}: expected a string", key),
                    }
                }
                selection.custom_colors = Some(map);
            }
            Some(Value::Null) | None => {}
            Some(_) => warn!("Ignoring customColors: expected an object"),
        }

        match obj
            .get("enableDynamicTheming")
            .or_else(|| obj.get("dynamicPreviewEnabled"))
        {
            Some(Value::Bool(b)) => selection.dynamic_preview_enabled = *b,
            Some(Value::Null) | None => {}
            Some(other) => warn!("Ignoring enableDynamicTheming {}: expected a boolean", other),
        }

        selection
    }
}

/// The concrete colors for a selection. Custom mode without colors falls back to light.
pub fn resolve_theme_colors(selection: &ThemeSelection) -> ThemeColorMap {
    match selection.mode.preset() {
        Some(preset) => preset,
        None => match &selection.custom_colors {
            Some(colors) if !colors.is_empty() => colors.clone(),
            _ => light_preset(),
        },
    }
}

/// A style scope that accepts CSS custom property writes.
pub trait StyleSink {
    fn set_property(&mut self, name: &str, value: &str);
}

impl<T: StyleSink + ?Sized> StyleSink for &mut T {
    fn set_property(&mut self, name: &str, value: &str) {
        (**self).set_property(name, value);
    }
}

/// In-memory style scope; records the current value of each property.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStyleSink {
    properties: BTreeMap<String, String>,
    writes: usize,
}

impl MemoryStyleSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// Total number of property writes received.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl StyleSink for MemoryStyleSink {
    fn set_property(&mut self, name: &str, value: &str) {
        self.properties.insert(name.to_string(), value.to_string());
        self.writes += 1;
    }
}

/// Collects properties into a CSS rule block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssStyleSink {
    selector: String,
    properties: BTreeMap<String, String>,
}

impl Default for CssStyleSink {
    fn default() -> Self {
        Self::new(":root")
    }
}

impl CssStyleSink {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn to_css(&self) -> String {
        let mut css = format!("{} {{\n", self.selector);
        for (name, value) in &self.properties {
            css.push_str(&format!("  {}: {};\n", name, value));
        }
        css.push_str("}\n");
        css
    }
}

impl StyleSink for CssStyleSink {
    fn set_property(&mut self, name: &str, value: &str) {
        self.properties.insert(name.to_string(), value.to_string());
    }
}

/// Writes theme color maps to the style scope it was built with.
#[derive(Debug)]
pub struct ThemeApplier<S: StyleSink> {
    sink: S,
}

impl<S: StyleSink> ThemeApplier<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Write every entry of `colors`. Entries not in `colors` are left untouched.
    pub fn apply(&mut self, colors: &ThemeColorMap) {
        for (name, value) in colors {
            self.sink.set_property(name, value);
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_presets_cover_the_same_variables() {
        let light = light_preset();
        let dark = dark_preset();
        assert_eq!(light.len(), 19);
        assert!(light.keys().eq(dark.keys()));
    }

    #[test]
    fn test_resolve_modes() {
        assert_eq!(
            resolve_theme_colors(&ThemeSelection::new(ThemeMode::Dark)),
            dark_preset()
        );
        let empty = ThemeSelection::new(ThemeMode::Custom).with_custom_colors(ThemeColorMap::new());
        assert_eq!(resolve_theme_colors(&empty), light_preset());

        let mut custom = ThemeColorMap::new();
        custom.insert("--primary".into(), "10 20% 30%".into());
        let selection = ThemeSelection::new(ThemeMode::Custom).with_custom_colors(custom.clone());
        assert_eq!(resolve_theme_colors(&selection), custom);
    }

    #[test]
    fn test_unknown_mode_is_light() {
        assert_eq!(ThemeMode::parse_lenient("sepia"), ThemeMode::Light);
        assert!("sepia".parse::<ThemeMode>().is_err());
        assert_eq!("Dark".parse::<ThemeMode>().unwrap(), ThemeMode::Dark);
    }

    #[test]
    fn test_selection_from_value_is_per_field() {
        let selection = ThemeSelection::from_value(&json!({
            "theme": "dark",
            "customColors": 5,
            "enableDynamicTheming": "yes"
        }));
        assert_eq!(selection.mode, ThemeMode::Dark);
        assert_eq!(selection.custom_colors, Some(light_preset()));
        assert!(selection.dynamic_preview_enabled);

        let aliased = ThemeSelection::from_value(&json!({
            "mode": "custom",
            "dynamicPreviewEnabled": false
        }));
        assert_eq!(aliased.mode, ThemeMode::Custom);
        assert!(!aliased.dynamic_preview_enabled);
    }

    #[test]
    fn test_apply_is_idempotent_and_last_call_wins() {
        let mut applier = ThemeApplier::new(MemoryStyleSink::new());
        applier.apply(&light_preset());
        applier.apply(&light_preset());
        assert_eq!(applier.sink().properties(), &light_preset());
        applier.apply(&dark_preset());
        assert_eq!(applier.sink().get("--background"), Some("240 10% 3.9%"));
    }

    #[test]
    fn test_css_sink() {
        let mut applier = ThemeApplier::new(CssStyleSink::default());
        let mut colors = ThemeColorMap::new();
        colors.insert("--ring".into(), "240 5.9% 10%".into());
        applier.apply(&colors);
        assert_eq!(
            applier.into_sink().to_css(),
            ":root {\n  --ring: 240 5.9% 10%;\n}\n"
        );
    }
}
