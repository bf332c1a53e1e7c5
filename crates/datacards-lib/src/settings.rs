//! Plugin and card settings, lenient reload, and the draft/commit editing workflow.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::color::{hex_to_hsl_triple, hsl_triple_to_hex};
use crate::theme::{
    light_preset, resolve_theme_colors, StyleSink, ThemeApplier, ThemeColorMap, ThemeMode,
    ThemeSelection,
};

pub const MIN_CARD_WIDTHS: &[&str] = &["300px", "400px", "500px", "600px", "700px", "800px"];
pub const CONTAINER_PADDINGS: &[&str] = &["0rem", "1rem", "2rem", "3rem"];
pub const CARD_HEIGHTS: &[&str] = &["400px", "500px", "600px", "700px", "800px"];

/// Editable custom color keys, grouped as they are presented for editing.
pub const COLOR_GROUPS: &[(&str, &[&str])] = &[
    (
        "Primary Colors",
        &[
            "--primary",
            "--primary-foreground",
            "--secondary",
            "--secondary-foreground",
        ],
    ),
    (
        "Background Colors",
        &["--background", "--foreground", "--card", "--card-foreground"],
    ),
    (
        "Accent Colors",
        &[
            "--accent",
            "--accent-foreground",
            "--muted",
            "--muted-foreground",
        ],
    ),
    (
        "Border & Input Colors",
        &["--border", "--input", "--ring", "--destructive"],
    ),
];

/// Human label for a CSS variable: `--card-foreground` becomes `card foreground`.
pub fn color_label(key: &str) -> String {
    key.replacen("--", "", 1).replacen('-', " ", 1)
}

/// Settings persisted by the host as one opaque JSON string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginSettings {
    pub title: String,
    pub background_color: String,
    pub text_color: String,
    pub styling: ThemeSelection,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            title: "Card Display".to_string(),
            background_color: "#ffffff".to_string(),
            text_color: "#000000".to_string(),
            styling: ThemeSelection::default(),
        }
    }
}

impl PluginSettings {
    /// Reload from persisted JSON. Malformed JSON gives the full defaults.
    pub fn from_json(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => Self::from_value(&value),
            Err(e) => {
                warn!("Discarding persisted settings: {}", e);
                Self::default()
            }
        }
    }

    /// Per-field reload: each missing or mistyped field keeps its default.
    pub fn from_value(value: &Value) -> Self {
        let mut settings = Self::default();
        let Some(obj) = value.as_object() else {
            warn!("Discarding persisted settings: expected a JSON object");
            return settings;
        };
        read_string(obj, "title", &mut settings.title);
        read_string(obj, "backgroundColor", &mut settings.background_color);
        read_string(obj, "textColor", &mut settings.text_color);
        if let Some(styling) = obj.get("styling") {
            settings.styling = ThemeSelection::from_value(styling);
        }
        settings
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| eyre!("Failed to serialize settings: {}", e))
    }
}

fn read_string(obj: &Map<String, Value>, key: &str, target: &mut String) {
    match obj.get(key) {
        Some(Value::String(s)) => *target = s.clone(),
        Some(Value::Null) | None => {}
        Some(other) => warn!("Ignoring {} {}: expected a string", key, other),
    }
}

fn read_bool(obj: &Map<String, Value>, key: &str, target: &mut bool) {
    match obj.get(key) {
        Some(Value::Bool(b)) => *target = *b,
        Some(Value::Null) | None => {}
        Some(other) => warn!("Ignoring {} {}: expected a boolean", key, other),
    }
}

/// Per-card layout settings configured from the host editor panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardSettings {
    pub title: String,
    pub show_header: bool,
    pub min_card_width: String,
    pub container_padding: String,
    pub card_height: String,
}

impl Default for CardSettings {
    fn default() -> Self {
        Self {
            title: "Untitled".to_string(),
            show_header: true,
            min_card_width: "300px".to_string(),
            container_padding: "1rem".to_string(),
            card_height: "400px".to_string(),
        }
    }
}

impl CardSettings {
    /// Read the host editor-panel keys (`Title`, `Show Header`, `minCardWidth`,
    /// `containerPadding`, `Card Height`). Values outside the allowed choices
    /// keep their defaults.
    pub fn from_host_config(value: &Value) -> Self {
        let mut settings = Self::default();
        let Some(obj) = value.as_object() else {
            return settings;
        };
        read_string(obj, "Title", &mut settings.title);
        read_bool(obj, "Show Header", &mut settings.show_header);
        read_string(obj, "minCardWidth", &mut settings.min_card_width);
        read_string(obj, "containerPadding", &mut settings.container_padding);
        read_string(obj, "Card Height", &mut settings.card_height);

        let defaults = Self::default();
        if !MIN_CARD_WIDTHS.contains(&settings.min_card_width.as_str()) {
            warn!("Ignoring minCardWidth {}", settings.min_card_width);
            settings.min_card_width = defaults.min_card_width;
        }
        if !CONTAINER_PADDINGS.contains(&settings.container_padding.as_str()) {
            warn!("Ignoring containerPadding {}", settings.container_padding);
            settings.container_padding = defaults.container_padding;
        }
        if !CARD_HEIGHTS.contains(&settings.card_height.as_str()) {
            warn!("Ignoring Card Height {}", settings.card_height);
            settings.card_height = defaults.card_height;
        }
        settings
    }

    pub fn validate(&self) -> Result<()> {
        if !MIN_CARD_WIDTHS.contains(&self.min_card_width.as_str()) {
            return Err(eyre!(
                "min_card_width must be one of {}, got {}",
                MIN_CARD_WIDTHS.join(", "),
                self.min_card_width
            ));
        }
        if !CONTAINER_PADDINGS.contains(&self.container_padding.as_str()) {
            return Err(eyre!(
                "container_padding must be one of {}, got {}",
                CONTAINER_PADDINGS.join(", "),
                self.container_padding
            ));
        }
        if !CARD_HEIGHTS.contains(&self.card_height.as_str()) {
            return Err(eyre!(
                "card_height must be one of {}, got {}",
                CARD_HEIGHTS.join(", "),
                self.card_height
            ));
        }
        Ok(())
    }
}

/// Key/value update handed to the host on save.
#[derive(Debug, Clone, PartialEq)]
pub struct HostConfigUpdate {
    /// Pretty-printed [`PluginSettings`] JSON
    pub config: String,
    pub title: String,
    pub show_header: bool,
    pub min_card_width: String,
    pub container_padding: String,
}

impl HostConfigUpdate {
    /// The update as the host's key/value object.
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "config": self.config,
            "Title": self.title,
            "Show Header": self.show_header,
            "minCardWidth": self.min_card_width,
            "containerPadding": self.container_padding,
        })
    }
}

/// Edits a draft copy of the settings; `save` commits, `cancel` reverts.
#[derive(Debug, Clone)]
pub struct SettingsEditor {
    committed: PluginSettings,
    committed_card: CardSettings,
    draft: PluginSettings,
    draft_card: CardSettings,
}

impl SettingsEditor {
    pub fn new(settings: PluginSettings, card: CardSettings) -> Self {
        Self {
            draft: settings.clone(),
            draft_card: card.clone(),
            committed: settings,
            committed_card: card,
        }
    }

    pub fn draft(&self) -> &PluginSettings {
        &self.draft
    }

    pub fn draft_card(&self) -> &CardSettings {
        &self.draft_card
    }

    pub fn draft_card_mut(&mut self) -> &mut CardSettings {
        &mut self.draft_card
    }

    pub fn committed(&self) -> &PluginSettings {
        &self.committed
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
    }

    /// Light and dark replace the custom colors with their preset; custom keeps them.
    pub fn set_theme_mode(&mut self, mode: ThemeMode) {
        self.draft.styling.mode = mode;
        if let Some(preset) = mode.preset() {
            self.draft.styling.custom_colors = Some(preset);
        }
    }

    /// Store a picker color for `key` as an HSL triple.
    pub fn set_custom_color(&mut self, key: &str, hex: &str) {
        self.draft
            .styling
            .custom_colors
            .get_or_insert_with(ThemeColorMap::new)
            .insert(key.to_string(), hex_to_hsl_triple(hex));
    }

    /// The draft custom color for `key` as hex, `#000000` when unset.
    pub fn custom_color_hex(&self, key: &str) -> String {
        hsl_triple_to_hex(
            self.draft
                .styling
                .custom_colors
                .as_ref()
                .and_then(|colors| colors.get(key))
                .map(String::as_str),
        )
    }

    pub fn reset_to_default_theme(&mut self) {
        self.draft.styling = ThemeSelection {
            custom_colors: Some(light_preset()),
            ..ThemeSelection::default()
        };
    }

    pub fn set_dynamic_preview(&mut self, enabled: bool) {
        self.draft.styling.dynamic_preview_enabled = enabled;
    }

    /// Apply the draft theme while editing. Returns whether anything was applied.
    pub fn preview<S: StyleSink>(&self, applier: &mut ThemeApplier<S>) -> bool {
        if !self.draft.styling.dynamic_preview_enabled {
            return false;
        }
        applier.apply(&resolve_theme_colors(&self.draft.styling));
        true
    }

    /// Commit the draft and build the host update.
    pub fn save(&mut self) -> Result<HostConfigUpdate> {
        let update = HostConfigUpdate {
            config: self.draft.to_json_pretty()?,
            title: self.draft_card.title.clone(),
            show_header: self.draft_card.show_header,
            min_card_width: self.draft_card.min_card_width.clone(),
            container_padding: self.draft_card.container_padding.clone(),
        };
        self.committed = self.draft.clone();
        self.committed_card = self.draft_card.clone();
        Ok(update)
    }

    /// Discard the draft.
    pub fn cancel(&mut self) {
        self.draft = self.committed.clone();
        self.draft_card = self.committed_card.clone();
    }
}
