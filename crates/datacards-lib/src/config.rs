use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::color::Hsl;
use crate::format::{DisplayZone, NumberLocale};
use crate::settings::CardSettings;
use crate::theme::{resolve_theme_colors, ThemeColorMap, ThemeMode, ThemeSelection};

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get path to a specific config file
    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    /// Ensure the config directory exists
    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Generate default configuration template as a string with comments
    /// All fields are commented out so defaults are used, but users can uncomment to override
    pub fn generate_default_config(&self) -> Result<String> {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config)
            .map_err(|e| eyre!("Failed to serialize default config: {}", e))?;

        let comments = Self::collect_all_comments();
        Ok(Self::comment_all_fields(&toml_str, &comments))
    }

    /// Collect all field comments from struct constants into a map
    fn collect_all_comments() -> HashMap<String, String> {
        let mut comments = HashMap::new();

        for (field, comment) in APP_COMMENTS {
            comments.insert(field.to_string(), comment.to_string());
        }
        for (field, comment) in DISPLAY_COMMENTS {
            comments.insert(format!("display.{}", field), comment.to_string());
        }
        for (field, comment) in THEME_COMMENTS {
            comments.insert(format!("theme.{}", field), comment.to_string());
        }
        for (field, comment) in FORMATTING_COMMENTS {
            comments.insert(format!("formatting.{}", field), comment.to_string());
        }

        comments
    }

    /// Comment out all fields in TOML and add comments
    fn comment_all_fields(toml: &str, comments: &HashMap<String, String>) -> String {
        let mut result = String::new();
        result.push_str("# datacards configuration file\n");
        result
            .push_str("# This file uses TOML format. See https://toml.io/ for syntax reference.\n");
        result.push('\n');

        let mut current_section = String::new();
        let mut seen_sections: HashSet<String> = HashSet::new();

        for line in toml.lines() {
            if let Some(section) = Self::extract_section_name(line) {
                current_section = section.clone();
                seen_sections.insert(section.clone());

                if let Some(header) = SECTION_HEADERS.iter().find(|(s, _)| *s == section) {
                    result.push_str(header.1);
                    result.push('\n');
                }

                result.push_str("# ");
                result.push_str(line);
                result.push('\n');
                continue;
            }

            if let Some(field_path) = Self::extract_field_path(line, &current_section) {
                if let Some(comment) = comments.get(&field_path) {
                    for comment_line in comment.lines() {
                        result.push_str("# ");
                        result.push_str(comment_line);
                        result.push('\n');
                    }
                }
                result.push_str("# ");
                result.push_str(line);
                result.push('\n');
            } else {
                result.push_str(line);
                result.push('\n');
            }
        }

        // Empty tables are not serialized; still show where overrides go
        if !seen_sections.contains("theme.colors") {
            result.push('\n');
            if let Some(header) = SECTION_HEADERS.iter().find(|(s, _)| *s == "theme.colors") {
                result.push_str(header.1);
                result.push('\n');
            }
            result.push_str("# [theme.colors]\n");
            result.push_str("# \"--primary\" = \"240 9% 10%\"\n");
        }

        result
    }

    /// Extract section name from TOML line like "[display]" or "[theme.colors]"
    fn extract_section_name(line: &str) -> Option<String> {
        let trimmed = line.trim();
        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            Some(trimmed[1..trimmed.len() - 1].to_string())
        } else {
            None
        }
    }

    fn extract_field_path(line: &str, current_section: &str) -> Option<String> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('[') {
            return None;
        }

        let eq_pos = trimmed.find('=')?;
        let field_name = trimmed[..eq_pos].trim();
        if current_section.is_empty() {
            Some(field_name.to_string())
        } else {
            Some(format!("{}.{}", current_section, field_name))
        }
    }

    /// Write default configuration to config file
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path("config.toml");

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;

        let template = self.generate_default_config()?;
        std::fs::write(&config_path, template)?;

        Ok(config_path)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub display: DisplayConfig,
    pub theme: ThemeConfig,
    pub formatting: FormattingConfig,
}

const APP_COMMENTS: &[(&str, &str)] = &[(
    "version",
    "Configuration format version (for future compatibility)",
)];

const SECTION_HEADERS: &[(&str, &str)] = &[
    (
        "display",
        "# ============================================================================\n# Card Display\n# ============================================================================",
    ),
    (
        "theme",
        "# ============================================================================\n# Color Theme\n# ============================================================================",
    ),
    (
        "theme.colors",
        "# Color overrides, keyed by CSS variable name\n# Values are HSL triples: \"<hue> <saturation>% <lightness>%\"\n# In custom mode these are the theme; in light/dark mode they are layered on the preset",
    ),
    (
        "formatting",
        "# ============================================================================\n# Value Formatting\n# ============================================================================",
    ),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub title: String,
    pub show_header: bool,
    pub min_card_width: String,
    pub container_padding: String,
    pub card_height: String,
    /// Longest value shown on a text card before it is cut with an ellipsis
    pub max_value_width: usize,
}

const DISPLAY_COMMENTS: &[(&str, &str)] = &[
    ("title", "Title shown above the cards"),
    ("show_header", "Show the title and row count header"),
    (
        "min_card_width",
        "Minimum card width: 300px, 400px, 500px, 600px, 700px or 800px",
    ),
    (
        "container_padding",
        "Padding around the card list: 0rem, 1rem, 2rem or 3rem",
    ),
    (
        "card_height",
        "Height of the scrollable card area: 400px, 500px, 600px, 700px or 800px",
    ),
    (
        "max_value_width",
        "Values longer than this many characters are truncated in text output (> 0)",
    ),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// light, dark or custom
    pub mode: String,
    pub dynamic_preview: bool,
    pub colors: BTreeMap<String, String>,
}

const THEME_COMMENTS: &[(&str, &str)] = &[
    ("mode", "Theme mode: \"light\", \"dark\" or \"custom\""),
    (
        "dynamic_preview",
        "Apply theme changes immediately while editing settings",
    ),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormattingConfig {
    /// "local", "utc" or a fixed offset like "+02:00"
    pub timezone: String,
    pub decimal: String,
    pub thousands: String,
    pub currency_prefix: String,
    pub currency_suffix: String,
}

const FORMATTING_COMMENTS: &[(&str, &str)] = &[
    (
        "timezone",
        "Time zone for date and datetime columns\n\"local\", \"utc\" or a fixed offset such as \"+02:00\"",
    ),
    ("decimal", "Decimal separator used by number formats"),
    (
        "thousands",
        "Thousands separator used by number formats with grouping (,)",
    ),
    ("currency_prefix", "Currency symbol placed before the number ($)"),
    ("currency_suffix", "Currency symbol placed after the number"),
];

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            display: DisplayConfig::default(),
            theme: ThemeConfig::default(),
            formatting: FormattingConfig::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let card = CardSettings::default();
        Self {
            title: card.title,
            show_header: card.show_header,
            min_card_width: card.min_card_width,
            container_padding: card.container_padding,
            card_height: card.card_height,
            max_value_width: 48,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            mode: ThemeMode::Light.to_string(),
            dynamic_preview: true,
            colors: BTreeMap::new(),
        }
    }
}

impl Default for FormattingConfig {
    fn default() -> Self {
        let locale = NumberLocale::default();
        Self {
            timezone: "local".to_string(),
            decimal: locale.decimal,
            thousands: locale.thousands,
            currency_prefix: locale.currency_prefix,
            currency_suffix: locale.currency_suffix,
        }
    }
}

// Configuration loading and merging
impl AppConfig {
    /// Load configuration from all layers (default → user)
    pub fn load(app_name: &str) -> Result<Self> {
        Self::load_from(&ConfigManager::new(app_name)?)
    }

    /// Load configuration using the config directory of `manager`
    pub fn load_from(manager: &ConfigManager) -> Result<Self> {
        let config_path = manager.config_path("config.toml");
        let mut config = AppConfig::default();
        config.merge(Self::load_user_config(&config_path)?);

        config.validate().map_err(|e| {
            eyre!(
                "Invalid configuration in {}: {}",
                config_path.display(),
                e
            )
        })?;

        Ok(config)
    }

    fn load_user_config(config_path: &Path) -> Result<AppConfig> {
        if !config_path.exists() {
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(config_path).map_err(|e| {
            eyre!(
                "Failed to read config file at {}: {}",
                config_path.display(),
                e
            )
        })?;

        toml::from_str(&content).map_err(|e| {
            eyre!(
                "Failed to parse config file at {}: {}",
                config_path.display(),
                e
            )
        })
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }

        self.display.merge(other.display);
        self.theme.merge(other.theme);
        self.formatting.merge(other.formatting);
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.1") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.1.x",
                self.version
            ));
        }

        self.card_settings().validate()?;
        if self.display.max_value_width == 0 {
            return Err(eyre!("display.max_value_width must be greater than 0"));
        }

        self.theme.mode.parse::<ThemeMode>()?;
        for (name, value) in &self.theme.colors {
            if !name.starts_with("--") {
                return Err(eyre!(
                    "theme.colors key '{}' must be a CSS variable name starting with --",
                    name
                ));
            }
            Hsl::from_triple(value)?;
        }

        self.formatting.zone()?;
        if self.formatting.decimal.is_empty() {
            return Err(eyre!("formatting.decimal must not be empty"));
        }
        if self.formatting.decimal == self.formatting.thousands {
            return Err(eyre!(
                "formatting.decimal and formatting.thousands must differ, both are '{}'",
                self.formatting.decimal
            ));
        }

        Ok(())
    }

    pub fn card_settings(&self) -> CardSettings {
        CardSettings {
            title: self.display.title.clone(),
            show_header: self.display.show_header,
            min_card_width: self.display.min_card_width.clone(),
            container_padding: self.display.container_padding.clone(),
            card_height: self.display.card_height.clone(),
        }
    }
}

impl DisplayConfig {
    pub fn merge(&mut self, other: Self) {
        let default = DisplayConfig::default();
        if other.title != default.title {
            self.title = other.title;
        }
        if other.show_header != default.show_header {
            self.show_header = other.show_header;
        }
        if other.min_card_width != default.min_card_width {
            self.min_card_width = other.min_card_width;
        }
        if other.container_padding != default.container_padding {
            self.container_padding = other.container_padding;
        }
        if other.card_height != default.card_height {
            self.card_height = other.card_height;
        }
        if other.max_value_width != default.max_value_width {
            self.max_value_width = other.max_value_width;
        }
    }
}

impl ThemeConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ThemeConfig::default();
        if other.mode != default.mode {
            self.mode = other.mode;
        }
        if other.dynamic_preview != default.dynamic_preview {
            self.dynamic_preview = other.dynamic_preview;
        }
        self.colors.extend(other.colors);
    }

    /// The theme selection this config describes. In custom mode the overrides are the custom colors.
    pub fn selection(&self) -> ThemeSelection {
        let mode = ThemeMode::parse_lenient(&self.mode);
        let mut selection = ThemeSelection::new(mode);
        selection.dynamic_preview_enabled = self.dynamic_preview;
        if mode == ThemeMode::Custom {
            selection.custom_colors = Some(self.colors.clone());
        }
        selection
    }

    /// Resolved colors: the selected theme with overrides layered on top.
    pub fn resolve(&self) -> ThemeColorMap {
        let mut colors = resolve_theme_colors(&self.selection());
        colors.extend(self.colors.clone());
        colors
    }
}

impl FormattingConfig {
    pub fn merge(&mut self, other: Self) {
        let default = FormattingConfig::default();
        if other.timezone != default.timezone {
            self.timezone = other.timezone;
        }
        if other.decimal != default.decimal {
            self.decimal = other.decimal;
        }
        if other.thousands != default.thousands {
            self.thousands = other.thousands;
        }
        if other.currency_prefix != default.currency_prefix {
            self.currency_prefix = other.currency_prefix;
        }
        if other.currency_suffix != default.currency_suffix {
            self.currency_suffix = other.currency_suffix;
        }
    }

    pub fn zone(&self) -> Result<DisplayZone> {
        DisplayZone::parse(&self.timezone)
    }

    pub fn locale(&self) -> NumberLocale {
        NumberLocale {
            decimal: self.decimal.clone(),
            thousands: self.thousands.clone(),
            currency_prefix: self.currency_prefix.clone(),
            currency_suffix: self.currency_suffix.clone(),
            ..NumberLocale::default()
        }
    }
}
