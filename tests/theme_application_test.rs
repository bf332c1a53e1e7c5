use datacards_lib::{
    resolve_theme_colors, CssStyleSink, MemoryStyleSink, ThemeApplier, ThemeColorMap, ThemeMode,
    ThemeSelection,
};

#[test]
fn test_dark_ignores_custom_colors() {
    let mut custom = ThemeColorMap::new();
    custom.insert("--primary".to_string(), "10 10% 10%".to_string());
    let selection = ThemeSelection::new(ThemeMode::Dark).with_custom_colors(custom);

    let colors = resolve_theme_colors(&selection);
    assert_eq!(colors.len(), 19);
    assert_eq!(colors["--background"], "240 10% 3.9%");
    assert_eq!(colors["--primary"], "0 0% 98%");
}

#[test]
fn test_empty_custom_falls_back_to_light() {
    let selection = ThemeSelection::new(ThemeMode::Custom).with_custom_colors(ThemeColorMap::new());
    let colors = resolve_theme_colors(&selection);
    assert_eq!(colors, ThemeMode::Light.preset().unwrap());
    assert_eq!(colors["--background"], "0 0% 100%");
}

#[test]
fn test_custom_colors_are_used_as_is() {
    let mut custom = ThemeColorMap::new();
    custom.insert("--primary".to_string(), "10 10% 10%".to_string());
    let selection = ThemeSelection::new(ThemeMode::Custom).with_custom_colors(custom.clone());
    assert_eq!(resolve_theme_colors(&selection), custom);
}

#[test]
fn test_applier_writes_every_color() {
    let colors = resolve_theme_colors(&ThemeSelection::new(ThemeMode::Dark));
    let mut applier = ThemeApplier::new(MemoryStyleSink::new());
    applier.apply(&colors);

    assert_eq!(applier.sink().writes(), colors.len());
    assert_eq!(applier.sink().get("--ring"), Some("240 4.9% 83.9%"));
}

#[test]
fn test_reapplying_overwrites_previous_values() {
    let mut applier = ThemeApplier::new(MemoryStyleSink::new());
    applier.apply(&resolve_theme_colors(&ThemeSelection::new(ThemeMode::Dark)));
    applier.apply(&resolve_theme_colors(&ThemeSelection::new(ThemeMode::Light)));

    let sink = applier.into_sink();
    assert_eq!(sink.get("--background"), Some("0 0% 100%"));
    assert_eq!(sink.properties().len(), 19);
}

#[test]
fn test_css_rule() {
    let mut colors = ThemeColorMap::new();
    colors.insert("--primary".to_string(), "240 9% 10%".to_string());
    colors.insert("--border".to_string(), "240 5.9% 90%".to_string());

    let mut applier = ThemeApplier::new(CssStyleSink::new(".cards"));
    applier.apply(&colors);
    assert_eq!(
        applier.into_sink().to_css(),
        ".cards {\n  --border: 240 5.9% 90%;\n  --primary: 240 9% 10%;\n}\n"
    );
}

#[test]
fn test_mode_parsing() {
    assert_eq!("dark".parse::<ThemeMode>().unwrap(), ThemeMode::Dark);
    assert!("neon".parse::<ThemeMode>().is_err());
    assert_eq!(ThemeMode::parse_lenient("neon"), ThemeMode::Light);
}
