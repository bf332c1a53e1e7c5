use clap::{CommandFactory, Parser};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use datacards_cli::{Args, Command, OutputFormat, ProjectArgs, ThemeCommand};
use datacards_lib::{
    logging, resolve_theme_colors, AppConfig, ConfigManager, CssStyleSink, DisplayZone, HostPayload,
    Hsl, JsonPresenter, PluginSettings, Rgb, RowPresenter, RowProjector, TextCardPresenter,
    ThemeApplier, ThemeColorMap, APP_NAME,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| eyre!("Failed to read stdin: {}", e))?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).map_err(|e| eyre!("Failed to read {}: {}", path.display(), e))
}

fn run_project(args: &ProjectArgs, config: &AppConfig) -> Result<String> {
    let mut payload = HostPayload::from_json(&read_input(&args.path)?)?;
    if let Some(columns) = &args.columns {
        payload.columns = Some(columns.clone());
    }

    let zone = match &args.timezone {
        Some(tz) => DisplayZone::parse(tz)?,
        None => config.formatting.zone()?,
    };
    let projector = RowProjector::new()
        .with_zone(zone)
        .with_locale(config.formatting.locale());
    let projection = payload.project(&projector);
    debug!(
        rows = projection.len(),
        warnings = projection.warnings.len(),
        "projected payload"
    );

    match args.output {
        OutputFormat::Json => {
            let mut json = JsonPresenter { pretty: args.pretty }.present(&projection)?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Cards => {
            let card = if payload.host_config.is_some() {
                payload.card_settings()
            } else {
                config.card_settings()
            };
            Ok(TextCardPresenter::new(card, config.display.max_value_width).present(&projection))
        }
    }
}

/// Colors from a persisted settings file, or from the config file theme.
fn theme_colors(settings: Option<&PathBuf>, config: &AppConfig) -> Result<ThemeColorMap> {
    match settings {
        Some(path) => {
            let settings = PluginSettings::from_json(&read_input(path)?);
            Ok(resolve_theme_colors(&settings.styling))
        }
        None => Ok(config.theme.resolve()),
    }
}

fn run_theme(command: &ThemeCommand, config: &AppConfig) -> Result<String> {
    match command {
        ThemeCommand::HexToHsl { hex } => {
            Ok(format!("{}\n", Rgb::from_hex(hex)?.to_hsl().to_triple()))
        }
        ThemeCommand::HslToHex { triple } => {
            Ok(format!("{}\n", Hsl::from_triple(triple)?.to_rgb().to_hex()))
        }
        ThemeCommand::Resolve { settings } => {
            let colors = theme_colors(settings.as_ref(), config)?;
            let json = serde_json::to_string_pretty(&colors)
                .map_err(|e| eyre!("Failed to serialize theme colors: {}", e))?;
            Ok(format!("{}\n", json))
        }
        ThemeCommand::Css { settings, selector } => {
            let colors = theme_colors(settings.as_ref(), config)?;
            let mut applier = ThemeApplier::new(CssStyleSink::new(selector.clone()));
            applier.apply(&colors);
            Ok(applier.into_sink().to_css())
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let Some(command) = &args.command else {
        Args::command().print_help()?;
        return Ok(());
    };

    let config = AppConfig::load(APP_NAME)?;
    let output = match command {
        Command::Project(project) => run_project(project, &config)?,
        Command::Theme(theme) => run_theme(theme, &config)?,
    };
    print!("{}", output);
    Ok(())
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.generate_config {
        let config_manager = ConfigManager::new(APP_NAME)?;
        match config_manager.write_default_config(args.force) {
            Ok(path) => {
                println!("Configuration file written to {}", path.display());
                return Ok(Some(()));
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(None)
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    logging::init(args.debug)?;

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
