//! Shared CLI definitions for datacards.
//!
//! Used by the main application and by the build script (manpage) and
//! gen_docs binary (command-line-options markdown).

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// How projected rows are written
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// JSON array of row objects
    #[default]
    Json,
    /// Plain-text cards, one block per row
    Cards,
}

/// Command-line arguments for datacards
#[derive(Clone, Parser, Debug)]
#[command(
    name = "datacards",
    version,
    about = "Render column-oriented data as formatted cards",
    long_about = "Render column-oriented data as formatted cards.\n\n\
        `project` turns a host payload (sourceData, columnInfo, columns) into display rows,\n\
        formatting numbers with d3-format specs and timestamps as wall-clock times.\n\
        `theme` converts colors between hex and HSL triples and resolves theme selections."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable debug logging on stderr (RUST_LOG takes precedence)
    #[arg(long = "debug", global = true, action)]
    pub debug: bool,

    /// Generate default configuration file at ~/.config/datacards/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,
}

#[derive(Clone, Subcommand, Debug)]
pub enum Command {
    /// Project a host payload into display rows
    Project(ProjectArgs),
    /// Color conversion and theme resolution
    #[command(subcommand)]
    Theme(ThemeCommand),
}

#[derive(Clone, clap::Args, Debug)]
pub struct ProjectArgs {
    /// Host payload JSON file, or - for stdin
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Output format
    #[arg(long = "output", value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,

    /// Comma-separated column ids to show, overriding the payload's selection
    #[arg(long = "columns", value_delimiter = ',', value_name = "ID")]
    pub columns: Option<Vec<String>>,

    /// Time zone for date columns: local, utc or an offset like +02:00 (overrides config)
    #[arg(long = "timezone", value_name = "ZONE", allow_hyphen_values = true)]
    pub timezone: Option<String>,

    /// Pretty-print JSON output
    #[arg(long = "pretty", action)]
    pub pretty: bool,
}

#[derive(Clone, Subcommand, Debug)]
pub enum ThemeCommand {
    /// Convert a hex color (#rgb or #rrggbb) to an HSL triple
    HexToHsl {
        #[arg(value_name = "HEX")]
        hex: String,
    },
    /// Convert an HSL triple ("<h> <s>% <l>%") to a hex color
    HslToHex {
        #[arg(value_name = "TRIPLE", allow_hyphen_values = true)]
        triple: String,
    },
    /// Print the resolved theme colors as JSON
    Resolve {
        /// Persisted plugin settings JSON; the config file theme is used when omitted
        #[arg(long = "settings", value_name = "FILE")]
        settings: Option<PathBuf>,
    },
    /// Print the resolved theme colors as a CSS rule
    Css {
        /// Persisted plugin settings JSON; the config file theme is used when omitted
        #[arg(long = "settings", value_name = "FILE")]
        settings: Option<PathBuf>,

        /// Selector of the emitted rule
        #[arg(long = "selector", default_value = ":root")]
        selector: String,
    },
}

/// Escape `|` and newlines for use in markdown table cells.
fn escape_table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}

fn value_placeholder(arg: &clap::Arg) -> String {
    arg.get_value_names()
        .map(|names| {
            names
                .iter()
                .map(|n: &clap::builder::Str| format!("<{}>", n.as_ref() as &str))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

fn render_arguments(out: &mut String, cmd: &clap::Command) {
    out.push_str("| Option | Description |\n");
    out.push_str("|--------|-------------|\n");

    for arg in cmd.get_arguments() {
        let id = arg.get_id().as_ref().to_string();
        if id == "help" || id == "version" {
            continue;
        }

        let option_str = if arg.is_positional() {
            let placeholder = value_placeholder(arg);
            if arg.is_required_set() {
                placeholder
            } else {
                format!("[{placeholder}]")
            }
        } else {
            let mut parts = Vec::new();
            if let Some(s) = arg.get_short() {
                parts.push(format!("-{s}"));
            }
            if let Some(l) = arg.get_long() {
                parts.push(format!("--{l}"));
            }
            let op = parts.join(", ");
            let placeholder = if arg.get_action().takes_values() {
                value_placeholder(arg)
            } else {
                String::new()
            };
            if placeholder.is_empty() {
                op
            } else {
                format!("{op} {placeholder}")
            }
        };

        let help = arg
            .get_help()
            .map(|h| escape_table_cell(&h.to_string()))
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!("| `{option_str}` | {help} |\n"));
    }
}

fn render_subcommands(out: &mut String, cmd: &clap::Command, path: &str) {
    for sub in cmd.get_subcommands() {
        if sub.get_name() == "help" {
            continue;
        }
        let full = format!("{} {}", path, sub.get_name());
        out.push_str(&format!("\n## `{full}`\n\n"));
        if let Some(about) = sub.get_about() {
            out.push_str(&format!("{}\n\n", about));
        }
        if sub.get_subcommands().next().is_none() {
            render_arguments(out, sub);
        }
        render_subcommands(out, sub, &full);
    }
}

/// Render command-line options as markdown.
///
/// Used by the gen_docs binary; output is written to stdout.
pub fn render_options_markdown() -> String {
    let mut cmd = Args::command();
    cmd.build();

    let mut out = String::from("# Command Line Options\n\n");

    out.push_str("## Usage\n\n```\n");
    let usage = cmd.render_usage();
    out.push_str(&usage.to_string());
    out.push_str("\n```\n\n");

    out.push_str("## Options\n\n");
    render_arguments(&mut out, &cmd);
    render_subcommands(&mut out, &cmd, "datacards");

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_args() {
        let args = Args::try_parse_from([
            "datacards",
            "project",
            "payload.json",
            "--output",
            "cards",
            "--columns",
            "a,b",
            "--timezone",
            "-05:00",
        ])
        .unwrap();
        let Some(Command::Project(project)) = args.command else {
            panic!("expected project command");
        };
        assert_eq!(project.output, OutputFormat::Cards);
        assert_eq!(
            project.columns,
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(project.timezone.as_deref(), Some("-05:00"));
    }

    #[test]
    fn test_theme_args() {
        let args = Args::try_parse_from(["datacards", "theme", "hsl-to-hex", "240 5.9% 10%"]).unwrap();
        assert!(matches!(
            args.command,
            Some(Command::Theme(ThemeCommand::HslToHex { ref triple })) if triple == "240 5.9% 10%"
        ));
    }

    #[test]
    fn test_force_requires_generate_config() {
        assert!(Args::try_parse_from(["datacards", "--force"]).is_err());
        let args = Args::try_parse_from(["datacards", "--generate-config", "--force"]).unwrap();
        assert!(args.generate_config && args.force);
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_render_options_markdown() {
        let md = render_options_markdown();
        assert!(md.contains("--generate-config"));
        assert!(md.contains("## `datacards theme css`"));
        assert!(md.contains("--selector"));
    }
}
