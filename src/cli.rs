use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::output::{ColorMode, OutputFormat};

/// Color output control
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal capability
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorChoice> for ColorMode {
    fn from(choice: ColorChoice) -> Self {
        match choice {
            ColorChoice::Auto => Self::Auto,
            ColorChoice::Always => Self::Always,
            ColorChoice::Never => Self::Never,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "tinacms")]
#[command(author, version, about = "TinaCMS command line tools")]
#[command(long_about = "Command line tools for a filesystem-backed TinaCMS content database.\n\n\
    Exit codes:\n  \
    0 - Audit passed, passed with warnings, or was cancelled\n  \
    1 - Audit found errors\n  \
    2 - Schema or runtime error")]
pub struct Cli {
    /// Increase log verbosity (-v, -vv for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Control color output
    #[arg(long, value_enum, default_value = "auto", global = true)]
    pub color: ColorChoice,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Audit content documents against the schema
    Audit(AuditArgs),
}

#[derive(Parser, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct AuditArgs {
    /// Rewrite every document through the save path (asks for confirmation)
    #[arg(long)]
    pub clean: bool,

    /// With --clean, replace missing or invalid values with schema defaults
    #[arg(long = "useDefaultValues", alias = "use-default-values")]
    pub use_default_values: bool,

    /// Do not send the anonymous usage event
    #[arg(long = "noTelemetry", alias = "no-telemetry")]
    pub no_telemetry: bool,

    /// Answer yes to the --clean confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Content root (defaults to the current directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Schema file, relative to the root (defaults to .tina/schema.toml)
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Output format [possible values: text, json]
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
