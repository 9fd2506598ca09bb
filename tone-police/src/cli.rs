// tone-police/src/cli.rs
//! This file defines the command-line interface (CLI) for the tone-police
//! application, including all available commands and their arguments.
//! License: MIT OR Apache-2.0

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tone_police_core::Intensity;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "tone-police",
    author = "Relay",
    version = env!("CARGO_PKG_VERSION"),
    about = "Soften hostile or profane wording in prompts, leaving code untouched",
    long_about = "tone-police rewrites profanity, hostile phrasing and needless negativity in a prompt into milder wording. Fenced and inline code is never touched. Run without a subcommand it acts as a prompt hook: it reads a JSON request on stdin and prints a JSON response only when the prompt was adjusted.",
)]
pub struct Cli {
    /// Disable informational messages
    #[arg(long, short = 'q', global = true, help = "Suppress all informational and debug messages.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(long, short = 'd', global = true, help = "Enable debug logging.")]
    pub debug: bool,

    /// The subcommand to run; `hook` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// All available commands for the `tone-police` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reads a hook request from stdin and answers on stdout (the default).
    #[command(about = "Run as a prompt hook: JSON request on stdin, JSON response on stdout.")]
    Hook,

    /// Filters text from a file or stdin and prints the result.
    #[command(about = "Filter text from a file or stdin and print the adjusted text.")]
    Filter(FilterCommand),

    /// Checks dictionary files for problems.
    #[command(about = "Check dictionary files for parse errors, bad patterns and duplicates.")]
    Validate(ValidateCommand),
}

/// Arguments for the `filter` command.
#[derive(Parser, Debug, Default)]
pub struct FilterCommand {
    /// Path to an input file (reads from stdin if not provided).
    #[arg(long, short = 'i', value_name = "FILE", help = "Read input from a specified file instead of stdin.")]
    pub input: Option<PathBuf>,

    /// Overrides the configured intensity.
    #[arg(long, short = 'l', value_enum, value_name = "LEVEL", help = "Filtering intensity (overrides the configuration).")]
    pub intensity: Option<IntensityChoice>,

    /// Overrides the configured languages. Repeat for several.
    #[arg(long = "language", short = 'L', value_name = "CODE", help = "Language dictionary to apply; repeat for several (overrides the configuration).")]
    pub languages: Vec<String>,

    /// Lets rules rewrite code spans too.
    #[arg(long = "no-code-protection", help = "Do not shield fenced and inline code from substitution.")]
    pub no_code_protection: bool,

    /// Dictionary directory to use instead of the plugin's or the built-in set.
    #[arg(long = "dictionaries", value_name = "DIR", help = "Load dictionaries from this directory.")]
    pub dictionaries: Option<PathBuf>,

    /// Show a unified diff instead of the adjusted text.
    #[arg(long, short = 'D', help = "Show a unified diff to highlight the changes made.")]
    pub diff: bool,

    /// Print the rules that fired to stderr.
    #[arg(long, short = 's', help = "Print a table of the rules that fired to stderr.")]
    pub summary: bool,
}

/// Arguments for the `validate` command.
#[derive(Parser, Debug, Default)]
pub struct ValidateCommand {
    /// Directory to check (defaults to the plugin's `dictionaries/`).
    #[arg(long = "dictionaries", value_name = "DIR", help = "Dictionary directory to check (defaults to $CLAUDE_PLUGIN_ROOT/dictionaries).")]
    pub dictionaries: Option<PathBuf>,
}

/// Intensity as accepted on the command line. Unlike configuration files,
/// the CLI rejects unknown names.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum IntensityChoice {
    /// Profanity only.
    Light,
    /// Profanity, hostile phrasing and insults.
    Moderate,
    /// Everything, including general negativity.
    Strict,
}

impl From<IntensityChoice> for Intensity {
    fn from(choice: IntensityChoice) -> Self {
        match choice {
            IntensityChoice::Light => Intensity::Light,
            IntensityChoice::Moderate => Intensity::Moderate,
            IntensityChoice::Strict => Intensity::Strict,
        }
    }
}
