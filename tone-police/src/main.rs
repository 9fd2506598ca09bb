// tone-police/src/main.rs
//! tone-police entry point.
//!
//! Hook mode (no subcommand, or `hook`) must never fail the prompt it was
//! given: it always exits 0 and logs nothing unless asked to.

use anyhow::Result;
use clap::Parser;
use is_terminal::IsTerminal;
use log::LevelFilter;
use std::io;
use std::process::ExitCode;

use tone_police::cli::{Cli, Commands};
use tone_police::commands::{filter, hook, validate};
use tone_police::logger;
use tone_police::ui::output_format;
use tone_police_core::ConfigLocations;

fn main() -> ExitCode {
    let args = Cli::parse();
    let level_override = logger::level_from_flags(args.quiet, args.debug);
    let locations = ConfigLocations::from_env();

    match args.command.unwrap_or(Commands::Hook) {
        Commands::Hook => {
            logger::init_logger(LevelFilter::Off, level_override);
            let stdout = io::stdout();
            if let Err(e) = hook::run_hook(io::stdin().lock(), &mut stdout.lock(), &locations) {
                log::warn!("{:#}", e);
            }
            ExitCode::SUCCESS
        }
        Commands::Filter(cmd) => {
            logger::init_logger(LevelFilter::Warn, level_override);
            report(filter::run_filter(&cmd, &locations, args.quiet).map(|_| true))
        }
        Commands::Validate(cmd) => {
            logger::init_logger(LevelFilter::Warn, level_override);
            report(validate::run_validate(&cmd, &locations))
        }
    }
}

/// Maps a command outcome to the process exit code, printing any error.
fn report(outcome: Result<bool>) -> ExitCode {
    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            let supports_color = io::stderr().is_terminal();
            let _ = output_format::print_error_message(&mut io::stderr(), &format!("{:#}", e), supports_color);
            ExitCode::FAILURE
        }
    }
}
