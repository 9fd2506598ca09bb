// tone-police/src/logger.rs
//! Logger setup. All log output goes to stderr; stdout carries only command
//! output (the hook response, filtered text or a validation report).

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// Initializes `env_logger`.
///
/// `default_level` applies when `RUST_LOG` is unset. `level_override`, when
/// given, beats both. Calling this twice is harmless.
pub fn init_logger(default_level: LevelFilter, level_override: Option<LevelFilter>) {
    let mut builder = Builder::new();
    builder
        .filter_level(default_level)
        .parse_env(Env::default())
        .target(Target::Stderr)
        .format_timestamp(None);
    if let Some(level) = level_override {
        builder.filter_level(level);
    }
    let _ = builder.try_init();
}

/// Picks the override from the global `--quiet` / `--debug` flags.
pub fn level_from_flags(quiet: bool, debug: bool) -> Option<LevelFilter> {
    if quiet {
        Some(LevelFilter::Off)
    } else if debug {
        Some(LevelFilter::Debug)
    } else {
        None
    }
}
