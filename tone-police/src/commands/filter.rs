// tone-police/src/commands/filter.rs
//! `filter`: run the pipeline over a file or stdin and show the result.
//!
//! Settings come from the same layered lookup the hook uses, with command
//! line flags applied on top. The `enabled` flag is ignored here: asking for
//! a filter run is taken as wanting one.

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::{debug, info};
use std::fs;
use std::io::{self, Read, Write};

use tone_police_core::headless::dictionary_source;
use tone_police_core::{ConfigLocations, DirectorySource, FilterConfig, TonePipeline, Transformation};

use crate::cli::FilterCommand;
use crate::ui::{diff_viewer, output_format, summary};

/// Applies the command line overrides in `cmd` to `config`.
pub fn apply_overrides(mut config: FilterConfig, cmd: &FilterCommand) -> FilterConfig {
    if let Some(intensity) = cmd.intensity {
        config.intensity = intensity.into();
    }
    if !cmd.languages.is_empty() {
        config.languages = cmd.languages.clone();
    }
    if cmd.no_code_protection {
        config.preserve_code_blocks = false;
    }
    config
}

/// Builds the pipeline for `cmd`.
pub fn build_pipeline(cmd: &FilterCommand, locations: &ConfigLocations) -> Result<TonePipeline> {
    let loaded = locations.load_layered().context("Failed to load configuration")?;
    debug!("filter: base configuration from {}", loaded.source);
    let config = apply_overrides(loaded.config, cmd);

    let pipeline = match &cmd.dictionaries {
        Some(dir) => TonePipeline::new(config, DirectorySource::new(dir)),
        None => TonePipeline::from_boxed(config, dictionary_source(locations)),
    };
    info!(
        "Filtering at {} with {:?} using {}.",
        pipeline.config().intensity,
        pipeline.config().languages,
        pipeline.source().describe()
    );
    Ok(pipeline)
}

fn read_input(cmd: &FilterCommand) -> Result<String> {
    match &cmd.input {
        Some(path) => {
            info!("Reading input from file: {}", path.display());
            fs::read_to_string(path).with_context(|| format!("Failed to read input file: {}", path.display()))
        }
        None => {
            info!("Reading input from stdin...");
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            Ok(buffer)
        }
    }
}

/// Writes the transformed text, or a diff, to `writer`.
pub fn write_result<W: Write>(
    original: &str,
    transformation: &Transformation,
    diff: bool,
    writer: &mut W,
    supports_color: bool,
) -> Result<()> {
    if diff {
        return diff_viewer::print_diff(original, &transformation.text, writer, supports_color);
    }
    write!(writer, "{}", transformation.text)?;
    if !transformation.text.ends_with('\n') {
        writeln!(writer)?;
    }
    Ok(())
}

/// The `filter` command.
pub fn run_filter(cmd: &FilterCommand, locations: &ConfigLocations, quiet: bool) -> Result<()> {
    let pipeline = build_pipeline(cmd, locations)?;
    let input = read_input(cmd)?;
    let transformation = pipeline.transform(&input).context("Filtering failed")?;
    debug!(
        "Filtered {} byte(s); changed={}, {} code span(s) protected.",
        input.len(),
        transformation.changed,
        transformation.protected_spans
    );

    let stdout = io::stdout();
    let supports_color = stdout.is_terminal();
    let mut writer = stdout.lock();
    write_result(&input, &transformation, cmd.diff, &mut writer, supports_color)?;

    if quiet {
        return Ok(());
    }
    let stderr_supports_color = io::stderr().is_terminal();
    if cmd.summary {
        summary::print_summary(&transformation.summary, &mut io::stderr(), stderr_supports_color)?;
    } else if !transformation.changed {
        output_format::print_info_message(&mut io::stderr(), "No changes made.", stderr_supports_color)?;
    }
    Ok(())
}
