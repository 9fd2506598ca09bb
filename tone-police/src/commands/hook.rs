// tone-police/src/commands/hook.rs
//! Hook mode: one JSON request in, at most one JSON line out.
//!
//! Nothing here may make the hook fail. Read errors, bad requests and filter
//! errors are logged and the prompt is left alone.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::io::{Read, Write};

use tone_police_core::{headless_filter_prompt, ConfigLocations};

/// Reads the whole request from `input` and writes the response, if any, to `output`.
pub fn run_hook<R: Read, W: Write>(mut input: R, output: &mut W, locations: &ConfigLocations) -> Result<()> {
    info!("Starting tone-police hook.");
    let mut request = String::new();
    if let Err(e) = input.read_to_string(&mut request) {
        warn!("Failed to read hook request: {}", e);
        return Ok(());
    }

    let Some(response) = headless_filter_prompt(&request, locations) else {
        debug!("No adjustment; writing nothing.");
        return Ok(());
    };

    match response.to_json() {
        Ok(json) => {
            writeln!(output, "{}", json).context("Failed to write hook response")?;
            output.flush().context("Failed to flush hook response")?;
        }
        Err(e) => warn!("{:#}", e),
    }
    Ok(())
}
