// File: tone-police-core/src/headless.rs

//! `headless.rs`
//! One-shot entry points for running the filter as a prompt hook.
//!
//! The hook receives a JSON request on stdin and may answer with a JSON
//! response on stdout. Every failure on this path is swallowed: malformed
//! input, unreadable configuration and broken rule data all end in "no
//! response", so the user's prompt always goes through.

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::ConfigLocations;
use crate::dictionary::{DictionarySource, DirectorySource, EmbeddedSource};
use crate::pipeline::TonePipeline;

/// The request sent to the hook. Fields other than `user_prompt` are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookRequest {
    #[serde(default)]
    pub user_prompt: Option<String>,
}

/// The hook's answer when the prompt was adjusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookResponse {
    #[serde(rename = "systemMessage")]
    pub system_message: String,
}

impl HookResponse {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize hook response")
    }
}

/// Picks the dictionary source for `locations`: the plugin's dictionary
/// directory when a plugin root is known, the embedded set otherwise.
pub fn dictionary_source(locations: &ConfigLocations) -> Box<dyn DictionarySource> {
    match locations.dictionaries_dir() {
        Some(dir) => Box::new(DirectorySource::new(dir)),
        None => Box::new(EmbeddedSource),
    }
}

/// Filters one prompt with the configuration found at `locations`.
///
/// Returns the rendered message, or `None` when nothing was changed or the
/// filter is disabled. Errors are returned, not swallowed.
pub fn filter_prompt(prompt: &str, locations: &ConfigLocations) -> Result<Option<String>> {
    let loaded = locations.load_layered().context("Failed to load configuration")?;
    debug!("Using configuration from {}", loaded.source);
    if !loaded.config.enabled {
        debug!("Filter disabled; passing prompt through.");
        return Ok(None);
    }

    let pipeline = TonePipeline::from_boxed(loaded.config, dictionary_source(locations));
    pipeline.run(prompt)
}

/// Handles one raw hook request. Never fails: any problem yields `None`.
pub fn headless_filter_prompt(input: &str, locations: &ConfigLocations) -> Option<HookResponse> {
    let request: HookRequest = match serde_json::from_str(input) {
        Ok(request) => request,
        Err(e) => {
            warn!("Ignoring malformed hook request: {}", e);
            return None;
        }
    };

    let prompt = request.user_prompt.filter(|p| !p.is_empty())?;

    match filter_prompt(&prompt, locations) {
        Ok(message) => message.map(|system_message| HookResponse { system_message }),
        Err(e) => {
            warn!("Tone filter failed; passing prompt through unchanged: {:#}", e);
            None
        }
    }
}
