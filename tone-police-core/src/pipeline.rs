//! Pipeline orchestrator.
//!
//! Sequences one filter run: code protection, the common pass, each
//! language pass, restoration, and the decision whether there is anything to
//! report. Output is produced only when the text actually changed.
//!
//! License: MIT OR Apache-2.0

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use tinytemplate::{format_unescaped, TinyTemplate};

use crate::compiler::get_or_compile_common;
use crate::config::FilterConfig;
use crate::dictionary::{DictionarySource, EmbeddedSource};
use crate::guard::{self, ProtectedText};
use crate::transform::{apply_common, apply_languages, TransformSummaryItem};

/// Fixed explanation wrapped around an adjusted prompt.
pub const RESPONSE_TEMPLATE: &str = "Note: the user's message has been adjusted for tone. \
Original intent preserved. Adjusted prompt: {text}";

/// Result of running the transformation stages over one prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformation {
    pub text: String,
    pub changed: bool,
    pub summary: Vec<TransformSummaryItem>,
    /// Number of code spans shielded during the run.
    pub protected_spans: usize,
}

/// A configured filter bound to a dictionary source.
pub struct TonePipeline {
    config: FilterConfig,
    source: Box<dyn DictionarySource>,
}

impl std::fmt::Debug for TonePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TonePipeline")
            .field("config", &self.config)
            .field("source", &self.source.describe())
            .finish()
    }
}

impl TonePipeline {
    pub fn new(config: FilterConfig, source: impl DictionarySource + 'static) -> Self {
        Self::from_boxed(config, Box::new(source))
    }

    pub fn from_boxed(config: FilterConfig, source: Box<dyn DictionarySource>) -> Self {
        Self { config, source }
    }

    /// A pipeline over the dictionaries compiled into the library.
    pub fn with_embedded(config: FilterConfig) -> Self {
        Self::new(config, EmbeddedSource)
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn source(&self) -> &dyn DictionarySource {
        self.source.as_ref()
    }

    /// Runs protection, the common pass, the language passes and restoration.
    ///
    /// Ignores `enabled`; [`TonePipeline::run`] is the gated entry point.
    pub fn transform(&self, raw_prompt: &str) -> Result<Transformation> {
        let mut summary = Vec::new();

        let ProtectedText { text, spans } = if self.config.preserve_code_blocks {
            guard::protect(raw_prompt)
        } else {
            ProtectedText {
                text: raw_prompt.to_string(),
                spans: Vec::new(),
            }
        };

        let mut text = match self.source.load_common() {
            Some(common) => {
                let compiled = get_or_compile_common(&common).context("Failed to compile common patterns")?;
                apply_common(&text, &compiled, &mut summary)
            }
            None => {
                debug!("No common patterns in {}; skipping common pass.", self.source.describe());
                text
            }
        };

        text = apply_languages(
            &text,
            &self.config.languages,
            self.config.intensity,
            self.source.as_ref(),
            &mut summary,
        )?;

        if self.config.preserve_code_blocks && !spans.is_empty() {
            text = guard::restore(&text, &spans);
        }

        let changed = text != raw_prompt;
        if self.config.log_transforms {
            for item in &summary {
                info!(
                    "[{}] {} '{}' matched {} time(s)",
                    item.stage, item.category, item.pattern, item.occurrences
                );
            }
        }
        debug!(
            "Transform finished: changed={}, rules fired={}, code spans={}",
            changed,
            summary.len(),
            spans.len()
        );

        Ok(Transformation {
            text,
            changed,
            summary,
            protected_spans: spans.len(),
        })
    }

    /// Filters one prompt. `None` when disabled, empty, or unchanged.
    pub fn run(&self, raw_prompt: &str) -> Result<Option<String>> {
        if !self.config.enabled {
            debug!("Filter disabled by configuration.");
            return Ok(None);
        }
        if raw_prompt.is_empty() {
            return Ok(None);
        }
        let transformation = self.transform(raw_prompt)?;
        if !transformation.changed {
            return Ok(None);
        }
        render_message(&transformation.text).map(Some)
    }
}

/// Wraps an adjusted prompt in [`RESPONSE_TEMPLATE`].
pub fn render_message(text: &str) -> Result<String> {
    let mut tt = TinyTemplate::new();
    tt.set_default_formatter(&format_unescaped);
    tt.add_template("response", RESPONSE_TEMPLATE)
        .context("Failed to parse response template")?;
    let ctx = serde_json::json!({ "text": text });
    tt.render("response", &ctx)
        .map_err(|e| anyhow!("Failed to render response template: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intensity::Intensity;

    fn pipeline(intensity: Intensity) -> TonePipeline {
        TonePipeline::with_embedded(FilterConfig {
            intensity,
            ..FilterConfig::default()
        })
    }

    #[test]
    fn message_embeds_text_verbatim() {
        let msg = render_message("a < b & \"c\" {d}").unwrap();
        assert_eq!(
            msg,
            "Note: the user's message has been adjusted for tone. Original intent preserved. \
             Adjusted prompt: a < b & \"c\" {d}"
        );
    }

    #[test]
    fn changed_prompt_produces_message() {
        let out = pipeline(Intensity::Light).run("this is shit").unwrap().unwrap();
        assert!(out.ends_with("Adjusted prompt: this is shoot"), "{}", out);
    }

    #[test]
    fn unchanged_prompt_produces_nothing() {
        let out = pipeline(Intensity::Moderate)
            .run("Please help me refactor this function.")
            .unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn empty_and_whitespace_prompts_produce_nothing() {
        let p = pipeline(Intensity::Strict);
        assert!(p.run("").unwrap().is_none());
        assert!(p.run("   ").unwrap().is_none());
    }

    #[test]
    fn disabled_pipeline_is_silent() {
        let p = TonePipeline::with_embedded(FilterConfig {
            enabled: false,
            intensity: Intensity::Strict,
            ..FilterConfig::default()
        });
        assert!(p.run("fuck this shit").unwrap().is_none());
    }

    #[test]
    fn code_is_exposed_when_protection_is_off() {
        let p = TonePipeline::with_embedded(FilterConfig {
            preserve_code_blocks: false,
            intensity: Intensity::Light,
            ..FilterConfig::default()
        });
        let t = p.transform("use `shit` here").unwrap();
        assert_eq!(t.text, "use `shoot` here");
        assert_eq!(t.protected_spans, 0);
    }
}
