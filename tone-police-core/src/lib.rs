// tone-police-core/src/lib.rs
//! # Tone Police Core Library
//!
//! `tone-police-core` rewrites hostile, profane or needlessly negative phrasing
//! in a prompt into milder wording before it reaches a downstream consumer,
//! while leaving code fragments exactly as written. Everything is purely
//! syntactic: ordered regex substitutions driven by JSON dictionaries.
//!
//! ## Modules
//!
//! * `guard`: Swaps fenced and inline code spans for placeholders and back.
//! * `dictionary`: Rule data, the common pattern set and the `DictionarySource` seam.
//! * `intensity`: Intensity levels and cumulative rule resolution.
//! * `compiler`: Compiles rule data into regexes, with a process-wide cache.
//! * `transform`: The common pass and the per-language passes.
//! * `pipeline`: `TonePipeline`, sequencing one filter run.
//! * `config`: `FilterConfig` and the layered configuration lookup.
//! * `headless`: The fail-open hook entry point.
//! * `validation`: Offline integrity checks for dictionary resources.
//! * `errors`: The library error type.
//!
//! ## Usage Example
//!
//! ```rust
//! use tone_police_core::{FilterConfig, Intensity, TonePipeline};
//! use anyhow::Result;
//!
//! fn main() -> Result<()> {
//!     let config = FilterConfig {
//!         intensity: Intensity::Light,
//!         ..FilterConfig::default()
//!     };
//!     let pipeline = TonePipeline::with_embedded(config);
//!
//!     let transformation = pipeline.transform("this is shit, see `shit_count`")?;
//!     assert_eq!(transformation.text, "this is shoot, see `shit_count`");
//!
//!     // `run` only answers when something changed.
//!     assert!(pipeline.run("Please help me refactor this function.")?.is_none());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Library operations return `anyhow::Result`, with [`TonePoliceError`]
//! underneath for rule, dictionary and configuration problems. The hook entry
//! point [`headless_filter_prompt`] never fails: any error means no response.
//!
//! ---
//! License: MIT OR Apache-2.0

pub mod compiler;
pub mod config;
pub mod dictionary;
pub mod errors;
pub mod guard;
pub mod headless;
pub mod intensity;
pub mod pipeline;
pub mod transform;
pub mod validation;

pub use config::{ConfigLocations, ConfigSource, FilterConfig, LoadedConfig, MAX_PATTERN_LENGTH};

pub use errors::TonePoliceError;

pub use dictionary::{
    Category, CommonPatterns, Dictionary, DictionarySource, DirectorySource, EmbeddedSource, MemorySource, Rule,
};

pub use intensity::{resolve, Intensity, ResolvedRules};

pub use compiler::{compile_rules, CompiledRule, CompiledRules};

pub use guard::{protect, restore, CodeSpan, ProtectedText};

pub use transform::TransformSummaryItem;

pub use pipeline::{render_message, TonePipeline, Transformation};

pub use headless::{headless_filter_prompt, HookRequest, HookResponse};

pub use validation::{validate_directory, ValidationIssue, ValidationReport};
