//! Configuration management for `tone-police-core`.
//!
//! This module defines the filter configuration and the layered lookup that
//! resolves it once per invocation: a project-level override, then a
//! user-level file, then the packaged default, then a hardcoded fallback.
//! The first file that exists wins; files are never merged.
//!
//! License: MIT OR Apache-2.0

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::errors::TonePoliceError;
use crate::intensity::Intensity;

/// Maximum allowed length for a regex pattern string.
pub const MAX_PATTERN_LENGTH: usize = 500;

/// Environment variable naming the plugin root (holds `config/` and `dictionaries/`).
pub const PLUGIN_ROOT_ENV: &str = "CLAUDE_PLUGIN_ROOT";

/// Environment variable naming the project directory the prompt belongs to.
pub const PROJECT_DIR_ENV: &str = "CLAUDE_PROJECT_DIR";

/// Location of the project override, relative to the project directory.
pub const PROJECT_CONFIG_PATH: &str = ".claude/tone-police.config.json";

/// Location of the packaged default, relative to the plugin root.
pub const PLUGIN_CONFIG_PATH: &str = "config/default-config.json";

const EMBEDDED_DEFAULT_CONFIG: &str = include_str!("../config/default-config.json");

/// Settings for one filter invocation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Cumulative filtering strength.
    pub intensity: Intensity,
    /// Language dictionaries to apply, in order.
    pub languages: Vec<String>,
    /// When false the filter never produces output.
    pub enabled: bool,
    /// Shield fenced and inline code spans from substitution.
    #[serde(alias = "preserveCodeBlocks")]
    pub preserve_code_blocks: bool,
    /// Log every rule that fired at `info` level.
    #[serde(alias = "logTransforms")]
    pub log_transforms: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            intensity: Intensity::Moderate,
            languages: vec!["en".to_string()],
            enabled: true,
            preserve_code_blocks: true,
            log_transforms: false,
        }
    }
}

impl FilterConfig {
    /// Loads a configuration from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading filter configuration from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: FilterConfig = serde_json::from_str(&text)
            .map_err(|e| TonePoliceError::ConfigParse(path.display().to_string(), e))?;
        debug!(
            "Config from {}: intensity={}, languages={:?}, enabled={}",
            path.display(),
            config.intensity,
            config.languages,
            config.enabled
        );
        Ok(config)
    }

    /// Parses the default configuration bundled into the library.
    pub fn load_embedded_default() -> Result<Self> {
        debug!("Loading default configuration from embedded string...");
        let config = serde_json::from_str(EMBEDDED_DEFAULT_CONFIG)
            .map_err(|e| TonePoliceError::ConfigParse("<embedded>".to_string(), e))?;
        Ok(config)
    }
}

/// Where the resolved configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    ProjectOverride(PathBuf),
    UserConfig(PathBuf),
    PluginDefault(PathBuf),
    Embedded,
    Fallback,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigSource::ProjectOverride(p) => write!(f, "project override ({})", p.display()),
            ConfigSource::UserConfig(p) => write!(f, "user config ({})", p.display()),
            ConfigSource::PluginDefault(p) => write!(f, "plugin default ({})", p.display()),
            ConfigSource::Embedded => write!(f, "embedded default"),
            ConfigSource::Fallback => write!(f, "hardcoded fallback"),
        }
    }
}

/// A configuration together with the layer it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConfig {
    pub config: FilterConfig,
    pub source: ConfigSource,
}

/// The directories consulted by the layered lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLocations {
    pub project_dir: Option<PathBuf>,
    pub user_config_dir: Option<PathBuf>,
    pub plugin_root: Option<PathBuf>,
}

impl ConfigLocations {
    /// Reads the plugin root and project directory from the environment and
    /// the user config directory from the platform conventions.
    pub fn from_env() -> Self {
        let non_empty = |key: &str| {
            std::env::var_os(key)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        Self {
            project_dir: non_empty(PROJECT_DIR_ENV),
            user_config_dir: dirs::config_dir().map(|p| p.join("tone-police")),
            plugin_root: non_empty(PLUGIN_ROOT_ENV),
        }
    }

    /// Dictionary directory under the plugin root, if a plugin root is set.
    pub fn dictionaries_dir(&self) -> Option<PathBuf> {
        self.plugin_root.as_ref().map(|root| root.join("dictionaries"))
    }

    /// File candidates in lookup order.
    pub fn candidate_paths(&self) -> Vec<ConfigSource> {
        [
            self.project_dir
                .as_ref()
                .map(|p| ConfigSource::ProjectOverride(p.join(PROJECT_CONFIG_PATH))),
            self.user_config_dir
                .as_ref()
                .map(|p| ConfigSource::UserConfig(p.join("config.json"))),
            self.plugin_root
                .as_ref()
                .map(|p| ConfigSource::PluginDefault(p.join(PLUGIN_CONFIG_PATH))),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Resolves the configuration for one invocation.
    ///
    /// A candidate file that exists but cannot be read or parsed is an error;
    /// callers on the hook path treat that as "disabled".
    pub fn load_layered(&self) -> Result<LoadedConfig> {
        for source in self.candidate_paths() {
            let path = match &source {
                ConfigSource::ProjectOverride(p)
                | ConfigSource::UserConfig(p)
                | ConfigSource::PluginDefault(p) => p.clone(),
                ConfigSource::Embedded | ConfigSource::Fallback => continue,
            };
            if path.is_file() {
                let config = FilterConfig::load_from_file(&path)?;
                debug!("Resolved configuration from {}", source);
                return Ok(LoadedConfig { config, source });
            }
            debug!("Config candidate not found: {}", path.display());
        }

        // Without a plugin root the packaged default is the copy compiled in.
        if self.plugin_root.is_none() {
            return Ok(LoadedConfig {
                config: FilterConfig::load_embedded_default()?,
                source: ConfigSource::Embedded,
            });
        }

        debug!("No configuration file found; using hardcoded fallback.");
        Ok(LoadedConfig {
            config: FilterConfig::default(),
            source: ConfigSource::Fallback,
        })
    }
}
