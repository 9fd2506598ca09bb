//! Intensity levels and cumulative rule resolution.
//!
//! Levels are totally ordered (`light < moderate < strict`). Resolving a
//! dictionary at a level concatenates, per category, the rules of every level
//! up to and including it, in level order. A stricter level therefore always
//! applies everything a gentler one does, in the same order, before its own
//! additions.
//!
//! License: MIT OR Apache-2.0

use serde::{Deserialize, Deserializer, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::dictionary::{Category, Dictionary, Rule};

/// Cumulative filtering strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Light,
    #[default]
    Moderate,
    Strict,
}

impl Intensity {
    /// Every level, gentlest first.
    pub const ALL: [Intensity; 3] = [Intensity::Light, Intensity::Moderate, Intensity::Strict];

    pub fn as_str(self) -> &'static str {
        match self {
            Intensity::Light => "light",
            Intensity::Moderate => "moderate",
            Intensity::Strict => "strict",
        }
    }

    /// Parses a level name, treating anything unrecognized as `Moderate`.
    ///
    /// Surrounding whitespace and letter case are ignored, so `" Strict "`
    /// selects `Strict` rather than falling back.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Intensity::Light,
            "moderate" => Intensity::Moderate,
            "strict" => Intensity::Strict,
            other => {
                log::debug!("Unrecognized intensity '{}', using moderate.", other);
                Intensity::Moderate
            }
        }
    }

    /// The levels whose rules apply at `self`, in application order.
    pub fn levels_up_to(self) -> impl Iterator<Item = Intensity> {
        Self::ALL.into_iter().filter(move |level| *level <= self)
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intensity {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse_lenient(s))
    }
}

impl<'de> Deserialize<'de> for Intensity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Any non-string value (null, number, object) also means moderate.
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(raw) => Ok(Self::parse_lenient(&raw)),
            other => {
                log::debug!("Non-string intensity {}, using moderate.", other);
                Ok(Intensity::Moderate)
            }
        }
    }
}

/// The rules applicable at one intensity, grouped by category in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ResolvedRules {
    categories: Vec<Category>,
}

impl ResolvedRules {
    fn extend_category(&mut self, name: &str, rules: &[Rule]) {
        match self.categories.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.rules.extend_from_slice(rules),
            None => self.categories.push(Category {
                name: name.to_string(),
                rules: rules.to_vec(),
            }),
        }
    }

    /// Rules of one category, if any level contributed it.
    pub fn get(&self, category: &str) -> Option<&[Rule]> {
        self.categories
            .iter()
            .find(|c| c.name == category)
            .map(|c| c.rules.as_slice())
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn rule_count(&self) -> usize {
        self.categories.iter().map(|c| c.rules.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rule_count() == 0
    }
}

/// Computes the cumulative rule set of `dictionary` at `intensity`.
pub fn resolve(dictionary: &Dictionary, intensity: Intensity) -> ResolvedRules {
    let mut resolved = ResolvedRules::default();
    for level in intensity.levels_up_to() {
        for category in dictionary.patterns.level(level).iter() {
            resolved.extend_category(&category.name, &category.rules);
        }
    }
    log::debug!(
        "Resolved {} rule(s) in {} categories for '{}' at {}.",
        resolved.rule_count(),
        resolved.categories.len(),
        dictionary.language,
        intensity
    );
    resolved
}
