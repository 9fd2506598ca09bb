//! Pattern store: rule data and the sources it is loaded from.
//!
//! Rules are plain data (pattern, replacement, case sensitivity) kept outside
//! the engine so the corpus can change without a rebuild. A language
//! dictionary groups rules into named categories under each intensity level;
//! the common pattern set holds the language-agnostic normalization groups.
//!
//! Languages are looked up by code through the [`DictionarySource`] trait.
//! A missing resource is `None`, never an error.
//!
//! License: MIT OR Apache-2.0

use log::{debug, warn};
use once_cell::sync::Lazy;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::errors::TonePoliceError;
use crate::intensity::Intensity;

/// File name of the common pattern set inside a dictionary directory.
pub const COMMON_PATTERNS_FILE: &str = "common-patterns.json";

/// Default pattern for caps normalization when the resource omits one.
pub const DEFAULT_CAPS_PATTERN: &str = r"\b[A-Z]{4,}\b";

/// A single pattern-to-replacement rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Rule {
    /// Regex in the `regex` crate dialect.
    pub pattern: String,
    /// Replacement text; `$1` / `${name}` expand capture groups.
    pub replacement: String,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Rule {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
            case_sensitive: false,
            description: None,
        }
    }
}

/// A named group of rules within one level.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Category {
    pub name: String,
    pub rules: Vec<Rule>,
}

/// Categories of one level, in the order they appear in the resource.
///
/// Serialized as a JSON object of `name -> [rule]`; a custom visitor keeps the
/// object's key order, which a `HashMap` would lose.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Categories(Vec<Category>);

impl Categories {
    pub fn new(categories: Vec<Category>) -> Self {
        Self(categories)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Category> {
        self.0.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.0.iter().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for Categories {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CategoriesVisitor;

        impl<'de> Visitor<'de> for CategoriesVisitor {
            type Value = Categories;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of category name to a list of rules")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Categories, A::Error> {
                let mut categories: Vec<Category> = Vec::new();
                while let Some((name, rules)) = map.next_entry::<String, Vec<Rule>>()? {
                    match categories.iter_mut().find(|c| c.name == name) {
                        Some(existing) => existing.rules.extend(rules),
                        None => categories.push(Category { name, rules }),
                    }
                }
                Ok(Categories(categories))
            }
        }

        deserializer.deserialize_map(CategoriesVisitor)
    }
}

impl Serialize for Categories {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for category in &self.0 {
            map.serialize_entry(&category.name, &category.rules)?;
        }
        map.end()
    }
}

/// Per-level categories. All three levels are required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Levels {
    pub light: Categories,
    pub moderate: Categories,
    pub strict: Categories,
}

impl Levels {
    pub fn level(&self, intensity: Intensity) -> &Categories {
        match intensity {
            Intensity::Light => &self.light,
            Intensity::Moderate => &self.moderate,
            Intensity::Strict => &self.strict,
        }
    }
}

/// A language dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Dictionary {
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub patterns: Levels,
}

impl Dictionary {
    pub fn from_json(name: &str, text: &str) -> Result<Self, TonePoliceError> {
        serde_json::from_str(text).map_err(|e| TonePoliceError::DictionaryParse(name.to_string(), e))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct CapsNormalization {
    #[serde(default = "default_caps_pattern")]
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_caps_pattern() -> String {
    DEFAULT_CAPS_PATTERN.to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct PunctuationRules {
    #[serde(default)]
    pub patterns: Vec<Rule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Collapse of stretched characters ("sooooo" -> "soo").
///
/// `regex` has no backreferences, so this group is parameterised by run
/// lengths rather than a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct RepeatedCharacters {
    #[serde(default = "default_min_run")]
    pub min_run: usize,
    #[serde(default = "default_collapse_to")]
    pub collapse_to: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_min_run() -> usize {
    3
}

fn default_collapse_to() -> usize {
    2
}

impl Default for RepeatedCharacters {
    fn default() -> Self {
        Self {
            min_run: default_min_run(),
            collapse_to: default_collapse_to(),
            description: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct CommonPatternGroups {
    #[serde(default)]
    pub caps_normalization: Option<CapsNormalization>,
    #[serde(default)]
    pub excessive_punctuation: Option<PunctuationRules>,
    #[serde(default)]
    pub repeated_characters: Option<RepeatedCharacters>,
}

/// The language-agnostic normalization set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct CommonPatterns {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub patterns: CommonPatternGroups,
}

impl CommonPatterns {
    pub fn from_json(name: &str, text: &str) -> Result<Self, TonePoliceError> {
        serde_json::from_str(text).map_err(|e| TonePoliceError::DictionaryParse(name.to_string(), e))
    }
}

/// Where dictionaries come from. Implementations return `None` for anything
/// they do not have.
pub trait DictionarySource: Send + Sync {
    /// Loads the dictionary for a language code such as `"en"`.
    fn load_dictionary(&self, language: &str) -> Option<Dictionary>;

    /// Loads the common pattern set.
    fn load_common(&self) -> Option<CommonPatterns>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

/// Dictionaries stored as `<root>/<language>.json` plus `<root>/common-patterns.json`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn language_path(&self, language: &str) -> Option<PathBuf> {
        let valid = !language.is_empty()
            && language
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            warn!("Ignoring invalid language code '{}'.", language);
            return None;
        }
        Some(self.root.join(format!("{}.json", language)))
    }

    /// Reads and parses a dictionary, distinguishing "absent" from "broken".
    pub fn try_load_dictionary(&self, language: &str) -> Result<Option<Dictionary>, TonePoliceError> {
        let Some(path) = self.language_path(language) else {
            return Ok(None);
        };
        if !path.is_file() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path)?;
        Dictionary::from_json(&path.display().to_string(), &text).map(Some)
    }

    /// Reads and parses the common pattern set, distinguishing "absent" from "broken".
    pub fn try_load_common(&self) -> Result<Option<CommonPatterns>, TonePoliceError> {
        let path = self.root.join(COMMON_PATTERNS_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path)?;
        CommonPatterns::from_json(&path.display().to_string(), &text).map(Some)
    }

    /// Language codes with a dictionary file in this directory, sorted.
    pub fn available_languages(&self) -> Vec<String> {
        let mut languages: Vec<String> = std::fs::read_dir(&self.root)
            .map(|entries| {
                entries
                    .flatten()
                    .map(|entry| entry.path())
                    .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("json"))
                    .filter(|path| path.file_name().and_then(|s| s.to_str()) != Some(COMMON_PATTERNS_FILE))
                    .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        languages.sort();
        languages
    }
}

impl DictionarySource for DirectorySource {
    fn load_dictionary(&self, language: &str) -> Option<Dictionary> {
        match self.try_load_dictionary(language) {
            Ok(Some(dictionary)) => Some(dictionary),
            Ok(None) => {
                debug!("No dictionary for '{}' under {}.", language, self.root.display());
                None
            }
            Err(e) => {
                warn!("Skipping dictionary '{}': {}", language, e);
                None
            }
        }
    }

    fn load_common(&self) -> Option<CommonPatterns> {
        match self.try_load_common() {
            Ok(common) => common,
            Err(e) => {
                warn!("Skipping common patterns: {}", e);
                None
            }
        }
    }

    fn describe(&self) -> String {
        format!("directory {}", self.root.display())
    }
}

const EMBEDDED_DICTIONARIES: &[(&str, &str)] = &[
    ("en", include_str!("../dictionaries/en.json")),
    ("es", include_str!("../dictionaries/es.json")),
];

const EMBEDDED_COMMON_PATTERNS: &str = include_str!("../dictionaries/common-patterns.json");

static EMBEDDED: Lazy<MemorySource> = Lazy::new(|| {
    let mut source = MemorySource::new();
    for (language, text) in EMBEDDED_DICTIONARIES {
        match Dictionary::from_json(language, text) {
            Ok(dictionary) => source.insert_dictionary(language, dictionary),
            Err(e) => warn!("Embedded dictionary '{}' is invalid: {}", language, e),
        }
    }
    match CommonPatterns::from_json(COMMON_PATTERNS_FILE, EMBEDDED_COMMON_PATTERNS) {
        Ok(common) => source.set_common(common),
        Err(e) => warn!("Embedded common patterns are invalid: {}", e),
    }
    source
});

/// The dictionaries compiled into the library.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedSource;

impl EmbeddedSource {
    pub fn languages() -> Vec<&'static str> {
        EMBEDDED_DICTIONARIES.iter().map(|(language, _)| *language).collect()
    }
}

impl DictionarySource for EmbeddedSource {
    fn load_dictionary(&self, language: &str) -> Option<Dictionary> {
        EMBEDDED.load_dictionary(language)
    }

    fn load_common(&self) -> Option<CommonPatterns> {
        EMBEDDED.load_common()
    }

    fn describe(&self) -> String {
        "embedded dictionaries".to_string()
    }
}

/// An in-memory source, handy for callers that build rules programmatically.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    dictionaries: HashMap<String, Dictionary>,
    common: Option<CommonPatterns>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dictionary(mut self, language: &str, dictionary: Dictionary) -> Self {
        self.insert_dictionary(language, dictionary);
        self
    }

    pub fn with_common(mut self, common: CommonPatterns) -> Self {
        self.set_common(common);
        self
    }

    pub fn insert_dictionary(&mut self, language: &str, dictionary: Dictionary) {
        self.dictionaries.insert(language.to_string(), dictionary);
    }

    pub fn set_common(&mut self, common: CommonPatterns) {
        self.common = Some(common);
    }
}

impl DictionarySource for MemorySource {
    fn load_dictionary(&self, language: &str) -> Option<Dictionary> {
        self.dictionaries.get(language).cloned()
    }

    fn load_common(&self) -> Option<CommonPatterns> {
        self.common.clone()
    }

    fn describe(&self) -> String {
        format!("in-memory ({} dictionaries)", self.dictionaries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_order_follows_the_file() {
        let dict = Dictionary::from_json(
            "t",
            r#"{"language": "t", "patterns": {
                "light": {"zeta": [], "alpha": [], "mid": []},
                "moderate": {}, "strict": {}
            }}"#,
        )
        .unwrap();
        let names: Vec<_> = dict.patterns.light.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn missing_level_is_rejected() {
        let err = Dictionary::from_json(
            "broken",
            r#"{"language": "t", "patterns": {"light": {}, "moderate": {}}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("strict"), "{}", err);
    }

    #[test]
    fn rules_default_to_case_insensitive() {
        let rule: Rule = serde_json::from_str(r#"{"pattern": "x", "replacement": "y"}"#).unwrap();
        assert!(!rule.case_sensitive);
    }

    #[test]
    fn common_groups_are_optional() {
        let common = CommonPatterns::from_json("c", r#"{"patterns": {"caps_normalization": {}}}"#).unwrap();
        assert_eq!(common.patterns.caps_normalization.unwrap().pattern, DEFAULT_CAPS_PATTERN);
        assert!(common.patterns.excessive_punctuation.is_none());
        assert!(common.patterns.repeated_characters.is_none());
    }

    #[test]
    fn embedded_source_ships_english_and_spanish() {
        let source = EmbeddedSource;
        assert_eq!(source.load_dictionary("en").unwrap().language, "en");
        assert_eq!(source.load_dictionary("es").unwrap().language, "es");
        assert!(source.load_dictionary("fr").is_none());
        assert!(source.load_common().is_some());
    }

    #[test]
    fn directory_source_rejects_path_like_codes() {
        let source = DirectorySource::new(".");
        assert!(source.load_dictionary("../etc/passwd").is_none());
        assert!(source.load_dictionary("").is_none());
    }
}
