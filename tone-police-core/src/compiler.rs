//! compiler.rs - Manages the compilation and caching of tone rules.
//!
//! This module turns rule data into `regex::Regex` values. Compiled sets are
//! kept in process-wide caches keyed by a hash of the rule data, so a rule
//! set is compiled once no matter how many prompts are filtered with it.
//! Cached sets are immutable and shared behind `Arc`.
//!
//! License: MIT OR APACHE 2.0

use anyhow::Result;
use lazy_static::lazy_static;
use log::debug;
use regex::{Regex, RegexBuilder};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};

use crate::config::MAX_PATTERN_LENGTH;
use crate::dictionary::{CommonPatterns, RepeatedCharacters, Rule};
use crate::errors::TonePoliceError;
use crate::intensity::ResolvedRules;

/// Size limit for a single compiled regex.
const REGEX_SIZE_LIMIT: usize = 10 * (1 << 20);

/// A single compiled rule, ready to apply.
#[derive(Debug)]
pub struct CompiledRule {
    pub regex: Regex,
    pub replacement: String,
    /// Category the rule came from ("profanity", "excessive_punctuation", ...).
    pub category: String,
    /// Source pattern, kept for summaries and logs.
    pub pattern: String,
}

/// An ordered list of compiled rules.
#[derive(Debug, Default)]
pub struct CompiledRules {
    pub rules: Vec<CompiledRule>,
}

impl CompiledRules {
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// The common pattern set in compiled form. Absent groups are skipped.
#[derive(Debug, Default)]
pub struct CompiledCommon {
    pub caps: Option<Regex>,
    pub punctuation: CompiledRules,
    pub repeated: Option<RepeatedCharacters>,
}

lazy_static! {
    static ref COMPILED_RULES_CACHE: RwLock<HashMap<u64, Arc<CompiledRules>>> = RwLock::new(HashMap::new());
    static ref COMPILED_COMMON_CACHE: RwLock<HashMap<u64, Arc<CompiledCommon>>> = RwLock::new(HashMap::new());
}

fn hash_key<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn build_regex(name: &str, pattern: &str, case_sensitive: bool) -> Result<Regex, TonePoliceError> {
    if pattern.len() > MAX_PATTERN_LENGTH {
        return Err(TonePoliceError::PatternLengthExceeded(
            name.to_string(),
            pattern.len(),
            MAX_PATTERN_LENGTH,
        ));
    }
    RegexBuilder::new(pattern)
        .case_insensitive(!case_sensitive)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()
        .map_err(|e| TonePoliceError::RuleCompilationError(name.to_string(), e))
}

/// Compiles one rule belonging to `category`.
pub fn compile_rule(category: &str, rule: &Rule) -> Result<CompiledRule, TonePoliceError> {
    let name = format!("{}: {}", category, rule.pattern);
    let regex = build_regex(&name, &rule.pattern, rule.case_sensitive)?;
    Ok(CompiledRule {
        regex,
        replacement: rule.replacement.clone(),
        category: category.to_string(),
        pattern: rule.pattern.clone(),
    })
}

/// Compiles `(category, rule)` pairs in order.
///
/// Every rule is attempted; if any fail, a single `Fatal` error lists them all.
pub fn compile_rules<'a, I>(rules: I) -> Result<CompiledRules, TonePoliceError>
where
    I: IntoIterator<Item = (&'a str, &'a Rule)>,
{
    let mut compiled = Vec::new();
    let mut errors = Vec::new();

    for (category, rule) in rules {
        match compile_rule(category, rule) {
            Ok(c) => {
                log::debug!(
                    target: "tone_police_core::compiler",
                    "Rule '{}' in '{}' compiled successfully.",
                    rule.pattern,
                    category
                );
                compiled.push(c);
            }
            Err(e) => errors.push(e),
        }
    }

    if !errors.is_empty() {
        let message = errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("\n");
        return Err(TonePoliceError::Fatal(format!(
            "Failed to compile {} rule(s):\n{}",
            errors.len(),
            message
        )));
    }

    debug!("Finished compiling rules. Total compiled: {}.", compiled.len());
    Ok(CompiledRules { rules: compiled })
}

/// Compiles a resolved rule set, categories in order.
pub fn compile_resolved(resolved: &ResolvedRules) -> Result<CompiledRules, TonePoliceError> {
    compile_rules(
        resolved
            .categories()
            .iter()
            .flat_map(|c| c.rules.iter().map(move |r| (c.name.as_str(), r))),
    )
}

/// Compiles the common pattern set.
pub fn compile_common(common: &CommonPatterns) -> Result<CompiledCommon, TonePoliceError> {
    let groups = &common.patterns;
    // The caps pattern targets capitals, so it is always case-sensitive.
    let caps = groups
        .caps_normalization
        .as_ref()
        .map(|caps| build_regex("caps_normalization", &caps.pattern, true))
        .transpose()?;
    let punctuation = match &groups.excessive_punctuation {
        Some(punct) => compile_rules(punct.patterns.iter().map(|r| ("excessive_punctuation", r)))?,
        None => CompiledRules::default(),
    };
    Ok(CompiledCommon {
        caps,
        punctuation,
        repeated: groups.repeated_characters.clone(),
    })
}

/// Returns the cached compilation of `resolved`, compiling it on first use.
pub fn get_or_compile_resolved(resolved: &ResolvedRules) -> Result<Arc<CompiledRules>> {
    let cache_key = hash_key(resolved);

    {
        let cache = COMPILED_RULES_CACHE.read().unwrap_or_else(|p| p.into_inner());
        if let Some(rules) = cache.get(&cache_key) {
            debug!("Serving compiled rules from cache for key: {}", cache_key);
            return Ok(Arc::clone(rules));
        }
    }

    debug!("Compiled rules not found in cache. Compiling now.");
    let compiled = Arc::new(compile_resolved(resolved)?);
    COMPILED_RULES_CACHE
        .write()
        .unwrap_or_else(|p| p.into_inner())
        .insert(cache_key, Arc::clone(&compiled));
    Ok(compiled)
}

/// Returns the cached compilation of `common`, compiling it on first use.
pub fn get_or_compile_common(common: &CommonPatterns) -> Result<Arc<CompiledCommon>> {
    let cache_key = hash_key(common);

    {
        let cache = COMPILED_COMMON_CACHE.read().unwrap_or_else(|p| p.into_inner());
        if let Some(compiled) = cache.get(&cache_key) {
            debug!("Serving compiled common patterns from cache for key: {}", cache_key);
            return Ok(Arc::clone(compiled));
        }
    }

    let compiled = Arc::new(compile_common(common)?);
    COMPILED_COMMON_CACHE
        .write()
        .unwrap_or_else(|p| p.into_inner())
        .insert(cache_key, Arc::clone(&compiled));
    Ok(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_are_case_insensitive_unless_flagged() {
        let loose = compile_rule("c", &Rule::new("shit", "shoot")).unwrap();
        assert!(loose.regex.is_match("SHIT"));

        let mut strict_rule = Rule::new("Shit", "Shoot");
        strict_rule.case_sensitive = true;
        let strict = compile_rule("c", &strict_rule).unwrap();
        assert!(!strict.regex.is_match("shit"));
    }

    #[test]
    fn every_bad_rule_is_reported() {
        let bad_a = Rule::new("(unclosed", "x");
        let good = Rule::new("fine", "y");
        let bad_b = Rule::new("[z-a]", "z");
        let err = compile_rules(vec![("a", &bad_a), ("b", &good), ("c", &bad_b)]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Failed to compile 2 rule(s)"), "{}", message);
        assert!(message.contains("(unclosed"));
        assert!(message.contains("[z-a]"));
    }

    #[test]
    fn overlong_patterns_are_rejected() {
        let rule = Rule::new("a".repeat(MAX_PATTERN_LENGTH + 1), "b");
        assert!(matches!(
            compile_rule("c", &rule),
            Err(TonePoliceError::PatternLengthExceeded(_, _, MAX_PATTERN_LENGTH))
        ));
    }

    #[test]
    fn identical_rule_sets_share_one_compilation() {
        let dict: crate::dictionary::Dictionary = serde_json::from_str(
            r#"{"language": "cache-test", "patterns": {
                "light": {"p": [{"pattern": "cachetestword", "replacement": "x"}]},
                "moderate": {}, "strict": {}
            }}"#,
        )
        .unwrap();
        let resolved = crate::intensity::resolve(&dict, crate::Intensity::Light);
        let first = get_or_compile_resolved(&resolved).unwrap();
        let second = get_or_compile_resolved(&resolved.clone()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
