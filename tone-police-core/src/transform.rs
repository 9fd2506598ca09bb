//! Transform engine: sequential regex rewriting.
//!
//! Every rule replaces all non-overlapping matches in the running text, and
//! rules run one after another, so a later rule sees what earlier ones wrote.
//! The common pass (caps, punctuation, repeated characters) always runs before
//! any language pass.
//!
//! License: MIT OR Apache-2.0

use anyhow::Result;
use log::debug;
use regex::Captures;
use serde::Serialize;

use crate::compiler::{get_or_compile_resolved, CompiledCommon, CompiledRules};
use crate::dictionary::{DictionarySource, RepeatedCharacters};
use crate::intensity::{resolve, Intensity};

/// Stage name used in summaries for the common pass.
pub const COMMON_STAGE: &str = "common";

/// One rule that changed the text, with how often it matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformSummaryItem {
    /// `"common"` or a language code.
    pub stage: String,
    pub category: String,
    pub pattern: String,
    pub occurrences: usize,
}

/// Applies `rules` in order, recording every rule that matched.
pub fn apply_rules(
    text: &str,
    rules: &CompiledRules,
    stage: &str,
    summary: &mut Vec<TransformSummaryItem>,
) -> String {
    let mut current = text.to_string();
    for rule in &rules.rules {
        let mut occurrences = 0usize;
        let replaced = rule.regex.replace_all(&current, |caps: &Captures| {
            occurrences += 1;
            let mut expanded = String::new();
            caps.expand(&rule.replacement, &mut expanded);
            expanded
        });
        if occurrences == 0 {
            continue;
        }
        current = replaced.into_owned();
        summary.push(TransformSummaryItem {
            stage: stage.to_string(),
            category: rule.category.clone(),
            pattern: rule.pattern.clone(),
            occurrences,
        });
    }
    current
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Collapses runs of `min_run` or more identical word characters to
/// `collapse_to` copies. Returns the new text and the number of runs collapsed.
///
/// Settings that could not shorten a run (`collapse_to` of 0 or not below
/// `min_run`) leave the text as is.
pub fn collapse_repeated(text: &str, settings: &RepeatedCharacters) -> (String, usize) {
    if settings.collapse_to == 0 || settings.collapse_to >= settings.min_run {
        return (text.to_string(), 0);
    }
    let mut out = String::with_capacity(text.len());
    let mut collapsed = 0usize;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        let mut run = 1usize;
        while chars.peek() == Some(&c) {
            chars.next();
            run += 1;
        }
        let keep = if is_word_char(c) && run >= settings.min_run {
            collapsed += 1;
            settings.collapse_to
        } else {
            run
        };
        out.extend(std::iter::repeat(c).take(keep));
    }
    (out, collapsed)
}

/// The common pass: caps normalization, then punctuation, then repeated characters.
pub fn apply_common(
    text: &str,
    common: &CompiledCommon,
    summary: &mut Vec<TransformSummaryItem>,
) -> String {
    let mut current = text.to_string();

    if let Some(caps) = &common.caps {
        let mut occurrences = 0usize;
        let lowered = caps.replace_all(&current, |m: &Captures| {
            occurrences += 1;
            m[0].to_lowercase()
        });
        if occurrences > 0 {
            current = lowered.into_owned();
            summary.push(TransformSummaryItem {
                stage: COMMON_STAGE.to_string(),
                category: "caps_normalization".to_string(),
                pattern: caps.as_str().to_string(),
                occurrences,
            });
        }
    }

    current = apply_rules(&current, &common.punctuation, COMMON_STAGE, summary);

    if let Some(settings) = &common.repeated {
        let (collapsed, runs) = collapse_repeated(&current, settings);
        if runs > 0 {
            current = collapsed;
            summary.push(TransformSummaryItem {
                stage: COMMON_STAGE.to_string(),
                category: "repeated_characters".to_string(),
                pattern: format!("run >= {} -> {}", settings.min_run, settings.collapse_to),
                occurrences: runs,
            });
        }
    }

    current
}

/// The language pass for one language: resolve, compile (cached), apply.
///
/// A language the source has no dictionary for is skipped.
pub fn apply_language(
    text: &str,
    language: &str,
    intensity: Intensity,
    source: &dyn DictionarySource,
    summary: &mut Vec<TransformSummaryItem>,
) -> Result<String> {
    let Some(dictionary) = source.load_dictionary(language) else {
        debug!("No dictionary for language '{}'; skipping.", language);
        return Ok(text.to_string());
    };
    let resolved = resolve(&dictionary, intensity);
    let compiled = get_or_compile_resolved(&resolved)?;
    Ok(apply_rules(text, &compiled, language, summary))
}

/// Runs the language pass for each language in order.
pub fn apply_languages(
    text: &str,
    languages: &[String],
    intensity: Intensity,
    source: &dyn DictionarySource,
    summary: &mut Vec<TransformSummaryItem>,
) -> Result<String> {
    let mut current = text.to_string();
    for language in languages {
        current = apply_language(&current, language, intensity, source, summary)?;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{compile_common, compile_rules};
    use crate::dictionary::{EmbeddedSource, Rule};

    fn common() -> CompiledCommon {
        let source = EmbeddedSource;
        compile_common(&source.load_common().unwrap()).unwrap()
    }

    #[test]
    fn later_rules_see_earlier_output() {
        let first = Rule::new("cat", "dog");
        let second = Rule::new("dog", "bird");
        let rules = compile_rules(vec![("a", &first), ("a", &second)]).unwrap();
        let mut summary = Vec::new();
        assert_eq!(apply_rules("cat", &rules, "xx", &mut summary), "bird");
        assert_eq!(summary.len(), 2);
    }

    #[test]
    fn replacements_expand_capture_groups() {
        let rule = Rule::new(r"\b(it|that) sucks\b", "${1} needs work");
        let rules = compile_rules(vec![("n", &rule)]).unwrap();
        let mut summary = Vec::new();
        assert_eq!(apply_rules("That sucks", &rules, "en", &mut summary), "That needs work");
    }

    #[test]
    fn summary_counts_all_occurrences() {
        let rule = Rule::new(r"\bdamn\b", "dang");
        let rules = compile_rules(vec![("profanity", &rule)]).unwrap();
        let mut summary = Vec::new();
        apply_rules("damn, damn, DAMN", &rules, "en", &mut summary);
        assert_eq!(
            summary,
            vec![TransformSummaryItem {
                stage: "en".to_string(),
                category: "profanity".to_string(),
                pattern: r"\bdamn\b".to_string(),
                occurrences: 3,
            }]
        );
    }

    #[test]
    fn caps_of_four_or_more_are_lowered() {
        let mut summary = Vec::new();
        assert_eq!(apply_common("THIS IS STUPID", &common(), &mut summary), "this IS stupid");
        assert_eq!(apply_common("I AM OK BUT FINE", &common(), &mut summary), "I AM OK BUT fine");
    }

    #[test]
    fn punctuation_runs_collapse() {
        let mut summary = Vec::new();
        assert_eq!(apply_common("WHY!!!", &common(), &mut summary), "WHY!");
        assert_eq!(apply_common("WHAT???", &common(), &mut summary), "what?");
        assert_eq!(apply_common("really?!?!", &common(), &mut summary), "really?!");
        assert_eq!(apply_common("wait.....", &common(), &mut summary), "wait...");
    }

    #[test]
    fn stretched_words_collapse_to_two() {
        let mut summary = Vec::new();
        assert_eq!(apply_common("sooooo annoying", &common(), &mut summary), "soo annoying");
        assert_eq!(apply_common("nooooo way", &common(), &mut summary), "noo way");
        assert_eq!(apply_common("all good", &common(), &mut summary), "all good");
    }

    #[test]
    fn collapse_ignores_non_word_runs() {
        let settings = RepeatedCharacters::default();
        assert_eq!(collapse_repeated("----", &settings), ("----".to_string(), 0));
        assert_eq!(collapse_repeated("zzz___", &settings), ("zz__".to_string(), 2));
        assert_eq!(collapse_repeated("ñññ", &settings), ("ññ".to_string(), 1));
    }

    #[test]
    fn collapse_with_useless_settings_is_a_no_op() {
        let settings = RepeatedCharacters {
            min_run: 2,
            collapse_to: 3,
            description: None,
        };
        assert_eq!(collapse_repeated("aaaa", &settings), ("aaaa".to_string(), 0));
    }

    #[test]
    fn missing_language_is_skipped() {
        let mut summary = Vec::new();
        let out = apply_language("fuck", "klingon", Intensity::Strict, &EmbeddedSource, &mut summary).unwrap();
        assert_eq!(out, "fuck");
        assert!(summary.is_empty());
    }

    #[test]
    fn languages_apply_in_configured_order() {
        let mut summary = Vec::new();
        let languages = vec!["en".to_string(), "es".to_string()];
        let out = apply_languages("fuck this mierda", &languages, Intensity::Light, &EmbeddedSource, &mut summary)
            .unwrap();
        assert_eq!(out, "fudge this rayos");
        let stages: Vec<_> = summary.iter().map(|s| s.stage.as_str()).collect();
        assert_eq!(stages, vec!["en", "es"]);
    }
}
