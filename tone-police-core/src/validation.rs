// File: tone-police-core/src/validation.rs
//! Offline integrity checks for dictionary resources.
//!
//! The filter itself does not guard against broken rule data; a bad pattern
//! fails compilation at run time. These checks catch such problems before
//! the data ships: parseability, all intensity levels present, patterns that
//! compile, no duplicate pattern within a (level, category) pair, and
//! replacements that only reference capture groups which exist.
//!
//! License: MIT OR APACHE 2.0

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::compiler::compile_rule;
use crate::dictionary::{CommonPatterns, Dictionary, Rule, COMMON_PATTERNS_FILE};
use crate::intensity::Intensity;

lazy_static! {
    // `$$` is a literal dollar. `$name` takes the longest run of name characters.
    static ref GROUP_REFERENCE: Regex = Regex::new(r"\$\$|\$(?:\{([^}]+)\}|([_0-9a-zA-Z]+))").unwrap();
}

/// A single problem found in a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// File or resource name.
    pub resource: String,
    /// Where in the resource, e.g. `light/profanity[3]`.
    pub location: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location.is_empty() {
            write!(f, "{}: {}", self.resource, self.message)
        } else {
            write!(f, "{} [{}]: {}", self.resource, self.location, self.message)
        }
    }
}

/// Outcome of validating a dictionary directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub files_checked: usize,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }
}

fn issue(resource: &str, location: impl Into<String>, message: impl Into<String>) -> ValidationIssue {
    ValidationIssue {
        resource: resource.to_string(),
        location: location.into(),
        message: message.into(),
    }
}

/// Checks one rule: non-empty pattern, compiles, and group references resolve.
fn validate_rule(resource: &str, location: &str, category: &str, rule: &Rule) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    if rule.pattern.is_empty() {
        issues.push(issue(resource, location, "empty `pattern` field"));
        return issues;
    }
    let compiled = match compile_rule(category, rule) {
        Ok(c) => c,
        Err(e) => {
            issues.push(issue(resource, location, e.to_string()));
            return issues;
        }
    };

    let group_count = compiled.regex.captures_len().saturating_sub(1);
    let names: HashSet<&str> = compiled.regex.capture_names().flatten().collect();
    for cap in GROUP_REFERENCE.captures_iter(&rule.replacement) {
        let Some(reference) = cap.get(1).or_else(|| cap.get(2)).map(|m| m.as_str()) else {
            continue;
        };
        // `$1word` names a group `1word`, not group 1 followed by text.
        let exists = match reference.parse::<usize>() {
            Ok(n) => n <= group_count,
            Err(_) => names.contains(reference),
        };
        if !exists {
            issues.push(issue(
                resource,
                location,
                format!("replacement references non-existent capture group '${}'", reference),
            ));
        }
    }
    issues
}

/// Validates a parsed language dictionary.
pub fn validate_dictionary(resource: &str, dictionary: &Dictionary) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    if dictionary.language.trim().is_empty() {
        issues.push(issue(resource, "", "empty `language` field"));
    }

    for level in Intensity::ALL {
        for category in dictionary.patterns.level(level).iter() {
            if category.name.trim().is_empty() {
                issues.push(issue(resource, level.as_str(), "category with an empty name"));
            }
            let mut seen: HashSet<&str> = HashSet::new();
            for (i, rule) in category.rules.iter().enumerate() {
                let location = format!("{}/{}[{}]", level, category.name, i);
                if !seen.insert(rule.pattern.as_str()) {
                    issues.push(issue(resource, &location, format!("duplicate pattern '{}'", rule.pattern)));
                }
                issues.extend(validate_rule(resource, &location, &category.name, rule));
            }
        }
    }
    debug!("Validated dictionary '{}': {} issue(s).", resource, issues.len());
    issues
}

/// Validates a parsed common pattern set. All three groups are expected.
pub fn validate_common(resource: &str, common: &CommonPatterns) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let groups = &common.patterns;

    match &groups.caps_normalization {
        Some(caps) => {
            let rule = Rule {
                case_sensitive: true,
                ..Rule::new(caps.pattern.clone(), String::new())
            };
            issues.extend(validate_rule(resource, "caps_normalization", "caps_normalization", &rule));
        }
        None => issues.push(issue(resource, "", "missing `caps_normalization` group")),
    }

    match &groups.excessive_punctuation {
        Some(punct) if punct.patterns.is_empty() => {
            issues.push(issue(resource, "excessive_punctuation", "no patterns listed"))
        }
        Some(punct) => {
            for (i, rule) in punct.patterns.iter().enumerate() {
                let location = format!("excessive_punctuation[{}]", i);
                issues.extend(validate_rule(resource, &location, "excessive_punctuation", rule));
            }
        }
        None => issues.push(issue(resource, "", "missing `excessive_punctuation` group")),
    }

    match &groups.repeated_characters {
        Some(repeated) if repeated.collapse_to == 0 || repeated.collapse_to >= repeated.min_run => {
            issues.push(issue(
                resource,
                "repeated_characters",
                format!(
                    "collapse_to ({}) must be at least 1 and below min_run ({})",
                    repeated.collapse_to, repeated.min_run
                ),
            ))
        }
        Some(_) => {}
        None => issues.push(issue(resource, "", "missing `repeated_characters` group")),
    }

    issues
}

/// Validates every `*.json` resource in a dictionary directory.
pub fn validate_directory(dir: &Path) -> Result<ValidationReport> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read dictionary directory {}", dir.display()))?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    paths.sort();

    let mut report = ValidationReport::default();
    for path in paths {
        report.files_checked += 1;
        let resource = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let text = match std::fs::read_to_string(&path) {
            Ok(t) => t,
            Err(e) => {
                report.issues.push(issue(&resource, "", format!("unreadable: {}", e)));
                continue;
            }
        };

        if resource == COMMON_PATTERNS_FILE {
            match CommonPatterns::from_json(&resource, &text) {
                Ok(common) => report.issues.extend(validate_common(&resource, &common)),
                Err(e) => report.issues.push(issue(&resource, "", e.to_string())),
            }
            continue;
        }

        match Dictionary::from_json(&resource, &text) {
            Ok(dictionary) => {
                let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
                if dictionary.language != stem {
                    report.issues.push(issue(
                        &resource,
                        "",
                        format!("`language` is '{}' but the file is named for '{}'", dictionary.language, stem),
                    ));
                }
                report.issues.extend(validate_dictionary(&resource, &dictionary));
            }
            Err(e) => report.issues.push(issue(&resource, "", e.to_string())),
        }
    }
    Ok(report)
}
