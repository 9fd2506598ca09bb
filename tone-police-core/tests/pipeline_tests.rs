// tone-police-core/tests/pipeline_tests.rs
//! End-to-end behaviour of `TonePipeline` over the shipped dictionaries.
//!
//! Most tests run against the embedded resources; a few point a
//! `DirectorySource` at the crate's own `dictionaries/` directory to check
//! that the on-disk and embedded copies behave the same.

use anyhow::Result;
use std::path::PathBuf;
use test_log::test;

use tone_police_core::{
    Dictionary, DirectorySource, FilterConfig, Intensity, MemorySource, Rule, TonePipeline,
};

fn config(intensity: Intensity) -> FilterConfig {
    FilterConfig {
        intensity,
        ..FilterConfig::default()
    }
}

fn embedded(intensity: Intensity) -> TonePipeline {
    TonePipeline::with_embedded(config(intensity))
}

fn transformed(pipeline: &TonePipeline, prompt: &str) -> Result<String> {
    Ok(pipeline.transform(prompt)?.text)
}

fn shipped_dictionaries() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("dictionaries")
}

#[test]
fn fenced_code_survives_strict_filtering() -> Result<()> {
    let prompt = "fix this: ```fuck_count = 0```";
    let pipeline = embedded(Intensity::Strict);
    assert_eq!(transformed(&pipeline, prompt)?, prompt);
    assert!(pipeline.run(prompt)?.is_none());
    Ok(())
}

#[test]
fn prose_is_filtered_while_the_code_block_is_kept() -> Result<()> {
    let prompt = "This is shit\n```\nshit_var = 1\n```";
    let out = transformed(&embedded(Intensity::Light), prompt)?;
    assert_eq!(out, "This is shoot\n```\nshit_var = 1\n```");
    Ok(())
}

#[test]
fn inline_code_is_kept() -> Result<()> {
    let out = transformed(&embedded(Intensity::Moderate), "why is `damn_flag` set, damn")?;
    assert_eq!(out, "why is `damn_flag` set, dang");
    Ok(())
}

#[test]
fn clean_prompt_passes_through() -> Result<()> {
    for intensity in Intensity::ALL {
        let pipeline = embedded(intensity);
        assert!(pipeline.run("Please help me refactor this function.")?.is_none());
    }
    Ok(())
}

#[test]
fn gentler_levels_do_not_apply_stricter_rules() -> Result<()> {
    assert_eq!(transformed(&embedded(Intensity::Light), "shut up")?, "shut up");
    assert_eq!(transformed(&embedded(Intensity::Moderate), "shut up")?, "please stop");
    assert_eq!(transformed(&embedded(Intensity::Moderate), "terrible")?, "terrible");
    assert_eq!(transformed(&embedded(Intensity::Strict), "terrible")?, "suboptimal");
    Ok(())
}

#[test]
fn stricter_levels_keep_gentler_rules() -> Result<()> {
    for intensity in Intensity::ALL {
        assert_eq!(transformed(&embedded(intensity), "this is shit")?, "this is shoot");
    }
    Ok(())
}

#[test]
fn disabled_config_never_answers() -> Result<()> {
    let pipeline = TonePipeline::with_embedded(FilterConfig {
        enabled: false,
        intensity: Intensity::Strict,
        ..FilterConfig::default()
    });
    for prompt in ["fuck this", "SHUT UP!!!", "this is garbage", ""] {
        assert!(pipeline.run(prompt)?.is_none());
    }
    Ok(())
}

#[test]
fn languages_compose_in_order() -> Result<()> {
    let pipeline = TonePipeline::with_embedded(FilterConfig {
        intensity: Intensity::Light,
        languages: vec!["en".to_string(), "es".to_string()],
        ..FilterConfig::default()
    });
    assert_eq!(transformed(&pipeline, "fuck this mierda")?, "fudge this rayos");
    Ok(())
}

#[test]
fn unknown_language_is_skipped() -> Result<()> {
    let pipeline = TonePipeline::with_embedded(FilterConfig {
        intensity: Intensity::Light,
        languages: vec!["xx".to_string(), "en".to_string()],
        ..FilterConfig::default()
    });
    assert_eq!(transformed(&pipeline, "damn")?, "dang");
    Ok(())
}

#[test]
fn shouting_and_punctuation_are_normalized() -> Result<()> {
    let pipeline = embedded(Intensity::Light);
    assert_eq!(transformed(&pipeline, "WHY!!!")?, "WHY!");
    assert_eq!(transformed(&pipeline, "WHAT???")?, "what?");
    assert_eq!(transformed(&pipeline, "sooooo annoying")?, "soo annoying");
    assert_eq!(transformed(&pipeline, "wait..... really?!?!")?, "wait... really?!");
    Ok(())
}

#[test]
fn normalization_feeds_the_language_rules() -> Result<()> {
    // Caps are lowered first, so the shouted phrase still matches.
    let out = transformed(&embedded(Intensity::Moderate), "WHAT THE FUCK!!!")?;
    assert_eq!(out, "what on earth!");
    Ok(())
}

#[test]
fn replacements_keep_captured_words() -> Result<()> {
    let out = transformed(&embedded(Intensity::Strict), "That sucks and it sucks")?;
    assert_eq!(out, "That needs work and it needs work");
    Ok(())
}

#[test]
fn spanish_rules_cascade_through_levels() -> Result<()> {
    let pipeline = TonePipeline::with_embedded(FilterConfig {
        intensity: Intensity::Moderate,
        languages: vec!["es".to_string()],
        ..FilterConfig::default()
    });
    // "mierda" becomes "rayos" at light, which the moderate phrase then matches.
    assert_eq!(transformed(&pipeline, "vete a la mierda")?, "déjalo estar");
    assert_eq!(transformed(&pipeline, "Cállate")?, "por favor, detente");
    Ok(())
}

#[test]
fn whitespace_prompt_flows_through_unchanged() -> Result<()> {
    let pipeline = embedded(Intensity::Strict);
    let t = pipeline.transform("   \n\t")?;
    assert!(!t.changed);
    assert!(pipeline.run("   \n\t")?.is_none());
    Ok(())
}

#[test]
fn summary_lists_every_fired_rule() -> Result<()> {
    let t = embedded(Intensity::Moderate).transform("SHUT UP, you idiot!!")?;
    assert_eq!(t.text, "please stop, my friend!");
    let stages: Vec<_> = t.summary.iter().map(|s| (s.stage.as_str(), s.category.as_str())).collect();
    assert_eq!(
        stages,
        vec![
            ("common", "caps_normalization"),
            ("common", "excessive_punctuation"),
            ("en", "hostile_phrase"),
            ("en", "insult"),
        ]
    );
    Ok(())
}

#[test]
fn message_wraps_the_adjusted_prompt() -> Result<()> {
    let message = embedded(Intensity::Light).run("this is shit")?.unwrap_or_default();
    assert_eq!(
        message,
        "Note: the user's message has been adjusted for tone. Original intent preserved. \
         Adjusted prompt: this is shoot"
    );
    Ok(())
}

#[test]
fn directory_source_matches_embedded() -> Result<()> {
    let prompts = [
        "WHAT THE FUCK is this garbage???",
        "you idiot, this sucks",
        "```let shit = 1;``` damn it",
        "sooooo useless",
    ];
    for intensity in Intensity::ALL {
        let from_disk = TonePipeline::new(config(intensity), DirectorySource::new(shipped_dictionaries()));
        let built_in = embedded(intensity);
        for prompt in prompts {
            assert_eq!(from_disk.transform(prompt)?, built_in.transform(prompt)?, "{} at {}", prompt, intensity);
        }
    }
    Ok(())
}

#[test]
fn invalid_rule_is_a_hard_failure() {
    let dictionary: Dictionary = serde_json::from_str(
        r#"{"language": "en", "patterns": {
            "light": {"profanity": [{"pattern": "(unclosed", "replacement": "x"}]},
            "moderate": {}, "strict": {}
        }}"#,
    )
    .unwrap();
    let pipeline = TonePipeline::new(config(Intensity::Light), MemorySource::new().with_dictionary("en", dictionary));
    let err = pipeline.run("anything").unwrap_err();
    assert!(format!("{:#}", err).contains("(unclosed"), "{:#}", err);
}

#[test]
fn case_sensitive_rules_only_match_exact_case() -> Result<()> {
    let mut rule = Rule::new(r"\bBad\b", "Fine");
    rule.case_sensitive = true;
    let dictionary: Dictionary = serde_json::from_value(serde_json::json!({
        "language": "en",
        "patterns": { "light": { "custom": [rule] }, "moderate": {}, "strict": {} }
    }))?;
    let pipeline = TonePipeline::new(config(Intensity::Light), MemorySource::new().with_dictionary("en", dictionary));
    assert_eq!(transformed(&pipeline, "Bad bad BAD")?, "Fine bad BAD");
    Ok(())
}
