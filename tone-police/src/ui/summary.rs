// tone-police/src/ui/summary.rs
//! Table of the rules that fired during a `filter` run.

use anyhow::Result;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use owo_colors::OwoColorize;
use std::io::Write;
use tone_police_core::TransformSummaryItem;

/// Prints `summary` as a table, or a one-line note when nothing fired.
pub fn print_summary<W: Write>(summary: &[TransformSummaryItem], writer: &mut W, supports_color: bool) -> Result<()> {
    let title = "Tone Summary";
    if supports_color {
        writeln!(writer, "{}", title.yellow().bold())?;
    } else {
        writeln!(writer, "{}", title)?;
    }

    if summary.is_empty() {
        writeln!(writer, "No rules matched.")?;
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Stage", "Category", "Pattern", "Matches"]);
    for item in summary {
        table.add_row(vec![
            item.stage.clone(),
            item.category.clone(),
            item.pattern.clone(),
            item.occurrences.to_string(),
        ]);
    }
    writeln!(writer, "{table}")?;

    let total: usize = summary.iter().map(|item| item.occurrences).sum();
    writeln!(writer, "{} rule(s) fired, {} replacement(s) in total.", summary.len(), total)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_each_rule_and_the_total() -> Result<()> {
        let summary = vec![
            TransformSummaryItem {
                stage: "common".to_string(),
                category: "excessive_punctuation".to_string(),
                pattern: "!{2,}".to_string(),
                occurrences: 2,
            },
            TransformSummaryItem {
                stage: "en".to_string(),
                category: "profanity".to_string(),
                pattern: r"\bshit\b".to_string(),
                occurrences: 1,
            },
        ];
        let mut out = Vec::new();
        print_summary(&summary, &mut out, false)?;
        let text = String::from_utf8(out)?;
        assert!(text.contains("excessive_punctuation"));
        assert!(text.contains("profanity"));
        assert!(text.contains("2 rule(s) fired, 3 replacement(s) in total."));
        Ok(())
    }
}
