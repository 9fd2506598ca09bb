// tone-police/src/ui/diff_viewer.rs
//! Unified diff between a prompt and its adjusted form.

use anyhow::Result;
use diffy::{create_patch, Line as DiffLine};
use owo_colors::OwoColorize;
use std::io::Write;

/// Writes a unified diff of `original` against `adjusted`.
///
/// Removed lines are red and added lines green when `supports_color` is set.
pub fn print_diff<W: Write>(original: &str, adjusted: &str, writer: &mut W, supports_color: bool) -> Result<()> {
    let patch = create_patch(original, adjusted);
    if patch.hunks().is_empty() {
        writeln!(writer, "No changes.")?;
        return Ok(());
    }

    let header = ["--- original", "+++ adjusted"];
    for line in header {
        if supports_color {
            writeln!(writer, "{}", line.bold())?;
        } else {
            writeln!(writer, "{}", line)?;
        }
    }

    for hunk in patch.hunks() {
        let old = hunk.old_range();
        let new = hunk.new_range();
        let range = format!("@@ -{},{} +{},{} @@", old.start(), old.len(), new.start(), new.len());
        if supports_color {
            writeln!(writer, "{}", range.cyan())?;
        } else {
            writeln!(writer, "{}", range)?;
        }

        for line_change in hunk.lines() {
            match line_change {
                DiffLine::Delete(s) => {
                    let text = format!("-{}", s.trim_end_matches('\n'));
                    if supports_color {
                        writeln!(writer, "{}", text.red())?;
                    } else {
                        writeln!(writer, "{}", text)?;
                    }
                }
                DiffLine::Insert(s) => {
                    let text = format!("+{}", s.trim_end_matches('\n'));
                    if supports_color {
                        writeln!(writer, "{}", text.green())?;
                    } else {
                        writeln!(writer, "{}", text)?;
                    }
                }
                DiffLine::Context(s) => {
                    writeln!(writer, " {}", s.trim_end_matches('\n'))?;
                }
            }
        }
    }
    Ok(())
}
