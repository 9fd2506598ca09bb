// tone-police/src/commands/validate.rs
//! `validate`: offline integrity check of a dictionary directory.

use anyhow::{anyhow, Result};
use is_terminal::IsTerminal;
use log::info;
use std::io::{self, Write};
use std::path::PathBuf;

use tone_police_core::config::PLUGIN_ROOT_ENV;
use tone_police_core::{validate_directory, ConfigLocations, ValidationReport};

use crate::cli::ValidateCommand;
use crate::ui::output_format;

/// Directory to check: the flag, else the plugin's dictionaries.
pub fn target_directory(cmd: &ValidateCommand, locations: &ConfigLocations) -> Result<PathBuf> {
    cmd.dictionaries
        .clone()
        .or_else(|| locations.dictionaries_dir())
        .ok_or_else(|| anyhow!("No dictionary directory given; pass --dictionaries or set {}.", PLUGIN_ROOT_ENV))
}

/// Writes one line per issue and a closing status line.
pub fn write_report<W: Write>(report: &ValidationReport, writer: &mut W, supports_color: bool) -> Result<()> {
    for issue in &report.issues {
        output_format::print_error_message(writer, &issue.to_string(), supports_color)?;
    }
    if report.is_ok() {
        output_format::print_success_message(
            writer,
            &format!("{} file(s) checked, no problems found.", report.files_checked),
            supports_color,
        )?;
    } else {
        writeln!(
            writer,
            "{} file(s) checked, {} problem(s) found.",
            report.files_checked,
            report.issues.len()
        )?;
    }
    Ok(())
}

/// The `validate` command. Returns whether the directory is clean.
pub fn run_validate(cmd: &ValidateCommand, locations: &ConfigLocations) -> Result<bool> {
    let dir = target_directory(cmd, locations)?;
    info!("Validating dictionaries in {}", dir.display());
    let report = validate_directory(&dir)?;

    let stdout = io::stdout();
    let supports_color = stdout.is_terminal();
    write_report(&report, &mut stdout.lock(), supports_color)?;
    Ok(report.is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tone_police_core::ValidationIssue;

    #[test]
    fn flag_beats_plugin_root() -> Result<()> {
        let locations = ConfigLocations {
            plugin_root: Some(PathBuf::from("/plugin")),
            ..ConfigLocations::default()
        };
        let cmd = ValidateCommand {
            dictionaries: Some(PathBuf::from("/elsewhere")),
        };
        assert_eq!(target_directory(&cmd, &locations)?, PathBuf::from("/elsewhere"));
        assert_eq!(
            target_directory(&ValidateCommand::default(), &locations)?,
            PathBuf::from("/plugin").join("dictionaries")
        );
        assert!(target_directory(&ValidateCommand::default(), &ConfigLocations::default()).is_err());
        Ok(())
    }

    #[test]
    fn report_lists_issues_then_totals() -> Result<()> {
        let report = ValidationReport {
            files_checked: 2,
            issues: vec![ValidationIssue {
                resource: "en.json".to_string(),
                location: "light/profanity[0]".to_string(),
                message: "duplicate pattern 'x'".to_string(),
            }],
        };
        let mut out = Vec::new();
        write_report(&report, &mut out, false)?;
        assert_eq!(
            String::from_utf8(out)?,
            "error: en.json [light/profanity[0]]: duplicate pattern 'x'\n2 file(s) checked, 1 problem(s) found.\n"
        );
        Ok(())
    }
}
