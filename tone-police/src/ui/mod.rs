// tone-police/src/ui/mod.rs
//! Terminal output helpers: diffs, summary tables and status lines.

pub mod diff_viewer;
pub mod output_format;
pub mod summary;
