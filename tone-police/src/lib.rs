// tone-police/src/lib.rs
//! # Tone Police CLI
//!
//! Command-line front end for `tone-police-core`. With no subcommand the
//! binary acts as a prompt hook (JSON in on stdin, optional JSON out on
//! stdout). `filter` and `validate` are for working on prompts and
//! dictionaries by hand.

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;
