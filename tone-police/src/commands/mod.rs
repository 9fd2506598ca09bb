// tone-police/src/commands/mod.rs
pub mod filter;
pub mod hook;
pub mod validate;
