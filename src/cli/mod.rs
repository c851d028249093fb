//! CLI module - argument parsing and command dispatch

pub mod args;
pub mod commands;
pub mod helpers;
pub mod select;

pub use args::{Cli, Commands, GlobalOpts, OutputFormat, PickArgs};
