//! CLI command implementations

pub mod check;
pub mod completions;
pub mod files;
pub mod fix_links;
pub mod new;
pub mod tags;
