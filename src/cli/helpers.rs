//! Shared helper functions for CLI commands
//!
//! Configuration and index setup, conflict warnings, and list output used by
//! every command module.

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::core::index::{ConflictReport, Note, NoteIndex};

/// Layered configuration with the `--directory` flag applied last
pub fn load_config(global: &GlobalOpts) -> Config {
    let mut config = Config::load();
    if let Some(dir) = &global.directory {
        config.notes_directory = Some(dir.clone());
    }
    config
}

/// Build the note index for the configured root, warning about id conflicts.
///
/// Fails only when the root itself cannot be scanned.
pub fn open_index(config: &Config, global: &GlobalOpts) -> Result<(NoteIndex, ConflictReport)> {
    let root = config.notes_root();
    let (index, conflicts) = NoteIndex::build(&root, config).map_err(|e| miette::miette!("{}", e))?;

    if !global.quiet {
        print_conflicts(&index, &conflicts);
    }
    Ok((index, conflicts))
}

/// Print every identifier conflict to stderr
pub fn print_conflicts(index: &NoteIndex, conflicts: &ConflictReport) {
    for conflict in conflicts.iter() {
        eprintln!(
            "{} id {} is used by {} notes; using {}",
            style("!").yellow(),
            style(&conflict.id).cyan(),
            conflict.paths.len(),
            style(display_path(index, conflict.winner())).yellow()
        );
        for path in &conflict.paths {
            eprintln!("    {}", style(display_path(index, path)).dim());
        }
    }
}

/// Path of a note relative to the notes root, for display
pub fn display_path(index: &NoteIndex, path: &std::path::Path) -> String {
    path.strip_prefix(index.root())
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Display paths for a list of notes, in order
pub fn note_paths(index: &NoteIndex, notes: &[&Note]) -> Vec<String> {
    notes.iter().map(|n| index.root_relative(n)).collect()
}

/// Print a list of strings in the requested format
pub fn print_list<T: Serialize + std::fmt::Display>(items: &[T], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(items).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(items).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Auto => {
            for item in items {
                println!("{}", item);
            }
        }
    }
    Ok(())
}

/// Singular or plural noun for counts in summaries
pub fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{} {}", count, one)
    } else {
        format!("{} {}", count, many)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "note", "notes"), "1 note");
        assert_eq!(plural(0, "note", "notes"), "0 notes");
        assert_eq!(plural(3, "link", "links"), "3 links");
    }
}
