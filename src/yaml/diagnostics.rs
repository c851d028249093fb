//! Diagnostics for malformed metadata blocks

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// YAML syntax error inside a note's metadata block, located in the note file
#[derive(Debug, Error, Diagnostic)]
#[error("malformed metadata block: {message}")]
#[diagnostic(code(zk::metadata::syntax))]
pub struct MetadataSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    /// The underlying parser message
    message: String,
}

impl MetadataSyntaxError {
    /// Build from a serde_yml error raised while parsing the block body.
    ///
    /// `line_offset` is the number of file lines preceding the block body
    /// (the opening delimiter), so the label lands on the right line of the note.
    pub fn from_serde_error(
        err: &serde_yml::Error,
        source: &str,
        filename: &str,
        line_offset: usize,
    ) -> Self {
        let (line, column) = err
            .location()
            .map(|loc| (loc.line(), loc.column()))
            .unwrap_or((1, 1));

        let offset = line_col_to_offset(source, line + line_offset, column);
        let message = err.to_string();
        let help = generate_help(&message);

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1)),
            help,
            message,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Convert line/column to byte offset
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    let mut current_line = 1;

    for (i, ch) in source.char_indices() {
        if current_line == line {
            let line_start = i;
            let mut col = 1;
            for (j, c) in source[line_start..].char_indices() {
                if col == column {
                    return line_start + j;
                }
                if c == '\n' {
                    break;
                }
                col += 1;
            }
            return line_start + column.saturating_sub(1);
        }
        if ch == '\n' {
            current_line += 1;
        }
        offset = i;
    }

    offset
}

/// Generate helpful suggestions based on error message
fn generate_help(message: &str) -> Option<String> {
    let msg_lower = message.to_lowercase();

    if msg_lower.contains("tab") {
        return Some(
            "YAML requires spaces for indentation, not tabs. Replace tabs with spaces.".to_string(),
        );
    }

    if msg_lower.contains("duplicate") {
        return Some("Each key can only appear once in the metadata block.".to_string());
    }

    if msg_lower.contains("expected ','") || msg_lower.contains("flow sequence") {
        return Some("Separate list items with commas: tags: [one, two]".to_string());
    }

    if msg_lower.contains("mapping values are not allowed") {
        return Some(
            "Quote values containing ': ', e.g. title: \"Part 1: Overview\"".to_string(),
        );
    }

    if msg_lower.contains("block end") || msg_lower.contains("indentation") {
        return Some("Check your indentation - it may be inconsistent.".to_string());
    }

    None
}
