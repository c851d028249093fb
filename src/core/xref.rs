//! Cross-reference extraction
//!
//! A cross-reference is the literal `xref:` followed by one or more characters
//! from `[A-Za-z0-9_\-/.]`. Nothing else of the AsciiDoc syntax is parsed.

use std::path::Path;

use crate::core::file;

/// Token prefix introducing a cross-reference
pub const XREF_PREFIX: &str = "xref:";

/// Whether `c` may appear in a cross-reference target
pub fn is_target_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '/' | '.')
}

/// Extract every cross-reference target in `text`, in order of appearance.
///
/// Duplicates are kept.
pub fn extract_xrefs(text: &str) -> Vec<String> {
    let mut targets = Vec::new();
    let mut rest = text;

    while let Some(pos) = rest.find(XREF_PREFIX) {
        let after = &rest[pos + XREF_PREFIX.len()..];
        let len = after
            .char_indices()
            .find(|&(_, c)| !is_target_char(c))
            .map_or(after.len(), |(i, _)| i);

        if len > 0 {
            targets.push(after[..len].to_string());
        }
        rest = &after[len..];
    }

    targets
}

/// Replace every reference whose whole target is `from` with one to `to`.
///
/// Returns `None` when `text` has no such reference. A longer target that
/// merely starts with `from` is left alone.
pub fn replace_target(text: &str, from: &str, to: &str) -> Option<String> {
    let needle = format!("{}{}", XREF_PREFIX, from);
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut replaced = false;

    while let Some(pos) = rest.find(&needle) {
        let end = pos + needle.len();
        out.push_str(&rest[..pos]);
        if rest[end..].starts_with(is_target_char) {
            out.push_str(&needle);
        } else {
            out.push_str(XREF_PREFIX);
            out.push_str(to);
            replaced = true;
        }
        rest = &rest[end..];
    }
    out.push_str(rest);

    replaced.then_some(out)
}

/// Read a note and extract its cross-references.
///
/// An unreadable file is logged and yields no references.
pub fn read_xrefs(path: &Path) -> Vec<String> {
    match file::read_text(path) {
        Ok(text) => extract_xrefs(&text),
        Err(e) => {
            tracing::warn!("{}", e);
            Vec::new()
        }
    }
}
