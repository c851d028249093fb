//! zk: Zettelkasten note-graph toolkit
//!
//! Keeps a directory tree of plain-text notes consistent: notes are
//! identified by a 12-digit timestamp in their file name, carry a YAML
//! metadata block, and reference each other with `xref:` links.

pub mod cli;
pub mod core;
pub mod yaml;
