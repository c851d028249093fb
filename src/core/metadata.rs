//! Metadata store: the YAML block at the start of a note
//!
//! A block starts at byte 0 with a `---` line and ends at the next `---` line
//! followed by a line break:
//!
//! ```text
//! ---
//! tags: [idea, rust]
//! backlinks: [202401010000-a.adoc]
//! ---
//! body...
//! ```
//!
//! Keys other than `tags` and `backlinks` are carried through untouched.

use miette::Diagnostic;
use serde_yml::{Mapping, Value};
use std::path::Path;
use thiserror::Error;

use crate::core::file::{self, NoteError};
use crate::yaml::MetadataSyntaxError;

/// Delimiter line opening and closing a metadata block
pub const DELIMITER: &str = "---";

const OPEN: &str = "---\n";
const CLOSE: &str = "\n---\n";

/// Location of a metadata block inside a note's text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontMatter<'a> {
    /// Block body between the delimiter lines
    pub yaml: &'a str,
    /// Byte offset just past the closing delimiter line
    pub end: usize,
}

/// Locate the metadata block anchored at the start of `content`
pub fn split_front_matter(content: &str) -> Option<FrontMatter<'_>> {
    let rest = content.strip_prefix(OPEN)?;
    if rest.starts_with(OPEN) {
        return Some(FrontMatter {
            yaml: "",
            end: OPEN.len() * 2,
        });
    }
    let close = rest.find(CLOSE)?;
    Some(FrontMatter {
        yaml: &rest[..close],
        end: OPEN.len() + close + CLOSE.len(),
    })
}

/// Ordered key-value metadata of one note
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    fields: Mapping,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the metadata block of a note's text.
    ///
    /// Returns `Ok(None)` when the text has no block, and an error when the
    /// block exists but is not a YAML mapping.
    pub fn parse(content: &str, filename: &str) -> Result<Option<Self>, MetadataError> {
        let Some(front) = split_front_matter(content) else {
            return Ok(None);
        };

        if front.yaml.trim().is_empty() {
            return Ok(Some(Self::new()));
        }

        let value: Value = serde_yml::from_str(front.yaml).map_err(|e| {
            MetadataError::Syntax(MetadataSyntaxError::from_serde_error(&e, content, filename, 1))
        })?;

        match value {
            Value::Null => Ok(Some(Self::new())),
            Value::Mapping(fields) => Ok(Some(Self { fields })),
            _ => Err(MetadataError::NotAMapping(filename.to_string())),
        }
    }

    pub fn mapping(&self) -> &Mapping {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Set a field; an existing key keeps its position
    pub fn insert(&mut self, key: &str, value: Value) {
        self.fields.insert(Value::String(key.to_string()), value);
    }

    /// Tags as a list, whether stored as a list or a space-delimited string
    pub fn tags(&self) -> Vec<String> {
        match self.get("tags") {
            Some(Value::String(s)) => s.split_whitespace().map(String::from).collect(),
            Some(value) => string_list(value),
            None => Vec::new(),
        }
    }

    /// Stored backlink file names
    pub fn backlinks(&self) -> Vec<String> {
        match self.get("backlinks") {
            Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
            Some(value) => string_list(value),
            None => Vec::new(),
        }
    }

    pub fn set_backlinks(&mut self, backlinks: Vec<String>) {
        let items = backlinks.into_iter().map(Value::String).collect();
        self.insert("backlinks", Value::Sequence(items));
    }

    /// Serialize the fields as a YAML document body (no delimiters)
    pub fn to_yaml(&self) -> Result<String, MetadataError> {
        let yaml = serde_yml::to_string(&self.fields).map_err(MetadataError::Serialize)?;
        let yaml = yaml.strip_prefix(OPEN).unwrap_or(&yaml);
        Ok(yaml.trim_end().to_string())
    }

    /// Return `content` with this metadata as its block.
    ///
    /// An existing block is replaced in place; otherwise a new block and a
    /// blank line are prepended to the untouched text.
    pub fn apply_to(&self, content: &str) -> Result<String, MetadataError> {
        let block = format!("{DELIMITER}\n{}\n{DELIMITER}\n", self.to_yaml()?);
        Ok(match split_front_matter(content) {
            Some(front) => format!("{}{}", block, &content[front.end..]),
            None => format!("{}\n{}", block, content),
        })
    }
}

fn string_list(value: &Value) -> Vec<String> {
    let Some(items) = value.as_sequence() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
        .collect()
}

/// Read a note's metadata strictly. A note without a block has empty metadata.
pub fn load(path: &Path) -> Result<Metadata, MetadataError> {
    let content = file::read_text(path)?;
    let filename = path.display().to_string();
    Ok(Metadata::parse(&content, &filename)?.unwrap_or_default())
}

/// Read a note's metadata, degrading every failure to empty metadata.
pub fn read(path: &Path) -> Metadata {
    match load(path) {
        Ok(metadata) => metadata,
        Err(e) => {
            tracing::warn!("{}: {}", path.display(), e);
            Metadata::new()
        }
    }
}

/// Write `metadata` into the note at `path`
pub fn write(path: &Path, metadata: &Metadata) -> Result<(), MetadataError> {
    let content = file::read_text(path)?;
    let updated = metadata.apply_to(&content)?;
    file::write_text(path, &updated)?;
    Ok(())
}

/// Errors from reading or writing a metadata block
#[derive(Debug, Error, Diagnostic)]
pub enum MetadataError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(MetadataSyntaxError),

    #[error("metadata block in {0} is not a key-value mapping")]
    #[diagnostic(code(zk::metadata::shape))]
    NotAMapping(String),

    #[error("failed to serialize metadata: {0}")]
    Serialize(#[source] serde_yml::Error),

    #[error(transparent)]
    Io(#[from] NoteError),
}
