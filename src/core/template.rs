//! New-note rendering
//!
//! The body comes from `<templates_directory>/note.<ext>` when present, else
//! from the embedded default. The metadata block is written through the
//! metadata store so it always parses.

use chrono::{DateTime, Local};
use rust_embed::Embed;
use serde_yml::Value;
use std::path::{Path, PathBuf};
use tera::Tera;
use thiserror::Error;

use crate::core::config::Config;
use crate::core::file::{self, NoteError};
use crate::core::identity::NoteId;
use crate::core::metadata::{Metadata, MetadataError};

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

const DEFAULT_TEMPLATE: &str = "note.tera";
const TEMPLATE_NAME: &str = "note";

/// Note template loaded into Tera
pub struct NoteTemplate {
    tera: Tera,
}

impl NoteTemplate {
    /// Load the user's template for `extension`, falling back to the embedded one
    pub fn load(config: &Config, extension: &str) -> Result<Self, TemplateError> {
        let user = config
            .templates_directory
            .as_ref()
            .map(|dir| dir.join(format!("note.{}", extension)))
            .filter(|path| path.is_file());

        let source = match user {
            Some(path) => file::read_text(&path)?,
            None => {
                let embedded = EmbeddedTemplates::get(DEFAULT_TEMPLATE)
                    .ok_or_else(|| TemplateError::NotFound(DEFAULT_TEMPLATE.to_string()))?;
                String::from_utf8_lossy(&embedded.data).into_owned()
            }
        };

        Self::from_source(&source)
    }

    pub fn from_source(source: &str) -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, source)
            .map_err(|e| TemplateError::Render(e.to_string()))?;
        Ok(Self { tera })
    }

    /// Render a complete note: metadata block followed by the template body
    pub fn render(
        &self,
        id: &NoteId,
        title: &str,
        tags: &[String],
        created: &DateTime<Local>,
    ) -> Result<String, TemplateError> {
        let mut context = tera::Context::new();
        context.insert("id", id.as_str());
        context.insert("title", title);
        context.insert("tags", tags);
        context.insert("created", &created.format("%Y-%m-%d %H:%M").to_string());
        context.insert("date", &created.format("%Y-%m-%d").to_string());

        let rendered = self
            .tera
            .render(TEMPLATE_NAME, &context)
            .map_err(|e| TemplateError::Render(e.to_string()))?;

        // A template may carry its own block; our fields only fill the gaps.
        let mut metadata = Metadata::parse(&rendered, TEMPLATE_NAME)?.unwrap_or_default();
        let defaults = [
            ("title", Value::String(title.to_string())),
            (
                "tags",
                Value::Sequence(tags.iter().cloned().map(Value::String).collect()),
            ),
            ("backlinks", Value::Sequence(Vec::new())),
            (
                "created",
                Value::String(created.format("%Y-%m-%d %H:%M").to_string()),
            ),
        ];
        for (key, value) in defaults {
            if metadata.get(key).is_none() {
                metadata.insert(key, value);
            }
        }

        Ok(metadata.apply_to(&rendered)?)
    }
}

/// Lowercase, hyphen-separated form of a title for file names
pub fn slugify(title: &str) -> String {
    let mut slug = String::new();
    for c in title.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// File name for a new note
pub fn note_file_name(id: &NoteId, title: &str, extension: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        format!("{}.{}", id, extension)
    } else {
        format!("{}-{}.{}", id, slug, extension)
    }
}

/// Create a new note in `dir`, stamped with `now`
pub fn create_note(
    dir: &Path,
    config: &Config,
    title: &str,
    tags: &[String],
    now: &DateTime<Local>,
) -> Result<PathBuf, TemplateError> {
    let extension = config.default_extension();
    let id = NoteId::from_timestamp(now);
    let path = dir.join(note_file_name(&id, title, extension));
    if path.exists() {
        return Err(TemplateError::Exists(path));
    }

    let template = NoteTemplate::load(config, extension)?;
    let content = template.render(&id, title, tags, now)?;
    file::write_text(&path, &content)?;
    Ok(path)
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template not found: {0}")]
    NotFound(String),

    #[error("template rendering error: {0}")]
    Render(String),

    #[error("note already exists: {0:?}")]
    Exists(PathBuf),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Io(#[from] NoteError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::tempdir;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Rust -- ownership  "), "rust-ownership");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn test_note_file_name() {
        let id = NoteId::parse("202405170930").unwrap();
        assert_eq!(note_file_name(&id, "My Idea", "adoc"), "202405170930-my-idea.adoc");
        assert_eq!(note_file_name(&id, "", "adoc"), "202405170930.adoc");
    }

    #[test]
    fn test_create_note_with_embedded_template() {
        let dir = tempdir().unwrap();
        let tags = vec!["rust".to_string()];
        let path = create_note(dir.path(), &Config::default(), "Ownership: basics", &tags, &now())
            .unwrap();

        assert!(path.ends_with("202405170930-ownership-basics.adoc"));
        let m = metadata::read(&path);
        assert_eq!(m.get("title").and_then(|v| v.as_str()), Some("Ownership: basics"));
        assert_eq!(m.tags(), vec!["rust"]);
        assert!(m.backlinks().is_empty());
        assert!(fs::read_to_string(&path).unwrap().contains("= Ownership: basics"));

        let again = create_note(dir.path(), &Config::default(), "Ownership: basics", &tags, &now());
        assert!(matches!(again, Err(TemplateError::Exists(_))));
    }

    #[test]
    fn test_user_template_block_is_kept() {
        let dir = tempdir().unwrap();
        let templates = dir.path().join("templates");
        fs::create_dir_all(&templates).unwrap();
        fs::write(
            templates.join("note.adoc"),
            "---\nkind: literature\ntags: [source]\n---\n\n= {{ title }} ({{ id }})\n",
        )
        .unwrap();

        let mut config = Config::default();
        config.templates_directory = Some(templates);
        let path = create_note(dir.path(), &config, "Book", &["ignored".to_string()], &now())
            .unwrap();

        let m = metadata::read(&path);
        assert_eq!(m.get("kind").and_then(|v| v.as_str()), Some("literature"));
        assert_eq!(m.tags(), vec!["source"]);
        assert_eq!(m.get("title").and_then(|v| v.as_str()), Some("Book"));
        assert!(fs::read_to_string(&path).unwrap().contains("= Book (202405170930)"));
    }
}
