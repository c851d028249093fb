//! Configuration management with layered hierarchy
//!
//! A [`Config`] is built once at process entry and handed to every component
//! that needs it. Nothing in the core reads configuration from global state.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// How link corrections are written back into notes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LinkStyle {
    /// Path relative to the archive root, forward slashes
    #[default]
    Root,
    /// Path relative to the directory of the note holding the link
    Note,
}

/// Which interactive picker the CLI uses for `-i`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SelectorKind {
    /// External `fzf` process
    #[default]
    Fzf,
    /// In-terminal fuzzy picker
    Builtin,
}

/// zk configuration with layered hierarchy
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Root directory containing the notes
    pub notes_directory: Option<PathBuf>,

    /// Editor command for opening notes
    pub editor: Option<String>,

    /// Directory holding note templates for `zk new`
    pub templates_directory: Option<PathBuf>,

    /// File extensions treated as notes (empty = any extension)
    pub extensions: Vec<String>,

    /// Interactive picker
    pub selector: SelectorKind,

    /// How repaired links are written
    pub link_style: LinkStyle,

    /// Replace stored backlinks with the derived set instead of merging
    pub prune_backlinks: bool,

    /// Leave out every dot directory when scanning, not just `.git`
    pub skip_hidden: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notes_directory: None,
            editor: None,
            templates_directory: None,
            extensions: vec!["adoc".to_string()],
            selector: SelectorKind::default(),
            link_style: LinkStyle::default(),
            prune_backlinks: false,
            skip_hidden: false,
        }
    }
}

/// Partial config as read from a file; only present keys override
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigLayer {
    notes_directory: Option<PathBuf>,
    editor: Option<String>,
    templates_directory: Option<PathBuf>,
    extensions: Option<Vec<String>>,
    selector: Option<SelectorKind>,
    link_style: Option<LinkStyle>,
    prune_backlinks: Option<bool>,
    skip_hidden: Option<bool>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/zk/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                match Self::read_layer(&global_path) {
                    Ok(layer) => config.merge(layer),
                    Err(e) => tracing::warn!("ignoring config file: {}", e),
                }
            }
        }

        // 3. Environment variables
        if let Ok(dir) = std::env::var("ZK_NOTES_DIR") {
            config.notes_directory = Some(PathBuf::from(dir));
        }
        if let Ok(editor) = std::env::var("ZK_EDITOR") {
            config.editor = Some(editor);
        }

        config
    }

    /// Load a single config file strictly, on top of the built-in defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.merge(Self::read_layer(path)?);
        Ok(config)
    }

    fn read_layer(path: &Path) -> Result<ConfigLayer, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Ok(ConfigLayer::default());
        }
        serde_yml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "zk")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge a file layer into this config (layer takes precedence)
    fn merge(&mut self, other: ConfigLayer) {
        if other.notes_directory.is_some() {
            self.notes_directory = other.notes_directory;
        }
        if other.editor.is_some() {
            self.editor = other.editor;
        }
        if other.templates_directory.is_some() {
            self.templates_directory = other.templates_directory;
        }
        if let Some(extensions) = other.extensions {
            self.extensions = extensions;
        }
        if let Some(selector) = other.selector {
            self.selector = selector;
        }
        if let Some(link_style) = other.link_style {
            self.link_style = link_style;
        }
        if let Some(prune) = other.prune_backlinks {
            self.prune_backlinks = prune;
        }
        if let Some(skip) = other.skip_hidden {
            self.skip_hidden = skip;
        }
    }

    /// The notes root, falling back to the current directory
    pub fn notes_root(&self) -> PathBuf {
        self.notes_directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Extension used for newly created notes
    pub fn default_extension(&self) -> &str {
        self.extensions
            .first()
            .map(String::as_str)
            .unwrap_or("adoc")
    }

    /// Whether a file path carries one of the configured note extensions
    pub fn accepts_extension(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|want| want == ext))
    }

    /// Get the editor command
    pub fn editor(&self) -> String {
        self.editor
            .clone()
            .or_else(|| std::env::var("EDITOR").ok())
            .or_else(|| std::env::var("VISUAL").ok())
            .unwrap_or_else(|| "vi".to_string())
    }
}

/// Errors raised while reading a config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },
}
