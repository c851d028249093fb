//! Note discovery: the identifier → file map
//!
//! The index is rebuilt from the filesystem on every run; nothing is persisted.
//! When two files carry the same identifier the later one in enumeration order
//! wins, and the collision is returned in a [`ConflictReport`] so callers can
//! surface it.

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

use crate::core::config::Config;
use crate::core::identity::NoteId;

/// An indexable note file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    id: NoteId,
    path: PathBuf,
    canonical: PathBuf,
}

impl Note {
    pub fn id(&self) -> &NoteId {
        &self.id
    }

    /// Path as enumerated under the canonical root
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name only, as stored in backlink lists
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn canonical(&self) -> &Path {
        &self.canonical
    }
}

/// Two or more files claiming one identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdConflict {
    pub id: NoteId,
    /// Candidates in enumeration order; the last one is the one indexed
    pub paths: Vec<PathBuf>,
}

impl IdConflict {
    pub fn winner(&self) -> &Path {
        self.paths.last().map(PathBuf::as_path).unwrap_or(Path::new(""))
    }
}

/// Identifier collisions found while building the index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use = "identifier conflicts must be reported to the user"]
pub struct ConflictReport {
    conflicts: Vec<IdConflict>,
}

impl ConflictReport {
    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IdConflict> {
        self.conflicts.iter()
    }
}

/// Identifier → note map for one archive root
#[derive(Debug, Clone)]
pub struct NoteIndex {
    root: PathBuf,
    notes: Vec<Note>,
    by_id: HashMap<NoteId, usize>,
    by_path: HashMap<PathBuf, usize>,
}

impl NoteIndex {
    /// Scan `root` recursively and index every note file.
    ///
    /// Only an inaccessible root is an error. Unreadable subdirectories are
    /// logged and skipped, and files without an identifier are not notes.
    pub fn build(root: &Path, config: &Config) -> Result<(Self, ConflictReport), IndexError> {
        let root = root
            .canonicalize()
            .map_err(|source| IndexError::RootNotFound {
                path: root.to_path_buf(),
                source,
            })?;
        if !root.is_dir() {
            return Err(IndexError::NotADirectory(root));
        }

        let mut notes: Vec<Note> = Vec::new();
        let mut by_id: HashMap<NoteId, usize> = HashMap::new();
        let mut candidates: HashMap<NoteId, Vec<PathBuf>> = HashMap::new();

        let walker = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e, config.skip_hidden));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() || !config.accepts_extension(entry.path()) {
                continue;
            }
            let Some(id) = NoteId::from_path(entry.path()) else {
                continue;
            };

            let path = entry.path().to_path_buf();
            let canonical = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
            candidates.entry(id.clone()).or_default().push(path.clone());

            let note = Note {
                id: id.clone(),
                path,
                canonical,
            };
            match by_id.get(&id) {
                Some(&slot) => notes[slot] = note,
                None => {
                    by_id.insert(id, notes.len());
                    notes.push(note);
                }
            }
        }

        let by_path = notes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.canonical.clone(), i))
            .collect();

        let conflicts = notes
            .iter()
            .filter_map(|n| {
                let paths = candidates.remove(&n.id)?;
                (paths.len() > 1).then(|| IdConflict {
                    id: n.id.clone(),
                    paths,
                })
            })
            .collect();

        tracing::debug!("indexed {} note(s) under {}", notes.len(), root.display());

        Ok((
            Self {
                root,
                notes,
                by_id,
                by_path,
            },
            ConflictReport { conflicts },
        ))
    }

    /// Canonical archive root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Notes in enumeration order
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.by_id.get(id).map(|&i| &self.notes[i])
    }

    /// Look up the note a path on disk refers to, if it is an indexed note
    pub fn note_at(&self, path: &Path) -> Option<&Note> {
        let canonical = fs::canonicalize(path).ok()?;
        self.by_path.get(&canonical).map(|&i| &self.notes[i])
    }

    /// Whether `a` and `b` are the same indexed file
    pub fn same_note(a: &Note, b: &Note) -> bool {
        a.canonical() == b.canonical()
    }

    /// Path of `note` relative to the archive root, forward-slash separated
    pub fn root_relative(&self, note: &Note) -> String {
        let rel = note.path.strip_prefix(&self.root).unwrap_or(&note.path);
        to_forward_slashes(rel)
    }

    /// Path of `note` relative to the directory `from`, forward-slash separated
    pub fn relative_from(&self, from: &Path, note: &Note) -> String {
        let from: Vec<Component<'_>> = from.components().collect();
        let to: Vec<Component<'_>> = note.path.components().collect();
        let common = from
            .iter()
            .zip(to.iter())
            .take_while(|(a, b)| a == b)
            .count();

        let mut parts: Vec<String> = Vec::new();
        for _ in common..from.len() {
            parts.push("..".to_string());
        }
        for component in &to[common..] {
            parts.push(component.as_os_str().to_string_lossy().into_owned());
        }
        parts.join("/")
    }
}

fn to_forward_slashes(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// `.git` is always skipped; other dot directories only with `skip_hidden`
fn is_skipped_dir(entry: &DirEntry, skip_hidden: bool) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    match entry.file_name().to_str() {
        Some(".git") => true,
        Some(name) => skip_hidden && name.starts_with('.'),
        None => false,
    }
}

/// Errors that abort index construction
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("notes directory {path:?} is not accessible: {source}")]
    RootNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("notes directory {0:?} is not a directory")]
    NotADirectory(PathBuf),
}
