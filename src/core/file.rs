//! Whole-file note I/O
//!
//! Notes are always read and written in one piece. There is no temp-file
//! rename, so a crash mid-write can truncate a note.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Read a note's full text
pub fn read_text(path: &Path) -> Result<String, NoteError> {
    fs::read_to_string(path).map_err(|source| NoteError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Replace a note's full text
pub fn write_text(path: &Path, content: &str) -> Result<(), NoteError> {
    fs::write(path, content).map_err(|source| NoteError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Per-note I/O failure; never aborts a batch
#[derive(Debug, Error)]
pub enum NoteError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
