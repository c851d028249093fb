//! Tag and connectivity queries over an index

use std::collections::BTreeSet;

use crate::core::index::{Note, NoteIndex};
use crate::core::metadata::{self, Metadata};
use crate::core::xref;

/// Every tag used in the archive, sorted and unique
pub fn all_tags(index: &NoteIndex) -> BTreeSet<String> {
    index
        .notes()
        .iter()
        .flat_map(|note| metadata::read(note.path()).tags())
        .collect()
}

/// Notes carrying `tag`, in enumeration order
pub fn notes_with_tag<'a>(index: &'a NoteIndex, tag: &str) -> Vec<&'a Note> {
    index
        .notes()
        .iter()
        .filter(|note| metadata::read(note.path()).tags().iter().any(|t| t == tag))
        .collect()
}

/// Notes with no tags, whether they lack metadata entirely or only the `tags` field
pub fn tagless_notes(index: &NoteIndex) -> Vec<&Note> {
    index
        .notes()
        .iter()
        .filter(|note| metadata::read(note.path()).tags().is_empty())
        .collect()
}

/// Whether a note with `metadata` and `xref_count` outgoing references is isolated
pub fn is_isolated(metadata: &Metadata, xref_count: usize) -> bool {
    !metadata.is_empty() && metadata.backlinks().is_empty() && xref_count == 0
}

/// Notes that neither link anywhere nor are linked to.
///
/// Notes without usable metadata are left out: their backlinks are unknown.
pub fn isolated_notes(index: &NoteIndex) -> Vec<&Note> {
    index
        .notes()
        .iter()
        .filter(|note| {
            is_isolated(&metadata::read(note.path()), xref::read_xrefs(note.path()).len())
        })
        .collect()
}
