//! Link integrity checking
//!
//! Every cross-reference is classified as valid (the target exists relative to
//! the referencing note), repairable (the target embeds the identifier of an
//! indexed note) or unresolvable.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::core::config::LinkStyle;
use crate::core::identity::NoteId;
use crate::core::index::{Note, NoteIndex};
use crate::core::xref;

/// Classification of one cross-reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum LinkStatus {
    Valid,
    Repairable { correction: String },
    Unresolvable,
}

/// A broken cross-reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Note containing the reference
    pub source: PathBuf,
    /// Target text as written after `xref:`
    pub target: String,
    #[serde(flatten)]
    pub status: LinkStatus,
}

impl Finding {
    pub fn correction(&self) -> Option<&str> {
        match &self.status {
            LinkStatus::Repairable { correction } => Some(correction),
            _ => None,
        }
    }
}

/// Result of checking every cross-reference in an archive
#[derive(Debug, Clone, Default, Serialize)]
pub struct LinkReport {
    /// Number of references examined
    pub checked: usize,
    /// Broken references in note order, then reference order
    pub findings: Vec<Finding>,
}

impl LinkReport {
    pub fn repairable(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.correction().is_some())
    }

    pub fn unresolvable(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.status == LinkStatus::Unresolvable)
    }

    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Directory cross-references in `note` are resolved against
fn base_dir<'a>(index: &'a NoteIndex, note: &'a Note) -> &'a Path {
    note.path().parent().unwrap_or(index.root())
}

/// Classify a single cross-reference found in `source`
pub fn classify(index: &NoteIndex, source: &Note, target: &str, style: LinkStyle) -> LinkStatus {
    let base = base_dir(index, source);
    if base.join(target).exists() {
        return LinkStatus::Valid;
    }

    let Some(note) = NoteId::find_in(target).and_then(|id| index.get(&id)) else {
        return LinkStatus::Unresolvable;
    };

    let correction = match style {
        LinkStyle::Root => index.root_relative(note),
        LinkStyle::Note => index.relative_from(base, note),
    };

    // Rewriting a target to itself fixes nothing.
    if correction == target {
        return LinkStatus::Unresolvable;
    }

    LinkStatus::Repairable { correction }
}

/// Resolve a cross-reference to the indexed note it points at, if it is valid
pub fn resolve<'a>(index: &'a NoteIndex, source: &Note, target: &str) -> Option<&'a Note> {
    let path = base_dir(index, source).join(target);
    if !path.exists() {
        return None;
    }
    index.note_at(&path)
}

/// Check every cross-reference of every indexed note
pub fn check_links(index: &NoteIndex, style: LinkStyle) -> LinkReport {
    let mut report = LinkReport::default();

    for note in index.notes() {
        for target in xref::read_xrefs(note.path()) {
            report.checked += 1;
            let status = classify(index, note, &target, style);
            if status != LinkStatus::Valid {
                report.findings.push(Finding {
                    source: note.path().to_path_buf(),
                    target,
                    status,
                });
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use std::fs;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, body).unwrap();
    }

    #[test]
    fn test_mismatched_name_is_repairable() {
        let dir = tempdir().unwrap();
        write(dir.path(), "202401010000-a.adoc", "xref:202401020000-b.adoc[]\n");
        write(dir.path(), "202401020000-c.adoc", "no links\n");

        let (index, _) = NoteIndex::build(dir.path(), &Config::default()).unwrap();
        let report = check_links(&index, LinkStyle::Root);

        assert_eq!(report.checked, 1);
        assert_eq!(report.findings.len(), 1);
        let finding = &report.findings[0];
        assert_eq!(finding.target, "202401020000-b.adoc");
        assert_eq!(finding.correction(), Some("202401020000-c.adoc"));
        assert!(finding.source.ends_with("202401010000-a.adoc"));
    }

    #[test]
    fn test_valid_and_unresolvable() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "202401010000-a.adoc",
            "xref:202401020000-b.adoc[] xref:missing.adoc[] xref:209901010000-x.adoc[]\n",
        );
        write(dir.path(), "202401020000-b.adoc", "");

        let (index, _) = NoteIndex::build(dir.path(), &Config::default()).unwrap();
        let report = check_links(&index, LinkStyle::Root);

        assert_eq!(report.checked, 3);
        let targets: Vec<_> = report.unresolvable().map(|f| f.target.as_str()).collect();
        assert_eq!(targets, vec!["missing.adoc", "209901010000-x.adoc"]);
        assert_eq!(report.repairable().count(), 0);
    }

    #[test]
    fn test_links_resolve_relative_to_note_directory() {
        let dir = tempdir().unwrap();
        write(dir.path(), "sub/202401010000-a.adoc", "xref:../202401020000-b.adoc[]\n");
        write(dir.path(), "202401020000-b.adoc", "");

        let (index, _) = NoteIndex::build(dir.path(), &Config::default()).unwrap();
        assert!(check_links(&index, LinkStyle::Root).is_clean());
    }

    #[test]
    fn test_note_style_correction_is_relative_to_source() {
        let dir = tempdir().unwrap();
        write(dir.path(), "sub/202401010000-a.adoc", "xref:202401020000-old.adoc[]\n");
        write(dir.path(), "other/202401020000-new.adoc", "");

        let (index, _) = NoteIndex::build(dir.path(), &Config::default()).unwrap();

        let root_style = check_links(&index, LinkStyle::Root);
        assert_eq!(
            root_style.findings[0].correction(),
            Some("other/202401020000-new.adoc")
        );

        let note_style = check_links(&index, LinkStyle::Note);
        assert_eq!(
            note_style.findings[0].correction(),
            Some("../other/202401020000-new.adoc")
        );
    }

    #[test]
    fn test_self_identical_correction_is_unresolvable() {
        let dir = tempdir().unwrap();
        // root-relative correction equals the written text but does not exist
        // relative to the subdirectory
        write(dir.path(), "sub/202401010000-a.adoc", "xref:202401020000-b.adoc[]\n");
        write(dir.path(), "202401020000-b.adoc", "");

        let (index, _) = NoteIndex::build(dir.path(), &Config::default()).unwrap();
        let report = check_links(&index, LinkStyle::Root);
        assert_eq!(report.unresolvable().count(), 1);
        assert_eq!(report.repairable().count(), 0);

        let report = check_links(&index, LinkStyle::Note);
        assert_eq!(
            report.findings[0].correction(),
            Some("../202401020000-b.adoc")
        );
    }

    #[test]
    fn test_resolve_finds_target_note() {
        let dir = tempdir().unwrap();
        write(dir.path(), "202401010000-a.adoc", "");
        write(dir.path(), "202401020000-b.adoc", "");
        write(dir.path(), "plain.adoc", "");

        let (index, _) = NoteIndex::build(dir.path(), &Config::default()).unwrap();
        let a = index.get(&NoteId::parse("202401010000").unwrap()).unwrap();

        let b = resolve(&index, a, "202401020000-b.adoc").unwrap();
        assert_eq!(b.id().as_str(), "202401020000");
        assert!(resolve(&index, a, "plain.adoc").is_none());
        assert!(resolve(&index, a, "nope.adoc").is_none());
    }
}
