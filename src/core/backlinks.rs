//! Backlink indexing
//!
//! For every note, the file names of the notes whose cross-references validly
//! resolve to it are derived from the current link state and reconciled with
//! the `backlinks` field of its metadata. By default the stored list only
//! grows: entries may come from notes outside the scanned tree, so nothing is
//! removed unless [`Policy::Replace`] is chosen.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::PathBuf;

use crate::core::apply::{self, Change, Confirm, Mode, Outcome};
use crate::core::identity::NoteId;
use crate::core::index::NoteIndex;
use crate::core::links;
use crate::core::metadata::{self, Metadata};
use crate::core::xref;

/// How derived backlinks combine with the stored ones
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Policy {
    /// stored ∪ derived
    #[default]
    Union,
    /// derived only; stale entries are pruned
    Replace,
}

impl Policy {
    pub fn from_prune(prune: bool) -> Self {
        if prune {
            Policy::Replace
        } else {
            Policy::Union
        }
    }
}

/// Referencing file names per target note
#[derive(Debug, Clone, Default)]
pub struct DerivedBacklinks {
    map: HashMap<NoteId, BTreeSet<String>>,
}

impl DerivedBacklinks {
    /// Derived backlink names of `id`, sorted
    pub fn get(&self, id: &NoteId) -> Option<&BTreeSet<String>> {
        self.map.get(id)
    }
}

/// Scan every note's cross-references and collect valid, non-self references
pub fn derive_backlinks(index: &NoteIndex) -> DerivedBacklinks {
    let mut derived = DerivedBacklinks::default();

    for source in index.notes() {
        for target in xref::read_xrefs(source.path()) {
            let Some(note) = links::resolve(index, source, &target) else {
                continue;
            };
            if NoteIndex::same_note(source, note) {
                continue;
            }
            derived
                .map
                .entry(note.id().clone())
                .or_default()
                .insert(source.file_name());
        }
    }

    derived
}

/// A planned change to one note's `backlinks` field
#[derive(Debug, Clone)]
pub struct BacklinkUpdate {
    pub note: PathBuf,
    pub updated: Vec<String>,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    metadata: Metadata,
}

/// Updates to make plus notes that cannot take backlinks
#[derive(Debug, Clone, Default)]
pub struct BacklinkPlan {
    pub updates: Vec<BacklinkUpdate>,
    /// Notes with missing, empty or malformed metadata
    pub skipped: Vec<PathBuf>,
}

/// Combine stored and derived backlinks under `policy`.
///
/// Stored entries keep their order; new names follow in sorted order.
pub fn merge(stored: &[String], derived: &BTreeSet<String>, policy: Policy) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut merged: Vec<String> = stored
        .iter()
        .filter(|name| policy == Policy::Union || derived.contains(*name))
        .filter(|name| seen.insert(name.as_str()))
        .cloned()
        .collect();

    for name in derived {
        if seen.insert(name.as_str()) {
            merged.push(name.clone());
        }
    }
    merged
}

/// Compare each note's stored backlinks with the derived set
pub fn plan_updates(index: &NoteIndex, derived: &DerivedBacklinks, policy: Policy) -> BacklinkPlan {
    let empty = BTreeSet::new();
    let mut plan = BacklinkPlan::default();

    for note in index.notes() {
        let metadata = match metadata::load(note.path()) {
            Ok(m) if !m.is_empty() => m,
            Ok(_) => {
                tracing::warn!(
                    "skipping {}: no metadata block to hold backlinks",
                    note.path().display()
                );
                plan.skipped.push(note.path().to_path_buf());
                continue;
            }
            Err(e) => {
                tracing::warn!("skipping {}: {}", note.path().display(), e);
                plan.skipped.push(note.path().to_path_buf());
                continue;
            }
        };

        let stored = metadata.backlinks();
        let updated = merge(&stored, derived.get(note.id()).unwrap_or(&empty), policy);

        let before: HashSet<&String> = stored.iter().collect();
        let after: HashSet<&String> = updated.iter().collect();
        if before == after {
            continue;
        }

        let added = updated.iter().filter(|n| !before.contains(n)).cloned().collect();
        let removed = stored.iter().filter(|n| !after.contains(n)).cloned().collect();
        plan.updates.push(BacklinkUpdate {
            note: note.path().to_path_buf(),
            updated,
            added,
            removed,
            metadata,
        });
    }

    plan
}

/// One note's backlink update and what became of it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BacklinkResult {
    pub note: PathBuf,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub outcome: Outcome,
}

/// Result of a backlink pass
#[derive(Debug, Clone, Default)]
pub struct BacklinkReport {
    pub results: Vec<BacklinkResult>,
    pub skipped: Vec<PathBuf>,
}

impl BacklinkReport {
    pub fn count(&self, outcome: &Outcome) -> usize {
        self.results.iter().filter(|r| &r.outcome == outcome).count()
    }
}

/// Apply a plan under `mode`
pub fn apply_plan(plan: BacklinkPlan, mode: Mode, confirm: &mut dyn Confirm) -> BacklinkReport {
    let mut report = BacklinkReport {
        results: Vec::new(),
        skipped: plan.skipped,
    };

    for update in plan.updates {
        let change = Change::Backlinks {
            note: &update.note,
            added: &update.added,
            removed: &update.removed,
        };
        let outcome = apply::gate(mode, confirm, &change).unwrap_or_else(|| {
            let mut metadata = update.metadata.clone();
            metadata.set_backlinks(update.updated.clone());
            match metadata::write(&update.note, &metadata) {
                Ok(()) => Outcome::Applied,
                Err(e) => {
                    tracing::warn!("{}: {}", update.note.display(), e);
                    Outcome::Failed(e.to_string())
                }
            }
        });

        report.results.push(BacklinkResult {
            note: update.note,
            added: update.added,
            removed: update.removed,
            outcome,
        });
    }

    report
}

/// Derive, plan and apply backlinks for the whole index
pub fn update_backlinks(
    index: &NoteIndex,
    policy: Policy,
    mode: Mode,
    confirm: &mut dyn Confirm,
) -> BacklinkReport {
    let derived = derive_backlinks(index);
    let plan = plan_updates(index, &derived, policy);
    apply_plan(plan, mode, confirm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::apply::{AlwaysConfirm, Scripted};
    use crate::core::config::Config;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, body: &str) -> PathBuf {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, body).unwrap();
        path
    }

    fn index(root: &Path) -> NoteIndex {
        NoteIndex::build(root, &Config::default()).unwrap().0
    }

    #[test]
    fn test_merge_union_and_replace() {
        let stored = vec!["x.adoc".to_string(), "y.adoc".to_string()];
        let derived: BTreeSet<String> = ["z.adoc", "y.adoc"].iter().map(|s| s.to_string()).collect();

        assert_eq!(
            merge(&stored, &derived, Policy::Union),
            vec!["x.adoc", "y.adoc", "z.adoc"]
        );
        assert_eq!(
            merge(&stored, &derived, Policy::Replace),
            vec!["y.adoc", "z.adoc"]
        );
    }

    #[test]
    fn test_derive_ignores_self_and_broken_references() {
        let dir = tempdir().unwrap();
        write(
            dir.path(),
            "202401010000-a.adoc",
            "xref:202401010000-a.adoc[] xref:202401020000-b.adoc[] xref:gone.adoc[]",
        );
        write(dir.path(), "sub/202401030000-c.adoc", "xref:../202401020000-b.adoc[]");
        write(dir.path(), "202401020000-b.adoc", "");

        let index = index(dir.path());
        let derived = derive_backlinks(&index);

        let a = NoteId::parse("202401010000").unwrap();
        let b = NoteId::parse("202401020000").unwrap();
        assert!(derived.get(&a).is_none());
        let names: Vec<_> = derived.get(&b).unwrap().iter().cloned().collect();
        assert_eq!(names, vec!["202401010000-a.adoc", "202401030000-c.adoc"]);
    }

    #[test]
    fn test_union_keeps_stale_entries() {
        let dir = tempdir().unwrap();
        let a = write(dir.path(), "202401010000-a.adoc", "---\nbacklinks: [X.adoc]\n---\nbody\n");
        write(dir.path(), "202401020000-y.adoc", "---\ntags: t\n---\nxref:202401010000-a.adoc[]\n");

        let report = update_backlinks(&index(dir.path()), Policy::Union, Mode::Write, &mut AlwaysConfirm);
        assert_eq!(report.count(&Outcome::Applied), 1);

        let stored = metadata::read(&a).backlinks();
        assert_eq!(stored, vec!["X.adoc", "202401020000-y.adoc"]);
    }

    #[test]
    fn test_replace_prunes_stale_entries() {
        let dir = tempdir().unwrap();
        let a = write(dir.path(), "202401010000-a.adoc", "---\nbacklinks: [X.adoc]\n---\nbody\n");
        write(dir.path(), "202401020000-y.adoc", "xref:202401010000-a.adoc[]\n");

        update_backlinks(&index(dir.path()), Policy::Replace, Mode::Write, &mut AlwaysConfirm);
        assert_eq!(metadata::read(&a).backlinks(), vec!["202401020000-y.adoc"]);
    }

    #[test]
    fn test_unchanged_set_is_not_rewritten() {
        let dir = tempdir().unwrap();
        let body = "---\nbacklinks:\n- 202401020000-y.adoc\n---\nbody\n";
        let a = write(dir.path(), "202401010000-a.adoc", body);
        write(dir.path(), "202401020000-y.adoc", "xref:202401010000-a.adoc[]\n");

        let report = update_backlinks(&index(dir.path()), Policy::Union, Mode::Write, &mut AlwaysConfirm);
        assert!(report.results.is_empty());
        assert_eq!(fs::read_to_string(&a).unwrap(), body);
    }

    #[test]
    fn test_notes_without_metadata_are_skipped() {
        let dir = tempdir().unwrap();
        let body = "= No metadata\n";
        let a = write(dir.path(), "202401010000-a.adoc", body);
        write(dir.path(), "202401020000-y.adoc", "xref:202401010000-a.adoc[]\n");

        let report = update_backlinks(&index(dir.path()), Policy::Union, Mode::Write, &mut AlwaysConfirm);
        assert!(report.results.is_empty());
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(fs::read_to_string(&a).unwrap(), body);
    }

    #[test]
    fn test_dry_run_and_ask() {
        let dir = tempdir().unwrap();
        let body = "---\ntitle: A\n---\n";
        let a = write(dir.path(), "202401010000-a.adoc", body);
        write(dir.path(), "202401020000-y.adoc", "xref:202401010000-a.adoc[]\n");
        let index = index(dir.path());

        let report = update_backlinks(&index, Policy::Union, Mode::DryRun, &mut AlwaysConfirm);
        assert_eq!(report.count(&Outcome::Previewed), 1);
        assert_eq!(fs::read_to_string(&a).unwrap(), body);

        let mut script = Scripted::new([false]);
        let report = update_backlinks(&index, Policy::Union, Mode::Ask, &mut script);
        assert_eq!(report.count(&Outcome::Declined), 1);
        assert_eq!(fs::read_to_string(&a).unwrap(), body);
    }

    #[test]
    fn test_unwritable_note_is_skipped_and_run_continues() {
        let dir = tempdir().unwrap();
        let a = write(dir.path(), "202401010000-a.adoc", "---\ntitle: A\n---\n");
        let b = write(dir.path(), "202401010001-b.adoc", "---\ntitle: B\n---\n");
        write(
            dir.path(),
            "202401020000-y.adoc",
            "xref:202401010000-a.adoc[] xref:202401010001-b.adoc[]\n",
        );

        let index = index(dir.path());
        let plan = plan_updates(&index, &derive_backlinks(&index), Policy::Union);
        assert_eq!(plan.updates.len(), 2);

        // a directory in place of the note cannot be rewritten, even as root
        fs::remove_file(&a).unwrap();
        fs::create_dir(&a).unwrap();

        let report = apply_plan(plan, Mode::Write, &mut AlwaysConfirm);
        assert!(matches!(report.results[0].outcome, Outcome::Failed(_)));
        assert_eq!(report.results[1].outcome, Outcome::Applied);
        assert!(a.is_dir());
        assert_eq!(metadata::read(&b).backlinks(), vec!["202401020000-y.adoc"]);
    }
}
