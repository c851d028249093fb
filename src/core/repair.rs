//! Broken-link repair
//!
//! Only repairable findings are touched. Each one rewrites every occurrence of
//! `xref:<target>` in its note to `xref:<correction>`. After a pass in write
//! mode, checking again yields no repairable findings.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::core::apply::{self, Change, Confirm, Mode, Outcome};
use crate::core::file;
use crate::core::links::{Finding, LinkReport};
use crate::core::xref;

/// One attempted link correction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repair {
    pub note: PathBuf,
    pub from: String,
    pub to: String,
    pub outcome: Outcome,
}

/// Result of a repair pass
#[derive(Debug, Clone, Default)]
pub struct RepairReport {
    pub repairs: Vec<Repair>,
    /// Findings with no automatic fix, for the user to handle
    pub unresolvable: Vec<Finding>,
}

impl RepairReport {
    pub fn count(&self, outcome: &Outcome) -> usize {
        self.repairs.iter().filter(|r| &r.outcome == outcome).count()
    }

    pub fn failed(&self) -> usize {
        self.repairs
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Failed(_)))
            .count()
    }
}

/// Apply the repairable findings of `report` under `mode`
pub fn repair_links(report: &LinkReport, mode: Mode, confirm: &mut dyn Confirm) -> RepairReport {
    let mut result = RepairReport {
        repairs: Vec::new(),
        unresolvable: report.unresolvable().cloned().collect(),
    };
    let mut seen: HashSet<(&PathBuf, &str)> = HashSet::new();

    for finding in report.repairable() {
        if !seen.insert((&finding.source, finding.target.as_str())) {
            continue;
        }
        let Some(correction) = finding.correction() else {
            continue;
        };

        let change = Change::Relink {
            note: &finding.source,
            from: &finding.target,
            to: correction,
        };
        let outcome = apply::gate(mode, confirm, &change)
            .unwrap_or_else(|| rewrite(finding, correction));

        result.repairs.push(Repair {
            note: finding.source.clone(),
            from: finding.target.clone(),
            to: correction.to_string(),
            outcome,
        });
    }

    result
}

/// Replace the reference token in the note on disk
fn rewrite(finding: &Finding, correction: &str) -> Outcome {
    let content = match file::read_text(&finding.source) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("{}", e);
            return Outcome::Failed(e.to_string());
        }
    };

    let Some(updated) = xref::replace_target(&content, &finding.target, correction) else {
        return Outcome::Unchanged;
    };

    match file::write_text(&finding.source, &updated) {
        Ok(()) => Outcome::Applied,
        Err(e) => {
            tracing::warn!("{}", e);
            Outcome::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::apply::{AlwaysConfirm, Scripted};
    use crate::core::config::{Config, LinkStyle};
    use crate::core::index::NoteIndex;
    use crate::core::links::check_links;
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

    fn check(root: &Path) -> LinkReport {
        let (index, _) = NoteIndex::build(root, &Config::default()).unwrap();
        check_links(&index, LinkStyle::Root)
    }

    #[test]
    fn test_repair_is_idempotent() {
        let dir = tempdir().unwrap();
        let a = write(
            dir.path(),
            "202401010000-a.adoc",
            "See xref:wrong-202401020000-note.adoc[] and xref:wrong-202401020000-note.adoc[again].\n",
        );
        write(dir.path(), "202401020000-right.adoc", "");

        let first = repair_links(&check(dir.path()), Mode::Write, &mut AlwaysConfirm);
        assert_eq!(first.repairs.len(), 1);
        assert_eq!(first.repairs[0].outcome, Outcome::Applied);
        assert_eq!(
            fs::read_to_string(&a).unwrap(),
            "See xref:202401020000-right.adoc[] and xref:202401020000-right.adoc[again].\n"
        );

        let second = check(dir.path());
        assert_eq!(second.repairable().count(), 0);
        let second = repair_links(&second, Mode::Write, &mut AlwaysConfirm);
        assert!(second.repairs.is_empty());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = tempdir().unwrap();
        let body = "xref:202401020000-b.adoc[]\n";
        let a = write(dir.path(), "202401010000-a.adoc", body);
        write(dir.path(), "202401020000-c.adoc", "");

        let report = repair_links(&check(dir.path()), Mode::DryRun, &mut AlwaysConfirm);
        assert_eq!(report.count(&Outcome::Previewed), 1);
        assert_eq!(fs::read_to_string(&a).unwrap(), body);
    }

    #[test]
    fn test_ask_declines_only_that_change() {
        let dir = tempdir().unwrap();
        let a = write(dir.path(), "202401010000-a.adoc", "xref:202401020000-old.adoc[]\n");
        let b = write(dir.path(), "202401010001-b.adoc", "xref:202401020000-old.adoc[]\n");
        write(dir.path(), "202401020000-new.adoc", "");

        let mut script = Scripted::new([false, true]);
        let report = repair_links(&check(dir.path()), Mode::Ask, &mut script);

        assert_eq!(script.asked, 2);
        assert_eq!(report.repairs[0].outcome, Outcome::Declined);
        assert_eq!(report.repairs[1].outcome, Outcome::Applied);
        assert!(fs::read_to_string(&a).unwrap().contains("202401020000-old.adoc"));
        assert!(fs::read_to_string(&b).unwrap().contains("xref:202401020000-new.adoc[]"));
    }

    #[test]
    fn test_unresolvable_is_reported_not_fixed() {
        let dir = tempdir().unwrap();
        let body = "xref:nowhere.adoc[]\n";
        let a = write(dir.path(), "202401010000-a.adoc", body);

        let report = repair_links(&check(dir.path()), Mode::Write, &mut AlwaysConfirm);
        assert!(report.repairs.is_empty());
        assert_eq!(report.unresolvable.len(), 1);
        assert_eq!(fs::read_to_string(&a).unwrap(), body);
    }

    #[test]
    fn test_vanished_note_fails_without_aborting() {
        let dir = tempdir().unwrap();
        let a = write(dir.path(), "202401010000-a.adoc", "xref:202401020000-old.adoc[]\n");
        let b = write(dir.path(), "202401010001-b.adoc", "xref:202401020000-old.adoc[]\n");
        write(dir.path(), "202401020000-new.adoc", "");

        let report = check(dir.path());
        fs::remove_file(&a).unwrap();

        let result = repair_links(&report, Mode::Write, &mut AlwaysConfirm);
        assert_eq!(result.failed(), 1);
        assert_eq!(result.count(&Outcome::Applied), 1);
        assert!(fs::read_to_string(&b).unwrap().contains("xref:202401020000-new.adoc[]"));
    }

    #[test]
    fn test_unwritable_note_is_skipped_and_run_continues() {
        let dir = tempdir().unwrap();
        let a = write(dir.path(), "202401010000-a.adoc", "xref:202401020000-old.adoc[]\n");
        let b = write(dir.path(), "202401010001-b.adoc", "xref:202401020000-old.adoc[]\n");
        write(dir.path(), "202401020000-new.adoc", "");

        let report = check(dir.path());
        // a directory in place of the note cannot be rewritten, even as root
        fs::remove_file(&a).unwrap();
        fs::create_dir(&a).unwrap();

        let result = repair_links(&report, Mode::Write, &mut AlwaysConfirm);
        assert_eq!(result.repairs.len(), 2);
        assert!(matches!(result.repairs[0].outcome, Outcome::Failed(_)));
        assert_eq!(result.repairs[1].outcome, Outcome::Applied);
        assert!(a.is_dir());
        assert_eq!(
            fs::read_to_string(&b).unwrap(),
            "xref:202401020000-new.adoc[]\n"
        );
    }
}
