//! How planned changes get applied: write, preview, or ask per change

use std::fmt;
use std::path::Path;

/// Write mode shared by link repair and backlink indexing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Write every change
    #[default]
    Write,
    /// Report changes, write nothing
    DryRun,
    /// Ask before each change; a refusal skips only that change
    Ask,
}

impl Mode {
    /// Mode from the `--dry-run` / `--ask` flags; dry-run wins
    pub fn from_flags(dry_run: bool, ask: bool) -> Self {
        if dry_run {
            Mode::DryRun
        } else if ask {
            Mode::Ask
        } else {
            Mode::Write
        }
    }
}

/// A single change about to be made to a note
#[derive(Debug, Clone, Copy)]
pub enum Change<'a> {
    Relink {
        note: &'a Path,
        from: &'a str,
        to: &'a str,
    },
    Backlinks {
        note: &'a Path,
        added: &'a [String],
        removed: &'a [String],
    },
}

impl fmt::Display for Change<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::Relink { note, from, to } => {
                write!(f, "{} → {} in {}", from, to, note.display())
            }
            Change::Backlinks {
                note,
                added,
                removed,
            } => {
                write!(f, "backlinks of {}", note.display())?;
                if !added.is_empty() {
                    write!(f, " +[{}]", added.join(", "))?;
                }
                if !removed.is_empty() {
                    write!(f, " -[{}]", removed.join(", "))?;
                }
                Ok(())
            }
        }
    }
}

/// Capability asked before each change in [`Mode::Ask`]
pub trait Confirm {
    fn confirm(&mut self, change: &Change<'_>) -> bool;
}

/// Confirms everything; used when no prompt is possible
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&mut self, _change: &Change<'_>) -> bool {
        true
    }
}

/// What happened to one planned change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Dry run: would have been applied
    Previewed,
    /// Refused at the prompt
    Declined,
    /// Nothing left to change on disk
    Unchanged,
    Failed(String),
}

/// Decide whether to write a change under `mode`.
///
/// Returns the outcome to report instead of writing, or `None` to go ahead.
pub fn gate(mode: Mode, confirm: &mut dyn Confirm, change: &Change<'_>) -> Option<Outcome> {
    match mode {
        Mode::DryRun => Some(Outcome::Previewed),
        Mode::Ask if !confirm.confirm(change) => Some(Outcome::Declined),
        Mode::Ask | Mode::Write => None,
    }
}

/// Confirmer answering from a fixed script
#[cfg(test)]
#[derive(Debug, Default)]
pub struct Scripted {
    answers: std::collections::VecDeque<bool>,
    pub asked: usize,
}

#[cfg(test)]
impl Scripted {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: 0,
        }
    }
}

#[cfg(test)]
impl Confirm for Scripted {
    fn confirm(&mut self, _change: &Change<'_>) -> bool {
        self.asked += 1;
        self.answers.pop_front().unwrap_or(false)
    }
}
