//! `zk fix-links` command - Repair broken xref links and update backlinks

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::cli::helpers::{display_path, load_config, open_index, plural};
use crate::cli::select::PromptConfirm;
use crate::core::apply::{AlwaysConfirm, Change, Confirm, Mode, Outcome};
use crate::core::backlinks::{update_backlinks, BacklinkReport, Policy};
use crate::core::config::LinkStyle;
use crate::core::index::NoteIndex;
use crate::core::links::check_links;
use crate::core::repair::{repair_links, RepairReport};

#[derive(clap::Args, Debug)]
pub struct FixLinksArgs {
    /// Preview changes without modifying files
    #[arg(long)]
    pub dry_run: bool,

    /// Ask before applying each fix
    #[arg(long)]
    pub ask: bool,

    /// Drop stored backlinks that no longer resolve
    #[arg(long)]
    pub prune: bool,

    /// How corrections are written (default: from config)
    #[arg(long, value_enum)]
    pub link_style: Option<LinkStyle>,
}

#[derive(Serialize)]
struct ChangeEntry {
    note: String,
    change: String,
    outcome: String,
}

#[derive(Serialize)]
struct FixSummary {
    dry_run: bool,
    links: Vec<ChangeEntry>,
    backlinks: Vec<ChangeEntry>,
    unresolvable: Vec<ChangeEntry>,
    skipped: Vec<String>,
}

pub fn run(args: FixLinksArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let (index, _conflicts) = open_index(&config, global)?;
    let mode = Mode::from_flags(args.dry_run, args.ask);
    let link_style = args.link_style.unwrap_or(config.link_style);
    let policy = Policy::from_prune(args.prune || config.prune_backlinks);

    let mut prompt = PromptConfirm;
    let mut always = AlwaysConfirm;
    let confirm: &mut dyn Confirm = match mode {
        Mode::Ask => &mut prompt,
        _ => &mut always,
    };

    let links = check_links(&index, link_style);
    let repairs = repair_links(&links, mode, confirm);
    // Derived from the files as they are after repair
    let backlinks = update_backlinks(&index, policy, mode, confirm);

    let summary = summarize(&index, mode, &repairs, &backlinks);
    match global.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary).into_diagnostic()?),
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&summary).into_diagnostic()?),
        OutputFormat::Auto => print_human(&summary, global.quiet),
    }

    let failed = repairs.failed()
        + backlinks
            .results
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Failed(_)))
            .count();
    if failed > 0 {
        return Err(miette::miette!(
            "{} could not be written",
            plural(failed, "change", "changes")
        ));
    }
    Ok(())
}

fn outcome_label(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Applied => "applied".to_string(),
        Outcome::Previewed => "dry-run".to_string(),
        Outcome::Declined => "declined".to_string(),
        Outcome::Unchanged => "unchanged".to_string(),
        Outcome::Failed(e) => format!("failed: {}", e),
    }
}

fn summarize(
    index: &NoteIndex,
    mode: Mode,
    repairs: &RepairReport,
    backlinks: &BacklinkReport,
) -> FixSummary {
    FixSummary {
        dry_run: mode == Mode::DryRun,
        links: repairs
            .repairs
            .iter()
            .map(|r| ChangeEntry {
                note: display_path(index, &r.note),
                change: format!("{} → {}", r.from, r.to),
                outcome: outcome_label(&r.outcome),
            })
            .collect(),
        backlinks: backlinks
            .results
            .iter()
            .map(|r| {
                let note = display_path(index, &r.note);
                let change = Change::Backlinks {
                    note: std::path::Path::new(&note),
                    added: &r.added,
                    removed: &r.removed,
                };
                ChangeEntry {
                    change: change.to_string(),
                    note,
                    outcome: outcome_label(&r.outcome),
                }
            })
            .collect(),
        unresolvable: repairs
            .unresolvable
            .iter()
            .map(|f| ChangeEntry {
                note: display_path(index, &f.source),
                change: f.target.clone(),
                outcome: "unresolvable".to_string(),
            })
            .collect(),
        skipped: backlinks
            .skipped
            .iter()
            .map(|p| display_path(index, p))
            .collect(),
    }
}

fn print_human(summary: &FixSummary, quiet: bool) {
    let prefix = if summary.dry_run { "[dry-run] " } else { "" };

    let print_entry = |entry: &ChangeEntry, line: String| {
        let symbol = match entry.outcome.as_str() {
            "applied" => style("✓").green(),
            "dry-run" => style("→").blue(),
            "declined" | "unchanged" => style("-").dim(),
            _ => style("✗").red(),
        };
        println!("{} {}{}", symbol, prefix, line);
        if entry.outcome.starts_with("failed") {
            println!("    {}", style(&entry.outcome).red());
        }
    };
    for entry in &summary.links {
        print_entry(entry, format!("{} in {}", entry.change, entry.note));
    }
    for entry in &summary.backlinks {
        print_entry(entry, entry.change.clone());
    }

    for entry in &summary.unresolvable {
        println!(
            "{} {} → {} - {}",
            style("✗").red(),
            entry.note,
            entry.change,
            style("cannot be repaired").red()
        );
    }

    if quiet {
        return;
    }

    let done = if summary.dry_run { "dry-run" } else { "applied" };

    println!();
    println!("{}", style("─".repeat(60)).dim());
    println!("{}", style("Fix Summary").bold());
    println!("{}", style("─".repeat(60)).dim());
    println!(
        "  Links repaired:      {}{}",
        style(count(&summary.links, done)).green(),
        if summary.dry_run { " (dry run)" } else { "" }
    );
    println!("  Links unresolvable:  {}", style(summary.unresolvable.len()).red());
    println!(
        "  Backlinks updated:   {}",
        style(count(&summary.backlinks, done)).green()
    );
    if !summary.skipped.is_empty() {
        println!(
            "  Skipped:             {}",
            style(plural(summary.skipped.len(), "note without metadata", "notes without metadata")).yellow()
        );
    }
    println!();

    if summary.dry_run {
        println!("No changes made (dry run).");
    }
}

fn count(entries: &[ChangeEntry], outcome: &str) -> usize {
    entries.iter().filter(|e| e.outcome == outcome).count()
}
