//! `zk check` command - Read-only integrity report

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::args::{GlobalOpts, OutputFormat};
use crate::cli::helpers::{display_path, load_config, open_index, plural};
use crate::core::config::LinkStyle;
use crate::core::index::NoteIndex;
use crate::core::links::{check_links, LinkStatus};
use crate::core::metadata::{self, MetadataError};

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// How corrections are written (default: from config)
    #[arg(long, value_enum)]
    pub link_style: Option<LinkStyle>,

    /// Only print the summary
    #[arg(long)]
    pub summary: bool,
}

#[derive(Serialize)]
struct ConflictEntry {
    id: String,
    paths: Vec<String>,
}

#[derive(Serialize)]
struct MalformedEntry {
    path: String,
    error: String,
}

#[derive(Serialize)]
struct FindingEntry {
    source: String,
    target: String,
    #[serde(flatten)]
    status: LinkStatus,
}

#[derive(Serialize)]
struct CheckReport {
    notes: usize,
    links_checked: usize,
    broken: Vec<FindingEntry>,
    conflicts: Vec<ConflictEntry>,
    malformed: Vec<MalformedEntry>,
}

impl CheckReport {
    fn problems(&self) -> usize {
        self.broken.len() + self.conflicts.len() + self.malformed.len()
    }
}

pub fn run(args: CheckArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let (index, conflicts) = open_index(&config, global)?;
    let style_choice = args.link_style.unwrap_or(config.link_style);

    let links = check_links(&index, style_choice);

    let mut malformed = Vec::new();
    let mut diagnostics = Vec::new();
    for note in index.notes() {
        match metadata::load(note.path()) {
            Ok(_) => {}
            Err(MetadataError::Io(e)) => tracing::warn!("{}", e),
            Err(e) => {
                malformed.push(MalformedEntry {
                    path: index.root_relative(note),
                    error: e.to_string(),
                });
                diagnostics.push(e);
            }
        }
    }

    let report = CheckReport {
        notes: index.len(),
        links_checked: links.checked,
        broken: links
            .findings
            .into_iter()
            .map(|f| FindingEntry {
                source: display_path(&index, &f.source),
                target: f.target,
                status: f.status,
            })
            .collect(),
        conflicts: conflicts
            .iter()
            .map(|c| ConflictEntry {
                id: c.id.to_string(),
                paths: c.paths.iter().map(|p| display_path(&index, p)).collect(),
            })
            .collect(),
        malformed,
    };

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&report).into_diagnostic()?);
        }
        OutputFormat::Auto => {
            if !args.summary {
                print_details(&report, diagnostics);
            }
            if !global.quiet {
                print_summary(&index, &report);
            }
        }
    }

    match report.problems() {
        0 => {
            if global.format == OutputFormat::Auto && !global.quiet {
                println!("{} No problems found", style("✓").green().bold());
            }
            Ok(())
        }
        n => Err(miette::miette!("Check failed: {}", plural(n, "problem", "problems"))),
    }
}

fn print_details(report: &CheckReport, diagnostics: Vec<MetadataError>) {
    for finding in &report.broken {
        match &finding.status {
            LinkStatus::Repairable { correction } => println!(
                "{} {} → {} ({} {})",
                style("~").yellow(),
                finding.source,
                finding.target,
                style("fix:").yellow(),
                correction
            ),
            _ => println!(
                "{} {} → {} - {}",
                style("✗").red(),
                finding.source,
                finding.target,
                style("target not found").red()
            ),
        }
    }

    for error in diagnostics {
        println!("{:?}", miette::Report::new(error));
    }
}

fn print_summary(index: &NoteIndex, report: &CheckReport) {
    let repairable = report
        .broken
        .iter()
        .filter(|f| matches!(f.status, LinkStatus::Repairable { .. }))
        .count();

    println!();
    println!("{}", style("─".repeat(60)).dim());
    println!("{}", style("Check Summary").bold());
    println!("{}", style("─".repeat(60)).dim());
    println!("  Notes:             {}", style(index.len()).cyan());
    println!("  Links checked:     {}", style(report.links_checked).cyan());
    println!(
        "  Valid:             {}",
        style(report.links_checked - report.broken.len()).green()
    );
    println!("  Repairable:        {}", style(repairable).yellow());
    println!(
        "  Unresolvable:      {}",
        style(report.broken.len() - repairable).red()
    );
    println!("  Id conflicts:      {}", style(report.conflicts.len()).yellow());
    println!("  Malformed blocks:  {}", style(report.malformed.len()).red());
    println!();
}
