//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    check::CheckArgs,
    completions::CompletionsArgs,
    files::{IsolatedArgs, TagArgs, TaglessArgs},
    fix_links::FixLinksArgs,
    new::NewArgs,
    tags::TagsArgs,
};

#[derive(Parser)]
#[command(name = "zk")]
#[command(author, version, about = "Zettelkasten note-graph toolkit")]
#[command(
    long_about = "Keeps a directory of plain-text notes consistent: lists tags, finds tagless and isolated notes, repairs broken xref links and maintains backlinks."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Root directory containing notes (default: config, then current directory)
    #[arg(long, short = 'd', global = true)]
    pub directory: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all tags
    #[command(visible_alias = "all-tags", alias = "list-tags")]
    Tags(TagsArgs),

    /// List notes with a specific tag
    #[command(alias = "list-files-by-tag")]
    Tag(TagArgs),

    /// List notes that have no tags
    #[command(alias = "list-tagless-files")]
    Tagless(TaglessArgs),

    /// List notes that neither link to other notes nor are linked to
    #[command(alias = "list-isolated-files")]
    Isolated(IsolatedArgs),

    /// Report broken links, identifier conflicts and malformed metadata
    Check(CheckArgs),

    /// Repair broken xref links, then update backlinks
    FixLinks(FixLinksArgs),

    /// Create a new note
    New(NewArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text, one entry per line
    #[default]
    Auto,
    /// JSON format (for programming)
    Json,
    /// YAML format
    Yaml,
}

/// Interactive selection flags shared by the listing commands
#[derive(clap::Args, Clone, Debug, Default)]
pub struct PickArgs {
    /// Pick from the results interactively
    #[arg(long, short = 'i')]
    pub interactive: bool,

    /// Open the picked note in the editor (implies --interactive)
    #[arg(long, short = 'o')]
    pub open: bool,
}

impl PickArgs {
    pub fn active(&self) -> bool {
        self.interactive || self.open
    }
}
