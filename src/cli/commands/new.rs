//! `zk new` command - Create a new note

use chrono::Local;
use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::args::GlobalOpts;
use crate::cli::helpers::load_config;
use crate::cli::select::run_editor;
use crate::core::template::create_note;

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Note title
    pub title: String,

    /// Tags (comma-separated)
    #[arg(long, short = 't', value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Directory for the note, relative to the notes root
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Don't open the editor after creating
    #[arg(long)]
    pub no_edit: bool,
}

pub fn run(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let root = config.notes_root();
    if !root.is_dir() {
        return Err(miette::miette!(
            "notes directory {} does not exist",
            root.display()
        ));
    }

    let dir = match &args.dir {
        Some(sub) => {
            let dir = root.join(sub);
            std::fs::create_dir_all(&dir)
                .map_err(|e| miette::miette!("failed to create {}: {}", dir.display(), e))?;
            dir
        }
        None => root,
    };

    let tags: Vec<String> = args
        .tags
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    let path = create_note(&dir, &config, &args.title, &tags, &Local::now())
        .map_err(|e| miette::miette!("{}", e))?;

    if global.quiet {
        println!("{}", path.display());
    } else {
        println!(
            "{} Created note {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    if !args.no_edit {
        run_editor(&config, &path)?;
    }

    Ok(())
}
