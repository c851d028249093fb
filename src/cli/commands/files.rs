//! `zk tag`, `zk tagless` and `zk isolated` - note listings

use console::style;
use miette::Result;

use crate::cli::args::{GlobalOpts, PickArgs};
use crate::cli::helpers::{load_config, note_paths, open_index, print_list};
use crate::cli::select::{run_editor, selector_for};
use crate::core::config::Config;
use crate::core::index::NoteIndex;
use crate::core::query;

#[derive(clap::Args, Debug)]
pub struct TagArgs {
    /// Tag to filter by (exact match)
    pub tag: String,

    #[command(flatten)]
    pub pick: PickArgs,
}

#[derive(clap::Args, Debug)]
pub struct TaglessArgs {
    #[command(flatten)]
    pub pick: PickArgs,
}

#[derive(clap::Args, Debug)]
pub struct IsolatedArgs {
    #[command(flatten)]
    pub pick: PickArgs,
}

pub fn run_tag(args: TagArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let (index, _conflicts) = open_index(&config, global)?;
    let files = note_paths(&index, &query::notes_with_tag(&index, &args.tag));
    list_or_pick(&index, &config, &files, &args.pick, global)
}

pub fn run_tagless(args: TaglessArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let (index, _conflicts) = open_index(&config, global)?;
    let files = note_paths(&index, &query::tagless_notes(&index));
    list_or_pick(&index, &config, &files, &args.pick, global)
}

pub fn run_isolated(args: IsolatedArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let (index, _conflicts) = open_index(&config, global)?;
    let files = note_paths(&index, &query::isolated_notes(&index));
    list_or_pick(&index, &config, &files, &args.pick, global)
}

fn list_or_pick(
    index: &NoteIndex,
    config: &Config,
    files: &[String],
    pick: &PickArgs,
    global: &GlobalOpts,
) -> Result<()> {
    if !pick.active() {
        return print_list(files, global.format);
    }
    if let Some(file) = pick_one(index, config, files, "file")? {
        if pick.open {
            open_in_editor(index, config, &file)?;
        }
    }
    Ok(())
}

/// Run the configured selector over `items` and report the pick
pub(crate) fn pick_one(
    index: &NoteIndex,
    config: &Config,
    items: &[String],
    kind: &str,
) -> Result<Option<String>> {
    if items.is_empty() {
        println!("No results found.");
        return Ok(None);
    }

    let selection = selector_for(config, index.root()).select(items)?;
    match (&selection.selected, &selection.query) {
        (Some(selected), _) => println!("Selected {}: {}", kind, style(selected).cyan()),
        (None, Some(query)) => println!("{} nothing matched {:?}", style("!").yellow(), query),
        (None, None) => {}
    }
    Ok(selection.selected)
}

/// Launch the editor on a root-relative note path
pub(crate) fn open_in_editor(index: &NoteIndex, config: &Config, file: &str) -> Result<()> {
    run_editor(config, &index.root().join(file))
}
