//! `zk tags` command - List all tags

use miette::Result;

use crate::cli::args::{GlobalOpts, PickArgs};
use crate::cli::commands::files::{open_in_editor, pick_one};
use crate::cli::helpers::{load_config, note_paths, open_index, print_list};
use crate::core::query;

#[derive(clap::Args, Debug)]
pub struct TagsArgs {
    // with --open, the picked tag's notes are offered next
    #[command(flatten)]
    pub pick: PickArgs,
}

pub fn run(args: TagsArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let (index, _conflicts) = open_index(&config, global)?;
    let tags: Vec<String> = query::all_tags(&index).into_iter().collect();

    if !args.pick.active() {
        return print_list(&tags, global.format);
    }

    let Some(tag) = pick_one(&index, &config, &tags, "tag")? else {
        return Ok(());
    };
    if args.pick.open {
        let files = note_paths(&index, &query::notes_with_tag(&index, &tag));
        if let Some(file) = pick_one(&index, &config, &files, "file")? {
            open_in_editor(&index, &config, &file)?;
        }
    }
    Ok(())
}
