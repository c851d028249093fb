//! Interactive selection and confirmation
//!
//! The core only sees the [`Confirm`] capability; pickers live here. `fzf` is
//! driven as an external process with a `bat` preview, the builtin picker uses
//! dialoguer.

use console::style;
use dialoguer::{theme::ColorfulTheme, FuzzySelect};
use miette::{IntoDiagnostic, Result};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::core::apply::{Change, Confirm};
use crate::core::config::{Config, SelectorKind};

/// What the user typed and what they picked, if anything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub query: Option<String>,
    pub selected: Option<String>,
}

/// Picks one entry out of an ordered list
pub trait Selector {
    fn select(&mut self, items: &[String]) -> Result<Selection>;
}

/// `fzf --print-query`, run from the notes root so previews resolve
pub struct FzfSelector<'a> {
    dir: &'a Path,
    editor: String,
}

impl<'a> FzfSelector<'a> {
    pub fn new(dir: &'a Path, editor: String) -> Self {
        Self { dir, editor }
    }
}

impl Selector for FzfSelector<'_> {
    fn select(&mut self, items: &[String]) -> Result<Selection> {
        let mut child = Command::new("fzf")
            .arg("--print-query")
            .args([
                "--preview",
                "bat --color=always --style=plain --line-range=:100 {}",
            ])
            .args(["--bind", &format!("ctrl-o:execute({} {{}})+abort", self.editor)])
            .args(["--bind", "ctrl-j:down,ctrl-k:up"])
            .current_dir(self.dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| miette::miette!("failed to launch fzf: {}", e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(items.join("\n").as_bytes()).into_diagnostic()?;
        }

        // fzf exits 1 on no match and 130 on abort; both still print the query
        let output = child.wait_with_output().into_diagnostic()?;
        Ok(parse_fzf_output(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Split `fzf --print-query` output into query and selection
pub fn parse_fzf_output(stdout: &str) -> Selection {
    let mut lines = stdout.lines();
    let query = lines
        .next()
        .filter(|q| !q.trim().is_empty())
        .map(str::to_string);
    let selected = lines
        .next()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string);
    Selection { query, selected }
}

/// Fuzzy picker in the terminal, no external tools needed
#[derive(Debug, Default)]
pub struct BuiltinSelector;

impl Selector for BuiltinSelector {
    fn select(&mut self, items: &[String]) -> Result<Selection> {
        let picked = FuzzySelect::with_theme(&ColorfulTheme::default())
            .items(items)
            .default(0)
            .interact_opt()
            .into_diagnostic()?;

        Ok(Selection {
            query: None,
            selected: picked.and_then(|i| items.get(i).cloned()),
        })
    }
}

/// Selector configured for this run
pub fn selector_for<'a>(config: &Config, dir: &'a Path) -> Box<dyn Selector + 'a> {
    match config.selector {
        SelectorKind::Fzf => Box::new(FzfSelector::new(dir, config.editor())),
        SelectorKind::Builtin => Box::new(BuiltinSelector),
    }
}

/// Command line for `editor` (which may carry arguments, e.g. `code --wait`) on `path`
pub fn editor_command(editor: &str, path: &Path) -> Command {
    let mut parts = editor.split_whitespace();
    let mut command = Command::new(parts.next().unwrap_or("vi"));
    command.args(parts).arg(path);
    command
}

/// Open `path` in the configured editor and wait for it to exit
pub fn run_editor(config: &Config, path: &Path) -> Result<()> {
    let editor = config.editor();
    tracing::debug!("launching {} on {}", editor, path.display());
    let status = editor_command(&editor, path)
        .status()
        .map_err(|e| miette::miette!("failed to launch editor '{}': {}", editor, e))?;
    if !status.success() {
        tracing::warn!("editor exited with {}", status);
    }
    Ok(())
}

/// Asks on the terminal before each change
#[derive(Debug, Default)]
pub struct PromptConfirm;

impl Confirm for PromptConfirm {
    fn confirm(&mut self, change: &Change<'_>) -> bool {
        dialoguer::Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Apply {}?", style(change).cyan()))
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fzf_output() {
        assert_eq!(
            parse_fzf_output("ru\nrust\n"),
            Selection {
                query: Some("ru".into()),
                selected: Some("rust".into()),
            }
        );
        assert_eq!(
            parse_fzf_output("\nnotes/a.adoc\n"),
            Selection {
                query: None,
                selected: Some("notes/a.adoc".into()),
            }
        );
        assert_eq!(
            parse_fzf_output("zzz\n"),
            Selection {
                query: Some("zzz".into()),
                selected: None,
            }
        );
        assert_eq!(parse_fzf_output(""), Selection::default());
    }

    #[test]
    fn test_editor_command_splits_arguments() {
        let path = Path::new("notes/a.adoc");

        let command = editor_command("code --wait  -n", path);
        assert_eq!(command.get_program(), "code");
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args, ["--wait", "-n", "notes/a.adoc"]);

        let command = editor_command("   ", path);
        assert_eq!(command.get_program(), "vi");
        assert_eq!(command.get_args().collect::<Vec<_>>(), ["notes/a.adoc"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_editor_reports_launch_failure() {
        let path = Path::new("a.adoc");
        let config = Config {
            editor: Some("true".into()),
            ..Config::default()
        };
        assert!(run_editor(&config, path).is_ok());

        let config = Config {
            editor: Some("zk-no-such-editor-binary".into()),
            ..Config::default()
        };
        let err = run_editor(&config, path).unwrap_err();
        assert!(err.to_string().contains("zk-no-such-editor-binary"));
    }
}
