//! Settings: base folder and editor, plus the first-run setup.

use std::path::{Path, PathBuf};

use crate::config::{Config, DEV_DIR_ENV, EDITOR_ENV};
use crate::prompt::{Prompter, PromptOutcome, SelectItem};
use crate::styling::{info_message, muted, println, success_message, warning_message};

use super::FlowOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SettingsAction {
    BaseDir,
    Editor,
}

/// The settings submenu: a fixed action table, re-entered after each change.
const SETTINGS_MENU: &[(&str, SettingsAction)] = &[
    ("Change base folder", SettingsAction::BaseDir),
    ("Change editor", SettingsAction::Editor),
];

pub fn run_settings(
    config: &mut Config,
    prompter: &mut dyn Prompter,
) -> anyhow::Result<FlowOutcome> {
    let items: Vec<SelectItem> = SETTINGS_MENU
        .iter()
        .map(|(label, _)| SelectItem::new(*label))
        .collect();
    loop {
        println!();
        let action = match prompter.select("Settings", &items, true)? {
            PromptOutcome::Value(i) => SETTINGS_MENU[i].1,
            PromptOutcome::Declined => return Ok(FlowOutcome::Completed),
            PromptOutcome::Aborted => return Ok(FlowOutcome::Cancelled),
        };
        match action {
            SettingsAction::BaseDir => change_base_dir(config, prompter)?,
            SettingsAction::Editor => change_editor(config, prompter)?,
        }
    }
}

/// First-run setup: ask for the base folder (and editor) when nothing is
/// configured yet. Skipping is fine; the user is told how to come back.
pub fn first_run_setup(config: &mut Config, prompter: &mut dyn Prompter) -> anyhow::Result<()> {
    if config.dev_dir().is_some() {
        return Ok(());
    }

    println!();
    println!(
        "{}",
        info_message("Welcome! Let's set your base folder (where your git repos live).")
    );
    let start = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let selected = match select_base_dir(prompter, &start)? {
        PromptOutcome::Value(dir) => dir,
        PromptOutcome::Declined | PromptOutcome::Aborted => {
            println!(
                "{}",
                muted(format!(
                    "Skipped — set it later with 'arbor settings' or {DEV_DIR_ENV}."
                ))
            );
            return Ok(());
        }
    };
    config.base_dir = Some(selected.display().to_string());

    println!();
    println!(
        "{}",
        info_message("Choose your editor (you can change this later in Settings).")
    );
    match select_editor(prompter)? {
        PromptOutcome::Value(editor) => config.editor = editor,
        PromptOutcome::Declined | PromptOutcome::Aborted => {
            println!(
                "{}",
                muted("Skipped — editor will be auto-detected. Change it in Settings.")
            );
        }
    }

    if config.save().is_err() {
        println!("{}", warning_message("Could not save config"));
        return Ok(());
    }
    println!(
        "{}",
        success_message(format!("Base folder set to {}", selected.display()))
    );
    match config.editor() {
        Some(editor) => println!("{}", success_message(format!("Editor set to {editor}"))),
        None => println!("{}", muted("Editor: auto-detect")),
    }
    Ok(())
}

fn change_base_dir(config: &mut Config, prompter: &mut dyn Prompter) -> anyhow::Result<()> {
    let current = config.dev_dir();
    println!();
    match &current {
        Some(dir) => println!(
            "{}",
            info_message(format!("Base folder: {}", dir.display()))
        ),
        None => println!("{}", info_message("Base folder: not set")),
    }
    println!(
        "{}",
        muted(format!("(from {})", config.base_dir_source().describe(DEV_DIR_ENV)))
    );

    let start = current
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    let selected = match select_base_dir(prompter, &start)? {
        PromptOutcome::Value(dir) => dir,
        PromptOutcome::Declined | PromptOutcome::Aborted => return Ok(()),
    };

    config.base_dir = Some(selected.display().to_string());
    if let Err(e) = config.save() {
        println!("{}", warning_message(format!("Failed to save config: {e}")));
        return Ok(());
    }
    println!(
        "{}",
        success_message(format!("Base folder set to {}", selected.display()))
    );
    Ok(())
}

fn change_editor(config: &mut Config, prompter: &mut dyn Prompter) -> anyhow::Result<()> {
    println!();
    match config.editor() {
        Some(editor) => println!("{}", info_message(format!("Editor: {editor}"))),
        None => println!("{}", info_message("Editor: auto-detect")),
    }
    println!(
        "{}",
        muted(format!("(from {})", config.editor_source().describe(EDITOR_ENV)))
    );

    let editor = match select_editor(prompter)? {
        PromptOutcome::Value(editor) => editor,
        PromptOutcome::Declined | PromptOutcome::Aborted => return Ok(()),
    };

    config.editor = editor;
    if let Err(e) = config.save() {
        println!("{}", warning_message(format!("Failed to save config: {e}")));
        return Ok(());
    }
    match config.editor() {
        Some(editor) => println!("{}", success_message(format!("Editor set to {editor}"))),
        None => println!("{}", success_message("Editor set to auto-detect")),
    }
    Ok(())
}

/// Pick a base directory by typing a path or browsing, retrying until the
/// choice is an existing directory.
fn select_base_dir(
    prompter: &mut dyn Prompter,
    start: &Path,
) -> anyhow::Result<PromptOutcome<PathBuf>> {
    let methods = [
        SelectItem::new("Type a path"),
        SelectItem::new("Browse folders"),
    ];
    loop {
        let method = match prompter.select("How would you like to set it?", &methods, false)? {
            PromptOutcome::Value(i) => i,
            PromptOutcome::Declined => return Ok(PromptOutcome::Declined),
            PromptOutcome::Aborted => return Ok(PromptOutcome::Aborted),
        };

        let selected = match method {
            0 => match prompter.input("Base folder path", &start.display().to_string())? {
                PromptOutcome::Value(path) => {
                    PathBuf::from(shellexpand::tilde(&path).into_owned())
                }
                PromptOutcome::Declined => return Ok(PromptOutcome::Declined),
                PromptOutcome::Aborted => return Ok(PromptOutcome::Aborted),
            },
            _ => {
                let start = if start.is_dir() {
                    start.to_path_buf()
                } else {
                    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
                };
                match browse_directory(prompter, start)? {
                    PromptOutcome::Value(dir) => dir,
                    PromptOutcome::Declined => return Ok(PromptOutcome::Declined),
                    PromptOutcome::Aborted => return Ok(PromptOutcome::Aborted),
                }
            }
        };

        if selected.is_dir() {
            return Ok(PromptOutcome::Value(selected));
        }
        println!(
            "{}",
            warning_message(format!(
                "'{}' is not a valid directory. Try again.",
                selected.display()
            ))
        );
    }
}

/// Minimal directory browser: use the current folder, go up, or descend
/// into a subdirectory.
fn browse_directory(
    prompter: &mut dyn Prompter,
    mut current: PathBuf,
) -> anyhow::Result<PromptOutcome<PathBuf>> {
    loop {
        let mut subdirs: Vec<PathBuf> = std::fs::read_dir(&current)
            .map(|entries| {
                entries
                    .flatten()
                    .map(|e| e.path())
                    .filter(|p| p.is_dir())
                    .filter(|p| {
                        // Hide dotfolders; nobody keeps repos in ~/.cache.
                        p.file_name()
                            .and_then(|n| n.to_str())
                            .is_some_and(|n| !n.starts_with('.'))
                    })
                    .collect()
            })
            .unwrap_or_default();
        subdirs.sort();

        let mut items = vec![SelectItem::new("Use this folder"), SelectItem::new("..")];
        items.extend(
            subdirs
                .iter()
                .map(|d| SelectItem::new(super::display_name(d))),
        );

        let title = current.display().to_string();
        match prompter.select(&title, &items, true)? {
            PromptOutcome::Value(0) => return Ok(PromptOutcome::Value(current)),
            PromptOutcome::Value(1) => {
                if let Some(parent) = current.parent() {
                    current = parent.to_path_buf();
                }
            }
            PromptOutcome::Value(i) => current = subdirs[i - 2].clone(),
            PromptOutcome::Declined => return Ok(PromptOutcome::Declined),
            PromptOutcome::Aborted => return Ok(PromptOutcome::Aborted),
        }
    }
}

/// Pick an editor: a known command, auto-detect, or a custom command.
/// `Value(None)` means auto-detect.
fn select_editor(prompter: &mut dyn Prompter) -> anyhow::Result<PromptOutcome<Option<String>>> {
    let items = [
        SelectItem::with_detail("Cursor", "cursor"),
        SelectItem::with_detail("VS Code", "code"),
        SelectItem::new("Auto-detect"),
        SelectItem::new("Custom command"),
    ];
    let choice = match prompter.select("Editor", &items, false)? {
        PromptOutcome::Value(i) => i,
        PromptOutcome::Declined => return Ok(PromptOutcome::Declined),
        PromptOutcome::Aborted => return Ok(PromptOutcome::Aborted),
    };
    match choice {
        0 => Ok(PromptOutcome::Value(Some("cursor".to_string()))),
        1 => Ok(PromptOutcome::Value(Some("code".to_string()))),
        2 => Ok(PromptOutcome::Value(None)),
        _ => match prompter.input("Editor command", "vim")? {
            PromptOutcome::Value(cmd) if cmd.is_empty() => Ok(PromptOutcome::Value(None)),
            PromptOutcome::Value(cmd) => Ok(PromptOutcome::Value(Some(cmd))),
            PromptOutcome::Declined => Ok(PromptOutcome::Declined),
            PromptOutcome::Aborted => Ok(PromptOutcome::Aborted),
        },
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::super::testing::ScriptedPrompter;
    use super::*;

    fn config_saving_to(dir: &TempDir) -> Config {
        Config {
            path: Some(dir.path().join("config.toml")),
            ..Default::default()
        }
    }

    #[test]
    fn test_change_base_dir_by_typing_saves_config() {
        let home = TempDir::new().unwrap();
        let store = TempDir::new().unwrap();
        let mut config = config_saving_to(&store);
        let mut prompter = ScriptedPrompter::selecting([
            PromptOutcome::Value(0), // settings menu: base folder
            PromptOutcome::Value(0), // method: type a path
            PromptOutcome::Declined, // settings menu again: back
        ]);
        prompter
            .inputs
            .push_back(PromptOutcome::Value(home.path().display().to_string()));

        let outcome = run_settings(&mut config, &mut prompter).unwrap();
        assert_eq!(outcome, FlowOutcome::Completed);
        assert_eq!(config.base_dir, Some(home.path().display().to_string()));

        let saved = Config::load_file(&store.path().join("config.toml")).unwrap();
        assert_eq!(saved.base_dir, config.base_dir);
    }

    #[test]
    fn test_invalid_path_retries_before_accepting() {
        let home = TempDir::new().unwrap();
        let mut prompter = ScriptedPrompter::selecting([
            PromptOutcome::Value(0), // type a path
            PromptOutcome::Value(0), // retry: type a path again
        ]);
        prompter
            .inputs
            .push_back(PromptOutcome::Value("/definitely/not/a/dir".to_string()));
        prompter
            .inputs
            .push_back(PromptOutcome::Value(home.path().display().to_string()));

        let outcome = select_base_dir(&mut prompter, home.path()).unwrap();
        assert_eq!(outcome, PromptOutcome::Value(home.path().to_path_buf()));
    }

    #[test]
    fn test_custom_editor_empty_means_auto_detect() {
        let mut prompter = ScriptedPrompter::selecting([PromptOutcome::Value(3)]);
        prompter.inputs.push_back(PromptOutcome::Value(String::new()));
        let outcome = select_editor(&mut prompter).unwrap();
        assert_eq!(outcome, PromptOutcome::Value(None));
    }

    #[test]
    fn test_first_run_skipped_on_abort_saves_nothing() {
        let store = TempDir::new().unwrap();
        let mut config = config_saving_to(&store);
        let mut prompter = ScriptedPrompter::selecting([PromptOutcome::Aborted]);

        first_run_setup(&mut config, &mut prompter).unwrap();
        assert_eq!(config.base_dir, None);
        assert!(!store.path().join("config.toml").exists());
    }

    #[test]
    fn test_first_run_noop_when_already_configured() {
        let store = TempDir::new().unwrap();
        let mut config = Config {
            base_dir: Some("/somewhere".to_string()),
            ..config_saving_to(&store)
        };
        // No prompts scripted: the setup must not ask anything.
        let mut prompter = ScriptedPrompter::default();
        first_run_setup(&mut config, &mut prompter).unwrap();
        assert!(prompter.seen_titles.is_empty());
    }

    #[test]
    fn test_browse_descends_and_selects() {
        let root = TempDir::new().unwrap();
        std::fs::create_dir_all(root.path().join("projects")).unwrap();
        let mut prompter = ScriptedPrompter::selecting([
            PromptOutcome::Value(2), // descend into "projects" (after Use/..)
            PromptOutcome::Value(0), // use this folder
        ]);

        let outcome = browse_directory(&mut prompter, root.path().to_path_buf()).unwrap();
        assert_eq!(
            outcome,
            PromptOutcome::Value(root.path().join("projects"))
        );
    }
}
