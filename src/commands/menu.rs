//! The interactive root menu: a fixed action table dispatched in a loop.
//!
//! Flow errors are reported and control returns to the menu; only an explicit
//! quit (or aborting the menu prompt itself) leaves the loop.

use crate::config::Config;
use crate::git::Vcs;
use crate::hooks::Hooks;
use crate::prompt::{Prompter, PromptOutcome, SelectItem};
use crate::styling::{muted, println};

use super::{FlowContext, FlowOutcome, report_error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    New,
    List,
    Remove,
    Clear,
    Settings,
    Quit,
}

/// The menu's transition table: label shown to the user, action dispatched.
pub const MENU: &[(&str, MenuAction)] = &[
    ("Create new worktree", MenuAction::New),
    ("List worktrees", MenuAction::List),
    ("Remove a worktree", MenuAction::Remove),
    ("Remove ALL worktrees for a repo", MenuAction::Clear),
    ("Settings", MenuAction::Settings),
    ("Quit", MenuAction::Quit),
];

pub fn run_menu(
    config: &mut Config,
    vcs: &dyn Vcs,
    hooks: &dyn Hooks,
    prompter: &mut dyn Prompter,
) -> anyhow::Result<()> {
    let items: Vec<SelectItem> = MENU
        .iter()
        .map(|(label, _)| SelectItem::new(*label))
        .collect();

    loop {
        println!();
        let action = match prompter.select("What would you like to do?", &items, false)? {
            PromptOutcome::Value(i) => MENU[i].1,
            PromptOutcome::Declined | PromptOutcome::Aborted => MenuAction::Quit,
        };

        if action == MenuAction::Quit {
            println!();
            println!("{}", muted("Goodbye."));
            println!();
            return Ok(());
        }

        let result: anyhow::Result<FlowOutcome> = match action {
            MenuAction::Settings => super::run_settings(config, prompter),
            MenuAction::New | MenuAction::List | MenuAction::Remove | MenuAction::Clear => {
                let mut ctx = FlowContext {
                    config: &*config,
                    vcs,
                    hooks,
                    prompter: &mut *prompter,
                };
                match action {
                    MenuAction::New => super::run_new(&mut ctx, None),
                    MenuAction::List => super::run_list(&mut ctx),
                    MenuAction::Remove => super::run_remove(&mut ctx),
                    MenuAction::Clear => super::run_clear(&mut ctx),
                    _ => unreachable!(),
                }
            }
            MenuAction::Quit => unreachable!(),
        };

        // Cancelled flows come back silently; failed flows are reported and
        // the menu continues rather than exiting the process.
        if let Err(e) = result {
            report_error(&e);
        }
    }
}
