//! List worktrees under the scan root and optionally open one.

use std::path::PathBuf;

use crate::git::ArborError;
use crate::naming;
use crate::prompt::{PromptOutcome, SelectItem};
use crate::styling::{info_message, muted, println, success_message};

use super::{FlowContext, FlowOutcome, display_name};

pub fn run_list(ctx: &mut FlowContext) -> anyhow::Result<FlowOutcome> {
    let dev_dir = ctx.dev_dir()?;
    let dirs = crate::scan::find_worktree_dirs(&dev_dir).map_err(|_| ArborError::NoRepoFound {
        dir: dev_dir.clone(),
    })?;
    if dirs.is_empty() {
        println!("{}", info_message("No worktrees found."));
        return Ok(FlowOutcome::Completed);
    }

    let items: Vec<SelectItem> = dirs.iter().map(|d| display_item(ctx, d)).collect();
    let selected = match ctx.prompter.select("Worktrees", &items, true)? {
        PromptOutcome::Value(i) => dirs[i].clone(),
        // "Back" is a no-op by design.
        PromptOutcome::Declined => return Ok(FlowOutcome::Completed),
        PromptOutcome::Aborted => return Ok(FlowOutcome::Cancelled),
    };

    let name = display_name(&selected);
    match ctx
        .prompter
        .confirm(&format!("Open {name} in editor?"))?
    {
        PromptOutcome::Value(()) => {
            if ctx
                .hooks
                .open_editor(ctx.config.editor(), &selected)
                .is_ok()
            {
                println!("{}", success_message(format!("Opened: {name}")));
            }
        }
        PromptOutcome::Declined => {
            println!("{}", muted(selected.display().to_string()));
        }
        PromptOutcome::Aborted => return Ok(FlowOutcome::Cancelled),
    }

    Ok(FlowOutcome::Completed)
}

/// Menu row for one worktree: directory name, branch, and the repository
/// name decoded from the directory name.
fn display_item(ctx: &FlowContext, dir: &PathBuf) -> SelectItem {
    let name = display_name(dir);
    let branch = ctx
        .vcs
        .current_branch(dir)
        .ok()
        .flatten()
        .unwrap_or_default();
    let (repo, _) = naming::split_worktree_dir_name(&name);

    let mut detail = String::new();
    if !branch.is_empty() {
        detail.push_str(&format!("({branch})"));
    }
    if !repo.is_empty() {
        if !detail.is_empty() {
            detail.push_str("  ");
        }
        detail.push_str(&repo);
    }
    if detail.is_empty() {
        SelectItem::new(name)
    } else {
        SelectItem::with_detail(name, detail)
    }
}
