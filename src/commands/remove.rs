//! Remove a single worktree, with a dirty-state safety check, conditional
//! forced removal, and merged-branch cleanup.

use std::path::Path;

use color_print::cformat;

use crate::git::{ArborError, is_protected_branch};
use crate::prompt::{PromptOutcome, SelectItem};
use crate::styling::{
    info_message, muted, println, progress_message, success_message, warning_message,
};

use super::{FlowContext, FlowOutcome, display_name};

pub fn run_remove(ctx: &mut FlowContext) -> anyhow::Result<FlowOutcome> {
    let dev_dir = ctx.dev_dir()?;
    let dirs = crate::scan::find_worktree_dirs(&dev_dir).map_err(|_| ArborError::NoRepoFound {
        dir: dev_dir.clone(),
    })?;
    if dirs.is_empty() {
        println!("{}", info_message("No worktrees found."));
        return Ok(FlowOutcome::Completed);
    }

    let items: Vec<SelectItem> = dirs
        .iter()
        .map(|d| SelectItem::new(display_name(d)))
        .collect();
    let selected = match ctx.prompter.select("Select a worktree", &items, true)? {
        PromptOutcome::Value(i) => dirs[i].clone(),
        PromptOutcome::Declined => return Ok(FlowOutcome::Completed),
        PromptOutcome::Aborted => return Ok(FlowOutcome::Cancelled),
    };

    // Removal is administered by the main checkout; without one there is
    // nothing safe to do.
    let main_repo = ctx
        .vcs
        .main_repo_of(&selected)?
        .ok_or(ArborError::OrphanedWorktree {
            path: selected.clone(),
        })?;
    let branch = ctx.vcs.current_branch(&selected)?;

    println!(
        "{}",
        info_message(format!(
            "Removing: {} (branch: {})",
            display_name(&selected),
            branch.as_deref().unwrap_or("detached")
        ))
    );

    // Classified now, not reused from the listing: the tree may have changed
    // while the menu was open.
    let status = ctx.vcs.check_status(&selected)?;
    let force = status.is_dirty();
    if force {
        println!(
            "{}",
            warning_message(format!("This worktree has {}", status.describe()))
        );
        match ctx
            .prompter
            .confirm("Remove anyway? Unsaved work will be permanently lost")?
        {
            PromptOutcome::Value(()) => {}
            PromptOutcome::Declined => {
                println!("{}", muted("Kept worktree — no changes made"));
                return Ok(FlowOutcome::Completed);
            }
            PromptOutcome::Aborted => return Ok(FlowOutcome::Cancelled),
        }
    }

    println!("{}", progress_message("Removing worktree..."));
    ctx.vcs.remove_worktree(&main_repo, &selected, force)?;
    // Stale metadata cleanup is idempotent and never fatal.
    let _ = ctx.vcs.prune_worktrees(&main_repo);
    println!("{}", success_message("Removed worktree"));

    if let Some(branch) = branch {
        return cleanup_branch(ctx, &main_repo, &branch);
    }
    Ok(FlowOutcome::Completed)
}

/// Delete the branch left behind by a removed worktree.
///
/// Merged branches go quietly; unmerged ones need an explicit force-delete
/// confirmation. Primary branches and the detached pseudo-branch are never
/// touched.
fn cleanup_branch(
    ctx: &mut FlowContext,
    main_repo: &Path,
    branch: &str,
) -> anyhow::Result<FlowOutcome> {
    if is_protected_branch(branch) {
        return Ok(FlowOutcome::Completed);
    }

    if ctx.vcs.is_branch_merged(main_repo, branch)? {
        if ctx.vcs.delete_branch(main_repo, branch, false).is_ok() {
            println!(
                "{}",
                success_message(cformat!("Deleted merged branch <bold>{branch}</>"))
            );
        }
        return Ok(FlowOutcome::Completed);
    }

    println!(
        "{}",
        warning_message(cformat!("Branch <bold>{branch}</> is not merged"))
    );
    match ctx
        .prompter
        .confirm(&format!("Force delete unmerged branch '{branch}'?"))?
    {
        PromptOutcome::Value(()) => match ctx.vcs.delete_branch(main_repo, branch, true) {
            Ok(()) => println!(
                "{}",
                success_message(cformat!("Force deleted branch <bold>{branch}</>"))
            ),
            Err(_) => println!(
                "{}",
                warning_message(cformat!("Failed to delete branch <bold>{branch}</>"))
            ),
        },
        PromptOutcome::Declined => {
            println!("{}", muted(format!("Kept branch '{branch}'")));
        }
        PromptOutcome::Aborted => return Ok(FlowOutcome::Cancelled),
    }
    Ok(FlowOutcome::Completed)
}
