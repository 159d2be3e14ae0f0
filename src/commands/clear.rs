//! Remove every worktree of one repository behind a single bulk
//! confirmation.

use color_print::cformat;

use crate::git::{WorktreeInfo, WorktreeStatus, is_protected_branch};
use crate::prompt::PromptOutcome;
use crate::styling::{
    info_message, muted, println, progress_message, success_message, warning_message,
};

use super::{FlowContext, FlowOutcome, display_name};

pub fn run_clear(ctx: &mut FlowContext) -> anyhow::Result<FlowOutcome> {
    // Clearing is a deliberate bulk action: always pick the repository
    // explicitly, even when inside one.
    let repo = match super::resolve_repo(ctx, false)? {
        PromptOutcome::Value(repo) => repo,
        PromptOutcome::Declined | PromptOutcome::Aborted => return Ok(FlowOutcome::Cancelled),
    };
    let repo_name = display_name(&repo);

    let worktrees = ctx.vcs.list_worktrees(&repo)?;
    if worktrees.is_empty() {
        println!("{}", info_message("No worktrees to remove."));
        return Ok(FlowOutcome::Completed);
    }

    println!(
        "{}",
        info_message(cformat!("Worktrees for <bold>{repo_name}</>:"))
    );
    for wt in &worktrees {
        println!(
            "{}",
            muted(format!(
                "{}  ({})",
                display_name(&wt.path),
                wt.branch.as_deref().unwrap_or("detached")
            ))
        );
    }

    // The whole blast radius is classified and shown before the one
    // confirmation below; nothing is asked per entry.
    let statuses: Vec<(WorktreeInfo, WorktreeStatus)> = worktrees
        .iter()
        .map(|wt| Ok((wt.clone(), ctx.vcs.check_status(&wt.path)?)))
        .collect::<anyhow::Result<_>>()?;
    let dirty: Vec<_> = statuses.iter().filter(|(_, s)| s.is_dirty()).collect();

    if !dirty.is_empty() {
        println!();
        println!(
            "{}",
            warning_message(format!("{} worktree(s) have unsaved work:", dirty.len()))
        );
        for (wt, status) in &dirty {
            println!(
                "{}",
                muted(format!(
                    "  • {} ({}) — {}",
                    display_name(&wt.path),
                    wt.branch.as_deref().unwrap_or("detached"),
                    status.describe()
                ))
            );
        }
        println!();
    }

    let question = if dirty.is_empty() {
        format!("Remove all {} worktrees?", worktrees.len())
    } else {
        format!(
            "Remove all {} worktrees? Unsaved work will be permanently lost",
            worktrees.len()
        )
    };
    match ctx.prompter.confirm(&question)? {
        PromptOutcome::Value(()) => {}
        PromptOutcome::Declined => {
            println!("{}", muted("Cancelled."));
            return Ok(FlowOutcome::Completed);
        }
        PromptOutcome::Aborted => return Ok(FlowOutcome::Cancelled),
    }

    println!("{}", progress_message("Removing worktrees..."));
    let mut removed = 0usize;
    let mut failed = 0usize;
    for wt in &worktrees {
        // Status is rechecked per entry at removal time; the batch snapshot
        // above was for display and may already be stale.
        let force = match ctx.vcs.check_status(&wt.path) {
            Ok(status) => status.is_dirty(),
            Err(_) => {
                failed += 1;
                continue;
            }
        };
        if ctx.vcs.remove_worktree(&repo, &wt.path, force).is_err() {
            failed += 1;
            continue;
        }
        removed += 1;

        if let Some(branch) = wt.branch.as_deref() {
            if !is_protected_branch(branch)
                && ctx.vcs.is_branch_merged(&repo, branch).unwrap_or(false)
            {
                let _ = ctx.vcs.delete_branch(&repo, branch, false);
            }
        }
    }
    let _ = ctx.vcs.prune_worktrees(&repo);

    println!();
    if failed == 0 {
        println!("{}", success_message("All worktrees cleared"));
    } else {
        println!(
            "{}",
            warning_message(format!("Removed {removed} worktree(s), {failed} failed"))
        );
    }
    println!("{}", muted("Merged branches were auto-deleted"));
    Ok(FlowOutcome::Completed)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::super::testing::{ScriptedPrompter, StubHooks, StubVcs, config_with_base};
    use super::*;

    struct Fixture {
        base: TempDir,
        repo: PathBuf,
        worktrees: Vec<PathBuf>,
    }

    /// A scan root with one repository and three of its worktrees.
    fn fixture() -> Fixture {
        let base = TempDir::new().unwrap();
        let repo = base.path().join("app");
        fs::create_dir_all(repo.join(".git")).unwrap();
        let worktrees: Vec<PathBuf> = ["one", "two", "three"]
            .iter()
            .map(|n| base.path().join(format!("app-worktree-{n}")))
            .collect();
        Fixture {
            base,
            repo,
            worktrees,
        }
    }

    fn vcs_for(fx: &Fixture) -> StubVcs {
        StubVcs {
            worktrees: fx
                .worktrees
                .iter()
                .enumerate()
                .map(|(i, path)| WorktreeInfo {
                    path: path.clone(),
                    branch: Some(format!("branch-{i}")),
                })
                .collect(),
            ..Default::default()
        }
    }

    fn run(
        config: &crate::config::Config,
        vcs: &StubVcs,
        prompter: &mut ScriptedPrompter,
    ) -> anyhow::Result<FlowOutcome> {
        let hooks = StubHooks::default();
        let mut ctx = FlowContext {
            config,
            vcs,
            hooks: &hooks,
            prompter,
        };
        run_clear(&mut ctx)
    }

    fn mark_dirty(vcs: &mut StubVcs, path: &PathBuf) {
        vcs.statuses.insert(
            path.clone(),
            WorktreeStatus {
                has_uncommitted_changes: true,
                has_unpushed_commits: false,
            },
        );
    }

    #[test]
    fn test_bulk_decline_removes_nothing() {
        let fx = fixture();
        let config = config_with_base(fx.base.path());
        let mut vcs = vcs_for(&fx);
        mark_dirty(&mut vcs, &fx.worktrees[1]);
        let mut prompter = ScriptedPrompter::selecting([PromptOutcome::Value(0)]);
        prompter.confirms.push_back(PromptOutcome::Declined);

        let outcome = run(&config, &vcs, &mut prompter).unwrap();
        assert_eq!(outcome, FlowOutcome::Completed);
        assert!(vcs.removal_calls().is_empty());
        assert_eq!(vcs.prune_count(), 0);
    }

    #[test]
    fn test_bulk_accept_removes_each_with_matching_force() {
        let fx = fixture();
        let config = config_with_base(fx.base.path());
        let mut vcs = vcs_for(&fx);
        mark_dirty(&mut vcs, &fx.worktrees[1]);
        let mut prompter = ScriptedPrompter::selecting([PromptOutcome::Value(0)]);
        prompter.confirms.push_back(PromptOutcome::Value(()));

        run(&config, &vcs, &mut prompter).unwrap();
        assert_eq!(
            vcs.removal_calls(),
            vec![
                (fx.worktrees[0].clone(), false),
                (fx.worktrees[1].clone(), true),
                (fx.worktrees[2].clone(), false),
            ]
        );
        assert_eq!(vcs.prune_count(), 1);
    }

    #[test]
    fn test_one_failing_entry_does_not_stop_the_batch() {
        let fx = fixture();
        let config = config_with_base(fx.base.path());
        let mut vcs = vcs_for(&fx);
        vcs.fail_remove.insert(fx.worktrees[1].clone());
        let mut prompter = ScriptedPrompter::selecting([PromptOutcome::Value(0)]);
        prompter.confirms.push_back(PromptOutcome::Value(()));

        let outcome = run(&config, &vcs, &mut prompter).unwrap();
        assert_eq!(outcome, FlowOutcome::Completed);
        // All three were attempted despite the middle failure.
        assert_eq!(vcs.removal_calls().len(), 3);
        assert_eq!(vcs.prune_count(), 1);
    }

    #[test]
    fn test_merged_branches_deleted_protected_ones_kept() {
        let fx = fixture();
        let config = config_with_base(fx.base.path());
        let mut vcs = vcs_for(&fx);
        vcs.worktrees[2].branch = Some("main".to_string());
        vcs.merged.insert("branch-0".to_string());
        vcs.merged.insert("main".to_string());
        let mut prompter = ScriptedPrompter::selecting([PromptOutcome::Value(0)]);
        prompter.confirms.push_back(PromptOutcome::Value(()));

        run(&config, &vcs, &mut prompter).unwrap();
        // branch-0 is merged and deleted; branch-1 is unmerged and kept
        // without prompting; main is protected even though merged.
        assert_eq!(vcs.deleted_branches(), vec!["branch-0".to_string()]);
    }

    #[test]
    fn test_no_worktrees_reports_and_stops() {
        let fx = fixture();
        let config = config_with_base(fx.base.path());
        let vcs = StubVcs::default();
        let mut prompter = ScriptedPrompter::selecting([PromptOutcome::Value(0)]);

        let outcome = run(&config, &vcs, &mut prompter).unwrap();
        assert_eq!(outcome, FlowOutcome::Completed);
        // No confirmation is asked when there is nothing to remove.
        assert_eq!(prompter.seen_titles.len(), 1);
    }

    #[test]
    fn test_repo_selection_is_always_interactive() {
        let fx = fixture();
        let config = config_with_base(fx.base.path());
        // Even with a current repo, clear prompts for the repository.
        let mut vcs = vcs_for(&fx);
        vcs.current = Some(fx.repo.clone());
        let mut prompter = ScriptedPrompter::selecting([PromptOutcome::Value(0)]);
        prompter.confirms.push_back(PromptOutcome::Value(()));

        run(&config, &vcs, &mut prompter).unwrap();
        assert!(prompter.seen_titles.contains(&"Select a project".to_string()));
    }

    #[test]
    fn test_abort_at_bulk_confirmation_cancels() {
        let fx = fixture();
        let config = config_with_base(fx.base.path());
        let vcs = vcs_for(&fx);
        let mut prompter = ScriptedPrompter::selecting([PromptOutcome::Value(0)]);
        prompter.confirms.push_back(PromptOutcome::Aborted);

        let outcome = run(&config, &vcs, &mut prompter).unwrap();
        assert_eq!(outcome, FlowOutcome::Cancelled);
        assert!(vcs.removal_calls().is_empty());
    }

    #[test]
    fn test_status_failure_during_classification_fails_loudly() {
        let fx = fixture();
        let config = config_with_base(fx.base.path());
        let mut vcs = vcs_for(&fx);
        vcs.status_errors.insert(fx.worktrees[0].clone());
        let mut prompter = ScriptedPrompter::selecting([PromptOutcome::Value(0)]);

        let result = run(&config, &vcs, &mut prompter);
        // A worktree that cannot be classified is never silently treated as
        // clean; the flow stops before asking for confirmation.
        assert!(result.is_err());
        assert!(vcs.removal_calls().is_empty());
    }
}
