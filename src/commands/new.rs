//! Create a worktree: resolve the repository, pick a name, create the
//! directory and branch, then run the post-create steps.

use crate::git::ArborError;
use crate::naming;
use crate::prompt::PromptOutcome;
use crate::styling::{
    hint_message, info_message, muted, println, progress_message, success_message,
    warning_message,
};

use super::{FlowContext, FlowOutcome, display_name};

pub fn run_new(ctx: &mut FlowContext, name_arg: Option<&str>) -> anyhow::Result<FlowOutcome> {
    let repo = match super::resolve_repo(ctx, true)? {
        PromptOutcome::Value(repo) => repo,
        PromptOutcome::Declined | PromptOutcome::Aborted => return Ok(FlowOutcome::Cancelled),
    };

    let raw_name = match name_arg {
        Some(name) => name.to_string(),
        None => match ctx.prompter.input("Worktree name", "feature-name")? {
            PromptOutcome::Value(name) => name,
            PromptOutcome::Declined | PromptOutcome::Aborted => {
                return Ok(FlowOutcome::Cancelled);
            }
        },
    };

    // Reject an empty name before any path is computed or touched.
    let name = naming::sanitize_name(&raw_name);
    if name.is_empty() {
        return Err(ArborError::EmptyName.into());
    }

    let repo_name = display_name(&repo);
    let base = repo.parent().unwrap_or(repo.as_path());
    let target = naming::worktree_path(base, &repo_name, &name);
    let target = std::path::absolute(&target).unwrap_or(target);
    let dir_name = naming::worktree_dir_name(&repo_name, &name);

    // Reopen instead of create: the worktree is already there.
    if target.exists() {
        println!("{}", info_message(format!("Already exists: {dir_name}")));
        open_editor(ctx, &target);
        return Ok(FlowOutcome::Completed);
    }

    // When the branch is missing it is created by the same worktree-add
    // operation, so a failure cannot leave a branch without a worktree.
    let branch_exists = ctx.vcs.branch_exists(&repo, &name)?;
    println!(
        "{}",
        progress_message(format!("Creating worktree {dir_name}..."))
    );
    ctx.vcs.add_worktree(&repo, &target, &name, !branch_exists)?;

    let copied = ctx.hooks.copy_env_files(&repo, &target);
    if !copied.is_empty() {
        println!("{}", muted(format!("Copied {} env file(s)", copied.len())));
    }

    if let Some(pm) = ctx.hooks.detect_package_manager(&target) {
        match ctx
            .prompter
            .confirm(&format!("Install dependencies with {}?", pm.name()))?
        {
            PromptOutcome::Value(()) => {
                println!(
                    "{}",
                    progress_message(format!("Installing dependencies with {}...", pm.name()))
                );
                match ctx.hooks.install_dependencies(&target, pm) {
                    Ok(()) => println!("{}", success_message("Dependencies installed")),
                    Err(_) => println!(
                        "{}",
                        warning_message("Install failed. You can run it later inside the folder.")
                    ),
                }
            }
            PromptOutcome::Declined => {}
            // The worktree is already created and stays; abort only
            // suppresses the remaining steps.
            PromptOutcome::Aborted => return Ok(FlowOutcome::Cancelled),
        }
    }

    open_editor(ctx, &target);

    println!();
    println!("{}", success_message(format!("Ready: {dir_name}")));
    println!("{}", muted(target.display().to_string()));
    Ok(FlowOutcome::Completed)
}

fn open_editor(ctx: &FlowContext, path: &std::path::Path) {
    if let Err(e) = ctx.hooks.open_editor(ctx.config.editor(), path) {
        println!("{}", hint_message(e.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::super::testing::{HookCall, ScriptedPrompter, StubHooks, StubVcs, VcsCall, config_with_base};
    use super::*;
    use crate::hooks::PackageManager;

    fn run(
        config: &crate::config::Config,
        vcs: &StubVcs,
        hooks: &StubHooks,
        prompter: &mut ScriptedPrompter,
        name: Option<&str>,
    ) -> anyhow::Result<FlowOutcome> {
        let mut ctx = FlowContext {
            config,
            vcs,
            hooks,
            prompter,
        };
        run_new(&mut ctx, name)
    }

    #[test]
    fn test_empty_scan_root_fails_before_any_mutation() {
        let base = TempDir::new().unwrap();
        let config = config_with_base(base.path());
        let vcs = StubVcs::default();
        let hooks = StubHooks::default();
        let mut prompter = ScriptedPrompter::default();

        let err = run(&config, &vcs, &hooks, &mut prompter, Some("x")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ArborError>(),
            Some(ArborError::NoRepoFound { .. })
        ));
        assert!(vcs.calls().is_empty());
        assert!(hooks.calls().is_empty());
    }

    #[test]
    fn test_unset_base_dir_fails_with_configuration_missing() {
        let config = crate::config::Config::default();
        let vcs = StubVcs::default();
        let hooks = StubHooks::default();
        let mut prompter = ScriptedPrompter::default();

        let err = run(&config, &vcs, &hooks, &mut prompter, Some("x")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ArborError>(),
            Some(ArborError::ConfigurationMissing)
        ));
    }

    #[test]
    fn test_empty_name_after_sanitising_is_rejected() {
        let base = TempDir::new().unwrap();
        let repo = base.path().join("app");
        let config = config_with_base(base.path());
        let vcs = StubVcs {
            current: Some(repo),
            ..Default::default()
        };
        let hooks = StubHooks::default();
        let mut prompter = ScriptedPrompter::default();

        let err = run(&config, &vcs, &hooks, &mut prompter, Some("...")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ArborError>(),
            Some(ArborError::EmptyName)
        ));
        assert!(vcs.calls().is_empty());
    }

    #[test]
    fn test_existing_target_reopens_without_creating() {
        let base = TempDir::new().unwrap();
        let repo = base.path().join("app");
        fs::create_dir_all(base.path().join("app-worktree-fix")).unwrap();
        let config = config_with_base(base.path());
        let vcs = StubVcs {
            current: Some(repo),
            ..Default::default()
        };
        let hooks = StubHooks::default();
        let mut prompter = ScriptedPrompter::default();

        let outcome = run(&config, &vcs, &hooks, &mut prompter, Some("fix")).unwrap();
        assert_eq!(outcome, FlowOutcome::Completed);
        assert!(vcs.calls().is_empty());
        assert_eq!(
            hooks.opened_paths(),
            vec![std::path::absolute(base.path().join("app-worktree-fix")).unwrap()]
        );
    }

    #[test]
    fn test_creates_branch_when_missing() {
        let base = TempDir::new().unwrap();
        let repo = base.path().join("app");
        let config = config_with_base(base.path());
        let vcs = StubVcs {
            current: Some(repo),
            ..Default::default()
        };
        let hooks = StubHooks::default();
        let mut prompter = ScriptedPrompter::default();

        run(&config, &vcs, &hooks, &mut prompter, Some("fix")).unwrap();
        assert_eq!(
            vcs.calls(),
            vec![VcsCall::AddWorktree {
                path: std::path::absolute(base.path().join("app-worktree-fix")).unwrap(),
                branch: "fix".to_string(),
                create_branch: true,
            }]
        );
        // Post-create steps ran: env copy, then editor.
        assert_eq!(
            hooks.calls(),
            vec![
                HookCall::CopyEnvFiles,
                HookCall::OpenEditor(std::path::absolute(base.path().join("app-worktree-fix")).unwrap()),
            ]
        );
    }

    #[test]
    fn test_reuses_existing_branch() {
        let base = TempDir::new().unwrap();
        let repo = base.path().join("app");
        let config = config_with_base(base.path());
        let vcs = StubVcs {
            current: Some(repo),
            branches: ["fix".to_string()].into(),
            ..Default::default()
        };
        let hooks = StubHooks::default();
        let mut prompter = ScriptedPrompter::default();

        run(&config, &vcs, &hooks, &mut prompter, Some("fix")).unwrap();
        assert!(matches!(
            vcs.calls()[0],
            VcsCall::AddWorktree {
                create_branch: false,
                ..
            }
        ));
    }

    #[test]
    fn test_install_declined_still_opens_editor() {
        let base = TempDir::new().unwrap();
        let repo = base.path().join("app");
        let config = config_with_base(base.path());
        let vcs = StubVcs {
            current: Some(repo),
            ..Default::default()
        };
        let hooks = StubHooks {
            detected: Some(PackageManager::Npm),
            ..Default::default()
        };
        let mut prompter = ScriptedPrompter::default();
        prompter.confirms.push_back(PromptOutcome::Declined);

        let outcome = run(&config, &vcs, &hooks, &mut prompter, Some("fix")).unwrap();
        assert_eq!(outcome, FlowOutcome::Completed);
        let calls = hooks.calls();
        assert!(!calls.contains(&HookCall::Install));
        assert_eq!(hooks.opened_paths().len(), 1);
    }

    #[test]
    fn test_abort_at_install_keeps_worktree_and_skips_editor() {
        let base = TempDir::new().unwrap();
        let repo = base.path().join("app");
        let config = config_with_base(base.path());
        let vcs = StubVcs {
            current: Some(repo),
            ..Default::default()
        };
        let hooks = StubHooks {
            detected: Some(PackageManager::Npm),
            ..Default::default()
        };
        let mut prompter = ScriptedPrompter::default();
        prompter.confirms.push_back(PromptOutcome::Aborted);

        let outcome = run(&config, &vcs, &hooks, &mut prompter, Some("fix")).unwrap();
        assert_eq!(outcome, FlowOutcome::Cancelled);
        // The worktree was created before the abort and is not rolled back.
        assert_eq!(vcs.calls().len(), 1);
        assert!(hooks.opened_paths().is_empty());
    }

    #[test]
    fn test_install_failure_is_not_fatal() {
        let base = TempDir::new().unwrap();
        let repo = base.path().join("app");
        let config = config_with_base(base.path());
        let vcs = StubVcs {
            current: Some(repo),
            ..Default::default()
        };
        let hooks = StubHooks {
            detected: Some(PackageManager::Pnpm),
            install_fails: true,
            ..Default::default()
        };
        let mut prompter = ScriptedPrompter::default();
        prompter.confirms.push_back(PromptOutcome::Value(()));

        let outcome = run(&config, &vcs, &hooks, &mut prompter, Some("fix")).unwrap();
        assert_eq!(outcome, FlowOutcome::Completed);
        assert!(hooks.calls().contains(&HookCall::Install));
        assert_eq!(hooks.opened_paths().len(), 1);
    }

    #[test]
    fn test_prompts_for_name_when_not_supplied() {
        let base = TempDir::new().unwrap();
        let repo = base.path().join("app");
        let config = config_with_base(base.path());
        let vcs = StubVcs {
            current: Some(repo),
            ..Default::default()
        };
        let hooks = StubHooks::default();
        let mut prompter = ScriptedPrompter::default();
        prompter
            .inputs
            .push_back(PromptOutcome::Value("My Feature".to_string()));

        run(&config, &vcs, &hooks, &mut prompter, None).unwrap();
        // Sanitized: whitespace collapsed to a dash.
        assert!(matches!(
            &vcs.calls()[0],
            VcsCall::AddWorktree { branch, .. } if branch == "My-Feature"
        ));
    }

    #[test]
    fn test_repo_selection_falls_back_to_scan() {
        let base = TempDir::new().unwrap();
        fs::create_dir_all(base.path().join("app/.git")).unwrap();
        fs::create_dir_all(base.path().join("lib/.git")).unwrap();
        let config = config_with_base(base.path());
        let vcs = StubVcs::default();
        let hooks = StubHooks::default();
        // Pick the second repo ("lib") from the sorted scan.
        let mut prompter = ScriptedPrompter::selecting([PromptOutcome::Value(1)]);

        run(&config, &vcs, &hooks, &mut prompter, Some("fix")).unwrap();
        assert!(matches!(
            &vcs.calls()[0],
            VcsCall::AddWorktree { path, .. }
                if path.file_name().unwrap().to_str().unwrap() == "lib-worktree-fix"
        ));
    }
}
