//! The lifecycle flows: create, list, remove, clear, settings, and the
//! interactive menu.
//!
//! Flows are written against the collaborator traits ([`Vcs`](crate::git::Vcs),
//! [`Prompter`](crate::prompt::Prompter), [`Hooks`](crate::hooks::Hooks)) and
//! receive the resolved [`Config`] by parameter. Nothing in this module reads
//! the environment or spawns a process directly, which is what makes the
//! orchestration testable with recording stubs.

mod clear;
mod list;
mod menu;
mod new;
mod remove;
mod settings;

pub use clear::run_clear;
pub use list::run_list;
pub use menu::{MENU, MenuAction, run_menu};
pub use new::run_new;
pub use remove::run_remove;
pub use settings::{first_run_setup, run_settings};

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::git::{ArborError, Vcs};
use crate::hooks::Hooks;
use crate::prompt::{Prompter, PromptOutcome, SelectItem};
use crate::scan;

/// How a flow ended. A cancellation is a clean, silent termination: the user
/// backed out at a prompt, and any mutation that already happened stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
    Completed,
    Cancelled,
}

/// Everything a flow needs, threaded by parameter.
pub struct FlowContext<'a> {
    pub config: &'a Config,
    pub vcs: &'a dyn Vcs,
    pub hooks: &'a dyn Hooks,
    pub prompter: &'a mut dyn Prompter,
}

impl FlowContext<'_> {
    /// The configured scan root. Errors when unset; existence is checked by
    /// the scans themselves.
    fn dev_dir(&self) -> anyhow::Result<PathBuf> {
        self.config
            .dev_dir()
            .ok_or_else(|| ArborError::ConfigurationMissing.into())
    }
}

/// Print a flow error. Typed domain errors already render themselves styled;
/// anything else gets the standard error framing.
pub fn report_error(err: &anyhow::Error) {
    use crate::git::{ArborError, GitError};
    use crate::styling::{eprintln, error_message};

    if err.downcast_ref::<GitError>().is_some() || err.downcast_ref::<ArborError>().is_some() {
        eprintln!("{err}");
    } else {
        eprintln!("{}", error_message(err.to_string()));
    }
}

/// Directory name of a path, for display.
pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Resolve which repository to operate on.
///
/// With `use_current`, a repository containing the working directory wins
/// without any prompting. Otherwise the scan root is listed and the user
/// picks. Fails before anything else happens when the scan root is unset or
/// holds no repositories.
pub(crate) fn resolve_repo(
    ctx: &mut FlowContext,
    use_current: bool,
) -> anyhow::Result<PromptOutcome<PathBuf>> {
    if use_current {
        if let Some(repo) = ctx.vcs.current_repo()? {
            return Ok(PromptOutcome::Value(repo));
        }
    }

    let dev_dir = ctx.dev_dir()?;
    let repos = scan::scan_repos(&dev_dir).map_err(|_| ArborError::NoRepoFound {
        dir: dev_dir.clone(),
    })?;
    if repos.is_empty() {
        return Err(ArborError::NoRepoFound { dir: dev_dir }.into());
    }

    let items: Vec<SelectItem> = repos.iter().map(|r| SelectItem::new(display_name(r))).collect();
    Ok(ctx
        .prompter
        .select("Select a project", &items, false)?
        .map(|i| repos[i].clone()))
}
