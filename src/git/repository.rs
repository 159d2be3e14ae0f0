//! Git subprocess layer.
//!
//! [`Repository`] is a thin handle that runs `git` in a specific directory
//! and returns trimmed stdout. [`GitCli`] implements the [`Vcs`](super::Vcs)
//! contract on top of it.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, bail};
use dunce::canonicalize;

use super::{GitError, WorktreeInfo, WorktreeStatus};

/// A handle for running git commands in a specific directory.
#[derive(Debug, Clone)]
pub struct Repository {
    path: PathBuf,
}

impl Repository {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run a git command and return stdout.
    pub fn run(&self, args: &[&str]) -> anyhow::Result<String> {
        log::debug!("git {} (in {})", args.join(" "), self.path.display());
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.path)
            .output()
            .with_context(|| format!("Failed to execute: git {}", args.join(" ")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            for line in stderr.trim().lines() {
                log::debug!("  ! {}", line);
            }
            let stdout = String::from_utf8_lossy(&output.stdout);
            let error_msg = [stderr.trim(), stdout.trim()]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            bail!("{}", error_msg);
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run a git command for its exit status only. `Err` means the process
    /// could not be spawned, not that git said no.
    pub fn succeeds(&self, args: &[&str]) -> anyhow::Result<bool> {
        log::debug!("git {} (in {})", args.join(" "), self.path.display());
        let status = Command::new("git")
            .args(args)
            .current_dir(&self.path)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .with_context(|| format!("Failed to execute: git {}", args.join(" ")))?;
        Ok(status.success())
    }

    /// Branch checked out here, `None` when detached or undeterminable.
    pub fn current_branch(&self) -> Option<String> {
        let stdout = self.run(&["branch", "--show-current"]).ok()?;
        let branch = stdout.trim();
        if branch.is_empty() {
            None
        } else {
            Some(branch.to_string())
        }
    }

    /// The repository's primary branch: the branch `origin/HEAD` points at,
    /// falling back to a local `main` or `master`.
    pub fn primary_branch(&self) -> Option<String> {
        if let Ok(stdout) = self.run(&["symbolic-ref", "--short", "refs/remotes/origin/HEAD"]) {
            let name = stdout.trim();
            if let Some(short) = name.split_once('/').map(|(_, b)| b.to_string()) {
                return Some(short);
            }
        }
        for candidate in ["main", "master"] {
            if self.branch_exists(candidate).unwrap_or(false) {
                return Some(candidate.to_string());
            }
        }
        None
    }

    pub fn branch_exists(&self, branch: &str) -> anyhow::Result<bool> {
        let refname = format!("refs/heads/{branch}");
        self.succeeds(&["rev-parse", "--verify", "--quiet", &refname])
    }

    /// The main checkout owning this directory's git metadata, resolved via
    /// the common git directory. Works from both the main checkout and any
    /// linked worktree.
    pub fn main_repo(&self) -> Option<PathBuf> {
        let stdout = self.run(&["rev-parse", "--git-common-dir"]).ok()?;
        let raw = PathBuf::from(stdout.trim());
        let common_dir = if raw.is_relative() {
            self.path.join(raw)
        } else {
            raw
        };
        if common_dir.file_name()?.to_str()? != ".git" {
            // Bare repository or unusual layout; there is no main checkout.
            return None;
        }
        let root = common_dir.parent()?;
        Some(canonicalize(root).unwrap_or_else(|_| root.to_path_buf()))
    }

    /// Classify this worktree as clean or dirty.
    ///
    /// Two independent checks: any modified/staged/untracked file, and any
    /// commit missing from the configured upstream. No upstream (including
    /// detached HEAD) means the second check reports `false`. Query failures
    /// propagate so a broken worktree is never mistaken for a clean one.
    pub fn check_status(&self) -> anyhow::Result<WorktreeStatus> {
        let status_err = |error: &anyhow::Error| GitError::StatusCheckFailed {
            path: self.path.clone(),
            error: error.to_string(),
        };

        let porcelain = self
            .run(&["status", "--porcelain"])
            .map_err(|e| status_err(&e))?;
        let has_uncommitted_changes = !porcelain.trim().is_empty();

        let has_upstream = self
            .succeeds(&[
                "rev-parse",
                "--abbrev-ref",
                "--symbolic-full-name",
                "@{upstream}",
            ])
            .map_err(|e| status_err(&e))?;

        let has_unpushed_commits = if has_upstream {
            let count = self
                .run(&["rev-list", "--count", "@{upstream}..HEAD"])
                .map_err(|e| status_err(&e))?;
            count.trim().parse::<u64>().unwrap_or(0) > 0
        } else {
            false
        };

        Ok(WorktreeStatus {
            has_uncommitted_changes,
            has_unpushed_commits,
        })
    }

    /// Linked worktrees of this repository, in git's reported order.
    /// The main checkout and bare entries are filtered out.
    pub fn linked_worktrees(&self) -> anyhow::Result<Vec<WorktreeInfo>> {
        let stdout = self.run(&["worktree", "list", "--porcelain"])?;
        let root = canonicalize(&self.path).unwrap_or_else(|_| self.path.clone());
        Ok(parse_worktree_porcelain(&stdout)
            .into_iter()
            .filter(|wt| !wt.bare)
            .filter(|wt| canonicalize(&wt.path).unwrap_or_else(|_| wt.path.clone()) != root)
            .map(|wt| WorktreeInfo {
                path: wt.path,
                branch: wt.branch,
            })
            .collect())
    }
}

/// One entry of `git worktree list --porcelain`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct RawWorktree {
    path: PathBuf,
    /// `None` covers both bare and detached entries.
    branch: Option<String>,
    bare: bool,
}

/// Parse `git worktree list --porcelain` output. Entries are separated by
/// blank lines; each starts with a `worktree <path>` line.
fn parse_worktree_porcelain(output: &str) -> Vec<RawWorktree> {
    let mut worktrees = Vec::new();
    let mut current: Option<RawWorktree> = None;

    for line in output.lines() {
        if let Some(path) = line.strip_prefix("worktree ") {
            if let Some(wt) = current.take() {
                worktrees.push(wt);
            }
            current = Some(RawWorktree {
                path: PathBuf::from(path),
                ..Default::default()
            });
        } else if let Some(wt) = current.as_mut() {
            if let Some(refname) = line.strip_prefix("branch ") {
                wt.branch = Some(
                    refname
                        .strip_prefix("refs/heads/")
                        .unwrap_or(refname)
                        .to_string(),
                );
            } else if line == "bare" {
                wt.bare = true;
            }
        }
    }
    if let Some(wt) = current.take() {
        worktrees.push(wt);
    }
    worktrees
}

/// The production [`Vcs`](super::Vcs) implementation, shelling out to `git`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitCli;

impl GitCli {
    pub fn new() -> Self {
        Self
    }
}

fn path_str(path: &Path) -> anyhow::Result<&str> {
    path.to_str().ok_or_else(|| {
        anyhow::anyhow!("Path contains invalid UTF-8: {}", path.display())
    })
}

impl super::Vcs for GitCli {
    fn list_worktrees(&self, repo_root: &Path) -> anyhow::Result<Vec<WorktreeInfo>> {
        Repository::at(repo_root).linked_worktrees()
    }

    fn add_worktree(
        &self,
        repo_root: &Path,
        path: &Path,
        branch: &str,
        create_branch: bool,
    ) -> anyhow::Result<()> {
        let path = path_str(path)?;
        let result = if create_branch {
            Repository::at(repo_root).run(&["worktree", "add", "-b", branch, path])
        } else {
            Repository::at(repo_root).run(&["worktree", "add", path, branch])
        };
        result.map_err(|e| GitError::WorktreeCreateFailed {
            name: branch.to_string(),
            error: e.to_string(),
        })?;
        Ok(())
    }

    fn remove_worktree(&self, repo_root: &Path, path: &Path, force: bool) -> anyhow::Result<()> {
        let path_arg = path_str(path)?;
        let mut args = vec!["worktree", "remove"];
        if force {
            args.push("--force");
        }
        args.push(path_arg);
        Repository::at(repo_root).run(&args).map_err(|e| {
            GitError::WorktreeRemoveFailed {
                path: path.to_path_buf(),
                error: e.to_string(),
            }
        })?;
        Ok(())
    }

    fn prune_worktrees(&self, repo_root: &Path) -> anyhow::Result<()> {
        Repository::at(repo_root).run(&["worktree", "prune"])?;
        Ok(())
    }

    fn current_branch(&self, path: &Path) -> anyhow::Result<Option<String>> {
        Ok(Repository::at(path).current_branch())
    }

    fn branch_exists(&self, repo_root: &Path, branch: &str) -> anyhow::Result<bool> {
        Repository::at(repo_root).branch_exists(branch)
    }

    fn is_branch_merged(&self, repo_root: &Path, branch: &str) -> anyhow::Result<bool> {
        let repo = Repository::at(repo_root);
        let Some(primary) = repo.primary_branch() else {
            // Without a primary branch there is nothing to be merged into;
            // report unmerged so the branch is kept unless forced.
            return Ok(false);
        };
        repo.succeeds(&["merge-base", "--is-ancestor", branch, &primary])
    }

    fn delete_branch(&self, repo_root: &Path, branch: &str, force: bool) -> anyhow::Result<()> {
        let flag = if force { "-D" } else { "-d" };
        Repository::at(repo_root).run(&["branch", flag, branch])?;
        Ok(())
    }

    fn main_repo_of(&self, path: &Path) -> anyhow::Result<Option<PathBuf>> {
        if !path.exists() {
            return Ok(None);
        }
        Ok(Repository::at(path).main_repo())
    }

    fn current_repo(&self) -> anyhow::Result<Option<PathBuf>> {
        let cwd = match std::env::current_dir() {
            Ok(d) => d,
            Err(_) => return Ok(None),
        };
        Ok(Repository::at(cwd).main_repo())
    }

    fn check_status(&self, path: &Path) -> anyhow::Result<WorktreeStatus> {
        Repository::at(path).check_status()
    }
}
