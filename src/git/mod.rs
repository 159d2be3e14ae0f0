//! Git operations and worktree state.

use std::path::{Path, PathBuf};

mod error;
mod repository;

pub use error::{ArborError, GitError};
pub use repository::{GitCli, Repository};

/// Branch names that are never deleted automatically after removing a
/// worktree: the conventional primary branches, and the detached-HEAD
/// pseudo-name git reports in that state.
const PROTECTED_BRANCHES: [&str; 3] = ["main", "master", "HEAD"];

/// Whether a branch must survive worktree removal.
pub fn is_protected_branch(branch: &str) -> bool {
    branch.is_empty() || PROTECTED_BRANCHES.contains(&branch)
}

/// One discovered worktree.
///
/// Built fresh on every scan and discarded afterwards; nothing caches these
/// across flows because the working tree can change between listing and
/// confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorktreeInfo {
    pub path: PathBuf,
    /// Checked-out branch, `None` when detached.
    pub branch: Option<String>,
}

/// Safety classification of a worktree at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorktreeStatus {
    /// Modified, staged, or untracked files present.
    pub has_uncommitted_changes: bool,
    /// Commits on the current branch missing from its upstream.
    /// `false` when no upstream is configured or HEAD is detached.
    pub has_unpushed_commits: bool,
}

impl WorktreeStatus {
    pub fn is_dirty(&self) -> bool {
        self.has_uncommitted_changes || self.has_unpushed_commits
    }

    /// Human-readable reason string for warnings, e.g.
    /// `"uncommitted changes + unpushed commits"`.
    pub fn describe(&self) -> &'static str {
        match (self.has_uncommitted_changes, self.has_unpushed_commits) {
            (true, true) => "uncommitted changes + unpushed commits",
            (true, false) => "uncommitted changes",
            (false, true) => "unpushed commits",
            (false, false) => "clean",
        }
    }
}

/// The version-control primitives the lifecycle flows are written against.
///
/// The production implementation is [`GitCli`], which shells out to `git`.
/// Tests substitute recording stubs so that flow behavior (which primitives
/// ran, with which force flags) can be asserted without a real repository.
///
/// All mutation primitives take the main repository root explicitly: git ties
/// worktree administrative metadata to the main checkout, and passing it makes
/// that dependency visible at every call site.
pub trait Vcs {
    /// Linked worktrees of a repository (the main checkout is not included).
    fn list_worktrees(&self, repo_root: &Path) -> anyhow::Result<Vec<WorktreeInfo>>;

    /// Create a worktree at `path` on `branch`. With `create_branch`, the
    /// branch is created by the same operation; creation is atomic on the
    /// git side, so a failure leaves no half-made branch behind.
    fn add_worktree(
        &self,
        repo_root: &Path,
        path: &Path,
        branch: &str,
        create_branch: bool,
    ) -> anyhow::Result<()>;

    /// Remove a worktree. Plain removal is refused by git for a dirty tree;
    /// `force` is only ever passed after the user has confirmed data loss.
    fn remove_worktree(&self, repo_root: &Path, path: &Path, force: bool) -> anyhow::Result<()>;

    /// Drop administrative entries whose directories no longer exist.
    fn prune_worktrees(&self, repo_root: &Path) -> anyhow::Result<()>;

    /// Branch checked out at `path`, `None` when detached.
    fn current_branch(&self, path: &Path) -> anyhow::Result<Option<String>>;

    fn branch_exists(&self, repo_root: &Path, branch: &str) -> anyhow::Result<bool>;

    /// Whether all commits of `branch` are reachable from the repository's
    /// primary branch, making it safe to delete.
    fn is_branch_merged(&self, repo_root: &Path, branch: &str) -> anyhow::Result<bool>;

    fn delete_branch(&self, repo_root: &Path, branch: &str, force: bool) -> anyhow::Result<()>;

    /// Main repository owning the worktree at `path`, or `None` when the
    /// directory is not a valid linked worktree.
    fn main_repo_of(&self, path: &Path) -> anyhow::Result<Option<PathBuf>>;

    /// Main repository containing the process's working directory, if any.
    fn current_repo(&self) -> anyhow::Result<Option<PathBuf>>;

    /// Classify a worktree as clean or dirty. Errors propagate; a failed
    /// check is never reported as clean.
    fn check_status(&self, path: &Path) -> anyhow::Result<WorktreeStatus>;
}
