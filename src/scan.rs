//! Filesystem scanning for repositories and worktree directories.
//!
//! Both scans look only at immediate subdirectories of the base folder and
//! sort results lexicographically by name, so menus render in the same order
//! on every run regardless of filesystem enumeration order.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::naming::is_worktree_dir_name;

/// Main repository checkouts directly under `root`.
///
/// A main checkout carries its metadata in a `.git` directory; linked
/// worktrees have a `.git` file instead and are excluded here.
pub fn scan_repos(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut repos: Vec<PathBuf> = subdirs(root)?
        .into_iter()
        .filter(|dir| dir.join(".git").is_dir())
        .collect();
    repos.sort();
    Ok(repos)
}

/// Directories under `root` that follow the worktree naming convention.
pub fn find_worktree_dirs(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = subdirs(root)?
        .into_iter()
        .filter(|dir| {
            dir.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(is_worktree_dir_name)
        })
        .collect();
    dirs.sort();
    Ok(dirs)
}

fn subdirs(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(root).with_context(|| format!("Failed to read {}", root.display()))?;
    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read {}", root.display()))?;
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn mkdir(base: &Path, name: &str) -> PathBuf {
        let dir = base.join(name);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_scan_repos_finds_only_main_checkouts() {
        let root = TempDir::new().unwrap();
        mkdir(root.path(), "beta/.git");
        mkdir(root.path(), "alpha/.git");
        // Linked worktree: .git is a file, not a directory
        let linked = mkdir(root.path(), "alpha-worktree-fix");
        fs::write(linked.join(".git"), "gitdir: ../alpha/.git/worktrees/fix").unwrap();
        // Plain directory without metadata
        mkdir(root.path(), "notes");

        let repos = scan_repos(root.path()).unwrap();
        let names: Vec<_> = repos
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_scan_repos_sorted_lexicographically() {
        let root = TempDir::new().unwrap();
        for name in ["zeta", "mid", "aaa"] {
            mkdir(root.path(), &format!("{name}/.git"));
        }
        let repos = scan_repos(root.path()).unwrap();
        let names: Vec<_> = repos
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["aaa", "mid", "zeta"]);
    }

    #[test]
    fn test_find_worktree_dirs_matches_naming_convention() {
        let root = TempDir::new().unwrap();
        mkdir(root.path(), "app/.git");
        mkdir(root.path(), "app-worktree-fix");
        mkdir(root.path(), "app-worktree-feature");
        mkdir(root.path(), "unrelated");
        fs::write(root.path().join("app-worktree-file"), "a file, not a dir").unwrap();

        let dirs = find_worktree_dirs(root.path()).unwrap();
        let names: Vec<_> = dirs
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["app-worktree-feature", "app-worktree-fix"]);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let root = TempDir::new().unwrap();
        let gone = root.path().join("missing");
        assert!(scan_repos(&gone).is_err());
        assert!(find_worktree_dirs(&gone).is_err());
    }
}
