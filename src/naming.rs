//! Worktree directory naming.
//!
//! A worktree for repository `myapp` and short name `feature-x` lives in a
//! directory called `myapp-worktree-feature-x`, as a sibling of the main
//! checkout. Encoding and decoding are pure string operations; no filesystem
//! access happens here.

use std::path::{Path, PathBuf};

/// Separator between the repository name and the worktree short name.
pub const WORKTREE_MARKER: &str = "-worktree-";

/// Build the directory name for a worktree.
pub fn worktree_dir_name(repo_name: &str, short_name: &str) -> String {
    format!("{repo_name}{WORKTREE_MARKER}{short_name}")
}

/// Build the full worktree path under `base`.
pub fn worktree_path(base: &Path, repo_name: &str, short_name: &str) -> PathBuf {
    base.join(worktree_dir_name(repo_name, short_name))
}

/// Split a worktree directory name into `(repo_name, short_name)`.
///
/// Splits at the FIRST occurrence of the marker, so a short name that itself
/// contains `-worktree-` decodes to a truncated short name. This is a known
/// limitation of the naming scheme, kept so that decoding stays the exact
/// inverse of encoding for ordinary names.
///
/// Returns an empty repo name when the marker is absent; callers treat that
/// as "not a worktree directory".
pub fn split_worktree_dir_name(dir_name: &str) -> (String, String) {
    match dir_name.find(WORKTREE_MARKER) {
        Some(idx) => (
            dir_name[..idx].to_string(),
            dir_name[idx + WORKTREE_MARKER.len()..].to_string(),
        ),
        None => (String::new(), dir_name.to_string()),
    }
}

/// Whether a directory name follows the worktree naming convention.
pub fn is_worktree_dir_name(dir_name: &str) -> bool {
    dir_name.contains(WORKTREE_MARKER)
}

/// Collapse a raw user-supplied name into a token that is safe as both a
/// directory name and a branch name. May return an empty string; callers
/// must reject that before touching the filesystem.
pub fn sanitize_name(raw: &str) -> String {
    let dashed: String = raw
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect();

    let cleaned = sanitize_filename::sanitize(dashed);

    // Branch names may not start or end with '-' or '.', and repeated dashes
    // read badly in directory names.
    let mut out = String::with_capacity(cleaned.len());
    let mut prev_dash = false;
    for c in cleaned.chars() {
        if c == '-' {
            if !prev_dash && !out.is_empty() {
                out.push(c);
            }
            prev_dash = true;
        } else {
            out.push(c);
            prev_dash = false;
        }
    }
    out.trim_matches(|c: char| c == '-' || c == '.').to_string()
}
