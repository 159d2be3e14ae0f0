//! Typed errors for git operations and lifecycle flows.
//!
//! Two enums, both pattern-matchable after conversion to `anyhow::Error`:
//!
//! - **`GitError`** - failures of the git subprocess layer. Display produces
//!   styled output for users.
//! - **`ArborError`** - semantic failures of the lifecycle flows (missing
//!   configuration, unresolvable repositories, rejected names).
//!
//! User-initiated aborts are not errors and have no variant here; prompts
//! report them through [`crate::prompt::PromptOutcome::Aborted`].

use std::fmt;
use std::path::PathBuf;

use color_print::cformat;

use crate::styling::error_message;

/// Failures from the git subprocess layer.
#[derive(Debug, Clone)]
pub enum GitError {
    /// The clean/dirty classification of a worktree could not be computed.
    ///
    /// Deliberately not folded into "clean": reporting clean on a failed
    /// query would green-light a forced removal of unsaved work.
    StatusCheckFailed { path: PathBuf, error: String },
    WorktreeCreateFailed { name: String, error: String },
    WorktreeRemoveFailed { path: PathBuf, error: String },
}

impl fmt::Display for GitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            GitError::StatusCheckFailed { path, error } => {
                cformat!(
                    "Could not check status of <bold>{}</>: {error}",
                    path.display()
                )
            }
            GitError::WorktreeCreateFailed { name, error } => {
                cformat!("Failed to create worktree <bold>{name}</>: {error}")
            }
            GitError::WorktreeRemoveFailed { path, error } => {
                cformat!("Failed to remove worktree <bold>{}</>: {error}", path.display())
            }
        };
        write!(f, "{}", error_message(msg))
    }
}

impl std::error::Error for GitError {}

/// Semantic failures of the lifecycle flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArborError {
    /// No base folder configured and none supplied by the environment.
    ConfigurationMissing,
    /// The scan root does not exist or contains no repositories.
    NoRepoFound { dir: PathBuf },
    /// The supplied worktree name sanitized down to nothing.
    EmptyName,
    /// A selected worktree has no resolvable main repository.
    OrphanedWorktree { path: PathBuf },
}

impl fmt::Display for ArborError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ArborError::ConfigurationMissing => cformat!(
                "No base folder configured. Run <bold>arbor settings</> or set <bold>ARBOR_DEV_DIR</>."
            ),
            ArborError::NoRepoFound { dir } => {
                cformat!("No git repositories found in <bold>{}</>", dir.display())
            }
            ArborError::EmptyName => "Name became empty after sanitising.".to_string(),
            ArborError::OrphanedWorktree { path } => cformat!(
                "Can't find the main repository for <bold>{}</>",
                path.display()
            ),
        };
        write!(f, "{}", error_message(msg))
    }
}

impl std::error::Error for ArborError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_are_pattern_matchable_through_anyhow() {
        let err: anyhow::Error = ArborError::EmptyName.into();
        assert!(matches!(
            err.downcast_ref::<ArborError>(),
            Some(ArborError::EmptyName)
        ));
    }

    #[test]
    fn test_status_check_failure_names_the_path() {
        let err = GitError::StatusCheckFailed {
            path: PathBuf::from("/dev/app-worktree-x"),
            error: "no such directory".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("app-worktree-x"));
        assert!(rendered.contains("no such directory"));
    }

    #[test]
    fn test_no_repo_found_names_the_dir() {
        let err = ArborError::NoRepoFound {
            dir: PathBuf::from("/dev"),
        };
        assert!(err.to_string().contains("/dev"));
    }
}
