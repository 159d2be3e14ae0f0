//! Command-line argument surface.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "arbor")]
#[command(version, about = "Git worktree manager", long_about = None)]
pub struct Cli {
    /// With no subcommand, the interactive menu is shown.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new worktree
    New {
        /// Worktree name (prompted for when omitted)
        name: Option<String>,
    },

    /// List worktrees and optionally open one
    #[command(alias = "list")]
    Ls,

    /// Remove a worktree
    #[command(alias = "remove")]
    Rm,

    /// Remove ALL worktrees for a repo
    Clear,

    /// Change the base folder or editor
    Settings,
}
