//! Style constants and message formatting for terminal output
//!
//! Use `cformat!` with HTML-like tags for user-facing messages:
//!
//! ```
//! use color_print::cformat;
//!
//! let branch = "feature";
//! let msg = cformat!("<green>Deleted merged branch <bold>{branch}</></>");
//! ```
//!
//! Semantic mapping:
//! - Errors: `<red>...</>`
//! - Warnings: `<yellow>...</>`
//! - Hints / secondary output: `<dim>...</>`
//! - Progress: `<cyan>...</>`
//! - Success: `<green>...</>`

use color_print::{cformat, cstr};

// Print macros that strip color when the stream is not a terminal.
pub use anstream::{eprint, eprintln, print, println};

/// Success symbol (green ✓)
pub const SUCCESS_SYMBOL: &str = cstr!("<green>✓</>");

/// Error symbol (red ✗)
pub const ERROR_SYMBOL: &str = cstr!("<red>✗</>");

/// Warning symbol (yellow ▲)
pub const WARNING_SYMBOL: &str = cstr!("<yellow>▲</>");

/// Info symbol (dim ○) - for neutral status
pub const INFO_SYMBOL: &str = cstr!("<dim>○</>");

/// Progress symbol (cyan ◎)
pub const PROGRESS_SYMBOL: &str = cstr!("<cyan>◎</>");

/// Hint symbol (dim ↳)
pub const HINT_SYMBOL: &str = cstr!("<dim>↳</>");

/// Prompt symbol (cyan ❯) - for questions requiring user input
pub const PROMPT_SYMBOL: &str = cstr!("<cyan>❯</>");

/// Format an error message with symbol and red styling.
///
/// Content can include inner styling like `<bold>`.
pub fn error_message(content: impl AsRef<str>) -> String {
    cformat!("{ERROR_SYMBOL} <red>{}</>", content.as_ref())
}

/// Format a warning message with symbol and yellow styling
pub fn warning_message(content: impl AsRef<str>) -> String {
    cformat!("{WARNING_SYMBOL} <yellow>{}</>", content.as_ref())
}

/// Format a success message with symbol and green styling
pub fn success_message(content: impl AsRef<str>) -> String {
    cformat!("{SUCCESS_SYMBOL} <green>{}</>", content.as_ref())
}

/// Format a progress message with symbol and cyan styling
pub fn progress_message(content: impl AsRef<str>) -> String {
    cformat!("{PROGRESS_SYMBOL} <cyan>{}</>", content.as_ref())
}

/// Format an info message with symbol (no color on text - neutral status)
pub fn info_message(content: impl AsRef<str>) -> String {
    format!("{INFO_SYMBOL} {}", content.as_ref())
}

/// Format a hint message with symbol and dim styling
pub fn hint_message(content: impl AsRef<str>) -> String {
    cformat!("{HINT_SYMBOL} <dim>{}</>", content.as_ref())
}

/// Format secondary output (paths, kept-as-is notes) in dim styling, no symbol
pub fn muted(content: impl AsRef<str>) -> String {
    cformat!("<dim>{}</>", content.as_ref())
}

/// The branding header shown above the interactive menu.
pub fn banner() -> String {
    cformat!("<magenta><bold>arbor</></> <dim>— git worktree manager</>")
}
